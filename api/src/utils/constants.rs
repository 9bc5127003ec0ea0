use std::time::Duration;

/// The version of the gateway, as reported in the logs at start-up
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The role every user has when no source grants them any
pub const DEFAULT_ROLE: &str = "user";

/// The query parameter an auth code is attached to a redirect with
pub const AUTH_CODE_QUERY_PARAM: &str = "code";

/// The number of random bytes in an auth code (256 bits)
pub const AUTH_CODE_BYTES: usize = 32;

/// The number of hex characters of a code's SHA-256 digest used to identify
/// the code in logs
pub const AUTH_CODE_FINGERPRINT_LENGTH: usize = 12;

/// Extra time a code is kept in Redis past its expiry, so that a late
/// redemption is reported as expired rather than as unknown
pub const AUTH_CODE_REDIS_GRACE: Duration = Duration::from_secs(60);

/// The signing secret shipped in `config/dev.toml`. Refused in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret";

/// Where Google publishes the keys that sign Firebase ID tokens
pub const GOOGLE_SECURE_TOKEN_JWKS_URL: &str =
	"https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// The issuer of Firebase ID tokens, followed by the project ID
pub const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// How long signing keys are cached when the provider does not say
pub const DEFAULT_JWKS_CACHE_DURATION: Duration = Duration::from_secs(60 * 60);

/// The REST endpoint of Firestore
pub const FIRESTORE_REST_ENDPOINT: &str = "https://firestore.googleapis.com/v1/";

/// The shortest time between two fetches of the signing keys triggered by a
/// token signed with an unknown key
pub const JWKS_MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

/// The longest session token lifetime the gateway accepts (30 days)
pub const MAX_TOKEN_VALIDITY_HOURS: u64 = 30 * 24;

/// The longest auth code time to live the gateway accepts
pub const MAX_AUTH_CODE_TTL_MINUTES: u64 = 60;
