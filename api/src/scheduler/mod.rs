/// The job that purges auth codes nobody redeemed
mod auth_code;

pub use self::auth_code::*;
