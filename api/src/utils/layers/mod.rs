mod cors;

pub use self::cors::*;
