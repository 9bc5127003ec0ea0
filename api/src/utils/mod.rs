/// The configuration of the gateway
pub mod config;
/// Constants used across the crate
pub mod constants;
/// Extractors that turn malformed requests into [`ErrorType`][models::ErrorType]s
pub mod extractors;
/// Tower layers applied to every route
pub mod layers;
