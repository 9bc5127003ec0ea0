/// The endpoints that authenticate a user and hand their session over to the
/// sibling applications
pub mod auth;
