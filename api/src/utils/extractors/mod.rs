mod bearer_token;
mod decoded_json;
mod decoded_query;

pub use self::{bearer_token::*, decoded_json::*, decoded_query::*};
