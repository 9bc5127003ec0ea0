mod exchange;
mod login;
mod logout;
mod refresh;
mod token;
mod verify;

pub use self::{exchange::*, login::*, logout::*, refresh::*, token::*, verify::*};
