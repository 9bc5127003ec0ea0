//! The services behind the routes: signing session tokens, resolving roles,
//! holding auth codes, planning redirects, and talking to the identity
//! provider and the profile store.

mod auth_code;
mod identity;
mod profile;
mod redirect;
mod roles;
mod session_token;

pub use self::{
	auth_code::*,
	identity::*,
	profile::*,
	redirect::*,
	roles::*,
	session_token::*,
};
