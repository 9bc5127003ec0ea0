mod bools;
mod one_or_many;
mod roles;

pub use self::{bools::*, one_or_many::*, roles::*};
