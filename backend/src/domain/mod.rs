pub mod authorization;
pub mod identity;
pub mod user;
