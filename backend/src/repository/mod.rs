pub mod authorizations;
pub mod users;
