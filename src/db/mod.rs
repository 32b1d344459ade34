pub mod org;
pub mod users;
pub mod works;
