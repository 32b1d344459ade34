pub mod config;
pub mod jwt_auth;
mod responses;
mod telementry;

pub use self::config::AppConfig;
pub use responses::*;
pub use telementry::*;
