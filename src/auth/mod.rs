pub mod error;
pub mod handlers;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

pub use error::*;
pub use handlers::*;
pub use mailer::*;
pub use middleware::*;
pub use models::*;
pub use otp::*;
pub use repository::*;
pub use service::*;
pub use token::*;
