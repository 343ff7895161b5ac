pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod validity;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use resolver::*;
pub use service::*;
