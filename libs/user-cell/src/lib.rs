pub mod handlers;
pub mod middleware;
pub mod router;
pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
