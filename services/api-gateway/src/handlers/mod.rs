pub mod directory;
pub mod health;

pub use directory::{credits, list_services};
pub use health::{detailed_health_check, health_check};
