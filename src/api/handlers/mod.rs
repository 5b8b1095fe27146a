pub mod health;

pub use health::{health_handler, readiness_handler};
