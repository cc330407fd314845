pub mod config;
pub mod service;
pub mod telemetry;

pub use config::ViewerConfig;
pub use service::{AppState, build_router};
