pub mod config;
pub mod error;
pub mod import;
pub mod placement;
pub mod telemetry;
