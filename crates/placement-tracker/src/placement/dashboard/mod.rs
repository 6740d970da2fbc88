mod summary;
pub mod views;

pub use summary::{aggregate, Dashboard, DashboardAggregate, DashboardLimits};
