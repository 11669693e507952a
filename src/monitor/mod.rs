pub mod controller;
pub mod loop_worker;
pub mod snapshot;

pub use controller::MonitorController;
pub use snapshot::{PostureSnapshot, SessionSummary};
