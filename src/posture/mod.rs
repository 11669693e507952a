pub mod classifier;
pub mod config;
pub mod tracker;

pub use classifier::{classify, compute, Deviation};
pub use config::PostureConfig;
pub use tracker::{PostureStatus, PostureTracker};
