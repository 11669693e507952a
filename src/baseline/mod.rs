pub mod store;

pub use store::{Baseline, BaselineStore, SideBaseline};
