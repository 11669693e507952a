pub mod landmarks;
pub mod source;

pub use landmarks::{Point, PoseLandmarks, Side};
pub use source::{PoseSource, StubPoseSource};
