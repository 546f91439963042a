pub mod gravity;
pub mod peak_detector;
pub mod vector;

pub use gravity::GravityFilter;
pub use peak_detector::{PeakDetector, RefractoryGate};
pub use vector::Vector3;
