pub mod classifier;
pub mod history;
pub mod rate;

pub use classifier::{Band, StateClassifier};
pub use history::HistoryBuffer;
pub use rate::RateEstimator;
