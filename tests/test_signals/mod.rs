pub mod generate;

pub use generate::{impulse_train, periodic_times, standing_still};
