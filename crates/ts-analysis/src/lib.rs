//! ts-analysis: ridership estimation and spread measurement.

pub mod estimator;
pub mod ridership;
pub mod spread;

pub use estimator::RidershipEstimator;
pub use ridership::RidershipSource;
pub use spread::{SpreadMetric, gini, variance};
