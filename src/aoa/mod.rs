pub mod estimator;

pub use estimator::{max_rss, weighted_rss, AoaEstimator, Reading};
