//! Vector index and cache store traits

mod repository;

pub use repository::{CacheStore, DistanceMetric, IndexSpec, Neighbor, VectorIndex};
