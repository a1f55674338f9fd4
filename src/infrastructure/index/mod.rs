//! Vector index adapters

mod in_memory;
mod redis;

pub use in_memory::InMemoryVectorIndex;
pub use self::redis::{RedisIndexConfig, RedisVectorIndex};
