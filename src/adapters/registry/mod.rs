//! Known-Member Registry adapters.
//!
//! - `InMemoryMemberRegistry` - inline config or a YAML/JSON file
//! - `RedisMemberRegistry` - shared store for multi-instance deployments

mod in_memory;
mod redis;

pub use in_memory::{InMemoryMemberRegistry, MemberEntry};
pub use self::redis::{RedisMemberRegistry, DEFAULT_KEY_PREFIX};
