//! grantor-storage: Storage abstraction layer
//!
//! This crate provides the storage abstraction for grantor, including:
//! - AuthStore trait for group, membership and grant operations
//! - In-memory implementation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              grantor-storage                 │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs   - AuthStore trait definition   │
//! │  memory.rs   - In-memory implementation     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryAuthStore;
pub use traits::{
    AuthStore, GranteeRef, GroupRecord, HealthStatus, StoredGrant, RESOURCE_TYPE_GROUP,
};
