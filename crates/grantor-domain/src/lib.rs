//! grantor-domain: Core permission-resolution logic
//!
//! This crate contains the core domain logic including:
//! - Permission and principal value types
//! - Cycle-safe resolution engine over the membership graph
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               grantor-domain                 │
//! ├─────────────────────────────────────────────┤
//! │  model.rs    - Permission & principal types │
//! │  resolver/   - Membership-graph resolution  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod model;
pub mod resolver;

// Re-export commonly used types at the crate root
pub use error::{DomainError, DomainResult};
pub use model::{Permission, Principal, RESOURCE_TYPE_GROUP, SELF_KEY};
