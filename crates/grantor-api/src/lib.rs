//! grantor-api: HTTP API and service facade
//!
//! This crate provides the outer layer of the grantor permissions service:
//! - The `AuthorizationService` facade composing storage and resolution
//! - HTTP REST endpoints via Axum
//! - Server configuration and structured logging
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                grantor-api                   │
//! ├─────────────────────────────────────────────┤
//! │  service.rs    - AuthorizationService facade │
//! │  http/         - HTTP REST endpoints         │
//! │  adapters.rs   - storage-to-domain bridges   │
//! │  config.rs     - server configuration        │
//! │  observability - structured logging          │
//! └─────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod http;
pub mod observability;
pub mod service;

pub use config::ServerConfig;
pub use service::{AccessPolicy, AuthorizationService, Group};
