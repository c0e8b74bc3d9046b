//! HTTP REST API endpoints.
//!
//! Implements the permissions management REST API using Axum.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/groups` | POST | Create group |
//! | `/groups` | GET | List groups |
//! | `/groups/{uuid}` | GET | Get group |
//! | `/groups/{uuid}` | DELETE | Delete group (cascades) |
//! | `/groups/{uuid}/members` | POST | Add member group |
//! | `/groups/{uuid}/permissions` | POST | Grant permission to group |
//! | `/groups/{uuid}/permissions` | GET | Effective group permissions |
//! | `/groups/{uuid}/permissions/revoke` | POST | Revoke permission from group |
//! | `/users/{user_id}/permissions` | POST | Grant permission to user |
//! | `/users/{user_id}/permissions/revoke` | POST | Revoke permission from user |
//! | `/my/permissions` | GET | Caller's effective permissions |
//!
//! The caller's identity is read from the `x-user-id` header.

pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_body_limit, DEFAULT_BODY_LIMIT};
pub use state::AppState;
