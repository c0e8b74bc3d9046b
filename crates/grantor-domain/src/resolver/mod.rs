//! Permission resolution over the group-membership graph.

mod config;
mod engine;
mod traits;

#[cfg(test)]
mod tests;

pub use config::ResolverConfig;
pub use engine::{PermissionMap, PermissionResolver};
pub use traits::{GrantReader, MembershipReader};
