//! Configuration for the permission resolver.

/// Configuration for the permission resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum number of groups a single traversal may visit.
    ///
    /// The visited-set already guarantees termination on cyclic graphs; this
    /// bound additionally caps memory and latency on pathologically large
    /// membership graphs.
    pub max_visited: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_visited: 10_000 }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with the specified visit bound.
    pub fn with_max_visited(mut self, max_visited: usize) -> Self {
        self.max_visited = max_visited;
        self
    }
}
