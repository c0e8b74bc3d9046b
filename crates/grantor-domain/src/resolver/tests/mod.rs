//! Resolver test suite.
