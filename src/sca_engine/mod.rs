//! Dependency graph construction and vulnerability matching, free of I/O
pub mod domain;
pub mod services;
