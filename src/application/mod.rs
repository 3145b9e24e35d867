/// Application layer - Use cases and DTOs
///
/// This layer orchestrates the scan engine and talks to infrastructure
/// through ports only.
pub mod analyzer_registry;
pub mod dto;
pub mod factories;
pub mod use_cases;

pub use analyzer_registry::AnalyzerRegistry;
