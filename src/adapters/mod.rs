/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the outbound ports:
/// manifest analyzers, vulnerability sources, the file system and the
/// console. The CLI in `main.rs` is the only inbound adapter.
pub mod outbound;
