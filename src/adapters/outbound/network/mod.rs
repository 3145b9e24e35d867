/// Network adapters for the hosted vulnerability source
mod client_id;
mod remote_client;
mod session_cipher;

pub use client_id::{default_key_file, load_or_create_client_id, DEFAULT_CLIENT_ID};
pub use remote_client::RemoteVulnerabilitySource;
pub use session_cipher::SessionCipher;
