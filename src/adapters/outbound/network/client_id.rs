use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Identifier sent when no persisted one can be used
pub const DEFAULT_CLIENT_ID: &str = "XXXXXXXXXXXXXXXX";
const CLIENT_ID_LEN: usize = 16;

/// `.key` next to the running executable, or in the working directory
pub fn default_key_file() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".key")))
        .unwrap_or_else(|| PathBuf::from(".key"))
}

pub fn is_valid_client_id(id: &str) -> bool {
    id.len() == CLIENT_ID_LEN && id.bytes().all(|b| b.is_ascii_uppercase())
}

/// Random identifier of 16 uppercase ASCII letters
pub fn generate_client_id() -> String {
    let mut rng = rand::thread_rng();
    (0..CLIENT_ID_LEN)
        .map(|_| rng.gen_range(b'A'..=b'Z') as char)
        .collect()
}

/// Reads the persisted client id, creating or replacing it when missing or
/// malformed. Falls back to [`DEFAULT_CLIENT_ID`] if the file cannot be
/// written.
pub fn load_or_create_client_id(path: &Path) -> String {
    if let Ok(content) = fs::read_to_string(path) {
        let id = content.trim();
        if is_valid_client_id(id) {
            return id.to_string();
        }
        tracing::warn!(path = %path.display(), "client id file is malformed, regenerating");
    }

    let id = generate_client_id();
    match fs::write(path, &id) {
        Ok(()) => id,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot persist client id");
            DEFAULT_CLIENT_ID.to_string()
        }
    }
}
