use crate::shared::error::ScaError;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use aes_gcm::{AesGcm, Nonce};

/// Nonce length used by the remote detection endpoint
pub const NONCE_SIZE: usize = 16;
/// GCM authentication tag length
pub const TAG_SIZE: usize = 16;

type Gcm128 = AesGcm<Aes128, U16>;
type Gcm192 = AesGcm<Aes192, U16>;
type Gcm256 = AesGcm<Aes256, U16>;

/// AES-GCM cipher keyed with the per-session key handed out by the remote
/// source; the key length selects the AES variant.
pub enum SessionCipher {
    Aes128(Box<Gcm128>),
    Aes192(Box<Gcm192>),
    Aes256(Box<Gcm256>),
}

impl SessionCipher {
    /// # Errors
    /// `ScaError::RemoteQuery` unless the key is 16, 24 or 32 bytes long
    pub fn new(key: &[u8]) -> Result<Self, ScaError> {
        let invalid = |_| ScaError::remote(format!("invalid session key length {}", key.len()));
        match key.len() {
            16 => Gcm128::new_from_slice(key)
                .map(|c| Self::Aes128(Box::new(c)))
                .map_err(invalid),
            24 => Gcm192::new_from_slice(key)
                .map(|c| Self::Aes192(Box::new(c)))
                .map_err(invalid),
            32 => Gcm256::new_from_slice(key)
                .map(|c| Self::Aes256(Box::new(c)))
                .map_err(invalid),
            other => Err(ScaError::remote(format!("invalid session key length {}", other))),
        }
    }

    /// Encrypts `plaintext`, returning the ciphertext and the detached tag
    pub fn seal(
        &self,
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), ScaError> {
        let nonce = Nonce::<U16>::from_slice(nonce);
        let mut sealed = match self {
            Self::Aes128(c) => c.encrypt(nonce, plaintext),
            Self::Aes192(c) => c.encrypt(nonce, plaintext),
            Self::Aes256(c) => c.encrypt(nonce, plaintext),
        }
        .map_err(|_| ScaError::remote("failed to encrypt request"))?;

        let tag = sealed.split_off(sealed.len() - TAG_SIZE);
        Ok((sealed, tag))
    }

    /// Verifies and decrypts a ciphertext with a detached tag
    pub fn open(&self, nonce: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>, ScaError> {
        if nonce.len() != NONCE_SIZE || tag.len() != TAG_SIZE {
            return Err(ScaError::remote(format!(
                "malformed response: nonce {} bytes, tag {} bytes",
                nonce.len(),
                tag.len()
            )));
        }
        let nonce = Nonce::<U16>::from_slice(nonce);
        let mut combined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
        combined.extend_from_slice(ciphertext);
        combined.extend_from_slice(tag);

        match self {
            Self::Aes128(c) => c.decrypt(nonce, combined.as_ref()),
            Self::Aes192(c) => c.decrypt(nonce, combined.as_ref()),
            Self::Aes256(c) => c.decrypt(nonce, combined.as_ref()),
        }
        .map_err(|_| ScaError::remote("failed to decrypt response"))
    }
}
