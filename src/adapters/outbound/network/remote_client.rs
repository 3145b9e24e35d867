use super::session_cipher::{SessionCipher, NONCE_SIZE};
use crate::ports::outbound::VulnerabilitySource;
use crate::sca_engine::domain::{DependencyIdentity, Language, VulnerabilityRecord};
use crate::shared::error::ScaError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const KEY_PATH: &str = "/oss-saas/api-v1/open-sca-client/aes-key";
const DETECT_PATH: &str = "/oss-saas/api-v1/open-sca-client/detect";

/// Response wrapper used by every endpoint; non-zero `code` is a failure
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// Encrypted body, in both directions
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SealedPayload {
    aes_message: String,
    aes_tag: String,
    aes_nonce: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectRequest<'a> {
    #[serde(flatten)]
    payload: SealedPayload,
    oss_token: &'a str,
    client_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ComponentQuery<'a> {
    vendor: &'a str,
    name: &'a str,
    version: &'a str,
    language: Language,
}

/// RemoteVulnerabilitySource adapter for the hosted detection service
///
/// Every lookup fetches a fresh session key, sends the component list
/// AES-GCM encrypted and decrypts the index-aligned answer.
///
/// # Security
/// - The token only travels as a query parameter of the key request and in
///   the encrypted request body
/// - Requests time out after the configured duration
/// - Failed requests are not retried
pub struct RemoteVulnerabilitySource {
    client: reqwest::Client,
    base_url: String,
    token: String,
    client_id: String,
}

impl RemoteVulnerabilitySource {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// # Errors
    /// `ScaError::RemoteQuery` if the HTTP client cannot be built
    pub fn new(
        base_url: &str,
        token: &str,
        client_id: String,
        timeout: Duration,
    ) -> Result<Self, ScaError> {
        let user_agent = format!("depscan/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(ScaError::remote)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client_id,
        })
    }

    fn key_url(&self) -> String {
        format!(
            "{}{}?clientId={}&ossToken={}",
            self.base_url,
            KEY_PATH,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.token)
        )
    }

    fn detect_url(&self) -> String {
        format!("{}{}", self.base_url, DETECT_PATH)
    }

    async fn fetch_session_key(&self) -> Result<Vec<u8>, ScaError> {
        let url = self.key_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ScaError::remote)?;
        let body = Self::read_body(response, KEY_PATH).await?;
        let key: String = decode_envelope(&body, KEY_PATH)?
            .ok_or_else(|| ScaError::remote("session key response carried no key"))?;
        Ok(key.into_bytes())
    }

    async fn detect(&self, plaintext: &[u8]) -> Result<Vec<u8>, ScaError> {
        let cipher = SessionCipher::new(&self.fetch_session_key().await?)?;

        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        let (ciphertext, tag) = cipher.seal(&nonce, plaintext)?;

        let request = DetectRequest {
            payload: SealedPayload {
                aes_message: general_purpose::STANDARD.encode(ciphertext),
                aes_tag: general_purpose::STANDARD.encode(tag),
                aes_nonce: general_purpose::STANDARD.encode(nonce),
            },
            oss_token: &self.token,
            client_id: &self.client_id,
        };

        let response = self
            .client
            .post(self.detect_url())
            .header("Detect-Type", "dependency")
            .json(&request)
            .send()
            .await
            .map_err(ScaError::remote)?;
        let body = Self::read_body(response, DETECT_PATH).await?;

        match decode_envelope::<SealedPayload>(&body, DETECT_PATH)? {
            Some(sealed) => open_payload(&cipher, &sealed),
            None => Ok(Vec::new()),
        }
    }

    async fn read_body(response: reqwest::Response, path: &str) -> Result<String, ScaError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ScaError::remote(format!("{} status code: {}", path, status.as_u16())));
        }
        response.text().await.map_err(ScaError::remote)
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &str, path: &str) -> Result<Option<T>, ScaError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| ScaError::remote(format!("{}: unexpected response: {}", path, e)))?;
    if envelope.code != 0 {
        tracing::warn!(
            path,
            code = envelope.code,
            message = %envelope.message,
            "remote source rejected request"
        );
        return Err(ScaError::remote(format!(
            "{} code {}: {}",
            path, envelope.code, envelope.message
        )));
    }
    Ok(envelope.data)
}

fn open_payload(cipher: &SessionCipher, sealed: &SealedPayload) -> Result<Vec<u8>, ScaError> {
    let decode = |field: &str, value: &str| {
        general_purpose::STANDARD
            .decode(value)
            .map_err(|e| ScaError::remote(format!("invalid base64 in {}: {}", field, e)))
    };
    let ciphertext = decode("aesMessage", &sealed.aes_message)?;
    let tag = decode("aesTag", &sealed.aes_tag)?;
    let nonce = decode("aesNonce", &sealed.aes_nonce)?;
    cipher.open(&nonce, &ciphertext, &tag)
}

fn encode_components(identities: &[DependencyIdentity]) -> Result<Vec<u8>, ScaError> {
    let queries: Vec<ComponentQuery<'_>> = identities
        .iter()
        .map(|id| ComponentQuery {
            vendor: &id.vendor,
            name: &id.name,
            version: &id.version,
            language: id.language,
        })
        .collect();
    serde_json::to_vec(&queries).map_err(ScaError::remote)
}

fn decode_records(plaintext: &[u8]) -> Result<Vec<Vec<VulnerabilityRecord>>, ScaError> {
    if plaintext.is_empty() {
        return Ok(Vec::new());
    }
    let records: Option<Vec<Option<Vec<VulnerabilityRecord>>>> = serde_json::from_slice(plaintext)
        .map_err(|e| ScaError::remote(format!("undecodable detection result: {}", e)))?;
    Ok(records
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

#[async_trait]
impl VulnerabilitySource for RemoteVulnerabilitySource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn lookup(
        &self,
        identities: &[DependencyIdentity],
    ) -> Result<Vec<Vec<VulnerabilityRecord>>, ScaError> {
        if identities.is_empty() {
            return Ok(Vec::new());
        }
        let request = encode_components(identities)?;
        tracing::debug!(
            components = identities.len(),
            url = %self.base_url,
            "querying remote source"
        );
        let plaintext = self.detect(&request).await?;
        decode_records(&plaintext)
    }
}
