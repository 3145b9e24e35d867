use crate::sca_engine::domain::{DependencyIdentity, VulnerabilityRecord};
use crate::shared::error::ScaError;
use async_trait::async_trait;

/// VulnerabilitySource port for batch vulnerability lookups
///
/// A source receives the distinct identities of a scan and answers with one
/// record list per identity. The result is index-aligned with the input; a
/// shorter result is treated as "nothing known" for the missing positions.
///
/// Records with an empty `id` carry license information instead of a
/// vulnerability (see [`VulnerabilityRecord::license_hint`]).
#[async_trait]
pub trait VulnerabilitySource: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// # Errors
    /// `ScaError::LocalSource` or `ScaError::RemoteQuery` depending on the
    /// kind of source
    async fn lookup(
        &self,
        identities: &[DependencyIdentity],
    ) -> Result<Vec<Vec<VulnerabilityRecord>>, ScaError>;
}
