//! Registry configuration

use attest_store::DEFAULT_COMMIT_ATTEMPTS;

/// Configuration for the status registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Commit attempts per operation before surfacing `TransientStore`
    pub max_commit_attempts: u32,

    /// Whether to attempt geo/ISP enrichment on the create path
    pub enrichment_enabled: bool,

    /// Whether a successful submission dispatches a reviewer notification
    pub notify_on_submit: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: DEFAULT_COMMIT_ATTEMPTS,
            enrichment_enabled: true,
            notify_on_submit: true,
        }
    }
}
