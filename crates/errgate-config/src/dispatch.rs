use serde::Deserialize;

/// How handler failures are turned into responses
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Status for bare errors that carry no status of their own
    #[serde(default = "default_fallback_status")]
    pub fallback_status: u16,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fallback_status: default_fallback_status(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_fallback_status() -> u16 {
    500
}
