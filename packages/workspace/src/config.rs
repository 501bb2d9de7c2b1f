use std::time::Duration;

pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1500;

/// Runtime settings for open documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Idle time after the last edit before an autosave fires
    pub autosave_delay: Duration,
}

impl WorkspaceConfig {
    pub fn with_autosave_delay_ms(millis: u64) -> Self {
        Self {
            autosave_delay: Duration::from_millis(millis),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self::with_autosave_delay_ms(DEFAULT_AUTOSAVE_DELAY_MS)
    }
}
