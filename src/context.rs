// SPDX-License-Identifier: GPL-3.0-only
use crate::config::settings::StoreSettings;

/// Who an operation acts as, and whether it may write sync state.
///
/// Passed explicitly into every flow and import so that records are
/// attributed to the identity that triggered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    identity: String,
    can_write: bool,
}

impl OperationContext {
    pub fn new(identity: impl Into<String>, can_write: bool) -> Self {
        Self {
            identity: identity.into(),
            can_write,
        }
    }

    /// Context of scheduled runs and accepted webhooks: the configured default identity.
    pub fn default_identity(settings: &StoreSettings) -> Self {
        Self::new(settings.default_identity.clone(), true)
    }

    pub fn read_only(identity: impl Into<String>) -> Self {
        Self::new(identity, false)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn can_write(&self) -> bool {
        self.can_write
    }
}
