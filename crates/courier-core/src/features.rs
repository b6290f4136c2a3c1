//! Per-invocation feature-flag lookup.
//!
//! The delivery pipeline hands each invocation a read-only set of flags;
//! actions gate in-flight behavior changes (extra validation, new request
//! fields) on them. Absent flags read as disabled.

use std::collections::HashMap;

/// Read-only flag set supplied per invocation.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags(HashMap<String, bool>);

impl FeatureFlags {
    /// An empty flag set; every lookup returns `false`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the named flag is enabled. Unknown flags are disabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for FeatureFlags {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
