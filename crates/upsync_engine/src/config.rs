//! Configuration for a sync-up run.

use upsync_model::{MergeMode, SyncOptions};

/// Configuration for one sync-up task.
#[derive(Debug, Clone)]
pub struct SyncUpConfig {
    /// Remote collection the records belong to.
    pub collection: String,
    /// Merge policy and field allowlist.
    pub options: SyncOptions,
}

impl SyncUpConfig {
    /// Creates a configuration for the given collection with default options.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            options: SyncOptions::default(),
        }
    }

    /// Sets the sync options.
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the merge mode, keeping the rest of the options.
    pub fn with_merge_mode(mut self, merge_mode: MergeMode) -> Self {
        self.options.merge_mode = merge_mode;
        self
    }

    /// Sets the field allowlist, keeping the rest of the options.
    pub fn with_fieldlist(mut self, fieldlist: Vec<String>) -> Self {
        self.options.fieldlist = Some(fieldlist);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SyncUpConfig::new("accounts")
            .with_merge_mode(MergeMode::LeaveIfChanged)
            .with_fieldlist(vec!["Name".into()]);

        assert_eq!(config.collection, "accounts");
        assert_eq!(config.options.merge_mode, MergeMode::LeaveIfChanged);
        assert_eq!(config.options.fieldlist(), Some(&["Name".to_string()][..]));
    }

    #[test]
    fn config_defaults() {
        let config = SyncUpConfig::new("contacts");
        assert_eq!(config.options.merge_mode, MergeMode::Overwrite);
        assert_eq!(config.options.fieldlist(), None);
    }
}
