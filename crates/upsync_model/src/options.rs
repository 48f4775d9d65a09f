//! Merge policy and sync options.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Policy governing who wins when both sides changed a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeMode {
    /// Local changes overwrite remote changes unconditionally.
    #[default]
    Overwrite,
    /// Push only when the local record is strictly newer than the remote one.
    LeaveIfChanged,
}

impl MergeMode {
    /// Returns the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Overwrite => "OVERWRITE",
            MergeMode::LeaveIfChanged => "LEAVE_IF_CHANGED",
        }
    }
}

impl FromStr for MergeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OVERWRITE" => Ok(MergeMode::Overwrite),
            "LEAVE_IF_CHANGED" => Ok(MergeMode::LeaveIfChanged),
            _ => Err(()),
        }
    }
}

/// Immutable per-run sync configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Merge policy for this run.
    pub merge_mode: MergeMode,
    /// Optional allowlist restricting which fields are sent upstream.
    ///
    /// `None` sends every field of a record.
    pub fieldlist: Option<Vec<String>>,
}

impl SyncOptions {
    /// Creates options with the given merge mode and no field allowlist.
    pub fn new(merge_mode: MergeMode) -> Self {
        Self {
            merge_mode,
            fieldlist: None,
        }
    }

    /// Sets the field allowlist.
    pub fn with_fieldlist(mut self, fieldlist: Vec<String>) -> Self {
        self.fieldlist = Some(fieldlist);
        self
    }

    /// Returns the field allowlist as a slice, if set.
    pub fn fieldlist(&self) -> Option<&[String]> {
        self.fieldlist.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_mode_strings() {
        assert_eq!(MergeMode::Overwrite.as_str(), "OVERWRITE");
        assert_eq!(MergeMode::LeaveIfChanged.as_str(), "LEAVE_IF_CHANGED");
        assert_eq!("OVERWRITE".parse(), Ok(MergeMode::Overwrite));
        assert_eq!("LEAVE_IF_CHANGED".parse(), Ok(MergeMode::LeaveIfChanged));
        assert_eq!("SOMETHING_ELSE".parse::<MergeMode>(), Err(()));
    }

    #[test]
    fn merge_mode_serde() {
        let encoded = serde_json::to_string(&MergeMode::LeaveIfChanged).unwrap();
        assert_eq!(encoded, "\"LEAVE_IF_CHANGED\"");
        let decoded: MergeMode = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, MergeMode::LeaveIfChanged);
    }

    #[test]
    fn options_builder() {
        let options = SyncOptions::new(MergeMode::LeaveIfChanged)
            .with_fieldlist(vec!["Name".into(), "Phone".into()]);

        assert_eq!(options.merge_mode, MergeMode::LeaveIfChanged);
        assert_eq!(
            options.fieldlist(),
            Some(&["Name".to_string(), "Phone".to_string()][..])
        );

        let defaults = SyncOptions::default();
        assert_eq!(defaults.merge_mode, MergeMode::Overwrite);
        assert_eq!(defaults.fieldlist(), None);
    }
}
