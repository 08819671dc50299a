//! Per-file actions offered in the file menu.
//!
//! The action set is closed. Whether an action opens a dialog, and whether that dialog has a
//! submit button, is decided here and nowhere else.

use crate::models::FileRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storeit_types::EmailAddress;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Rename,
    Details,
    Share,
    Download,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file action '{0}'")]
pub struct ParseFileActionError(pub String);

impl FileAction {
    /// Menu order.
    pub const ALL: [FileAction; 5] = [
        FileAction::Rename,
        FileAction::Details,
        FileAction::Share,
        FileAction::Download,
        FileAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileAction::Rename => "rename",
            FileAction::Details => "details",
            FileAction::Share => "share",
            FileAction::Download => "download",
            FileAction::Delete => "delete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileAction::Rename => "Rename",
            FileAction::Details => "Details",
            FileAction::Share => "Share",
            FileAction::Download => "Download",
            FileAction::Delete => "Delete",
        }
    }

    /// Download is a plain link; every other action opens a dialog.
    pub fn requires_dialog(&self) -> bool {
        match self {
            FileAction::Rename | FileAction::Details | FileAction::Share | FileAction::Delete => {
                true
            }
            FileAction::Download => false,
        }
    }

    /// Dialogs that change the file carry a submit button; Details is read-only.
    pub fn requires_submit(&self) -> bool {
        match self {
            FileAction::Rename | FileAction::Share | FileAction::Delete => true,
            FileAction::Details | FileAction::Download => false,
        }
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileAction {
    type Err = ParseFileActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseFileActionError(s.to_string()))
    }
}

/// An action together with the input its dialog collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    /// New file name without the extension.
    Rename { name: String },
    Details,
    /// Complete new share list.
    Share { emails: Vec<EmailAddress> },
    Download,
    Delete,
}

impl ActionRequest {
    pub fn action(&self) -> FileAction {
        match self {
            ActionRequest::Rename { .. } => FileAction::Rename,
            ActionRequest::Details => FileAction::Details,
            ActionRequest::Share { .. } => FileAction::Share,
            ActionRequest::Download => FileAction::Download,
            ActionRequest::Delete => FileAction::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Renamed(FileRecord),
    Details(FileRecord),
    Shared(FileRecord),
    Download { url: String, file_name: String },
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_actions() {
        let dialog: Vec<_> = FileAction::ALL
            .into_iter()
            .filter(FileAction::requires_dialog)
            .collect();
        assert_eq!(
            dialog,
            [
                FileAction::Rename,
                FileAction::Details,
                FileAction::Share,
                FileAction::Delete
            ]
        );
    }

    #[test]
    fn test_submit_actions_are_dialog_actions() {
        for action in FileAction::ALL {
            if action.requires_submit() {
                assert!(action.requires_dialog(), "{action} submits without a dialog");
            }
        }
        assert!(!FileAction::Details.requires_submit());
    }

    #[test]
    fn test_parse_action() {
        for action in FileAction::ALL {
            assert_eq!(action.as_str().parse::<FileAction>(), Ok(action));
        }
        assert!("archive".parse::<FileAction>().is_err());
    }

    #[test]
    fn test_request_maps_to_action() {
        assert_eq!(
            ActionRequest::Rename { name: "x".into() }.action(),
            FileAction::Rename
        );
        assert_eq!(
            ActionRequest::Share { emails: vec![] }.action(),
            FileAction::Share
        );
        assert_eq!(ActionRequest::Delete.action(), FileAction::Delete);
    }
}
