use crate::error::{DeskError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which repository the client targets, and the credential used to reach it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLocation {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

impl RepositoryLocation {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    /// A location is usable only when none of its parts is blank.
    pub fn is_complete(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty() && !self.token.trim().is_empty()
    }
}

// The token never ends up in logs.
impl fmt::Debug for RepositoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryLocation")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(rename = "dir")]
    Directory,
    /// Symlinks and submodules. Listed, never modified.
    #[serde(other)]
    Other,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub sha: Option<String>,
}

impl DirectoryEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Raw bytes of a user-supplied file, stored verbatim under its original name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAsset {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl BinaryAsset {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementCategory {
    Achievements,
    Activity,
}

impl AchievementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementCategory::Achievements => "Achievements",
            AchievementCategory::Activity => "Activity",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementCategory {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "achievements" | "achievement" => Ok(AchievementCategory::Achievements),
            "activity" => Ok(AchievementCategory::Activity),
            other => Err(DeskError::Invalid(format!(
                "Unknown achievement category '{}' (expected Achievements or Activity)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeCategory {
    General,
    Urgent,
    Meeting,
    Event,
    Announcement,
    Holiday,
    Training,
    Other,
}

impl NoticeCategory {
    pub const ALL: [NoticeCategory; 8] = [
        NoticeCategory::General,
        NoticeCategory::Urgent,
        NoticeCategory::Meeting,
        NoticeCategory::Event,
        NoticeCategory::Announcement,
        NoticeCategory::Holiday,
        NoticeCategory::Training,
        NoticeCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeCategory::General => "General",
            NoticeCategory::Urgent => "Urgent",
            NoticeCategory::Meeting => "Meeting",
            NoticeCategory::Event => "Event",
            NoticeCategory::Announcement => "Announcement",
            NoticeCategory::Holiday => "Holiday",
            NoticeCategory::Training => "Training",
            NoticeCategory::Other => "Other",
        }
    }
}

impl fmt::Display for NoticeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeCategory {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        NoticeCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = NoticeCategory::ALL.iter().map(|c| c.as_str()).collect();
                DeskError::Invalid(format!(
                    "Unknown notice category '{}' (expected one of {})",
                    wanted,
                    names.join(", ")
                ))
            })
    }
}

/// An achievement as entered by staff. Stored at `Achievements/<folder>/data.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub folder: String,
    pub title: String,
    pub category: AchievementCategory,
    pub date: NaiveDate,
    pub description: String,
}

/// Metadata for an upload folder. Stored at `Uploads/<folder>/data.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFolder {
    pub folder: String,
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// A notice to be published. Without an id, one is generated on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    pub category: NoticeCategory,
    pub pinned: bool,
    pub content: String,
}

/// A notice read back from `Notices/<id>.txt`.
///
/// Category and date are kept as stored: records written by other tools may
/// carry values this crate would not produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeRecord {
    pub id: String,
    pub name: String,
    pub path: String,
    pub sha: String,
    pub title: String,
    pub date: String,
    pub category: String,
    pub pinned: bool,
    pub content: String,
}

impl NoticeRecord {
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        crate::record::parse_calendar_date(&self.date)
    }
}
