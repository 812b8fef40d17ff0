use crate::config::DeskConfig;
use crate::model::{DirectoryEntry, NoticeRecord};
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;

pub mod achievements;
pub mod config;
pub mod folders;
pub mod gallery;
pub mod notices;
pub mod uploads;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Written,
    Failed(String),
    /// Not attempted because an earlier step failed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub path: String,
    pub status: ItemStatus,
}

/// Per-file outcome of a multi-file write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Written))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Skipped))
    }

    pub fn failure(&self) -> Option<(&str, &str)> {
        self.items.iter().find_map(|item| match &item.status {
            ItemStatus::Failed(reason) => Some((item.path.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failure().is_none()
    }

    fn count(&self, pred: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.status)).count()
    }
}

/// Immediate sub-folders of one managed root.
#[derive(Debug, Clone, Default)]
pub struct ManagedFolder {
    pub root: String,
    pub folders: Vec<DirectoryEntry>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    pub notices: Vec<NoticeRecord>,
    pub folders: Vec<ManagedFolder>,
    pub batch: Option<BatchReport>,
    pub deleted_paths: Vec<String>,
    pub notice_id: Option<String>,
    pub config: Option<DeskConfig>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_notices(mut self, notices: Vec<NoticeRecord>) -> Self {
        self.notices = notices;
        self
    }

    pub fn with_folders(mut self, folders: Vec<ManagedFolder>) -> Self {
        self.folders = folders;
        self
    }

    pub fn with_notice_id(mut self, id: String) -> Self {
        self.notice_id = Some(id);
        self
    }

    pub fn with_config(mut self, config: DeskConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// A single banner for the whole batch: success when every file was
    /// written, otherwise how far it got and why it stopped.
    pub fn from_batch(report: BatchReport, success: impl Into<String>) -> Self {
        let mut result = CmdResult::default();
        match report.failure() {
            None => result.add_message(CmdMessage::success(success)),
            Some((path, reason)) => {
                result.add_message(CmdMessage::error(format!(
                    "Failed writing {}: {}",
                    path, reason
                )));
                result.add_message(CmdMessage::warning(format!(
                    "{} of {} file(s) were written before the failure, {} not attempted",
                    report.written(),
                    report.items.len(),
                    report.skipped()
                )));
            }
        }
        result.batch = Some(report);
        result
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

pub(crate) enum Payload<'a> {
    Text(String),
    Binary(&'a [u8]),
}

pub(crate) struct WriteStep<'a> {
    pub path: String,
    pub payload: Payload<'a>,
    pub message: String,
}

impl<'a> WriteStep<'a> {
    pub fn text(path: String, text: String, message: String) -> Self {
        Self {
            path,
            payload: Payload::Text(text),
            message,
        }
    }

    pub fn binary(path: String, bytes: &'a [u8], message: String) -> Self {
        Self {
            path,
            payload: Payload::Binary(bytes),
            message,
        }
    }
}

/// Runs writes in order, one at a time. The first failure stops the batch;
/// files already written stay written.
pub(crate) fn write_all<T: ContentsTransport>(
    client: &ContentClient<T>,
    steps: Vec<WriteStep<'_>>,
) -> BatchReport {
    let mut report = BatchReport::default();
    let mut failed = false;

    for step in steps {
        if failed {
            report.items.push(BatchItem {
                path: step.path,
                status: ItemStatus::Skipped,
            });
            continue;
        }

        let outcome = match &step.payload {
            Payload::Text(text) => client.write_text(&step.path, text, &step.message),
            Payload::Binary(bytes) => client.write_binary(&step.path, bytes, &step.message),
        };
        let status = match outcome {
            Ok(_) => ItemStatus::Written,
            Err(e) => {
                failed = true;
                ItemStatus::Failed(e.to_string())
            }
        };
        report.items.push(BatchItem {
            path: step.path,
            status,
        });
    }

    report
}

pub(crate) fn require_title(title: &str) -> crate::error::Result<()> {
    if title.trim().is_empty() {
        return Err(crate::error::DeskError::Invalid(
            "Title cannot be empty".to_string(),
        ));
    }
    Ok(())
}
