use super::{ContentsTransport, DeleteRequest, Lookup, PutRequest, RemoteContent, RemoteFile, WriteReceipt};
use crate::error::{DeskError, Result};
use crate::model::{DirectoryEntry, EntryKind, NoticeRecord, RepositoryLocation};
use crate::notice_id;
use crate::paths::{self, NOTICES_DIR, NOTICE_EXT};
use crate::record::{parse_notice, sort_newest_first};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

const MAX_NOTICE_ID_ATTEMPTS: usize = 5;

/// How reads that fail for reasons other than "not found" are treated by
/// [`ContentClient::exists`] and [`ContentClient::list_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// The failure is logged and treated as absence (missing file, empty
    /// directory).
    #[default]
    Lenient,
    /// The failure surfaces as `DeskError::RemoteRead`.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Existence {
    pub exists: bool,
    /// Present when the path is a file.
    pub sha: Option<String>,
}

/// Files removed by a completed tree delete, in deletion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDeleteReport {
    pub deleted: Vec<String>,
}

/// Maps application operations onto the Contents API.
///
/// The repository location is read once at the start of each operation and
/// passed down, so a multi-request operation always talks to one repository
/// with one credential. Changing it needs `&mut self`, which cannot happen
/// while an operation holds `&self`.
pub struct ContentClient<T: ContentsTransport> {
    transport: T,
    location: Option<RepositoryLocation>,
    policy: ReadPolicy,
}

impl<T: ContentsTransport> ContentClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            location: None,
            policy: ReadPolicy::default(),
        }
    }

    pub fn with_location(mut self, location: RepositoryLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_location(&mut self, location: RepositoryLocation) {
        self.location = Some(location);
    }

    pub fn clear_location(&mut self) {
        self.location = None;
    }

    pub fn set_policy(&mut self, policy: ReadPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Snapshot of the configured location, or `NotConfigured`.
    pub fn location(&self) -> Result<RepositoryLocation> {
        match &self.location {
            Some(location) if location.is_complete() => Ok(location.clone()),
            _ => Err(DeskError::NotConfigured),
        }
    }

    /// Three-state read of `path`: found, not found, or the store could not
    /// say.
    pub fn lookup(&self, path: &str) -> Result<Lookup<RemoteContent>> {
        let location = self.location()?;
        Ok(self.transport.get(&location, path))
    }

    pub fn exists(&self, path: &str) -> Result<Existence> {
        let location = self.location()?;
        self.exists_at(&location, path)
    }

    /// Creates or updates a text file. The text is stored as UTF-8.
    pub fn write_text(&self, path: &str, content: &str, message: &str) -> Result<WriteReceipt> {
        let location = self.location()?;
        self.put_encoded(&location, path, STANDARD.encode(content.as_bytes()), message)
    }

    /// Creates or updates a file with arbitrary bytes.
    pub fn write_binary(&self, path: &str, bytes: &[u8], message: &str) -> Result<WriteReceipt> {
        let location = self.location()?;
        self.put_encoded(&location, path, STANDARD.encode(bytes), message)
    }

    /// Immediate children of `path`. A directory that was never created lists
    /// as empty.
    pub fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let location = self.location()?;
        self.list_at(&location, path)
    }

    pub fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let location = self.location()?;
        self.read_bytes_at(&location, path)
    }

    pub fn read_text(&self, path: &str) -> Result<String> {
        let location = self.location()?;
        self.read_text_at(&location, path)
    }

    /// Deletes one file. `sha` must be the file's current hash.
    pub fn delete_file(&self, path: &str, sha: &str, message: &str) -> Result<WriteReceipt> {
        let location = self.location()?;
        self.delete_at(&location, path, sha, message)
    }

    /// Deletes every file below `path`, one request at a time.
    ///
    /// Not transactional. When a step fails after something was already
    /// removed, the error is `PartialTreeDelete` and the tree is left as it
    /// is; listing it again is the only way to see what remains. Folders are
    /// listed strictly here regardless of [`ReadPolicy`].
    pub fn delete_tree(&self, path: &str) -> Result<TreeDeleteReport> {
        let location = self.location()?;
        let mut deleted = Vec::new();
        match self.delete_tree_at(&location, path, &mut deleted) {
            Ok(()) => Ok(TreeDeleteReport { deleted }),
            Err((_, err)) if deleted.is_empty() => Err(err),
            Err((failed_path, err)) => Err(DeskError::PartialTreeDelete {
                deleted,
                failed_path,
                reason: err.to_string(),
            }),
        }
    }

    /// All readable notices under `Notices/`, newest first.
    ///
    /// Files that cannot be fetched or have fewer than four lines are left
    /// out and logged; they never fail the listing.
    pub fn list_notices(&self) -> Result<Vec<NoticeRecord>> {
        let location = self.location()?;
        let entries = self.list_at(&location, NOTICES_DIR)?;

        let mut notices = Vec::new();
        for entry in entries
            .iter()
            .filter(|e| e.is_file() && e.name.ends_with(NOTICE_EXT))
        {
            let text = match self.read_text_at(&location, &entry.path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "skipping unreadable notice");
                    continue;
                }
            };
            match parse_notice(entry, &text) {
                Some(notice) => notices.push(notice),
                None => warn!(path = %entry.path, "skipping malformed notice"),
            }
        }

        sort_newest_first(&mut notices);
        Ok(notices)
    }

    pub fn generate_notice_id(&self) -> String {
        notice_id::generate()
    }

    /// A notice id whose file does not exist yet.
    pub fn generate_unique_notice_id(&self) -> Result<String> {
        let location = self.location()?;
        for _ in 0..MAX_NOTICE_ID_ATTEMPTS {
            let id = notice_id::generate();
            let path = paths::notice_file(&id)?;
            if !self.exists_at(&location, &path)?.exists {
                return Ok(id);
            }
            debug!(%id, "notice id already taken");
        }
        Err(DeskError::Invalid(
            "Could not generate an unused notice id".to_string(),
        ))
    }

    fn exists_at(&self, location: &RepositoryLocation, path: &str) -> Result<Existence> {
        match self.transport.get(location, path) {
            Lookup::Found(RemoteContent::File(file)) => Ok(Existence {
                exists: true,
                sha: Some(file.sha),
            }),
            Lookup::Found(RemoteContent::Directory(_)) => Ok(Existence {
                exists: true,
                sha: None,
            }),
            Lookup::NotFound => Ok(Existence::default()),
            Lookup::Unavailable(reason) => {
                self.degrade(path, reason, "existence check")?;
                Ok(Existence::default())
            }
        }
    }

    fn list_at(&self, location: &RepositoryLocation, path: &str) -> Result<Vec<DirectoryEntry>> {
        match self.transport.get(location, path) {
            Lookup::Found(RemoteContent::Directory(entries)) => Ok(entries),
            Lookup::Found(RemoteContent::File(_)) | Lookup::NotFound => Ok(Vec::new()),
            Lookup::Unavailable(reason) => {
                self.degrade(path, reason, "directory listing")?;
                Ok(Vec::new())
            }
        }
    }

    /// Applies the read policy to a failed read.
    fn degrade(&self, path: &str, reason: String, what: &str) -> Result<()> {
        match self.policy {
            ReadPolicy::Strict => Err(DeskError::RemoteRead(format!("{}: {}", path, reason))),
            ReadPolicy::Lenient => {
                warn!(%path, %reason, "{} failed, treating as absent", what);
                Ok(())
            }
        }
    }

    fn put_encoded(
        &self,
        location: &RepositoryLocation,
        path: &str,
        content: String,
        message: &str,
    ) -> Result<WriteReceipt> {
        let existing = self.exists_at(location, path)?;
        debug!(%path, update = existing.sha.is_some(), "writing file");
        let request = PutRequest {
            message: message.to_string(),
            content,
            sha: existing.sha,
        };
        self.transport.put(location, path, &request)
    }

    fn read_bytes_at(&self, location: &RepositoryLocation, path: &str) -> Result<Vec<u8>> {
        match self.transport.get(location, path) {
            Lookup::Found(RemoteContent::File(file)) => decode_file(file),
            Lookup::Found(RemoteContent::Directory(_)) => Err(DeskError::RemoteRead(format!(
                "{} is a directory",
                path
            ))),
            Lookup::NotFound => Err(DeskError::RemoteRead(format!("{} not found", path))),
            Lookup::Unavailable(reason) => {
                Err(DeskError::RemoteRead(format!("{}: {}", path, reason)))
            }
        }
    }

    fn read_text_at(&self, location: &RepositoryLocation, path: &str) -> Result<String> {
        let bytes = self.read_bytes_at(location, path)?;
        String::from_utf8(bytes)
            .map_err(|e| DeskError::Decode(format!("{} is not valid UTF-8: {}", path, e)))
    }

    fn delete_at(
        &self,
        location: &RepositoryLocation,
        path: &str,
        sha: &str,
        message: &str,
    ) -> Result<WriteReceipt> {
        debug!(%path, "deleting file");
        let request = DeleteRequest {
            message: message.to_string(),
            sha: sha.to_string(),
        };
        self.transport.delete(location, path, &request)
    }

    fn delete_tree_at(
        &self,
        location: &RepositoryLocation,
        path: &str,
        deleted: &mut Vec<String>,
    ) -> std::result::Result<(), (String, DeskError)> {
        // Listed strictly whatever the read policy: an unreadable sub-folder
        // would otherwise count as empty and the delete as complete.
        let entries = match self.transport.get(location, path) {
            Lookup::Found(RemoteContent::Directory(entries)) => entries,
            Lookup::Found(RemoteContent::File(_)) | Lookup::NotFound => Vec::new(),
            Lookup::Unavailable(reason) => {
                return Err((
                    path.to_string(),
                    DeskError::RemoteRead(format!("{}: {}", path, reason)),
                ));
            }
        };

        for entry in entries {
            match entry.kind {
                EntryKind::File => {
                    let Some(sha) = entry.sha.as_deref() else {
                        debug!(path = %entry.path, "file listed without sha, skipping");
                        continue;
                    };
                    let message = format!("Delete {}", entry.name);
                    self.delete_at(location, &entry.path, sha, &message)
                        .map_err(|e| (entry.path.clone(), e))?;
                    deleted.push(entry.path);
                }
                EntryKind::Directory => self.delete_tree_at(location, &entry.path, deleted)?,
                EntryKind::Other => {
                    debug!(path = %entry.path, "not a file or directory, skipping");
                }
            }
        }
        Ok(())
    }
}

fn decode_file(file: RemoteFile) -> Result<Vec<u8>> {
    if file.encoding.as_deref() == Some("none") {
        return Err(DeskError::RemoteRead(format!(
            "{} is too large to be fetched inline",
            file.path
        )));
    }
    let compact: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| DeskError::Decode(format!("{} is not valid base64: {}", file.path, e)))
}
