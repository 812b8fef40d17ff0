use super::{
    ContentsTransport, DeleteRequest, Lookup, PutRequest, RemoteContent, RemoteFile, WriteReceipt,
};
use crate::error::{DeskError, Result};
use crate::model::{DirectoryEntry, EntryKind, RepositoryLocation};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

/// One exchange as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub sha: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    sha: String,
}

/// In-memory Contents API for tests.
///
/// Behaves like the remote store where it matters: writes to an existing path
/// need its current sha, deletes need it too, directories only exist through
/// the files below them, and file contents come back as line-wrapped base64.
/// Every request is recorded so tests can assert on exactly what was sent.
///
/// Uses `RefCell` since the transport is driven from a single thread and the
/// trait takes `&self`.
#[derive(Default)]
pub struct MemoryTransport {
    blobs: RefCell<BTreeMap<String, StoredBlob>>,
    requests: RefCell<Vec<RecordedRequest>>,
    unavailable_paths: RefCell<HashSet<String>>,
    failing_writes: RefCell<HashSet<String>>,
    commits: Cell<u64>,
    api_base: Option<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a file directly, without recording a request. Returns its sha.
    pub fn seed(&self, path: &str, bytes: impl Into<Vec<u8>>) -> String {
        let path = normalize(path);
        let bytes = bytes.into();
        let sha = self.next_sha(&path, &bytes);
        self.blobs.borrow_mut().insert(
            path,
            StoredBlob {
                bytes,
                sha: sha.clone(),
            },
        );
        sha
    }

    /// Reads of `path` (or anything below it) report the store as unavailable.
    pub fn set_unavailable(&self, path: &str) {
        self.unavailable_paths.borrow_mut().insert(normalize(path));
    }

    /// Writes and deletes of exactly `path` are rejected.
    pub fn fail_writes_to(&self, path: &str) {
        self.failing_writes.borrow_mut().insert(normalize(path));
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(&normalize(path)).map(|b| b.bytes.clone())
    }

    pub fn sha_of(&self, path: &str) -> Option<String> {
        self.blobs.borrow().get(&normalize(path)).map(|b| b.sha.clone())
    }

    pub fn paths(&self) -> Vec<String> {
        self.blobs.borrow().keys().cloned().collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_of(&self, method: Method) -> Vec<RecordedRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// The API root last handed to [`ContentsTransport::set_api_base`].
    pub fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref()
    }

    fn record(&self, method: Method, path: &str, sha: Option<&str>, message: Option<&str>) {
        self.requests.borrow_mut().push(RecordedRequest {
            method,
            path: normalize(path),
            sha: sha.map(str::to_string),
            message: message.map(str::to_string),
        });
    }

    fn next_sha(&self, path: &str, bytes: &[u8]) -> String {
        let n = self.commits.get() + 1;
        self.commits.set(n);
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        bytes.hash(&mut hasher);
        n.hash(&mut hasher);
        format!("{:016x}{:08x}", hasher.finish(), n)
    }

    fn commit_sha(&self) -> String {
        format!("commit-{}", self.commits.get())
    }

    fn is_unavailable(&self, path: &str) -> bool {
        self.unavailable_paths
            .borrow()
            .iter()
            .any(|p| path == p || path.starts_with(&format!("{}/", p)) || p.is_empty())
    }

    fn list(&self, dir: &str) -> Vec<DirectoryEntry> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };
        let blobs = self.blobs.borrow();
        let mut entries: BTreeMap<String, DirectoryEntry> = BTreeMap::new();
        for (path, blob) in blobs.iter() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                None => {
                    entries.insert(
                        rest.to_string(),
                        DirectoryEntry {
                            name: rest.to_string(),
                            path: path.clone(),
                            kind: EntryKind::File,
                            sha: Some(blob.sha.clone()),
                        },
                    );
                }
                Some((sub, _)) => {
                    entries
                        .entry(sub.to_string())
                        .or_insert_with(|| DirectoryEntry {
                            name: sub.to_string(),
                            path: format!("{}{}", prefix, sub),
                            kind: EntryKind::Directory,
                            sha: None,
                        });
                }
            }
        }
        entries.into_values().collect()
    }
}

impl ContentsTransport for MemoryTransport {
    fn get(&self, _location: &RepositoryLocation, path: &str) -> Lookup<RemoteContent> {
        let path = normalize(path);
        self.record(Method::Get, &path, None, None);

        if self.is_unavailable(&path) {
            return Lookup::Unavailable("Service unavailable".to_string());
        }

        if let Some(blob) = self.blobs.borrow().get(&path) {
            let name = path.rsplit('/').next().unwrap_or(&path).to_string();
            return Lookup::Found(RemoteContent::File(RemoteFile {
                name,
                path: path.clone(),
                sha: blob.sha.clone(),
                content: wrap_base64(&STANDARD.encode(&blob.bytes)),
                encoding: Some("base64".to_string()),
            }));
        }

        let entries = self.list(&path);
        if entries.is_empty() && !path.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Found(RemoteContent::Directory(entries))
        }
    }

    fn put(
        &self,
        _location: &RepositoryLocation,
        path: &str,
        request: &PutRequest,
    ) -> Result<WriteReceipt> {
        let path = normalize(path);
        self.record(
            Method::Put,
            &path,
            request.sha.as_deref(),
            Some(&request.message),
        );

        if self.failing_writes.borrow().contains(&path) {
            return Err(DeskError::RemoteWrite("Simulated write error".to_string()));
        }
        if path.is_empty() || !self.list(&path).is_empty() {
            return Err(DeskError::RemoteWrite(format!("{} is a directory", path)));
        }

        let current = self.sha_of(&path);
        match (&current, &request.sha) {
            (Some(_), None) => {
                return Err(DeskError::RemoteWrite(
                    "Invalid request.\n\n\"sha\" wasn't supplied.".to_string(),
                ));
            }
            (Some(cur), Some(given)) if cur != given => {
                return Err(DeskError::RemoteWrite(format!(
                    "{} does not match {}",
                    path, given
                )));
            }
            _ => {}
        }

        let bytes = STANDARD
            .decode(&request.content)
            .map_err(|_| DeskError::RemoteWrite("content is not valid Base64".to_string()))?;
        let sha = self.seed(&path, bytes);
        Ok(WriteReceipt {
            content_sha: Some(sha),
            commit_sha: Some(self.commit_sha()),
        })
    }

    fn delete(
        &self,
        _location: &RepositoryLocation,
        path: &str,
        request: &DeleteRequest,
    ) -> Result<WriteReceipt> {
        let path = normalize(path);
        self.record(
            Method::Delete,
            &path,
            Some(&request.sha),
            Some(&request.message),
        );

        if self.failing_writes.borrow().contains(&path) {
            return Err(DeskError::RemoteWrite("Simulated write error".to_string()));
        }

        let current = self.sha_of(&path).ok_or_else(|| DeskError::RemoteWrite("Not Found".into()))?;
        if current != request.sha {
            return Err(DeskError::RemoteWrite(format!(
                "{} does not match {}",
                path, request.sha
            )));
        }

        self.blobs.borrow_mut().remove(&path);
        let n = self.commits.get() + 1;
        self.commits.set(n);
        Ok(WriteReceipt {
            content_sha: None,
            commit_sha: Some(self.commit_sha()),
        })
    }

    fn set_api_base(&mut self, api_base: &str) {
        self.api_base = Some(api_base.to_string());
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// Base64 broken into 60-character lines, the way the Contents API returns it.
fn wrap_base64(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 60 + 1);
    for chunk in encoded.as_bytes().chunks(60) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::store::client::ContentClient;

    pub fn test_location() -> RepositoryLocation {
        RepositoryLocation::new("test-school", "website", "ghp_test")
    }

    /// Builder for a configured client over a pre-populated memory store.
    #[derive(Default)]
    pub struct StoreFixture {
        pub transport: MemoryTransport,
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_text(self, path: &str, text: &str) -> Self {
            self.transport.seed(path, text.as_bytes());
            self
        }

        pub fn with_bytes(self, path: &str, bytes: &[u8]) -> Self {
            self.transport.seed(path, bytes);
            self
        }

        pub fn with_notice(self, id: &str, title: &str, date: &str, pinned: bool) -> Self {
            let text = format!("{}\n{}\nGeneral\n{}\nBody of {}", title, date, pinned, title);
            self.with_text(&format!("Notices/{}.txt", id), &text)
        }

        pub fn client(self) -> ContentClient<MemoryTransport> {
            ContentClient::new(self.transport).with_location(test_location())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::test_location;
    use super::*;

    fn put(transport: &MemoryTransport, path: &str, text: &str, sha: Option<String>) -> Result<WriteReceipt> {
        transport.put(
            &test_location(),
            path,
            &PutRequest {
                message: "m".into(),
                content: STANDARD.encode(text),
                sha,
            },
        )
    }

    #[test]
    fn create_then_update_requires_current_sha() {
        let transport = MemoryTransport::new();
        let first = put(&transport, "A/data.txt", "one", None).unwrap();

        let err = put(&transport, "A/data.txt", "two", None).unwrap_err();
        assert!(matches!(err, DeskError::RemoteWrite(_)));

        let err = put(&transport, "A/data.txt", "two", Some("stale".into())).unwrap_err();
        assert!(matches!(err, DeskError::RemoteWrite(_)));

        let second = put(&transport, "A/data.txt", "two", first.content_sha.clone()).unwrap();
        assert_ne!(first.content_sha, second.content_sha);
        assert_eq!(transport.file("A/data.txt").unwrap(), b"two");
    }

    #[test]
    fn directories_are_derived_from_file_paths() {
        let transport = MemoryTransport::new();
        transport.seed("Gallery/day/a.png", vec![1u8]);
        transport.seed("Gallery/day/nested/b.png", vec![2u8]);
        transport.seed("Gallery/other.png", vec![3u8]);

        let Lookup::Found(RemoteContent::Directory(entries)) =
            transport.get(&test_location(), "Gallery/day")
        else {
            panic!("expected directory");
        };
        let names: Vec<(&str, EntryKind)> =
            entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            [("a.png", EntryKind::File), ("nested", EntryKind::Directory)]
        );
        assert!(entries[0].sha.is_some());
        assert_eq!(
            transport.get(&test_location(), "Gallery/missing"),
            Lookup::NotFound
        );
    }

    #[test]
    fn delete_requires_matching_sha() {
        let transport = MemoryTransport::new();
        let sha = transport.seed("Notices/N.txt", "x");
        let request = |sha: &str| DeleteRequest {
            message: "rm".into(),
            sha: sha.into(),
        };

        assert!(transport
            .delete(&test_location(), "Notices/N.txt", &request("nope"))
            .is_err());
        transport
            .delete(&test_location(), "Notices/N.txt", &request(&sha))
            .unwrap();
        assert!(transport.file("Notices/N.txt").is_none());
        assert!(transport
            .delete(&test_location(), "Notices/N.txt", &request(&sha))
            .is_err());
    }

    #[test]
    fn file_content_is_line_wrapped() {
        let transport = MemoryTransport::new();
        transport.seed("big.txt", vec![b'a'; 100]);
        let Lookup::Found(RemoteContent::File(file)) = transport.get(&test_location(), "big.txt")
        else {
            panic!("expected file");
        };
        assert!(file.content.contains('\n'));
        assert_eq!(file.encoding.as_deref(), Some("base64"));
    }
}
