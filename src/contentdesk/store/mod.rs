//! # Storage Layer
//!
//! All content lives in a GitHub repository and is reached through the
//! path-addressed Contents API (`/repos/<owner>/<repo>/contents/<path>`). This
//! module splits that into two parts:
//!
//! - [`ContentsTransport`]: the "how". One call per HTTP exchange, no policy.
//!   - [`http::HttpTransport`]: production, blocking `reqwest` client
//!   - [`memory::MemoryTransport`]: in-memory stand-in for tests; enforces the
//!     same hash-conditioned writes the real API does
//! - [`client::ContentClient`]: the "what". Existence checks, create-or-update,
//!   recursive deletes and notice loading, written once against the trait.
//!
//! ## Content hashes
//!
//! Every stored blob has a `sha`. Overwriting or deleting a file requires the
//! file's *current* sha; a missing or stale one is rejected by the store. A
//! listing's hashes are only valid until the next write, which is why
//! multi-file operations run strictly one request at a time.
//!
//! ## Directories
//!
//! The store has no directory objects. A directory is the common prefix of the
//! files below it: it appears with its first file and disappears with its last.

use crate::error::Result;
use crate::model::{DirectoryEntry, RepositoryLocation};
use serde::Serialize;

pub mod client;
pub mod http;
pub mod memory;

/// Outcome of a read that can tell absence apart from failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    /// The store could not answer (auth, network, rate limit, bad payload).
    Unavailable(String),
}

/// What a GET on the contents endpoint returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteContent {
    File(RemoteFile),
    Directory(Vec<DirectoryEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    /// Base64 payload. May contain line breaks.
    pub content: String,
    /// `base64`, or `none` when the file is too large to be inlined.
    pub encoding: Option<String>,
}

/// Body of a create-or-update request. Without `sha` the store treats the
/// write as a new file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutRequest {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    pub message: String,
    pub sha: String,
}

/// Hashes reported back by a successful write or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReceipt {
    /// The new blob hash. `None` after a delete.
    pub content_sha: Option<String>,
    pub commit_sha: Option<String>,
}

/// Raw access to the Contents API.
///
/// Implementations perform exactly one remote exchange per call and never
/// retry. `put` and `delete` map any rejection to `DeskError::RemoteWrite`
/// carrying the store's message.
pub trait ContentsTransport {
    fn get(&self, location: &RepositoryLocation, path: &str) -> Lookup<RemoteContent>;

    fn put(
        &self,
        location: &RepositoryLocation,
        path: &str,
        request: &PutRequest,
    ) -> Result<WriteReceipt>;

    fn delete(
        &self,
        location: &RepositoryLocation,
        path: &str,
        request: &DeleteRequest,
    ) -> Result<WriteReceipt>;

    /// Points later requests at another API root. A no-op for transports
    /// that have none.
    fn set_api_base(&mut self, _api_base: &str) {}
}
