use super::{
    ContentsTransport, DeleteRequest, Lookup, PutRequest, RemoteContent, RemoteFile, WriteReceipt,
};
use crate::error::{DeskError, Result};
use crate::model::{DirectoryEntry, EntryKind, RepositoryLocation};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("contentdesk/", env!("CARGO_PKG_VERSION"));

/// Contents API over HTTPS.
pub struct HttpTransport {
    client: Client,
    api_base: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsBody {
    Listing(Vec<DirectoryEntry>),
    Item(ItemBody),
}

#[derive(Deserialize)]
struct ItemBody {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize, Default)]
struct ShaRef {
    #[serde(default)]
    sha: Option<String>,
}

#[derive(Deserialize, Default)]
struct WriteBody {
    #[serde(default)]
    content: Option<ShaRef>,
    #[serde(default)]
    commit: Option<ShaRef>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpTransport {
    pub fn new(api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DeskError::Config(format!("Cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn contents_url(&self, location: &RepositoryLocation, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            urlencoding::encode(&location.owner),
            urlencoding::encode(&location.repo),
            encode_path(path)
        )
    }

    fn request(&self, method: Method, location: &RepositoryLocation, path: &str) -> RequestBuilder {
        let url = self.contents_url(location, path);
        debug!(%method, %url, "contents request");
        self.client
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", location.token))
            .header(ACCEPT, ACCEPT_V3)
    }

    fn send_write<B: serde::Serialize>(
        &self,
        method: Method,
        location: &RepositoryLocation,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<WriteReceipt> {
        let response = self
            .request(method, location, path)
            .json(body)
            .send()
            .map_err(|e| DeskError::RemoteWrite(format!("{}: {}", fallback, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeskError::RemoteWrite(error_message(response, fallback)));
        }

        let body: WriteBody = response.json().unwrap_or_default();
        Ok(WriteReceipt {
            content_sha: body.content.and_then(|c| c.sha),
            commit_sha: body.commit.and_then(|c| c.sha),
        })
    }
}

impl ContentsTransport for HttpTransport {
    fn get(&self, location: &RepositoryLocation, path: &str) -> Lookup<RemoteContent> {
        let response = match self.request(Method::GET, location, path).send() {
            Ok(r) => r,
            Err(e) => return Lookup::Unavailable(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Lookup::NotFound;
        }
        if !status.is_success() {
            return Lookup::Unavailable(error_message(response, "Failed to fetch contents"));
        }

        match response.json::<ContentsBody>() {
            Ok(ContentsBody::Listing(entries)) => Lookup::Found(RemoteContent::Directory(entries)),
            Ok(ContentsBody::Item(item)) if item.kind == EntryKind::Directory => {
                Lookup::Found(RemoteContent::Directory(Vec::new()))
            }
            Ok(ContentsBody::Item(item)) => Lookup::Found(RemoteContent::File(RemoteFile {
                name: item.name,
                path: item.path,
                sha: item.sha,
                content: item.content.unwrap_or_default(),
                encoding: item.encoding,
            })),
            Err(e) => Lookup::Unavailable(format!("Malformed contents response: {}", e)),
        }
    }

    fn put(
        &self,
        location: &RepositoryLocation,
        path: &str,
        request: &PutRequest,
    ) -> Result<WriteReceipt> {
        self.send_write(Method::PUT, location, path, request, "Failed to write file")
    }

    fn delete(
        &self,
        location: &RepositoryLocation,
        path: &str,
        request: &DeleteRequest,
    ) -> Result<WriteReceipt> {
        self.send_write(Method::DELETE, location, path, request, "Failed to delete file")
    }

    fn set_api_base(&mut self, api_base: &str) {
        self.api_base = api_base.trim_end_matches('/').to_string();
    }
}

/// Percent-encodes each segment, keeping the `/` separators.
pub fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn error_message(response: Response, fallback: &str) -> String {
    let status = response.status();
    let body: ErrorBody = response.json().unwrap_or_default();
    match body.message {
        Some(message) if !message.is_empty() => message,
        _ => format!("{} (HTTP {})", fallback, status.as_u16()),
    }
}
