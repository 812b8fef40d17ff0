//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! content operation, whichever front end drives it.
//!
//! The facade dispatches to `commands/*.rs` and returns `Result<CmdResult>`.
//! It does no printing and holds no business rules of its own.
//!
//! ## Generic Over the Transport
//!
//! `DeskApi<T: ContentsTransport>` runs against:
//! - Production: `DeskApi<HttpTransport>`
//! - Testing: `DeskApi<MemoryTransport>`
//!
//! ## Configuration
//!
//! The facade owns the config directory. Setting a key through
//! [`DeskApi::config`] re-applies the saved settings: the client gets the new
//! repository, credential and read policy, and the transport the new API
//! root, so the next operation uses all of them. Operations already running
//! keep the location they started with.

use crate::commands;
use crate::config::DeskConfig;
use crate::error::Result;
use crate::model::{Achievement, BinaryAsset, Notice, UploadFolder};
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;
use std::path::{Path, PathBuf};

pub struct DeskApi<T: ContentsTransport> {
    client: ContentClient<T>,
    config_dir: PathBuf,
}

impl<T: ContentsTransport> DeskApi<T> {
    pub fn new(client: ContentClient<T>, config_dir: PathBuf) -> Self {
        Self { client, config_dir }
    }

    pub fn create_achievement(
        &self,
        achievement: &Achievement,
        image: Option<&BinaryAsset>,
    ) -> Result<CmdResult> {
        commands::achievements::create(&self.client, achievement, image)
    }

    pub fn create_upload(&self, upload: &UploadFolder, files: &[BinaryAsset]) -> Result<CmdResult> {
        commands::uploads::create(&self.client, upload, files)
    }

    pub fn create_gallery(&self, folder: &str, images: &[BinaryAsset]) -> Result<CmdResult> {
        commands::gallery::create(&self.client, folder, images)
    }

    pub fn create_notice(&self, notice: &Notice) -> Result<CmdResult> {
        commands::notices::create(&self.client, notice)
    }

    pub fn list_notices(&self) -> Result<CmdResult> {
        commands::notices::list(&self.client)
    }

    pub fn delete_notice(&self, id: &str) -> Result<CmdResult> {
        commands::notices::delete(&self.client, id)
    }

    pub fn new_notice_id(&self) -> Result<CmdResult> {
        commands::notices::new_id(&self.client)
    }

    pub fn list_folders(&self) -> Result<CmdResult> {
        commands::folders::list(&self.client)
    }

    pub fn delete_folder(&self, root: &str, folder: &str) -> Result<CmdResult> {
        commands::folders::delete(&self.client, root, folder)
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let is_set = matches!(action, ConfigAction::Set(..));
        let result = commands::config::run(&self.config_dir, action)?;
        if is_set && !result.has_errors() {
            self.apply(&DeskConfig::load(&self.config_dir)?);
        }
        Ok(result)
    }

    /// Points the client at the repository, read policy and API root in
    /// `config`.
    pub fn apply(&mut self, config: &DeskConfig) {
        match config.location() {
            Some(location) => self.client.set_location(location),
            None => self.client.clear_location(),
        }
        self.client.set_policy(config.read_policy());
        self.client.transport_mut().set_api_base(&config.api_base);
    }

    pub fn client(&self) -> &ContentClient<T> {
        &self.client
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

pub use crate::commands::config::ConfigAction;
pub use commands::{BatchReport, CmdMessage, CmdResult, ItemStatus, ManagedFolder, MessageLevel};
