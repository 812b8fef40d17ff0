//! # Contentdesk Architecture
//!
//! Contentdesk manages the content of a school website kept in a GitHub
//! repository: achievements, uploaded documents, gallery images and notices.
//! Every record is a file committed through the GitHub Contents API, so the
//! repository is the only database.
//!
//! Like the rest of the tooling in this family, it is a library with a CLI
//! client on top, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs)                                     │
//! │  - Parses arguments, reads local files, prints results      │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Thin facade over commands, owns the config directory     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs)                                   │
//! │  - One module per content kind: validation, record layout,  │
//! │    commit messages, batch ordering                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store (store/)                                             │
//! │  - ContentClient: write/read/list/delete over a transport   │
//! │  - HttpTransport (production), MemoryTransport (testing)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust values and returns
//! `Result<CmdResult>`. It never prints, never exits the process and never
//! reads local files; images and documents arrive as [`model::BinaryAsset`]s.
//! Diagnostics go through `tracing`, and the binary decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Store** (`store/*.rs`): the client against `MemoryTransport`, which
//!    enforces the same sha rules as GitHub and records every request.
//! 2. **Commands**: record layout, paths, commit messages and batch behavior.
//! 3. **API**: dispatch and config re-application.
//! 4. **CLI** (`tests/cli.rs`): the binary, for everything that needs no
//!    network.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per content kind, plus config
//! - [`store`]: Transport trait, HTTP and in-memory transports, the client
//! - [`model`]: Records, categories, locations and directory entries
//! - [`record`]: Line-oriented text encoding of records
//! - [`paths`]: Repository layout
//! - [`notice_id`]: Notice identifier generation
//! - [`config`]: Persisted connection settings
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod notice_id;
pub mod paths;
pub mod record;
pub mod store;
