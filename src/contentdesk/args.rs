use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "contentdesk", version, long_version = env!("CONTENTDESK_LONG_VERSION"))]
#[command(about = "Manage school website content stored in a GitHub repository", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fail when the repository cannot be read, instead of treating it as empty
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get or set configuration
    Config {
        /// Configuration key (token, owner, repo, api-base, strict-reads)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Achievements and activities
    #[command(subcommand)]
    Achievement(AchievementCommand),

    /// School notices
    #[command(subcommand, alias = "notices")]
    Notice(NoticeCommand),

    /// Folders of downloadable documents
    #[command(subcommand)]
    Upload(UploadCommand),

    /// Photo galleries
    #[command(subcommand)]
    Gallery(GalleryCommand),

    /// Folders under Achievements, Uploads and Gallery
    #[command(subcommand)]
    Folders(FoldersCommand),
}

#[derive(Subcommand, Debug)]
pub enum AchievementCommand {
    /// Publish an achievement, optionally with a cover image
    Add {
        #[command(flatten)]
        entry: FolderEntry,

        /// Achievements or Activity
        #[arg(short, long, default_value = "Achievements")]
        category: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Cover image, stored as image.jpg
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoticeCommand {
    /// Publish a notice
    #[command(alias = "new")]
    Add {
        #[arg(short, long)]
        title: String,

        /// General, Urgent, Meeting, Event, Announcement, Holiday, Training or Other
        #[arg(short, long, default_value = "General")]
        category: String,

        /// YYYY-MM-DD, defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Keep the notice at the top of the board
        #[arg(long)]
        pinned: bool,

        /// Notice body (may span several lines)
        #[arg(long, default_value = "")]
        content: String,

        /// Use this id instead of generating one (an existing notice is replaced)
        #[arg(long)]
        id: Option<String>,
    },

    /// List notices, newest first
    #[command(alias = "ls")]
    List,

    /// Delete a notice by id
    #[command(alias = "rm")]
    Delete { id: String },

    /// Print a fresh notice id
    NewId,
}

#[derive(Subcommand, Debug)]
pub enum UploadCommand {
    /// Create an upload folder with one or more files
    Add {
        #[command(flatten)]
        entry: FolderEntry,

        #[arg(long)]
        description: Option<String>,

        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GalleryCommand {
    /// Add images to a gallery folder
    Add {
        #[arg(short, long)]
        folder: String,

        #[arg(required = true, num_args = 1..)]
        images: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FoldersCommand {
    /// List folders under each managed root
    #[command(alias = "ls")]
    List,

    /// Delete a folder and everything in it
    #[command(alias = "rm")]
    Delete {
        /// Achievements, Uploads or Gallery
        root: String,

        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Fields shared by commands that create a titled folder.
#[derive(Args, Debug)]
pub struct FolderEntry {
    /// Folder name inside the repository
    #[arg(short, long)]
    pub folder: String,

    #[arg(short, long)]
    pub title: String,

    /// YYYY-MM-DD, defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
}
