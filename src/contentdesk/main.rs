use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use colored::*;
use contentdesk::api::{CmdMessage, CmdResult, ConfigAction, DeskApi, ItemStatus, MessageLevel};
use contentdesk::config::{DeskConfig, KEYS};
use contentdesk::error::{DeskError, Result};
use contentdesk::model::{
    Achievement, AchievementCategory, BinaryAsset, Notice, NoticeCategory, NoticeRecord,
    UploadFolder,
};
use contentdesk::paths;
use contentdesk::record::DATE_FORMAT;
use contentdesk::store::client::ContentClient;
use contentdesk::store::http::HttpTransport;
use directories::ProjectDirs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{
    AchievementCommand, Cli, Commands, FoldersCommand, GalleryCommand, NoticeCommand,
    UploadCommand,
};

const HOME_ENV: &str = "CONTENTDESK_HOME";
const LOG_ENV: &str = "CONTENTDESK_LOG";

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the command finished without error-level messages.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut api = init_api(&cli)?;

    match cli.command {
        Commands::Config { key, value } => handle_config(&mut api, key, value),
        Commands::Achievement(AchievementCommand::Add {
            entry,
            category,
            description,
            image,
        }) => {
            let achievement = Achievement {
                folder: entry.folder,
                title: entry.title,
                category: category.parse::<AchievementCategory>()?,
                date: parse_date(entry.date.as_deref())?,
                description,
            };
            let image = image.as_deref().map(read_asset).transpose()?;
            let result = api.create_achievement(&achievement, image.as_ref())?;
            Ok(print_result(&result))
        }
        Commands::Notice(command) => handle_notice(&api, command),
        Commands::Upload(UploadCommand::Add {
            entry,
            description,
            files,
        }) => {
            let upload = UploadFolder {
                folder: entry.folder,
                title: entry.title,
                date: parse_date(entry.date.as_deref())?,
                description,
            };
            let assets = read_assets(&files)?;
            let result = api.create_upload(&upload, &assets)?;
            Ok(print_result(&result))
        }
        Commands::Gallery(GalleryCommand::Add { folder, images }) => {
            let assets = read_assets(&images)?;
            let result = api.create_gallery(&folder, &assets)?;
            Ok(print_result(&result))
        }
        Commands::Folders(command) => handle_folders(&api, command),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn config_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("org", "contentdesk", "contentdesk")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            DeskError::Config(format!(
                "Could not determine a config directory; set {}",
                HOME_ENV
            ))
        })
}

fn init_api(cli: &Cli) -> Result<DeskApi<HttpTransport>> {
    let dir = config_dir()?;
    let mut config = DeskConfig::load(&dir)?;
    if cli.strict {
        config.strict_reads = true;
    }

    let transport = HttpTransport::new(&config.api_base)?;
    let mut api = DeskApi::new(ContentClient::new(transport), dir);
    api.apply(&config);
    Ok(api)
}

fn handle_config(
    api: &mut DeskApi<HttpTransport>,
    key: Option<String>,
    value: Option<String>,
) -> Result<bool> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            println!("{}", api.config_dir().display().to_string().dimmed());
            for key in KEYS {
                let value = config.get(key).unwrap_or_default();
                println!("{} = {}", key, value);
            }
        }
    }
    print_messages(&result.messages);
    Ok(!result.has_errors())
}

fn handle_notice(api: &DeskApi<HttpTransport>, command: NoticeCommand) -> Result<bool> {
    match command {
        NoticeCommand::Add {
            title,
            category,
            date,
            pinned,
            content,
            id,
        } => {
            let notice = Notice {
                id,
                title,
                date: parse_date(date.as_deref())?,
                category: category.parse::<NoticeCategory>()?,
                pinned,
                content,
            };
            let result = api.create_notice(&notice)?;
            Ok(print_result(&result))
        }
        NoticeCommand::List => {
            let result = api.list_notices()?;
            print_notices(&result.notices);
            print_messages(&result.messages);
            Ok(!result.has_errors())
        }
        NoticeCommand::Delete { id } => {
            let result = api.delete_notice(&id)?;
            Ok(print_result(&result))
        }
        NoticeCommand::NewId => {
            let result = api.new_notice_id()?;
            if let Some(id) = &result.notice_id {
                println!("{}", id);
            }
            Ok(true)
        }
    }
}

fn handle_folders(api: &DeskApi<HttpTransport>, command: FoldersCommand) -> Result<bool> {
    match command {
        FoldersCommand::List => {
            let result = api.list_folders()?;
            for managed in &result.folders {
                println!("{}", managed.root.bold());
                if managed.folders.is_empty() {
                    println!("    {}", "(empty)".dimmed());
                }
                for folder in &managed.folders {
                    println!("    {}", folder.name);
                }
            }
            print_messages(&result.messages);
            Ok(!result.has_errors())
        }
        FoldersCommand::Delete { root, name, yes } => {
            let path = paths::managed_folder(&root, &name)?;
            if !yes && !confirm(&format!("Delete {} and everything in it?", path))? {
                println!("{}", "Aborted.".dimmed());
                return Ok(true);
            }
            let result = api.delete_folder(&root, &name)?;
            for deleted in &result.deleted_paths {
                println!("    {}", deleted.dimmed());
            }
            print_messages(&result.messages);
            Ok(!result.has_errors())
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn parse_date(input: Option<&str>) -> Result<NaiveDate> {
    match input {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map_err(|_| DeskError::Invalid(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
    }
}

fn read_asset(path: &Path) -> Result<BinaryAsset> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DeskError::Invalid(format!("Not a file: {}", path.display())))?;
    let bytes = std::fs::read(path)?;
    Ok(BinaryAsset::new(file_name, bytes))
}

fn read_assets(files: &[PathBuf]) -> Result<Vec<BinaryAsset>> {
    files.iter().map(|f| read_asset(f)).collect()
}

/// Prints messages, plus the per-file breakdown of a batch that stopped early.
fn print_result(result: &CmdResult) -> bool {
    if let Some(batch) = result.batch.as_ref().filter(|b| !b.is_clean()) {
        for item in &batch.items {
            match &item.status {
                ItemStatus::Written => println!("  {} {}", "✓".green(), item.path),
                ItemStatus::Failed(_) => println!("  {} {}", "✗".red(), item.path),
                ItemStatus::Skipped => {
                    println!("  {} {}", "-".dimmed(), item.path.dimmed())
                }
            }
        }
    }
    print_messages(&result.messages);
    !result.has_errors()
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const LINE_WIDTH: usize = 100;
const DATE_WIDTH: usize = 12;
const TIME_WIDTH: usize = 16;
const PIN_MARKER: &str = "⚲";

fn print_notices(notices: &[NoticeRecord]) {
    let id_width = notices.iter().map(|n| n.id.width()).max().unwrap_or(0) + 2;

    for notice in notices {
        let left_prefix = if notice.pinned {
            format!("  {} ", PIN_MARKER)
        } else {
            "    ".to_string()
        };
        let category = format!(" [{}]", notice.category);

        let fixed_width =
            left_prefix.width() + id_width + category.width() + DATE_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title = truncate_to_width(&notice.title, available);
        let padding = available.saturating_sub(title.width());

        let id = format!("{:<width$}", notice.id, width = id_width);
        let id_colored = if notice.pinned {
            id.yellow()
        } else {
            id.normal()
        };

        println!(
            "{}{}{}{}{}{:>date$}{}",
            left_prefix,
            id_colored,
            title,
            " ".repeat(padding),
            category.dimmed(),
            notice.date,
            format_time_ago(notice.calendar_date()).dimmed(),
            date = DATE_WIDTH,
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(date: Option<NaiveDate>) -> String {
    let Some(date) = date else {
        return format!("{:>width$}", "", width = TIME_WIDTH);
    };
    let today = Local::now().date_naive();
    let time_str = if date > today {
        "upcoming".to_string()
    } else if date == today {
        "today".to_string()
    } else {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let duration = Utc::now().signed_duration_since(midnight);
        timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
    };
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
