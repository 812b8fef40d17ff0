//! # Text Records
//!
//! Entities are stored as plain text files whose lines are the entity's fields,
//! joined with `\n`. There is no escaping: the field order *is* the format.
//!
//! ```text
//! Achievements/<folder>/data.txt   title, category, date, description
//! Uploads/<folder>/data.txt        title, date, description (may be empty)
//! Notices/<id>.txt                 title, date, category, pinned, content
//! ```
//!
//! Only the last field may span several lines. A newline anywhere else would
//! shift every following field, so encoding rejects it up front.

use crate::error::{DeskError, Result};
use crate::model::{Achievement, DirectoryEntry, Notice, NoticeRecord, UploadFolder};
use crate::paths::NOTICE_EXT;
use chrono::{DateTime, NaiveDate};
use std::cmp::Ordering;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimum number of lines a notice file needs to be listed.
pub const NOTICE_MIN_LINES: usize = 4;

/// An entity that serializes to newline-joined fields.
pub trait TextRecord {
    /// Field values in storage order.
    fn fields(&self) -> Vec<String>;

    fn encode(&self) -> Result<String> {
        let fields = self.fields();
        let last = fields.len().saturating_sub(1);
        for (i, field) in fields.iter().enumerate() {
            if i < last && (field.contains('\n') || field.contains('\r')) {
                return Err(DeskError::Invalid(format!(
                    "Field {} must be a single line: {:?}",
                    i + 1,
                    field
                )));
            }
        }
        Ok(fields.join("\n"))
    }
}

impl TextRecord for Achievement {
    fn fields(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.category.to_string(),
            format_date(self.date),
            self.description.clone(),
        ]
    }
}

impl TextRecord for UploadFolder {
    fn fields(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            format_date(self.date),
            self.description.clone().unwrap_or_default(),
        ]
    }
}

impl TextRecord for Notice {
    fn fields(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            format_date(self.date),
            self.category.to_string(),
            self.pinned.to_string(),
            self.content.clone(),
        ]
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Title line of a notice, when the text is long enough to be a notice.
pub fn notice_title(text: &str) -> Option<&str> {
    let mut lines = text.split('\n');
    let title = lines.next()?;
    (lines.count() + 1 >= NOTICE_MIN_LINES).then_some(title)
}

/// Builds a [`NoticeRecord`] from a listed entry and its decoded text.
///
/// Returns `None` when the text has fewer than [`NOTICE_MIN_LINES`] lines.
pub fn parse_notice(entry: &DirectoryEntry, text: &str) -> Option<NoticeRecord> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < NOTICE_MIN_LINES {
        return None;
    }

    let id = entry
        .name
        .strip_suffix(NOTICE_EXT)
        .unwrap_or(&entry.name)
        .to_string();

    Some(NoticeRecord {
        id,
        name: entry.name.clone(),
        path: entry.path.clone(),
        sha: entry.sha.clone().unwrap_or_default(),
        title: lines[0].to_string(),
        date: lines[1].to_string(),
        category: lines[2].to_string(),
        pinned: lines[3] == "true",
        content: lines[NOTICE_MIN_LINES..].join("\n"),
    })
}

/// Newest first. Records whose date does not parse go last; ties keep their
/// listing order.
pub fn sort_newest_first(notices: &mut [NoticeRecord]) {
    notices.sort_by(|a, b| match (a.calendar_date(), b.calendar_date()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
