//! Repository path conventions.
//!
//! Folders are never stored on their own: a folder exists once any file under
//! its prefix exists, so every helper here produces a *file* path.

use crate::error::{DeskError, Result};

pub const ACHIEVEMENTS_DIR: &str = "Achievements";
pub const UPLOADS_DIR: &str = "Uploads";
pub const GALLERY_DIR: &str = "Gallery";
pub const NOTICES_DIR: &str = "Notices";

pub const DATA_FILE: &str = "data.txt";
pub const ACHIEVEMENT_IMAGE: &str = "image.jpg";
pub const NOTICE_EXT: &str = ".txt";

/// Top-level folders whose sub-folders can be managed, but which are never
/// deleted themselves.
pub const MANAGED_ROOTS: [&str; 3] = [ACHIEVEMENTS_DIR, UPLOADS_DIR, GALLERY_DIR];

pub fn is_managed_root(name: &str) -> bool {
    MANAGED_ROOTS.contains(&name)
}

/// Validates a single user-supplied path segment (a folder or file name).
pub fn validate_segment(kind: &str, segment: &str) -> Result<()> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return Err(DeskError::Invalid(format!("{} cannot be empty", kind)));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(DeskError::Invalid(format!("{} cannot be '{}'", kind, trimmed)));
    }
    if segment.contains('/') || segment.contains('\\') {
        return Err(DeskError::Invalid(format!(
            "{} cannot contain path separators: {}",
            kind, segment
        )));
    }
    if segment.chars().any(char::is_control) {
        return Err(DeskError::Invalid(format!(
            "{} cannot contain control characters",
            kind
        )));
    }
    Ok(())
}

fn in_folder(root: &str, folder: &str, file: &str) -> Result<String> {
    validate_segment("Folder name", folder)?;
    validate_segment("File name", file)?;
    Ok(format!("{}/{}/{}", root, folder, file))
}

pub fn achievement_data(folder: &str) -> Result<String> {
    in_folder(ACHIEVEMENTS_DIR, folder, DATA_FILE)
}

pub fn achievement_image(folder: &str) -> Result<String> {
    in_folder(ACHIEVEMENTS_DIR, folder, ACHIEVEMENT_IMAGE)
}

pub fn upload_data(folder: &str) -> Result<String> {
    in_folder(UPLOADS_DIR, folder, DATA_FILE)
}

pub fn upload_file(folder: &str, file_name: &str) -> Result<String> {
    in_folder(UPLOADS_DIR, folder, file_name)
}

pub fn gallery_image(folder: &str, file_name: &str) -> Result<String> {
    in_folder(GALLERY_DIR, folder, file_name)
}

pub fn notice_file(id: &str) -> Result<String> {
    validate_segment("Notice id", id)?;
    Ok(format!("{}/{}{}", NOTICES_DIR, id, NOTICE_EXT))
}

/// Path of a managed sub-folder, refusing the managed roots themselves.
pub fn managed_folder(root: &str, folder: &str) -> Result<String> {
    if !is_managed_root(root) {
        return Err(DeskError::Invalid(format!(
            "Unknown folder '{}' (expected one of {})",
            root,
            MANAGED_ROOTS.join(", ")
        )));
    }
    if folder.trim().is_empty() {
        return Err(DeskError::Protected(root.to_string()));
    }
    validate_segment("Folder name", folder)?;
    Ok(format!("{}/{}", root, folder))
}
