use crate::commands::{CmdMessage, CmdResult, ManagedFolder};
use crate::error::{DeskError, Result};
use crate::paths::{self, MANAGED_ROOTS};
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;

/// Sub-folders of each managed root. Roots that do not exist yet list empty.
pub fn list<T: ContentsTransport>(client: &ContentClient<T>) -> Result<CmdResult> {
    let mut folders = Vec::with_capacity(MANAGED_ROOTS.len());
    for root in MANAGED_ROOTS {
        let entries = client
            .list_directory(root)?
            .into_iter()
            .filter(|e| e.is_dir())
            .collect();
        folders.push(ManagedFolder {
            root: root.to_string(),
            folders: entries,
        });
    }
    Ok(CmdResult::default().with_folders(folders))
}

/// Deletes `<root>/<folder>` and everything below it. The roots themselves
/// cannot be deleted.
///
/// A delete that stops halfway is not an `Err`: the result carries an error
/// message plus the paths already removed, since those are gone for good.
pub fn delete<T: ContentsTransport>(
    client: &ContentClient<T>,
    root: &str,
    folder: &str,
) -> Result<CmdResult> {
    let path = paths::managed_folder(root, folder)?;
    let mut result = CmdResult::default();

    match client.delete_tree(&path) {
        Ok(report) if report.deleted.is_empty() => {
            result.add_message(CmdMessage::warning(format!(
                "Nothing to delete at {}",
                path
            )));
        }
        Ok(report) => {
            result.add_message(CmdMessage::success(format!(
                "Folder deleted: {} ({} file(s))",
                path,
                report.deleted.len()
            )));
            result.deleted_paths = report.deleted;
        }
        Err(DeskError::PartialTreeDelete {
            deleted,
            failed_path,
            reason,
        }) => {
            result.add_message(CmdMessage::error(format!(
                "Folder {} was only partly deleted: failed at {}: {}",
                path, failed_path, reason
            )));
            result.add_message(CmdMessage::warning(format!(
                "{} file(s) were removed; list the folder again to see what remains",
                deleted.len()
            )));
            result.deleted_paths = deleted;
        }
        Err(e) => return Err(e),
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::Method;

    fn populated() -> StoreFixture {
        StoreFixture::new()
            .with_text("Achievements/spring-fair/data.txt", "a")
            .with_bytes("Achievements/spring-fair/image.jpg", &[1])
            .with_text("Achievements/README.md", "top-level file")
            .with_text("Uploads/forms/data.txt", "u")
            .with_bytes("Gallery/day/1.png", &[2])
            .with_bytes("Gallery/night/2.png", &[3])
    }

    #[test]
    fn lists_only_sub_folders_of_each_root() {
        let client = populated().client();
        let result = list(&client).unwrap();

        let summary: Vec<(String, Vec<String>)> = result
            .folders
            .iter()
            .map(|f| {
                (
                    f.root.clone(),
                    f.folders.iter().map(|e| e.name.clone()).collect(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Achievements".to_string(), vec!["spring-fair".to_string()]),
                ("Uploads".to_string(), vec!["forms".to_string()]),
                (
                    "Gallery".to_string(),
                    vec!["day".to_string(), "night".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn deletes_sub_folder_recursively() {
        let client = populated().client();
        let result = delete(&client, "Achievements", "spring-fair").unwrap();
        assert!(!result.has_errors());
        assert_eq!(result.deleted_paths.len(), 2);
        assert!(client
            .transport()
            .file("Achievements/README.md")
            .is_some());
    }

    #[test]
    fn refuses_to_delete_a_root() {
        let client = populated().client();
        assert!(matches!(
            delete(&client, "Gallery", ""),
            Err(DeskError::Protected(_))
        ));
        assert!(matches!(
            delete(&client, "Notices", "x"),
            Err(DeskError::Invalid(_))
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn missing_folder_is_a_warning() {
        let client = populated().client();
        let result = delete(&client, "Gallery", "none").unwrap();
        assert!(!result.has_errors());
        assert!(client.transport().requests_of(Method::Delete).is_empty());
    }

    #[test]
    fn partial_delete_is_reported_not_raised() {
        let fixture = populated().with_bytes("Gallery/day/3.png", &[4]);
        fixture.transport.fail_writes_to("Gallery/day/3.png");
        let client = fixture.client();

        let result = delete(&client, "Gallery", "day").unwrap();
        assert!(result.has_errors());
        assert_eq!(result.deleted_paths, vec!["Gallery/day/1.png"]);
    }
}
