use crate::commands::{require_title, CmdMessage, CmdResult};
use crate::error::{DeskError, Result};
use crate::model::Notice;
use crate::paths;
use crate::record::{notice_title, TextRecord};
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;
use tracing::debug;

/// Writes `Notices/<id>.txt`. Without an id, an unused one is generated.
pub fn create<T: ContentsTransport>(client: &ContentClient<T>, notice: &Notice) -> Result<CmdResult> {
    require_title(&notice.title)?;
    let record = notice.encode()?;
    let id = match &notice.id {
        Some(id) => id.trim().to_string(),
        None => client.generate_unique_notice_id()?,
    };
    let path = paths::notice_file(&id)?;

    client.write_text(&path, &record, &format!("Add notice: {}", notice.title))?;

    let mut result = CmdResult::default().with_notice_id(id.clone());
    result.add_message(CmdMessage::success(format!(
        "Notice created: {} ({})",
        notice.title, id
    )));
    Ok(result)
}

pub fn list<T: ContentsTransport>(client: &ContentClient<T>) -> Result<CmdResult> {
    let notices = client.list_notices()?;
    let mut result = CmdResult::default();
    if notices.is_empty() {
        result.add_message(CmdMessage::info("No notices found"));
    }
    Ok(result.with_notices(notices))
}

/// Deletes a notice by id.
///
/// Only the notice's own file is fetched: once for its hash, once for the
/// title used in the commit message. A notice too malformed to have a title
/// is still deleted, labelled by its id.
pub fn delete<T: ContentsTransport>(client: &ContentClient<T>, id: &str) -> Result<CmdResult> {
    let id = id.trim();
    let path = paths::notice_file(id)?;

    let Some(sha) = client.exists(&path)?.sha else {
        return Err(DeskError::Invalid(format!("Notice not found: {}", id)));
    };
    let label = match client.read_text(&path) {
        Ok(text) => notice_title(&text).unwrap_or(id).to_string(),
        Err(e) => {
            debug!(%path, error = %e, "could not read notice title");
            id.to_string()
        }
    };

    client.delete_file(&path, &sha, &format!("Delete notice: {}", label))?;

    let mut result = CmdResult::default();
    result.deleted_paths.push(path);
    result.add_message(CmdMessage::success(format!("Notice deleted: {}", label)));
    Ok(result)
}

/// A fresh id, without checking the store.
pub fn new_id<T: ContentsTransport>(client: &ContentClient<T>) -> Result<CmdResult> {
    Ok(CmdResult::default().with_notice_id(client.generate_notice_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoticeCategory;
    use crate::notice_id::is_notice_id;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::Method;
    use chrono::NaiveDate;

    fn notice(id: Option<&str>) -> Notice {
        Notice {
            id: id.map(str::to_string),
            title: "Sports Day".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
            category: NoticeCategory::Event,
            pinned: false,
            content: "Bring water.\nWear house colours.".into(),
        }
    }

    #[test]
    fn creates_notice_with_generated_id() {
        let client = StoreFixture::new().client();
        let result = create(&client, &notice(None)).unwrap();
        let id = result.notice_id.unwrap();
        assert!(is_notice_id(&id));

        let stored = client
            .transport()
            .file(&format!("Notices/{}.txt", id))
            .unwrap();
        assert_eq!(
            String::from_utf8(stored).unwrap(),
            "Sports Day\n2024-04-12\nEvent\nfalse\nBring water.\nWear house colours."
        );
    }

    #[test]
    fn created_notice_is_listed_back() {
        let client = StoreFixture::new().client();
        create(&client, &notice(Some("NOTICE-LX0-AAAAA"))).unwrap();

        let listed = list(&client).unwrap().notices;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "NOTICE-LX0-AAAAA");
        assert_eq!(listed[0].category, "Event");
        assert_eq!(listed[0].content, "Bring water.\nWear house colours.");
    }

    #[test]
    fn deletes_listed_notice_with_its_sha() {
        let client = StoreFixture::new()
            .with_notice("NOTICE-A-00001", "Exam timetable", "2024-01-01", false)
            .client();
        let result = delete(&client, "NOTICE-A-00001").unwrap();
        assert_eq!(result.deleted_paths, vec!["Notices/NOTICE-A-00001.txt"]);

        let deletes = client.transport().requests_of(Method::Delete);
        assert_eq!(
            deletes[0].message.as_deref(),
            Some("Delete notice: Exam timetable")
        );
        assert!(client.list_notices().unwrap().is_empty());
    }

    #[test]
    fn delete_fetches_only_the_target_notice() {
        let client = StoreFixture::new()
            .with_notice("NOTICE-A-00001", "Exam timetable", "2024-01-01", false)
            .with_notice("NOTICE-B-00002", "Sports Day", "2024-02-01", false)
            .with_notice("NOTICE-C-00003", "Book Fair", "2024-03-01", false)
            .client();
        delete(&client, "NOTICE-B-00002").unwrap();

        let gets = client.transport().requests_of(Method::Get);
        assert_eq!(gets.len(), 2);
        assert!(gets.iter().all(|g| g.path == "Notices/NOTICE-B-00002.txt"));
        let deletes = client.transport().requests_of(Method::Delete);
        assert_eq!(
            deletes[0].message.as_deref(),
            Some("Delete notice: Sports Day")
        );
        assert_eq!(client.list_notices().unwrap().len(), 2);
    }

    #[test]
    fn deletes_malformed_notice_by_id() {
        let client = StoreFixture::new()
            .with_text("Notices/NOTICE-B-00002.txt", "broken")
            .client();
        delete(&client, "NOTICE-B-00002").unwrap();
        assert!(client.transport().paths().is_empty());
        let deletes = client.transport().requests_of(Method::Delete);
        assert_eq!(
            deletes[0].message.as_deref(),
            Some("Delete notice: NOTICE-B-00002")
        );
    }

    #[test]
    fn deleting_unknown_notice_fails() {
        let client = StoreFixture::new().client();
        assert!(matches!(
            delete(&client, "NOTICE-X-00000"),
            Err(DeskError::Invalid(_))
        ));
        assert!(client.transport().requests_of(Method::Delete).is_empty());
    }

    #[test]
    fn new_id_does_not_touch_the_store() {
        let client = StoreFixture::new().client();
        let result = new_id(&client).unwrap();
        assert!(is_notice_id(&result.notice_id.unwrap()));
        assert!(client.transport().requests().is_empty());
    }
}
