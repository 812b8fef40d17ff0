use crate::commands::{require_title, write_all, CmdResult, WriteStep};
use crate::error::Result;
use crate::model::{Achievement, BinaryAsset};
use crate::paths;
use crate::record::TextRecord;
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;

/// Writes `Achievements/<folder>/data.txt` and, when given, the image as
/// `Achievements/<folder>/image.jpg`. An existing folder of the same name is
/// updated in place.
pub fn create<T: ContentsTransport>(
    client: &ContentClient<T>,
    achievement: &Achievement,
    image: Option<&BinaryAsset>,
) -> Result<CmdResult> {
    require_title(&achievement.title)?;
    let data_path = paths::achievement_data(&achievement.folder)?;
    let record = achievement.encode()?;
    client.location()?;

    let title = &achievement.title;
    let mut steps = vec![WriteStep::text(
        data_path,
        record,
        format!("Add achievement: {}", title),
    )];
    if let Some(image) = image {
        steps.push(WriteStep::binary(
            paths::achievement_image(&achievement.folder)?,
            &image.bytes,
            format!("Add image for achievement: {}", title),
        ));
    }

    let report = write_all(client, steps);
    Ok(CmdResult::from_batch(
        report,
        format!("Achievement created: {}", title),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ItemStatus;
    use crate::error::DeskError;
    use crate::model::AchievementCategory;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::Method;
    use chrono::NaiveDate;

    fn spring_fair() -> Achievement {
        Achievement {
            folder: "spring-fair".into(),
            title: "Spring Fair".into(),
            category: AchievementCategory::Activity,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: "Annual fair".into(),
        }
    }

    #[test]
    fn writes_data_file_without_touching_image() {
        let client = StoreFixture::new().client();
        let result = create(&client, &spring_fair(), None).unwrap();
        assert!(!result.has_errors());

        let stored = client
            .transport()
            .file("Achievements/spring-fair/data.txt")
            .unwrap();
        assert_eq!(
            String::from_utf8(stored).unwrap(),
            "Spring Fair\nActivity\n2024-05-01\nAnnual fair"
        );
        assert!(client
            .transport()
            .requests()
            .iter()
            .all(|r| !r.path.ends_with("image.jpg")));
    }

    #[test]
    fn image_is_stored_as_image_jpg() {
        let client = StoreFixture::new().client();
        let image = BinaryAsset::new("trophy.png", vec![0x89, b'P', b'N', b'G']);
        create(&client, &spring_fair(), Some(&image)).unwrap();

        assert_eq!(
            client
                .transport()
                .file("Achievements/spring-fair/image.jpg")
                .unwrap(),
            image.bytes
        );
        let puts = client.transport().requests_of(Method::Put);
        assert_eq!(
            puts[1].message.as_deref(),
            Some("Add image for achievement: Spring Fair")
        );
    }

    #[test]
    fn resubmitting_updates_existing_folder() {
        let client = StoreFixture::new()
            .with_text("Achievements/spring-fair/data.txt", "old")
            .client();
        let result = create(&client, &spring_fair(), None).unwrap();
        assert!(!result.has_errors());
        let puts = client.transport().requests_of(Method::Put);
        assert!(puts[0].sha.is_some());
    }

    #[test]
    fn image_failure_reports_partial_batch() {
        let fixture = StoreFixture::new();
        fixture
            .transport
            .fail_writes_to("Achievements/spring-fair/image.jpg");
        let client = fixture.client();
        let image = BinaryAsset::new("a.jpg", vec![1, 2, 3]);

        let result = create(&client, &spring_fair(), Some(&image)).unwrap();
        assert!(result.has_errors());
        let batch = result.batch.unwrap();
        assert_eq!(batch.items[0].status, ItemStatus::Written);
        assert!(matches!(batch.items[1].status, ItemStatus::Failed(_)));
    }

    #[test]
    fn rejects_bad_folder_before_any_request() {
        let client = StoreFixture::new().client();
        let mut achievement = spring_fair();
        achievement.folder = "../escape".into();
        assert!(matches!(
            create(&client, &achievement, None),
            Err(DeskError::Invalid(_))
        ));
        assert!(client.transport().requests().is_empty());
    }
}
