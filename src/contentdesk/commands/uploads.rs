use crate::commands::{require_title, write_all, CmdResult, WriteStep};
use crate::error::{DeskError, Result};
use crate::model::{BinaryAsset, UploadFolder};
use crate::paths::{self, DATA_FILE};
use crate::record::TextRecord;
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;

/// Writes the folder's `data.txt`, then every file under its original name.
pub fn create<T: ContentsTransport>(
    client: &ContentClient<T>,
    upload: &UploadFolder,
    files: &[BinaryAsset],
) -> Result<CmdResult> {
    require_title(&upload.title)?;
    if files.is_empty() {
        return Err(DeskError::Invalid(
            "At least one file is required".to_string(),
        ));
    }

    let mut steps = vec![WriteStep::text(
        paths::upload_data(&upload.folder)?,
        upload.encode()?,
        format!("Add upload folder: {}", upload.title),
    )];
    for file in files {
        if file.file_name == DATA_FILE {
            return Err(DeskError::Invalid(format!(
                "A file named {} would overwrite the folder metadata",
                DATA_FILE
            )));
        }
        steps.push(WriteStep::binary(
            paths::upload_file(&upload.folder, &file.file_name)?,
            &file.bytes,
            format!("Add file: {}", file.file_name),
        ));
    }
    client.location()?;

    let report = write_all(client, steps);
    Ok(CmdResult::from_batch(
        report,
        format!(
            "Upload completed: {} ({} file(s))",
            upload.title,
            files.len()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ItemStatus;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::Method;
    use chrono::NaiveDate;

    fn forms(description: Option<&str>) -> UploadFolder {
        UploadFolder {
            folder: "forms".into(),
            title: "Forms".into(),
            date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn writes_metadata_then_files_in_order() {
        let client = StoreFixture::new().client();
        let files = vec![
            BinaryAsset::new("leave.pdf", b"%PDF-1.4".to_vec()),
            BinaryAsset::new("fees.xlsx", vec![0x50, 0x4b, 0x03, 0x04]),
        ];
        let result = create(&client, &forms(Some("Term forms")), &files).unwrap();
        assert!(!result.has_errors());

        let puts: Vec<String> = client
            .transport()
            .requests_of(Method::Put)
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(
            puts,
            [
                "Uploads/forms/data.txt",
                "Uploads/forms/leave.pdf",
                "Uploads/forms/fees.xlsx"
            ]
        );
        assert_eq!(
            client.transport().file("Uploads/forms/data.txt").unwrap(),
            b"Forms\n2024-02-10\nTerm forms"
        );
    }

    #[test]
    fn missing_description_is_an_empty_line() {
        let client = StoreFixture::new().client();
        let files = vec![BinaryAsset::new("a.pdf", vec![1])];
        create(&client, &forms(None), &files).unwrap();
        assert_eq!(
            client.transport().file("Uploads/forms/data.txt").unwrap(),
            b"Forms\n2024-02-10\n"
        );
    }

    #[test]
    fn failure_stops_remaining_files() {
        let fixture = StoreFixture::new();
        fixture.transport.fail_writes_to("Uploads/forms/b.pdf");
        let client = fixture.client();
        let files = vec![
            BinaryAsset::new("a.pdf", vec![1]),
            BinaryAsset::new("b.pdf", vec![2]),
            BinaryAsset::new("c.pdf", vec![3]),
        ];

        let result = create(&client, &forms(None), &files).unwrap();
        assert!(result.has_errors());
        let batch = result.batch.unwrap();
        assert_eq!(batch.written(), 2);
        assert_eq!(batch.items[3].status, ItemStatus::Skipped);
        assert!(client.transport().file("Uploads/forms/a.pdf").is_some());
        assert!(client.transport().file("Uploads/forms/c.pdf").is_none());
    }

    #[test]
    fn requires_files() {
        let client = StoreFixture::new().client();
        assert!(create(&client, &forms(None), &[]).is_err());
    }

    #[test]
    fn refuses_file_named_like_metadata() {
        let client = StoreFixture::new().client();
        let files = vec![BinaryAsset::new("data.txt", vec![1])];
        assert!(matches!(
            create(&client, &forms(None), &files),
            Err(DeskError::Invalid(_))
        ));
        assert!(client.transport().requests().is_empty());
    }
}
