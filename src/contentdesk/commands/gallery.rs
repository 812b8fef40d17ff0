use crate::commands::{write_all, CmdMessage, CmdResult, WriteStep};
use crate::error::{DeskError, Result};
use crate::model::BinaryAsset;
use crate::paths;
use crate::store::client::ContentClient;
use crate::store::ContentsTransport;

const IMAGE_EXTENSIONS: [&str; 11] = [
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "svg", "heic", "avif", "tif", "tiff",
];

pub fn is_image(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Uploads images to `Gallery/<folder>/`. Files that are not images are left
/// out and reported.
pub fn create<T: ContentsTransport>(
    client: &ContentClient<T>,
    folder: &str,
    images: &[BinaryAsset],
) -> Result<CmdResult> {
    paths::validate_segment("Folder name", folder)?;

    let (accepted, rejected): (Vec<&BinaryAsset>, Vec<&BinaryAsset>) =
        images.iter().partition(|i| is_image(&i.file_name));
    if accepted.is_empty() {
        return Err(DeskError::Invalid("No image files to upload".to_string()));
    }

    let steps = accepted
        .iter()
        .map(|image| {
            Ok(WriteStep::binary(
                paths::gallery_image(folder, &image.file_name)?,
                &image.bytes,
                format!("Add image: {} to gallery {}", image.file_name, folder),
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    client.location()?;

    let report = write_all(client, steps);
    let mut result = CmdResult::from_batch(
        report,
        format!(
            "Gallery updated: {} ({} image(s))",
            folder,
            accepted.len()
        ),
    );
    for skipped in rejected {
        result.add_message(CmdMessage::warning(format!(
            "Skipped non-image file: {}",
            skipped.file_name
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::Method;

    #[test]
    fn recognises_image_extensions() {
        assert!(is_image("IMG_0001.JPG"));
        assert!(is_image("scan.tiff"));
        assert!(!is_image("notes.pdf"));
        assert!(!is_image("jpg"));
    }

    #[test]
    fn uploads_images_under_original_names() {
        let client = StoreFixture::new().client();
        let images = vec![
            BinaryAsset::new("one.jpg", vec![0xff, 0xd8]),
            BinaryAsset::new("two.png", vec![0x89, 0x50]),
        ];
        let result = create(&client, "sports-day", &images).unwrap();
        assert!(!result.has_errors());

        assert_eq!(
            client.transport().file("Gallery/sports-day/two.png").unwrap(),
            vec![0x89, 0x50]
        );
        let puts = client.transport().requests_of(Method::Put);
        assert_eq!(
            puts[0].message.as_deref(),
            Some("Add image: one.jpg to gallery sports-day")
        );
    }

    #[test]
    fn non_images_are_skipped_with_warning() {
        let client = StoreFixture::new().client();
        let images = vec![
            BinaryAsset::new("one.jpg", vec![1]),
            BinaryAsset::new("minutes.docx", vec![2]),
        ];
        let result = create(&client, "day", &images).unwrap();
        assert_eq!(client.transport().requests_of(Method::Put).len(), 1);
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning && m.content.contains("minutes.docx")));
    }

    #[test]
    fn nothing_to_upload_is_an_error() {
        let client = StoreFixture::new().client();
        let images = vec![BinaryAsset::new("a.txt", vec![1])];
        assert!(create(&client, "day", &images).is_err());
        assert!(client.transport().requests().is_empty());
    }
}
