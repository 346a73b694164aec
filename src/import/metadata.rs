use chrono::NaiveDate;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What the importer records about a media file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub mime_type: Option<String>,
    /// Unix seconds of EXIF `DateTimeOriginal`, when present.
    pub captured: Option<i64>,
}

/// Read dimensions, mime type and capture time. Unreadable parts are left
/// empty rather than failing the import.
pub fn read_metadata(path: &Path) -> MediaMetadata {
    let mut metadata = MediaMetadata {
        mime_type: mime_type_for(path).map(str::to_string),
        ..MediaMetadata::default()
    };

    if let Ok((width, height)) = image::image_dimensions(path) {
        metadata.width = Some(width as i64);
        metadata.height = Some(height as i64);
    }

    if let Ok(file) = File::open(path) {
        let mut bufreader = BufReader::new(file);
        if let Ok(exif) = exif::Reader::new().read_from_container(&mut bufreader) {
            if let Some(field) = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY) {
                if let exif::Value::Ascii(ref values) = field.value {
                    metadata.captured = values.first().and_then(|raw| parse_exif_datetime(raw));
                }
            }
        }
    }

    metadata
}

/// `2024:05:01 12:30:00` as unix seconds, read as UTC.
pub fn parse_exif_datetime(raw: &[u8]) -> Option<i64> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    let timestamp = NaiveDate::from_ymd_opt(dt.year as i32, dt.month as u32, dt.day as u32)?
        .and_hms_opt(dt.hour as u32, dt.minute as u32, dt.second as u32)?
        .and_utc()
        .timestamp();
    Some(timestamp)
}

pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "mov" => "video/quicktime",
        "flv" => "video/x-flv",
        _ => return None,
    };
    Some(mime)
}
