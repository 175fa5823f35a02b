/// Results archive: page source, generated output, optional screenshot and metadata
use crate::config::{
    ARCHIVE_PREFIX, METADATA_MEMBER, OUTPUT_MEMBER, SCREENSHOT_MEMBER, SOURCE_MEMBER,
};
use crate::error::ExtensionError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::{Cursor, Write};
use uuid::Uuid;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Everything captured for one export
#[derive(Debug, Clone)]
pub struct ArchiveInput<'a> {
    /// Extracted page markup; `None` until a page has been processed
    pub markup: Option<&'a str>,
    pub output: &'a str,
    /// `data:image/png;base64,...` as returned by captureVisibleTab
    pub screenshot: Option<&'a str>,
    pub source_url: &'a str,
    pub timestamp: DateTime<Utc>,
}

/// Fresh download name, `gemini-results-<uuid>.zip`
pub fn archive_filename() -> String {
    format!("{}{}.zip", ARCHIVE_PREFIX, Uuid::new_v4())
}

/// ISO-8601 in the same shape as JavaScript's `toISOString`
pub fn iso_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn metadata_text(source_url: &str, timestamp: &DateTime<Utc>) -> String {
    format!("URL: {}\nTimestamp: {}", source_url, iso_timestamp(timestamp))
}

/// Decode the base64 payload of a data URL
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, ExtensionError> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or(ExtensionError::InvalidDataUrl)?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(ExtensionError::InvalidDataUrl);
    }
    STANDARD
        .decode(payload)
        .map_err(|_| ExtensionError::InvalidDataUrl)
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

/// Build the zip bytes. Three members, four with a screenshot.
pub fn build_archive(input: &ArchiveInput<'_>) -> Result<Vec<u8>, ExtensionError> {
    let markup = input.markup.ok_or(ExtensionError::NothingToExport)?;
    let screenshot = input.screenshot.map(decode_data_url).transpose()?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    writer.start_file(SOURCE_MEMBER, stored())?;
    writer.write_all(markup.as_bytes())?;

    writer.start_file(OUTPUT_MEMBER, stored())?;
    writer.write_all(input.output.as_bytes())?;

    if let Some(png) = screenshot {
        writer.start_file(SCREENSHOT_MEMBER, stored())?;
        writer.write_all(&png)?;
    }

    writer.start_file(METADATA_MEMBER, stored())?;
    writer.write_all(metadata_text(input.source_url, &input.timestamp).as_bytes())?;

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;
    use zip::ZipArchive;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 28, 10, 30, 0).unwrap()
    }

    fn read_member(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        content
    }

    #[test]
    fn test_archive_without_screenshot() {
        let bytes = build_archive(&ArchiveInput {
            markup: Some("<html></html>"),
            output: "Gemini Response",
            screenshot: None,
            source_url: "https://example.com/",
            timestamp: timestamp(),
        })
        .unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 3);
        assert_eq!(read_member(&bytes, SOURCE_MEMBER), b"<html></html>");
        assert_eq!(read_member(&bytes, OUTPUT_MEMBER), b"Gemini Response");
        assert_eq!(
            String::from_utf8(read_member(&bytes, METADATA_MEMBER)).unwrap(),
            "URL: https://example.com/\nTimestamp: 2024-10-28T10:30:00.000Z"
        );
    }

    #[test]
    fn test_archive_with_screenshot() {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG fake"));
        let bytes = build_archive(&ArchiveInput {
            markup: Some("<html></html>"),
            output: "",
            screenshot: Some(&data_url),
            source_url: "https://example.com/",
            timestamp: timestamp(),
        })
        .unwrap();

        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 4);
        assert_eq!(read_member(&bytes, SCREENSHOT_MEMBER), b"\x89PNG fake");
    }

    #[test]
    fn test_archive_requires_markup() {
        let err = build_archive(&ArchiveInput {
            markup: None,
            output: "Gemini Response",
            screenshot: None,
            source_url: "https://example.com/",
            timestamp: timestamp(),
        })
        .unwrap_err();

        assert!(matches!(err, ExtensionError::NothingToExport));
    }

    #[test]
    fn test_decode_data_url_rejects_garbage() {
        assert!(decode_data_url("not a data url").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_archive_filename_is_fresh() {
        let first = archive_filename();
        let second = archive_filename();

        assert!(first.starts_with("gemini-results-"));
        assert!(first.ends_with(".zip"));
        let id = &first["gemini-results-".len()..first.len() - ".zip".len()];
        assert!(Uuid::parse_str(id).is_ok());
        assert_ne!(first, second);
    }
}
