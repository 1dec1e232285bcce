// src/services/extractor.rs

use std::{
    fmt,
    io::{Cursor, Read},
    sync::LazyLock,
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::{Reader, events::Event};
use regex::Regex;
use thiserror::Error;

use crate::config::{EXTRACTED_TEXT_LIMIT, MAX_UPLOAD_BYTES};

static REPEATED_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \u{00A0}]{2,}").expect("valid whitespace pattern"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("filename and file content are required")]
    MissingInput,

    #[error("unsupported file type: .{0}")]
    UnsupportedExtension(String),

    #[error("file too large (max {} MB)", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("file content is not valid base64")]
    InvalidBase64,

    #[error("text file is not valid UTF-8")]
    Encoding,

    #[error("could not read {kind} document: {reason}")]
    Malformed { kind: DocumentKind, reason: String },
}

/// The file types text can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Picks the document kind from the text after the last `.` of the name.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" => Ok(DocumentKind::Txt),
            _ => Err(ExtractError::UnsupportedExtension(ext)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Txt => "text",
        };
        f.write_str(name)
    }
}

/// Decodes an uploaded file and returns its normalized plain text.
///
/// * Rejects unsupported extensions before touching the payload.
/// * Enforces the upload ceiling on the decoded size.
/// * Runs the document parsers on the blocking pool.
pub async fn extract_text(filename: &str, content: &str) -> Result<String, ExtractError> {
    if filename.trim().is_empty() || content.trim().is_empty() {
        return Err(ExtractError::MissingInput);
    }

    let kind = DocumentKind::from_filename(filename)?;
    let bytes = decode_payload(content, MAX_UPLOAD_BYTES)?;

    tracing::debug!("Extracting {} text from '{}' ({} bytes)", kind, filename, bytes.len());

    let raw = tokio::task::spawn_blocking(move || extract_bytes(kind, &bytes))
        .await
        .map_err(|e| ExtractError::Malformed {
            kind,
            reason: format!("parser aborted: {}", e),
        })??;

    Ok(normalize(&raw, EXTRACTED_TEXT_LIMIT))
}

/// Decodes base64 content, refusing anything larger than `max_bytes` once decoded.
/// A `data:` URL prefix is tolerated.
pub fn decode_payload(content: &str, max_bytes: usize) -> Result<Vec<u8>, ExtractError> {
    let encoded = match content.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => content,
    }
    .trim();

    // Every 4 base64 characters carry 3 bytes.
    if encoded.len() / 4 * 3 > max_bytes + 3 {
        return Err(ExtractError::TooLarge);
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| ExtractError::InvalidBase64)?;

    if bytes.len() > max_bytes {
        return Err(ExtractError::TooLarge);
    }
    Ok(bytes)
}

/// Pulls raw text out of a decoded document.
pub fn extract_bytes(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| malformed(kind, e))
        }
        DocumentKind::Docx => docx_text(bytes),
        DocumentKind::Txt => String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::Encoding),
    }
}

/// Strips carriage returns, turns tabs into spaces, collapses repeated spaces,
/// trims, then clamps to `limit` characters.
pub fn normalize(text: &str, limit: usize) -> String {
    let text = text.replace('\r', "").replace('\t', " ");
    let text = REPEATED_SPACES.replace_all(&text, " ");
    let text = text.trim();

    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let kind = DocumentKind::Docx;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| malformed(kind, e))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| malformed(kind, e))?
        .read_to_string(&mut xml)
        .map_err(|e| malformed(kind, e))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_run_text => {
                text.push_str(&e.unescape().map_err(|e| malformed(kind, e))?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(kind, e)),
            _ => {}
        }
    }

    Ok(text)
}

fn malformed(kind: DocumentKind, err: impl fmt::Display) -> ExtractError {
    ExtractError::Malformed {
        kind,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn csv_is_unsupported() {
        match DocumentKind::from_filename("notes.csv") {
            Err(ExtractError::UnsupportedExtension(ext)) => assert_eq!(ext, "csv"),
            other => panic!("expected unsupported extension, got {:?}", other),
        }
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(
            DocumentKind::from_filename("Lecture.Notes.PDF").unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(DocumentKind::from_filename("a.docx").unwrap(), DocumentKind::Docx);
        assert!(DocumentKind::from_filename("README").is_err());
    }

    #[test]
    fn normalize_cleans_whitespace() {
        let raw = "  Line one\r\n\tindented\u{00A0}\u{00A0}text   here  ";
        assert_eq!(normalize(raw, 1000), "Line one\n indented text here");
    }

    #[test]
    fn normalize_clamps_by_characters() {
        let raw = "שלום עולם";
        assert_eq!(normalize(raw, 4), "שלום");
        assert_eq!(normalize("short", 100), "short");
    }

    #[test]
    fn decode_rejects_oversized_payload() {
        let content = STANDARD.encode(vec![0u8; 64]);
        assert!(matches!(
            decode_payload(&content, 32),
            Err(ExtractError::TooLarge)
        ));
        assert_eq!(decode_payload(&content, 64).unwrap().len(), 64);
    }

    #[test]
    fn decode_accepts_data_url() {
        let content = format!("data:text/plain;base64,{}", STANDARD.encode("hi"));
        assert_eq!(decode_payload(&content, 10).unwrap(), b"hi");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_payload("not base64!!", 100),
            Err(ExtractError::InvalidBase64)
        ));
    }

    #[test]
    fn invalid_utf8_text_is_an_encoding_error() {
        assert!(matches!(
            extract_bytes(DocumentKind::Txt, &[0xff, 0xfe, 0x00]),
            Err(ExtractError::Encoding)
        ));
    }

    #[test]
    fn docx_paragraphs_become_lines() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>Phishing</w:t></w:r><w:r><w:t xml:space="preserve"> targets people.</w:t></w:r></w:p><w:p><w:r><w:t>Use MFA &amp; strong passwords.</w:t><w:tab/><w:t>Always.</w:t></w:r></w:p>"#,
        );

        let text = extract_bytes(DocumentKind::Docx, &bytes).unwrap();
        assert_eq!(
            text,
            "Phishing targets people.\nUse MFA & strong passwords.\tAlways.\n"
        );
    }

    #[test]
    fn broken_docx_is_malformed() {
        assert!(matches!(
            extract_bytes(DocumentKind::Docx, b"definitely not a zip archive"),
            Err(ExtractError::Malformed { kind: DocumentKind::Docx, .. })
        ));
    }

    #[tokio::test]
    async fn extracts_plain_text_upload() {
        let content = STANDARD.encode("Firewalls\tfilter   traffic.\r\nIDS detects intrusions.");
        let text = extract_text("notes.txt", &content).await.unwrap();
        assert_eq!(text, "Firewalls filter traffic.\nIDS detects intrusions.");
    }

    #[tokio::test]
    async fn unsupported_upload_produces_no_text() {
        let content = STANDARD.encode("a,b,c");
        assert!(matches!(
            extract_text("notes.csv", &content).await,
            Err(ExtractError::UnsupportedExtension(_))
        ));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        assert!(matches!(
            extract_text("", "abcd").await,
            Err(ExtractError::MissingInput)
        ));
    }
}
