//! Best-effort text extraction. Nothing in here fails an upload: unreadable
//! content degrades to a placeholder that names the file.

use std::io::{Cursor, Read};

use tracing::warn;

/// Upload formats the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Text,
    Zip,
}

const WORD_MIME_TYPES: [&str; 2] = [
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

impl FileKind {
    /// Classifies by extension, then by the declared MIME type.
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        Self::from_extension(filename).or_else(|| {
            let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
            match mime.as_str() {
                "application/pdf" => Some(FileKind::Pdf),
                "text/plain" => Some(FileKind::Text),
                "application/zip" | "application/x-zip-compressed" => Some(FileKind::Zip),
                m if WORD_MIME_TYPES.contains(&m) => Some(FileKind::Word),
                _ => None,
            }
        })
    }

    pub fn from_extension(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "doc" | "docx" => Some(FileKind::Word),
            "txt" => Some(FileKind::Text),
            "zip" => Some(FileKind::Zip),
            _ => None,
        }
    }
}

/// Text pulled out of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub content: String,
    /// Set when the content is a placeholder because the file could not be read.
    pub degraded: bool,
}

impl ExtractedText {
    fn ok(content: String) -> Self {
        Self {
            content,
            degraded: false,
        }
    }

    fn placeholder(content: String) -> Self {
        Self {
            content,
            degraded: true,
        }
    }
}

/// Extracts text from a single (non-archive) file.
pub fn extract_text(bytes: &[u8], filename: &str, kind: FileKind) -> ExtractedText {
    match kind {
        FileKind::Text => ExtractedText::ok(String::from_utf8_lossy(bytes).into_owned()),
        FileKind::Pdf => extract_pdf(bytes, filename),
        FileKind::Word => ExtractedText::ok(format!(
            "[Word Document] - {filename}\n\nWord document uploaded; full parsing not implemented."
        )),
        FileKind::Zip => ExtractedText::placeholder(format!(
            "[ZIP Archive] - {filename}\n\nNested archives are not extracted."
        )),
    }
}

fn extract_pdf(bytes: &[u8], filename: &str) -> ExtractedText {
    // pdf-extract panics on some malformed inputs.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match result {
        Ok(Ok(text)) if !text.trim().is_empty() => ExtractedText::ok(text),
        Ok(Ok(_)) => {
            warn!("PDF {filename} contained no extractable text");
            ExtractedText::placeholder(pdf_placeholder(filename))
        }
        Ok(Err(e)) => {
            warn!("PDF extraction failed for {filename}: {e}");
            ExtractedText::placeholder(pdf_placeholder(filename))
        }
        Err(_) => {
            warn!("PDF extraction panicked for {filename}");
            ExtractedText::placeholder(pdf_placeholder(filename))
        }
    }
}

fn pdf_placeholder(filename: &str) -> String {
    format!("[PDF Content] - {filename}\n\nText could not be extracted from this PDF.")
}

/// One member of an uploaded archive, already run through `extract_text`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub text: ExtractedText,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to read ZIP file: {0}")]
pub struct ArchiveError(#[from] zip::result::ZipError);

/// Expands a ZIP archive. Directories, nested archives and unsupported
/// extensions are skipped; every other member becomes one entry.
///
/// At most `max_member_bytes` are decompressed per member. Larger members are
/// kept as a degraded placeholder.
pub fn extract_zip(
    bytes: &[u8],
    max_member_bytes: usize,
) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();

    for index in 0..archive.len() {
        let mut member = archive.by_index(index)?;
        if member.is_dir() {
            continue;
        }
        let name = member.name().to_string();
        let kind = match FileKind::from_extension(&name) {
            Some(FileKind::Zip) | None => continue,
            Some(kind) => kind,
        };

        let limit = max_member_bytes as u64;
        let mut buffer = Vec::new();
        let text = match (&mut member).take(limit + 1).read_to_end(&mut buffer) {
            Ok(read) if read as u64 > limit => {
                warn!("Archive member {name} exceeds {max_member_bytes} bytes; skipped extraction");
                ExtractedText::placeholder(format!(
                    "[Oversized File] - {name}\n\nThis archive member exceeds the {max_member_bytes} byte limit."
                ))
            }
            Ok(_) => extract_text(&buffer, &name, kind),
            Err(e) => {
                warn!("Failed to read archive member {name}: {e}");
                ExtractedText::placeholder(format!(
                    "[Unreadable File] - {name}\n\nThis archive member could not be read."
                ))
            }
        };
        entries.push(ArchiveEntry { name, text });
    }

    Ok(entries)
}
