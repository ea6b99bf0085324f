//! Document text extraction — turns an uploaded CV or job description file
//! into normalized plain text plus advisory candidate name / contact fields.

pub mod contact;

use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

use crate::errors::AppError;
use crate::models::cv::ContactInfo;

/// Extraction output. `candidate_name` and `contact_info` are best-effort
/// heuristics — downstream consumers must treat them as advisory.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub content: String,
    pub candidate_name: Option<String>,
    pub contact_info: Option<ContactInfo>,
}

/// Extracts plain text from raw document bytes, dispatching on the filename
/// extension. Recognized: `.txt`, `.docx`, `.pdf`.
pub fn extract_document(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, AppError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let (content, scan_heuristics) = match extension.as_str() {
        "txt" => (extract_txt(bytes)?, false),
        "docx" => (extract_docx(bytes)?, true),
        "pdf" => (extract_pdf(bytes)?, true),
        _ => {
            return Err(AppError::UnsupportedFormat(format!(
                "unsupported file type: {filename}"
            )))
        }
    };

    if content.trim().is_empty() {
        return Err(AppError::Extraction(format!(
            "no usable text extracted from {filename}"
        )));
    }

    debug!(
        "extracted {} chars from {filename} ({extension})",
        content.len()
    );

    // Plain-text uploads carry no layout cues worth scanning
    let (candidate_name, contact_info) = if scan_heuristics {
        (
            contact::extract_candidate_name(&content),
            contact::extract_contact_info(&content),
        )
    } else {
        (None, None)
    };

    Ok(ExtractedDocument {
        content,
        candidate_name,
        contact_info,
    })
}

fn extract_txt(bytes: &[u8]) -> Result<String, AppError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::Extraction("text file is not valid UTF-8".to_string()))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("failed to parse PDF: {e}")))
}

/// Concatenates document paragraphs with newlines, mirroring how the text
/// reads in the source file.
fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let docx =
        read_docx(bytes).map_err(|e| AppError::Extraction(format!("failed to parse DOCX: {e}")))?;

    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut text = String::new();
            for pc in paragraph.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_passthrough() {
        let doc = extract_document(b"Jane Doe\nBackend engineer", "cv.txt").unwrap();
        assert_eq!(doc.content, "Jane Doe\nBackend engineer");
        // plain text skips the heuristics
        assert!(doc.candidate_name.is_none());
        assert!(doc.contact_info.is_none());
    }

    #[test]
    fn test_txt_extension_case_insensitive() {
        let doc = extract_document(b"hello", "cv.TXT").unwrap();
        assert_eq!(doc.content, "hello");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = extract_document(b"data", "cv.odt").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_extension_rejected() {
        let err = extract_document(b"data", "resume").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_text_is_extraction_failure() {
        let err = extract_document(b"   \n  ", "cv.txt").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_invalid_utf8_is_extraction_failure() {
        let err = extract_document(&[0xff, 0xfe, 0x41], "cv.txt").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
