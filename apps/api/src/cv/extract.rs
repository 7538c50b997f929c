//! PDF text extraction for uploaded CVs.

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

use crate::errors::AppError;

/// Decodes a base64 PDF payload. Accepts a `data:application/pdf;base64,` prefix.
pub fn decode_pdf_base64(payload: &str) -> Result<Vec<u8>, AppError> {
    let payload = payload.trim();
    let payload = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::Validation(format!("pdf_base64 is not valid base64: {e}")))?;

    if !bytes.starts_with(b"%PDF") {
        return Err(AppError::Validation(
            "pdf_base64 does not contain a PDF document".to_string(),
        ));
    }
    Ok(bytes)
}

/// Extracts text on a blocking thread. `pdf-extract` can panic on malformed
/// files, so the call is wrapped in `catch_unwind`.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?;

    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(AppError::PdfExtraction(e.to_string())),
        Err(_) => {
            return Err(AppError::PdfExtraction(
                "malformed PDF (extractor panicked)".to_string(),
            ))
        }
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::PdfExtraction(
            "PDF contains no extractable text".to_string(),
        ));
    }

    debug!("Extracted {} chars from PDF", text.chars().count());
    Ok(text)
}
