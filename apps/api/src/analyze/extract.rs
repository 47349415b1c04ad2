//! PDF text extraction wrapper.
//!
//! Hands uploaded bytes to `pdf-extract` on a blocking thread and gates on a
//! minimal text length. Scanned or protected PDFs yield little or no text;
//! those are rejected here rather than sent to OCR (there is none).

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// Anything shorter than this after trimming is treated as "no usable text".
const MIN_EXTRACTED_CHARS: usize = 5;

/// Extracts text from uploaded PDF bytes.
///
/// Fails with `AppError::Extraction` when the library cannot parse the file
/// or when the result is below the minimal length threshold.
pub async fn extract_resume_text(pdf_bytes: Bytes) -> Result<String, AppError> {
    debug!("Processing file buffer size: {}", pdf_bytes.len());

    // pdf-extract is synchronous and CPU-bound; keep it off the runtime workers
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf_bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))?
        .map_err(|e| {
            AppError::Extraction(format!(
                "Failed to parse PDF file: {e}. Please ensure it's a text-based (not scanned) PDF."
            ))
        })?;

    debug!("Extracted text length: {}", text.chars().count());

    if !meets_min_length(&text) {
        return Err(AppError::Extraction(
            "Failed to parse PDF file: extracted text is too short or empty. \
             The PDF might be image-based or protected. \
             Please ensure it's a text-based (not scanned) PDF."
                .to_string(),
        ));
    }

    Ok(text)
}

fn meets_min_length(text: &str) -> bool {
    text.trim().chars().count() >= MIN_EXTRACTED_CHARS
}
