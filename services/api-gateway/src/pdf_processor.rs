//! PDF Processor
//!
//! Turns an uploaded costing PDF into plain text for the costing decoder.

use anyhow::{Context, Result};
use std::time::Duration;

/// PDF text extraction bounded by a timeout
#[derive(Debug, Clone)]
pub struct PdfProcessor {
    timeout: Duration,
}

impl PdfProcessor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Extract the text of every page, in page order
    pub async fn extract_text(&self, data: Vec<u8>) -> Result<String> {
        let task = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).context("Failed to extract text from PDF")
        });

        let text = tokio::time::timeout(self.timeout, task)
            .await
            .with_context(|| format!("PDF extraction timed out after {:?}", self.timeout))?
            .context("PDF extraction task panicked")??;

        tracing::debug!(chars = text.len(), "Extracted PDF text");
        Ok(text)
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_bytes_fail_to_extract() {
        let processor = PdfProcessor::default();
        let result = processor.extract_text(b"definitely not a pdf".to_vec()).await;

        assert!(result.is_err());
    }
}
