//! Purpose: Compose decode, unwrap, normalize and model building into one pure call.
//! Exports: `parse_report`, `parse_report_with`, `parse_report_bytes`.
//! Role: The only entry point presentation code needs to turn text into a `Report`.
//! Invariants: Either a complete `Report` or a decode error; no partial results.
//! Invariants: No I/O and no shared state; identical input yields identical output.

use crate::core::decode::{self, DecodeOptions};
use crate::core::envelope::unwrap_envelope;
use crate::core::error::{DecodeFailureCategory, Error};
use crate::core::model::Report;
use crate::core::normalize::normalize_records;

pub fn parse_report(text: &str) -> Result<Report, Error> {
    parse_report_with(text, &DecodeOptions::default())
}

pub fn parse_report_with(text: &str, options: &DecodeOptions) -> Result<Report, Error> {
    let tree = decode::decode_document(text, options)?;
    let mut body = unwrap_envelope(tree);
    normalize_records(&mut body);
    let report = Report::from_body(&body);
    tracing::debug!(records = report.record.len(), "parsed report");
    Ok(report)
}

/// Like `parse_report`, for raw file bytes; invalid UTF-8 is a decode failure.
pub fn parse_report_bytes(bytes: &[u8]) -> Result<Report, Error> {
    let text = std::str::from_utf8(bytes).map_err(|err| {
        let offset = err.valid_up_to() as u64;
        Error::decode(DecodeFailureCategory::Encoding)
            .with_message("report is not valid UTF-8")
            .with_offset(offset)
            .with_hint(format!(
                "decode category: encoding; first invalid byte at offset {offset}. Compressed (.gz/.zip) reports must be extracted first."
            ))
            .with_source(err)
    })?;
    parse_report(text)
}
