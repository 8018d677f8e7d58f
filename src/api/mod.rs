//! Purpose: Define the stable public Rust API boundary for dmarcview.
//! Exports: Pipeline entry points, report model types, viewer state, and errors.
//! Role: Public, additive-only surface; the CLI and tests go through this module.
//! Invariants: Parsing stays a pure function; display state lives in `ReportViewer`.
//! Invariants: Tree-level types are exported for callers that normalize their own trees.

mod loader;
mod viewer;

pub use crate::core::decode::{DEFAULT_MAX_DEPTH, DecodeOptions, decode_document};
pub use crate::core::envelope::{ENVELOPE_KEY, unwrap_envelope};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{DecodeFailureCategory, Error, ErrorKind};
pub use crate::core::model::{
    AuthResults, DateRange, DkimAuthResult, Identifiers, PolicyEvaluated, PolicyPublished, Record,
    Report, ReportMetadata, Row, SpfAuthResult,
};
pub use crate::core::node::{Mapping, Node};
pub use crate::core::normalize::{RECORD_KEY, normalize_records};
pub use crate::core::pipeline::{parse_report, parse_report_bytes, parse_report_with};
pub use loader::{LoadEvent, load_files, read_report};
pub use viewer::{ApplyOutcome, Generation, ReportViewer};
