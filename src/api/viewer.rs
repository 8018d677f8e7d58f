//! Purpose: Own the "currently displayed report" for a presentation layer.
//! Exports: `ReportViewer`, `Generation`, `ApplyOutcome`.
//! Role: Orders independent parse completions so the newest selection wins.
//! Invariants: Generations are issued strictly increasing, one per file selection.
//! Invariants: A successful parse older than the displayed one is discarded as stale.
//! Invariants: A failed load never replaces or clears the displayed report.

use crate::core::error::Error;
use crate::core::model::Report;

/// Tag for one file selection; later selections compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub enum ApplyOutcome {
    Displayed,
    /// A newer selection is already on screen.
    Stale { displayed: Generation },
    /// The load failed; whatever was displayed stays displayed.
    Rejected(Error),
}

#[derive(Debug, Default)]
pub struct ReportViewer {
    issued: u64,
    current: Option<(Generation, Report)>,
}

impl ReportViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new file selection.
    pub fn begin_load(&mut self) -> Generation {
        self.issued += 1;
        Generation(self.issued)
    }

    pub fn complete(
        &mut self,
        generation: Generation,
        result: Result<Report, Error>,
    ) -> ApplyOutcome {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                tracing::info!(
                    generation = generation.get(),
                    error = %err,
                    "load rejected; keeping displayed report"
                );
                return ApplyOutcome::Rejected(err);
            }
        };
        if let Some((displayed, _)) = &self.current {
            if generation < *displayed {
                tracing::info!(
                    generation = generation.get(),
                    displayed = displayed.get(),
                    "discarding stale report"
                );
                return ApplyOutcome::Stale {
                    displayed: *displayed,
                };
            }
        }
        self.current = Some((generation, report));
        ApplyOutcome::Displayed
    }

    pub fn report(&self) -> Option<&Report> {
        self.current.as_ref().map(|(_, report)| report)
    }

    pub fn displayed_generation(&self) -> Option<Generation> {
        self.current.as_ref().map(|(generation, _)| *generation)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplyOutcome, ReportViewer};
    use crate::core::error::{DecodeFailureCategory, Error};
    use crate::core::model::{Record, Report};

    fn report_with(records: usize) -> Report {
        Report {
            record: vec![Record::default(); records],
            ..Report::default()
        }
    }

    #[test]
    fn generations_increase() {
        let mut viewer = ReportViewer::new();
        let first = viewer.begin_load();
        let second = viewer.begin_load();
        assert!(second > first);
        assert_eq!(second.get(), first.get() + 1);
    }

    #[test]
    fn out_of_order_completion_keeps_newest() {
        let mut viewer = ReportViewer::new();
        let older = viewer.begin_load();
        let newer = viewer.begin_load();

        assert!(matches!(
            viewer.complete(newer, Ok(report_with(2))),
            ApplyOutcome::Displayed
        ));
        assert!(matches!(
            viewer.complete(older, Ok(report_with(1))),
            ApplyOutcome::Stale { displayed } if displayed == newer
        ));
        assert_eq!(viewer.report().map(|r| r.record.len()), Some(2));
        assert_eq!(viewer.displayed_generation(), Some(newer));
    }

    #[test]
    fn in_order_completion_replaces_wholesale() {
        let mut viewer = ReportViewer::new();
        let older = viewer.begin_load();
        let newer = viewer.begin_load();
        viewer.complete(older, Ok(report_with(3)));
        viewer.complete(newer, Ok(report_with(1)));
        assert_eq!(viewer.report().map(|r| r.record.len()), Some(1));
    }

    #[test]
    fn failure_keeps_previous_report() {
        let mut viewer = ReportViewer::new();
        let first = viewer.begin_load();
        viewer.complete(first, Ok(report_with(1)));

        let second = viewer.begin_load();
        let outcome = viewer.complete(
            second,
            Err(Error::decode(DecodeFailureCategory::IllFormed).with_message("unclosed")),
        );
        assert!(matches!(outcome, ApplyOutcome::Rejected(_)));
        assert_eq!(viewer.displayed_generation(), Some(first));
        assert_eq!(viewer.report().map(|r| r.record.len()), Some(1));
    }

    #[test]
    fn failure_with_nothing_displayed_leaves_nothing() {
        let mut viewer = ReportViewer::new();
        let generation = viewer.begin_load();
        viewer.complete(generation, Err(Error::decode(DecodeFailureCategory::Syntax)));
        assert!(viewer.report().is_none());
    }
}
