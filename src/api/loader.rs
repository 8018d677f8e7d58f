//! Purpose: Asynchronous byte acquisition feeding parse results into a `ReportViewer`.
//! Exports: `LoadEvent`, `load_files`, `read_report`.
//! Role: Stands in for the file picker: reads run concurrently, completions apply in arrival order.
//! Invariants: Each path gets its generation before any read starts, in argument order.
//! Invariants: The pipeline runs only after a file's bytes are fully in memory.
//! Invariants: Read failures never reach the pipeline; they surface with the file path.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::api::viewer::{ApplyOutcome, Generation, ReportViewer};
use crate::core::error::{Error, from_read_error};
use crate::core::model::Report;
use crate::core::pipeline::parse_report_bytes;

#[derive(Debug)]
pub struct LoadEvent {
    pub generation: Generation,
    pub path: PathBuf,
    pub outcome: ApplyOutcome,
}

/// Read and parse every path as successive selections; returns events in completion order.
pub async fn load_files(viewer: &mut ReportViewer, paths: &[PathBuf]) -> Vec<LoadEvent> {
    let mut tasks = JoinSet::new();
    for path in paths {
        let generation = viewer.begin_load();
        let path = path.clone();
        tasks.spawn(async move {
            let result = read_report(&path).await;
            (generation, path, result)
        });
    }

    let mut events = Vec::with_capacity(paths.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((generation, path, result)) => {
                let outcome = viewer.complete(generation, result);
                events.push(LoadEvent {
                    generation,
                    path,
                    outcome,
                });
            }
            Err(err) => tracing::error!(error = %err, "report load task failed"),
        }
    }
    events
}

pub async fn read_report(path: &Path) -> Result<Report, Error> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| from_read_error(err, path))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read report file");
    parse_report_bytes(&bytes).map_err(|err| err.with_path(path))
}
