//! Purpose: Hold top-level CLI command dispatch for `dmarcview`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: The shown report is whatever `ReportViewer` ends up displaying.
//! Invariants: When any selection fails, the exit code comes from the newest failure.

use super::*;

use dmarcview::api::{ApplyOutcome, Generation, LoadEvent, Report, ReportViewer, load_files};
use dmarcview::notice::load_notice;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "dmarcview", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Show { files, format } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            let mut viewer = ReportViewer::new();
            let events = runtime.block_on(load_files(&mut viewer, &files));
            show_outcome(&viewer, events, format, color_mode)
        }
    }
}

fn show_outcome(
    viewer: &ReportViewer,
    events: Vec<LoadEvent>,
    format: OutputFormat,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let time = notice_time_now().unwrap_or_default();
    let displayed = viewer.displayed_generation();
    let source = events
        .iter()
        .find(|event| Some(event.generation) == displayed)
        .map(|event| event.path.display().to_string());

    let mut notices = Vec::new();
    let mut newest_failure: Option<(Generation, Error)> = None;
    for event in events {
        if let Some(notice) = load_notice(&event, "show", &time) {
            notices.push((event.generation, notice));
        }
        if let ApplyOutcome::Rejected(err) = event.outcome {
            let newer = newest_failure
                .as_ref()
                .is_none_or(|(generation, _)| event.generation > *generation);
            if newer {
                newest_failure = Some((event.generation, err));
            }
        }
    }

    let Some(report) = viewer.report() else {
        // Nothing parsed: the newest failure becomes the error, older ones are notices.
        let (failed, err) = newest_failure.ok_or_else(|| {
            Error::new(ErrorKind::Internal).with_message("no report loaded and no failure recorded")
        })?;
        for (generation, notice) in &notices {
            if *generation != failed {
                emit_notice(notice, color_mode);
            }
        }
        return Err(err);
    };

    for (_, notice) in &notices {
        emit_notice(notice, color_mode);
    }
    match format {
        OutputFormat::Json => emit_report_json(report, color_mode)?,
        OutputFormat::Table => emit_report_table(report, source.as_deref(), color_mode),
    }

    Ok(match newest_failure {
        Some((_, err)) => RunOutcome::with_code(to_exit_code(err.kind())),
        None => RunOutcome::ok(),
    })
}

fn emit_report_json(report: &Report, color_mode: ColorMode) -> Result<(), Error> {
    let value = serde_json::to_value(report).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode report as JSON")
            .with_source(err)
    })?;
    emit_json(value, color_mode);
    Ok(())
}

fn emit_report_table(report: &Report, source: Option<&str>, color_mode: ColorMode) {
    let use_color = color_mode.use_color(io::stdout().is_terminal());
    for line in render::summary_lines(report, source) {
        println!("{line}");
    }
    println!();
    let rows = render::report_rows(report);
    println!(
        "{}",
        render::render_table(&render::TABLE_HEADERS, &rows, use_color)
    );
}
