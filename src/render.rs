//! Purpose: Render a `Report` for the terminal: a summary block plus a record table.
//! Exports: `TABLE_HEADERS`, `report_rows`, `summary_lines`, `render_table`, `format_epoch`.
//! Role: Presentation layer for `dmarcview show`; pure string building, no I/O.
//! Invariants: Every model field may be absent; absent cells render empty.
//! Invariants: Column widths are computed on plain text so ANSI color never skews alignment.

use dmarcview::api::{PolicyPublished, Record, Report, ReportMetadata};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) const TABLE_HEADERS: [&str; 8] = [
    "Source IP",
    "Count",
    "Disposition",
    "SPF",
    "DKIM",
    "Envelope From",
    "Envelope To",
    "Header From",
];

// Columns whose values are evaluation verdicts and get colorized.
const VERDICT_COLUMNS: [usize; 3] = [2, 3, 4];

pub(crate) fn report_rows(report: &Report) -> Vec<Vec<String>> {
    report.record.iter().map(record_row).collect()
}

fn record_row(record: &Record) -> Vec<String> {
    let row = record.row.as_ref();
    let evaluated = row.and_then(|row| row.policy_evaluated.as_ref());
    let identifiers = record.identifiers.as_ref();
    vec![
        cell(row.and_then(|row| row.source_ip.as_deref())),
        row.and_then(|row| row.count)
            .map(|count| count.to_string())
            .unwrap_or_default(),
        cell(evaluated.and_then(|e| e.disposition.as_deref())),
        cell(evaluated.and_then(|e| e.spf.as_deref())),
        cell(evaluated.and_then(|e| e.dkim.as_deref())),
        cell(identifiers.and_then(|i| i.envelope_from.as_deref())),
        cell(identifiers.and_then(|i| i.envelope_to.as_deref())),
        cell(identifiers.and_then(|i| i.header_from.as_deref())),
    ]
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub(crate) fn summary_lines(report: &Report, source: Option<&str>) -> Vec<String> {
    let mut lines = vec!["DMARC Report Summary".to_string()];
    if let Some(source) = source {
        lines.push(format!("  File:         {source}"));
    }
    if let Some(meta) = &report.report_metadata {
        lines.extend(metadata_lines(meta));
    }
    if let Some(policy) = &report.policy_published {
        lines.push(format!("  Policy:       {}", policy_summary(policy)));
    }
    let messages = message_total(report)
        .map(|total| total.to_string())
        .unwrap_or_else(|| "?".to_string());
    lines.push(format!(
        "  Records:      {} ({messages} messages)",
        report.record.len()
    ));
    lines
}

/// Sum of row counts; `None` when the total does not fit in a `u64`.
fn message_total(report: &Report) -> Option<u64> {
    report
        .record
        .iter()
        .filter_map(|record| record.row.as_ref().and_then(|row| row.count))
        .try_fold(0u64, u64::checked_add)
}

fn metadata_lines(meta: &ReportMetadata) -> Vec<String> {
    let mut lines = Vec::new();
    match (&meta.org_name, &meta.email) {
        (Some(org), Some(email)) => lines.push(format!("  Organization: {org} <{email}>")),
        (Some(org), None) => lines.push(format!("  Organization: {org}")),
        (None, Some(email)) => lines.push(format!("  Organization: <{email}>")),
        (None, None) => {}
    }
    if let Some(id) = &meta.report_id {
        lines.push(format!("  Report ID:    {id}"));
    }
    if let Some(range) = &meta.date_range {
        let begin = range.begin.map(format_epoch).unwrap_or_else(|| "?".to_string());
        let end = range.end.map(format_epoch).unwrap_or_else(|| "?".to_string());
        lines.push(format!("  Period:       {begin} .. {end}"));
    }
    lines
}

fn policy_summary(policy: &PolicyPublished) -> String {
    let mut parts = Vec::new();
    if let Some(domain) = &policy.domain {
        parts.push(domain.clone());
    }
    let tags = [
        ("p", policy.p.clone()),
        ("sp", policy.sp.clone()),
        ("pct", policy.pct.map(|pct| pct.to_string())),
        ("adkim", policy.adkim.clone()),
        ("aspf", policy.aspf.clone()),
        ("fo", policy.fo.clone()),
    ];
    for (tag, value) in tags {
        if let Some(value) = value {
            parts.push(format!("{tag}={value}"));
        }
    }
    parts.join(" ")
}

/// RFC 3339 UTC for an epoch timestamp; the raw number when out of range.
pub(crate) fn format_epoch(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| secs.to_string())
}

pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>], use_color: bool) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let column_count = headers.len();
    let mut sanitized_rows = Vec::with_capacity(rows.len());
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        let mut sanitized = Vec::with_capacity(column_count);
        for (idx, width) in widths.iter_mut().enumerate() {
            let value = row.get(idx).map(String::as_str).unwrap_or("");
            let cleaned = sanitize_table_cell(value);
            *width = (*width).max(cleaned.chars().count());
            sanitized.push(cleaned);
        }
        sanitized_rows.push(sanitized);
    }

    let header_cells = headers
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<_>>();
    let mut lines = Vec::with_capacity(sanitized_rows.len() + 1);
    lines.push(format_table_line(&header_cells, &widths, false));
    for row in sanitized_rows {
        lines.push(format_table_line(&row, &widths, use_color));
    }
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r")
}

fn format_table_line(cells: &[String], widths: &[usize], use_color: bool) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        let color = if use_color && VERDICT_COLUMNS.contains(&idx) {
            verdict_color(cell)
        } else {
            None
        };
        match color {
            Some(code) => line.push_str(&format!("\u{1b}[{code}m{cell}\u{1b}[0m")),
            None => line.push_str(cell),
        }
        let cell_len = cell.chars().count();
        if *width > cell_len {
            line.push_str(&" ".repeat(*width - cell_len));
        }
    }
    line.trim_end().to_string()
}

fn verdict_color(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "pass" | "none" => Some("32"),
        "fail" | "reject" | "permerror" => Some("31"),
        "quarantine" | "softfail" | "temperror" | "neutral" => Some("33"),
        _ => None,
    }
}
