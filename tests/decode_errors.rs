//! Purpose: Regression coverage for decode-failure categories and diagnostics.
//! Exports: Integration tests only.
//! Role: Verify malformed input is reported, categorized, and never yields a partial report.
//! Invariants: Category mapping remains deterministic for representative inputs.
//! Invariants: Hints carry category and position, never the whole payload.

use dmarcview::api::{
    DecodeFailureCategory, DecodeOptions, ErrorKind, ReportViewer, parse_report,
    parse_report_bytes, parse_report_with, to_exit_code,
};

fn category_of(input: &str) -> Option<DecodeFailureCategory> {
    let err = parse_report(input).expect_err("decode failure expected");
    assert_eq!(err.kind(), ErrorKind::Decode, "input: {input}");
    err.category()
}

#[test]
fn unclosed_tag_is_ill_formed() {
    assert_eq!(
        category_of("<feedback><record><row></row></record>"),
        Some(DecodeFailureCategory::IllFormed)
    );
}

#[test]
fn mismatched_tag_is_ill_formed() {
    assert_eq!(
        category_of("<feedback><record></feedback></record>"),
        Some(DecodeFailureCategory::IllFormed)
    );
}

#[test]
fn broken_markup_is_syntax() {
    assert_eq!(
        category_of("<feedback><record"),
        Some(DecodeFailureCategory::Syntax)
    );
}

#[test]
fn unknown_entity_is_escape() {
    assert_eq!(
        category_of("<feedback><org_name>a &bogus; b</org_name></feedback>"),
        Some(DecodeFailureCategory::Escape)
    );
}

#[test]
fn empty_input_has_no_root() {
    assert_eq!(category_of(""), Some(DecodeFailureCategory::NoRootElement));
}

#[test]
fn depth_limit_is_configurable() {
    let deep = format!("{}{}", "<a>".repeat(10), "</a>".repeat(10));
    assert!(parse_report(&deep).is_ok());
    let err = parse_report_with(&deep, &DecodeOptions { max_depth: 4 }).expect_err("too deep");
    assert_eq!(err.category(), Some(DecodeFailureCategory::DepthLimit));
}

#[test]
fn invalid_utf8_is_encoding() {
    let err = parse_report_bytes(b"<feedback>\xc3\x28</feedback>").expect_err("bad utf8");
    assert_eq!(err.category(), Some(DecodeFailureCategory::Encoding));
    assert_eq!(err.offset(), Some(10));
}

#[test]
fn hint_contains_category_and_position() {
    let err = parse_report("<feedback>\n  <record>\n</feedback>").expect_err("mismatch");
    let hint = err.hint().expect("hint");
    assert!(hint.contains("decode category: ill-formed"), "hint: {hint}");
    assert!(hint.contains("line "), "hint: {hint}");
    assert!(err.offset().is_some());
}

#[test]
fn decode_failure_exit_code_is_stable() {
    assert_eq!(to_exit_code(ErrorKind::Decode), 7);
}

#[test]
fn malformed_file_leaves_displayed_report_unchanged() {
    let mut viewer = ReportViewer::new();
    let first = viewer.begin_load();
    viewer.complete(
        first,
        parse_report("<feedback><record><row><count>5</count></row></record></feedback>"),
    );

    let second = viewer.begin_load();
    viewer.complete(second, parse_report("<feedback><record>"));

    assert_eq!(viewer.displayed_generation(), Some(first));
    let count = viewer
        .report()
        .and_then(|report| report.record.first())
        .and_then(|record| record.row.as_ref())
        .and_then(|row| row.count);
    assert_eq!(count, Some(5));
}
