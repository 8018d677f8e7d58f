//! Purpose: Canonical, strongly typed DMARC aggregate report.
//! Exports: `Report`, `Record`, `Row`, `PolicyEvaluated`, `Identifiers`, `AuthResults`,
//!          `DkimAuthResult`, `SpfAuthResult`, `ReportMetadata`, `DateRange`, `PolicyPublished`.
//! Role: Immutable output of the pipeline; the only shape presentation code sees.
//! Invariants: Every field is optional; absence is never an error.
//! Invariants: Numbers are present only when the source text parsed as a number.
//! Invariants: `record` and `auth_results.dkim` are always sequences, in document order.
//! Notes: Serialization omits absent fields so JSON output mirrors the model exactly.

use std::str::FromStr;

use serde::Serialize;

use crate::core::node::Node;
use crate::core::normalize::RECORD_KEY;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_metadata: Option<ReportMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_published: Option<PolicyPublished>,
    pub record: Vec<Record>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Identifiers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_results: Option<AuthResults>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_evaluated: Option<PolicyEvaluated>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PolicyEvaluated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dkim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spf: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Identifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_from: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuthResults {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dkim: Vec<DkimAuthResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spf: Option<SpfAuthResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DkimAuthResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SpfAuthResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Seconds since the Unix epoch, as the report states them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PolicyPublished {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adkim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fo: Option<String>,
}

impl Report {
    /// Build from an unwrapped, normalized report body. Unknown fields are ignored.
    pub fn from_body(body: &Node) -> Self {
        let record = body
            .field(RECORD_KEY)
            .map(Node::items)
            .unwrap_or_default()
            .iter()
            .map(Record::from_node)
            .collect();
        Self {
            report_metadata: body.field("report_metadata").map(ReportMetadata::from_node),
            policy_published: body
                .field("policy_published")
                .map(PolicyPublished::from_node),
            record,
        }
    }
}

impl Record {
    fn from_node(node: &Node) -> Self {
        Self {
            row: node.field("row").map(Row::from_node),
            identifiers: node.field("identifiers").map(Identifiers::from_node),
            auth_results: node.field("auth_results").map(AuthResults::from_node),
        }
    }
}

impl Row {
    fn from_node(node: &Node) -> Self {
        Self {
            source_ip: text(node, "source_ip"),
            count: number(node, "count"),
            policy_evaluated: node
                .field("policy_evaluated")
                .map(PolicyEvaluated::from_node),
        }
    }
}

impl PolicyEvaluated {
    fn from_node(node: &Node) -> Self {
        Self {
            disposition: text(node, "disposition"),
            dkim: text(node, "dkim"),
            spf: text(node, "spf"),
        }
    }
}

impl Identifiers {
    fn from_node(node: &Node) -> Self {
        Self {
            envelope_to: text(node, "envelope_to"),
            envelope_from: text(node, "envelope_from"),
            header_from: text(node, "header_from"),
        }
    }
}

impl AuthResults {
    fn from_node(node: &Node) -> Self {
        let dkim = node
            .field("dkim")
            .map(Node::items)
            .unwrap_or_default()
            .iter()
            .map(DkimAuthResult::from_node)
            .collect();
        // Some producers repeat <spf>; the first one is kept.
        let spf = node
            .field("spf")
            .and_then(|spf| spf.items().first())
            .map(SpfAuthResult::from_node);
        Self { dkim, spf }
    }
}

impl DkimAuthResult {
    fn from_node(node: &Node) -> Self {
        Self {
            domain: text(node, "domain"),
            selector: text(node, "selector"),
            result: text(node, "result"),
        }
    }
}

impl SpfAuthResult {
    fn from_node(node: &Node) -> Self {
        Self {
            domain: text(node, "domain"),
            scope: text(node, "scope"),
            result: text(node, "result"),
        }
    }
}

impl ReportMetadata {
    fn from_node(node: &Node) -> Self {
        Self {
            org_name: text(node, "org_name"),
            email: text(node, "email"),
            report_id: text(node, "report_id"),
            date_range: node.field("date_range").map(|range| DateRange {
                begin: number(range, "begin"),
                end: number(range, "end"),
            }),
        }
    }
}

impl PolicyPublished {
    fn from_node(node: &Node) -> Self {
        Self {
            domain: text(node, "domain"),
            adkim: text(node, "adkim"),
            aspf: text(node, "aspf"),
            p: text(node, "p"),
            sp: text(node, "sp"),
            pct: number(node, "pct").filter(|pct: &u8| *pct <= 100),
            fo: text(node, "fo"),
        }
    }
}

fn text(node: &Node, key: &str) -> Option<String> {
    node.field(key)
        .and_then(Node::text)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// Integers only: `5.0` and `1e2` come out absent.
fn number<T: FromStr>(node: &Node, key: &str) -> Option<T> {
    node.field(key)
        .and_then(Node::text)
        .and_then(|value| value.trim().parse().ok())
}
