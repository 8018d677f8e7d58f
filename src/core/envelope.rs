//! Purpose: Locate the report body whether or not it sits inside a `<feedback>` envelope.
//! Exports: `ENVELOPE_KEY`, `unwrap_envelope`.
//! Role: First normalization step after generic decoding.
//! Invariants: When the envelope is present it wins; root-level siblings are dropped.
//! Invariants: Without the envelope the tree is returned unchanged.

use crate::core::node::Node;

pub const ENVELOPE_KEY: &str = "feedback";

pub fn unwrap_envelope(tree: Node) -> Node {
    match tree {
        Node::Mapping(mut root) => match root.remove(ENVELOPE_KEY) {
            Some(body) => {
                if !root.is_empty() {
                    tracing::debug!(
                        discarded = root.len(),
                        "envelope present; ignoring root-level siblings"
                    );
                }
                body
            }
            None => Node::Mapping(root),
        },
        other => other,
    }
}
