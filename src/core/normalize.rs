//! Purpose: Remove the single-vs-repeated ambiguity of the `record` field.
//! Exports: `RECORD_KEY`, `normalize_records`.
//! Role: Second normalization step; runs on the unwrapped report body.
//! Invariants: A present `record` is a `Sequence` afterwards, in document order.
//! Invariants: Never fails; absent fields and non-mapping bodies are left alone.
//! Invariants: Idempotent.

use crate::core::node::Node;

pub const RECORD_KEY: &str = "record";

pub fn normalize_records(body: &mut Node) {
    let Node::Mapping(map) = body else {
        return;
    };
    if let Some(record) = map.get_mut(RECORD_KEY) {
        match record {
            Node::Sequence(_) => {}
            Node::Empty | Node::Scalar(_) | Node::Mapping(_) => {
                let single = std::mem::take(record);
                *record = Node::Sequence(vec![single]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_records;
    use crate::core::node::{Mapping, Node};

    fn body(record: Option<Node>) -> Node {
        let mut map = Mapping::new();
        map.push("report_metadata", Node::Empty);
        if let Some(record) = record {
            map.push("record", record);
        }
        Node::Mapping(map)
    }

    #[test]
    fn single_record_is_wrapped() {
        let row: Mapping = [("row", Node::Empty)].into_iter().collect();
        let mut tree = body(Some(Node::Mapping(row.clone())));
        normalize_records(&mut tree);
        assert_eq!(
            tree.field("record"),
            Some(&Node::Sequence(vec![Node::Mapping(row)]))
        );
    }

    #[test]
    fn empty_record_is_wrapped() {
        let mut tree = body(Some(Node::Empty));
        normalize_records(&mut tree);
        assert_eq!(tree.field("record"), Some(&Node::Sequence(vec![Node::Empty])));
    }

    #[test]
    fn absent_record_is_untouched() {
        let mut tree = body(None);
        let before = tree.clone();
        normalize_records(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn sequence_is_idempotent() {
        let mut tree = body(Some(Node::Sequence(vec![
            Node::scalar("a"),
            Node::scalar("b"),
        ])));
        let before = tree.clone();
        normalize_records(&mut tree);
        assert_eq!(tree, before);

        let mut once = body(Some(Node::scalar("a")));
        normalize_records(&mut once);
        let after_once = once.clone();
        normalize_records(&mut once);
        assert_eq!(once, after_once);
    }

    #[test]
    fn non_mapping_body_passes_through() {
        let mut tree = Node::scalar("not a report");
        normalize_records(&mut tree);
        assert_eq!(tree, Node::scalar("not a report"));
    }
}
