//! Purpose: Tagged tree produced by the generic XML decoder.
//! Exports: `Node`, `Mapping`, `ATTRIBUTE_PREFIX`, `TEXT_KEY`.
//! Role: Domain-agnostic intermediate shape between raw XML and the report model.
//! Invariants: `Sequence` only arises from repeated sibling keys; a key seen once is bare.
//! Invariants: Mapping fields keep document order of first occurrence.

/// Field-name prefix for element attributes.
pub const ATTRIBUTE_PREFIX: &str = "@_";
/// Field name for element text that sits beside attributes or child elements.
pub const TEXT_KEY: &str = "#text";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Node {
    /// Element with no attributes, children, or text.
    #[default]
    Empty,
    Scalar(String),
    Mapping(Mapping),
    Sequence(Vec<Node>),
}

impl Node {
    pub fn scalar(text: impl Into<String>) -> Self {
        Node::Scalar(text.into())
    }

    pub fn field(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Text content: a scalar, or the `#text` field of a mapping.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text),
            Node::Mapping(map) => match map.get(TEXT_KEY) {
                Some(Node::Scalar(text)) => Some(text),
                _ => None,
            },
            _ => None,
        }
    }

    /// View any node as a list: a sequence yields its items, anything else is one item.
    pub fn items(&self) -> &[Node] {
        match self {
            Node::Sequence(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    fields: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let idx = self.fields.iter().position(|(name, _)| name == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Insert a field, folding repeats of the same key into a `Sequence`.
    pub fn push(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(Node::Sequence(items)) => items.push(node),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Node::Sequence(vec![first, node]);
            }
            None => self.fields.push((key, node)),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (key, node) in iter {
            map.push(key, node);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::{Mapping, Node, TEXT_KEY};

    #[test]
    fn repeated_keys_fold_into_sequence_in_order() {
        let mut map = Mapping::new();
        map.push("record", Node::scalar("a"));
        assert_eq!(map.get("record"), Some(&Node::scalar("a")));

        map.push("record", Node::scalar("b"));
        map.push("record", Node::scalar("c"));
        assert_eq!(
            map.get("record"),
            Some(&Node::Sequence(vec![
                Node::scalar("a"),
                Node::scalar("b"),
                Node::scalar("c"),
            ]))
        );
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn text_reads_scalar_or_text_field() {
        assert_eq!(Node::scalar("pass").text(), Some("pass"));

        let mut map = Mapping::new();
        map.push("@_lang", Node::scalar("en"));
        map.push(TEXT_KEY, Node::scalar("hello"));
        assert_eq!(Node::Mapping(map).text(), Some("hello"));

        assert_eq!(Node::Empty.text(), None);
    }

    #[test]
    fn items_treats_non_sequence_as_single_item() {
        let single = Node::scalar("x");
        assert_eq!(single.items().len(), 1);
        let many = Node::Sequence(vec![Node::Empty, Node::Empty]);
        assert_eq!(many.items().len(), 2);
    }

    #[test]
    fn remove_drops_field() {
        let mut map: Mapping = [("a", Node::Empty), ("b", Node::scalar("1"))]
            .into_iter()
            .collect();
        assert_eq!(map.remove("a"), Some(Node::Empty));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(map.remove("a"), None);
    }
}
