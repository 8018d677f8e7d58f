//! Purpose: Generic XML-to-tree decoding with no knowledge of the report schema.
//! Exports: `DecodeOptions`, `DEFAULT_MAX_DEPTH`, `decode_document`, `categorize_error`.
//! Role: Single seam for the XML parser so callsites never touch quick-xml directly.
//! Invariants: Declarations, comments, processing instructions and doctypes are skipped.
//! Invariants: Attributes become `@_name` fields; mixed text lands under `#text`.
//! Invariants: Repeated sibling elements fold into a `Sequence`; single ones stay bare.
//! Notes: Element names use their local part, so `ns:feedback` decodes as `feedback`.

use bstr::ByteSlice;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::error::{DecodeFailureCategory, Error};
use crate::core::node::{ATTRIBUTE_PREFIX, Mapping, Node, TEXT_KEY};

/// Report documents nest five or six levels; anything far deeper is not a report.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const EXCERPT_BYTES: usize = 24;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecodeOptions {
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

struct Frame {
    name: String,
    fields: Mapping,
    text: String,
}

impl Frame {
    fn open(name: String, start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut fields = Mapping::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?;
            fields.push(format!("{ATTRIBUTE_PREFIX}{key}"), Node::scalar(value.trim()));
        }
        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn finish(self) -> (String, Node) {
        let text = self.text.trim();
        let node = if self.fields.is_empty() {
            if text.is_empty() {
                Node::Empty
            } else {
                Node::scalar(text)
            }
        } else {
            let mut fields = self.fields;
            if !text.is_empty() {
                fields.push(TEXT_KEY, Node::scalar(text));
            }
            Node::Mapping(fields)
        };
        (self.name, node)
    }
}

/// Decode a whole XML document into a tree rooted at a mapping of top-level elements.
pub fn decode_document(text: &str, options: &DecodeOptions) -> Result<Node, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    let mut root = Mapping::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                let offset = reader.error_position() as u64;
                return Err(xml_error(err, text, offset));
            }
        };
        match event {
            Event::Start(start) => {
                if stack.len() >= options.max_depth {
                    let offset = reader.buffer_position() as u64;
                    return Err(depth_error(options.max_depth, text, offset));
                }
                let frame = Frame::open(element_name(&start), &start).map_err(|err| {
                    xml_error(err, text, reader.buffer_position() as u64)
                })?;
                stack.push(frame);
            }
            Event::Empty(start) => {
                if stack.len() >= options.max_depth {
                    let offset = reader.buffer_position() as u64;
                    return Err(depth_error(options.max_depth, text, offset));
                }
                let frame = Frame::open(element_name(&start), &start).map_err(|err| {
                    xml_error(err, text, reader.buffer_position() as u64)
                })?;
                attach(&mut stack, &mut root, frame);
            }
            Event::End(end) => match stack.pop() {
                Some(frame) => attach(&mut stack, &mut root, frame),
                None => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let offset = reader.buffer_position() as u64;
                    return Err(positioned(
                        Error::decode(DecodeFailureCategory::IllFormed)
                            .with_message(format!("closing tag </{name}> has no opening tag")),
                        text,
                        offset,
                    ));
                }
            },
            Event::Text(chunk) => {
                let value = chunk
                    .unescape()
                    .map_err(|err| xml_error(err, text, reader.buffer_position() as u64))?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&value),
                    None if !value.trim().is_empty() => {
                        tracing::debug!("ignoring text outside the root element");
                    }
                    None => {}
                }
            }
            Event::CData(chunk) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&chunk));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(positioned(
            Error::decode(DecodeFailureCategory::IllFormed)
                .with_message(format!("element <{}> is never closed", frame.name)),
            text,
            text.len() as u64,
        ));
    }
    if root.is_empty() {
        return Err(Error::decode(DecodeFailureCategory::NoRootElement)
            .with_message("document contains no XML element")
            .with_hint("Pick a DMARC aggregate report file (XML with a <feedback> element)."));
    }

    tracing::debug!(top_level = root.len(), "decoded xml document");
    Ok(Node::Mapping(root))
}

/// Classify a parser failure into a stable category.
pub fn categorize_error(err: &quick_xml::Error) -> DecodeFailureCategory {
    match err {
        quick_xml::Error::Syntax(_) | quick_xml::Error::InvalidAttr(_) => {
            DecodeFailureCategory::Syntax
        }
        quick_xml::Error::IllFormed(_) => DecodeFailureCategory::IllFormed,
        quick_xml::Error::Escape(_) => DecodeFailureCategory::Escape,
        quick_xml::Error::Encoding(_) => DecodeFailureCategory::Encoding,
        _ => DecodeFailureCategory::Unknown,
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn attach(stack: &mut [Frame], root: &mut Mapping, frame: Frame) {
    let (name, node) = frame.finish();
    match stack.last_mut() {
        Some(parent) => parent.fields.push(name, node),
        None => root.push(name, node),
    }
}

fn xml_error(err: quick_xml::Error, text: &str, offset: u64) -> Error {
    let category = categorize_error(&err);
    positioned(
        Error::decode(category)
            .with_message(format!("malformed XML: {err}"))
            .with_source(err),
        text,
        offset,
    )
}

fn depth_error(max_depth: usize, text: &str, offset: u64) -> Error {
    positioned(
        Error::decode(DecodeFailureCategory::DepthLimit)
            .with_message(format!("elements nest deeper than {max_depth} levels")),
        text,
        offset,
    )
}

/// Attach offset plus a line/column hint with a short excerpt of the input.
pub(crate) fn positioned(err: Error, text: &str, offset: u64) -> Error {
    let bytes = text.as_bytes();
    let at = usize::try_from(offset).unwrap_or(bytes.len()).min(bytes.len());
    let (line, column) = line_column(bytes, at);
    let label = err.category().unwrap_or(DecodeFailureCategory::Unknown).label();
    let hint = format!(
        "decode category: {label}; near line {line}, column {column}: `{}`",
        excerpt(bytes, at)
    );
    err.with_offset(at as u64).with_hint(hint)
}

pub(crate) fn line_column(bytes: &[u8], at: usize) -> (usize, usize) {
    let before = &bytes[..at];
    let line = before.iter().filter(|byte| **byte == b'\n').count() + 1;
    let line_start = before.rfind_byte(b'\n').map(|idx| idx + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

pub(crate) fn excerpt(bytes: &[u8], at: usize) -> String {
    let start = at.saturating_sub(EXCERPT_BYTES);
    let end = at.saturating_add(EXCERPT_BYTES).min(bytes.len());
    bytes[start..end]
        .to_str_lossy()
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::{DecodeOptions, decode_document, line_column};
    use crate::core::error::{DecodeFailureCategory, ErrorKind};
    use crate::core::node::{Mapping, Node};

    fn decode(text: &str) -> Node {
        decode_document(text, &DecodeOptions::default()).expect("decode")
    }

    #[test]
    fn single_child_stays_bare_and_repeats_become_sequence() {
        let one = decode("<feedback><record><row>a</row></record></feedback>");
        let record = one.field("feedback").and_then(|f| f.field("record"));
        assert!(matches!(record, Some(Node::Mapping(_))));

        let two = decode(
            "<feedback><record><row>a</row></record><record><row>b</row></record></feedback>",
        );
        let records = two
            .field("feedback")
            .and_then(|f| f.field("record"))
            .expect("records");
        assert!(records.is_sequence());
        assert_eq!(records.items().len(), 2);
        assert_eq!(records.items()[1].field("row").and_then(Node::text), Some("b"));
    }

    #[test]
    fn declaration_comments_and_whitespace_are_ignored() {
        let tree = decode(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- generated -->\n<feedback>\n  <version> 1.0 </version>\n</feedback>\n",
        );
        let version = tree.field("feedback").and_then(|f| f.field("version"));
        assert_eq!(version, Some(&Node::scalar("1.0")));
    }

    #[test]
    fn attributes_and_text_are_fields() {
        let tree = decode("<feedback xmlns:xsi=\"x\"><note lang=\"en\">hi &amp; bye</note></feedback>");
        let feedback = tree.field("feedback").expect("feedback");
        assert_eq!(feedback.field("@_xsi"), Some(&Node::scalar("x")));
        let note = feedback.field("note").expect("note");
        assert_eq!(note.field("@_lang"), Some(&Node::scalar("en")));
        assert_eq!(note.text(), Some("hi & bye"));
    }

    #[test]
    fn empty_elements_decode_to_empty() {
        let tree = decode("<feedback><record/><other></other></feedback>");
        let feedback = tree.field("feedback").expect("feedback");
        assert_eq!(feedback.field("record"), Some(&Node::Empty));
        assert_eq!(feedback.field("other"), Some(&Node::Empty));
    }

    #[test]
    fn cdata_is_text() {
        let tree = decode("<a><b><![CDATA[x < y]]></b></a>");
        assert_eq!(
            tree.field("a").and_then(|a| a.field("b")).and_then(Node::text),
            Some("x < y")
        );
    }

    #[test]
    fn prefixed_names_use_local_part() {
        let tree = decode("<d:feedback xmlns:d=\"urn:x\"><d:record/></d:feedback>");
        assert!(tree.field("feedback").and_then(|f| f.field("record")).is_some());
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let tree = decode("\u{feff}<feedback/>");
        assert_eq!(tree.field("feedback"), Some(&Node::Empty));
    }

    #[test]
    fn unclosed_element_is_ill_formed() {
        let err = decode_document("<feedback><record>", &DecodeOptions::default())
            .expect_err("unclosed");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.category(), Some(DecodeFailureCategory::IllFormed));
        assert!(err.hint().is_some_and(|hint| hint.contains("ill-formed")));
    }

    #[test]
    fn mismatched_closing_tag_is_rejected() {
        let err = decode_document("<a><b></a></b>", &DecodeOptions::default())
            .expect_err("mismatch");
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let options = DecodeOptions { max_depth: 3 };
        assert!(decode_document("<a><b><c/></b></a>", &options).is_ok());
        let err = decode_document("<a><b><c><d/></c></b></a>", &options).expect_err("too deep");
        assert_eq!(err.category(), Some(DecodeFailureCategory::DepthLimit));
    }

    #[test]
    fn empty_document_has_no_root() {
        for input in ["", "   \n", "<?xml version=\"1.0\"?>"] {
            let err = decode_document(input, &DecodeOptions::default()).expect_err("no root");
            assert_eq!(err.category(), Some(DecodeFailureCategory::NoRootElement));
        }
    }

    #[test]
    fn root_mapping_holds_top_level_element() {
        let tree = decode("<record><row/></record>");
        let expected: Mapping = [(
            "record",
            Node::Mapping([("row", Node::Empty)].into_iter().collect()),
        )]
        .into_iter()
        .collect();
        assert_eq!(tree, Node::Mapping(expected));
    }

    #[test]
    fn line_column_counts_from_one() {
        let text = b"ab\ncd";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 4), (2, 2));
    }
}
