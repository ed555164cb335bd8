//! # Save-File Text Codec
//!
//! Brace-delimited text form of a `ConfigNode` tree:
//!
//! ```text
//! Constellations
//! {
//!     Constellation
//!     {
//!         frequency = 0
//!         name = Public
//!         color = 0,0.8,1,1
//!     }
//! }
//! ```
//!
//! The root node's own name is never written; its values and children form
//! the top level of the file. Keys, values and node names are trimmed on
//! read, so surrounding whitespace does not survive a round trip.

use crate::document::ConfigNode;
use crate::primitives::{MAX_DOCUMENT_DEPTH, MAX_DOCUMENT_SIZE};
use crate::ConstellationError;

// =============================================================================
// WRITER
// =============================================================================

/// Serialize a document to text.
///
/// Fails if a key, value or node name cannot be represented (line breaks,
/// `=` in keys or names, braces in names) or if nesting exceeds the
/// parser's depth limit.
pub fn document_to_text(document: &ConfigNode) -> Result<String, ConstellationError> {
    let mut out = String::new();
    write_body(document, 0, &mut out)?;
    Ok(out)
}

fn write_body(node: &ConfigNode, depth: usize, out: &mut String) -> Result<(), ConstellationError> {
    if depth > MAX_DOCUMENT_DEPTH {
        return Err(ConstellationError::SerializationError(format!(
            "document nesting exceeds {} levels",
            MAX_DOCUMENT_DEPTH
        )));
    }

    let indent = "\t".repeat(depth);

    for (key, value) in node.values() {
        check_key(key)?;
        if value.contains(['\n', '\r']) {
            return Err(ConstellationError::SerializationError(format!(
                "value of '{}' contains a line break",
                key
            )));
        }
        out.push_str(&format!("{indent}{key} = {value}\n"));
    }

    for child in node.nodes() {
        check_node_name(child.name())?;
        out.push_str(&format!("{indent}{}\n{indent}{{\n", child.name()));
        write_body(child, depth + 1, out)?;
        out.push_str(&format!("{indent}}}\n"));
    }

    Ok(())
}

fn check_key(key: &str) -> Result<(), ConstellationError> {
    if key.is_empty()
        || key.trim() != key
        || key.starts_with("//")
        || key.contains(['=', '\n', '\r'])
    {
        return Err(ConstellationError::SerializationError(format!(
            "key '{}' cannot be written",
            key.escape_debug()
        )));
    }
    Ok(())
}

fn check_node_name(name: &str) -> Result<(), ConstellationError> {
    if name.is_empty()
        || name.trim() != name
        || name.starts_with("//")
        || name.contains(['=', '{', '}', '\n', '\r'])
    {
        return Err(ConstellationError::SerializationError(format!(
            "node name '{}' cannot be written",
            name.escape_debug()
        )));
    }
    Ok(())
}

// =============================================================================
// PARSER
// =============================================================================

/// Parse a document from text.
///
/// # Security
///
/// The input size is validated BEFORE any parsing, and nesting depth is
/// bounded by `MAX_DOCUMENT_DEPTH`.
pub fn document_from_text(text: &str) -> Result<ConfigNode, ConstellationError> {
    if text.len() > MAX_DOCUMENT_SIZE {
        return Err(ConstellationError::SerializationError(format!(
            "Document size {} bytes exceeds maximum allowed {} bytes",
            text.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    let mut parser = Parser::default();
    for (index, raw) in text.lines().enumerate() {
        parser.line(index + 1, raw.trim())?;
    }
    parser.finish()
}

/// Line-oriented parser state.
#[derive(Default)]
struct Parser {
    root: ConfigNode,
    /// Open nodes with the line they were opened on.
    open: Vec<(ConfigNode, usize)>,
    /// A node name seen on its own line, waiting for `{`.
    pending: Option<(String, usize)>,
}

impl Parser {
    fn current(&mut self) -> &mut ConfigNode {
        match self.open.last_mut() {
            Some((node, _)) => node,
            None => &mut self.root,
        }
    }

    fn line(&mut self, line_no: usize, line: &str) -> Result<(), ConstellationError> {
        if line.is_empty() || line.starts_with("//") {
            return Ok(());
        }

        if let Some((name, _)) = self.pending.take() {
            if line == "{" {
                return self.open_node(name, line_no);
            }
            return Err(parse_error(
                line_no,
                format!("expected '{{' after node name '{}'", name),
            ));
        }

        if line == "}" {
            return self.close_node(line_no);
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                return Err(parse_error(line_no, "value has an empty key"));
            }
            self.current().add_value(key, value.trim());
            return Ok(());
        }

        if let Some(name) = line.strip_suffix('{') {
            let name = name.trim();
            if name.is_empty() {
                return Err(parse_error(line_no, "'{' without a node name"));
            }
            return self.open_node(name.to_string(), line_no);
        }

        if line.contains(['{', '}']) {
            return Err(parse_error(line_no, format!("unexpected brace in '{}'", line)));
        }

        self.pending = Some((line.to_string(), line_no));
        Ok(())
    }

    fn open_node(&mut self, name: String, line_no: usize) -> Result<(), ConstellationError> {
        if self.open.len() >= MAX_DOCUMENT_DEPTH {
            return Err(parse_error(
                line_no,
                format!("nesting exceeds {} levels", MAX_DOCUMENT_DEPTH),
            ));
        }
        self.open.push((ConfigNode::new(name), line_no));
        Ok(())
    }

    fn close_node(&mut self, line_no: usize) -> Result<(), ConstellationError> {
        let Some((node, _)) = self.open.pop() else {
            return Err(parse_error(line_no, "'}' without a matching '{'"));
        };
        self.current().add_node(node);
        Ok(())
    }

    fn finish(mut self) -> Result<ConfigNode, ConstellationError> {
        if let Some((name, line_no)) = self.pending.take() {
            return Err(parse_error(
                line_no,
                format!("node '{}' has no body", name),
            ));
        }
        if let Some((node, line_no)) = self.open.last() {
            return Err(parse_error(
                *line_no,
                format!("node '{}' is never closed", node.name()),
            ));
        }
        Ok(self.root)
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ConstellationError {
    ConstellationError::Parse {
        line,
        message: message.into(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigNode {
        let mut root = ConfigNode::new("");
        root.set_value("version", "1.12.5");
        let list = root.add_node(ConfigNode::new("Constellations"));
        let entry = list.add_node(ConfigNode::new("Constellation"));
        entry.set_value("frequency", "0");
        entry.set_value("name", "Public");
        entry.set_value("color", "0,0.8,1,1");
        root
    }

    #[test]
    fn writes_tab_indented_blocks() {
        let text = document_to_text(&sample()).expect("write");
        let expected = "version = 1.12.5\n\
                        Constellations\n\
                        {\n\
                        \tConstellation\n\
                        \t{\n\
                        \t\tfrequency = 0\n\
                        \t\tname = Public\n\
                        \t\tcolor = 0,0.8,1,1\n\
                        \t}\n\
                        }\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn text_roundtrip() {
        let original = sample();
        let text = document_to_text(&original).expect("write");
        let restored = document_from_text(&text).expect("parse");
        assert_eq!(restored, original);
    }

    #[test]
    fn accepts_inline_brace_and_comments() {
        let text = "// save file\n\
                    Constellations {\n\
                    \x20   Constellation\n\
                    \x20   {\n\
                    \x20       name = Team {A} = best\n\
                    \x20   }\n\
                    }\n";
        let doc = document_from_text(text).expect("parse");
        let entry = doc
            .get_node("Constellations")
            .and_then(|n| n.get_node("Constellation"))
            .expect("entry");
        assert_eq!(entry.get_value("name"), Some("Team {A} = best"));
    }

    #[test]
    fn unbalanced_braces_rejected() {
        assert!(matches!(
            document_from_text("}\n"),
            Err(ConstellationError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            document_from_text("A\n{\nx = 1\n"),
            Err(ConstellationError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            document_from_text("A\nx = 1\n"),
            Err(ConstellationError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            document_from_text("A\n"),
            Err(ConstellationError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn unrepresentable_strings_rejected() {
        let mut root = ConfigNode::new("");
        root.set_value("name", "two\nlines");
        assert!(document_to_text(&root).is_err());

        let mut root = ConfigNode::new("");
        root.add_node(ConfigNode::new("bad{name"));
        assert!(document_to_text(&root).is_err());

        let mut root = ConfigNode::new("");
        root.set_value("a=b", "c");
        assert!(document_to_text(&root).is_err());
    }

    #[test]
    fn excessive_nesting_rejected() {
        let mut text = String::new();
        for _ in 0..=MAX_DOCUMENT_DEPTH {
            text.push_str("N\n{\n");
        }
        assert!(matches!(
            document_from_text(&text),
            Err(ConstellationError::Parse { .. })
        ));
    }
}
