//! YAML node model for compose documents.
//!
//! The parser (see [`crate::parser`]) produces a closed set of node shapes.
//! Any value position may legally hold a `*alias` back-reference to an
//! `&anchor`-tagged node elsewhere in the same document, so every consumer
//! goes through [`YamlDocument::resolve`] (or the shape accessors built on
//! it) before inspecting a node. Resolution is a table lookup; the tree is
//! never rewritten.

use std::collections::HashMap;

use tower_lsp::lsp_types::{Position, Range};

/// Quoting style of a scalar as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

/// Source token behind a node: 1-based line and column, plus the unquoted
/// literal text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub line: usize,
    pub column: usize,
    pub value: String,
    pub style: ScalarStyle,
}

impl Token {
    /// Editor range covering `len` characters of the unquoted value.
    ///
    /// Editor positions are 0-based. A double-quoted scalar's column points
    /// at the opening quote glyph, so the range shifts right by one to sit
    /// on the value itself.
    pub fn range(&self, len: usize) -> Range {
        let offset = match self.style {
            ScalarStyle::DoubleQuoted => 1,
            _ => 0,
        };
        let line = self.line.saturating_sub(1) as u32;
        let character = (self.column.saturating_sub(1) + offset) as u32;
        Range {
            start: Position { line, character },
            end: Position {
                line,
                character: character + len as u32,
            },
        }
    }

    /// Range covering the whole unquoted value.
    pub fn value_range(&self) -> Range {
        self.range(self.value.chars().count())
    }
}

/// One `key: value` pair of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub key: Node,
    pub value: Node,
}

/// A parsed YAML node.
///
/// `Anchor` wraps the node an `&name` anchor was attached to; `Alias` is a
/// `*name` back-reference to it. Both are invisible to code that goes
/// through [`YamlDocument::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Mapping {
        token: Token,
        entries: Vec<MappingEntry>,
    },
    Sequence {
        token: Token,
        items: Vec<Node>,
    },
    Str(Token),
    Alias {
        id: usize,
        token: Token,
    },
    Anchor {
        id: usize,
        inner: Box<Node>,
    },
}

impl Node {
    /// The source token at this node's own position.
    pub fn token(&self) -> &Token {
        match self {
            Node::Mapping { token, .. } | Node::Sequence { token, .. } => token,
            Node::Str(token) | Node::Alias { token, .. } => token,
            Node::Anchor { inner, .. } => inner.token(),
        }
    }
}

/// A single embedded YAML document: its root node plus the anchor table the
/// parser collected while building it.
#[derive(Debug, Clone, Default)]
pub struct YamlDocument {
    pub root: Option<Node>,
    anchors: HashMap<usize, Node>,
}

impl YamlDocument {
    pub(crate) fn new(root: Option<Node>, anchors: HashMap<usize, Node>) -> Self {
        YamlDocument { root, anchors }
    }

    /// Follows alias and anchor indirection to the node a value position
    /// denotes.
    ///
    /// An alias with no matching anchor is a malformed-document condition;
    /// it resolves to `None` and callers treat the node as absent rather
    /// than failing the extraction.
    pub fn resolve<'a>(&'a self, node: &'a Node) -> Option<&'a Node> {
        match node {
            Node::Alias { id, .. } => match self.anchors.get(id) {
                Some(Node::Anchor { inner, .. }) => Some(inner),
                resolved => resolved,
            },
            Node::Anchor { inner, .. } => Some(inner),
            other => Some(other),
        }
    }

    /// Resolves `node` and returns its token if it is a string scalar.
    pub fn scalar<'a>(&'a self, node: &'a Node) -> Option<&'a Token> {
        match self.resolve(node)? {
            Node::Str(token) => Some(token),
            _ => None,
        }
    }

    /// Resolves `node` and returns its entries if it is a mapping.
    pub fn mapping<'a>(&'a self, node: &'a Node) -> Option<&'a [MappingEntry]> {
        match self.resolve(node)? {
            Node::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Resolves `node` and returns its items if it is a sequence.
    pub fn sequence<'a>(&'a self, node: &'a Node) -> Option<&'a [Node]> {
        match self.resolve(node)? {
            Node::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }
}

/// All documents embedded in one compose file. A single source file may
/// contain several YAML documents separated by `---`.
#[derive(Debug, Clone, Default)]
pub struct ComposeFile {
    pub docs: Vec<YamlDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(line: usize, column: usize, value: &str, style: ScalarStyle) -> Token {
        Token {
            line,
            column,
            value: value.to_string(),
            style,
        }
    }

    #[test]
    fn plain_token_range_is_zero_based() {
        let t = token(3, 5, "nginx", ScalarStyle::Plain);
        let range = t.value_range();
        assert_eq!(range.start.line, 2);
        assert_eq!(range.start.character, 4);
        assert_eq!(range.end.line, 2);
        assert_eq!(range.end.character, 9);
    }

    #[test]
    fn double_quoted_token_range_skips_the_opening_quote() {
        let t = token(1, 8, "nginx", ScalarStyle::DoubleQuoted);
        let range = t.value_range();
        assert_eq!(range.start.character, 8);
        assert_eq!(range.end.character, 13);
    }

    #[test]
    fn single_quoted_token_range_has_no_offset() {
        let t = token(1, 8, "nginx", ScalarStyle::SingleQuoted);
        assert_eq!(t.value_range().start.character, 7);
    }

    #[test]
    fn range_can_cover_a_prefix_of_the_value() {
        let t = token(2, 10, "nginx:1.25", ScalarStyle::Plain);
        let range = t.range(5);
        assert_eq!(range.start.character, 9);
        assert_eq!(range.end.character, 14);
    }

    #[test]
    fn resolve_returns_non_alias_nodes_unchanged() {
        let doc = YamlDocument::default();
        let node = Node::Str(token(1, 1, "value", ScalarStyle::Plain));
        assert_eq!(doc.resolve(&node), Some(&node));
    }

    #[test]
    fn resolve_follows_an_alias_to_its_anchor() {
        let anchored = Node::Str(token(1, 10, "shared", ScalarStyle::Plain));
        let mut anchors = HashMap::new();
        anchors.insert(1, anchored.clone());
        let doc = YamlDocument::new(None, anchors);

        let alias = Node::Alias {
            id: 1,
            token: token(4, 8, "", ScalarStyle::Plain),
        };
        assert_eq!(doc.resolve(&alias), Some(&anchored));
    }

    #[test]
    fn resolve_is_idempotent() {
        let anchored = Node::Str(token(1, 10, "shared", ScalarStyle::Plain));
        let mut anchors = HashMap::new();
        anchors.insert(1, anchored);
        let doc = YamlDocument::new(None, anchors);

        let alias = Node::Alias {
            id: 1,
            token: token(4, 8, "", ScalarStyle::Plain),
        };
        let once = doc.resolve(&alias).unwrap();
        let twice = doc.resolve(once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn resolve_of_a_dangling_alias_is_none() {
        let doc = YamlDocument::default();
        let alias = Node::Alias {
            id: 7,
            token: token(2, 3, "", ScalarStyle::Plain),
        };
        assert_eq!(doc.resolve(&alias), None);
        assert_eq!(doc.scalar(&alias), None);
    }

    #[test]
    fn resolve_unwraps_an_anchor_wrapper() {
        let doc = YamlDocument::default();
        let inner = Node::Str(token(1, 1, "v", ScalarStyle::Plain));
        let anchored = Node::Anchor {
            id: 3,
            inner: Box::new(inner.clone()),
        };
        assert_eq!(doc.resolve(&anchored), Some(&inner));
    }

    #[test]
    fn shape_accessors_reject_other_shapes() {
        let doc = YamlDocument::default();
        let scalar = Node::Str(token(1, 1, "v", ScalarStyle::Plain));
        assert!(doc.mapping(&scalar).is_none());
        assert!(doc.sequence(&scalar).is_none());
        assert!(doc.scalar(&scalar).is_some());
    }
}
