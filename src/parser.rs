//! Builds the compose AST from YAML source text.
//!
//! An event-driven builder over `yaml-rust2`'s marked parser: every event
//! carries a `Marker` (1-based line, 0-based column), which becomes the
//! node's [`Token`]. Anchored nodes are recorded in the owning document's
//! anchor table so alias resolution stays a lookup, and document boundaries
//! split the stream into separate [`YamlDocument`]s.

use std::collections::HashMap;
use std::mem;

use anyhow::Context;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::ast::{ComposeFile, MappingEntry, Node, ScalarStyle, Token, YamlDocument};

/// Parse a (possibly multi-document) compose file.
pub fn parse(text: &str) -> anyhow::Result<ComposeFile> {
    let mut parser = Parser::new_from_str(text);
    let mut builder = AstBuilder::default();
    parser.load(&mut builder, true).context("invalid YAML")?;
    Ok(ComposeFile { docs: builder.docs })
}

/// A collection node under construction.
enum Frame {
    Sequence {
        token: Token,
        anchor: usize,
        items: Vec<Node>,
    },
    Mapping {
        token: Token,
        anchor: usize,
        pending_key: Option<Node>,
        entries: Vec<MappingEntry>,
    },
}

#[derive(Default)]
struct AstBuilder {
    stack: Vec<Frame>,
    root: Option<Node>,
    anchors: HashMap<usize, Node>,
    docs: Vec<YamlDocument>,
}

impl AstBuilder {
    fn token_at(marker: Marker, value: String, style: ScalarStyle) -> Token {
        Token {
            line: marker.line(),
            column: marker.col() + 1,
            value,
            style,
        }
    }

    fn push_complete(&mut self, node: Node, anchor: usize) {
        // anchor id 0 means "no anchor"; the table keeps the unwrapped node
        // so resolving an alias is a single lookup
        let node = if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
            Node::Anchor {
                id: anchor,
                inner: Box::new(node),
            }
        } else {
            node
        };
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                pending_key,
                entries,
                ..
            }) => match pending_key.take() {
                None => *pending_key = Some(node),
                Some(key) => entries.push(MappingEntry { key, value: node }),
            },
        }
    }
}

impl MarkedEventReceiver for AstBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Nothing | Event::StreamStart | Event::StreamEnd | Event::DocumentStart => {}
            Event::DocumentEnd => {
                let root = self.root.take();
                let anchors = mem::take(&mut self.anchors);
                self.docs.push(YamlDocument::new(root, anchors));
            }
            Event::Scalar(value, style, anchor, _tag) => {
                let style = match style {
                    TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
                    TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
                    _ => ScalarStyle::Plain,
                };
                let token = Self::token_at(marker, value, style);
                self.push_complete(Node::Str(token), anchor);
            }
            Event::Alias(id) => {
                let token = Self::token_at(marker, String::new(), ScalarStyle::Plain);
                self.push_complete(Node::Alias { id, token }, 0);
            }
            Event::SequenceStart(anchor, _tag) => {
                self.stack.push(Frame::Sequence {
                    token: Self::token_at(marker, String::new(), ScalarStyle::Plain),
                    anchor,
                    items: Vec::new(),
                });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence {
                    token,
                    anchor,
                    items,
                }) = self.stack.pop()
                {
                    self.push_complete(Node::Sequence { token, items }, anchor);
                }
            }
            Event::MappingStart(anchor, _tag) => {
                self.stack.push(Frame::Mapping {
                    token: Self::token_at(marker, String::new(), ScalarStyle::Plain),
                    anchor,
                    pending_key: None,
                    entries: Vec::new(),
                });
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping {
                    token,
                    anchor,
                    entries,
                    ..
                }) = self.stack.pop()
                {
                    self.push_complete(Node::Mapping { token, entries }, anchor);
                }
            }
        }
    }
}
