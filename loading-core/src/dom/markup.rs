//! Parser for the markup accepted by [`NodeRef::set_inner_html`](super::NodeRef::set_inner_html).
//!
//! Covers the part of HTML used by widget templates: elements, attributes, comments and text.
//! Scripts, raw text elements and implied end tags are not supported.

use crate::error::{Error, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Markup>,
    },
    Text(String),
    Comment(String),
}

struct Open {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Markup>,
    position: usize,
}

/// Parses a markup fragment into a list of top level nodes
pub fn parse(source: &str) -> Result<Vec<Markup>> {
    Parser { source, pos: 0 }.parse()
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        let source = self.source;
        &source[self.pos..]
    }

    fn error(&self, reason: &'static str) -> Error {
        Error::Markup {
            position: self.pos,
            reason,
        }
    }

    fn parse(mut self) -> Result<Vec<Markup>> {
        let mut top = Vec::new();
        let mut stack: Vec<Open> = Vec::new();

        while self.pos < self.source.len() {
            let rest = self.rest();

            if let Some(comment) = rest.strip_prefix("<!--") {
                let end = comment
                    .find("-->")
                    .ok_or_else(|| self.error("unterminated comment"))?;

                push(&mut stack, &mut top, Markup::Comment(comment[..end].to_string()));
                self.pos += 4 + end + 3;
            } else if rest.starts_with("</") {
                self.pos += 2;
                let tag = self.name();
                if tag.is_empty() {
                    return Err(self.error("expected a tag name"));
                }

                self.skip_whitespace();
                if !self.rest().starts_with('>') {
                    return Err(self.error("unterminated close tag"));
                }

                let open = match stack.pop() {
                    Some(open) => open,
                    None => return Err(self.error("unexpected close tag")),
                };

                if !open.tag.eq_ignore_ascii_case(tag) {
                    return Err(self.error("mismatched close tag"));
                }

                self.pos += 1;
                let element = Markup::Element {
                    tag: open.tag,
                    attributes: open.attributes,
                    children: open.children,
                };

                push(&mut stack, &mut top, element);
            } else if rest.starts_with('<') {
                let position = self.pos;
                self.pos += 1;
                let (tag, attributes, self_closing) = self.open_tag()?;

                if self_closing || is_void(&tag) {
                    let element = Markup::Element {
                        tag,
                        attributes,
                        children: Vec::new(),
                    };

                    push(&mut stack, &mut top, element);
                } else {
                    stack.push(Open {
                        tag,
                        attributes,
                        children: Vec::new(),
                        position,
                    });
                }
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                push(&mut stack, &mut top, Markup::Text(decode_entities(&rest[..end])));
                self.pos += end;
            }
        }

        if let Some(open) = stack.first() {
            return Err(Error::Markup {
                position: open.position,
                reason: "unclosed element",
            });
        }

        Ok(top)
    }

    /// Parses the remainder of an open tag after the `<`
    fn open_tag(&mut self) -> Result<(String, Vec<(String, String)>, bool)> {
        let tag = self.name().to_string();
        if tag.is_empty() {
            return Err(self.error("expected a tag name"));
        }

        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            let rest = self.rest();

            if rest.is_empty() {
                return Err(self.error("unterminated tag"));
            } else if rest.starts_with("/>") {
                self.pos += 2;
                return Ok((tag, attributes, true));
            } else if rest.starts_with('>') {
                self.pos += 1;
                return Ok((tag, attributes, false));
            }

            let name = self.attribute_name();
            if name.is_empty() {
                return Err(self.error("expected an attribute name"));
            }

            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()?
            } else {
                String::new()
            };

            attributes.push((name.to_string(), value));
        }
    }

    fn attribute_value(&mut self) -> Result<String> {
        let rest = self.rest();

        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = rest[1..]
                    .find(quote)
                    .ok_or_else(|| self.error("unterminated attribute value"))?;

                let value = decode_entities(&rest[1..1 + end]);
                self.pos += end + 2;
                Ok(value)
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());

                self.pos += end;
                Ok(decode_entities(&rest[..end]))
            }
        }
    }

    fn name(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | ':')))
            .unwrap_or(rest.len());

        self.pos += end;
        &rest[..end]
    }

    fn attribute_name(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/' | '"' | '\''))
            .unwrap_or(rest.len());

        self.pos += end;
        &rest[..end]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }
}

fn push(stack: &mut [Open], top: &mut Vec<Markup>, node: Markup) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => top.push(node),
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
