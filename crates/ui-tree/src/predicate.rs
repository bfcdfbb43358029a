//! Predicate paths
//!
//! Text grammar (one predicate at most):
//!
//! ```text
//! //TAG
//! //TAG[@ATTR='V']
//! //TAG[contains(@ATTR,'V')]
//! //TAG[text()='V']
//! //TAG[contains(text(),'V')]
//! ```
//!
//! `TAG` is `*` or a literal tag. Strings may use single or double quotes;
//! a backslash escapes the next character. Equality is exact; `contains`
//! is a case-insensitive substring test. A missing attribute reads as `""`.
//!
//! [`PredicatePath`] can carry several predicates joined by `and`; that form
//! is only produced programmatically and is never accepted as text.

use std::fmt;

use crate::errors::PathSyntaxError;
use crate::model::{keys, NodeId, UiNode, UiTree};

/// Tag test of a predicate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelector {
    Any,
    Tag(String),
}

impl TagSelector {
    fn matches(&self, node: &UiNode) -> bool {
        match self {
            TagSelector::Any => true,
            TagSelector::Tag(tag) => node.tag() == tag.as_str(),
        }
    }
}

/// One bracketed test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    AttrEquals { attr: String, value: String },
    AttrContains { attr: String, value: String },
    TextEquals(String),
    TextContains(String),
}

impl Predicate {
    pub fn attr_equals(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::AttrEquals {
            attr: attr.into(),
            value: value.into(),
        }
    }

    pub fn attr_contains(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::AttrContains {
            attr: attr.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, node: &UiNode) -> bool {
        match self {
            Predicate::AttrEquals { attr, value } => node.attr_or_empty(attr) == value.as_str(),
            Predicate::AttrContains { attr, value } => {
                contains_ignore_case(node.attr_or_empty(attr), value)
            }
            Predicate::TextEquals(value) => node.attr_or_empty(keys::TEXT) == value.as_str(),
            Predicate::TextContains(value) => {
                contains_ignore_case(node.attr_or_empty(keys::TEXT), value)
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::AttrEquals { attr, value } => write!(f, "@{}={}", attr, quote(value)),
            Predicate::AttrContains { attr, value } => {
                write!(f, "contains(@{},{})", attr, quote(value))
            }
            Predicate::TextEquals(value) => write!(f, "text()={}", quote(value)),
            Predicate::TextContains(value) => write!(f, "contains(text(),{})", quote(value)),
        }
    }
}

/// Descendant-anywhere path with a tag test and AND-ed predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicatePath {
    pub tag: TagSelector,
    pub predicates: Vec<Predicate>,
}

impl PredicatePath {
    pub fn any() -> Self {
        Self {
            tag: TagSelector::Any,
            predicates: Vec::new(),
        }
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: TagSelector::Tag(tag.into()),
            predicates: Vec::new(),
        }
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Parse the single-predicate text grammar.
    pub fn parse(expr: &str) -> Result<Self, PathSyntaxError> {
        Cursor::new(expr).path()
    }

    pub fn matches(&self, node: &UiNode) -> bool {
        self.tag.matches(node) && self.predicates.iter().all(|p| p.matches(node))
    }

    /// Every matching node in document order.
    pub fn evaluate_all(&self, tree: &UiTree) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .filter(|id| tree.node(*id).map(|n| self.matches(n)).unwrap_or(false))
            .collect()
    }

    /// First matching node in document order.
    pub fn evaluate_first(&self, tree: &UiTree) -> Option<NodeId> {
        tree.descendants(tree.root())
            .find(|id| tree.node(*id).map(|n| self.matches(n)).unwrap_or(false))
    }
}

impl fmt::Display for PredicatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            TagSelector::Any => write!(f, "//*")?,
            TagSelector::Tag(tag) => write!(f, "//{}", tag)?,
        }
        if !self.predicates.is_empty() {
            let joined: Vec<String> = self.predicates.iter().map(|p| p.to_string()).collect();
            write!(f, "[{}]", joined.join(" and "))?;
        }
        Ok(())
    }
}

/// First match of a text expression; unsupported syntax matches nothing.
pub fn evaluate_predicate_path(tree: &UiTree, expr: &str) -> Option<NodeId> {
    PredicatePath::parse(expr).ok()?.evaluate_first(tree)
}

/// All matches of a text expression; unsupported syntax matches nothing.
pub fn evaluate_predicate_path_all(tree: &UiTree, expr: &str) -> Vec<NodeId> {
    match PredicatePath::parse(expr) {
        Ok(path) => path.evaluate_all(tree),
        Err(err) => {
            tracing::debug!(error = %err, "predicate path rejected");
            Vec::new()
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(src: &str) -> Self {
        Self {
            chars: src.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> PathSyntaxError {
        PathSyntaxError::new(self.pos, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, literal: &str) -> bool {
        let len = literal.chars().count();
        let matched = self
            .chars
            .get(self.pos..self.pos + len)
            .map(|window| window.iter().copied().eq(literal.chars()))
            .unwrap_or(false);
        if matched {
            self.pos += len;
        }
        matched
    }

    fn expect(&mut self, literal: &str) -> Result<(), PathSyntaxError> {
        if self.eat(literal) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", literal)))
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.pos += 1;
        }
    }

    fn path(mut self) -> Result<PredicatePath, PathSyntaxError> {
        self.expect("//")?;
        let tag = self.tag()?;
        let mut path = PredicatePath {
            tag,
            predicates: Vec::new(),
        };
        if self.eat("[") {
            self.skip_ws();
            path.predicates.push(self.predicate()?);
            self.skip_ws();
            self.expect("]")?;
        }
        if !self.at_end() {
            return Err(self.error("trailing input"));
        }
        Ok(path)
    }

    fn tag(&mut self) -> Result<TagSelector, PathSyntaxError> {
        if self.eat("*") {
            return Ok(TagSelector::Any);
        }
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
            _ => return Err(self.error("expected tag name or `*`")),
        }
        let start = self.pos;
        while self
            .peek()
            .map(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        Ok(TagSelector::Tag(self.chars[start..self.pos].iter().collect()))
    }

    fn predicate(&mut self) -> Result<Predicate, PathSyntaxError> {
        if self.eat("contains(") {
            self.skip_ws();
            let subject = self.subject()?;
            self.skip_ws();
            self.expect(",")?;
            self.skip_ws();
            let value = self.string()?;
            self.skip_ws();
            self.expect(")")?;
            return Ok(match subject {
                Subject::Text => Predicate::TextContains(value),
                Subject::Attr(attr) => Predicate::AttrContains { attr, value },
            });
        }

        let subject = self.subject()?;
        self.skip_ws();
        self.expect("=")?;
        self.skip_ws();
        let value = self.string()?;
        Ok(match subject {
            Subject::Text => Predicate::TextEquals(value),
            Subject::Attr(attr) => Predicate::AttrEquals { attr, value },
        })
    }

    fn subject(&mut self) -> Result<Subject, PathSyntaxError> {
        if self.eat("text()") {
            return Ok(Subject::Text);
        }
        self.expect("@")?;
        let start = self.pos;
        while self
            .peek()
            .map(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ':'))
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected attribute name"));
        }
        Ok(Subject::Attr(self.chars[start..self.pos].iter().collect()))
    }

    fn string(&mut self) -> Result<String, PathSyntaxError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected quoted string")),
        };
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(ch) => value.push(ch),
                        None => return Err(self.error("unterminated escape")),
                    }
                }
                Some(ch) if ch == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(ch) => value.push(ch),
            }
            self.pos += 1;
        }
    }
}

enum Subject {
    Text,
    Attr(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<hierarchy>
  <node class="android.widget.FrameLayout">
    <node class="android.widget.Button" text="Follow" resource-id="com.app:id/follow"/>
    <node class="android.widget.TextView" text="Followers 12"/>
    <button class="android.widget.Button" text="It's fine"/>
    <node class="android.widget.Button" text="follow" content-desc="Follow user"/>
  </node>
</hierarchy>"#;

    fn tree() -> UiTree {
        UiTree::parse(DUMP).unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            PredicatePath::parse("//node[@text='Follow']").unwrap(),
            PredicatePath::with_tag("node").and(Predicate::attr_equals("text", "Follow"))
        );
        assert_eq!(
            PredicatePath::parse("//*[contains(@content-desc,\"user\")]").unwrap(),
            PredicatePath::any().and(Predicate::attr_contains("content-desc", "user"))
        );
        assert_eq!(
            PredicatePath::parse("//*[text()='a']").unwrap(),
            PredicatePath::any().and(Predicate::TextEquals("a".into()))
        );
        assert_eq!(
            PredicatePath::parse("//*[contains(text(), 'a')]").unwrap(),
            PredicatePath::any().and(Predicate::TextContains("a".into()))
        );
        assert_eq!(PredicatePath::parse("//node").unwrap(), PredicatePath::with_tag("node"));
    }

    #[test]
    fn test_rejects_outside_grammar() {
        for expr in [
            "",
            "/node",
            "//",
            "//node[@text='a' and @class='b']",
            "//node[@text=a]",
            "//node[@text='a'",
            "//node[1]",
            "//node/child",
            "//node[@='a']",
        ] {
            assert!(PredicatePath::parse(expr).is_err(), "{}", expr);
            assert!(evaluate_predicate_path_all(&tree(), expr).is_empty());
        }
    }

    #[test]
    fn test_evaluation_in_document_order() {
        let tree = tree();
        let hits = evaluate_predicate_path_all(&tree, "//*[contains(@text,'follow')]");
        assert_eq!(
            hits,
            vec![
                NodeId::from_index(2),
                NodeId::from_index(3),
                NodeId::from_index(5)
            ]
        );
        assert_eq!(
            evaluate_predicate_path(&tree, "//node[@text='follow']"),
            Some(NodeId::from_index(5))
        );
        assert_eq!(
            evaluate_predicate_path(&tree, "//button[text()='It\\'s fine']"),
            Some(NodeId::from_index(4))
        );
    }

    #[test]
    fn test_missing_attribute_equals_empty() {
        let tree = tree();
        let hits = evaluate_predicate_path_all(&tree, "//node[@resource-id='']");
        assert!(!hits.contains(&tree.root()));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_and_path_display_and_match() {
        let tree = tree();
        let path = PredicatePath::any()
            .and(Predicate::attr_equals("class", "android.widget.Button"))
            .and(Predicate::attr_equals("text", "Follow"));
        assert_eq!(
            path.to_string(),
            "//*[@class='android.widget.Button' and @text='Follow']"
        );
        assert_eq!(path.evaluate_all(&tree), vec![NodeId::from_index(2)]);
        assert!(PredicatePath::parse(&path.to_string()).is_err());
    }

    #[test]
    fn test_single_predicate_display_parses_back() {
        let path = PredicatePath::with_tag("node").and(Predicate::attr_equals("text", "It's"));
        assert_eq!(PredicatePath::parse(&path.to_string()).unwrap(), path);
    }
}
