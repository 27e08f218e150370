// abnf-parser. An ABNF (RFC 5234) grammar parser.
// Copyright (c) 2026 abnf-parser contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Building a syntax tree from advancer events, and walking the result.

use crate::ast::{Node, NumberNode, NumberValue, Radix, RepetitionNode, RuleList, RuleNode};
use crate::context::ParseContext;
use crate::error::{ErrorKind, ParseError};
use crate::parser::advance_rulelist;
use crate::position::Position;
use crate::span::Span;

/// Parses a complete ABNF grammar into a [`SyntaxTree`].
///
/// # Examples
///
/// ```
/// let tree = abnf::parse("crlf = %x0D.0A\n");
/// assert!(tree.error().is_none());
/// assert_eq!(tree.rules_count(), 1);
/// ```
pub fn parse(input: &str) -> SyntaxTree {
    parse_with_limit(input, 0)
}

/// Parses a grammar while capping the length of quoted strings; a `0` cap
/// means unlimited.
pub fn parse_with_limit(input: &str, max_quoted_string_length: usize) -> SyntaxTree {
    let mut pos = Position::from_start(input);
    let mut builder = TreeBuilder::new(max_quoted_string_length);

    let advanced = advance_rulelist(&mut pos, &mut builder);
    let mut tree = builder.finish();

    if tree.error.is_none() && (!advanced || !pos.at_end()) {
        tree.error = Some(ParseError {
            kind: ErrorKind::TrailingCharacters,
            line: pos.lineno(),
            name: None,
        });
    }

    // No partial tree escapes a failed parse.
    if tree.error.is_some() {
        tree.root = None;
    }

    tree
}

/// A [`ParseContext`] that assembles the syntax tree.
///
/// Nodes under construction live on a stack: `begin_*` events push, `end_*`
/// events pop and either move the node into its parent (on success) or drop
/// it. Rule definitions are checked against the rule list as they open;
/// a reused name is [`ErrorKind::RulenameDuplicated`], an incremental
/// alternative without a base rule is [`ErrorKind::RuleUndefined`].
///
/// The builder expects the event protocol the advancers produce; feeding it
/// events in any other order panics.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    max_quoted_string_length: usize,
    stack: Vec<Node>,
    root: Option<RuleList>,
    error: Option<ParseError>,
    // Index of the rule-list slot vacated for the incremental rule being
    // rebuilt; rules cannot nest, so one slot suffices.
    incremental_slot: Option<usize>,
}

impl TreeBuilder {
    /// Creates a builder; `max_quoted_string_length` of 0 means unlimited.
    pub fn new(max_quoted_string_length: usize) -> TreeBuilder {
        TreeBuilder {
            max_quoted_string_length,
            ..TreeBuilder::default()
        }
    }

    /// Consumes the builder and returns what the parse produced.
    pub fn finish(self) -> SyntaxTree {
        SyntaxTree {
            error: self.error,
            root: self.root,
        }
    }

    fn record(&mut self, kind: ErrorKind, line: usize, name: Option<String>) {
        if self.error.is_none() {
            self.error = Some(ParseError { kind, line, name });
        }
    }

    fn pop(&mut self) -> Node {
        self.stack.pop().expect("unbalanced end event")
    }

    fn top_repetition(&mut self) -> &mut RepetitionNode {
        match self.stack.last_mut() {
            Some(Node::Repetition(rep)) => rep,
            _ => unreachable!("terminal event outside a repetition"),
        }
    }

    fn top_number(&mut self) -> &mut NumberNode {
        match self.stack.last_mut() {
            Some(Node::Number(num)) => num,
            _ => unreachable!("number continuation without an open number"),
        }
    }

    fn top_rulelist(&mut self) -> &mut RuleList {
        match self.stack.last_mut() {
            Some(Node::RuleList(list)) => list,
            _ => unreachable!("rule event outside the rule list"),
        }
    }

    // Closes an aggregate child: pop it and, on success, hand it to `attach`
    // together with its parent (the new stack top).
    fn close_into_parent(&mut self, ok: bool, attach: fn(&mut Node, Node)) -> bool {
        let node = self.pop();
        if ok {
            let parent = self.stack.last_mut().expect("aggregate without a parent");
            attach(parent, node);
        }
        ok
    }
}

impl<'i> ParseContext<'i> for TreeBuilder {
    fn max_quoted_string_length(&self) -> usize {
        self.max_quoted_string_length
    }

    fn begin_document(&mut self) -> bool {
        self.stack.push(Node::RuleList(RuleList::new()));
        true
    }

    fn end_document(&mut self, ok: bool) -> bool {
        match self.pop() {
            Node::RuleList(list) => self.root = Some(list),
            _ => unreachable!("document closed over a foreign node"),
        }
        debug_assert!(self.stack.is_empty());
        ok
    }

    fn prose(&mut self, text: Span<'i>) -> bool {
        let node = Node::Prose(text.as_str().to_owned());
        self.top_repetition().set_element(node);
        true
    }

    fn quoted_string(&mut self, text: Span<'i>) -> bool {
        let node = Node::QuotedString(text.as_str().to_owned());
        self.top_repetition().set_element(node);
        true
    }

    fn rulename(&mut self, name: Span<'i>) -> bool {
        let node = Node::Rulename(name.as_str().to_owned());
        self.top_repetition().set_element(node);
        true
    }

    fn first_number(&mut self, radix: Radix, digits: Span<'i>) -> bool {
        let num = NumberNode::new(radix, digits.as_str().to_owned());
        self.stack.push(Node::Number(num));
        true
    }

    fn next_number(&mut self, _radix: Radix, digits: Span<'i>) -> bool {
        self.top_number().push_next(digits.as_str().to_owned());
        true
    }

    fn last_number(&mut self, _radix: Radix, digits: Span<'i>) -> bool {
        // A non-empty span is the upper endpoint of a range; an empty one
        // just closes a sequence.
        if !digits.is_empty() {
            self.top_number().set_last(digits.as_str().to_owned());
        }

        match self.pop() {
            num @ Node::Number(_) => self.top_repetition().set_element(num),
            _ => unreachable!("number close without an open number"),
        }
        true
    }

    fn repeat(&mut self, lower: u64, upper: u64) -> bool {
        self.top_repetition().set_bounds(lower, upper);
        true
    }

    fn begin_group(&mut self) -> bool {
        self.stack.push(Node::Group(vec![]));
        true
    }

    fn end_group(&mut self, ok: bool) -> bool {
        self.close_into_parent(ok, |parent, node| match parent {
            Node::Repetition(rep) => rep.set_element(node),
            _ => unreachable!("group outside a repetition"),
        })
    }

    fn begin_option(&mut self) -> bool {
        self.stack.push(Node::Optional(vec![]));
        true
    }

    fn end_option(&mut self, ok: bool) -> bool {
        self.close_into_parent(ok, |parent, node| match parent {
            Node::Repetition(rep) => rep.set_element(node),
            _ => unreachable!("option outside a repetition"),
        })
    }

    fn begin_repetition(&mut self) -> bool {
        self.stack.push(Node::Repetition(RepetitionNode::new()));
        true
    }

    fn end_repetition(&mut self, ok: bool) -> bool {
        // A single numeric literal has no closing event of its own; it is
        // still sitting on the stack here and becomes the element now. The
        // same pop discards a half-built number on the failure path.
        let mut node = self.pop();
        if let Node::Number(_) = node {
            if ok {
                self.top_repetition().set_element(node);
            }
            node = self.pop();
        }

        let rep = match node {
            rep @ Node::Repetition(_) => rep,
            _ => unreachable!("repetition close without an open repetition"),
        };

        if ok {
            match self.stack.last_mut() {
                Some(Node::Concatenation(children)) => children.push(rep),
                _ => unreachable!("repetition outside a concatenation"),
            }
        }
        ok
    }

    fn begin_concatenation(&mut self) -> bool {
        self.stack.push(Node::Concatenation(vec![]));
        true
    }

    fn end_concatenation(&mut self, ok: bool) -> bool {
        self.close_into_parent(ok, |parent, node| match parent {
            Node::Alternation(children) => children.push(node),
            _ => unreachable!("concatenation outside an alternation"),
        })
    }

    fn begin_alternation(&mut self) -> bool {
        self.stack.push(Node::Alternation(vec![]));
        true
    }

    fn end_alternation(&mut self, ok: bool) -> bool {
        self.close_into_parent(ok, |parent, node| match parent {
            Node::Group(children) | Node::Optional(children) => children.push(node),
            Node::Rule(rule) => rule.alternations.push(node),
            _ => unreachable!("alternation in a foreign parent"),
        })
    }

    fn begin_rule(&mut self, name: Span<'i>, incremental: bool) -> bool {
        let text = name.as_str();

        if incremental {
            match self.top_rulelist().detach(text) {
                Some((slot, rule)) => {
                    self.incremental_slot = Some(slot);
                    self.stack.push(Node::Rule(rule));
                    true
                }
                None => {
                    self.record(
                        ErrorKind::RuleUndefined,
                        name.start_line(),
                        Some(text.to_owned()),
                    );
                    false
                }
            }
        } else if self.top_rulelist().contains(text) {
            self.record(
                ErrorKind::RulenameDuplicated,
                name.start_line(),
                Some(text.to_owned()),
            );
            false
        } else {
            self.stack.push(Node::Rule(RuleNode::new(text.to_owned())));
            true
        }
    }

    fn end_rule(&mut self, _name: Span<'i>, incremental: bool, ok: bool) -> bool {
        let mut rule = match self.pop() {
            Node::Rule(rule) => rule,
            _ => unreachable!("rule close without an open rule"),
        };

        if !ok {
            // An incremental rule that failed is dropped altogether; the
            // failed parse never surrenders the tree, so the vacated slot
            // stays unobserved.
            self.incremental_slot = None;
            return false;
        }

        if incremental {
            merge_alternations(&mut rule);
            let slot = self
                .incremental_slot
                .take()
                .expect("incremental rule closed without a vacated slot");
            self.top_rulelist().reattach(slot, rule);
        } else {
            self.top_rulelist().insert(rule);
        }
        true
    }

    fn error(&mut self, kind: ErrorKind, at: &Position<'i>) {
        self.record(kind, at.lineno(), None);
    }
}

// Folds the alternations an incremental definition appended into the rule's
// original alternation, so `a = "x"` extended by `a =/ "y"` reads as the
// single alternation `"x" / "y"`.
fn merge_alternations(rule: &mut RuleNode) {
    if rule.alternations.len() <= 1 {
        return;
    }

    let extra: Vec<Node> = rule.alternations.drain(1..).collect();
    let first = match &mut rule.alternations[0] {
        Node::Alternation(children) => children,
        _ => unreachable!("rule child is not an alternation"),
    };

    for alternation in extra {
        match alternation {
            Node::Alternation(mut children) => first.append(&mut children),
            _ => unreachable!("rule child is not an alternation"),
        }
    }
}

/// The outcome of a parse: either a rule list or the first error, never
/// both.
#[derive(Debug, Default)]
pub struct SyntaxTree {
    error: Option<ParseError>,
    root: Option<RuleList>,
}

impl SyntaxTree {
    /// The first error of a failed parse, `None` on success.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// The 1-based line of the error, or 0 when the parse succeeded.
    pub fn error_line(&self) -> usize {
        self.error.as_ref().map_or(0, |e| e.line)
    }

    /// The offending rule name, when the error concerns one.
    pub fn error_text(&self) -> Option<&str> {
        self.error.as_ref()?.name.as_deref()
    }

    /// The parsed rule list, `None` on error.
    pub fn rules(&self) -> Option<&RuleList> {
        self.root.as_ref()
    }

    /// Number of rules defined, 0 on error.
    pub fn rules_count(&self) -> usize {
        self.root.as_ref().map_or(0, RuleList::len)
    }

    /// Walks the tree depth-first, reporting every node to `visitor`.
    pub fn traverse<V: Visitor>(&self, visitor: &mut V) {
        let Some(root) = &self.root else { return };

        visitor.begin_document();
        for rule in root.iter() {
            visitor.begin_rule(&rule.name);
            for alternation in &rule.alternations {
                visit_node(visitor, alternation);
            }
            visitor.end_rule();
        }
        visitor.end_document();
    }
}

fn visit_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node {
        Node::Prose(text) => visitor.prose(text),
        Node::QuotedString(text) => visitor.quoted_string(text),
        Node::Rulename(name) => visitor.rulename(name),
        Node::Number(num) => match &num.value {
            NumberValue::Single(digits) => visitor.number(num.radix, digits),
            NumberValue::Sequence(items) => {
                for digits in items {
                    visitor.number(num.radix, digits);
                }
            }
            NumberValue::Range(from, to) => visitor.number_range(num.radix, from, to),
        },
        Node::Repetition(rep) => {
            visitor.begin_repetition(rep.lower, rep.upper);
            visit_node(visitor, rep.element());
            visitor.end_repetition();
        }
        Node::Group(children) => {
            visitor.begin_group();
            for child in children {
                visit_node(visitor, child);
            }
            visitor.end_group();
        }
        Node::Optional(children) => {
            visitor.begin_option();
            for child in children {
                visit_node(visitor, child);
            }
            visitor.end_option();
        }
        Node::Concatenation(children) => {
            visitor.begin_concatenation();
            for child in children {
                visit_node(visitor, child);
            }
            visitor.end_concatenation();
        }
        Node::Alternation(children) => {
            visitor.begin_alternation();
            for child in children {
                visit_node(visitor, child);
            }
            visitor.end_alternation();
        }
        Node::Rule(_) | Node::RuleList(_) => {
            unreachable!("rule nodes are dispatched by traverse")
        }
    }
}

/// Receives the nodes of a finished tree in depth-first order.
///
/// All methods default to doing nothing, so a visitor implements only what
/// it needs. [`begin_repetition`](Visitor::begin_repetition) carries the
/// bounds ((1, 1) when the source wrote no repeat qualifier,
/// [`UNBOUNDED`](crate::ast::UNBOUNDED) for an open maximum) so a printing
/// visitor can reproduce the source.
#[allow(unused_variables)]
pub trait Visitor {
    /// The rule list opens.
    fn begin_document(&mut self) {}
    /// The rule list closes.
    fn end_document(&mut self) {}
    /// A rule definition opens.
    fn begin_rule(&mut self, name: &str) {}
    /// The current rule closes.
    fn end_rule(&mut self) {}
    /// An alternation opens.
    fn begin_alternation(&mut self) {}
    /// The current alternation closes.
    fn end_alternation(&mut self) {}
    /// A concatenation opens.
    fn begin_concatenation(&mut self) {}
    /// The current concatenation closes.
    fn end_concatenation(&mut self) {}
    /// A repetition with its bounds opens.
    fn begin_repetition(&mut self, lower: u64, upper: u64) {}
    /// The current repetition closes.
    fn end_repetition(&mut self) {}
    /// A group opens.
    fn begin_group(&mut self) {}
    /// The current group closes.
    fn end_group(&mut self) {}
    /// An option opens.
    fn begin_option(&mut self) {}
    /// The current option closes.
    fn end_option(&mut self) {}
    /// A rule reference.
    fn rulename(&mut self, name: &str) {}
    /// A quoted literal (inner text).
    fn quoted_string(&mut self, text: &str) {}
    /// A prose description (inner text).
    fn prose(&mut self, text: &str) {}
    /// One numeric literal; sequences arrive as consecutive calls.
    fn number(&mut self, radix: Radix, digits: &str) {}
    /// A numeric range literal.
    fn number_range(&mut self, radix: Radix, from: &str, to: &str) {}
}
