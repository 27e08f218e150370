// abnf-parser. An ABNF (RFC 5234) grammar parser.
// Copyright (c) 2026 abnf-parser contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The typed syntax tree produced by a successful parse.
//!
//! Ownership runs strictly top-down: the [`RuleList`] owns its rules, rules
//! own their alternations, and so on down to the terminal nodes. There are
//! no back references and no sharing, so a finished tree is freely readable
//! from several threads.

use std::collections::HashMap;

/// Sentinel upper bound of a repetition with no maximum (`*element`,
/// `2*element`).
pub const UNBOUNDED: u64 = u64::MAX;

/// The radix of a numeric literal: `%b`, `%d` or `%x`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Radix {
    /// `%b`, binary digits.
    Binary,
    /// `%d`, decimal digits.
    Decimal,
    /// `%x`, hexadecimal digits.
    Hexadecimal,
}

impl Radix {
    /// The prefix letter appearing after `%` in the source.
    pub fn prefix(self) -> char {
        match self {
            Radix::Binary => 'b',
            Radix::Decimal => 'd',
            Radix::Hexadecimal => 'x',
        }
    }
}

/// One node of the syntax tree.
#[derive(Debug)]
pub enum Node {
    /// `<...>` prose description; carries the inner text.
    Prose(String),
    /// `%b...` / `%d...` / `%x...` numeric literal.
    Number(NumberNode),
    /// `"..."` literal; carries the inner text.
    QuotedString(String),
    /// A reference to another rule.
    Rulename(String),
    /// `n*m element`.
    Repetition(RepetitionNode),
    /// `( ... )`; the children are alternations.
    Group(Vec<Node>),
    /// `[ ... ]`; the children are alternations.
    Optional(Vec<Node>),
    /// Space-separated elements; the children are repetitions.
    Concatenation(Vec<Node>),
    /// `/`-separated choices; the children are concatenations.
    Alternation(Vec<Node>),
    /// One rule definition.
    Rule(RuleNode),
    /// The root of the tree.
    RuleList(RuleList),
}

/// The digit strings of a numeric literal, preserved verbatim in their
/// source radix.
#[derive(Debug, Eq, PartialEq)]
pub enum NumberValue {
    /// A single literal, e.g. `%x20`.
    Single(String),
    /// A `.`-separated sequence, e.g. `%d13.10`.
    Sequence(Vec<String>),
    /// A `-` range, e.g. `%x41-5A`; exactly two endpoints.
    Range(String, String),
}

/// A numeric literal node.
#[derive(Debug)]
pub struct NumberNode {
    /// The literal's radix.
    pub radix: Radix,
    /// Its digit strings.
    pub value: NumberValue,
}

impl NumberNode {
    pub(crate) fn new(radix: Radix, first: String) -> NumberNode {
        NumberNode {
            radix,
            value: NumberValue::Single(first),
        }
    }

    // Appends a sequence element.
    pub(crate) fn push_next(&mut self, digits: String) {
        match &mut self.value {
            NumberValue::Single(first) => {
                let first = std::mem::take(first);
                self.value = NumberValue::Sequence(vec![first, digits]);
            }
            NumberValue::Sequence(items) => items.push(digits),
            NumberValue::Range(..) => unreachable!("sequence element after range"),
        }
    }

    // Turns a single literal into a range by supplying the upper endpoint.
    pub(crate) fn set_last(&mut self, digits: String) {
        match &mut self.value {
            NumberValue::Single(first) => {
                let first = std::mem::take(first);
                self.value = NumberValue::Range(first, digits);
            }
            _ => unreachable!("range endpoint after sequence"),
        }
    }
}

/// A repetition node: bounds plus exactly one element.
#[derive(Debug)]
pub struct RepetitionNode {
    /// Lower bound; defaults to 1 when no repeat qualifier was written.
    pub lower: u64,
    /// Upper bound; [`UNBOUNDED`] when there is no maximum. Defaults to 1.
    pub upper: u64,
    element: Option<Box<Node>>,
}

impl RepetitionNode {
    pub(crate) fn new() -> RepetitionNode {
        RepetitionNode {
            lower: 1,
            upper: 1,
            element: None,
        }
    }

    pub(crate) fn set_bounds(&mut self, lower: u64, upper: u64) {
        self.lower = lower;
        self.upper = upper;
    }

    pub(crate) fn set_element(&mut self, element: Node) {
        self.element = Some(Box::new(element));
    }

    /// The repeated element. Always present in a tree returned by a
    /// successful parse.
    pub fn element(&self) -> &Node {
        self.element
            .as_deref()
            .expect("repetition node without an element")
    }
}

/// One rule definition: its name (original spelling) and its alternations.
#[derive(Debug)]
pub struct RuleNode {
    /// The rule's name as written at its definition.
    pub name: String,
    /// The rule's alternation children.
    pub alternations: Vec<Node>,
}

impl RuleNode {
    pub(crate) fn new(name: String) -> RuleNode {
        RuleNode {
            name,
            alternations: vec![],
        }
    }
}

/// The root of the tree: rule definitions in their order of appearance,
/// indexed by case-insensitive name.
#[derive(Debug, Default)]
pub struct RuleList {
    rules: Vec<RuleNode>,
    index: HashMap<String, usize>,
}

impl RuleList {
    pub(crate) fn new() -> RuleList {
        RuleList::default()
    }

    /// Number of rules defined. Incremental alternatives extend an existing
    /// rule and do not add to this count.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rule was defined.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks a rule up by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&RuleNode> {
        let idx = *self.index.get(&name.to_ascii_lowercase())?;
        Some(&self.rules[idx])
    }

    /// Returns `true` when a rule of that name is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterates the rules in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleNode> {
        self.rules.iter()
    }

    pub(crate) fn insert(&mut self, rule: RuleNode) {
        let key = rule.name.to_ascii_lowercase();
        self.index.insert(key, self.rules.len());
        self.rules.push(rule);
    }

    // Temporarily removes a rule for an incremental alternative, leaving a
    // husk in its slot; `reattach` restores it. The husk is only observable
    // while the rule is being extended, and a failed parse never returns
    // the tree.
    pub(crate) fn detach(&mut self, name: &str) -> Option<(usize, RuleNode)> {
        let idx = *self.index.get(&name.to_ascii_lowercase())?;
        let rule = std::mem::replace(&mut self.rules[idx], RuleNode::new(String::new()));
        Some((idx, rule))
    }

    pub(crate) fn reattach(&mut self, slot: usize, rule: RuleNode) {
        self.rules[slot] = rule;
    }
}
