// abnf-parser. An ABNF (RFC 5234) grammar parser.
// Copyright (c) 2026 abnf-parser contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Parse error vocabulary.

use thiserror::Error;

/// The kinds of error a parse can fail with.
///
/// Lexical kinds are reported by the production advancers through
/// [`ParseContext::error`](crate::ParseContext::error); the semantic kinds
/// (`RuleUndefined`, `RulenameDuplicated`) are raised by the tree builder
/// while it resolves rule definitions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ErrorKind {
    /// End of input was reached before the closing `"` of a quoted string.
    #[error("unbalanced quote")]
    UnbalancedQuote,
    /// A control character appeared inside a quoted string.
    #[error("bad quoted char")]
    BadQuotedChar,
    /// A quoted string exceeded the sink-declared maximum length.
    #[error("maximum string length exceeded")]
    MaxLengthExceeded,
    /// A repeat qualifier had a lower bound above its upper bound, or a
    /// bound too large to represent.
    #[error("bad repeat range")]
    BadRepeatRange,
    /// An incremental alternative (`=/`) referenced a rule that was never
    /// defined.
    #[error("rule undefined")]
    RuleUndefined,
    /// A basic definition (`=`) reused an existing rule name.
    #[error("rulename duplicated")]
    RulenameDuplicated,
    /// Input remained after the last parsable rule.
    #[error("trailing characters")]
    TrailingCharacters,
}

/// A failed parse: the kind of the first error encountered, the 1-based line
/// it was found on and, for the rule-resolution kinds, the offending name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// 1-based line number of the error.
    pub line: usize,
    /// The offending rule name for `RuleUndefined`/`RulenameDuplicated`.
    pub name: Option<String>,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)?;
        if let Some(name) = &self.name {
            write!(f, ": {}", name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
