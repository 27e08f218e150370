// abnf-parser. An ABNF (RFC 5234) grammar parser.
// Copyright (c) 2026 abnf-parser contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The recursive-descent advancers for the ABNF meta-grammar of RFC 5234 §4.
//!
//! Each advancer takes the cursor and a [`ParseContext`] sink, advances the
//! cursor over one instance of its production and reports the captured
//! pieces to the sink. All of them commit on success: a `false` return
//! leaves the cursor exactly where it was. The grammar is LL(1) at every
//! decision point used here, so a single character of lookahead decides
//! each alternative and no speculative execution is needed.
//!
//! Pass [`NoContext`](crate::NoContext) to use an advancer as a pure
//! validator.

use crate::ast::{Radix, UNBOUNDED};
use crate::context::ParseContext;
use crate::core_rules::{
    advance_bits, advance_digits, advance_hexdigits, advance_newline, is_alpha, is_cr, is_digit,
    is_dquote, is_lf, is_prose_value_char, is_sp, is_vchar, is_wsp,
};
use crate::error::ErrorKind;
use crate::position::{commit, Position};

/// Applies `step` between `lower` and `lower + upper` times.
///
/// `step` is applied `lower` times; if it fails before that, the whole call
/// fails. It is then applied up to `upper` more times, stopping at the first
/// failure. Pass [`UNBOUNDED`] for an open upper end.
///
/// This helper does not restore the cursor on failure; callers compose it
/// with the usual save-and-commit discipline.
pub fn repeat_range<'i, F>(pos: &mut Position<'i>, lower: u64, upper: u64, mut step: F) -> bool
where
    F: FnMut(&mut Position<'i>) -> bool,
{
    for _ in 0..lower {
        if !step(pos) {
            return false;
        }
    }

    let mut extra = 0;
    while extra < upper && step(pos) {
        extra += 1;
    }

    true
}

/// `*c-wsp`.
fn skip_c_wsp<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) {
    repeat_range(pos, 0, UNBOUNDED, |p| advance_c_wsp(p, ctx));
}

/// Advances over a prose description.
///
/// `prose-val = "<" *(%x20-3D / %x3F-7E) ">"`
///
/// Emits [`prose`](ParseContext::prose) with the text between the angle
/// brackets.
pub fn advance_prose<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !p.match_char('<') {
        return false;
    }

    let first = p;
    while p.match_char_by(is_prose_value_char) {}
    let last = p;

    if !p.match_char('>') {
        return false;
    }

    if !ctx.prose(first.span(&last)) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a numeric literal.
///
/// ```text
/// num-val = "%" (bin-val / dec-val / hex-val)
/// bin-val = "b" 1*BIT    [ 1*("." 1*BIT)    / ("-" 1*BIT)    ]
/// dec-val = "d" 1*DIGIT  [ 1*("." 1*DIGIT)  / ("-" 1*DIGIT)  ]
/// hex-val = "x" 1*HEXDIG [ 1*("." 1*HEXDIG) / ("-" 1*HEXDIG) ]
/// ```
///
/// The sink receives [`first_number`](ParseContext::first_number) for the
/// mandatory first digit run, [`next_number`](ParseContext::next_number) for
/// each further `.`-separated run, and [`last_number`](ParseContext::last_number)
/// either with the `-` range's upper bound or with an empty span to close a
/// sequence. A plain single literal emits `first_number` only.
pub fn advance_number<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !p.match_char('%') {
        return false;
    }

    let (radix, advance): (Radix, fn(&mut Position<'i>) -> bool) = match p.peek() {
        Some('b') => (Radix::Binary, advance_bits),
        Some('d') => (Radix::Decimal, advance_digits),
        Some('x') => (Radix::Hexadecimal, advance_hexdigits),
        _ => return false,
    };
    p.bump();

    let first = p;
    if !advance(&mut p) {
        return false;
    }
    if !ctx.first_number(radix, first.span(&p)) {
        return false;
    }

    if p.match_char('-') {
        let first = p;
        if !advance(&mut p) {
            return false;
        }
        if !ctx.last_number(radix, first.span(&p)) {
            return false;
        }
    } else if p.peek() == Some('.') {
        while p.match_char('.') {
            let first = p;
            if !advance(&mut p) {
                return false;
            }
            if !ctx.next_number(radix, first.span(&p)) {
                return false;
            }
        }

        // No more sequence elements.
        if !ctx.last_number(radix, p.span(&p)) {
            return false;
        }
    }

    commit(pos, p)
}

/// Advances over a quoted literal.
///
/// `char-val = DQUOTE *(%x20-21 / %x23-7E) DQUOTE`
///
/// Emits [`quoted_string`](ParseContext::quoted_string) with the text
/// between the quotes. Reports [`ErrorKind::UnbalancedQuote`] when the input
/// ends before the closing quote, [`ErrorKind::BadQuotedChar`] for anything
/// that is not SP or VCHAR inside, and [`ErrorKind::MaxLengthExceeded`] once
/// the inner text outgrows the sink's declared maximum.
pub fn advance_quoted_string<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !p.match_char_by(is_dquote) {
        return false;
    }

    let max_length = ctx.max_quoted_string_length();
    let first = p;

    loop {
        match p.peek() {
            None => {
                ctx.error(ErrorKind::UnbalancedQuote, &p);
                return false;
            }
            Some(ch) if is_dquote(ch) => break,
            Some(ch) if is_sp(ch) || is_vchar(ch) => {
                if max_length != 0 && p.pos() - first.pos() >= max_length {
                    ctx.error(ErrorKind::MaxLengthExceeded, &p);
                    return false;
                }
                p.bump();
            }
            Some(_) => {
                ctx.error(ErrorKind::BadQuotedChar, &p);
                return false;
            }
        }
    }

    let last = p;
    p.bump();

    if !ctx.quoted_string(first.span(&last)) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a repeat qualifier.
///
/// `repeat = 1*DIGIT / (*DIGIT "*" *DIGIT)`
///
/// A missing lower bound is 0, a missing upper bound is [`UNBOUNDED`], and
/// an exact count sets both bounds. Emits
/// [`repeat`](ParseContext::repeat). Bounds that overflow, or a lower bound
/// above the upper one, report [`ErrorKind::BadRepeatRange`].
pub fn advance_repeat<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    let first = p;
    advance_digits(&mut p);
    let lower_digits = first.span(&p);

    let starred = p.match_char('*');
    if !starred && lower_digits.is_empty() {
        return false;
    }

    let lower = if lower_digits.is_empty() {
        0
    } else {
        match lower_digits.as_str().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                ctx.error(ErrorKind::BadRepeatRange, pos);
                return false;
            }
        }
    };

    let upper = if starred {
        let first = p;
        advance_digits(&mut p);
        let upper_digits = first.span(&p);

        if upper_digits.is_empty() {
            UNBOUNDED
        } else {
            match upper_digits.as_str().parse::<u64>() {
                Ok(n) => n,
                Err(_) => {
                    ctx.error(ErrorKind::BadRepeatRange, pos);
                    return false;
                }
            }
        }
    } else {
        lower
    };

    if lower > upper {
        ctx.error(ErrorKind::BadRepeatRange, pos);
        return false;
    }

    if !ctx.repeat(lower, upper) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a comment.
///
/// `comment = ";" *(WSP / VCHAR) c-nl`, relaxed: any character short of a
/// line ending is tolerated inside, and the terminating newline (any of
/// CRLF, LF, CR) is optional so a comment may close the input.
///
/// Emits [`comment`](ParseContext::comment) with the text after the `;`,
/// line ending excluded.
pub fn advance_comment<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !p.match_char(';') {
        return false;
    }

    let first = p;
    while p.match_char_by(|ch| !is_cr(ch) && !is_lf(ch)) {}
    let last = p;

    if !ctx.comment(first.span(&last)) {
        return false;
    }

    advance_newline(&mut p);

    commit(pos, p)
}

// rulename = ALPHA *(ALPHA / DIGIT / "-"), without the sink notification;
// shared between rule references and rule definitions.
fn scan_rulename(pos: &mut Position<'_>) -> bool {
    let mut p = *pos;

    if !p.match_char_by(is_alpha) {
        return false;
    }
    while p.match_char_by(|ch| is_alpha(ch) || is_digit(ch) || ch == '-') {}

    commit(pos, p)
}

/// Advances over a rule name used as a reference.
///
/// `rulename = ALPHA *(ALPHA / DIGIT / "-")`
///
/// Emits [`rulename`](ParseContext::rulename).
pub fn advance_rulename<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    let first = p;
    if !scan_rulename(&mut p) {
        return false;
    }

    if !ctx.rulename(first.span(&p)) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a comment or a line ending.
///
/// `c-nl = comment / CRLF`, with the newline relaxed to any of the three
/// common endings.
pub fn advance_c_nl<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    advance_comment(pos, ctx) || advance_newline(pos)
}

/// Advances over one unit of in-rule white space.
///
/// `c-wsp = WSP / (c-nl WSP)`. The second form is what allows a rule to
/// continue on the next line, as long as the continuation is indented.
pub fn advance_c_wsp<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if p.match_char_by(is_wsp) {
        return commit(pos, p);
    }

    if advance_c_nl(&mut p, ctx) && p.match_char_by(is_wsp) {
        return commit(pos, p);
    }

    false
}

/// Advances over one element.
///
/// `element = rulename / group / option / char-val / num-val / prose-val`
///
/// The alternatives start with distinct characters, so the first match wins
/// without backtracking across alternatives.
pub fn advance_element<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    advance_rulename(pos, ctx)
        || advance_group(pos, ctx)
        || advance_option(pos, ctx)
        || advance_number(pos, ctx)
        || advance_quoted_string(pos, ctx)
        || advance_prose(pos, ctx)
}

/// Advances over a repetition.
///
/// `repetition = [repeat] element`
///
/// Emits `begin_repetition`, the optional `repeat(lower, upper)`, the
/// element's events, and `end_repetition(ok)`. Without a repeat qualifier
/// the sink keeps the default bounds of (1, 1).
pub fn advance_repetition<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !ctx.begin_repetition() {
        return false;
    }

    advance_repeat(&mut p, ctx);
    let ok = advance_element(&mut p, ctx);

    if !ctx.end_repetition(ok) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a concatenation.
///
/// `concatenation = repetition *(1*c-wsp repetition)`
pub fn advance_concatenation<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !ctx.begin_concatenation() {
        return false;
    }

    let ok = advance_repetition(&mut p, ctx);
    if ok {
        loop {
            let mut q = p;
            if !repeat_range(&mut q, 1, UNBOUNDED, |r| advance_c_wsp(r, ctx)) {
                break;
            }
            if !advance_repetition(&mut q, ctx) {
                break;
            }
            p = q;
        }
    }

    if !ctx.end_concatenation(ok) {
        return false;
    }

    commit(pos, p)
}

/// Advances over an alternation.
///
/// `alternation = concatenation *(*c-wsp "/" *c-wsp concatenation)`
pub fn advance_alternation<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !ctx.begin_alternation() {
        return false;
    }

    let ok = advance_concatenation(&mut p, ctx);
    if ok {
        loop {
            let mut q = p;
            skip_c_wsp(&mut q, ctx);
            if !q.match_char('/') {
                break;
            }
            skip_c_wsp(&mut q, ctx);
            if !advance_concatenation(&mut q, ctx) {
                break;
            }
            p = q;
        }
    }

    if !ctx.end_alternation(ok) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a parenthesised group.
///
/// `group = "(" *c-wsp alternation *c-wsp ")"`
pub fn advance_group<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !p.match_char('(') {
        return false;
    }

    if !ctx.begin_group() {
        return false;
    }

    skip_c_wsp(&mut p, ctx);
    let mut ok = advance_alternation(&mut p, ctx);
    if ok {
        skip_c_wsp(&mut p, ctx);
        ok = p.match_char(')');
    }

    if !ctx.end_group(ok) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a bracketed option.
///
/// `option = "[" *c-wsp alternation *c-wsp "]"`
pub fn advance_option<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !p.match_char('[') {
        return false;
    }

    if !ctx.begin_option() {
        return false;
    }

    skip_c_wsp(&mut p, ctx);
    let mut ok = advance_alternation(&mut p, ctx);
    if ok {
        skip_c_wsp(&mut p, ctx);
        ok = p.match_char(']');
    }

    if !ctx.end_option(ok) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a definition operator.
///
/// `defined-as = *c-wsp ("=" / "=/") *c-wsp`
///
/// Returns `None` when no operator is present (cursor unchanged), otherwise
/// whether the rule uses incremental alternatives (`=/`).
pub fn advance_defined_as<'i, C: ParseContext<'i>>(
    pos: &mut Position<'i>,
    ctx: &mut C,
) -> Option<bool> {
    let mut p = *pos;

    skip_c_wsp(&mut p, ctx);
    if !p.match_char('=') {
        return None;
    }
    let incremental = p.match_char('/');
    skip_c_wsp(&mut p, ctx);

    commit(pos, p);
    Some(incremental)
}

/// Advances over a rule's right-hand side.
///
/// `elements = alternation *c-wsp`
pub fn advance_elements<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !advance_alternation(&mut p, ctx) {
        return false;
    }
    skip_c_wsp(&mut p, ctx);

    commit(pos, p)
}

/// Advances over one rule definition.
///
/// `rule = rulename defined-as elements c-nl`, with the final line ending
/// optional so the last rule may close the input.
///
/// Emits `begin_rule(name, incremental)` before the right-hand side and
/// `end_rule(name, incremental, ok)` after it; the name span delimits the
/// defined rule name. `end_rule` is only emitted when `begin_rule` accepted
/// the definition.
pub fn advance_rule<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    let first = p;
    if !scan_rulename(&mut p) {
        return false;
    }
    let name = first.span(&p);

    let incremental = match advance_defined_as(&mut p, ctx) {
        Some(incremental) => incremental,
        None => return false,
    };

    if !ctx.begin_rule(name, incremental) {
        return false;
    }

    let ok = advance_elements(&mut p, ctx);
    if ok {
        advance_c_nl(&mut p, ctx);
    }

    if !ctx.end_rule(name, incremental, ok) {
        return false;
    }

    commit(pos, p)
}

/// Advances over a whole rule list, the top production.
///
/// `rulelist = 1*(rule / (*c-wsp c-nl))`. Blank lines and comment-only
/// lines between rules are tolerated, as is empty input.
///
/// Emits `begin_document` first and `end_document(ok)` last, where `ok`
/// reports whether the whole input was consumed. Returns `true` when the
/// cursor advanced or the input was already empty; on a partial parse the
/// cursor is left at the first offending character, which is where the
/// recorded error (if any) points.
pub fn advance_rulelist<'i, C: ParseContext<'i>>(pos: &mut Position<'i>, ctx: &mut C) -> bool {
    let mut p = *pos;

    if !ctx.begin_document() {
        return false;
    }

    loop {
        let mut q = p;
        if advance_rule(&mut q, ctx) {
            p = q;
            continue;
        }

        let mut q = p;
        skip_c_wsp(&mut q, ctx);
        if advance_c_nl(&mut q, ctx) {
            p = q;
            continue;
        }

        break;
    }

    // Tolerate a whitespace-only tail with no final line ending.
    if !p.at_end() {
        let mut q = p;
        skip_c_wsp(&mut q, ctx);
        if q.at_end() {
            p = q;
        }
    }

    let consumed_all = p.at_end();
    ctx.end_document(consumed_all);

    commit(pos, p) || consumed_all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoContext;
    use crate::span::Span;

    fn pos(input: &str) -> Position<'_> {
        Position::from_start(input)
    }

    /// Collects every event as a readable line, for asserting sequences.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        error: Option<(ErrorKind, usize)>,
        max_quoted: usize,
    }

    impl Recorder {
        fn with_max_quoted(max_quoted: usize) -> Recorder {
            Recorder {
                max_quoted,
                ..Recorder::default()
            }
        }

        fn begins(&self, name: &str) -> usize {
            let prefix = format!("begin_{name}");
            self.events
                .iter()
                .filter(|e| e.starts_with(&prefix))
                .count()
        }

        fn ends(&self, name: &str) -> usize {
            let prefix = format!("end_{name}");
            self.events
                .iter()
                .filter(|e| e.starts_with(&prefix))
                .count()
        }
    }

    impl<'i> ParseContext<'i> for Recorder {
        fn max_quoted_string_length(&self) -> usize {
            self.max_quoted
        }

        fn begin_document(&mut self) -> bool {
            self.events.push("begin_document".to_owned());
            true
        }

        fn end_document(&mut self, ok: bool) -> bool {
            self.events.push(format!("end_document({ok})"));
            ok
        }

        fn prose(&mut self, text: Span<'i>) -> bool {
            self.events.push(format!("prose({})", text.as_str()));
            true
        }

        fn quoted_string(&mut self, text: Span<'i>) -> bool {
            self.events.push(format!("quoted({})", text.as_str()));
            true
        }

        fn comment(&mut self, text: Span<'i>) -> bool {
            self.events.push(format!("comment({})", text.as_str()));
            true
        }

        fn rulename(&mut self, name: Span<'i>) -> bool {
            self.events.push(format!("rulename({})", name.as_str()));
            true
        }

        fn first_number(&mut self, radix: Radix, digits: Span<'i>) -> bool {
            self.events
                .push(format!("first_number({}, {})", radix.prefix(), digits.as_str()));
            true
        }

        fn next_number(&mut self, _radix: Radix, digits: Span<'i>) -> bool {
            self.events.push(format!("next_number({})", digits.as_str()));
            true
        }

        fn last_number(&mut self, _radix: Radix, digits: Span<'i>) -> bool {
            self.events.push(format!("last_number({})", digits.as_str()));
            true
        }

        fn repeat(&mut self, lower: u64, upper: u64) -> bool {
            self.events.push(format!("repeat({lower}, {upper})"));
            true
        }

        fn begin_group(&mut self) -> bool {
            self.events.push("begin_group".to_owned());
            true
        }

        fn end_group(&mut self, ok: bool) -> bool {
            self.events.push(format!("end_group({ok})"));
            ok
        }

        fn begin_option(&mut self) -> bool {
            self.events.push("begin_option".to_owned());
            true
        }

        fn end_option(&mut self, ok: bool) -> bool {
            self.events.push(format!("end_option({ok})"));
            ok
        }

        fn begin_repetition(&mut self) -> bool {
            self.events.push("begin_repetition".to_owned());
            true
        }

        fn end_repetition(&mut self, ok: bool) -> bool {
            self.events.push(format!("end_repetition({ok})"));
            ok
        }

        fn begin_concatenation(&mut self) -> bool {
            self.events.push("begin_concatenation".to_owned());
            true
        }

        fn end_concatenation(&mut self, ok: bool) -> bool {
            self.events.push(format!("end_concatenation({ok})"));
            ok
        }

        fn begin_alternation(&mut self) -> bool {
            self.events.push("begin_alternation".to_owned());
            true
        }

        fn end_alternation(&mut self, ok: bool) -> bool {
            self.events.push(format!("end_alternation({ok})"));
            ok
        }

        fn begin_rule(&mut self, name: Span<'i>, incremental: bool) -> bool {
            self.events
                .push(format!("begin_rule({}, {incremental})", name.as_str()));
            true
        }

        fn end_rule(&mut self, name: Span<'i>, _incremental: bool, ok: bool) -> bool {
            self.events
                .push(format!("end_rule({}, {ok})", name.as_str()));
            ok
        }

        fn error(&mut self, kind: ErrorKind, at: &Position<'i>) {
            if self.error.is_none() {
                self.error = Some((kind, at.lineno()));
            }
        }
    }

    #[test]
    fn repeat_range_honors_bounds() {
        let input = "aaaa";
        let mut p = pos(input);
        assert!(repeat_range(&mut p, 2, 1, |p| p.match_char('a')));
        assert_eq!(p.pos(), 3);

        let mut p = pos(input);
        assert!(repeat_range(&mut p, 0, UNBOUNDED, |p| p.match_char('a')));
        assert_eq!(p.pos(), 4);

        let mut p = pos(input);
        assert!(!repeat_range(&mut p, 5, UNBOUNDED, |p| p.match_char('a')));
    }

    #[test]
    fn prose_values() {
        let valid = ["<>", "< >", "<=>", "<?>", "<~>", "< x >"];
        for input in valid {
            let mut p = pos(input);
            assert!(advance_prose(&mut p, &mut NoContext), "{input:?}");
            assert!(p.at_end(), "{input:?}");
        }

        let invalid = [" ", "<", ">", "<\x19>", "<\x7F>", "< x "];
        for input in invalid {
            let mut p = pos(input);
            assert!(!advance_prose(&mut p, &mut NoContext), "{input:?}");
            assert_eq!(p.pos(), 0, "{input:?}");
        }
    }

    #[test]
    fn prose_reports_inner_text() {
        let mut rec = Recorder::default();
        let mut p = pos("<free text>");
        assert!(advance_prose(&mut p, &mut rec));
        assert_eq!(rec.events, ["prose(free text)"]);
    }

    #[test]
    fn number_singles() {
        for input in ["%b101", "%d255", "%x7F", "%xab"] {
            let mut p = pos(input);
            assert!(advance_number(&mut p, &mut NoContext), "{input:?}");
            assert!(p.at_end(), "{input:?}");
        }
    }

    #[test]
    fn number_rejects_wrong_radix_digits() {
        // The literal stops at the first digit outside its radix; trailing
        // garbage is the caller's concern, absence of any digit is ours.
        for input in ["%b2", "%dx", "%xG", "%q1", "%", ""] {
            let mut p = pos(input);
            assert!(!advance_number(&mut p, &mut NoContext), "{input:?}");
            assert_eq!(p.pos(), 0, "{input:?}");
        }
    }

    #[test]
    fn number_range_events() {
        let mut rec = Recorder::default();
        let mut p = pos("%x01-7F");
        assert!(advance_number(&mut p, &mut rec));
        assert_eq!(rec.events, ["first_number(x, 01)", "last_number(7F)"]);
    }

    #[test]
    fn number_sequence_events() {
        let mut rec = Recorder::default();
        let mut p = pos("%d13.10.7");
        assert!(advance_number(&mut p, &mut rec));
        assert_eq!(
            rec.events,
            [
                "first_number(d, 13)",
                "next_number(10)",
                "next_number(7)",
                "last_number()"
            ]
        );
    }

    #[test]
    fn number_requires_digits_after_dash_and_dot() {
        for input in ["%x41-", "%x41-G", "%d13.", "%d13.x", "%b1-2"] {
            let mut p = pos(input);
            assert!(!advance_number(&mut p, &mut NoContext), "{input:?}");
            assert_eq!(p.pos(), 0, "{input:?}");
        }
    }

    #[test]
    fn quoted_string_basics() {
        let mut rec = Recorder::default();
        let mut p = pos("\"hello world\"");
        assert!(advance_quoted_string(&mut p, &mut rec));
        assert!(p.at_end());
        assert_eq!(rec.events, ["quoted(hello world)"]);

        let mut p = pos("\"\"");
        assert!(advance_quoted_string(&mut p, &mut NoContext));
        assert!(p.at_end());
    }

    #[test]
    fn quoted_string_unbalanced() {
        let mut rec = Recorder::default();
        let mut p = pos("\"no end");
        assert!(!advance_quoted_string(&mut p, &mut rec));
        assert_eq!(p.pos(), 0);
        assert_eq!(rec.error, Some((ErrorKind::UnbalancedQuote, 1)));
    }

    #[test]
    fn quoted_string_rejects_controls() {
        let mut rec = Recorder::default();
        let mut p = pos("\"a\tb\"");
        assert!(!advance_quoted_string(&mut p, &mut rec));
        assert_eq!(rec.error, Some((ErrorKind::BadQuotedChar, 1)));
    }

    #[test]
    fn quoted_string_length_limit() {
        let mut rec = Recorder::with_max_quoted(3);
        let mut p = pos("\"abcd\"");
        assert!(!advance_quoted_string(&mut p, &mut rec));
        assert_eq!(rec.error, Some((ErrorKind::MaxLengthExceeded, 1)));

        let mut rec = Recorder::with_max_quoted(4);
        let mut p = pos("\"abcd\"");
        assert!(advance_quoted_string(&mut p, &mut rec));

        // Zero means unlimited.
        let mut rec = Recorder::with_max_quoted(0);
        let mut p = pos("\"abcdefghijklmnop\"");
        assert!(advance_quoted_string(&mut p, &mut rec));
    }

    #[test]
    fn repeat_forms() {
        let cases: &[(&str, u64, u64)] = &[
            ("5", 5, 5),
            ("*", 0, UNBOUNDED),
            ("2*5", 2, 5),
            ("*7", 0, 7),
            ("3*", 3, UNBOUNDED),
            ("0*0", 0, 0),
        ];

        for &(input, lower, upper) in cases {
            let mut rec = Recorder::default();
            let mut p = pos(input);
            assert!(advance_repeat(&mut p, &mut rec), "{input:?}");
            assert!(p.at_end(), "{input:?}");
            assert_eq!(rec.events, [format!("repeat({lower}, {upper})")]);
        }
    }

    #[test]
    fn repeat_rejects_empty_and_inverted() {
        for input in ["", "x"] {
            let mut p = pos(input);
            assert!(!advance_repeat(&mut p, &mut NoContext), "{input:?}");
            assert_eq!(p.pos(), 0);
        }

        let mut rec = Recorder::default();
        let mut p = pos("5*2");
        assert!(!advance_repeat(&mut p, &mut rec));
        assert_eq!(p.pos(), 0);
        assert_eq!(rec.error, Some((ErrorKind::BadRepeatRange, 1)));
    }

    #[test]
    fn comment_with_and_without_newline() {
        let mut rec = Recorder::default();
        let mut p = pos("; note\r\nnext");
        assert!(advance_comment(&mut p, &mut rec));
        assert_eq!(p.pos(), 8);
        assert_eq!(rec.events, ["comment( note)"]);

        let mut p = pos("; eof comment");
        assert!(advance_comment(&mut p, &mut NoContext));
        assert!(p.at_end());

        let mut p = pos("x");
        assert!(!advance_comment(&mut p, &mut NoContext));
    }

    #[test]
    fn rulename_shapes() {
        for input in ["a", "rule", "rule-1", "A1-B2"] {
            let mut p = pos(input);
            assert!(advance_rulename(&mut p, &mut NoContext), "{input:?}");
            assert!(p.at_end(), "{input:?}");
        }

        for input in ["1a", "-a", "", " a"] {
            let mut p = pos(input);
            assert!(!advance_rulename(&mut p, &mut NoContext), "{input:?}");
            assert_eq!(p.pos(), 0, "{input:?}");
        }
    }

    #[test]
    fn c_wsp_forms() {
        let mut p = pos(" x");
        assert!(advance_c_wsp(&mut p, &mut NoContext));
        assert_eq!(p.pos(), 1);

        // Newline followed by indentation continues a rule.
        let mut p = pos("\n x");
        assert!(advance_c_wsp(&mut p, &mut NoContext));
        assert_eq!(p.pos(), 2);

        // Newline at column zero does not.
        let mut p = pos("\nx");
        assert!(!advance_c_wsp(&mut p, &mut NoContext));
        assert_eq!(p.pos(), 0);

        let mut p = pos("; c\n x");
        assert!(advance_c_wsp(&mut p, &mut NoContext));
        assert_eq!(p.pos(), 5);
    }

    #[test]
    fn repetition_default_bounds_have_no_repeat_event() {
        let mut rec = Recorder::default();
        let mut p = pos("rule");
        assert!(advance_repetition(&mut p, &mut rec));
        assert_eq!(
            rec.events,
            [
                "begin_repetition",
                "rulename(rule)",
                "end_repetition(true)"
            ]
        );
    }

    #[test]
    fn repetition_with_bounds() {
        let mut rec = Recorder::default();
        let mut p = pos("1*DIGIT");
        assert!(advance_repetition(&mut p, &mut rec));
        assert_eq!(
            rec.events,
            [
                "begin_repetition",
                format!("repeat(1, {UNBOUNDED})").as_str(),
                "rulename(DIGIT)",
                "end_repetition(true)"
            ]
        );
    }

    #[test]
    fn repetition_failure_still_closes() {
        let mut rec = Recorder::default();
        let mut p = pos("*)");
        assert!(!advance_repetition(&mut p, &mut rec));
        assert_eq!(p.pos(), 0);
        assert_eq!(rec.ends("repetition"), 1);
        assert!(rec.events.contains(&"end_repetition(false)".to_owned()));
    }

    #[test]
    fn concatenation_collects_spaced_repetitions() {
        let mut rec = Recorder::default();
        let mut p = pos("a b  c");
        assert!(advance_concatenation(&mut p, &mut rec));
        assert!(p.at_end());
        assert_eq!(rec.begins("concatenation"), 1);
        assert_eq!(rec.begins("repetition"), 3);
    }

    #[test]
    fn alternation_with_slashes() {
        let mut rec = Recorder::default();
        let mut p = pos("a / b / c");
        assert!(advance_alternation(&mut p, &mut rec));
        assert!(p.at_end());
        assert_eq!(rec.begins("concatenation"), 3);
        assert_eq!(rec.begins("alternation"), 1);
    }

    #[test]
    fn group_and_option() {
        let mut p = pos("( a / b )");
        assert!(advance_group(&mut p, &mut NoContext));
        assert!(p.at_end());

        let mut p = pos("[ a ]");
        assert!(advance_option(&mut p, &mut NoContext));
        assert!(p.at_end());

        // A group failure restores the cursor and still emits the close.
        let mut rec = Recorder::default();
        let mut p = pos("( a");
        assert!(!advance_group(&mut p, &mut rec));
        assert_eq!(p.pos(), 0);
        assert!(rec.events.contains(&"end_group(false)".to_owned()));
    }

    #[test]
    fn defined_as_operator() {
        let mut p = pos(" = x");
        assert_eq!(advance_defined_as(&mut p, &mut NoContext), Some(false));
        assert_eq!(p.pos(), 3);

        let mut p = pos("=/ x");
        assert_eq!(advance_defined_as(&mut p, &mut NoContext), Some(true));
        assert_eq!(p.pos(), 3);

        let mut p = pos("x");
        assert_eq!(advance_defined_as(&mut p, &mut NoContext), None);
        assert_eq!(p.pos(), 0);
    }

    #[test]
    fn rule_events() {
        let mut rec = Recorder::default();
        let mut p = pos("wsp = SP / HTAB\n");
        assert!(advance_rule(&mut p, &mut rec));
        assert!(p.at_end());
        assert_eq!(rec.events.first().unwrap(), "begin_rule(wsp, false)");
        assert_eq!(rec.events.last().unwrap(), "end_rule(wsp, true)");
    }

    #[test]
    fn incremental_rule_flag() {
        let mut rec = Recorder::default();
        let mut p = pos("a =/ \"y\"\n");
        assert!(advance_rule(&mut p, &mut rec));
        assert_eq!(rec.events.first().unwrap(), "begin_rule(a, true)");
    }

    #[test]
    fn rulelist_empty_input_succeeds() {
        let mut rec = Recorder::default();
        let mut p = pos("");
        assert!(advance_rulelist(&mut p, &mut rec));
        assert_eq!(rec.events, ["begin_document", "end_document(true)"]);
    }

    #[test]
    fn rulelist_blank_lines_and_comments_only() {
        let mut rec = Recorder::default();
        let mut p = pos("\n; just a comment\n   \n");
        assert!(advance_rulelist(&mut p, &mut rec));
        assert!(p.at_end());
        assert!(rec.events.contains(&"comment( just a comment)".to_owned()));
        assert_eq!(rec.events.last().unwrap(), "end_document(true)");
    }

    #[test]
    fn rulelist_stops_at_garbage() {
        let mut rec = Recorder::default();
        let mut p = pos("123");
        assert!(!advance_rulelist(&mut p, &mut rec));
        assert_eq!(p.pos(), 0);
        assert_eq!(rec.events.last().unwrap(), "end_document(false)");
    }

    #[test]
    fn rule_without_final_newline() {
        let mut rec = Recorder::default();
        let mut p = pos("a = \"x\"");
        assert!(advance_rule(&mut p, &mut rec));
        assert!(p.at_end());
    }

    #[test]
    fn rulelist_tolerates_whitespace_tail() {
        let mut p = pos("a = \"x\"\n   ");
        assert!(advance_rulelist(&mut p, &mut NoContext));
        assert!(p.at_end());
    }

    #[test]
    fn rulelist_event_pairs_balance() {
        let input = "a = 1*( b / c-d ) [\"x\"] <p>\nc-d = %x30-39\n";
        let mut rec = Recorder::default();
        let mut p = pos(input);
        assert!(advance_rulelist(&mut p, &mut rec));
        assert!(p.at_end());

        for name in [
            "document",
            "rule",
            "alternation",
            "concatenation",
            "repetition",
            "group",
            "option",
        ] {
            assert_eq!(rec.begins(name), rec.ends(name), "{name}");
        }
    }
}
