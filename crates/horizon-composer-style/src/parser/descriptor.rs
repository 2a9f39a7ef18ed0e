//! Parsing edited CSS text into rule descriptors.
//!
//! A [`RuleDescriptor`] is the parsed form of one rule extracted from the
//! edit buffer: selector list, optional pseudo-state suffix, optional
//! at-rule identity, and the raw declaration text. Descriptors live only
//! for the duration of one apply.
//!
//! Parse errors in individual blocks do not fail the whole parse: the bad
//! block is logged via `tracing::warn!` and skipped, and parsing continues
//! with the remaining blocks.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, ToCss, Token};

use crate::parser::scanner::split_blocks;
use crate::rules::{AtRule, normalize_declarations};
use crate::{Error, Result};

const TARGET: &str = "horizon_composer_style::parser";

/// The parsed representation of one CSS rule extracted from edited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDescriptor {
    /// Selector strings, pseudo-state suffix stripped, in source order.
    /// Empty for a single combined at-rule.
    pub selectors: Vec<String>,
    /// Pseudo-state suffix shared by the selector group, without its
    /// leading colon.
    pub state: Option<String>,
    /// Wrapping at-rule identity, if the rule sat inside one.
    pub at_rule: Option<AtRule>,
    /// Whether the source block was a single combined at-rule with no
    /// inner selector blocks.
    pub single_at_rule: bool,
    /// Normalized declaration text.
    pub declarations: String,
}

/// Result of parsing a full edit buffer.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Successfully parsed descriptors, in source order.
    pub descriptors: Vec<RuleDescriptor>,
    /// Number of top-level blocks skipped as malformed.
    pub skipped: usize,
}

/// Parse edited CSS text into descriptors with per-block error recovery.
pub fn parse_css(css: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    for block in split_blocks(css) {
        if !block.complete {
            tracing::warn!(target: TARGET, "{}", Error::unterminated(&block.text));
            outcome.skipped += 1;
            continue;
        }
        match parse_block(&block.text) {
            Ok(mut descriptors) => outcome.descriptors.append(&mut descriptors),
            Err(e) => {
                tracing::warn!(target: TARGET, "skipping malformed block: {e}");
                outcome.skipped += 1;
            }
        }
    }
    outcome
}

/// Parse one complete brace-balanced block.
///
/// A plain block yields one descriptor. An at-rule block yields one
/// descriptor per inner rule (each carrying the at-rule identity), or a
/// single combined descriptor when the body holds declarations directly.
pub fn parse_block(raw: &str) -> Result<Vec<RuleDescriptor>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('@') {
        parse_at_block(trimmed)
    } else {
        parse_plain_block(trimmed).map(|d| vec![d])
    }
}

fn parse_plain_block(block: &str) -> Result<RuleDescriptor> {
    let (prelude, body) = split_braces(block)?;
    let (selectors, state) = parse_selector_list(prelude)?;
    Ok(RuleDescriptor {
        selectors,
        state,
        at_rule: None,
        single_at_rule: false,
        declarations: normalize_declarations(body),
    })
}

fn parse_at_block(block: &str) -> Result<Vec<RuleDescriptor>> {
    let (prelude, body) = split_braces(block)?;
    let after_at = &prelude.trim()[1..];
    let name_end = after_at
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(after_at.len());
    let name = &after_at[..name_end];
    if name.is_empty() {
        return Err(Error::parse("at-rule with empty name"));
    }
    let at_rule = AtRule::new(name, &after_at[name_end..]);

    if !body.contains('{') {
        // Single combined at-rule (e.g. @font-face): body is declarations.
        return Ok(vec![RuleDescriptor {
            selectors: vec![],
            state: None,
            at_rule: Some(at_rule),
            single_at_rule: true,
            declarations: normalize_declarations(body),
        }]);
    }

    let mut descriptors = vec![];
    for inner in split_blocks(body) {
        if !inner.complete {
            tracing::warn!(target: TARGET, "{}", Error::unterminated(&inner.text));
            continue;
        }
        if inner.text.trim_start().starts_with('@') {
            // One level of at-rule nesting is the supported dialect.
            tracing::warn!(target: TARGET, "skipping nested at-rule inside @{}", at_rule.name);
            continue;
        }
        match parse_plain_block(inner.text.trim()) {
            Ok(mut descriptor) => {
                descriptor.at_rule = Some(at_rule.clone());
                descriptors.push(descriptor);
            }
            Err(e) => tracing::warn!(target: TARGET, "skipping inner block of @{}: {e}", at_rule.name),
        }
    }
    if descriptors.is_empty() {
        return Err(Error::parse(format!("@{} block with no parsable rules", at_rule.name)));
    }
    Ok(descriptors)
}

/// Split a balanced block into (prelude, body-between-outer-braces).
fn split_braces(block: &str) -> Result<(&str, &str)> {
    let open = block
        .find('{')
        .ok_or_else(|| Error::parse("rule block without '{'"))?;
    let close = block
        .rfind('}')
        .ok_or_else(|| Error::parse("rule block without '}'"))?;
    if close <= open {
        return Err(Error::parse("mismatched braces in rule block"));
    }
    Ok((&block[..open], &block[open + 1..close]))
}

/// Parse a selector prelude into its comma-separated selector list and the
/// shared pseudo-state suffix.
///
/// The prelude is tokenized with `cssparser` and the selector text is
/// rebuilt from tokens, which normalizes incidental whitespace and keeps
/// quoted strings and functional arguments intact.
fn parse_selector_list(prelude: &str) -> Result<(Vec<String>, Option<String>)> {
    let mut input = ParserInput::new(prelude);
    let mut parser = Parser::new(&mut input);
    let mut raw_selectors: Vec<String> = vec![];
    let mut current = String::new();
    let mut pending_space = false;

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) => {
                if !current.is_empty() {
                    pending_space = true;
                }
            }
            Token::Comma => {
                flush_selector(&mut current, &mut raw_selectors);
                pending_space = false;
            }
            Token::CurlyBracketBlock => {
                return Err(Error::invalid_selector(prelude.trim(), "unexpected '{'"));
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                push_space(&mut current, &mut pending_space);
                let closer = match token {
                    Token::SquareBracketBlock => ']',
                    _ => ')',
                };
                token
                    .to_css(&mut current)
                    .map_err(|_| Error::invalid_selector(prelude.trim(), "unwritable token"))?;
                let nested = parser
                    .parse_nested_block(collect_nested_text)
                    .map_err(|_| Error::invalid_selector(prelude.trim(), "bad functional argument"))?;
                current.push_str(&nested);
                current.push(closer);
            }
            ref t => {
                push_space(&mut current, &mut pending_space);
                t.to_css(&mut current)
                    .map_err(|_| Error::invalid_selector(prelude.trim(), "unwritable token"))?;
            }
        }
    }
    flush_selector(&mut current, &mut raw_selectors);

    if raw_selectors.is_empty() {
        return Err(Error::invalid_selector(prelude.trim(), "empty selector"));
    }

    let mut selectors = vec![];
    let mut state = None;
    for selector in raw_selectors {
        let (base, suffix) = split_state(&selector);
        if state.is_none() {
            state = suffix;
        }
        selectors.push(base);
    }
    Ok((selectors, state))
}

fn push_space(current: &mut String, pending: &mut bool) {
    if *pending && !current.is_empty() {
        current.push(' ');
    }
    *pending = false;
}

fn flush_selector(current: &mut String, selectors: &mut Vec<String>) {
    let selector = std::mem::take(current);
    let selector = selector.trim();
    if !selector.is_empty() {
        selectors.push(selector.to_string());
    }
}

fn collect_nested_text<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<String, CssParseError<'i, ()>> {
    let mut out = String::new();
    collect_block_text(parser, &mut out)?;
    Ok(out)
}

/// Rebuild the raw text of a nested block (functional arguments,
/// attribute selectors), recursing into further nesting.
fn collect_block_text<'i>(
    parser: &mut Parser<'i, '_>,
    out: &mut String,
) -> std::result::Result<(), CssParseError<'i, ()>> {
    loop {
        let token = match parser.next_including_whitespace() {
            Ok(t) => t.clone(),
            Err(_) => return Ok(()),
        };
        match token {
            Token::WhiteSpace(_) => out.push(' '),
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                let closer = match token {
                    Token::SquareBracketBlock => ']',
                    _ => ')',
                };
                token
                    .to_css(out)
                    .map_err(|_| parser.new_custom_error::<(), ()>(()))?;
                parser.parse_nested_block(|p| collect_block_text(p, out))?;
                out.push(closer);
            }
            ref t => {
                t.to_css(out)
                    .map_err(|_| parser.new_custom_error::<(), ()>(()))?;
            }
        }
    }
}

/// Split a single selector into its base and trailing pseudo-state suffix.
///
/// The suffix is the text after the first top-level colon of the final
/// compound; a pseudo-element's second colon stays inside the suffix, so
/// `.x::before` splits into (`.x`, `:before`). A compound that is nothing
/// but a pseudo (`:hover`) is left whole.
fn split_state(selector: &str) -> (String, Option<String>) {
    let mut depth = 0i32;
    let mut compound_start = 0;
    let mut colon = None;
    for (i, ch) in selector.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ' ' | '>' | '+' | '~' if depth == 0 => {
                compound_start = i + ch.len_utf8();
                colon = None;
            }
            ':' if depth == 0 && colon.is_none() => colon = Some(i),
            _ => {}
        }
    }
    match colon {
        Some(i) if i > compound_start => {
            let base = selector[..i].trim_end();
            let state = &selector[i + 1..];
            if base.is_empty() || state.is_empty() {
                (selector.to_string(), None)
            } else {
                (base.to_string(), Some(state.to_string()))
            }
        }
        _ => (selector.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_block() {
        let descriptors = parse_block("#hero { color: red; }").unwrap();
        assert_eq!(descriptors.len(), 1);
        let d = &descriptors[0];
        assert_eq!(d.selectors, vec!["#hero"]);
        assert_eq!(d.state, None);
        assert!(d.at_rule.is_none());
        assert_eq!(d.declarations, "color: red;");
    }

    #[test]
    fn grouped_selectors_share_state() {
        let descriptors = parse_block(".a:hover, .b:hover { color: red; }").unwrap();
        let d = &descriptors[0];
        assert_eq!(d.selectors, vec![".a", ".b"]);
        assert_eq!(d.state.as_deref(), Some("hover"));
    }

    #[test]
    fn pseudo_element_keeps_second_colon() {
        let descriptors = parse_block(".x::before { content: \"→\"; }").unwrap();
        let d = &descriptors[0];
        assert_eq!(d.selectors, vec![".x"]);
        assert_eq!(d.state.as_deref(), Some(":before"));
    }

    #[test]
    fn functional_pseudo_state() {
        let descriptors = parse_block("li:nth-child(2) { color: red; }").unwrap();
        let d = &descriptors[0];
        assert_eq!(d.selectors, vec!["li"]);
        assert_eq!(d.state.as_deref(), Some("nth-child(2)"));
    }

    #[test]
    fn descendant_selector_state_is_on_last_compound() {
        let descriptors = parse_block(".nav .item:hover { color: red; }").unwrap();
        let d = &descriptors[0];
        assert_eq!(d.selectors, vec![".nav .item"]);
        assert_eq!(d.state.as_deref(), Some("hover"));
    }

    #[test]
    fn media_block_yields_inner_descriptors() {
        let css = "@media (max-width: 600px) { #hero { color: blue; } .card { margin: 0; } }";
        let descriptors = parse_block(css).unwrap();
        assert_eq!(descriptors.len(), 2);
        for d in &descriptors {
            let at = d.at_rule.as_ref().unwrap();
            assert_eq!(at.name, "media");
            assert_eq!(at.params, "(max-width: 600px)");
            assert!(!d.single_at_rule);
        }
        assert_eq!(descriptors[0].selectors, vec!["#hero"]);
        assert_eq!(descriptors[1].selectors, vec![".card"]);
    }

    #[test]
    fn font_face_is_single_at_rule() {
        let descriptors = parse_block("@font-face { font-family: Inter; src: url(inter.woff2); }")
            .unwrap();
        assert_eq!(descriptors.len(), 1);
        let d = &descriptors[0];
        assert!(d.single_at_rule);
        assert!(d.selectors.is_empty());
        assert_eq!(d.at_rule.as_ref().unwrap().name, "font-face");
    }

    #[test]
    fn malformed_blocks_are_skipped_not_fatal() {
        let outcome = parse_css(".a{color:red}\n.b{color:");
        assert_eq!(outcome.descriptors.len(), 1);
        assert_eq!(outcome.descriptors[0].selectors, vec![".a"]);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn braceless_at_rule_is_skipped() {
        let outcome = parse_css("@import url(theme.css);\n.a { color: red; }");
        assert_eq!(outcome.descriptors.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn empty_input_parses_to_nothing() {
        let outcome = parse_css("   ");
        assert!(outcome.descriptors.is_empty());
        assert_eq!(outcome.skipped, 0);
    }
}
