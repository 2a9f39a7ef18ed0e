//! Brace-delimited block scanner.
//!
//! Splits edited CSS text into top-level rule blocks. The scanner tracks
//! brace depth and quote state explicitly, so an at-rule block (which needs
//! two closing braces) is a single block by construction, and the repair of
//! a block cut off before its trailing closing braces falls out of the
//! depth counter instead of post-hoc string patching.

/// One top-level block of CSS text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// The block text, selector prelude included. Repaired blocks have the
    /// missing closing braces appended.
    pub text: String,
    /// Whether the block closed (or could be repaired). Incomplete blocks
    /// are skipped by callers, failing that block only.
    pub complete: bool,
}

/// Split CSS text into top-level brace-delimited blocks.
///
/// A block runs from the first non-whitespace character to the brace that
/// returns the depth to zero. Braces inside quoted strings do not count.
/// At end of input with unbalanced braces, the remnant is repaired by
/// appending the missing closing braces, but only when its last
/// non-whitespace character is already `}` (nothing but trailing closers
/// missing, the at-rule case). A remnant cut off mid-declaration stays
/// incomplete.
pub fn split_blocks(css: &str) -> Vec<RawBlock> {
    let mut blocks = vec![];
    let mut depth = 0usize;
    let mut seen_brace = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start: Option<usize> = None;

    for (i, ch) in css.char_indices() {
        if start.is_none() {
            if ch.is_whitespace() {
                continue;
            }
            start = Some(i);
        }

        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            ';' if depth == 0 => {
                // Top-level statement terminator (e.g. `@import …;`): end
                // the block here so it cannot swallow the following rule.
                // The statement itself fails descriptor parsing (braceless)
                // and is skipped there.
                if let Some(begin) = start.take() {
                    blocks.push(RawBlock {
                        text: css[begin..=i].to_string(),
                        complete: true,
                    });
                }
            }
            '{' => {
                depth += 1;
                seen_brace = true;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && seen_brace {
                    let begin = start.take().unwrap_or(i);
                    blocks.push(RawBlock {
                        text: css[begin..=i].to_string(),
                        complete: true,
                    });
                    seen_brace = false;
                }
            }
            _ => {}
        }
    }

    if let Some(begin) = start {
        let remnant = css[begin..].trim_end();
        if !remnant.is_empty() {
            let ends_closed = remnant.ends_with('}');
            if depth > 0 && ends_closed {
                // Only trailing closers are missing; repair.
                let mut text = remnant.to_string();
                text.extend(std::iter::repeat_n('}', depth));
                blocks.push(RawBlock {
                    text,
                    complete: true,
                });
            } else {
                blocks.push(RawBlock {
                    text: remnant.to_string(),
                    complete: false,
                });
            }
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(css: &str) -> Vec<(String, bool)> {
        split_blocks(css)
            .into_iter()
            .map(|b| (b.text, b.complete))
            .collect()
    }

    #[test]
    fn splits_plain_blocks() {
        let blocks = texts(".a { color: red; }\n.b { color: blue; }");
        assert_eq!(
            blocks,
            vec![
                (".a { color: red; }".to_string(), true),
                (".b { color: blue; }".to_string(), true),
            ]
        );
    }

    #[test]
    fn at_rule_is_one_block() {
        let css = "@media (max-width: 600px) {\n  #hero { color: blue; }\n}\n.card { color: red; }";
        let blocks = texts(css);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].0.starts_with("@media"));
        assert!(blocks[0].0.ends_with('}'));
        assert!(blocks[1].0.starts_with(".card"));
    }

    #[test]
    fn unterminated_declaration_is_incomplete() {
        let blocks = texts(".a{color:red}\n.b{color:");
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].1);
        assert!(!blocks[1].1);
        assert_eq!(blocks[1].0, ".b{color:");
    }

    #[test]
    fn at_rule_missing_trailing_brace_is_repaired() {
        let blocks = texts("@media (max-width: 600px) { #hero { color: blue; }");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].1);
        assert!(blocks[0].0.ends_with("}}") || blocks[0].0.ends_with("}\n}"));
    }

    #[test]
    fn braces_in_strings_do_not_count() {
        let blocks = texts(".a { content: \"}\"; color: red; }");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].1);
    }

    #[test]
    fn trailing_junk_is_incomplete() {
        let blocks = texts(".a { color: red; }\nstray");
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[1].1);
    }

    #[test]
    fn top_level_statement_does_not_swallow_next_rule() {
        let blocks = texts("@import url(theme.css);\n.a { color: red; }");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].0, "@import url(theme.css);");
        assert!(blocks[0].1);
        assert_eq!(blocks[1].0, ".a { color: red; }");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split_blocks("").is_empty());
        assert!(split_blocks("   \n  ").is_empty());
    }
}
