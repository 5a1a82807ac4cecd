//! Stylesheet parsing for pod CSS files.
//!
//! Tokenizes one stylesheet with `cssparser` and builds a flat rule list.
//! Selectors are kept as raw text so the transform pass can rewrite them;
//! declarations ride through the pipeline untouched.

use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};
use serde::{Deserialize, Serialize};

use crate::validate::CompilerError;

// ═══════════════════════════════════════════════════════════════════════════════
// IR TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a pod stylesheet into a flat rule list.
///
/// Unlike a browser stylesheet parser there is no error recovery here: a rule
/// that does not tokenize as `selector { property: value; }` fails the whole
/// file, and the caller aborts the build.
pub fn parse_stylesheet(source: &str, pod: &str, file: &str) -> Result<Stylesheet, CompilerError> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut rules = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }
        let rule = parse_rule(&mut parser)
            .map_err(|detail| CompilerError::malformed_stylesheet(pod, file, &detail))?;
        rules.push(rule);
    }

    Ok(Stylesheet { rules })
}

fn parse_rule<'i>(parser: &mut Parser<'i, '_>) -> Result<StyleRule, String> {
    let prelude = parser
        .parse_until_before(Delimiter::CurlyBracketBlock, |p| consume_raw(p))
        .map_err(|e: ParseError<'_, ()>| format!("failed to read selector list: {:?}", e))?;

    // One rule can carry several comma-separated selectors; each is rewritten
    // independently later. Inner whitespace is collapsed so combinator parts
    // split cleanly.
    let selectors: Vec<String> = prelude
        .split(',')
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect();
    if selectors.is_empty() {
        return Err("rule with an empty selector list".to_string());
    }

    match parser.next() {
        Ok(Token::CurlyBracketBlock) => {}
        _ => {
            return Err(format!(
                "expected '{{' after selector list: {}",
                prelude.trim()
            ))
        }
    }

    let declarations = parser
        .parse_nested_block(|p| parse_declarations(p))
        .map_err(|e: ParseError<'_, ()>| format!("failed to parse declaration block: {:?}", e))?;

    Ok(StyleRule {
        selectors,
        declarations,
    })
}

fn parse_declarations<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Vec<Declaration>, ParseError<'i, ()>> {
    let mut declarations = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }
        let token = parser.next()?.clone();
        let property = match token {
            Token::Ident(name) => name.to_string(),
            _ => return Err(parser.new_custom_error(())),
        };
        parser.expect_colon()?;
        let value = parser.parse_until_after(Delimiter::Semicolon, |p| consume_raw(p))?;
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(parser.new_custom_error(()));
        }
        declarations.push(Declaration { property, value });
    }
    Ok(declarations)
}

/// Drain the (possibly delimited) parser and return the raw source text it
/// covered. Slicing the original input preserves the author's value text
/// exactly.
fn consume_raw<'i>(parser: &mut Parser<'i, '_>) -> Result<String, ParseError<'i, ()>> {
    let start = parser.position();
    while parser.next_including_whitespace().is_ok() {}
    Ok(parser.slice_from(start).to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERIALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Render a stylesheet back to CSS text. Rules are separated by a blank line;
/// declarations keep their source order.
pub fn serialize_stylesheet(stylesheet: &Stylesheet) -> String {
    let rules: Vec<String> = stylesheet.rules.iter().map(serialize_rule).collect();
    if rules.is_empty() {
        String::new()
    } else {
        format!("{}\n", rules.join("\n\n"))
    }
}

fn serialize_rule(rule: &StyleRule) -> String {
    let mut out = String::new();
    out.push_str(&rule.selectors.join(",\n"));
    out.push_str(" {\n");
    for declaration in &rule.declarations {
        out.push_str(&format!(
            "  {}: {};\n",
            declaration.property, declaration.value
        ));
    }
    out.push('}');
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ERR_MALFORMED_STYLESHEET;

    #[test]
    fn test_parse_single_rule() {
        let sheet = parse_stylesheet(".foo { color: red; }", "pod", "styles.css").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec![".foo"]);
        assert_eq!(sheet.rules[0].declarations.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].property, "color");
        assert_eq!(sheet.rules[0].declarations[0].value, "red");
    }

    #[test]
    fn test_parse_selector_list_and_multi_token_value() {
        let sheet =
            parse_stylesheet(".a, .b {\n  margin: 0 auto;\n}", "pod", "styles.css").unwrap();
        assert_eq!(sheet.rules[0].selectors, vec![".a", ".b"]);
        assert_eq!(sheet.rules[0].declarations[0].value, "0 auto");
    }

    #[test]
    fn test_parse_combinator_selector_collapses_whitespace() {
        let sheet = parse_stylesheet(".foo   >\n.bar { color: red; }", "pod", "styles.css").unwrap();
        assert_eq!(sheet.rules[0].selectors, vec![".foo > .bar"]);
    }

    #[test]
    fn test_parse_missing_trailing_semicolon() {
        let sheet = parse_stylesheet(".foo { color: red }", "pod", "styles.css").unwrap();
        assert_eq!(sheet.rules[0].declarations[0].value, "red");
    }

    #[test]
    fn test_parse_multiple_rules_keep_order() {
        let sheet = parse_stylesheet(
            ".first { color: red; }\n.second { color: blue; }",
            "pod",
            "styles.css",
        )
        .unwrap();
        assert_eq!(sheet.rules[0].selectors, vec![".first"]);
        assert_eq!(sheet.rules[1].selectors, vec![".second"]);
    }

    #[test]
    fn test_parse_empty_stylesheet() {
        let sheet = parse_stylesheet("  \n\n ", "pod", "styles.css").unwrap();
        assert!(sheet.rules.is_empty());
    }

    #[test]
    fn test_parse_rule_without_block_is_malformed() {
        let err = parse_stylesheet(".foo color red", "pod", "styles.css").unwrap_err();
        assert_eq!(err.code, ERR_MALFORMED_STYLESHEET);
        assert_eq!(err.pod, "pod");
        assert_eq!(err.file, "styles.css");
    }

    #[test]
    fn test_parse_block_without_selector_is_malformed() {
        let err = parse_stylesheet("{ color: red; }", "pod", "styles.css").unwrap_err();
        assert_eq!(err.code, ERR_MALFORMED_STYLESHEET);
    }

    #[test]
    fn test_serialize_round_shape() {
        let sheet = parse_stylesheet(".a,.b{margin:0 auto;color:red}", "pod", "styles.css").unwrap();
        assert_eq!(
            serialize_stylesheet(&sheet),
            ".a,\n.b {\n  margin: 0 auto;\n  color: red;\n}\n"
        );
    }

    #[test]
    fn test_serialize_empty_stylesheet_is_empty() {
        let sheet = Stylesheet { rules: vec![] };
        assert_eq!(serialize_stylesheet(&sheet), "");
    }

    #[test]
    fn test_serialize_separates_rules_with_blank_line() {
        let sheet = parse_stylesheet(".a { color: red; } .b { color: blue; }", "pod", "styles.css")
            .unwrap();
        assert_eq!(
            serialize_stylesheet(&sheet),
            ".a {\n  color: red;\n}\n\n.b {\n  color: blue;\n}\n"
        );
    }
}
