//! Template tokenizer.
//!
//! A template is a JSON skeleton split on whitespace. Most tokens are literal
//! fragments that are copied into every record. A handful of keywords mark
//! generated fields and consume the tokens that follow them:
//!
//! - `int <ratio>`, `float <ratio>`, `bool <ratio>`
//! - `str <ratio> <delimited-pattern>` (e.g. `str 0.5 "[a-z]{3}"`)
//! - `timestamp` (no parameters)
//!
//! Punctuation glued to the end of a ratio, pattern or `timestamp` (`0.5,`,
//! `"[a-z]{3}"}` or `timestamp}`) is split off into a literal that follows
//! the field. A pattern closes at the first delimiter that ends the token or
//! is followed by `,`, `}`, `]` or `:`.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::GenerateError;

pub const TIMESTAMP_KEYWORD: &str = "timestamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Str,
}

impl FieldKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Str => "str",
        }
    }

    fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "int" => Some(FieldKind::Int),
            "float" => Some(FieldKind::Float),
            "bool" => Some(FieldKind::Bool),
            "str" => Some(FieldKind::Str),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A pooled field: its type, NDV ratio, and (for `str`) the regex pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMarker {
    pub kind: FieldKind,
    pub ndv_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Literal(String),
    Field(FieldMarker),
    Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, GenerateError> {
        let words = source.split_whitespace().collect::<Vec<_>>();
        let mut tokens = Vec::with_capacity(words.len());
        let mut idx = 0;

        while idx < words.len() {
            let word = words[idx];
            let position = idx + 1;

            if let Some(rest) = strip_keyword(word, TIMESTAMP_KEYWORD) {
                tokens.push(Token::Timestamp);
                if !rest.is_empty() {
                    tokens.push(Token::Literal(rest.to_string()));
                }
                idx += 1;
                continue;
            }
            let Some(kind) = FieldKind::from_keyword(word) else {
                tokens.push(Token::Literal(word.to_string()));
                idx += 1;
                continue;
            };

            let ratio_word = words.get(idx + 1).ok_or_else(|| {
                GenerateError::parse(position, format!("'{kind}' must be followed by an NDV ratio"))
            })?;
            let (ndv_ratio, mut trailing) = split_ratio(ratio_word).ok_or_else(|| {
                GenerateError::parse(
                    position + 1,
                    format!("expected a numeric NDV ratio after '{kind}', found '{ratio_word}'"),
                )
            })?;
            idx += 2;

            let pattern = if kind == FieldKind::Str {
                if !trailing.is_empty() {
                    return Err(GenerateError::parse(
                        position + 1,
                        format!("unexpected '{trailing}' between the ratio and pattern of 'str'"),
                    ));
                }
                let pattern_word = words.get(idx).ok_or_else(|| {
                    GenerateError::parse(
                        position,
                        "'str' must be followed by an NDV ratio and a delimited pattern",
                    )
                })?;
                let (pattern, rest) = split_pattern(pattern_word).ok_or_else(|| {
                    GenerateError::parse(
                        idx + 1,
                        format!("pattern '{pattern_word}' is missing its closing delimiter"),
                    )
                })?;
                idx += 1;
                trailing = rest;
                Some(pattern.to_string())
            } else {
                None
            };

            tokens.push(Token::Field(FieldMarker {
                kind,
                ndv_ratio,
                pattern,
            }));
            if !trailing.is_empty() {
                tokens.push(Token::Literal(trailing.to_string()));
            }
        }

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Pooled fields in template order. Timestamps are not included.
    pub fn fields(&self) -> impl Iterator<Item = &FieldMarker> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Field(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    pub fn timestamp_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| matches!(token, Token::Timestamp))
            .count()
    }
}

impl FromStr for Template {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

/// Splits `word` into its longest numeric prefix and the remaining text.
fn split_ratio(word: &str) -> Option<(f64, &str)> {
    let numeric_len = word
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'))
        .count();
    (1..=numeric_len)
        .rev()
        .find_map(|cut| word[..cut].parse::<f64>().ok().map(|ratio| (ratio, &word[cut..])))
}

/// Strips the leading delimiter and the first closing occurrence, returning
/// the pattern between them and whatever follows the closing delimiter.
fn split_pattern(word: &str) -> Option<(&str, &str)> {
    let delimiter = word.chars().next()?;
    let body = &word[delimiter.len_utf8()..];
    body.match_indices(delimiter).find_map(|(close, _)| {
        let rest = &body[close + delimiter.len_utf8()..];
        rest.chars()
            .next()
            .is_none_or(is_json_punctuation)
            .then(|| (&body[..close], rest))
    })
}

/// Matches `keyword` alone or followed only by JSON punctuation, returning
/// the punctuation.
fn strip_keyword<'a>(word: &'a str, keyword: &str) -> Option<&'a str> {
    word.strip_prefix(keyword)
        .filter(|rest| rest.chars().all(is_json_punctuation))
}

fn is_json_punctuation(c: char) -> bool {
    matches!(c, ',' | '}' | ']' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Token {
        Token::Literal(text.to_string())
    }

    fn field(kind: FieldKind, ndv_ratio: f64, pattern: Option<&str>) -> Token {
        Token::Field(FieldMarker {
            kind,
            ndv_ratio,
            pattern: pattern.map(str::to_string),
        })
    }

    #[test]
    fn parses_spaced_template_in_order() {
        let template =
            Template::parse(r#"{ "a" : int 0.5 , "b" : str 1 "[a-z]{3}" }"#).expect("parse");
        assert_eq!(
            template.tokens(),
            &[
                literal("{"),
                literal("\"a\""),
                literal(":"),
                field(FieldKind::Int, 0.5, None),
                literal(","),
                literal("\"b\""),
                literal(":"),
                field(FieldKind::Str, 1.0, Some("[a-z]{3}")),
                literal("}"),
            ]
        );
        assert_eq!(template.field_count(), 2);
    }

    #[test]
    fn splits_punctuation_glued_to_ratio_and_pattern() {
        let template =
            Template::parse(r#"{"x": int 1.0, "y": bool 0.5, "z": str 0 "[0-9]+"}"#).expect("parse");
        assert_eq!(
            template.tokens(),
            &[
                literal("{\"x\":"),
                field(FieldKind::Int, 1.0, None),
                literal(","),
                literal("\"y\":"),
                field(FieldKind::Bool, 0.5, None),
                literal(","),
                literal("\"z\":"),
                field(FieldKind::Str, 0.0, Some("[0-9]+")),
                literal("}"),
            ]
        );
    }

    #[test]
    fn timestamp_consumes_no_parameters() {
        let template = Template::parse(r#"{ "ts" : timestamp , "f" : float 0.1 }"#).expect("parse");
        assert_eq!(template.timestamp_count(), 1);
        assert_eq!(template.field_count(), 1);
        assert_eq!(template.tokens()[3], Token::Timestamp);
        assert_eq!(template.tokens()[4], literal(","));
    }

    #[test]
    fn timestamp_splits_glued_punctuation() {
        let template = Template::parse(r#"{"at": timestamp}"#).expect("parse");
        assert_eq!(
            template.tokens(),
            &[literal("{\"at\":"), Token::Timestamp, literal("}")]
        );
        let template = Template::parse(r#"{"at": timestamp, "n": int 0}"#).expect("parse");
        assert_eq!(template.tokens()[1], Token::Timestamp);
        assert_eq!(template.tokens()[2], literal(","));
    }

    #[test]
    fn words_that_only_start_with_timestamp_stay_literal() {
        let template = Template::parse("timestamps timestamp_ms").expect("parse");
        assert_eq!(template.timestamp_count(), 0);
        assert_eq!(template.tokens(), &[literal("timestamps"), literal("timestamp_ms")]);
    }

    #[test]
    fn pattern_closes_before_glued_next_key() {
        let template: Template = r#"{"a": str 1 "[a-z]{3}","b": int 0}"#.parse().expect("parse");
        assert_eq!(
            template.tokens(),
            &[
                literal("{\"a\":"),
                field(FieldKind::Str, 1.0, Some("[a-z]{3}")),
                literal(",\"b\":"),
                field(FieldKind::Int, 0.0, None),
                literal("}"),
            ]
        );
    }

    #[test]
    fn pattern_may_contain_its_delimiter_before_other_text() {
        let template = Template::parse(r#"str 0 "a"b""#).expect("parse");
        assert_eq!(template.tokens(), &[field(FieldKind::Str, 0.0, Some("a\"b"))]);
    }

    #[test]
    fn quoted_keywords_are_literals() {
        let template = Template::parse(r#"{ "int" : "str" }"#).expect("parse");
        assert_eq!(template.field_count(), 0);
        assert_eq!(template.tokens().len(), 5);
    }

    #[test]
    fn pattern_delimiter_is_not_limited_to_quotes() {
        let template = Template::parse("str 0.2 /ab|cd/").expect("parse");
        assert_eq!(template.tokens(), &[field(FieldKind::Str, 0.2, Some("ab|cd"))]);
    }

    #[test]
    fn exponent_ratio_is_accepted() {
        let template = Template::parse("int 1e-3").expect("parse");
        assert_eq!(template.tokens(), &[field(FieldKind::Int, 0.001, None)]);
    }

    #[test]
    fn keyword_without_ratio_is_a_parse_error() {
        let err = Template::parse(r#"{ "a" : int"#).expect_err("missing ratio");
        match err {
            GenerateError::Parse { position, .. } => assert_eq!(position, 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_ratio_is_a_parse_error() {
        let err = Template::parse(r#"{ "a" : bool yes }"#).expect_err("bad ratio");
        assert!(matches!(err, GenerateError::Parse { position: 5, .. }));
        assert!(err.to_string().contains("yes"));
    }

    #[test]
    fn str_without_pattern_is_a_parse_error() {
        let err = Template::parse("str 0.5").expect_err("missing pattern");
        assert!(matches!(err, GenerateError::Parse { .. }));
    }

    #[test]
    fn unterminated_pattern_is_a_parse_error() {
        let err = Template::parse(r#"str 0.5 "[a-z]+"#).expect_err("unterminated");
        assert!(err.to_string().contains("closing delimiter"));
    }

    #[test]
    fn punctuation_between_str_ratio_and_pattern_is_rejected() {
        let err = Template::parse(r#"str 0.5, "[a-z]""#).expect_err("stray comma");
        assert!(matches!(err, GenerateError::Parse { position: 2, .. }));
    }
}
