//! Tokenizer shared by the WHERE and FROM clause parsers.

use chrono::NaiveDateTime;

use super::compare::CmpOp;
use super::error::ParseError;
use crate::frontmatter::parse_date;

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Field path such as `status` or `file.name`.
    Ident(String),
    Str(String),
    Number(f64),
    Date(NaiveDateTime),
    /// `#tag`, without the hash.
    Tag(String),
    LParen,
    RParen,
    Comma,
    Bang,
    Cmp(CmpOp),
    And,
    Or,
    Not,
    True,
    False,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("'{s}'"),
            TokenKind::Str(s) => format!("\"{s}\""),
            TokenKind::Number(n) => format!("{n}"),
            TokenKind::Date(d) => format!("{d}"),
            TokenKind::Tag(t) => format!("#{t}"),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Bang => "'!'".into(),
            TokenKind::Cmp(op) => format!("'{}'", op.as_str()),
            TokenKind::And => "AND".into(),
            TokenKind::Or => "OR".into(),
            TokenKind::Not => "NOT".into(),
            TokenKind::True => "true".into(),
            TokenKind::False => "false".into(),
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let single = |kind| Token { kind, position };
        let kind = match ch {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            ',' => {
                chars.next();
                TokenKind::Comma
            }
            '"' | '\'' => {
                chars.next();
                TokenKind::Str(consume_string(&mut chars, ch, position)?)
            }
            '#' => {
                chars.next();
                let tag = consume_while(&mut chars, |c| {
                    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
                });
                if tag.is_empty() {
                    return Err(ParseError::new("expected tag name after '#'", position));
                }
                TokenKind::Tag(tag)
            }
            '=' | '!' | '<' | '>' | '&' | '|' => consume_operator(&mut chars, position)?,
            c if c.is_ascii_digit() || (c == '-' && next_is_digit(input, position)) => {
                let literal = consume_while(&mut chars, |c| {
                    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '+')
                });
                literal_token(&literal, position)?
            }
            c if c.is_alphabetic() || c == '_' => {
                let word = consume_while(&mut chars, |c| {
                    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
                });
                keyword_or_ident(word)
            }
            other => {
                return Err(ParseError::new(format!("unexpected character '{other}'"), position));
            }
        };
        tokens.push(single(kind));
    }

    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn consume_while(chars: &mut Chars<'_>, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !keep(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn consume_string(chars: &mut Chars<'_>, quote: char, start: usize) -> Result<String, ParseError> {
    let mut out = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            c if c == quote => return Ok(out),
            c => out.push(c),
        }
    }
    Err(ParseError::new("unterminated string literal", start))
}

fn consume_operator(chars: &mut Chars<'_>, position: usize) -> Result<TokenKind, ParseError> {
    let Some((_, first)) = chars.next() else {
        return Err(ParseError::new("expected operator", position));
    };
    let second = chars.peek().map(|&(_, c)| c);

    let (kind, two_chars) = match (first, second) {
        ('=', Some('=')) => (TokenKind::Cmp(CmpOp::Eq), true),
        ('=', _) => (TokenKind::Cmp(CmpOp::Eq), false),
        ('!', Some('=')) => (TokenKind::Cmp(CmpOp::Ne), true),
        ('!', _) => (TokenKind::Bang, false),
        ('<', Some('=')) => (TokenKind::Cmp(CmpOp::Le), true),
        ('<', Some('>')) => (TokenKind::Cmp(CmpOp::Ne), true),
        ('<', _) => (TokenKind::Cmp(CmpOp::Lt), false),
        ('>', Some('=')) => (TokenKind::Cmp(CmpOp::Ge), true),
        ('>', _) => (TokenKind::Cmp(CmpOp::Gt), false),
        ('&', Some('&')) => (TokenKind::And, true),
        ('|', Some('|')) => (TokenKind::Or, true),
        (c, _) => {
            return Err(ParseError::new(format!("unexpected character '{c}'"), position));
        }
    };
    if two_chars {
        chars.next();
    }
    Ok(kind)
}

fn next_is_digit(input: &str, position: usize) -> bool {
    input[position + 1..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn literal_token(literal: &str, position: usize) -> Result<TokenKind, ParseError> {
    if let Some(date) = parse_date(literal) {
        return Ok(TokenKind::Date(date));
    }
    literal
        .parse::<f64>()
        .map(TokenKind::Number)
        .map_err(|_| ParseError::new(format!("invalid number '{literal}'"), position))
}

fn keyword_or_ident(word: String) -> TokenKind {
    match word.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Ident(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_comparison() {
        assert_eq!(
            kinds("priority >= 3"),
            vec![
                TokenKind::Ident("priority".into()),
                TokenKind::Cmp(CmpOp::Ge),
                TokenKind::Number(3.0)
            ]
        );
    }

    #[test]
    fn tokenizes_without_spaces() {
        assert_eq!(
            kinds("a!=\"x\"&&!b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Cmp(CmpOp::Ne),
                TokenKind::Str("x".into()),
                TokenKind::And,
                TokenKind::Bang,
                TokenKind::Ident("b".into()),
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("a AND b or NOT c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::And,
                TokenKind::Ident("b".into()),
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn bare_dates_and_negative_numbers() {
        let tokens = kinds("due < 2024-03-01 and delta > -2.5");
        assert!(matches!(tokens[2], TokenKind::Date(_)));
        assert_eq!(tokens[6], TokenKind::Number(-2.5));
    }

    #[test]
    fn strings_support_escapes_and_single_quotes() {
        assert_eq!(kinds(r#""a \"b\"""#), vec![TokenKind::Str("a \"b\"".into())]);
        assert_eq!(kinds("'it'"), vec![TokenKind::Str("it".into())]);
    }

    #[test]
    fn tags_and_paths() {
        assert_eq!(
            kinds("#project/alpha file.name"),
            vec![TokenKind::Tag("project/alpha".into()), TokenKind::Ident("file.name".into())]
        );
    }

    #[test]
    fn errors_carry_positions() {
        let err = tokenize("a = \"open").unwrap_err();
        assert_eq!(err.position, 4);
        let err = tokenize("a ~ b").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(tokenize("x = 12abc").is_err());
    }
}
