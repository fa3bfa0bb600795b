//! Splits ABNF source into tokens.
//!
//! Whitespace, comments and line breaks are kept as tokens because ABNF
//! gives them meaning: a rule ends at a line break that is not followed by
//! indentation. Line breaks may be CRLF or a bare LF.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char, digit1, one_of, satisfy},
    combinator::{cut, opt, recognize, value},
    sequence::{pair, preceded, tuple},
    IResult,
};
use parsegen::{Input, Location};

use crate::error::LexError;

type Res<'s, U> = IResult<&'s str, U>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    RuleName,
    Number,
    Star,
    Equals,
    /// `=/`
    Incremental,
    Slash,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    CharVal,
    NumVal,
    ProseVal,
    Comment,
    Newline,
    /// A line break followed by indentation, which continues the current
    /// rule.
    Continuation,
    Whitespace,
    Unknown,
}

impl TokenKind {
    /// How the kind is named in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::RuleName => "rulename",
            TokenKind::Number => "number",
            TokenKind::Star => "\"*\"",
            TokenKind::Equals => "\"=\"",
            TokenKind::Incremental => "\"=/\"",
            TokenKind::Slash => "\"/\"",
            TokenKind::OpenParen => "\"(\"",
            TokenKind::CloseParen => "\")\"",
            TokenKind::OpenBracket => "\"[\"",
            TokenKind::CloseBracket => "\"]\"",
            TokenKind::CharVal => "quoted string",
            TokenKind::NumVal => "numeric value",
            TokenKind::ProseVal => "prose value",
            TokenKind::Comment => "comment",
            TokenKind::Newline => "newline",
            TokenKind::Continuation => "continuation line",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Unknown => "unknown character",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    /// Source text of the token. Empty for the newline synthesized at the
    /// end of a source that lacks one.
    pub text: &'s str,
    pub location: Location,
}

impl<'s> Token<'s> {
    /// The token as it should appear in a "found ..." message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline
            | TokenKind::Continuation
            | TokenKind::Whitespace
            | TokenKind::Comment => {
                self.kind.describe().to_owned()
            }
            _ => format!("`{}`", self.text),
        }
    }
}

fn line_break(input: &str) -> Res<&str> {
    alt((tag("\r\n"), tag("\n")))(input)
}

fn is_wsp(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn rulename(input: &str) -> Res<&str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '-'),
    ))(input)
}

fn not_line_end(c: char) -> bool {
    c != '\r' && c != '\n'
}

/// `"..."` with an optional `%s` or `%i` prefix.
fn char_val(input: &str) -> Res<&str> {
    recognize(tuple((
        opt(preceded(char('%'), one_of("sSiI"))),
        char('"'),
        cut(pair(take_while(|c: char| c != '"' && not_line_end(c)), char('"'))),
    )))(input)
}

/// The digits are validated by the parser, which knows the radix.
fn num_val(input: &str) -> Res<&str> {
    recognize(tuple((
        char('%'),
        one_of("bdxBDX"),
        take_while(|c: char| c.is_ascii_hexdigit() || c == '.' || c == '-'),
    )))(input)
}

fn prose_val(input: &str) -> Res<&str> {
    recognize(pair(
        char('<'),
        cut(pair(take_while(|c: char| c != '>' && not_line_end(c)), char('>'))),
    ))(input)
}

fn comment(input: &str) -> Res<&str> {
    recognize(pair(char(';'), take_while(not_line_end)))(input)
}

fn token(input: &str) -> Res<TokenKind> {
    alt((
        value(
            TokenKind::Continuation,
            recognize(pair(line_break, take_while1(is_wsp))),
        ),
        value(TokenKind::Newline, line_break),
        value(TokenKind::Whitespace, take_while1(is_wsp)),
        value(TokenKind::Comment, comment),
        value(TokenKind::RuleName, rulename),
        value(TokenKind::Number, digit1),
        value(TokenKind::CharVal, char_val),
        value(TokenKind::NumVal, num_val),
        value(TokenKind::ProseVal, prose_val),
        value(TokenKind::Incremental, tag("=/")),
        value(TokenKind::Equals, char('=')),
        value(TokenKind::Star, char('*')),
        value(TokenKind::Slash, char('/')),
        value(TokenKind::OpenParen, char('(')),
        value(TokenKind::CloseParen, char(')')),
        value(TokenKind::OpenBracket, char('[')),
        value(TokenKind::CloseBracket, char(']')),
        value(TokenKind::Unknown, anychar),
    ))(input)
}

/// A lazy token stream. Cloning the lexer restarts from the clone's
/// position.
#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    source: &'s str,
    location: Location,
    last: Option<TokenKind>,
    done: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Lexer {
            source,
            location: Location {
                offset: 0,
                line: 1,
                column: 1,
            },
            last: None,
            done: false,
        }
    }

    /// Current location in the source.
    pub fn location(&self) -> Location {
        self.location
    }

    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.location.line += 1;
                self.location.column = 1;
            } else {
                self.location.column += 1;
            }
        }
        self.location.offset += text.len();
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Token<'s>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rest = &self.source[self.location.offset..];
        if rest.is_empty() {
            self.done = true;
            return match self.last {
                Some(kind) if kind != TokenKind::Newline => Some(Ok(Token {
                    kind: TokenKind::Newline,
                    text: "",
                    location: self.location,
                })),
                _ => None,
            };
        }

        match token(rest) {
            Ok((remaining, kind)) => {
                let text = &rest[..rest.len() - remaining.len()];
                let token = Token {
                    kind,
                    text,
                    location: self.location,
                };
                self.advance(text);
                self.last = Some(kind);
                Some(Ok(token))
            }
            Err(_) => {
                self.done = true;
                let location = self.location;
                let err = if rest.starts_with('<') {
                    LexError::UnterminatedProse { location }
                } else {
                    LexError::UnterminatedString { location }
                };
                Some(Err(err))
            }
        }
    }
}

/// A fully lexed source, usable as parser input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'s> {
    tokens: Vec<Token<'s>>,
    end: Location,
}

impl<'s> Tokens<'s> {
    pub fn get(&self, idx: usize) -> Option<&Token<'s>> {
        self.tokens.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token<'s>> {
        self.tokens.iter()
    }

    /// Location just past the last token.
    pub fn end(&self) -> Location {
        self.end
    }
}

impl<'s> Input for Tokens<'s> {
    type Unit = Token<'s>;

    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn unit_at(&self, idx: usize) -> Option<Token<'s>> {
        self.tokens.get(idx).copied()
    }
}

pub fn tokenize(source: &str) -> Result<Tokens<'_>, LexError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.by_ref().collect::<Result<Vec<_>, _>>()?;
    Ok(Tokens {
        tokens,
        end: lexer.location(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn lex_rule() {
        use TokenKind::*;
        let tests = vec![
            ("a = b\r\n", vec![RuleName, Whitespace, Equals, Whitespace, RuleName, Newline]),
            ("a =/ b\n", vec![RuleName, Whitespace, Incremental, Whitespace, RuleName, Newline]),
            ("x=2*3DIGIT", vec![RuleName, Equals, Number, Star, Number, RuleName, Newline]),
            (
                "r = %x30-39 / %s\"Ab\" ; digits\n",
                vec![
                    RuleName, Whitespace, Equals, Whitespace, NumVal, Whitespace, Slash,
                    Whitespace, CharVal, Whitespace, Comment, Newline,
                ],
            ),
            ("r = [ <any> ] (c)", vec![
                RuleName, Whitespace, Equals, Whitespace, OpenBracket, Whitespace, ProseVal,
                Whitespace, CloseBracket, Whitespace, OpenParen, RuleName, CloseParen, Newline,
            ]),
            ("", vec![]),
            ("\n", vec![Newline]),
            ("a = @", vec![RuleName, Whitespace, Equals, Whitespace, Unknown, Newline]),
            ("a = b\r\n  / c\n", vec![
                RuleName, Whitespace, Equals, Whitespace, RuleName, Continuation, Slash,
                Whitespace, RuleName, Newline,
            ]),
            ("a = b\n\t", vec![
                RuleName, Whitespace, Equals, Whitespace, RuleName, Continuation, Newline,
            ]),
        ];
        for (source, expected) in tests {
            assert_eq!(kinds(source), expected, "source: {:?}", source);
        }
    }

    #[test]
    fn token_text_and_location() {
        let tokens = tokenize("a = \"x\"\r\nrule-2 = %d13.10").unwrap();
        let rule2 = tokens.get(6).unwrap();
        assert_eq!(rule2.kind, TokenKind::RuleName);
        assert_eq!(rule2.text, "rule-2");
        assert_eq!(rule2.location.line, 2);
        assert_eq!(rule2.location.column, 1);
        assert_eq!(rule2.location.offset, 9);

        let num = tokens.get(10).unwrap();
        assert_eq!(num.text, "%d13.10");
        assert_eq!(num.location.column, 10);

        let last = tokens.get(11).unwrap();
        assert_eq!(last.kind, TokenKind::Newline);
        assert_eq!(last.text, "");
        assert_eq!(tokens.end().offset, 25);
    }

    #[test]
    fn unterminated_values() {
        let err = tokenize("a = \"abc\n").unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedString {
                location: Location {
                    offset: 4,
                    line: 1,
                    column: 5
                }
            }
        );
        let err = tokenize("a = b\nc = <abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedProse { .. }));
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn lexer_is_restartable() {
        let mut lexer = Lexer::new("a = b");
        lexer.next();
        let saved = lexer.clone();
        let rest: Vec<_> = lexer.map(|t| t.unwrap().text).collect();
        let again: Vec<_> = saved.map(|t| t.unwrap().text).collect();
        assert_eq!(rest, again);
        assert_eq!(rest, vec![" ", "=", " ", "b", ""]);
    }
}
