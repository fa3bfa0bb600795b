//! Recursive descent parser for the ABNF self-grammar (RFC 5234 section 4).
//!
//! The parser runs on the same ordered-choice engine that compiled grammars
//! use, with tokens as the input units. Choices are ordered so that no
//! alternative is a prefix of an earlier one.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, one_of},
    combinator::{all_consuming, map, map_res, opt},
    multi::many1,
    sequence::preceded,
    IResult,
};
use parsegen::{Case, Expected, Failure, Parsed, State};
use tracing::debug;

use crate::ast::{
    Alternation, CharVal, Concatenation, DefinedAs, Element, GrammarDocument, NumVal, NumValue,
    Radix, Repeat, Repetition, RuleDefinition, RuleName,
};
use crate::error::{CompileError, ParseError};
use crate::lexer::{tokenize, Token, TokenKind, Tokens};

type St<'a, 's> = State<'a, Tokens<'s>>;
type Res<'a, 's, T> = Parsed<'a, Tokens<'s>, T>;

/// Parse ABNF source into its rule definitions.
pub fn parse(source: &str) -> Result<GrammarDocument, CompileError> {
    let tokens = tokenize(source)?;
    debug!(tokens = tokens.iter().count(), "lexed grammar");

    let (state, rules) =
        rulelist(State::new(&tokens)).map_err(|s| error(&tokens, s.into_failure()))?;
    let (_, ()) = state
        .match_end()
        .map_err(|s| error(&tokens, s.into_failure()))?;

    debug!(definitions = rules.len(), "parsed grammar");
    Ok(GrammarDocument { rules })
}

fn error(tokens: &Tokens<'_>, failure: Failure) -> CompileError {
    let (location, found) = match tokens.get(failure.position) {
        Some(token) if !token.text.is_empty() => (token.location, token.describe()),
        Some(token) => (token.location, "end of input".to_owned()),
        None => (tokens.end(), "end of input".to_owned()),
    };
    ParseError {
        location,
        expected: failure.expected.iter().map(ToString::to_string).collect(),
        found,
    }
    .into()
}

fn token<'a, 's>(state: St<'a, 's>, kind: TokenKind) -> Res<'a, 's, Token<'s>> {
    state.match_unit(Expected::named(kind.describe()), |token| {
        if token.kind == kind {
            Some(token)
        } else {
            None
        }
    })
}

/// `rulelist = 1*( rule / (*c-wsp c-nl) )`
fn rulelist<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Vec<RuleDefinition>> {
    let (state, items) = state.match_repetition(1, None, |s| {
        s.match_choice(&[
            &|s| rule(s).map(|(s, rule)| (s, Some(rule))),
            &|s| {
                s.match_sequence(|s| {
                    let (s, _) = many_c_wsp(s)?;
                    let (s, _) = c_nl(s)?;
                    Ok((s, None))
                })
            },
        ])
    })?;
    Ok((state, items.into_iter().flatten().collect()))
}

/// `rule = rulename defined-as elements c-nl`
fn rule<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, RuleDefinition> {
    state.match_sequence(|s| {
        let (s, name) = token(s, TokenKind::RuleName)?;
        let (s, mode) = defined_as(s)?;
        let (s, body) = elements(s)?;
        let (s, _) = c_nl(s)?;
        let rule = RuleDefinition {
            name: RuleName(name.text.to_owned()),
            mode,
            body,
            location: name.location,
        };
        Ok((s, rule))
    })
}

/// `defined-as = *c-wsp ("=" / "=/") *c-wsp`
fn defined_as<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, DefinedAs> {
    state.match_sequence(|s| {
        let (s, _) = many_c_wsp(s)?;
        let (s, mode) = s.match_choice(&[
            &|s| token(s, TokenKind::Incremental).map(|(s, _)| (s, DefinedAs::Incremental)),
            &|s| token(s, TokenKind::Equals).map(|(s, _)| (s, DefinedAs::Replace)),
        ])?;
        let (s, _) = many_c_wsp(s)?;
        Ok((s, mode))
    })
}

/// `elements = alternation *c-wsp`
fn elements<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Alternation> {
    state.match_sequence(|s| {
        let (s, alternation) = alternation(s)?;
        let (s, _) = many_c_wsp(s)?;
        Ok((s, alternation))
    })
}

/// `c-wsp = WSP / (c-nl WSP)`
///
/// The lexer joins a line break and the indentation after it into one
/// continuation token.
fn c_wsp<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, ()> {
    state.match_choice(&[
        &|s| token(s, TokenKind::Whitespace).map(|(s, _)| (s, ())),
        &|s| token(s, TokenKind::Continuation).map(|(s, _)| (s, ())),
        &|s| {
            s.match_sequence(|s| {
                let (s, _) = token(s, TokenKind::Comment)?;
                let (s, _) = token(s, TokenKind::Continuation)?;
                Ok((s, ()))
            })
        },
    ])
}

fn many_c_wsp<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, ()> {
    state
        .match_repetition(0, None, c_wsp)
        .map(|(s, _)| (s, ()))
}

/// `c-nl = comment / CRLF`, where the comment includes its line break.
fn c_nl<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, ()> {
    state.match_choice(&[
        &|s| {
            s.match_sequence(|s| {
                let (s, _) = token(s, TokenKind::Comment)?;
                let (s, _) = token(s, TokenKind::Newline)?;
                Ok((s, ()))
            })
        },
        &|s| token(s, TokenKind::Newline).map(|(s, _)| (s, ())),
    ])
}

/// `alternation = concatenation *(*c-wsp "/" *c-wsp concatenation)`
fn alternation<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Alternation> {
    state.match_sequence(|s| {
        let (s, first) = concatenation(s)?;
        let (s, rest) = s.match_repetition(0, None, |s| {
            s.match_sequence(|s| {
                let (s, _) = many_c_wsp(s)?;
                let (s, _) = token(s, TokenKind::Slash)?;
                let (s, _) = many_c_wsp(s)?;
                concatenation(s)
            })
        })?;
        let mut concatenations = vec![first];
        concatenations.extend(rest);
        Ok((s, Alternation(concatenations)))
    })
}

/// `concatenation = repetition *(1*c-wsp repetition)`
fn concatenation<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Concatenation> {
    state.match_sequence(|s| {
        let (s, first) = repetition(s)?;
        let (s, rest) = s.match_repetition(0, None, |s| {
            s.match_sequence(|s| {
                let (s, _) = s.match_repetition(1, None, c_wsp)?;
                repetition(s)
            })
        })?;
        let mut repetitions = vec![first];
        repetitions.extend(rest);
        Ok((s, Concatenation(repetitions)))
    })
}

/// `repetition = [repeat] element`
fn repetition<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Repetition> {
    state.match_sequence(|s| {
        let (s, repeat) = s.match_optional(repeat)?;
        let (s, element) = element(s)?;
        Ok((s, Repetition { repeat, element }))
    })
}

/// `repeat = (*DIGIT "*" *DIGIT) / 1*DIGIT`
///
/// The starred form comes first: a bare count is a prefix of it.
fn repeat<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Repeat> {
    state.match_choice(&[
        &|s| {
            s.match_sequence(|s| {
                let (s, min) = s.match_optional(number)?;
                let (s, _) = token(s, TokenKind::Star)?;
                let (s, max) = s.match_optional(number)?;
                let repeat = Repeat {
                    min: min.unwrap_or(0),
                    max,
                };
                Ok((s, repeat))
            })
        },
        &|s| number(s).map(|(s, n)| (s, Repeat::exactly(n))),
    ])
}

fn number<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, u32> {
    state.match_unit(Expected::named("repeat count"), |token| {
        if token.kind == TokenKind::Number {
            token.text.parse().ok()
        } else {
            None
        }
    })
}

/// `element = rulename / group / option / char-val / num-val / prose-val`
fn element<'a, 's>(state: St<'a, 's>) -> Res<'a, 's, Element> {
    state.match_choice(&[
        &|s| {
            token(s, TokenKind::RuleName)
                .map(|(s, t)| (s, Element::RuleRef(RuleName(t.text.to_owned()))))
        },
        &|s| {
            bracketed(s, TokenKind::OpenParen, TokenKind::CloseParen)
                .map(|(s, inner)| (s, Element::Group(inner)))
        },
        &|s| {
            bracketed(s, TokenKind::OpenBracket, TokenKind::CloseBracket)
                .map(|(s, inner)| (s, Element::Option(inner)))
        },
        &|s| {
            token(s, TokenKind::CharVal).map(|(s, t)| (s, Element::CharVal(char_val(t.text))))
        },
        &|s| {
            s.match_unit(Expected::named(TokenKind::NumVal.describe()), |token| {
                if token.kind == TokenKind::NumVal {
                    num_val(token.text).map(Element::NumVal)
                } else {
                    None
                }
            })
        },
        &|s| {
            token(s, TokenKind::ProseVal).map(|(s, t)| {
                let text = &t.text[1..t.text.len() - 1];
                (s, Element::ProseVal(text.to_owned()))
            })
        },
    ])
}

/// `group = "(" *c-wsp alternation *c-wsp ")"`, likewise for option.
fn bracketed<'a, 's>(
    state: St<'a, 's>,
    open: TokenKind,
    close: TokenKind,
) -> Res<'a, 's, Alternation> {
    state.match_sequence(|s| {
        let (s, _) = token(s, open)?;
        let (s, _) = many_c_wsp(s)?;
        let (s, inner) = alternation(s)?;
        let (s, _) = many_c_wsp(s)?;
        let (s, _) = token(s, close)?;
        Ok((s, inner))
    })
}

fn char_val(text: &str) -> CharVal {
    let (case, quoted) = match text.as_bytes().first() {
        Some(b'%') => {
            let case = match text.as_bytes().get(1) {
                Some(b's') | Some(b'S') => Case::Sensitive,
                _ => Case::Insensitive,
            };
            (Some(case), &text[2..])
        }
        _ => (None, text),
    };
    CharVal {
        text: quoted[1..quoted.len() - 1].to_owned(),
        case,
    }
}

/// Decode `%x30-39`, `%d13.10` and friends. `None` if the digits do not
/// fit the radix.
fn num_val(text: &str) -> Option<NumVal> {
    all_consuming(num_val_parts)(text).ok().map(|(_, val)| val)
}

fn digits<'s>(radix: Radix) -> impl FnMut(&'s str) -> IResult<&'s str, u32> {
    map_res(
        take_while1(move |c: char| c.is_digit(radix.base())),
        move |digits: &str| u32::from_str_radix(digits, radix.base()),
    )
}

fn num_val_parts(input: &str) -> IResult<&str, NumVal> {
    let (input, _) = char('%')(input)?;
    let (input, radix) = map(one_of("bdxBDX"), |c| match c.to_ascii_lowercase() {
        'b' => Radix::Bin,
        'd' => Radix::Dec,
        _ => Radix::Hex,
    })(input)?;
    let (input, first) = digits(radix)(input)?;
    let (input, value) = opt(alt((
        map(preceded(char('-'), digits(radix)), move |hi| {
            NumValue::Range(first, hi)
        }),
        map(many1(preceded(char('.'), digits(radix))), move |rest| {
            let mut values = vec![first];
            values.extend(rest);
            NumValue::Sequence(values)
        }),
    )))(input)?;
    let value = value.unwrap_or_else(|| NumValue::Sequence(vec![first]));
    Ok((input, NumVal { radix, value }))
}
