// Lexer for dagc expression sources.
//
// Tokenizes an expression into the pull-based token stream consumed by the
// DAG builder. Uses the `logos` crate for DFA-based lexing; the raw logos
// output is converted into the public `Token` type, which additionally
// carries end-of-input and error tokens.
//
// Preconditions: input is valid UTF-8.
// Postconditions: `next()` yields every token in source order, then
//                 `Token::EndOfInput` on every subsequent call.
// Failure modes: illegal characters and incomplete operators (`&`, `|`, `=`)
//                produce `Token::Error`; lexing continues past them.
// Side effects: none.

use logos::Logos;
use std::fmt;

/// Byte-offset span in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 1-based line and column of `start` within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let prefix = &source[..self.start.min(source.len())];
        let line = prefix.matches('\n').count() + 1;
        let col = match prefix.rfind('\n') {
            Some(nl) => prefix[nl + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        (line, col)
    }
}

/// Raw token from logos, before text capture.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("==")]
    Equals,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    /// Decimal literal. A trailing `.` with no fraction digits is accepted.
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    Number,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
}

/// dagc token types.
///
/// Identifiers and numbers carry their source text. `EndOfInput` is
/// returned once the source is exhausted; `Error` stands in for any
/// character sequence that does not form a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    Number(String),
    Plus,
    Minus,
    Star,
    Slash,
    Less,
    Greater,
    Equals,
    And,
    Or,
    LeftParen,
    RightParen,
    EndOfInput,
    Error(String),
}

impl Token {
    /// Token category, without the captured text. Used in expected-vs-found
    /// messages.
    pub fn category(&self) -> &'static str {
        match self {
            Token::Ident(_) => "identifier",
            Token::Number(_) => "number",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Less => "'<'",
            Token::Greater => "'>'",
            Token::Equals => "'=='",
            Token::And => "'&&'",
            Token::Or => "'||'",
            Token::LeftParen => "'('",
            Token::RightParen => "')'",
            Token::EndOfInput => "end of input",
            Token::Error(_) => "invalid input",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "identifier '{name}'"),
            Token::Number(text) => write!(f, "number '{text}'"),
            Token::Error(message) => write!(f, "{message}"),
            other => write!(f, "{}", other.category()),
        }
    }
}

/// A pull-based source of tokens for the DAG builder.
///
/// After `Token::EndOfInput` has been returned once, callers must not call
/// `next()` again; implementations may nonetheless keep returning it.
pub trait TokenSource {
    fn next(&mut self) -> (Token, Span);
}

/// logos-backed token source over a source string.
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, RawToken>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: RawToken::lexer(source),
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn next(&mut self) -> (Token, Span) {
        let Some(result) = self.inner.next() else {
            let end = self.source.len();
            return (Token::EndOfInput, Span::new(end, end));
        };
        let range = self.inner.span();
        let span = Span::new(range.start, range.end);
        let slice = self.inner.slice();
        let token = match result {
            Ok(raw) => convert(raw, slice),
            Err(()) => Token::Error(describe_error(slice)),
        };
        (token, span)
    }
}

fn convert(raw: RawToken, slice: &str) -> Token {
    match raw {
        RawToken::Plus => Token::Plus,
        RawToken::Minus => Token::Minus,
        RawToken::Star => Token::Star,
        RawToken::Slash => Token::Slash,
        RawToken::Less => Token::Less,
        RawToken::Greater => Token::Greater,
        RawToken::Equals => Token::Equals,
        RawToken::And => Token::And,
        RawToken::Or => Token::Or,
        RawToken::LeftParen => Token::LeftParen,
        RawToken::RightParen => Token::RightParen,
        RawToken::Number => Token::Number(slice.to_string()),
        RawToken::Ident => Token::Ident(slice.to_string()),
    }
}

fn describe_error(slice: &str) -> String {
    match slice {
        "&" => "incomplete operator '&' (did you mean '&&'?)".to_string(),
        "|" => "incomplete operator '|' (did you mean '||'?)".to_string(),
        "=" => "incomplete operator '=' (did you mean '=='?)".to_string(),
        other => format!("unexpected character: {other:?}"),
    }
}

// ── Public API ──

/// Lex a whole source string, stopping at (and including) end of input.
///
/// Convenience for diagnostics and tests; the builder pulls tokens one at a
/// time through `TokenSource` instead.
pub fn lex(source: &str) -> Vec<(Token, Span)> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let (token, span) = lexer.next();
        let done = token == Token::EndOfInput;
        tokens.push((token, span));
        if done {
            return tokens;
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: lex and return the token list without spans or the final
    /// end-of-input marker.
    fn lex_tokens(source: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = lex(source).into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens.pop(), Some(Token::EndOfInput));
        tokens
    }

    #[test]
    fn operators() {
        let tokens = lex_tokens("+ - * / < > == && || ( )");
        assert_eq!(
            tokens,
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Less,
                Token::Greater,
                Token::Equals,
                Token::And,
                Token::Or,
                Token::LeftParen,
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn identifiers_and_numbers_carry_text() {
        let tokens = lex_tokens("foo _bar x1 42 3.25 7.");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("foo".into()),
                Token::Ident("_bar".into()),
                Token::Ident("x1".into()),
                Token::Number("42".into()),
                Token::Number("3.25".into()),
                Token::Number("7.".into()),
            ]
        );
    }

    #[test]
    fn no_whitespace_needed() {
        let tokens = lex_tokens("(a+b)*c");
        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                Token::Ident("a".into()),
                Token::Plus,
                Token::Ident("b".into()),
                Token::RightParen,
                Token::Star,
                Token::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn minus_is_never_part_of_a_number() {
        let tokens = lex_tokens("-1");
        assert_eq!(tokens, vec![Token::Minus, Token::Number("1".into())]);
    }

    #[test]
    fn incomplete_operators_are_errors() {
        for src in ["a & b", "a | b", "a = b"] {
            let tokens = lex_tokens(src);
            assert_eq!(tokens.len(), 3, "{src}");
            assert!(matches!(tokens[1], Token::Error(_)), "{src}: {:?}", tokens[1]);
        }
    }

    #[test]
    fn incomplete_operator_at_end_of_input() {
        let tokens = lex_tokens("a &");
        assert!(matches!(tokens.last(), Some(Token::Error(m)) if m.contains("'&&'")));
    }

    #[test]
    fn illegal_character_then_recovery() {
        let tokens = lex_tokens("a ~ b");
        assert_eq!(tokens[0], Token::Ident("a".into()));
        assert!(matches!(&tokens[1], Token::Error(m) if m.contains('~')));
        assert_eq!(tokens[2], Token::Ident("b".into()));
    }

    #[test]
    fn end_of_input_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next().0, Token::Ident("x".into()));
        assert_eq!(lexer.next().0, Token::EndOfInput);
        assert_eq!(lexer.next().0, Token::EndOfInput);
    }

    #[test]
    fn spans_correct() {
        let tokens = lex("ab == 10");
        assert_eq!(tokens[0].1, Span::new(0, 2));
        assert_eq!(tokens[1].1, Span::new(3, 5));
        assert_eq!(tokens[2].1, Span::new(6, 8));
        assert_eq!(tokens[3], (Token::EndOfInput, Span::new(8, 8)));
    }

    #[test]
    fn line_col_counts_from_one() {
        let source = "a +\n  b";
        assert_eq!(Span::new(0, 1).line_col(source), (1, 1));
        assert_eq!(Span::new(6, 7).line_col(source), (2, 3));
    }

    #[test]
    fn display_names_category_and_text() {
        assert_eq!(Token::Ident("x".into()).to_string(), "identifier 'x'");
        assert_eq!(Token::Plus.to_string(), "'+'");
        assert_eq!(Token::EndOfInput.to_string(), "end of input");
    }
}
