// builder.rs - Recursive-descent DAG builder
//
// Consumes a token stream and builds the expression DAG bottom-up. Every
// node constructed here is routed through the hash-consing dictionary
// before it is embedded in an enclosing node, so equal subexpressions
// collapse to one node as the structure is built.
//
// Grammar, loosest binding first:
//
//   disjunction   = conjunction ('||' conjunction)*
//   conjunction   = comparison ('&&' comparison)*
//   comparison    = numeric (('<' | '>' | '==') numeric)?
//   numeric       = term (('+' | '-') term)*
//   term          = signed_factor (('*' | '/') signed_factor)*
//   signed_factor = '-'? factor
//   factor        = IDENT | NUMBER | '(' disjunction ')'
//
// The whole input must be one disjunction followed by end of input.
//
// Preconditions: none.
// Postconditions: on success, a DAG with parent counts computed.
// Failure modes: the first lexical or syntax error aborts the build.
// Side effects: none.

use tracing::debug;

use crate::dag::Dag;
use crate::dict::NodeDictionary;
use crate::error::BuildError;
use crate::id::NodeRef;
use crate::lexer::{Lexer, Span, Token, TokenSource};
use crate::node::{BinaryOp, NodeKind, UnaryOp};

/// Limits applied while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum parenthesis nesting depth.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Build a DAG from source text with default options.
pub fn parse(source: &str) -> Result<Dag, BuildError> {
    parse_with(source, BuildOptions::default())
}

/// Build a DAG from source text.
pub fn parse_with(source: &str, options: BuildOptions) -> Result<Dag, BuildError> {
    DagBuilder::new(Lexer::new(source), options).build()
}

pub struct DagBuilder<S> {
    source: S,
    lookahead: Token,
    span: Span,
    exhausted: bool,
    dict: NodeDictionary,
    options: BuildOptions,
    depth: usize,
}

impl<S: TokenSource> DagBuilder<S> {
    pub fn new(source: S, options: BuildOptions) -> Self {
        Self {
            source,
            lookahead: Token::EndOfInput,
            span: Span::default(),
            exhausted: false,
            dict: NodeDictionary::new(),
            options,
            depth: 0,
        }
    }

    /// Run the builder over the whole token stream and return the DAG with
    /// parent counts computed.
    pub fn build(mut self) -> Result<Dag, BuildError> {
        self.advance()?;
        let root = self.disjunction()?;
        if self.lookahead != Token::EndOfInput {
            return Err(self.unexpected("end of input"));
        }
        debug!(
            canonical = self.dict.len(),
            constructed = self.dict.constructed(),
            "dag built"
        );
        let mut dag = self.dict.into_dag(root);
        dag.count_parents();
        Ok(dag)
    }

    // ── Grammar ──

    fn disjunction(&mut self) -> Result<NodeRef, BuildError> {
        let mut lhs = self.conjunction()?;
        while self.lookahead == Token::Or {
            self.advance()?;
            let rhs = self.conjunction()?;
            lhs = self.dict.binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn conjunction(&mut self) -> Result<NodeRef, BuildError> {
        let mut lhs = self.comparison()?;
        while self.lookahead == Token::And {
            self.advance()?;
            let rhs = self.comparison()?;
            lhs = self.dict.binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<NodeRef, BuildError> {
        let lhs = self.numeric()?;
        let op = match self.lookahead {
            Token::Less => BinaryOp::Less,
            Token::Greater => BinaryOp::Greater,
            Token::Equals => BinaryOp::Equals,
            _ => return Ok(lhs),
        };
        self.advance()?;
        let rhs = self.numeric()?;
        Ok(self.dict.binary(op, lhs, rhs))
    }

    fn numeric(&mut self) -> Result<NodeRef, BuildError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.lookahead {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.term()?;
            lhs = self.dict.binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<NodeRef, BuildError> {
        let mut lhs = self.signed_factor()?;
        loop {
            let op = match self.lookahead {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => return Ok(lhs),
            };
            self.advance()?;
            let rhs = self.signed_factor()?;
            lhs = self.dict.binary(op, lhs, rhs);
        }
    }

    fn signed_factor(&mut self) -> Result<NodeRef, BuildError> {
        if self.lookahead == Token::Minus {
            self.advance()?;
            let operand = self.factor()?;
            return Ok(self.dict.unary(UnaryOp::Negate, operand));
        }
        self.factor()
    }

    fn factor(&mut self) -> Result<NodeRef, BuildError> {
        match &self.lookahead {
            Token::LeftParen => {
                if self.depth >= self.options.max_depth {
                    return Err(BuildError::TooDeep {
                        limit: self.options.max_depth,
                        span: self.span,
                    });
                }
                self.depth += 1;
                self.advance()?;
                let inner = self.disjunction()?;
                self.expect(Token::RightParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            Token::Ident(name) => {
                let kind = NodeKind::Ident { name: name.clone() };
                self.advance()?;
                Ok(self.dict.intern(kind))
            }
            Token::Number(text) => {
                let value = text.parse::<f64>().map_err(|_| BuildError::Lexical {
                    message: format!("malformed number '{text}'"),
                    span: self.span,
                })?;
                let kind = NodeKind::Number {
                    text: text.clone(),
                    value,
                };
                self.advance()?;
                Ok(self.dict.intern(kind))
            }
            _ => Err(self.unexpected("a factor")),
        }
    }

    // ── Token handling ──

    /// Pull the next token into the lookahead. Error tokens abort the build
    /// here, so the grammar functions never see them.
    fn advance(&mut self) -> Result<(), BuildError> {
        if self.exhausted {
            return Ok(());
        }
        let (token, span) = self.source.next();
        self.span = span;
        match token {
            Token::Error(message) => Err(BuildError::Lexical { message, span }),
            token => {
                self.exhausted = token == Token::EndOfInput;
                self.lookahead = token;
                Ok(())
            }
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), BuildError> {
        if self.lookahead != token {
            return Err(self.unexpected(token.category()));
        }
        self.advance()
    }

    fn unexpected(&self, expected: &str) -> BuildError {
        BuildError::Syntax {
            expected: expected.to_string(),
            found: self.lookahead.clone(),
            span: self.span,
        }
    }
}
