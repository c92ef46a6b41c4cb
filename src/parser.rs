//! Recursive-descent parser: tokens in, declaration tree out.
//!
//! One production per declaration kind, driven by the leading token of each
//! declaration with one token of lookahead. The parser validates local
//! grammar only (braces, terminators, optional array and inheritance
//! clauses); cross-reference semantics are the resolver's job. Grammar
//! errors are fatal — there is no recovery or resynchronization.

use crate::ast::{Kind, NodeId, NodeKind, Tree};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::Error;

/// Grammar error: the parser required one token shape and found another.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}: {expected}, found {} '{}'", token.line, token.kind, token.text)]
pub struct ParseError {
    /// The offending token.
    pub token: Token,
    /// What the grammar required at this position.
    pub expected: &'static str,
}

/// Recursive-descent parser over a token stream.
pub struct Parser<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    tree: Tree,
    cur: NodeId,
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn new(lexer: Lexer<I>) -> Self {
        let tree = Tree::new();
        let cur = tree.root();
        Parser { lexer, tree, cur }
    }

    /// Parse a whole document and return the finished tree.
    pub fn parse(mut self) -> Result<Tree, Error> {
        self.parse_body()?;
        let token = self.lexer.next_token()?;
        if token.kind != TokenKind::EndOfFile {
            return Err(ParseError {
                token,
                expected: "expected end of file",
            }
            .into());
        }
        Ok(self.tree)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, Error> {
        let token = self.lexer.next_token()?;
        if token.kind != kind {
            return Err(ParseError { token, expected }.into());
        }
        Ok(token)
    }

    /// Parse declarations until the end of the current container body.
    fn parse_body(&mut self) -> Result<(), Error> {
        loop {
            let token = self.lexer.peek_token()?;
            match token.kind {
                TokenKind::EndOfFile | TokenKind::BraceClose => return Ok(()),
                TokenKind::Literal => self.parse_var()?,
                TokenKind::KeywordEnum => self.parse_enum()?,
                TokenKind::KeywordNamespace => self.parse_namespace()?,
                TokenKind::KeywordTypedef => self.parse_typedef()?,
                TokenKind::KeywordMessage => self.parse_composite(Kind::Message)?,
                TokenKind::KeywordBase => self.parse_composite(Kind::Base)?,
                TokenKind::KeywordList => self.parse_composite(Kind::List)?,
                _ => {
                    return Err(ParseError {
                        token,
                        expected: "expected a declaration",
                    }
                    .into())
                }
            }
        }
    }

    /// Parse a container body with `node` as the current container. The
    /// previous container is restored on every exit path, so the tree stays
    /// consistent even when a nested production fails.
    fn parse_nested(&mut self, node: NodeId) -> Result<(), Error> {
        let prev = std::mem::replace(&mut self.cur, node);
        let result = self.parse_body();
        self.cur = prev;
        result
    }

    /// `@type underlying alias ';'`
    fn parse_typedef(&mut self) -> Result<(), Error> {
        let keyword = self.expect(TokenKind::KeywordTypedef, "expected '@type'")?;
        let ty = self.expect(TokenKind::Literal, "expected underlying type after '@type'")?;
        let name = self.expect(TokenKind::Literal, "expected typedef name")?;
        self.expect(TokenKind::Semicolon, "expected ';' after typedef")?;

        let node = self.tree.alloc(
            keyword.line,
            self.cur,
            NodeKind::Typedef {
                name: name.text,
                ty: ty.text,
            },
        );
        self.tree.attach(self.cur, node);
        Ok(())
    }

    /// `enum name '{' (value (',' value)*)? '}' ';'`
    fn parse_enum(&mut self) -> Result<(), Error> {
        let keyword = self.expect(TokenKind::KeywordEnum, "expected 'enum'")?;
        let name = self.expect(TokenKind::Literal, "expected enum name")?;
        self.expect(TokenKind::BraceOpen, "expected '{' after enum name")?;

        let mut values = Vec::new();
        if self.lexer.peek_token()?.kind == TokenKind::BraceClose {
            // Empty enum bodies are allowed.
            self.lexer.next_token()?;
        } else {
            loop {
                let value = self.expect(TokenKind::Literal, "expected enum value name")?;
                values.push(value.text);
                let sep = self.lexer.next_token()?;
                match sep.kind {
                    TokenKind::Comma => {}
                    TokenKind::BraceClose => break,
                    _ => {
                        return Err(ParseError {
                            token: sep,
                            expected: "expected ',' or '}' after enum value",
                        }
                        .into())
                    }
                }
            }
        }
        self.expect(TokenKind::Semicolon, "expected ';' after enum")?;

        let node = self.tree.alloc(
            keyword.line,
            self.cur,
            NodeKind::Enum {
                name: name.text,
                values,
            },
        );
        self.tree.attach(self.cur, node);
        Ok(())
    }

    /// `namespace name '{' body '}' ';'`
    fn parse_namespace(&mut self) -> Result<(), Error> {
        let keyword = self.expect(TokenKind::KeywordNamespace, "expected 'namespace'")?;
        let name = self.expect(TokenKind::Literal, "expected namespace name")?;
        self.expect(TokenKind::BraceOpen, "expected '{' after namespace name")?;

        let node = self.tree.alloc(
            keyword.line,
            self.cur,
            NodeKind::Namespace {
                name: name.text,
                children: Vec::new(),
            },
        );
        self.parse_nested(node)?;

        self.expect(TokenKind::BraceClose, "expected '}' closing namespace")?;
        self.expect(TokenKind::Semicolon, "expected ';' after namespace")?;
        self.tree.attach(self.cur, node);
        Ok(())
    }

    /// `type name ('[' length ']')? ';'`
    fn parse_var(&mut self) -> Result<(), Error> {
        let ty = self.expect(TokenKind::Literal, "expected field type")?;
        let name = self.expect(TokenKind::Literal, "expected field name")?;

        let mut arr_len = None;
        let next = self.lexer.peek_token()?;
        match next.kind {
            TokenKind::Semicolon => {}
            TokenKind::ArrOpen => {
                self.lexer.next_token()?;
                // The length is kept as opaque text and never evaluated here.
                let len = self.expect(TokenKind::Literal, "expected array length")?;
                arr_len = Some(len.text);
                self.expect(TokenKind::ArrClose, "expected ']' after array length")?;
            }
            _ => {
                return Err(ParseError {
                    token: next,
                    expected: "expected ';' or '[' after field name",
                }
                .into())
            }
        }
        self.expect(TokenKind::Semicolon, "expected ';' after field")?;

        let node = self.tree.alloc(
            name.line,
            self.cur,
            NodeKind::Var {
                name: name.text,
                ty: ty.text,
                arr_len,
            },
        );
        self.tree.attach(self.cur, node);
        Ok(())
    }

    /// Shared production for `message`, `base` and `list` declarations; they
    /// differ only in keyword and node kind.
    ///
    /// `kw name (':' base (',' base)*)? '{' body '}' ';'`
    fn parse_composite(&mut self, kind: Kind) -> Result<(), Error> {
        let keyword_kind = match kind {
            Kind::Message => TokenKind::KeywordMessage,
            Kind::Base => TokenKind::KeywordBase,
            _ => TokenKind::KeywordList,
        };
        let keyword = self.expect(keyword_kind, "expected declaration keyword")?;
        let name = self.expect(TokenKind::Literal, "expected declaration name")?;

        let mut inherits = Vec::new();
        let next = self.lexer.peek_token()?;
        match next.kind {
            TokenKind::BraceOpen => {}
            TokenKind::Colon => {
                self.lexer.next_token()?;
                loop {
                    let base = self.expect(TokenKind::Literal, "expected inherited base name")?;
                    // Duplicates are accepted here; the resolver rejects them.
                    inherits.push(base.text);
                    let sep = self.lexer.peek_token()?;
                    match sep.kind {
                        TokenKind::Comma => {
                            self.lexer.next_token()?;
                        }
                        TokenKind::BraceOpen => break,
                        _ => {
                            return Err(ParseError {
                                token: sep,
                                expected: "expected ',' or '{' after inherited base name",
                            }
                            .into())
                        }
                    }
                }
            }
            _ => {
                return Err(ParseError {
                    token: next,
                    expected: "expected ':' or '{' after declaration name",
                }
                .into())
            }
        }
        self.expect(TokenKind::BraceOpen, "expected '{' opening declaration body")?;

        let node_kind = match kind {
            Kind::Message => NodeKind::Message {
                name: name.text,
                inherits,
                children: Vec::new(),
            },
            Kind::Base => NodeKind::Base {
                name: name.text,
                inherits,
                children: Vec::new(),
            },
            _ => NodeKind::List {
                name: name.text,
                inherits,
                children: Vec::new(),
            },
        };
        let node = self.tree.alloc(keyword.line, self.cur, node_kind);
        self.parse_nested(node)?;

        self.expect(TokenKind::BraceClose, "expected '}' closing declaration body")?;
        self.expect(TokenKind::Semicolon, "expected ';' after declaration")?;
        self.tree.attach(self.cur, node);
        Ok(())
    }
}
