//! Lexical analysis for the packet schema language.
//!
//! Converts an abstract character stream into classified tokens with line
//! numbers. Comments (`// ...`) are stripped during lexing, not tokenized.
//! The lexer buffers at most one token of lookahead for the parser; a second
//! `peek_token` before a `next_token` returns the same buffered token.

use std::fmt;
use std::iter::Peekable;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Literal,
    Comma,
    BraceOpen,
    BraceClose,
    ArrOpen,
    ArrClose,
    Colon,
    Semicolon,
    EndOfFile,
    KeywordMessage,
    KeywordBase,
    KeywordEnum,
    KeywordTypedef,
    KeywordNamespace,
    KeywordList,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Literal => "literal",
            TokenKind::Comma => "','",
            TokenKind::BraceOpen => "'{'",
            TokenKind::BraceClose => "'}'",
            TokenKind::ArrOpen => "'['",
            TokenKind::ArrClose => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::EndOfFile => "end of file",
            TokenKind::KeywordMessage => "'message'",
            TokenKind::KeywordBase => "'base'",
            TokenKind::KeywordEnum => "'enum'",
            TokenKind::KeywordTypedef => "'@type'",
            TokenKind::KeywordNamespace => "'namespace'",
            TokenKind::KeywordList => "'list'",
        };
        f.write_str(name)
    }
}

/// A classified token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// 1-based source line the token started on.
    pub line: u32,
    pub kind: TokenKind,
    pub text: String,
}

/// Lexical error. Fatal to the whole compilation; there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// A `/` not followed by a second `/` (comments are the only use of `/`).
    #[error("line {line}: unexpected '/' literal")]
    StraySlash { line: u32 },
}

fn punct_kind(c: char) -> Option<TokenKind> {
    match c {
        '{' => Some(TokenKind::BraceOpen),
        '}' => Some(TokenKind::BraceClose),
        '[' => Some(TokenKind::ArrOpen),
        ']' => Some(TokenKind::ArrClose),
        ',' => Some(TokenKind::Comma),
        ':' => Some(TokenKind::Colon),
        ';' => Some(TokenKind::Semicolon),
        _ => None,
    }
}

fn keyword_kind(text: &str) -> Option<TokenKind> {
    match text {
        "message" => Some(TokenKind::KeywordMessage),
        "base" => Some(TokenKind::KeywordBase),
        "enum" => Some(TokenKind::KeywordEnum),
        "namespace" => Some(TokenKind::KeywordNamespace),
        "@type" => Some(TokenKind::KeywordTypedef),
        "list" => Some(TokenKind::KeywordList),
        _ => None,
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Streaming tokenizer over a character iterator.
pub struct Lexer<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    line: u32,
    peeked: Option<Token>,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        Lexer {
            chars: chars.peekable(),
            line: 1,
            peeked: None,
        }
    }

    /// Consume and return the next token. The buffered lookahead token, if
    /// any, is returned first.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.read_token()
    }

    /// Return the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = &self.peeked {
            return Ok(token.clone());
        }
        let token = self.read_token()?;
        self.peeked = Some(token.clone());
        Ok(token)
    }

    fn eof(&self) -> Token {
        Token {
            line: self.line,
            kind: TokenKind::EndOfFile,
            text: String::new(),
        }
    }

    fn read_token(&mut self) -> Result<Token, LexError> {
        // Skip whitespace and comments. Newlines bump the line counter even
        // inside a comment.
        loop {
            match self.chars.peek() {
                None => return Ok(self.eof()),
                Some('\n') => {
                    self.chars.next();
                    self.line += 1;
                }
                Some(' ') | Some('\t') | Some('\r') => {
                    self.chars.next();
                }
                Some('/') => {
                    self.chars.next();
                    if self.chars.peek() == Some(&'/') {
                        // Comment text is discarded, not tokenized.
                        while let Some(c) = self.chars.next() {
                            if c == '\n' {
                                self.line += 1;
                                break;
                            }
                        }
                    } else {
                        return Err(LexError::StraySlash { line: self.line });
                    }
                }
                Some(_) => break,
            }
        }

        let line = self.line;
        let Some(first) = self.chars.next() else {
            return Ok(self.eof());
        };

        if let Some(kind) = punct_kind(first) {
            return Ok(Token {
                line,
                kind,
                text: first.to_string(),
            });
        }

        // Maximal literal run: anything up to whitespace, punctuation or a
        // comment start. The terminating character is left for the next call.
        let mut text = String::new();
        text.push(first);
        while let Some(&c) = self.chars.peek() {
            if is_whitespace(c) || c == '/' || punct_kind(c).is_some() {
                break;
            }
            text.push(c);
            self.chars.next();
        }

        let kind = keyword_kind(&text).unwrap_or(TokenKind::Literal);
        Ok(Token { line, kind, text })
    }
}

impl<'a> Lexer<std::str::Chars<'a>> {
    /// Convenience constructor over a source string.
    pub fn from_source(source: &'a str) -> Self {
        Lexer::new(source.chars())
    }
}
