//! Compiler for a declarative network-packet schema language.
//!
//! Schemas describe the wire layout of packets: fields in declaration
//! order, reusable field groups (`base`) composited by inheritance, and
//! repeated groups (`list`). The compiler turns a schema into C++
//! serialization classes.
//!
//! ```text
//! namespace game {
//! 	base header {
//! 		uint16 seq;
//! 	};
//! 	message move : header {
//! 		int32 x;
//! 		int32 y;
//! 	};
//! };
//! ```
//!
//! Compilation is a fixed pipeline: [`lexer`] tokenizes, [`parser`] builds
//! the declaration tree, [`resolve`] validates containment and inheritance,
//! and [`generate`] emits the output. Each stage has its own error type;
//! [`compile`] runs the whole pipeline and folds them into [`Error`].

pub mod ast;
pub mod dump;
pub mod generate;
pub mod lexer;
pub mod lint;
pub mod parser;
pub mod resolve;

pub use ast::{Kind, Node, NodeId, NodeKind, Tree};
pub use dump::dump_tree;
pub use generate::{GenError, Generator, Stage, TYPE_ID_MAX, TYPE_ID_MIN};
pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use lint::{lint, lint_fix, LintMessage, LintRule, Severity};
pub use parser::{ParseError, Parser};
pub use resolve::{ResolveError, Resolver};

/// Any error from any compilation stage, tagged with the stage that
/// produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("lexer error: {0}")]
    Lex(#[from] LexError),
    #[error("parser error: {0}")]
    Parse(#[from] ParseError),
    #[error("validate error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("generate error: {0}")]
    Gen(#[from] GenError),
}

/// Parse a schema into its declaration tree, without validating it.
pub fn parse(source: &str) -> Result<Tree, Error> {
    Parser::new(Lexer::from_source(source)).parse()
}

/// Compile a schema all the way to generated C++ source.
pub fn compile(source: &str) -> Result<String, Error> {
    let tree = parse(source)?;
    Resolver::new(&tree).validate()?;
    let mut out = String::new();
    Generator::new(&tree, &mut out).generate()?;
    Ok(out)
}
