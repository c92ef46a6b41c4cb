//! Compile packet schema files to C++ serialization classes.
//!
//! Usage:
//!   netidlc [OPTIONS] [FILE.idl]
//!   netidlc < file.idl
//!
//! Options:
//!   -o FILE        Write generated code to FILE (default: stdout)
//!   --dump-tokens  Print the token stream instead of compiling
//!   --dump-tree    Print the parsed declaration tree instead of compiling
//!
//! If no file is given, reads from stdin. Diagnostics go to stderr as
//! `file(line): message` and the exit code is 1.

use netidl::lexer::{Lexer, TokenKind};
use netidl::{compile, dump_tree, parse};
use std::io::{self, Read, Write};

fn read_input(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(p) => Ok(std::fs::read_to_string(p)?),
        None => {
            let mut src = String::new();
            io::stdin().read_to_string(&mut src)?;
            Ok(src)
        }
    }
}

fn write_output(path: Option<&str>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(p) => std::fs::write(p, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn dump_tokens(source: &str) -> Result<String, netidl::Error> {
    let mut lexer = Lexer::from_source(source);
    let mut out = String::new();
    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::EndOfFile {
            break;
        }
        out.push_str(&format!(
            "{:>4}  {:<12} '{}'\n",
            token.line,
            format!("{:?}", token.kind),
            token.text
        ));
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let tokens_only = if let Some(pos) = args.iter().position(|a| a == "--dump-tokens") {
        args.remove(pos);
        true
    } else {
        false
    };
    let tree_only = if let Some(pos) = args.iter().position(|a| a == "--dump-tree") {
        args.remove(pos);
        true
    } else {
        false
    };
    let out_path = if let Some(pos) = args.iter().position(|a| a == "-o") {
        args.remove(pos);
        if pos >= args.len() {
            anyhow::bail!("-o requires a file name");
        }
        Some(args.remove(pos))
    } else {
        None
    };
    if args.len() > 1 {
        anyhow::bail!("expected at most one input file, got {}", args.len());
    }
    let in_path = args.first().cloned();

    let source = read_input(in_path.as_deref())?;
    let display = in_path.as_deref().unwrap_or("<stdin>");

    let result = if tokens_only {
        dump_tokens(&source)
    } else if tree_only {
        parse(&source).map(|tree| dump_tree(&tree))
    } else {
        compile(&source)
    };

    match result {
        Ok(text) => {
            write_output(out_path.as_deref(), &text)?;
            Ok(())
        }
        Err(err) => {
            // The error's own text carries the line number, so the location
            // prefix carries only the file.
            eprintln!("{}: {}", display, err);
            std::process::exit(1);
        }
    }
}
