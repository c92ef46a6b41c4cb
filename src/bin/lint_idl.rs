//! Check and fix the layout of schema source files.
//!
//! Usage:
//!   lint_idl [OPTIONS] [FILE.idl ...]
//!   lint_idl [OPTIONS] < file.idl
//!
//! Files are rewritten in place to satisfy the layout rules, then any
//! remaining findings are reported. Stdin is only checked, unless `--fix`
//! is given, which prints the corrected source to stdout instead.
//!
//! Options:
//!   --fix, -f    With stdin: print the corrected source, report nothing
//!   --human, -H  Findings grouped per file instead of one line each
//!
//! Exit code is 1 when any error-severity finding remains.

use netidl::lint::{lint, lint_fix, LintMessage, LintRule, Severity};
use std::io::{self, Read, Write};

fn rule_name(rule: LintRule) -> &'static str {
    match rule {
        LintRule::IndentationTabsOnly => "indentation-tabs-only",
        LintRule::IndentationDepth => "indentation-depth",
        LintRule::OneDeclPerLine => "one-decl-per-line",
        LintRule::ClosingBraceAlone => "closing-brace-alone",
        LintRule::NoTrailingWhitespace => "no-trailing-whitespace",
    }
}

fn severity_name(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

/// Running totals across all inputs; decides the summary line and the exit
/// code.
#[derive(Default)]
struct Summary {
    errors: usize,
    warnings: usize,
}

impl Summary {
    fn absorb(&mut self, messages: &[LintMessage]) {
        for m in messages {
            match m.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
            }
        }
    }
}

fn report(label: &str, messages: &[LintMessage], human: bool) {
    if messages.is_empty() {
        return;
    }
    if human {
        println!("{}:", label);
        for m in messages {
            println!(
                "  line {}, col {}: {} ({}, {})",
                m.line,
                m.column,
                m.message,
                severity_name(m.severity),
                rule_name(m.rule)
            );
        }
    } else {
        for m in messages {
            println!(
                "{}:{}:{}: {}: {} [{}]",
                label,
                m.line,
                m.column,
                severity_name(m.severity),
                m.message,
                rule_name(m.rule)
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    let mut fix = false;
    let mut human = false;
    let mut files: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--fix" | "-f" => fix = true,
            "--human" | "-H" => human = true,
            other if other.starts_with('-') => anyhow::bail!("unknown option '{}'", other),
            _ => files.push(arg),
        }
    }

    let mut summary = Summary::default();

    if files.is_empty() {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        if fix {
            io::stdout().write_all(lint_fix(&src).as_bytes())?;
            return Ok(());
        }
        let messages = lint(&src);
        report("<stdin>", &messages, human);
        summary.absorb(&messages);
    } else {
        for path in &files {
            let src = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    summary.errors += 1;
                    continue;
                }
            };
            let fixed = lint_fix(&src);
            if fixed != src {
                if let Err(e) = std::fs::write(path, &fixed) {
                    eprintln!("{}: write failed: {}", path, e);
                    summary.errors += 1;
                    continue;
                }
                eprintln!("{}: rewritten", path);
            }
            // Report against the rewritten source; the fix is layout-only,
            // so whatever remains needs a human.
            let messages = lint(&fixed);
            report(path, &messages, human);
            summary.absorb(&messages);
        }
    }

    if summary.errors > 0 || summary.warnings > 0 {
        eprintln!(
            "lint: {} error(s), {} warning(s)",
            summary.errors, summary.warnings
        );
    }
    if summary.errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
