//! Style linter for schema source files.
//!
//! ## Rules
//!
//! - **Indentation**: one tab per depth level, no spaces. Depth increases
//!   after `{`; a closing `}` sits one level shallower than the body.
//! - **One declaration per line**: at most one `;` per line.
//! - **Closing brace alone**: a `}` line must contain nothing but `};`
//!   (or a bare `}`) besides indentation.
//! - **No trailing whitespace**.
//!
//! The linter is purely lexical — it never parses the schema — so it also
//! runs on files the compiler rejects. `//` comments are ignored by every
//! rule except trailing whitespace.

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    /// Indentation must use tabs only (no spaces).
    IndentationTabsOnly,
    /// Indentation must be exactly N tabs at depth N.
    IndentationDepth,
    /// At most one declaration (one `;` terminator) per line.
    OneDeclPerLine,
    /// Closing `}` should be alone on its line (as `};` or `}`).
    ClosingBraceAlone,
    /// Trailing whitespace is not allowed.
    NoTrailingWhitespace,
}

/// A single lint message with location.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub line: usize,
    pub column: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => line[..i].trim_end(),
        None => line,
    }
}

/// Run all lint rules on schema source. Returns messages in line order.
pub fn lint(source: &str) -> Vec<LintMessage> {
    let mut out = Vec::new();
    let mut depth: i32 = 0;

    for (i, line) in source.lines().enumerate() {
        let line_no = i + 1;

        if line != line.trim_end() {
            out.push(LintMessage {
                line: line_no,
                column: line.trim_end().len().max(1),
                rule: LintRule::NoTrailingWhitespace,
                severity: Severity::Warning,
                message: "trailing whitespace not allowed".to_string(),
            });
        }

        let trimmed = line.trim_start();
        let leading = &line[..line.len() - trimmed.len()];

        if leading.contains(' ') {
            out.push(LintMessage {
                line: line_no,
                column: 1,
                rule: LintRule::IndentationTabsOnly,
                severity: Severity::Error,
                message: "indentation must use tabs only (no spaces)".to_string(),
            });
        }

        let code = strip_comment(trimmed);

        // Content lines must sit at exactly `depth` tabs; a closing brace
        // sits one level shallower.
        if !code.is_empty() {
            let expected = if code.starts_with('}') {
                (depth - 1).max(0) as usize
            } else {
                depth.max(0) as usize
            };
            let tab_count = leading.chars().filter(|&c| c == '\t').count();
            if tab_count != expected {
                out.push(LintMessage {
                    line: line_no,
                    column: 1,
                    rule: LintRule::IndentationDepth,
                    severity: Severity::Error,
                    message: format!(
                        "expected {} tab(s) at this depth (found {})",
                        expected, tab_count
                    ),
                });
            }
        }

        let semicolons = code.matches(';').count();
        if semicolons > 1 {
            out.push(LintMessage {
                line: line_no,
                column: 1,
                rule: LintRule::OneDeclPerLine,
                severity: Severity::Error,
                message: format!("one declaration per line (found {} semicolons)", semicolons),
            });
        }

        if code.contains('}') && code != "};" && code != "}" {
            out.push(LintMessage {
                line: line_no,
                column: 1,
                rule: LintRule::ClosingBraceAlone,
                severity: Severity::Warning,
                message: "closing `}` should be alone on its line".to_string(),
            });
        }

        for c in code.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
        }
    }

    out
}

/// Rewrite schema source to satisfy the lint rules: tabs for indentation by
/// depth, one declaration per line, closing braces alone, no trailing
/// whitespace. Comments are kept on the line they ended up on.
pub fn lint_fix(source: &str) -> String {
    let mut depth: i32 = 0;
    let mut out_lines: Vec<String> = Vec::new();

    for raw in source.lines() {
        let trimmed = raw.trim();
        let (code, comment) = match trimmed.find("//") {
            Some(i) => (trimmed[..i].trim_end(), Some(trimmed[i..].trim_end())),
            None => (trimmed, None),
        };

        if code.is_empty() {
            match comment {
                Some(c) => {
                    let indent = "\t".repeat(depth.max(0) as usize);
                    out_lines.push(format!("{}{}", indent, c));
                }
                None => out_lines.push(String::new()),
            }
            continue;
        }

        // Re-split the code into one statement per line: each `;` and `{`
        // ends a line, each `}` starts one.
        let mut pieces: Vec<String> = Vec::new();
        let mut acc = String::new();
        for c in code.chars() {
            match c {
                ';' => {
                    acc.push(';');
                    pieces.push(std::mem::take(&mut acc).trim().to_string());
                }
                '{' => {
                    acc.push('{');
                    pieces.push(std::mem::take(&mut acc).trim().to_string());
                }
                '}' => {
                    let pending = std::mem::take(&mut acc).trim().to_string();
                    if !pending.is_empty() {
                        pieces.push(pending);
                    }
                    acc.push('}');
                }
                _ => acc.push(c),
            }
        }
        let pending = acc.trim().to_string();
        if !pending.is_empty() {
            pieces.push(pending);
        }

        let count = pieces.len();
        for (j, piece) in pieces.into_iter().enumerate() {
            let level = if piece.starts_with('}') {
                (depth - 1).max(0) as usize
            } else {
                depth.max(0) as usize
            };
            let indent = "\t".repeat(level);
            let suffix = match comment {
                Some(c) if j + 1 == count => format!("  {}", c),
                _ => String::new(),
            };
            out_lines.push(format!("{}{}{}", indent, piece, suffix));
            for c in piece.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
            }
        }
    }

    out_lines.join("\n") + "\n"
}
