//! Pretty-print a declaration tree for inspection.
//!
//! Mirrors the shape the parser builds: one bracketed block per node,
//! children indented. Meant for debugging schemas and for the `netidlc
//! --dump-tree` flag, not for machine consumption.

use crate::ast::{NodeId, NodeKind, Tree};

/// Render `tree` as an indented listing.
pub fn dump_tree(tree: &Tree) -> String {
    let mut out = String::new();
    dump_node(tree, tree.root(), 0, &mut out);
    out
}

fn pad(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn line(out: &mut String, level: usize, text: &str) {
    pad(out, level);
    out.push_str(text);
    out.push('\n');
}

fn dump_children(tree: &Tree, children: &[NodeId], level: usize, out: &mut String) {
    line(out, level, "children:");
    for &child in children {
        dump_node(tree, child, level + 1, out);
    }
}

fn dump_node(tree: &Tree, id: NodeId, level: usize, out: &mut String) {
    let node = tree.node(id);
    line(out, level, &format!("[{}", node.kind.tag()));
    let level = level + 1;
    match &node.kind {
        NodeKind::Root { children } => {
            dump_children(tree, children, level, out);
        }
        NodeKind::Namespace { name, children } => {
            line(out, level, &format!("name: '{}'", name));
            dump_children(tree, children, level, out);
        }
        NodeKind::Typedef { name, ty } => {
            line(out, level, &format!("name: '{}'", name));
            line(out, level, &format!("type: '{}'", ty));
        }
        NodeKind::Enum { name, values } => {
            line(out, level, &format!("name: '{}'", name));
            line(out, level, "values:");
            for value in values {
                line(out, level + 1, &format!("'{}'", value));
            }
        }
        NodeKind::Message {
            name,
            inherits,
            children,
        }
        | NodeKind::Base {
            name,
            inherits,
            children,
        }
        | NodeKind::List {
            name,
            inherits,
            children,
        } => {
            line(out, level, &format!("name: '{}'", name));
            line(out, level, "inherits:");
            for base in inherits {
                line(out, level + 1, &format!("'{}'", base));
            }
            dump_children(tree, children, level, out);
        }
        NodeKind::Var { name, ty, arr_len } => {
            line(out, level, &format!("name: '{}'", name));
            line(out, level, &format!("type: '{}'", ty));
            if let Some(len) = arr_len {
                line(out, level, &format!("arrlen: '{}'", len));
            }
        }
    }
    line(out, level - 1, "]");
}
