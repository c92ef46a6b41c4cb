//! Semantic validation of the declaration tree.
//!
//! Two orthogonal checks run in one recursive walk from the root:
//! containment (which kinds may appear inside which containers) and
//! inheritance (scope-chain name resolution, cycle detection, and rejection
//! of duplicate/diamond base inclusion). Validation is read-only and fails
//! fast: the first error aborts the whole pass.

use crate::ast::{Kind, NodeId, Tree};

/// Semantic error, naming the offending declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("line {line}: invalid {kind} location inside {container}")]
    Containment {
        node: NodeId,
        line: u32,
        kind: Kind,
        container: Kind,
    },
    #[error("line {line}: reference to non-existent base '{name}'")]
    UnknownBase { node: NodeId, line: u32, name: String },
    #[error("line {line}: '{name}' has a circular inheritance")]
    Cycle { node: NodeId, line: u32, name: String },
    #[error("line {line}: '{name}' includes base '{base}' more than once")]
    DuplicateBase {
        node: NodeId,
        line: u32,
        name: String,
        base: String,
    },
}

fn allowed_in(kind: Kind, container: Kind) -> bool {
    match container {
        Kind::Root | Kind::Namespace => matches!(
            kind,
            Kind::Typedef | Kind::Base | Kind::Message | Kind::Namespace | Kind::Enum
        ),
        Kind::Message | Kind::Base | Kind::List => matches!(kind, Kind::Var | Kind::List),
        Kind::Typedef | Kind::Enum | Kind::Var => false,
    }
}

/// Read-only validator over a parsed tree.
pub struct Resolver<'a> {
    tree: &'a Tree,
}

impl<'a> Resolver<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Resolver { tree }
    }

    /// Validate the whole tree.
    pub fn validate(&self) -> Result<(), ResolveError> {
        self.check(self.tree.root())
    }

    fn check(&self, id: NodeId) -> Result<(), ResolveError> {
        let node = self.tree.node(id);
        let container = node.kind.tag();
        if container.is_inheritable() {
            self.check_inherits(id)?;
        }
        for &child in node.children() {
            let child_node = self.tree.node(child);
            let kind = child_node.kind.tag();
            if !allowed_in(kind, container) {
                return Err(ResolveError::Containment {
                    node: child,
                    line: child_node.line,
                    kind,
                    container,
                });
            }
            self.check(child)?;
        }
        Ok(())
    }

    /// Resolve `name` against the lexical scope chain: the children of
    /// `start` itself first, then each enclosing container up to the root.
    /// Only base and list declarations participate in inheritance lookup.
    fn find_base(&self, name: &str, start: NodeId) -> Option<NodeId> {
        let mut scope = Some(start);
        while let Some(s) = scope {
            let node = self.tree.node(s);
            for &child in node.children() {
                let c = self.tree.node(child);
                if matches!(c.kind.tag(), Kind::Base | Kind::List) && c.name() == Some(name) {
                    return Some(child);
                }
            }
            scope = node.parent;
        }
        None
    }

    fn check_inherits(&self, id: NodeId) -> Result<(), ResolveError> {
        let node = self.tree.node(id);
        for name in node.inherits() {
            if self.find_base(name, id).is_none() {
                return Err(ResolveError::UnknownBase {
                    node: id,
                    line: node.line,
                    name: name.clone(),
                });
            }
        }

        let mut seen = Vec::new();
        let mut path = Vec::new();
        self.follow(id, id, &mut seen, &mut path)
    }

    /// Flatten the transitive inheritance closure of `origin`, depth first.
    /// `path` holds the names on the current descent (a revisit is a cycle);
    /// `seen` holds every name included anywhere in the closure (a second
    /// occurrence, even via a different path, is a diamond and is always
    /// rejected, never merged). A node's own nested lists are folded into
    /// the same closure before its inherit list — lists share the
    /// no-duplicate-ancestor namespace with explicit inheritance.
    ///
    /// Errors name `origin` (the node whose inherit clause is being
    /// checked), not the nested node where the problem was found.
    fn follow(
        &self,
        origin: NodeId,
        id: NodeId,
        seen: &mut Vec<String>,
        path: &mut Vec<String>,
    ) -> Result<(), ResolveError> {
        let node = self.tree.node(id);
        let name = node.name().unwrap_or_default().to_string();
        seen.push(name.clone());
        path.push(name);

        for &child in node.children() {
            if self.tree.node(child).kind.tag() == Kind::List {
                self.follow(origin, child, seen, path)?;
            }
        }

        for base in node.inherits() {
            if path.iter().any(|p| p == base) {
                let origin_node = self.tree.node(origin);
                return Err(ResolveError::Cycle {
                    node: origin,
                    line: origin_node.line,
                    name: origin_node.name().unwrap_or_default().to_string(),
                });
            }
            if seen.iter().any(|s| s == base) {
                let origin_node = self.tree.node(origin);
                return Err(ResolveError::DuplicateBase {
                    node: origin,
                    line: origin_node.line,
                    name: origin_node.name().unwrap_or_default().to_string(),
                    base: base.clone(),
                });
            }
            // Transitive names that fail to resolve are skipped here; every
            // node's own direct inherits are checked when it is visited.
            if let Some(target) = self.find_base(base, id) {
                self.follow(origin, target, seen, path)?;
            }
        }

        path.pop();
        Ok(())
    }
}
