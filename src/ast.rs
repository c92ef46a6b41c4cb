//! Declaration tree for the schema language.
//!
//! Nodes live in an arena addressed by stable [`NodeId`]s. Each non-root node
//! keeps a non-owning parent index used only for scope-chain lookups;
//! containers own an ordered list of child ids. Child order is preserved
//! everywhere: it is the field order, the serialization order and the enum
//! constant order.

use std::fmt;

/// Stable index of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fieldless discriminant of [`NodeKind`], used for containment rules and
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Root,
    Namespace,
    Typedef,
    Enum,
    Message,
    Base,
    List,
    Var,
}

impl Kind {
    /// Message, base and list declarations can name inherited field groups.
    pub fn is_inheritable(self) -> bool {
        matches!(self, Kind::Message | Kind::Base | Kind::List)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Root => "root",
            Kind::Namespace => "namespace",
            Kind::Typedef => "typedef",
            Kind::Enum => "enum",
            Kind::Message => "message",
            Kind::Base => "base",
            Kind::List => "list",
            Kind::Var => "var",
        };
        f.write_str(name)
    }
}

/// One declaration. The set of kinds is closed; parser, resolver and
/// generator all dispatch on it with exhaustive matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level scope of the compilation unit.
    Root { children: Vec<NodeId> },
    /// Named scope, nests arbitrarily.
    Namespace { name: String, children: Vec<NodeId> },
    /// `@type underlying alias;`
    Typedef { name: String, ty: String },
    /// Value order determines the order of the emitted constants.
    Enum { name: String, values: Vec<String> },
    /// Independently serializable packet type; receives a type id.
    Message {
        name: String,
        inherits: Vec<String>,
        children: Vec<NodeId>,
    },
    /// Reusable field group, only ever composited into whatever inherits it.
    Base {
        name: String,
        inherits: Vec<String>,
        children: Vec<NodeId>,
    },
    /// Named repeated substructure; nestable and itself inheritable.
    List {
        name: String,
        inherits: Vec<String>,
        children: Vec<NodeId>,
    },
    /// Field declaration. `arr_len` is opaque literal text, never evaluated.
    Var {
        name: String,
        ty: String,
        arr_len: Option<String>,
    },
}

impl NodeKind {
    pub fn tag(&self) -> Kind {
        match self {
            NodeKind::Root { .. } => Kind::Root,
            NodeKind::Namespace { .. } => Kind::Namespace,
            NodeKind::Typedef { .. } => Kind::Typedef,
            NodeKind::Enum { .. } => Kind::Enum,
            NodeKind::Message { .. } => Kind::Message,
            NodeKind::Base { .. } => Kind::Base,
            NodeKind::List { .. } => Kind::List,
            NodeKind::Var { .. } => Kind::Var,
        }
    }
}

/// A declaration node: source line, owning container, payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub line: u32,
    /// Non-owning back-reference, used only for scope-chain lookups.
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Root { .. } => None,
            NodeKind::Namespace { name, .. }
            | NodeKind::Typedef { name, .. }
            | NodeKind::Enum { name, .. }
            | NodeKind::Message { name, .. }
            | NodeKind::Base { name, .. }
            | NodeKind::List { name, .. }
            | NodeKind::Var { name, .. } => Some(name),
        }
    }

    /// Ordered children; empty for leaf kinds.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Root { children }
            | NodeKind::Namespace { children, .. }
            | NodeKind::Message { children, .. }
            | NodeKind::Base { children, .. }
            | NodeKind::List { children, .. } => children,
            NodeKind::Typedef { .. } | NodeKind::Enum { .. } | NodeKind::Var { .. } => &[],
        }
    }

    /// Inherited base names in declaration order; empty for kinds that
    /// cannot inherit.
    pub fn inherits(&self) -> &[String] {
        match &self.kind {
            NodeKind::Message { inherits, .. }
            | NodeKind::Base { inherits, .. }
            | NodeKind::List { inherits, .. } => inherits,
            _ => &[],
        }
    }
}

/// Arena of declaration nodes. The root is allocated on construction and the
/// tree only ever grows; nothing is mutated once the parser is done.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node {
                line: 0,
                parent: None,
                kind: NodeKind::Root {
                    children: Vec::new(),
                },
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the root always exists
    }

    /// Allocate a node under `parent`. The child is not linked into the
    /// parent's child list until [`Tree::attach`].
    pub fn alloc(&mut self, line: u32, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            line,
            parent: Some(parent),
            kind,
        });
        id
    }

    /// Append `child` to `parent`'s ordered child list. Leaf kinds carry no
    /// child list; attaching under one is ignored.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        match &mut self.nodes[parent.index()].kind {
            NodeKind::Root { children }
            | NodeKind::Namespace { children, .. }
            | NodeKind::Message { children, .. }
            | NodeKind::Base { children, .. }
            | NodeKind::List { children, .. } => children.push(child),
            NodeKind::Typedef { .. } | NodeKind::Enum { .. } | NodeKind::Var { .. } => {}
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}
