//! Staged C++ code generation from a validated tree.
//!
//! The same message subtree is walked once per stage — members, accessors,
//! serialize body, deserialize body — so the generated class groups members
//! together, then methods, instead of interleaving per field. Traversal
//! order is declaration order, which is the wire order. Inherited bases are
//! composited in-line (their fields precede the direct fields); there is no
//! inheritance construct in the output.
//!
//! Each message consumes the next value of a monotonically increasing type
//! identifier counter, so identifier assignment is a deterministic function
//! of document order.

use std::fmt::{self, Write};

use crate::ast::{Kind, NodeId, NodeKind, Tree};

/// First message type identifier allocated.
pub const TYPE_ID_MIN: u16 = 0x0100;
/// Ceiling of the identifier space; allocation fails once the counter
/// reaches it.
pub const TYPE_ID_MAX: u16 = 0x03FF;

/// Generation pass selector. Each stage yields different output for the
/// same node, and most node kinds are only valid under some stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The outer walk: namespaces, enums, typedefs, message class shells.
    TopLevel,
    Members,
    Serialize,
    Deserialize,
    Accessors,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::TopLevel => "top-level",
            Stage::Members => "members",
            Stage::Serialize => "serialize",
            Stage::Deserialize => "deserialize",
            Stage::Accessors => "accessors",
        };
        f.write_str(name)
    }
}

/// Generation error. Fatal; no partial output contract is kept.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A node kind was visited under a stage it does not emit for. This is
    /// an enforced contract between the stage walks.
    #[error("line {line}: {kind} during incorrect stage ({stage})")]
    WrongStage {
        node: NodeId,
        line: u32,
        kind: Kind,
        stage: Stage,
    },
    #[error("line {line}: too many packets (all packet type ids have been used)")]
    TooManyPackets { node: NodeId, line: u32 },
    #[error("line {line}: could not find inherited base definition '{name}'")]
    MissingBase { node: NodeId, line: u32, name: String },
    #[error("writing output: {0}")]
    Fmt(#[from] fmt::Error),
}

fn var_member(name: &str) -> String {
    format!("__{}", name)
}

fn list_member(name: &str) -> String {
    format!("_v{}", name)
}

/// Staged code generator over a validated tree, writing to an abstract text
/// sink. One generator value is one run; the type-id counter lives in it,
/// so repeated runs from fresh generators are byte-identical.
pub struct Generator<'a, W: Write> {
    tree: &'a Tree,
    out: &'a mut W,
    tabs: usize,
    next_type_id: u16,
}

impl<'a, W: Write> Generator<'a, W> {
    pub fn new(tree: &'a Tree, out: &'a mut W) -> Self {
        Generator {
            tree,
            out,
            tabs: 0,
            next_type_id: TYPE_ID_MIN,
        }
    }

    /// Emit the whole compilation unit.
    pub fn generate(mut self) -> Result<(), GenError> {
        self.gen(self.tree.root(), Stage::TopLevel)
    }

    fn putln(&mut self, line: fmt::Arguments<'_>) -> Result<(), GenError> {
        for _ in 0..self.tabs {
            self.out.write_char('\t')?;
        }
        self.out.write_fmt(line)?;
        self.out.write_char('\n')?;
        Ok(())
    }

    fn wrong_stage(&self, id: NodeId, stage: Stage) -> GenError {
        let node = self.tree.node(id);
        GenError::WrongStage {
            node: id,
            line: node.line,
            kind: node.kind.tag(),
            stage,
        }
    }

    fn gen(&mut self, id: NodeId, stage: Stage) -> Result<(), GenError> {
        let tree = self.tree;
        match &tree.node(id).kind {
            NodeKind::Root { .. } => self.gen_root(id, stage),
            NodeKind::Namespace { name, .. } => self.gen_namespace(id, name, stage),
            NodeKind::Typedef { name, ty } => self.gen_typedef(id, name, ty, stage),
            NodeKind::Enum { name, values } => self.gen_enum(id, name, values, stage),
            NodeKind::Message { name, .. } => self.gen_message(id, name, stage),
            // Bases never emit on their own; they are composited by name
            // from whatever inherits them.
            NodeKind::Base { .. } => Ok(()),
            NodeKind::List { name, .. } => self.gen_list(id, name, stage),
            NodeKind::Var { name, ty, arr_len } => {
                self.gen_var(id, name, ty, arr_len.as_deref(), stage)
            }
        }
    }

    fn gen_children(&mut self, id: NodeId, stage: Stage) -> Result<(), GenError> {
        let tree = self.tree;
        for &child in tree.node(id).children() {
            self.gen(child, stage)?;
        }
        Ok(())
    }

    fn gen_root(&mut self, id: NodeId, stage: Stage) -> Result<(), GenError> {
        if stage != Stage::TopLevel {
            return Err(self.wrong_stage(id, stage));
        }
        self.putln(format_args!("namespace net {{"))?;
        self.tabs += 1;
        self.gen_children(id, stage)?;
        self.tabs -= 1;
        self.putln(format_args!("}};"))?;
        Ok(())
    }

    fn gen_namespace(&mut self, id: NodeId, name: &str, stage: Stage) -> Result<(), GenError> {
        if stage != Stage::TopLevel {
            return Err(self.wrong_stage(id, stage));
        }
        self.putln(format_args!("namespace {} {{", name))?;
        self.tabs += 1;
        self.gen_children(id, stage)?;
        self.tabs -= 1;
        self.putln(format_args!("}};"))?;
        Ok(())
    }

    fn gen_typedef(&mut self, id: NodeId, name: &str, ty: &str, stage: Stage) -> Result<(), GenError> {
        if stage != Stage::TopLevel {
            return Err(self.wrong_stage(id, stage));
        }
        self.putln(format_args!("typedef {} {};", ty, name))
    }

    fn gen_enum(
        &mut self,
        id: NodeId,
        name: &str,
        values: &[String],
        stage: Stage,
    ) -> Result<(), GenError> {
        if stage != Stage::TopLevel {
            return Err(self.wrong_stage(id, stage));
        }
        self.putln(format_args!("enum {} {{", name))?;
        self.tabs += 1;
        for (i, value) in values.iter().enumerate() {
            let sep = if i + 1 < values.len() { "," } else { "" };
            self.putln(format_args!("{}{}", value, sep))?;
        }
        self.tabs -= 1;
        self.putln(format_args!("}};"))?;
        Ok(())
    }

    fn gen_message(&mut self, id: NodeId, name: &str, stage: Stage) -> Result<(), GenError> {
        if stage != Stage::TopLevel {
            return Err(self.wrong_stage(id, stage));
        }
        self.putln(format_args!("class pak_{} : packet {{", name))?;
        self.tabs += 1;

        self.putln(format_args!("private:"))?;
        self.tabs += 1;
        self.gen_composite(id, Stage::Members)?;
        self.tabs -= 1;

        self.putln(format_args!("public:"))?;
        self.tabs += 1;
        self.gen_composite(id, Stage::Accessors)?;
        self.putln(format_args!(""))?;

        let type_id = self.next_type_id;
        if type_id >= TYPE_ID_MAX {
            return Err(GenError::TooManyPackets {
                node: id,
                line: self.tree.node(id).line,
            });
        }
        self.next_type_id += 1;
        self.putln(format_args!("static const uint16 type_id = 0x{:04x};", type_id))?;

        self.putln(format_args!("size_t serialize( char *data, int max_len ) const {{"))?;
        self.tabs += 1;
        self.putln(format_args!("size_t pos = 0;"))?;
        self.putln(format_args!("const pak_{}& vars = *this;", name))?;
        self.gen_composite(id, Stage::Serialize)?;
        self.putln(format_args!("return pos;"))?;
        self.tabs -= 1;
        self.putln(format_args!("}}"))?;

        self.putln(format_args!("void unserialize( char *data, int max_len ) {{"))?;
        self.tabs += 1;
        self.putln(format_args!("size_t pos = 0;"))?;
        self.putln(format_args!("pak_{}& vars = *this;", name))?;
        self.gen_composite(id, Stage::Deserialize)?;
        self.tabs -= 1;
        self.putln(format_args!("}}"))?;

        self.tabs -= 1;
        self.tabs -= 1;
        self.putln(format_args!("}};"))?;
        Ok(())
    }

    /// Composite expansion of a message, base or list body: inherited bases
    /// first (in declaration order), then direct children.
    fn gen_composite(&mut self, id: NodeId, stage: Stage) -> Result<(), GenError> {
        match stage {
            Stage::Members | Stage::Serialize | Stage::Deserialize | Stage::Accessors => {
                self.gen_inherits(id, stage)?;
                self.gen_children(id, stage)
            }
            Stage::TopLevel => Err(self.wrong_stage(id, stage)),
        }
    }

    fn gen_inherits(&mut self, id: NodeId, stage: Stage) -> Result<(), GenError> {
        let tree = self.tree;
        for name in tree.node(id).inherits() {
            let base = self.find_base(name, id).ok_or_else(|| GenError::MissingBase {
                node: id,
                line: tree.node(id).line,
                name: name.clone(),
            })?;
            self.gen_composite(base, stage)?;
        }
        Ok(())
    }

    /// Scope-chain lookup like the resolver's, except that only base
    /// declarations are composited — lists never are.
    fn find_base(&self, name: &str, start: NodeId) -> Option<NodeId> {
        let tree = self.tree;
        let mut scope = Some(start);
        while let Some(s) = scope {
            let node = tree.node(s);
            for &child in node.children() {
                let c = tree.node(child);
                if matches!(c.kind, NodeKind::Base { .. }) && c.name() == Some(name) {
                    return Some(child);
                }
            }
            scope = node.parent;
        }
        None
    }

    /// Name of the message whose generated class ultimately owns this list,
    /// if any. It gets befriended so the serializer can reach the value
    /// type's private members.
    fn enclosing_message(&self, id: NodeId) -> Option<&'a str> {
        let tree = self.tree;
        let mut scope = tree.node(id).parent;
        while let Some(s) = scope {
            let node = tree.node(s);
            if let NodeKind::Message { name, .. } = &node.kind {
                return Some(name);
            }
            scope = node.parent;
        }
        None
    }

    /// Fully-qualified element type of a (possibly nested) list: the chain
    /// of enclosing list names joined outer-to-inner with `::`.
    fn list_path(&self, id: NodeId) -> String {
        let tree = self.tree;
        let mut path = tree.node(id).name().unwrap_or_default().to_string();
        let mut scope = tree.node(id).parent;
        while let Some(s) = scope {
            let node = tree.node(s);
            match &node.kind {
                NodeKind::List { name, .. } => path = format!("{}::{}", name, path),
                _ => break,
            }
            scope = node.parent;
        }
        path
    }

    fn gen_list(&mut self, id: NodeId, name: &str, stage: Stage) -> Result<(), GenError> {
        match stage {
            Stage::Members => {
                self.putln(format_args!("class {} {{", name))?;
                self.tabs += 1;
                if let Some(owner) = self.enclosing_message(id) {
                    self.putln(format_args!("friend class pak_{};", owner))?;
                }
                self.putln(format_args!("private:"))?;
                self.tabs += 1;
                self.gen_composite(id, Stage::Members)?;
                self.tabs -= 1;
                self.putln(format_args!("public:"))?;
                self.tabs += 1;
                self.gen_composite(id, Stage::Accessors)?;
                self.tabs -= 1;
                self.tabs -= 1;
                self.putln(format_args!("}};"))?;
                self.putln(format_args!("std::vector<{}> {};", name, list_member(name)))?;
                Ok(())
            }
            Stage::Serialize => {
                let member = list_member(name);
                self.putln(format_args!(
                    "for( auto i = vars.{}.begin(); i != vars.{}.end(); ++i ) {{",
                    member, member
                ))?;
                self.tabs += 1;
                self.putln(format_args!("const {}& vars = *i;", self.list_path(id)))?;
                self.gen_composite(id, stage)?;
                self.tabs -= 1;
                self.putln(format_args!("}}"))?;
                Ok(())
            }
            Stage::Deserialize => {
                let member = list_member(name);
                self.putln(format_args!(
                    "for( auto i = vars.{}.begin(); i != vars.{}.end(); ++i ) {{",
                    member, member
                ))?;
                self.tabs += 1;
                self.putln(format_args!("{}& vars = *i;", self.list_path(id)))?;
                self.gen_composite(id, stage)?;
                self.tabs -= 1;
                self.putln(format_args!("}}"))?;
                Ok(())
            }
            // The repeated container is reached through the owning class;
            // no per-list accessors are generated.
            Stage::Accessors => Ok(()),
            Stage::TopLevel => Err(self.wrong_stage(id, stage)),
        }
    }

    fn gen_var(
        &mut self,
        id: NodeId,
        name: &str,
        ty: &str,
        arr_len: Option<&str>,
        stage: Stage,
    ) -> Result<(), GenError> {
        let member = var_member(name);
        match (stage, arr_len) {
            (Stage::Members, Some(len)) => {
                self.putln(format_args!("{} {}[{}];", ty, member, len))
            }
            (Stage::Members, None) => self.putln(format_args!("{} {};", ty, member)),
            (Stage::Serialize, Some(len)) => self.putln(format_args!(
                "::net::encoding::write_arr( vars.{}, {}, data, pos, max_len );",
                member, len
            )),
            (Stage::Serialize, None) => self.putln(format_args!(
                "::net::encoding::write( vars.{}, data, pos, max_len );",
                member
            )),
            (Stage::Deserialize, Some(len)) => self.putln(format_args!(
                "::net::encoding::read_arr( vars.{}, {}, data, pos, max_len );",
                member, len
            )),
            (Stage::Deserialize, None) => self.putln(format_args!(
                "::net::encoding::read( vars.{}, data, pos, max_len );",
                member
            )),
            (Stage::Accessors, Some(_)) => {
                self.putln(format_args!(
                    "{} get_{}( int idx ) const {{ return {}[idx]; }}",
                    ty, name, member
                ))?;
                self.putln(format_args!(
                    "void set_{}( int idx, {} val ) {{ {}[idx] = val; }}",
                    name, ty, member
                ))
            }
            (Stage::Accessors, None) => {
                self.putln(format_args!(
                    "{} get_{}( ) const {{ return {}; }}",
                    ty, name, member
                ))?;
                self.putln(format_args!(
                    "void set_{}( {} val ) {{ {} = val; }}",
                    name, ty, member
                ))
            }
            (Stage::TopLevel, _) => Err(self.wrong_stage(id, stage)),
        }
    }
}
