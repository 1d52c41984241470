//! The syntax tree arena.
//!
//! Nodes live in a single arena and address each other by index, so the
//! in-place splicing the passes rely on (refinement substitution, reduction
//! folding) is a rewrite of a few index fields rather than pointer surgery.
//! Nodes are never freed; a fold makes the consumed run the `sub` of a new
//! node and unlinks it from its old siblings.

use crate::helpers::{Interner, Symbol};
use crate::syntax::{Attribute, TableId};

/// Index of a node in the [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

/// A source position. `line <= 0` marks synthetic prelude/postlude lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub path: Symbol,
    pub line: i32,
    pub column: u32,
}

/// One node of the tree. A node with a `sub` is a reduced non-terminal; a
/// node without one is a terminal token.
#[derive(Debug, Clone)]
pub struct Node {
    pub attribute: Attribute,
    pub text: Option<Symbol>,
    pub location: Location,
    pub sub: Option<NodeId>,
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub table: Option<TableId>,
}

/// Arena of all nodes created during one compilation.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, attribute: Attribute, text: Option<Symbol>, location: Location) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);

        self.nodes.push(Node {
            attribute,
            text,
            location,
            sub: None,
            next: None,
            prev: None,
            table: None,
        });

        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn attribute(&self, id: NodeId) -> Attribute {
        self.get(id).attribute
    }

    pub fn set_attribute(&mut self, id: NodeId, attribute: Attribute) {
        self.get_mut(id).attribute = attribute;
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).next
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).prev
    }

    pub fn sub(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).sub
    }

    /// Link `b` after `a` in the sibling list.
    pub fn link(&mut self, a: NodeId, b: NodeId) {
        self.get_mut(a).next = Some(b);
        self.get_mut(b).prev = Some(a);
    }

    /// Iterate a sibling run starting at `start`.
    pub fn siblings(&self, start: Option<NodeId>) -> Siblings<'_> {
        Siblings {
            arena: self,
            current: start,
        }
    }

    /// The last sibling of the run starting at `start`.
    pub fn last_sibling(&self, start: NodeId) -> NodeId {
        let mut current = start;
        while let Some(next) = self.next(current) {
            current = next;
        }
        current
    }

    /// Fold the inclusive sibling run `first ..= last` into a new node tagged
    /// `attribute`. The new node takes the run's place in the sibling list
    /// and the run becomes its `sub`. Returns the new node.
    ///
    /// The caller must re-anchor any head reference if `first` was the head
    /// of its level.
    pub fn fold(&mut self, first: NodeId, last: NodeId, attribute: Attribute) -> NodeId {
        let location = self.get(first).location;
        let before = self.get(first).prev;
        let after = self.get(last).next;

        let folded = self.add(attribute, None, location);
        self.get_mut(folded).sub = Some(first);
        self.get_mut(folded).prev = before;
        self.get_mut(folded).next = after;
        self.get_mut(folded).table = self.get(first).table;

        if let Some(before) = before {
            self.get_mut(before).next = Some(folded);
        }
        if let Some(after) = after {
            self.get_mut(after).prev = Some(folded);
        }

        self.get_mut(first).prev = None;
        self.get_mut(last).next = None;

        folded
    }

    /// Replace the single node `at` with the run `first ..= last`, in place.
    /// Used by refinement substitution; `at` is unlinked but kept alive.
    pub fn splice_over(&mut self, at: NodeId, first: NodeId, last: NodeId) {
        let before = self.get(at).prev;
        let after = self.get(at).next;

        self.get_mut(first).prev = before;
        self.get_mut(last).next = after;

        if let Some(before) = before {
            self.get_mut(before).next = Some(first);
        }
        if let Some(after) = after {
            self.get_mut(after).prev = Some(first);
        }

        self.get_mut(at).prev = None;
        self.get_mut(at).next = None;
    }

    /// Detach the inclusive run `first ..= last` from its sibling list,
    /// stitching its neighbours together. Returns the node that now occupies
    /// the position after the removed run, if any.
    pub fn cut(&mut self, first: NodeId, last: NodeId) -> Option<NodeId> {
        let before = self.get(first).prev;
        let after = self.get(last).next;

        if let Some(before) = before {
            self.get_mut(before).next = after;
        }
        if let Some(after) = after {
            self.get_mut(after).prev = before;
        }

        self.get_mut(first).prev = None;
        self.get_mut(last).next = None;

        after
    }

    /// Attach a symbol table to every node of the level starting at `start`
    /// (this level only, not nested ones).
    pub fn assign_table(&mut self, start: Option<NodeId>, table: TableId) {
        let mut current = start;
        while let Some(id) = current {
            self.get_mut(id).table = Some(table);
            current = self.next(id);
        }
    }

    /// Serialize a node and its descendants as JSON, for the CLI tree dump.
    pub fn to_json(&self, interner: &Interner, id: NodeId) -> serde_json::Value {
        let node = self.get(id);
        let mut object = serde_json::Map::new();

        object.insert(
            "attribute".to_string(),
            serde_json::to_value(node.attribute).expect("attributes serialize"),
        );
        if let Some(text) = node.text {
            object.insert(
                "text".to_string(),
                serde_json::Value::String(interner.resolve(text).to_string()),
            );
        }
        object.insert("line".to_string(), node.location.line.into());
        if node.sub.is_some() {
            let children: Vec<serde_json::Value> = self
                .siblings(node.sub)
                .map(|child| self.to_json(interner, child))
                .collect();
            object.insert("sub".to_string(), children.into());
        }

        serde_json::Value::Object(object)
    }

    /// Render a node and its descendants as a compact s-expression, for tests
    /// and the CLI tree dump.
    pub fn render(&self, interner: &Interner, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(interner, Some(id), &mut out);
        out
    }

    fn render_into(&self, interner: &Interner, start: Option<NodeId>, out: &mut String) {
        let mut current = start;

        while let Some(id) = current {
            if !out.is_empty() && !out.ends_with('(') {
                out.push(' ');
            }

            let node = self.get(id);
            match node.sub {
                Some(sub) => {
                    out.push('(');
                    out.push_str(&node.attribute.to_string());
                    self.render_into(interner, Some(sub), out);
                    out.push(')');
                }
                None => match node.text {
                    Some(text) => out.push_str(interner.resolve(text)),
                    None => out.push_str(&node.attribute.to_string()),
                },
            }

            current = node.next;
        }
    }
}

/// Iterator over a sibling run.
pub struct Siblings<'a> {
    arena: &'a NodeArena,
    current: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.arena.next(id);
        Some(id)
    }
}
