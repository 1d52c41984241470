//! Scoped symbol tables built by the tag resolver.

use crate::helpers::Symbol;
use crate::syntax::NodeId;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Index of a table in the [`TableArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(u32);

/// The kind of tag a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Identifier,
    Indicant,
    Operator,
    Priority,
    Label,
}

/// One declared name: identifier, indicant, operator, priority or label.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: Symbol,
    /// Defining node; `None` for tags of the standard environment.
    pub node: Option<NodeId>,
    /// Numeric priority, for operator and priority tags.
    pub priority: i32,
    /// Labels local to a serial clause cannot be jumped to from outside.
    pub local_label: bool,
}

/// A per-scope symbol table. `previous` chains to the lexically enclosing
/// scope; the chain is traversed independently of node nesting.
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub previous: Option<TableId>,
    pub identifiers: Vec<Tag>,
    pub indicants: Vec<Tag>,
    pub operators: Vec<Tag>,
    pub priorities: Vec<Tag>,
    pub labels: Vec<Tag>,
}

/// Arena of all symbol tables created during one compilation.
#[derive(Debug, Default)]
pub struct TableArena {
    tables: Vec<SymbolTable>,
}

impl TableArena {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, previous: Option<TableId>) -> TableId {
        let id = TableId(self.tables.len() as u32);
        self.tables.push(SymbolTable {
            previous,
            ..Default::default()
        });
        id
    }

    pub fn get(&self, id: TableId) -> &SymbolTable {
        &self.tables[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: TableId) -> &mut SymbolTable {
        &mut self.tables[id.0 as usize]
    }

    fn category(&self, id: TableId, kind: TagKind) -> &[Tag] {
        let table = self.get(id);
        match kind {
            TagKind::Identifier => &table.identifiers,
            TagKind::Indicant => &table.indicants,
            TagKind::Operator => &table.operators,
            TagKind::Priority => &table.priorities,
            TagKind::Label => &table.labels,
        }
    }

    /// Insert a tag. Returns `false` when the name is already declared in
    /// this table's category (a redefinition).
    pub fn insert(&mut self, id: TableId, kind: TagKind, tag: Tag) -> bool {
        if self.category(id, kind).iter().any(|t| t.name == tag.name) {
            return false;
        }

        let table = self.get_mut(id);
        match kind {
            TagKind::Identifier => table.identifiers.push(tag),
            TagKind::Indicant => table.indicants.push(tag),
            TagKind::Operator => table.operators.push(tag),
            TagKind::Priority => table.priorities.push(tag),
            TagKind::Label => table.labels.push(tag),
        }

        true
    }

    /// Search this table and its enclosing chain for a tag.
    pub fn find(&self, mut id: TableId, kind: TagKind, name: Symbol) -> Option<&Tag> {
        loop {
            if let Some(tag) = self.category(id, kind).iter().find(|t| t.name == name) {
                return Some(tag);
            }

            id = self.get(id).previous?;
        }
    }
}

lazy_static! {
    /// Default dyadic operator priorities from the standard environment.
    /// A `PRIO` declaration in scope overrides these.
    pub static ref STANDARD_PRIORITIES: HashMap<&'static str, i32> = {
        let mut map = HashMap::new();

        for op in ["+*", "I"] {
            map.insert(op, 9);
        }
        for op in ["**", "^", "UP", "SHL", "SHR", "LWB", "UPB"] {
            map.insert(op, 8);
        }
        for op in ["*", "/", "%", "OVER", "MOD", "%*", "ELEM"] {
            map.insert(op, 7);
        }
        for op in ["+", "-"] {
            map.insert(op, 6);
        }
        for op in ["<", "<=", ">", ">=", "LT", "LE", "GT", "GE"] {
            map.insert(op, 5);
        }
        for op in ["=", "/=", "EQ", "NE"] {
            map.insert(op, 4);
        }
        for op in ["AND", "&"] {
            map.insert(op, 3);
        }
        map.insert("OR", 2);
        for op in [
            "+:=", "-:=", "*:=", "/:=", "%:=", "%*:=", "+=:", "PLUSAB", "MINUSAB", "TIMESAB",
            "DIVAB", "OVERAB", "MODAB", "PLUSTO",
        ] {
            map.insert(op, 1);
        }

        map
    };
}

/// The lowest and highest dyadic priorities the reducer scans between.
pub const MIN_PRIORITY: i32 = 1;
/// See [`MIN_PRIORITY`].
pub const MAX_PRIORITY: i32 = 9;
