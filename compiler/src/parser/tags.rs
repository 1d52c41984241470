//! The two-pass, per-scope symbol table builder.
//!
//! Before a scope's phrase is reduced, this pass scans that scope (and only
//! that scope) for MODE, PRIO, OP, label, identity and variable declarations,
//! inserting tags into a fresh table chained to the enclosing one and
//! reattributing each defining occurrence. Only then can a later bare bold
//! word be classified as an indicant or an operator; this is what makes
//! declare-after-use within a scope work.

use crate::syntax::{
    Attribute, NodeId, TableId, Tag, TagKind, MAX_PRIORITY, MIN_PRIORITY, STANDARD_PRIORITIES,
};
use crate::Context;

use super::error_at;

/// Build the root table holding the standard environment: default operator
/// priorities and the standard operator tags bold words can resolve to.
pub fn standard_environment(context: &mut Context) -> TableId {
    let table = context.tables.add(None);

    for (&name, &priority) in STANDARD_PRIORITIES.iter() {
        let symbol = context.interner.intern(name);
        context.tables.insert(
            table,
            TagKind::Priority,
            Tag {
                name: symbol,
                node: None,
                priority,
                local_label: false,
            },
        );

        if name.chars().all(|c| c.is_ascii_uppercase()) {
            context.tables.insert(
                table,
                TagKind::Operator,
                Tag {
                    name: symbol,
                    node: None,
                    priority,
                    local_label: false,
                },
            );
        }
    }

    for &name in crate::lexer::keywords::STANDARD_MONADS {
        let symbol = context.interner.intern(name);
        context.tables.insert(
            table,
            TagKind::Operator,
            Tag {
                name: symbol,
                node: None,
                priority: 0,
                local_label: false,
            },
        );
    }

    table
}

/// Run the declaration pre-pass over the level under `parent`, filling
/// `table` and reattributing defining occurrences, then classify the bold
/// words of the level.
pub fn resolve_scope(context: &mut Context, table: TableId, parent: NodeId) {
    extract_indicants(context, table, parent);
    extract_priorities(context, table, parent);
    extract_operators(context, table, parent);
    classify(context, table, parent);
    extract_labels(context, table, parent);
    extract_identifiers(context, table, parent);
}

/// Classify every bare bold word of the level through the table chain. Once
/// attributed as indicant or operator a word is never re-classified.
pub fn classify(context: &mut Context, table: TableId, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        let node = context.arena.get(id);
        if node.attribute != Attribute::BoldTag {
            continue;
        }
        let name = node.text.expect("bold words carry text");
        let location = node.location;

        if context.tables.find(table, TagKind::Indicant, name).is_some() {
            context.arena.set_attribute(id, Attribute::Indicant);
        } else if context.tables.find(table, TagKind::Operator, name).is_some() {
            context.arena.set_attribute(id, Attribute::Operator);
        } else {
            let text = context.interner.resolve(name).to_string();
            error_at(context, location, format!("'{text}' has not been declared"));
        }
    }
}

fn attribute_of(context: &Context, id: Option<NodeId>) -> Option<Attribute> {
    id.map(|id| context.arena.attribute(id))
}

fn insert(context: &mut Context, table: TableId, kind: TagKind, id: NodeId, priority: i32) {
    let node = context.arena.get(id);
    let name = node.text.expect("defining occurrences carry text");
    let location = node.location;

    let added = context.tables.insert(
        table,
        kind,
        Tag {
            name,
            node: Some(id),
            priority,
            local_label: false,
        },
    );

    if !added {
        let text = context.interner.resolve(name).to_string();
        error_at(context, location, format!("multiple declaration of '{text}'"));
    }
}

/// `MODE a = ..., b = ...` lists: register each defining indicant.
fn extract_indicants(context: &mut Context, table: TableId, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);
        if context.arena.attribute(id) != Attribute::ModeSymbol {
            continue;
        }

        let mut entry = context.arena.next(id);
        while let Some(name_id) = entry {
            if context.arena.attribute(name_id) != Attribute::BoldTag {
                break;
            }
            let equals = context.arena.next(name_id);
            if attribute_of(context, equals) != Some(Attribute::EqualsSymbol) {
                break;
            }

            insert(context, table, TagKind::Indicant, name_id, 0);
            context
                .arena
                .set_attribute(name_id, Attribute::DefiningIndicant);

            entry = list_continuation(context, equals.expect("checked above"));
        }
    }
}

/// Scan past a declaration's source for a comma continuing the list. Returns
/// the token after the comma, or `None` at the end of the declaration.
fn list_continuation(context: &Context, from: NodeId) -> Option<NodeId> {
    let mut scan = context.arena.next(from);

    while let Some(id) = scan {
        match context.arena.attribute(id) {
            Attribute::CommaSymbol => return context.arena.next(id),
            Attribute::GoOnSymbol | Attribute::ExitSymbol | Attribute::PointSymbol => return None,
            _ => scan = context.arena.next(id),
        }
    }

    None
}

/// `PRIO op = digit` lists: register priorities, validating the range.
fn extract_priorities(context: &mut Context, table: TableId, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);
        if context.arena.attribute(id) != Attribute::PrioSymbol {
            continue;
        }

        let mut entry = context.arena.next(id);
        while let Some(name_id) = entry {
            if !matches!(
                context.arena.attribute(name_id),
                Attribute::BoldTag | Attribute::Operator
            ) {
                break;
            }
            let equals = context.arena.next(name_id);
            if attribute_of(context, equals) != Some(Attribute::EqualsSymbol) {
                break;
            }
            let value_id = context.arena.next(equals.expect("checked above"));
            if attribute_of(context, value_id) != Some(Attribute::IntDenotation) {
                break;
            }
            let value_id = value_id.expect("checked above");

            let value_node = context.arena.get(value_id);
            let text = value_node
                .text
                .map(|t| context.interner.resolve(t).to_string())
                .unwrap_or_default();
            let location = value_node.location;

            match text.parse::<i32>() {
                Ok(priority) if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) => {
                    insert(context, table, TagKind::Priority, name_id, priority);
                }
                _ => {
                    error_at(
                        context,
                        location,
                        format!(
                            "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}, not '{text}'"
                        ),
                    );
                }
            }
            context
                .arena
                .set_attribute(name_id, Attribute::DefiningOperator);

            entry = list_continuation(context, value_id);
        }
    }
}

/// `OP ... = ...` declarations: the tag directly before the first `=` after
/// `OP` is the defining operator, whether or not a plan precedes it.
fn extract_operators(context: &mut Context, table: TableId, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);
        if context.arena.attribute(id) != Attribute::OpSymbol {
            continue;
        }

        let mut equals = find_equals(context, context.arena.next(id));
        while let Some(eq) = equals {
            let Some(name_id) = context.arena.prev(eq) else { break };
            if !matches!(
                context.arena.attribute(name_id),
                Attribute::BoldTag | Attribute::Operator
            ) {
                break;
            }

            insert(context, table, TagKind::Operator, name_id, 0);
            context
                .arena
                .set_attribute(name_id, Attribute::DefiningOperator);

            equals = list_continuation(context, eq)
                .and_then(|after_comma| find_equals(context, Some(after_comma)));
        }
    }
}

/// The first `=` before the end of the current declaration, if any.
fn find_equals(context: &Context, from: Option<NodeId>) -> Option<NodeId> {
    let mut scan = from;

    while let Some(id) = scan {
        match context.arena.attribute(id) {
            Attribute::EqualsSymbol => return Some(id),
            Attribute::GoOnSymbol | Attribute::ExitSymbol | Attribute::PointSymbol => return None,
            _ => scan = context.arena.next(id),
        }
    }

    None
}

/// Attributes that may stand directly before a label at the start of a unit.
const LABEL_CONTEXT: &[Attribute] = &[
    Attribute::GoOnSymbol,
    Attribute::ExitSymbol,
    Attribute::ColonSymbol,
    Attribute::BeginSymbol,
    Attribute::OpenSymbol,
    Attribute::ThenSymbol,
    Attribute::ElseSymbol,
    Attribute::DoSymbol,
    Attribute::InSymbol,
    Attribute::OuseSymbol,
    Attribute::OutSymbol,
];

/// `identifier :` at the start of a unit declares a label.
fn extract_labels(context: &mut Context, table: TableId, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        if context.arena.attribute(id) != Attribute::Identifier {
            continue;
        }
        if attribute_of(context, context.arena.next(id)) != Some(Attribute::ColonSymbol) {
            continue;
        }
        let before = context.arena.prev(id);
        let at_unit_start = match attribute_of(context, before) {
            None => true,
            Some(attribute) => LABEL_CONTEXT.contains(&attribute),
        };
        if !at_unit_start {
            continue;
        }

        insert(context, table, TagKind::Label, id, 0);
        context.arena.set_attribute(id, Attribute::Label);
    }
}

fn is_declarer_start(attribute: Attribute) -> bool {
    attribute.is_standard_mode()
        || matches!(
            attribute,
            Attribute::LongSymbol
                | Attribute::ShortSymbol
                | Attribute::RefSymbol
                | Attribute::FlexSymbol
                | Attribute::StructSymbol
                | Attribute::UnionSymbol
                | Attribute::ProcSymbol
                | Attribute::Indicant
                | Attribute::Bounds
        )
}

/// The token after a run of declarer material starting at `from`, or `None`
/// when the run reaches the end of the level. A bracketed enclosure counts as
/// declarer material only directly after STRUCT, UNION or PROC.
fn skip_declarer(context: &Context, from: NodeId) -> Option<NodeId> {
    let mut last: Option<Attribute> = None;
    let mut cursor = from;

    loop {
        let attribute = context.arena.attribute(cursor);
        let consumes = match attribute {
            Attribute::LongSymbol
            | Attribute::ShortSymbol
            | Attribute::RefSymbol
            | Attribute::FlexSymbol
            | Attribute::Bounds
            | Attribute::Indicant
            | Attribute::StructSymbol
            | Attribute::UnionSymbol
            | Attribute::ProcSymbol => true,
            Attribute::EnclosedClause => matches!(
                last,
                Some(Attribute::StructSymbol | Attribute::UnionSymbol | Attribute::ProcSymbol)
            ),
            a => a.is_standard_mode(),
        };

        if !consumes {
            return Some(cursor);
        }

        last = Some(attribute);
        cursor = context.arena.next(cursor)?;
    }
}

/// Identity (`x = e`), variable (`x := e` / bare `x`) and procedure
/// declarations: a declarer followed by an identifier defines that
/// identifier. Comma-continued lists may mix identity and variable forms
/// only lexically; each defining occurrence is registered the same way.
fn extract_identifiers(context: &mut Context, table: TableId, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        if !is_declarer_start(context.arena.attribute(id)) {
            continue;
        }
        let Some(name_id) = skip_declarer(context, id) else {
            continue;
        };
        if name_id == id || context.arena.attribute(name_id) != Attribute::Identifier {
            continue;
        }

        let mut defining = Some(name_id);
        while let Some(name_id) = defining {
            if context.arena.attribute(name_id) != Attribute::Identifier {
                break;
            }

            let following = attribute_of(context, context.arena.next(name_id));
            let defines = matches!(
                following,
                None | Some(
                    Attribute::EqualsSymbol
                        | Attribute::AssignSymbol
                        | Attribute::CommaSymbol
                        | Attribute::GoOnSymbol
                        | Attribute::ExitSymbol
                )
            );
            if !defines {
                break;
            }

            insert(context, table, TagKind::Identifier, name_id, 0);
            context
                .arena
                .set_attribute(name_id, Attribute::DefiningIdentifier);

            defining = list_continuation(context, name_id);
        }
    }
}
