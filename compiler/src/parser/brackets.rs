//! Validation of paired delimiters before any structural work.
//!
//! A single recursive pass confirms that every opener meets its matching
//! closer. On failure the whole remaining list is scanned once more to count
//! the imbalance of every delimiter kind, so one diagnostic can name every
//! unmatched kind instead of only the first.

use crate::syntax::{Attribute, NodeId};
use crate::{Context, FatalError};
use itertools::Itertools;

/// Check that all paired delimiters balance. Fatal on the first structural
/// failure; nothing deeper is worth doing over unbalanced input.
pub fn check(context: &Context, tokens: NodeId) -> Result<(), FatalError> {
    match descend(context, Some(tokens), None, 0) {
        Ok(_) => Ok(()),
        Err(Mismatch::TooDeep) => Err(FatalError::Resource),
        Err(Mismatch::At { node, expected }) => Err(report(context, tokens, node, expected)),
    }
}

enum Mismatch {
    At {
        /// The offending token, or `None` at end of input.
        node: Option<NodeId>,
        expected: Option<Attribute>,
    },
    TooDeep,
}

/// Walk a sibling run; recurse at openers. Returns the token after the
/// matching closer when `expect` is satisfied.
fn descend(
    context: &Context,
    mut current: Option<NodeId>,
    expect: Option<Attribute>,
    depth: usize,
) -> Result<Option<NodeId>, Mismatch> {
    if depth > super::MAX_DEPTH {
        return Err(Mismatch::TooDeep);
    }

    while let Some(id) = current {
        let attribute = context.arena.attribute(id);

        if attribute == Attribute::FormatDelimiterSymbol {
            if expect == Some(Attribute::FormatDelimiterSymbol) {
                return Ok(context.arena.next(id));
            }
            current = descend(
                context,
                context.arena.next(id),
                Some(Attribute::FormatDelimiterSymbol),
                depth + 1,
            )?;
        } else if let Some(closer) = attribute.matching_closer() {
            current = descend(context, context.arena.next(id), Some(closer), depth + 1)?;
        } else if attribute.is_closer() {
            if expect == Some(attribute) {
                return Ok(context.arena.next(id));
            }
            return Err(Mismatch::At {
                node: Some(id),
                expected: expect,
            });
        } else {
            current = context.arena.next(id);
        }
    }

    if expect.is_some() {
        return Err(Mismatch::At {
            node: None,
            expected: expect,
        });
    }

    Ok(None)
}

const PAIRS: &[(Attribute, Attribute, &str, &str)] = &[
    (Attribute::BeginSymbol, Attribute::EndSymbol, "BEGIN", "END"),
    (Attribute::OpenSymbol, Attribute::CloseSymbol, "(", ")"),
    (Attribute::SubSymbol, Attribute::BusSymbol, "[", "]"),
    (Attribute::AccoSymbol, Attribute::OccaSymbol, "{", "}"),
    (Attribute::IfSymbol, Attribute::FiSymbol, "IF", "FI"),
    (Attribute::CaseSymbol, Attribute::EsacSymbol, "CASE", "ESAC"),
    (Attribute::DoSymbol, Attribute::OdSymbol, "DO", "OD"),
    (
        Attribute::FormatOpenSymbol,
        Attribute::FormatCloseSymbol,
        "format (",
        "format )",
    ),
];

/// Count the global imbalance per delimiter kind and fold every unmatched
/// kind into one message.
fn report(
    context: &Context,
    tokens: NodeId,
    at: Option<NodeId>,
    expected: Option<Attribute>,
) -> FatalError {
    let mut counts = [0i32; 8];
    let mut formats = 0i32;

    for id in context.arena.siblings(Some(tokens)) {
        let attribute = context.arena.attribute(id);
        if attribute == Attribute::FormatDelimiterSymbol {
            formats += 1;
            continue;
        }
        for (index, (open, close, _, _)) in PAIRS.iter().enumerate() {
            if attribute == *open {
                counts[index] += 1;
            } else if attribute == *close {
                counts[index] -= 1;
            }
        }
    }

    let mut parts: Vec<String> = Vec::new();
    for (index, (_, _, open, close)) in PAIRS.iter().enumerate() {
        let count = counts[index];
        if count > 0 {
            parts.push(format!("{count} '{open}' without matching '{close}'"));
        } else if count < 0 {
            parts.push(format!("{} '{close}' without matching '{open}'", -count));
        }
    }
    if formats % 2 != 0 {
        parts.push("unpaired '$'".to_string());
    }

    let location = at
        .or(Some(tokens))
        .map(|id| context.arena.get(id).location);
    let path = location
        .map(|l| context.interner.resolve(l.path).to_string())
        .unwrap_or_default();

    let message = if parts.is_empty() {
        // Counts balance but nesting is wrong, e.g. `( [ ) ]`.
        let found = at
            .map(|id| describe(context, id))
            .unwrap_or_else(|| "end of program".to_string());
        match expected {
            Some(expect) => format!("'{expect}' expected but {found} found"),
            None => format!("unexpected {found}"),
        }
    } else {
        format!("unbalanced delimiters: {}", parts.iter().join(", "))
    };

    FatalError::Bracket { path, message }
}

fn describe(context: &Context, id: NodeId) -> String {
    let node = context.arena.get(id);
    match node.text {
        Some(text) => format!("'{}'", context.interner.resolve(text)),
        None => format!("'{}'", node.attribute),
    }
}
