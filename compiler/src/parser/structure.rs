//! Top-down structuring of the flat token list.
//!
//! The structurer carves the list along the delimiter boundaries that are
//! unambiguous before grammar reduction: bracketed enclosures, conditional
//! and case parts, loop parts, format texts. A `( ... )` run is wrapped as a
//! generic enclosed clause without deciding whether it is a closed clause, a
//! collateral clause or a cast; the bottom-up reducer settles that later.

use super::fold_level;
use crate::syntax::{Attribute, NodeId};
use crate::{Context, FatalError};

/// Wrap the token list under a `ParticularProgram` root and structure it.
pub fn build(context: &mut Context, tokens: NodeId) -> Result<NodeId, FatalError> {
    let location = context.arena.get(tokens).location;
    let root = context.arena.add(Attribute::ParticularProgram, None, location);
    context.arena.get_mut(root).sub = Some(tokens);

    structure_run(context, root, tokens, 0)?;

    Ok(root)
}

/// Structure the sibling run starting at `start`, then assemble loop parts
/// over the finished level.
fn structure_run(
    context: &mut Context,
    parent: NodeId,
    start: NodeId,
    depth: usize,
) -> Result<(), FatalError> {
    if depth > super::MAX_DEPTH {
        return Err(FatalError::Resource);
    }

    let mut current = Some(start);
    while let Some(id) = current {
        let attribute = context.arena.attribute(id);

        current = match attribute {
            Attribute::BeginSymbol | Attribute::OpenSymbol | Attribute::AccoSymbol => {
                enclosure(context, parent, id, Attribute::EnclosedClause, depth)?
            }
            Attribute::SubSymbol => enclosure(context, parent, id, Attribute::Bounds, depth)?,
            Attribute::IfSymbol => choice(
                context,
                parent,
                id,
                &[
                    (Attribute::ThenSymbol, Attribute::ThenPart),
                    (Attribute::ElifSymbol, Attribute::ElifPart),
                    (Attribute::ElseSymbol, Attribute::ElsePart),
                ],
                Attribute::FiSymbol,
                Attribute::IfPart,
                depth,
            )?,
            Attribute::CaseSymbol => choice(
                context,
                parent,
                id,
                &[
                    (Attribute::InSymbol, Attribute::InPart),
                    (Attribute::OuseSymbol, Attribute::OusePart),
                    (Attribute::OutSymbol, Attribute::OutPart),
                ],
                Attribute::EsacSymbol,
                Attribute::CasePart,
                depth,
            )?,
            Attribute::DoSymbol => do_part(context, parent, id, depth)?,
            Attribute::CodeSymbol => {
                // Code clause content is target code, opaque to the grammar.
                let close = expect(context, id, Attribute::EdocSymbol)?;
                let folded = fold_level(context, parent, id, close, Attribute::CodeClause);
                context.arena.next(folded)
            }
            Attribute::FormatDelimiterSymbol => format_text(context, parent, id, depth)?,
            _ => context.arena.next(id),
        };
    }

    loop_parts(context, parent);

    Ok(())
}

/// Fold an opener-to-closer region under one node and structure its inside.
fn enclosure(
    context: &mut Context,
    parent: NodeId,
    opener: NodeId,
    attribute: Attribute,
    depth: usize,
) -> Result<Option<NodeId>, FatalError> {
    let closer = context
        .arena
        .attribute(opener)
        .matching_closer()
        .expect("only called for openers");
    let close = expect(context, opener, closer)?;
    let folded = fold_level(context, parent, opener, close, attribute);

    if let Some(inner) = context.arena.next(opener) {
        if inner != close {
            structure_run(context, folded, inner, depth + 1)?;
        }
    }

    Ok(context.arena.next(folded))
}

/// Structure `IF ... FI` / `CASE ... ESAC` into part nodes followed by the
/// closing terminal, which stays a sibling for the reducer to consume.
#[allow(clippy::too_many_arguments)]
fn choice(
    context: &mut Context,
    parent: NodeId,
    opener: NodeId,
    dividers: &[(Attribute, Attribute)],
    closer: Attribute,
    first_part: Attribute,
    depth: usize,
) -> Result<Option<NodeId>, FatalError> {
    let mut targets: Vec<Attribute> = dividers.iter().map(|(symbol, _)| *symbol).collect();
    targets.push(closer);

    let mut segment_start = opener;
    let mut segment_attribute = first_part;

    loop {
        let boundary = scan_level(context, context.arena.next(segment_start), &targets)
            .ok_or_else(|| missing(context, opener, closer))?;
        let boundary_attribute = context.arena.attribute(boundary);

        let segment_end = context
            .arena
            .prev(boundary)
            .expect("boundary follows the segment start");
        let part = fold_level(context, parent, segment_start, segment_end, segment_attribute);
        if let Some(inner) = context.arena.next(context.arena.sub(part).expect("part has content"))
        {
            structure_run(context, part, inner, depth + 1)?;
        }

        if boundary_attribute == closer {
            return Ok(context.arena.next(boundary));
        }

        segment_attribute = dividers
            .iter()
            .find(|(symbol, _)| *symbol == boundary_attribute)
            .map(|(_, part)| *part)
            .expect("boundary is one of the scanned dividers");
        segment_start = boundary;
    }
}

/// Fold `DO ... OD` (closer inside), structure its content, then split a
/// trailing `UNTIL` enquiry into its own part.
fn do_part(
    context: &mut Context,
    parent: NodeId,
    opener: NodeId,
    depth: usize,
) -> Result<Option<NodeId>, FatalError> {
    let close = expect(context, opener, Attribute::OdSymbol)?;
    let folded = fold_level(context, parent, opener, close, Attribute::DoPart);

    if let Some(inner) = context.arena.next(opener) {
        if inner != close {
            structure_run(context, folded, inner, depth + 1)?;
        }
    }

    // The trailing UNTIL belongs to the nearest enclosing DO ... OD.
    let until = context
        .arena
        .siblings(context.arena.sub(folded))
        .find(|&id| context.arena.attribute(id) == Attribute::UntilSymbol);
    if let Some(until) = until {
        let last = context.arena.prev(close).expect("UNTIL precedes OD");
        fold_level(context, folded, until, last, Attribute::UntilPart);
    }

    Ok(context.arena.next(folded))
}

/// Fold `$ ... $` into a format text and structure collections and embedded
/// ordinary clauses inside it.
fn format_text(
    context: &mut Context,
    parent: NodeId,
    opener: NodeId,
    depth: usize,
) -> Result<Option<NodeId>, FatalError> {
    let close = scan_level(
        context,
        context.arena.next(opener),
        &[Attribute::FormatDelimiterSymbol],
    )
    .ok_or_else(|| missing(context, opener, Attribute::FormatDelimiterSymbol))?;

    let folded = fold_level(context, parent, opener, close, Attribute::FormatText);

    if let Some(inner) = context.arena.next(opener) {
        if inner != close {
            structure_format(context, folded, inner, depth + 1)?;
        }
    }

    Ok(context.arena.next(folded))
}

/// Structure the inside of a format text: `(`/`)` format frames become
/// collections, embedded dynamic-replicator clauses are structured in
/// ordinary mode.
fn structure_format(
    context: &mut Context,
    parent: NodeId,
    start: NodeId,
    depth: usize,
) -> Result<(), FatalError> {
    if depth > super::MAX_DEPTH {
        return Err(FatalError::Resource);
    }

    let mut current = Some(start);
    while let Some(id) = current {
        current = match context.arena.attribute(id) {
            Attribute::FormatOpenSymbol => {
                let close = expect(context, id, Attribute::FormatCloseSymbol)?;
                let folded = fold_level(context, parent, id, close, Attribute::Collection);
                if let Some(inner) = context.arena.next(id) {
                    if inner != close {
                        structure_format(context, folded, inner, depth + 1)?;
                    }
                }
                context.arena.next(folded)
            }
            Attribute::OpenSymbol => {
                enclosure(context, parent, id, Attribute::EnclosedClause, depth)?
            }
            _ => context.arena.next(id),
        };
    }

    Ok(())
}

const LOOP_HEADS: &[Attribute] = &[
    Attribute::FromSymbol,
    Attribute::BySymbol,
    Attribute::ToSymbol,
    Attribute::DowntoSymbol,
    Attribute::WhileSymbol,
];

/// Assemble loop-head parts over a finished level: each loop keyword and the
/// tokens up to the next loop keyword or the `DO` part become one part node.
/// `DOWNTO` folds like `TO`; the keyword inside the part keeps the direction.
fn loop_parts(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        let attribute = context.arena.attribute(id);

        current = match attribute {
            Attribute::ForSymbol => {
                let next = context.arena.next(id);
                let end = next
                    .filter(|&n| context.arena.attribute(n) == Attribute::Identifier)
                    .unwrap_or(id);
                let folded = fold_level(context, parent, id, end, Attribute::ForPart);
                context.arena.next(folded)
            }
            _ if LOOP_HEADS.contains(&attribute) => {
                let mut end = id;
                let mut scan = context.arena.next(id);
                while let Some(next) = scan {
                    let next_attribute = context.arena.attribute(next);
                    if LOOP_HEADS.contains(&next_attribute)
                        || next_attribute == Attribute::DoPart
                    {
                        break;
                    }
                    end = next;
                    scan = context.arena.next(next);
                }

                let part = match attribute {
                    Attribute::FromSymbol => Attribute::FromPart,
                    Attribute::BySymbol => Attribute::ByPart,
                    Attribute::WhileSymbol => Attribute::WhilePart,
                    _ => Attribute::ToPart,
                };
                let folded = fold_level(context, parent, id, end, part);
                context.arena.next(folded)
            }
            _ => context.arena.next(id),
        };
    }
}

/// Find the matching closer for `opener` among flat tokens, tracking nesting.
fn expect(context: &Context, opener: NodeId, closer: Attribute) -> Result<NodeId, FatalError> {
    scan_level(context, context.arena.next(opener), &[closer])
        .ok_or_else(|| missing(context, opener, closer))
}

/// Scan a flat sibling run for the first token in `targets` at nesting depth
/// zero, skipping bracketed regions and format texts.
fn scan_level(
    context: &Context,
    from: Option<NodeId>,
    targets: &[Attribute],
) -> Option<NodeId> {
    let mut stack: Vec<Attribute> = Vec::new();

    for id in context.arena.siblings(from) {
        let attribute = context.arena.attribute(id);

        if stack.is_empty() && targets.contains(&attribute) {
            return Some(id);
        }

        if attribute == Attribute::FormatDelimiterSymbol {
            if stack.last() == Some(&Attribute::FormatDelimiterSymbol) {
                stack.pop();
            } else {
                stack.push(Attribute::FormatDelimiterSymbol);
            }
        } else if let Some(closer) = attribute.matching_closer() {
            stack.push(closer);
        } else if attribute.is_closer() {
            if stack.last() == Some(&attribute) {
                stack.pop();
            } else {
                // Misnested input; the bracket checker would have caught it.
                return None;
            }
        }
    }

    None
}

fn missing(context: &Context, at: NodeId, expected: Attribute) -> FatalError {
    let location = context.arena.get(at).location;
    FatalError::Structure {
        path: context.interner.resolve(location.path).to_string(),
        line: location.line,
        column: location.column,
        message: format!("'{expected}' expected"),
    }
}
