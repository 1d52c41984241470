//! Reduction of format texts.
//!
//! The lexer tokenized everything between `$` delimiters as format items, the
//! structurer folded frame parentheses into collections and embedded dynamic
//! clauses into ordinary enclosures. This pass reduces each collection level
//! to a picture list: replicators, insertions, moulds, then the patterns, and
//! finally the comma-separated pictures.

use super::reduce::{enclosed_clause, reduce_all, Pat};
use super::{error_at, fold_level};
use crate::syntax::{Attribute, NodeId, TableId};
use crate::{Context, FatalError};

const REPLICATORS: &[Attribute] = &[Attribute::Replicator, Attribute::DynamicReplicator];

/// Alignment items that form insertions on their own.
const ALIGNMENTS: &[Attribute] = &[
    Attribute::FormatItemX,
    Attribute::FormatItemY,
    Attribute::FormatItemL,
    Attribute::FormatItemP,
    Attribute::FormatItemQ,
    Attribute::FormatItemK,
];

/// Digit frames of integral moulds. `s` is the suppressed frame.
const FRAMES: &[Attribute] = &[
    Attribute::FormatItemD,
    Attribute::FormatItemZ,
    Attribute::FormatItemS,
];

const SIGNS: &[Attribute] = &[Attribute::FormatItemPlus, Attribute::FormatItemMinus];

const PATTERNS: &[Attribute] = &[
    Attribute::IntegralPattern,
    Attribute::RealPattern,
    Attribute::ComplexPattern,
    Attribute::BitsPattern,
    Attribute::BooleanPattern,
    Attribute::ChoicePattern,
    Attribute::StringPattern,
    Attribute::GeneralPattern,
    Attribute::FormatPattern,
];

/// Reduce the picture material of a format text in place.
pub fn reduce(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<(), FatalError> {
    if depth > super::MAX_DEPTH {
        return Err(FatalError::Resource);
    }

    // Nested collections and embedded clauses first.
    let mut current = context.arena.sub(parent);
    while let Some(id) = current {
        current = context.arena.next(id);

        match context.arena.attribute(id) {
            Attribute::Collection => reduce(context, id, table, depth + 1)?,
            Attribute::EnclosedClause => enclosed_clause(context, id, table, depth + 1)?,
            _ => {}
        }
    }

    replicators(context, parent);
    insertions(context, parent);
    moulds(context, parent);
    patterns(context, parent);
    check_collections(context, parent);
    pictures(context, parent);

    if context.diagnostics.exhausted() {
        return Err(FatalError::TooManyErrors);
    }

    Ok(())
}

fn replicators(context: &mut Context, parent: NodeId) {
    reduce_all(
        context,
        parent,
        Attribute::Replicator,
        &[Pat::Is(Attribute::IntDenotation)],
        &[],
    );
    // n (clause): the replicator is computed at transput time.
    reduce_all(
        context,
        parent,
        Attribute::DynamicReplicator,
        &[Pat::Is(Attribute::FormatItemN), Pat::Is(Attribute::ClosedClause)],
        &[],
    );
}

fn insertions(context: &mut Context, parent: NodeId) {
    reduce_all(
        context,
        parent,
        Attribute::Insertion,
        &[Pat::OneOf(REPLICATORS), Pat::Is(Attribute::RowCharDenotation)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::Insertion,
        &[Pat::Is(Attribute::RowCharDenotation)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::Insertion,
        &[Pat::OneOf(REPLICATORS), Pat::OneOf(ALIGNMENTS)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::Insertion,
        &[Pat::OneOf(ALIGNMENTS)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::Insertion,
        &[Pat::Is(Attribute::Insertion), Pat::Is(Attribute::Insertion)],
        &[],
    );
}

fn moulds(context: &mut Context, parent: NodeId) {
    reduce_all(
        context,
        parent,
        Attribute::IntegralMould,
        &[Pat::OneOf(REPLICATORS), Pat::OneOf(FRAMES)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::IntegralMould,
        &[Pat::OneOf(FRAMES)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::IntegralMould,
        &[
            Pat::Is(Attribute::IntegralMould),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::IntegralMould,
        &[
            Pat::Is(Attribute::IntegralMould),
            Pat::Is(Attribute::Insertion),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::SignMould,
        &[Pat::Is(Attribute::IntegralMould), Pat::OneOf(SIGNS)],
        &[],
    );
    reduce_all(context, parent, Attribute::SignMould, &[Pat::OneOf(SIGNS)], &[]);
}

fn patterns(context: &mut Context, parent: NodeId) {
    // Real patterns before lone moulds become integral patterns.
    reduce_all(
        context,
        parent,
        Attribute::RealPattern,
        &[
            Pat::Is(Attribute::SignMould),
            Pat::Is(Attribute::IntegralMould),
            Pat::Is(Attribute::FormatItemPoint),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::RealPattern,
        &[
            Pat::Is(Attribute::IntegralMould),
            Pat::Is(Attribute::FormatItemPoint),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::RealPattern,
        &[
            Pat::Is(Attribute::FormatItemPoint),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::RealPattern,
        &[
            Pat::Is(Attribute::RealPattern),
            Pat::Is(Attribute::FormatItemE),
            Pat::Is(Attribute::SignMould),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::RealPattern,
        &[
            Pat::Is(Attribute::RealPattern),
            Pat::Is(Attribute::FormatItemE),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::BitsPattern,
        &[
            Pat::OneOf(REPLICATORS),
            Pat::Is(Attribute::FormatItemR),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::BitsPattern,
        &[
            Pat::Is(Attribute::FormatItemR),
            Pat::Is(Attribute::IntegralMould),
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::IntegralPattern,
        &[Pat::Is(Attribute::SignMould), Pat::Is(Attribute::IntegralMould)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::IntegralPattern,
        &[Pat::Is(Attribute::IntegralMould)],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::ComplexPattern,
        &[
            Pat::OneOf(&[Attribute::RealPattern, Attribute::IntegralPattern]),
            Pat::Is(Attribute::FormatItemI),
            Pat::OneOf(&[Attribute::RealPattern, Attribute::IntegralPattern]),
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::StringPattern,
        &[Pat::OneOf(REPLICATORS), Pat::Is(Attribute::FormatItemA)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::StringPattern,
        &[Pat::Is(Attribute::FormatItemA)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::StringPattern,
        &[
            Pat::Is(Attribute::StringPattern),
            Pat::Is(Attribute::StringPattern),
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::BooleanPattern,
        &[Pat::Is(Attribute::FormatItemB), Pat::Is(Attribute::Collection)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::BooleanPattern,
        &[Pat::Is(Attribute::FormatItemB)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::ChoicePattern,
        &[Pat::Is(Attribute::FormatItemC), Pat::Is(Attribute::Collection)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::GeneralPattern,
        &[Pat::Is(Attribute::FormatItemG), Pat::Is(Attribute::Collection)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::GeneralPattern,
        &[Pat::Is(Attribute::FormatItemG)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::FormatPattern,
        &[Pat::Is(Attribute::FormatItemF), Pat::Is(Attribute::ClosedClause)],
        &[],
    );
}

/// Boolean collections choose between two pictures; a choice collection needs
/// at least one.
fn check_collections(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        let (expect_two, pattern) = match context.arena.attribute(id) {
            Attribute::BooleanPattern => (true, id),
            Attribute::ChoicePattern => (false, id),
            _ => continue,
        };

        let Some(collection) = context
            .arena
            .sub(pattern)
            .and_then(|frame| context.arena.next(frame))
        else {
            continue;
        };
        let count = collection_pictures(context, collection);

        if expect_two && count != 2 {
            let location = context.arena.get(pattern).location;
            error_at(
                context,
                location,
                format!("a boolean pattern chooses between 2 pictures, not {count}"),
            );
        } else if !expect_two && count == 0 {
            let location = context.arena.get(pattern).location;
            error_at(context, location, "a choice pattern needs at least one picture");
        }
    }
}

fn collection_pictures(context: &Context, collection: NodeId) -> usize {
    let inner = context
        .arena
        .siblings(context.arena.sub(collection))
        .find(|&id| {
            matches!(
                context.arena.attribute(id),
                Attribute::Picture | Attribute::PictureList
            )
        });

    match inner {
        Some(id) if context.arena.attribute(id) == Attribute::PictureList => context
            .arena
            .siblings(context.arena.sub(id))
            .filter(|&p| context.arena.attribute(p) == Attribute::Picture)
            .count(),
        Some(_) => 1,
        None => 0,
    }
}

/// Fold each comma segment into a picture, then the whole content into a
/// picture list.
fn pictures(context: &mut Context, parent: NodeId) {
    let Some(head) = context.arena.sub(parent) else { return };
    let Some(first) = context.arena.next(head) else { return };

    let mut last = context.arena.last_sibling(first);
    if matches!(
        context.arena.attribute(last),
        Attribute::FormatDelimiterSymbol | Attribute::FormatCloseSymbol
    ) {
        match context.arena.prev(last) {
            Some(before) => last = before,
            None => return, // empty format
        }
    }

    let mut complained = false;
    let mut segment_start = Some(first);
    let mut current = Some(first);
    let mut commas = false;

    while let Some(id) = current {
        let at_last = id == last;
        let next = context.arena.next(id);

        if context.arena.attribute(id) == Attribute::CommaSymbol {
            commas = true;
            if let Some(start) = segment_start.filter(|&s| s != id) {
                let end = context.arena.prev(id).expect("segment precedes its comma");
                fold_picture(context, parent, start, end, &mut complained);
            }
            segment_start = next;
        } else if at_last {
            if let Some(start) = segment_start {
                fold_picture(context, parent, start, id, &mut complained);
            }
        }

        current = if at_last { None } else { next };
    }

    let (first, last) = {
        let first = context.arena.next(head).expect("pictures were folded");
        let mut last = context.arena.last_sibling(first);
        if matches!(
            context.arena.attribute(last),
            Attribute::FormatDelimiterSymbol | Attribute::FormatCloseSymbol
        ) {
            last = context.arena.prev(last).expect("picture precedes the closer");
        }
        (first, last)
    };

    if commas {
        fold_level(context, parent, first, last, Attribute::PictureList);
    }
}

/// Fold one comma segment. A picture is insertions around at most one
/// pattern; anything else draws one diagnostic per format text.
fn fold_picture(
    context: &mut Context,
    parent: NodeId,
    first: NodeId,
    last: NodeId,
    complained: &mut bool,
) {
    let mut patterns = 0usize;
    let mut junk = false;

    let mut current = Some(first);
    while let Some(id) = current {
        let attribute = context.arena.attribute(id);
        if PATTERNS.contains(&attribute) {
            patterns += 1;
        } else if attribute != Attribute::Insertion {
            junk = true;
        }
        current = if id == last { None } else { context.arena.next(id) };
    }

    if (patterns > 1 || junk) && !*complained {
        *complained = true;
        let location = context.arena.get(first).location;
        error_at(context, location, "cannot parse the format picture");
    }

    fold_level(context, parent, first, last, Attribute::Picture);
}
