//! The bottom-up phrase reducer.
//!
//! Each nesting level produced by the structurer is reduced on its own, after
//! the tag resolver has scanned the level for declarations. Reduction is an
//! ordered pipeline of try-reduce passes: declarers first, then enclosed
//! clause assembly, primaries, selections, formulae by operator priority,
//! tertiaries, the right-to-left constructs, declarations and finally series
//! assembly. A phrase that cannot be fully reduced is wrapped under the
//! category that was expected there, one diagnostic is emitted, and parsing
//! continues up to the error ceiling.

use super::{error_at, fold_level, format, tags, MAX_DEPTH};
use crate::syntax::{
    Attribute, NodeId, TableId, TagKind, Tag, MIN_PRIORITY, MAX_PRIORITY, STANDARD_PRIORITIES,
};
use crate::{Context, FatalError};

/// Reduce a structured `ParticularProgram` tree in place.
pub fn program(context: &mut Context, root: NodeId, standard: TableId) -> Result<(), FatalError> {
    reduce_level(context, root, standard, Expect::Program, 0)
}

/// What category a nesting level is being reduced towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Program,
    Series,
    Enquiry,
    /// A single unit after a loop keyword (`FROM`, `BY`, `TO`).
    UnitPart,
    /// The in-part of a case clause, which may carry specifiers.
    CaseIn,
    ParameterPack,
    StructPack,
    UnionPack,
    FormalDeclarers,
    Specifier,
    Bounds,
    Subscripts,
}

impl Expect {
    fn describe(self) -> &'static str {
        match self {
            Expect::Program => "particular program",
            Expect::Series => "serial clause",
            Expect::Enquiry => "enquiry clause",
            Expect::UnitPart => "unit",
            Expect::CaseIn => "case part",
            Expect::ParameterPack => "parameter pack",
            Expect::StructPack => "structure pack",
            Expect::UnionPack => "union pack",
            Expect::FormalDeclarers => "formal declarers",
            Expect::Specifier => "specifier",
            Expect::Bounds => "bounds",
            Expect::Subscripts => "subscripts",
        }
    }
}

fn reduce_level(
    context: &mut Context,
    parent: NodeId,
    enclosing: TableId,
    expect: Expect,
    depth: usize,
) -> Result<(), FatalError> {
    if depth > MAX_DEPTH {
        return Err(FatalError::Resource);
    }

    match expect {
        Expect::Program
        | Expect::Series
        | Expect::Enquiry
        | Expect::UnitPart
        | Expect::CaseIn => reduce_phrase(context, parent, enclosing, expect, depth),
        Expect::ParameterPack => reduce_parameter_pack(context, parent, enclosing, depth),
        Expect::StructPack
        | Expect::UnionPack
        | Expect::FormalDeclarers
        | Expect::Specifier => reduce_pack(context, parent, enclosing, expect, depth),
        Expect::Bounds | Expect::Subscripts => {
            reduce_bracketed(context, parent, enclosing, expect, depth)
        }
    }
}

/// Reduce one declaring scope: resolve tags, descend into the structural
/// parts, then run the reduction pipeline over the level.
fn reduce_phrase(
    context: &mut Context,
    parent: NodeId,
    enclosing: TableId,
    expect: Expect,
    depth: usize,
) -> Result<(), FatalError> {
    let table = context.tables.add(Some(enclosing));
    context.arena.assign_table(context.arena.sub(parent), table);
    tags::resolve_scope(context, table, parent);

    descend_parts(context, parent, table, depth)?;
    declarer_rules(context, parent, table, expect, depth)?;
    assemble_enclosed_parts(context, parent);
    primaries(context, parent, table, depth)?;
    selections(context, parent);
    formulas(context, parent, table);
    tertiaries(context, parent);
    right_to_left(context, parent);
    declarations(context, parent);
    assemble(context, parent, expect);

    if context.diagnostics.exhausted() {
        return Err(FatalError::TooManyErrors);
    }

    Ok(())
}

/// Eagerly reduce the parts whose category is already known from their
/// delimiters. Bracketed enclosures stay untouched here; what they are
/// depends on context the later passes supply.
fn descend_parts(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<(), FatalError> {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        match context.arena.attribute(id) {
            Attribute::IfPart
            | Attribute::ElifPart
            | Attribute::CasePart
            | Attribute::OusePart
            | Attribute::WhilePart
            | Attribute::UntilPart => {
                reduce_level(context, id, table, Expect::Enquiry, depth + 1)?;
            }
            Attribute::ThenPart | Attribute::ElsePart | Attribute::OutPart | Attribute::DoPart => {
                reduce_level(context, id, table, Expect::Series, depth + 1)?;
            }
            Attribute::InPart => {
                reduce_level(context, id, table, Expect::CaseIn, depth + 1)?;
            }
            Attribute::FromPart | Attribute::ByPart | Attribute::ToPart => {
                reduce_level(context, id, table, Expect::UnitPart, depth + 1)?;
            }
            Attribute::ForPart => {
                // The loop variable defines into the enclosing reach.
                let keyword = context.arena.sub(id).expect("for part holds FOR");
                if let Some(name_id) = context.arena.next(keyword) {
                    if context.arena.attribute(name_id) == Attribute::Identifier {
                        let name = context.arena.get(name_id).text.expect("identifier text");
                        context.tables.insert(
                            table,
                            TagKind::Identifier,
                            Tag {
                                name,
                                node: Some(name_id),
                                priority: 0,
                                local_label: false,
                            },
                        );
                        context
                            .arena
                            .set_attribute(name_id, Attribute::DefiningIdentifier);
                    }
                }
            }
            Attribute::FormatText => {
                format::reduce(context, id, table, depth + 1)?;
            }
            _ => {}
        }
    }

    Ok(())
}

// --- pattern engine -----------------------------------------------------

#[derive(Clone, Copy)]
pub(crate) enum Pat {
    Is(Attribute),
    OneOf(&'static [Attribute]),
    /// Any reduced value-yielding category or value terminal.
    Operand,
}

impl Pat {
    fn matches(self, attribute: Attribute) -> bool {
        match self {
            Pat::Is(expected) => attribute == expected,
            Pat::OneOf(set) => set.contains(&attribute),
            Pat::Operand => is_operand(attribute),
        }
    }
}

pub(crate) fn is_operand(attribute: Attribute) -> bool {
    attribute.is_unit()
        || matches!(
            attribute,
            Attribute::Identifier
                | Attribute::IntDenotation
                | Attribute::RealDenotation
                | Attribute::BitsDenotation
                | Attribute::RowCharDenotation
                | Attribute::TrueSymbol
                | Attribute::FalseSymbol
                | Attribute::EmptySymbol
                | Attribute::NilSymbol
        )
}

/// Match `pats` against the siblings starting at `start`; returns the last
/// matched node.
pub(crate) fn match_at(context: &Context, start: NodeId, pats: &[Pat]) -> Option<NodeId> {
    let mut current = Some(start);
    let mut last = start;

    for pat in pats {
        let id = current?;
        if !pat.matches(context.arena.attribute(id)) {
            return None;
        }
        last = id;
        current = context.arena.next(id);
    }

    Some(last)
}

/// Fold every match of `pats` in the level under `parent`, left to right,
/// re-trying at each fold so left-recursive lists grow in place.
pub(crate) fn reduce_all(
    context: &mut Context,
    parent: NodeId,
    result: Attribute,
    pats: &[Pat],
    follow_not: &[Attribute],
) -> bool {
    let mut changed = false;
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        if let Some(last) = match_at(context, id, pats) {
            let follower = context.arena.next(last).map(|n| context.arena.attribute(n));
            if !follower.is_some_and(|f| follow_not.contains(&f)) {
                let folded = fold_level(context, parent, id, last, result);
                changed = true;
                current = Some(folded);
                continue;
            }
        }
        current = context.arena.next(id);
    }

    changed
}

// --- declarers ----------------------------------------------------------

const GENERATOR_SYMBOLS: &[Attribute] = &[
    Attribute::LocSymbol,
    Attribute::HeapSymbol,
    Attribute::NewSymbol,
];

fn declarer_rules(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    expect: Expect,
    depth: usize,
) -> Result<(), FatalError> {
    loop {
        let mut changed = false;

        changed |= reduce_all(context, parent, Attribute::Longety, &[Pat::Is(Attribute::LongSymbol)], &[]);
        changed |= reduce_all(
            context,
            parent,
            Attribute::Longety,
            &[Pat::Is(Attribute::Longety), Pat::Is(Attribute::Longety)],
            &[],
        );
        changed |= reduce_all(context, parent, Attribute::Shortety, &[Pat::Is(Attribute::ShortSymbol)], &[]);
        changed |= reduce_all(
            context,
            parent,
            Attribute::Shortety,
            &[Pat::Is(Attribute::Shortety), Pat::Is(Attribute::Shortety)],
            &[],
        );

        changed |= reduce_standard_modes(context, parent);
        changed |= reduce_all(
            context,
            parent,
            Attribute::Declarer,
            &[Pat::Is(Attribute::Indicant)],
            &[],
        );

        changed |= reduce_packs(context, parent, table, depth)?;

        changed |= reduce_all(
            context,
            parent,
            Attribute::Declarer,
            &[Pat::Is(Attribute::RefSymbol), Pat::Is(Attribute::Declarer)],
            &[],
        );
        changed |= reduce_rowed(context, parent, table, depth)?;
        changed |= reduce_all(
            context,
            parent,
            Attribute::Declarer,
            &[Pat::Is(Attribute::FlexSymbol), Pat::Is(Attribute::Declarer)],
            &[],
        );

        changed |= reduce_plans(context, parent, table, depth)?;
        changed |= detect_parameter_packs(context, parent, table, depth)?;

        if expect == Expect::CaseIn {
            changed |= detect_specifiers(context, parent, table, depth)?;
        }

        if !changed {
            return Ok(());
        }
    }
}

/// Fold standard mode indicants, with any length particle, into declarers.
fn reduce_standard_modes(context: &mut Context, parent: NodeId) -> bool {
    let mut changed = false;

    let mut current = context.arena.sub(parent);
    while let Some(id) = current {
        let attribute = context.arena.attribute(id);

        if matches!(attribute, Attribute::Longety | Attribute::Shortety) {
            if let Some(mode) = context.arena.next(id) {
                if context.arena.attribute(mode).is_standard_mode() {
                    let folded = fold_level(context, parent, id, mode, Attribute::Declarer);
                    changed = true;
                    current = context.arena.next(folded);
                    continue;
                }
            }
        } else if attribute.is_standard_mode() {
            let folded = fold_level(context, parent, id, id, Attribute::Declarer);
            changed = true;
            current = context.arena.next(folded);
            continue;
        }

        current = context.arena.next(id);
    }

    changed
}

/// `STRUCT ( ... )` and `UNION ( ... )`: reduce the pack and fold into a
/// declarer.
fn reduce_packs(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<bool, FatalError> {
    let mut changed = false;
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        let attribute = context.arena.attribute(id);
        if matches!(attribute, Attribute::StructSymbol | Attribute::UnionSymbol) {
            if let Some(pack) = context.arena.next(id) {
                if context.arena.attribute(pack) == Attribute::EnclosedClause {
                    let expect = if attribute == Attribute::StructSymbol {
                        Expect::StructPack
                    } else {
                        Expect::UnionPack
                    };
                    reduce_level(context, pack, table, expect, depth + 1)?;
                    let folded = fold_level(context, parent, id, pack, Attribute::Declarer);
                    changed = true;
                    current = context.arena.next(folded);
                    continue;
                }
            }
        }
        current = context.arena.next(id);
    }

    Ok(changed)
}

/// `[ bounds ] declarer`, optionally under `FLEX`: reduce the bounds and fold
/// the rowed declarer.
fn reduce_rowed(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<bool, FatalError> {
    let mut changed = false;
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        if context.arena.attribute(id) == Attribute::Bounds {
            if let Some(item) = context.arena.next(id) {
                if context.arena.attribute(item) == Attribute::Declarer {
                    reduce_level(context, id, table, Expect::Bounds, depth + 1)?;
                    let folded = fold_level(context, parent, id, item, Attribute::Declarer);
                    changed = true;
                    current = context.arena.next(folded);
                    continue;
                }
            }
        }
        current = context.arena.next(id);
    }

    Ok(changed)
}

/// `PROC (...) mode`, `PROC mode` and `OP (...) mode` plans.
fn reduce_plans(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<bool, FatalError> {
    let mut changed = false;
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        match context.arena.attribute(id) {
            Attribute::ProcSymbol => {
                let first = context.arena.next(id);
                if let Some(first) = first {
                    match context.arena.attribute(first) {
                        Attribute::EnclosedClause => {
                            if let Some(yield_mode) = context.arena.next(first) {
                                if context.arena.attribute(yield_mode) == Attribute::Declarer {
                                    reduce_level(
                                        context,
                                        first,
                                        table,
                                        Expect::FormalDeclarers,
                                        depth + 1,
                                    )?;
                                    let folded = fold_level(
                                        context,
                                        parent,
                                        id,
                                        yield_mode,
                                        Attribute::Declarer,
                                    );
                                    changed = true;
                                    current = context.arena.next(folded);
                                    continue;
                                }
                            }
                        }
                        Attribute::Declarer => {
                            let folded =
                                fold_level(context, parent, id, first, Attribute::Declarer);
                            changed = true;
                            current = context.arena.next(folded);
                            continue;
                        }
                        _ => {}
                    }
                }
            }
            Attribute::OpSymbol => {
                // OP (modes) mode tag = ...: the plan between OP and the tag.
                let first = context.arena.next(id);
                if let Some(first) = first {
                    if context.arena.attribute(first) == Attribute::EnclosedClause {
                        if let Some(yield_mode) = context.arena.next(first) {
                            if context.arena.attribute(yield_mode) == Attribute::Declarer {
                                reduce_level(
                                    context,
                                    first,
                                    table,
                                    Expect::FormalDeclarers,
                                    depth + 1,
                                )?;
                                fold_level(context, parent, first, yield_mode, Attribute::OperatorPlan);
                                changed = true;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        current = context.arena.next(id);
    }

    Ok(changed)
}

/// A parenthesised run directly before `declarer :` is a routine text's
/// parameter pack, not a clause.
fn detect_parameter_packs(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<bool, FatalError> {
    let mut changed = false;
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        if context.arena.attribute(id) != Attribute::EnclosedClause {
            continue;
        }
        let Some(yield_mode) = context.arena.next(id) else { continue };
        if context.arena.attribute(yield_mode) != Attribute::Declarer {
            continue;
        }
        let Some(colon) = context.arena.next(yield_mode) else { continue };
        if context.arena.attribute(colon) != Attribute::ColonSymbol {
            continue;
        }

        reduce_level(context, id, table, Expect::ParameterPack, depth + 1)?;
        changed = true;
    }

    Ok(changed)
}

/// In a case in-part, `( declarer identifier ) :` is a specifier.
fn detect_specifiers(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<bool, FatalError> {
    let mut changed = false;
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        if context.arena.attribute(id) != Attribute::EnclosedClause {
            continue;
        }
        let Some(colon) = context.arena.next(id) else { continue };
        if context.arena.attribute(colon) != Attribute::ColonSymbol {
            continue;
        }

        reduce_level(context, id, table, Expect::Specifier, depth + 1)?;
        changed = true;
    }

    Ok(changed)
}

// --- enclosed clause assembly -------------------------------------------

/// Recombine the parts built by the top-down phase into their enclosing
/// clause categories.
fn assemble_enclosed_parts(context: &mut Context, parent: NodeId) {
    fold_conditionals(context, parent);
    fold_cases(context, parent);
    fold_loops(context, parent);
}

fn fold_conditionals(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);
        if context.arena.attribute(id) != Attribute::IfPart {
            continue;
        }

        let mut has_then = false;
        let mut scan = context.arena.next(id);
        while let Some(part) = scan {
            match context.arena.attribute(part) {
                Attribute::ThenPart => has_then = true,
                Attribute::ElifPart | Attribute::ElsePart => {}
                _ => break,
            }
            scan = context.arena.next(part);
        }

        let Some(fi) = scan.filter(|&s| context.arena.attribute(s) == Attribute::FiSymbol)
        else {
            continue;
        };

        if !has_then {
            let location = context.arena.get(id).location;
            error_at(context, location, "conditional clause has no THEN part");
        }

        let folded = fold_level(context, parent, id, fi, Attribute::ConditionalClause);
        current = context.arena.next(folded);
    }
}

fn fold_cases(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);
        if context.arena.attribute(id) != Attribute::CasePart {
            continue;
        }

        let mut conformity = false;
        let mut has_in = false;
        let mut scan = context.arena.next(id);
        while let Some(part) = scan {
            match context.arena.attribute(part) {
                Attribute::InPart => {
                    has_in = true;
                    conformity |= in_part_is_specified(context, part);
                }
                Attribute::OusePart | Attribute::OutPart => {}
                _ => break,
            }
            scan = context.arena.next(part);
        }

        let Some(esac) = scan.filter(|&s| context.arena.attribute(s) == Attribute::EsacSymbol)
        else {
            continue;
        };

        if !has_in {
            let location = context.arena.get(id).location;
            error_at(context, location, "case clause has no IN part");
        }

        let attribute = if conformity {
            Attribute::ConformityClause
        } else {
            Attribute::CaseClause
        };
        let folded = fold_level(context, parent, id, esac, attribute);
        current = context.arena.next(folded);
    }
}

fn in_part_is_specified(context: &Context, part: NodeId) -> bool {
    let specified = |attribute| {
        matches!(
            attribute,
            Attribute::SpecifiedUnit | Attribute::SpecifiedUnitList
        )
    };

    context.arena.siblings(context.arena.sub(part)).any(|id| {
        specified(context.arena.attribute(id))
            || context
                .arena
                .siblings(context.arena.sub(id))
                .any(|inner| specified(context.arena.attribute(inner)))
    })
}

const LOOP_PARTS: &[Attribute] = &[
    Attribute::ForPart,
    Attribute::FromPart,
    Attribute::ByPart,
    Attribute::ToPart,
    Attribute::WhilePart,
    Attribute::DoPart,
];

fn fold_loops(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);
        if !LOOP_PARTS.contains(&context.arena.attribute(id)) {
            continue;
        }

        let mut last = id;
        let mut has_do = context.arena.attribute(id) == Attribute::DoPart;
        let mut scan = context.arena.next(id);
        while let Some(part) = scan {
            let attribute = context.arena.attribute(part);
            if !LOOP_PARTS.contains(&attribute) {
                break;
            }
            has_do |= attribute == Attribute::DoPart;
            last = part;
            scan = context.arena.next(part);
        }

        if !has_do {
            let location = context.arena.get(id).location;
            error_at(context, location, "loop clause has no DO part");
        }

        let folded = fold_level(context, parent, id, last, Attribute::LoopClause);
        current = context.arena.next(folded);
    }
}

// --- primaries ----------------------------------------------------------

fn is_primary(attribute: Attribute) -> bool {
    matches!(
        attribute,
        Attribute::Identifier
            | Attribute::Call
            | Attribute::Slice
            | Attribute::Cast
            | Attribute::ClosedClause
    )
}

fn primaries(
    context: &mut Context,
    parent: NodeId,
    table: TableId,
    depth: usize,
) -> Result<(), FatalError> {
    // Remaining bracketed enclosures are ordinary clauses; their serial or
    // collateral nature shows once the contents are reduced.
    let mut current = context.arena.sub(parent);
    while let Some(id) = current {
        current = context.arena.next(id);

        if context.arena.attribute(id) == Attribute::EnclosedClause {
            enclosed_clause(context, id, table, depth + 1)?;
        }
    }

    reduce_all(
        context,
        parent,
        Attribute::Jump,
        &[Pat::Is(Attribute::GotoSymbol), Pat::Is(Attribute::Identifier)],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::Jump,
        &[
            Pat::Is(Attribute::GoSymbol),
            Pat::Is(Attribute::ToSymbol),
            Pat::Is(Attribute::Identifier),
        ],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::Jump,
        &[Pat::Is(Attribute::GoSymbol), Pat::Is(Attribute::Identifier)],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::Generator,
        &[Pat::OneOf(GENERATOR_SYMBOLS), Pat::Is(Attribute::Declarer)],
        &[Attribute::DefiningIdentifier],
    );

    reduce_all(
        context,
        parent,
        Attribute::Cast,
        &[
            Pat::Is(Attribute::Declarer),
            Pat::OneOf(&[Attribute::ClosedClause, Attribute::CollateralClause]),
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::ParallelClause,
        &[Pat::Is(Attribute::ParSymbol), Pat::Is(Attribute::CollateralClause)],
        &[],
    );

    // Calls and slices, left-associative so `f(x)(y)` and `a[i][j]` chain.
    loop {
        let mut changed = false;
        let mut current = context.arena.sub(parent);

        while let Some(id) = current {
            if is_primary(context.arena.attribute(id)) {
                if let Some(argument) = context.arena.next(id) {
                    match context.arena.attribute(argument) {
                        Attribute::ClosedClause | Attribute::CollateralClause => {
                            let folded = fold_level(context, parent, id, argument, Attribute::Call);
                            changed = true;
                            current = Some(folded);
                            continue;
                        }
                        Attribute::Bounds => {
                            reduce_level(context, argument, table, Expect::Subscripts, depth + 1)?;
                            let folded =
                                fold_level(context, parent, id, argument, Attribute::Slice);
                            changed = true;
                            current = Some(folded);
                            continue;
                        }
                        _ => {}
                    }
                }
            }
            current = context.arena.next(id);
        }

        if !changed {
            return Ok(());
        }
    }
}

/// Reduce one generic enclosure into a closed or collateral clause. Also
/// called for enclosures met outside phrase context, e.g. a dynamic
/// replicator clause inside a format text.
pub(crate) fn enclosed_clause(
    context: &mut Context,
    node: NodeId,
    table: TableId,
    depth: usize,
) -> Result<(), FatalError> {
    reduce_level(context, node, table, Expect::Series, depth)?;

    let opener = context.arena.sub(node).expect("enclosure holds its opener");
    let clause = context
        .arena
        .next(opener)
        .map(|c| context.arena.attribute(c));
    let attribute = if clause == Some(Attribute::UnitList) {
        Attribute::CollateralClause
    } else {
        Attribute::ClosedClause
    };
    context.arena.set_attribute(node, attribute);

    Ok(())
}

// --- secondaries --------------------------------------------------------

fn is_secondary(attribute: Attribute) -> bool {
    is_primary(attribute)
        || matches!(attribute, Attribute::Selection | Attribute::Generator)
}

/// `field OF secondary`, folded right to left so chains nest correctly.
fn selections(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent).map(|h| context.arena.last_sibling(h));

    while let Some(id) = current {
        if context.arena.attribute(id) == Attribute::OfSymbol {
            let field = context.arena.prev(id);
            let target = context.arena.next(id);

            if let (Some(field), Some(target)) = (field, target) {
                if context.arena.attribute(field) == Attribute::Identifier
                    && is_secondary(context.arena.attribute(target))
                {
                    context.arena.set_attribute(field, Attribute::FieldIdentifier);
                    let folded =
                        fold_level(context, parent, field, target, Attribute::Selection);
                    current = context.arena.prev(folded);
                    continue;
                }
            }
        }
        current = context.arena.prev(id);
    }
}

// --- formulae -----------------------------------------------------------

/// Monadic chains innermost-first, then dyadic folding one priority level at
/// a time from the highest down, which gives left-to-right grouping at equal
/// priority.
fn formulas(context: &mut Context, parent: NodeId, table: TableId) {
    reduce_monadic(context, parent);

    for priority in (MIN_PRIORITY..=MAX_PRIORITY).rev() {
        let mut current = context.arena.sub(parent);

        while let Some(id) = current {
            let attribute = context.arena.attribute(id);
            let is_operator =
                matches!(attribute, Attribute::Operator | Attribute::EqualsSymbol);

            if is_operator {
                let left = context.arena.prev(id);
                let right = context.arena.next(id);

                if let (Some(left), Some(right)) = (left, right) {
                    if is_operand(context.arena.attribute(left))
                        && is_operand(context.arena.attribute(right))
                    {
                        let declared = priority_of(context, table, id);
                        let applies = match declared {
                            Some(p) => p == priority,
                            // No declared priority: complain once, bind last.
                            None => priority == MIN_PRIORITY,
                        };

                        if applies {
                            if declared.is_none() {
                                let node = context.arena.get(id);
                                let location = node.location;
                                let text = node
                                    .text
                                    .map(|t| context.interner.resolve(t).to_string())
                                    .unwrap_or_default();
                                error_at(
                                    context,
                                    location,
                                    format!("no priority declared for operator '{text}'"),
                                );
                            }
                            let folded =
                                fold_level(context, parent, left, right, Attribute::Formula);
                            current = Some(folded);
                            continue;
                        }
                    }
                }
            }

            current = context.arena.next(id);
        }
    }
}

fn reduce_monadic(context: &mut Context, parent: NodeId) {
    loop {
        let mut changed = false;
        let mut current = context
            .arena
            .sub(parent)
            .map(|h| context.arena.last_sibling(h));

        while let Some(id) = current {
            if context.arena.attribute(id) == Attribute::Operator {
                let operand = context.arena.next(id);
                let before = context.arena.prev(id);

                let prefix_position = before
                    .map(|b| !is_operand(context.arena.attribute(b)))
                    .unwrap_or(true);
                let operand_ok = operand
                    .map(|o| {
                        let a = context.arena.attribute(o);
                        is_operand(a) && a != Attribute::Formula
                    })
                    .unwrap_or(false);

                if prefix_position && operand_ok {
                    let operand = operand.expect("checked above");
                    let folded =
                        fold_level(context, parent, id, operand, Attribute::MonadicFormula);
                    changed = true;
                    current = context.arena.prev(folded);
                    continue;
                }
            }
            current = context.arena.prev(id);
        }

        if !changed {
            return;
        }
    }
}

/// The dyadic priority of an operator token: a PRIO declaration in scope
/// first, then the standard table.
fn priority_of(context: &Context, table: TableId, id: NodeId) -> Option<i32> {
    if context.arena.attribute(id) == Attribute::EqualsSymbol {
        return STANDARD_PRIORITIES.get("=").copied();
    }

    let name = context.arena.get(id).text?;
    if let Some(tag) = context.tables.find(table, TagKind::Priority, name) {
        return Some(tag.priority);
    }

    STANDARD_PRIORITIES
        .get(context.interner.resolve(name))
        .copied()
}

// --- tertiaries ---------------------------------------------------------

fn tertiaries(context: &mut Context, parent: NodeId) {
    for (symbol, dyadic, result) in [
        (Attribute::DiagonalSymbol, true, Attribute::DiagonalFunction),
        (Attribute::TransposeSymbol, false, Attribute::TransposeFunction),
        (Attribute::RowSymbol, true, Attribute::RowFunction),
        (Attribute::ColumnSymbol, true, Attribute::ColumnFunction),
    ] {
        if dyadic {
            reduce_all(
                context,
                parent,
                result,
                &[Pat::Operand, Pat::Is(symbol), Pat::Operand],
                &[],
            );
        }
        reduce_all(context, parent, result, &[Pat::Is(symbol), Pat::Operand], &[]);
    }

    reduce_all(
        context,
        parent,
        Attribute::IdentityRelation,
        &[
            Pat::Operand,
            Pat::OneOf(&[Attribute::IsSymbol, Attribute::IsntSymbol]),
            Pat::Operand,
        ],
        &[],
    );

    reduce_all(
        context,
        parent,
        Attribute::AndFunction,
        &[Pat::Operand, Pat::Is(Attribute::AndfSymbol), Pat::Operand],
        &[],
    );
    reduce_all(
        context,
        parent,
        Attribute::OrFunction,
        &[Pat::Operand, Pat::Is(Attribute::OrfSymbol), Pat::Operand],
        &[],
    );
}

// --- right-to-left constructs -------------------------------------------

/// Routine texts and assignations associate to the right; matching scans the
/// sibling list from the end backward so nested forms group correctly.
fn right_to_left(context: &mut Context, parent: NodeId) {
    // (params) mode : unit  /  mode : unit
    let mut current = context
        .arena
        .sub(parent)
        .map(|h| context.arena.last_sibling(h));
    while let Some(id) = current {
        if context.arena.attribute(id) == Attribute::ColonSymbol {
            let body = context.arena.next(id);
            let yield_mode = context.arena.prev(id);

            if let (Some(body), Some(yield_mode)) = (body, yield_mode) {
                if is_operand(context.arena.attribute(body))
                    && context.arena.attribute(yield_mode) == Attribute::Declarer
                {
                    let first = context
                        .arena
                        .prev(yield_mode)
                        .filter(|&p| context.arena.attribute(p) == Attribute::ParameterPack)
                        .unwrap_or(yield_mode);
                    let folded =
                        fold_level(context, parent, first, body, Attribute::RoutineText);
                    current = context.arena.prev(folded);
                    continue;
                }
            }
        }
        current = context.arena.prev(id);
    }

    // destination := source
    let mut current = context
        .arena
        .sub(parent)
        .map(|h| context.arena.last_sibling(h));
    while let Some(id) = current {
        if context.arena.attribute(id) == Attribute::AssignSymbol {
            let destination = context.arena.prev(id);
            let source = context.arena.next(id);

            if let (Some(destination), Some(source)) = (destination, source) {
                if is_operand(context.arena.attribute(destination))
                    && is_operand(context.arena.attribute(source))
                {
                    let folded =
                        fold_level(context, parent, destination, source, Attribute::Assignation);
                    current = context.arena.prev(folded);
                    continue;
                }
            }
        }
        current = context.arena.prev(id);
    }
}

// --- declarations -------------------------------------------------------

const DECLARATIONS: &[Attribute] = &[
    Attribute::ModeDeclaration,
    Attribute::PriorityDeclaration,
    Attribute::OperatorDeclaration,
    Attribute::BriefOperatorDeclaration,
    Attribute::IdentityDeclaration,
    Attribute::VariableDeclaration,
    Attribute::ProcedureDeclaration,
    Attribute::ProcedureVariableDeclaration,
    Attribute::DeclarationList,
];

fn declarations(context: &mut Context, parent: NodeId) {
    // MODE a = declarer, b = declarer
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::ModeSymbol),
            Pat::Is(Attribute::DefiningIndicant),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Is(Attribute::Declarer),
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningIndicant),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Is(Attribute::Declarer),
        ],
        |_, _| Attribute::ModeDeclaration,
    );

    // PRIO op = digit
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::PrioSymbol),
            Pat::Is(Attribute::DefiningOperator),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Is(Attribute::IntDenotation),
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningOperator),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Is(Attribute::IntDenotation),
        ],
        |_, _| Attribute::PriorityDeclaration,
    );

    // OP (plan) op = unit
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::OpSymbol),
            Pat::Is(Attribute::OperatorPlan),
            Pat::Is(Attribute::DefiningOperator),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningOperator),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        |_, _| Attribute::OperatorDeclaration,
    );

    // OP op = routine
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::OpSymbol),
            Pat::Is(Attribute::DefiningOperator),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningOperator),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        |_, _| Attribute::BriefOperatorDeclaration,
    );

    // PROC p = routine / PROC p := routine
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::ProcSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        |_, _| Attribute::ProcedureDeclaration,
    );
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::ProcSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::AssignSymbol),
            Pat::Operand,
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::AssignSymbol),
            Pat::Operand,
        ],
        |_, _| Attribute::ProcedureVariableDeclaration,
    );

    // A generator qualifier before a variable declaration's declarer.
    qualify_variables(context, parent);

    // declarer x = unit, declarer x := unit, bare declarer x
    fold_declaration(
        context,
        parent,
        &[
            Pat::Is(Attribute::Declarer),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::EqualsSymbol),
            Pat::Operand,
        ],
        |context, declarer| {
            if declarer_is_procedure(context, declarer) {
                Attribute::ProcedureDeclaration
            } else {
                Attribute::IdentityDeclaration
            }
        },
    );
    fold_declaration(
        context,
        parent,
        &[
            Pat::OneOf(&[Attribute::Declarer, Attribute::Qualifier]),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::AssignSymbol),
            Pat::Operand,
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
            Pat::Is(Attribute::AssignSymbol),
            Pat::Operand,
        ],
        |context, declarer| {
            if declarer_is_procedure(context, declarer) {
                Attribute::ProcedureVariableDeclaration
            } else {
                Attribute::VariableDeclaration
            }
        },
    );
    fold_declaration(
        context,
        parent,
        &[
            Pat::OneOf(&[Attribute::Declarer, Attribute::Qualifier]),
            Pat::Is(Attribute::DefiningIdentifier),
        ],
        &[
            Pat::Is(Attribute::CommaSymbol),
            Pat::Is(Attribute::DefiningIdentifier),
        ],
        |context, declarer| {
            if declarer_is_procedure(context, declarer) {
                Attribute::ProcedureVariableDeclaration
            } else {
                Attribute::VariableDeclaration
            }
        },
    );

    // Collateral declarations joined by commas.
    reduce_all(
        context,
        parent,
        Attribute::DeclarationList,
        &[
            Pat::OneOf(DECLARATIONS),
            Pat::Is(Attribute::CommaSymbol),
            Pat::OneOf(DECLARATIONS),
        ],
        &[],
    );
}

/// `LOC`/`HEAP`/`NEW` directly before a declarer and a defining identifier
/// qualifies a variable declaration; fold it with the declarer.
fn qualify_variables(context: &mut Context, parent: NodeId) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        current = context.arena.next(id);

        if !GENERATOR_SYMBOLS.contains(&context.arena.attribute(id)) {
            continue;
        }
        let Some(declarer) = context.arena.next(id) else { continue };
        if context.arena.attribute(declarer) != Attribute::Declarer {
            continue;
        }
        let defines = context
            .arena
            .next(declarer)
            .map(|n| context.arena.attribute(n) == Attribute::DefiningIdentifier)
            .unwrap_or(false);
        if !defines {
            continue;
        }

        let folded = fold_level(context, parent, id, declarer, Attribute::Qualifier);
        current = context.arena.next(folded);
    }
}

fn declarer_is_procedure(context: &Context, declarer: NodeId) -> bool {
    let mut first = context.arena.sub(declarer);
    if let Some(f) = first {
        if GENERATOR_SYMBOLS.contains(&context.arena.attribute(f)) {
            first = context.arena.next(f);
        }
    }

    match first {
        Some(f) => match context.arena.attribute(f) {
            Attribute::ProcSymbol => true,
            Attribute::Declarer => declarer_is_procedure(context, f),
            _ => false,
        },
        None => false,
    }
}

/// Fold a declaration's basic form and its comma-continued list, left to
/// right, into one growing node.
fn fold_declaration(
    context: &mut Context,
    parent: NodeId,
    basic: &[Pat],
    continuation: &[Pat],
    result: impl Fn(&Context, NodeId) -> Attribute,
) {
    let mut current = context.arena.sub(parent);

    while let Some(id) = current {
        let Some(mut last) = match_at(context, id, basic) else {
            current = context.arena.next(id);
            continue;
        };

        let attribute = result(context, id);
        loop {
            match context.arena.next(last) {
                Some(after) => match match_at(context, after, continuation) {
                    Some(next_last) => last = next_last,
                    None => break,
                },
                None => break,
            }
        }

        let folded = fold_level(context, parent, id, last, attribute);
        current = context.arena.next(folded);
    }
}

// --- series assembly ----------------------------------------------------

const SEPARATORS: &[Attribute] = &[
    Attribute::GoOnSymbol,
    Attribute::CommaSymbol,
    Attribute::ExitSymbol,
];

/// Attributes opening a level that are not part of its reducible content.
fn is_level_prefix(attribute: Attribute) -> bool {
    matches!(
        attribute,
        Attribute::BeginSymbol
            | Attribute::OpenSymbol
            | Attribute::AccoSymbol
            | Attribute::SubSymbol
            | Attribute::IfSymbol
            | Attribute::ThenSymbol
            | Attribute::ElifSymbol
            | Attribute::ElseSymbol
            | Attribute::CaseSymbol
            | Attribute::InSymbol
            | Attribute::OuseSymbol
            | Attribute::OutSymbol
            | Attribute::DoSymbol
            | Attribute::UntilSymbol
            | Attribute::FromSymbol
            | Attribute::BySymbol
            | Attribute::ToSymbol
            | Attribute::DowntoSymbol
            | Attribute::WhileSymbol
            | Attribute::FormatDelimiterSymbol
    )
}

/// The reducible content of a level: everything between the leading keyword
/// or opener and the trailing closer / until part.
fn content_range(context: &Context, parent: NodeId) -> Option<(NodeId, NodeId)> {
    let head = context.arena.sub(parent)?;

    let first = if is_level_prefix(context.arena.attribute(head)) {
        context.arena.next(head)?
    } else {
        head
    };

    let mut last = context.arena.last_sibling(first);
    while last != first && context.arena.attribute(last).is_closer() {
        last = context.arena.prev(last)?;
    }
    while last != first && context.arena.attribute(last) == Attribute::UntilPart {
        last = context.arena.prev(last)?;
    }

    if context.arena.attribute(first).is_closer() {
        return None;
    }

    Some((first, last))
}

fn is_series_item(attribute: Attribute) -> bool {
    is_operand(attribute)
        || DECLARATIONS.contains(&attribute)
        || matches!(
            attribute,
            Attribute::LabeledUnit
                | Attribute::SpecifiedUnit
                | Attribute::SpecifiedUnitList
                | Attribute::InitialiserSeries
        )
}

/// Fold the level's content into its final clause category, validating the
/// separator structure and recovering with one diagnostic when the phrase
/// would not reduce.
fn assemble(context: &mut Context, parent: NodeId, expect: Expect) {
    if expect == Expect::CaseIn {
        reduce_all(
            context,
            parent,
            Attribute::SpecifiedUnit,
            &[
                Pat::Is(Attribute::Specifier),
                Pat::Is(Attribute::ColonSymbol),
                Pat::Operand,
            ],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::SpecifiedUnitList,
            &[
                Pat::OneOf(&[Attribute::SpecifiedUnit, Attribute::SpecifiedUnitList]),
                Pat::Is(Attribute::CommaSymbol),
                Pat::Is(Attribute::SpecifiedUnit),
            ],
            &[],
        );
    }

    reduce_all(
        context,
        parent,
        Attribute::LabeledUnit,
        &[
            Pat::Is(Attribute::Label),
            Pat::Is(Attribute::ColonSymbol),
            Pat::Operand,
        ],
        &[],
    );
    // A label before another labeled unit folds outward one layer at a time.
    while reduce_all(
        context,
        parent,
        Attribute::LabeledUnit,
        &[
            Pat::Is(Attribute::Label),
            Pat::Is(Attribute::ColonSymbol),
            Pat::Is(Attribute::LabeledUnit),
        ],
        &[],
    ) {}

    let Some((first, last)) = content_range(context, parent) else {
        let location = context.arena.get(parent).location;
        error_at(
            context,
            location,
            format!("{} expected", expect.describe()),
        );
        return;
    };

    // Count top-level separators to tell serial from collateral.
    let mut semicolons = 0usize;
    let mut commas = 0usize;
    for id in run(context, first, last) {
        match context.arena.attribute(id) {
            Attribute::GoOnSymbol | Attribute::ExitSymbol => semicolons += 1,
            Attribute::CommaSymbol => commas += 1,
            _ => {}
        }
    }

    let serial = commas == 0 || semicolons >= commas;
    if commas > 0 && semicolons > 0 {
        let location = context.arena.get(first).location;
        error_at(
            context,
            location,
            "';' and ',' are mixed as separators in one clause",
        );
    }

    validate_segments(context, first, last, expect);

    if serial && matches!(expect, Expect::Program | Expect::Series) {
        fold_initialisers(context, parent, first, last);
    }

    let (first, last) = content_range(context, parent).expect("content still present");

    match expect {
        Expect::Program => {
            // The whole program reduces to the single enclosed clause the
            // prelude wraps it in; nothing left to fold.
            if first != last {
                fold_level(context, parent, first, last, Attribute::SerialClause);
            }
        }
        Expect::Series => {
            let attribute = if serial {
                Attribute::SerialClause
            } else {
                Attribute::UnitList
            };
            fold_level(context, parent, first, last, attribute);
        }
        Expect::CaseIn => {
            fold_level(context, parent, first, last, Attribute::UnitList);
        }
        Expect::Enquiry => {
            fold_level(context, parent, first, last, Attribute::EnquiryClause);
        }
        Expect::UnitPart => {
            fold_level(context, parent, first, last, Attribute::Unit);
        }
        _ => unreachable!("assemble only runs for phrase levels"),
    }
}

/// Check that separators divide the content into single recognisable items;
/// report the first offence, describing the longest recognisable prefix.
fn validate_segments(context: &mut Context, first: NodeId, last: NodeId, expect: Expect) {
    let mut segment: Vec<NodeId> = Vec::new();
    let mut complained = false;

    let ids: Vec<NodeId> = run(context, first, last).collect();
    let mut index = 0;

    while index <= ids.len() {
        let boundary = index == ids.len()
            || SEPARATORS.contains(&context.arena.attribute(ids[index]));

        if boundary {
            let bad = segment.len() > 1
                || segment
                    .first()
                    .is_some_and(|&id| !is_series_item(context.arena.attribute(id)));

            if bad && !complained {
                complained = true;
                let head = segment[0];
                let location = context.arena.get(head).location;
                let mut message = format!(
                    "a construct beginning with {}",
                    describe(context, head)
                );
                if let Some(&second) = segment.get(1) {
                    message.push_str(&format!(" followed by {}", describe(context, second)));
                }
                message.push_str(&format!(
                    " cannot be parsed as part of a {}",
                    expect.describe()
                ));
                error_at(context, location, message);
            }
            segment.clear();
        } else {
            segment.push(ids[index]);
        }

        index += 1;
    }
}

/// Fold a leading run of declarations, including their separators, into an
/// initialiser series.
fn fold_initialisers(context: &mut Context, parent: NodeId, first: NodeId, last: NodeId) {
    if !DECLARATIONS.contains(&context.arena.attribute(first)) {
        return;
    }

    let mut end = None;
    let mut current = Some(first);
    while let Some(id) = current {
        if !DECLARATIONS.contains(&context.arena.attribute(id)) {
            break;
        }
        let Some(separator) = context.arena.next(id) else { break };
        if !matches!(context.arena.attribute(separator), Attribute::GoOnSymbol) {
            break;
        }
        end = Some(separator);
        if separator == last {
            break;
        }
        current = context.arena.next(separator);
    }

    if let Some(end) = end {
        fold_level(context, parent, first, end, Attribute::InitialiserSeries);
    }
}

/// Iterate the inclusive sibling run `first ..= last`.
fn run(context: &Context, first: NodeId, last: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let mut current = Some(first);
    std::iter::from_fn(move || {
        let id = current?;
        current = if id == last {
            None
        } else {
            context.arena.next(id)
        };
        Some(id)
    })
}

fn describe(context: &Context, id: NodeId) -> String {
    let node = context.arena.get(id);
    match node.text {
        Some(text) => format!("'{}'", context.interner.resolve(text)),
        None => format!("a {}", node.attribute),
    }
}

// --- packs, bounds and subscripts ---------------------------------------

/// Parameter packs declare into a fresh table hung between the routine text
/// and its enclosing reach.
fn reduce_parameter_pack(
    context: &mut Context,
    parent: NodeId,
    enclosing: TableId,
    depth: usize,
) -> Result<(), FatalError> {
    let table = context.tables.add(Some(enclosing));
    context.arena.assign_table(context.arena.sub(parent), table);
    tags::classify(context, table, parent);
    declarer_rules(context, parent, table, Expect::ParameterPack, depth)?;

    // declarer identifier (, identifier)* groups become parameters.
    let mut current = context.arena.sub(parent);
    while let Some(id) = current {
        current = context.arena.next(id);

        if context.arena.attribute(id) != Attribute::Identifier {
            continue;
        }
        let before = context.arena.prev(id).map(|p| context.arena.attribute(p));
        if !matches!(
            before,
            Some(Attribute::Declarer | Attribute::CommaSymbol)
        ) {
            continue;
        }

        let name = context.arena.get(id).text.expect("identifier text");
        context.tables.insert(
            table,
            TagKind::Identifier,
            Tag {
                name,
                node: Some(id),
                priority: 0,
                local_label: false,
            },
        );
        context.arena.set_attribute(id, Attribute::DefiningIdentifier);
    }

    reduce_all(
        context,
        parent,
        Attribute::Parameter,
        &[Pat::Is(Attribute::Declarer), Pat::Is(Attribute::DefiningIdentifier)],
        &[],
    );
    // A parameter without its own declarer shares the preceding one.
    reduce_all(
        context,
        parent,
        Attribute::ParameterList,
        &[
            Pat::OneOf(&[Attribute::Parameter, Attribute::ParameterList]),
            Pat::Is(Attribute::CommaSymbol),
            Pat::OneOf(&[Attribute::Parameter, Attribute::DefiningIdentifier]),
        ],
        &[],
    );

    context.arena.set_attribute(parent, Attribute::ParameterPack);

    Ok(())
}

/// Structure, union and formal-declarer packs, and case specifiers: declarer
/// material with optional field or specifier identifiers.
fn reduce_pack(
    context: &mut Context,
    parent: NodeId,
    enclosing: TableId,
    expect: Expect,
    depth: usize,
) -> Result<(), FatalError> {
    tags::classify(context, enclosing, parent);
    declarer_rules(context, parent, enclosing, expect, depth)?;

    let marker = match expect {
        Expect::StructPack => Some(Attribute::FieldIdentifier),
        Expect::Specifier => Some(Attribute::DefiningIdentifier),
        _ => None,
    };

    if let Some(marker) = marker {
        let mut current = context.arena.sub(parent);
        while let Some(id) = current {
            current = context.arena.next(id);

            if context.arena.attribute(id) != Attribute::Identifier {
                continue;
            }
            let before = context.arena.prev(id).map(|p| context.arena.attribute(p));
            if matches!(before, Some(Attribute::Declarer | Attribute::CommaSymbol)) {
                context.arena.set_attribute(id, marker);
            }
        }
    }

    let attribute = match expect {
        Expect::StructPack => Attribute::StructurePack,
        Expect::UnionPack => Attribute::UnionPack,
        Expect::FormalDeclarers => Attribute::FormalDeclarers,
        Expect::Specifier => Attribute::Specifier,
        _ => unreachable!("reduce_pack only handles pack categories"),
    };
    context.arena.set_attribute(parent, attribute);

    Ok(())
}

/// Bounds (in declarers) and subscripts (in slices): full unit reduction of
/// the content, then bound, trimmer and list folding.
fn reduce_bracketed(
    context: &mut Context,
    parent: NodeId,
    enclosing: TableId,
    expect: Expect,
    depth: usize,
) -> Result<(), FatalError> {
    context.arena.assign_table(context.arena.sub(parent), enclosing);
    tags::classify(context, enclosing, parent);

    primaries(context, parent, enclosing, depth)?;
    selections(context, parent);
    formulas(context, parent, enclosing);
    tertiaries(context, parent);
    right_to_left(context, parent);

    if expect == Expect::Bounds {
        reduce_all(
            context,
            parent,
            Attribute::Bound,
            &[Pat::Operand, Pat::Is(Attribute::ColonSymbol), Pat::Operand],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::Bound,
            &[Pat::Is(Attribute::ColonSymbol), Pat::Operand],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::Bound,
            &[Pat::Operand],
            &[Attribute::ColonSymbol],
        );
        let any_bound = reduce_all(
            context,
            parent,
            Attribute::BoundsList,
            &[
                Pat::OneOf(&[Attribute::Bound, Attribute::BoundsList]),
                Pat::Is(Attribute::CommaSymbol),
                Pat::Is(Attribute::Bound),
            ],
            &[],
        ) || context
            .arena
            .siblings(context.arena.sub(parent))
            .any(|id| context.arena.attribute(id) == Attribute::Bound);

        // `[]` and `[,]` carry no actual bounds.
        if !any_bound {
            context.arena.set_attribute(parent, Attribute::FormalBounds);
        }
    } else {
        // Trimmers, longest forms first.
        reduce_all(
            context,
            parent,
            Attribute::Trimmer,
            &[
                Pat::Operand,
                Pat::Is(Attribute::ColonSymbol),
                Pat::Operand,
                Pat::Is(Attribute::AtSymbol),
                Pat::Operand,
            ],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::Trimmer,
            &[Pat::Operand, Pat::Is(Attribute::ColonSymbol), Pat::Operand],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::Trimmer,
            &[Pat::Operand, Pat::Is(Attribute::ColonSymbol)],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::Trimmer,
            &[Pat::Is(Attribute::ColonSymbol), Pat::Operand],
            &[],
        );
        reduce_all(
            context,
            parent,
            Attribute::GenericArgument,
            &[Pat::Operand],
            &[Attribute::ColonSymbol, Attribute::AtSymbol],
        );
        reduce_all(
            context,
            parent,
            Attribute::GenericArgumentList,
            &[
                Pat::OneOf(&[
                    Attribute::GenericArgument,
                    Attribute::GenericArgumentList,
                    Attribute::Trimmer,
                ]),
                Pat::Is(Attribute::CommaSymbol),
                Pat::OneOf(&[Attribute::GenericArgument, Attribute::Trimmer]),
            ],
            &[],
        );
    }

    if context.diagnostics.exhausted() {
        return Err(FatalError::TooManyErrors);
    }

    Ok(())
}
