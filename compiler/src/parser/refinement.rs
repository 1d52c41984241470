//! Stepwise-refinement substitution.
//!
//! A program may be written as a main program terminated by a point, followed
//! by refinement definitions of the form `name : body .`. Each bare
//! identifier in the main program naming a refinement is replaced in place by
//! the refinement's body, and scanning resumes at the start of the spliced-in
//! body so refinements may invoke other refinements. Every refinement must be
//! applied exactly once: a second application is an error, an unapplied
//! definition a warning.

use crate::helpers::Symbol;
use crate::syntax::{Attribute, Location, NodeId};
use crate::Context;

struct Refinement {
    name: Symbol,
    location: Location,
    first: NodeId,
    last: NodeId,
    applied: u32,
}

/// Substitute refinements into the token list. Returns the (unchanged) head;
/// problems are reported through the diagnostics sink and the parse goes on
/// with whatever could be substituted.
pub fn expand(context: &mut Context, tokens: NodeId) -> NodeId {
    let Some(first_user) = first_user_token(context, tokens) else {
        return tokens;
    };

    // Without a top-level point there are no refinements.
    let Some(main_end) = find_point(context, first_user) else {
        return tokens;
    };

    let refinements = collect_definitions(context, main_end);

    let mut substituted = refinements;
    apply(context, first_user, &mut substituted);

    for refinement in &substituted {
        if refinement.applied == 0 {
            let name = context.interner.resolve(refinement.name).to_string();
            super::warning_at(
                context,
                refinement.location,
                format!("refinement '{name}' is never applied"),
            );
        }
    }

    tokens
}

fn first_user_token(context: &Context, tokens: NodeId) -> Option<NodeId> {
    context
        .arena
        .siblings(Some(tokens))
        .find(|&id| context.arena.get(id).location.line > 0)
}

/// The next top-level point symbol within user text, if any.
fn find_point(context: &Context, from: NodeId) -> Option<NodeId> {
    for id in context.arena.siblings(Some(from)) {
        let node = context.arena.get(id);
        if node.location.line <= 0 {
            return None;
        }
        if node.attribute == Attribute::PointSymbol {
            return Some(id);
        }
    }
    None
}

/// Collect `name : body .` definitions following the main program's
/// terminating point, then cut the whole definition region (including that
/// point) out of the token list.
fn collect_definitions(context: &mut Context, main_end: NodeId) -> Vec<Refinement> {
    let mut refinements: Vec<Refinement> = Vec::new();
    let mut last_consumed = main_end;
    let mut cursor = context.arena.next(main_end);

    loop {
        let Some(id) = cursor else { break };
        let node = context.arena.get(id);
        if node.location.line <= 0 {
            break;
        }

        let location = node.location;

        if node.attribute != Attribute::Identifier {
            super::error_at(context, location, "refinement name expected");
            last_consumed = last_user_token(context, id);
            break;
        }
        let name = node.text.expect("identifier tokens carry text");

        let colon = context.arena.next(id);
        if colon.map(|c| context.arena.attribute(c)) != Some(Attribute::ColonSymbol) {
            let text = context.interner.resolve(name).to_string();
            super::error_at(
                context,
                location,
                format!("':' expected after refinement name '{text}'"),
            );
            last_consumed = last_user_token(context, id);
            break;
        }
        let colon = colon.expect("checked above");

        let Some(body_first) = context.arena.next(colon) else {
            super::error_at(context, location, "refinement is not terminated by '.'");
            last_consumed = colon;
            break;
        };

        let Some(point) = find_point(context, body_first) else {
            let text = context.interner.resolve(name).to_string();
            super::error_at(
                context,
                location,
                format!("refinement '{text}' is not terminated by '.'"),
            );
            last_consumed = last_user_token(context, body_first);
            break;
        };

        if body_first == point {
            let text = context.interner.resolve(name).to_string();
            super::error_at(context, location, format!("refinement '{text}' has an empty body"));
        } else if refinements.iter().any(|r| r.name == name) {
            let text = context.interner.resolve(name).to_string();
            super::error_at(
                context,
                location,
                format!("refinement '{text}' is defined more than once"),
            );
        } else {
            refinements.push(Refinement {
                name,
                location,
                first: body_first,
                last: context.arena.prev(point).expect("body precedes its point"),
                applied: 0,
            });
        }

        last_consumed = point;
        cursor = context.arena.next(point);
    }

    context.arena.cut(main_end, last_consumed);

    refinements
}

fn last_user_token(context: &Context, from: NodeId) -> NodeId {
    let mut last = from;
    for id in context.arena.siblings(Some(from)) {
        if context.arena.get(id).location.line <= 0 {
            break;
        }
        last = id;
    }
    last
}

/// Walk the main program substituting refinement invocations in place.
fn apply(context: &mut Context, first_user: NodeId, refinements: &mut [Refinement]) {
    let mut cursor = Some(first_user);

    while let Some(id) = cursor {
        let node = context.arena.get(id);
        if node.location.line <= 0 {
            return;
        }

        if node.attribute == Attribute::Identifier {
            let text = node.text;
            let location = node.location;
            if let Some(refinement) = refinements.iter_mut().find(|r| Some(r.name) == text) {
                if refinement.applied > 0 {
                    let name = context.interner.resolve(refinement.name).to_string();
                    super::error_at(
                        context,
                        location,
                        format!("refinement '{name}' is applied more than once"),
                    );
                } else {
                    refinement.applied += 1;
                    let (first, last) = (refinement.first, refinement.last);
                    context.arena.splice_over(id, first, last);
                    // Rescan from the start of the body so refinements may
                    // invoke other refinements.
                    cursor = Some(first);
                    continue;
                }
            }
        }

        cursor = context.arena.next(id);
    }
}
