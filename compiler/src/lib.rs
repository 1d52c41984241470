//! Front end of an Algol 68 interpreter: scanner and parser.
//!
//! The pipeline turns raw source text into a fully resolved syntax tree ready
//! for mode checking: source lines (with prelude/postlude and includes) are
//! tokenised into a flat node list, refinements are substituted, brackets are
//! checked, the list is carved top-down into enclosed-clause parts, and each
//! scope is then reduced bottom-up after a per-scope declaration pre-pass.

pub mod diagnostics;
pub mod helpers;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod source;
pub mod syntax;

use diagnostics::Diagnostics;
use helpers::Interner;
use options::ProgramOptions;
use source::{Loader, SourceStore};
use syntax::{NodeArena, NodeId, TableArena};

/// An error that aborts a whole pass: continuing would only cascade
/// meaningless diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// I/O failure or malformed include directive while building the source
    /// store.
    #[error("{path}: {message}")]
    Source { path: String, message: String },

    /// The scanner could not tokenise the input.
    #[error("{path}:{line}:{column}: {message}")]
    Lex {
        path: String,
        line: i32,
        column: u32,
        message: String,
    },

    /// Paired delimiters do not balance; the message names every unmatched
    /// kind.
    #[error("{path}: {message}")]
    Bracket { path: String, message: String },

    /// An expected token was not found during top-down structuring.
    #[error("{path}:{line}:{column}: {message}")]
    Structure {
        path: String,
        line: i32,
        column: u32,
        message: String,
    },

    /// Nesting exceeded the recursion guard.
    #[error("program is nested too deeply")]
    Resource,

    /// The global error ceiling was exceeded.
    #[error("too many errors, giving up")]
    TooManyErrors,
}

/// State shared by every pass of one compilation: the interning table, the
/// node and symbol-table arenas, the options and the diagnostics sink.
/// Constructed once per compilation; there are no process-wide statics.
#[derive(Debug)]
pub struct Context {
    pub options: ProgramOptions,
    pub interner: Interner,
    pub arena: NodeArena,
    pub tables: TableArena,
    pub diagnostics: Diagnostics,
}

impl Context {
    pub fn new(options: ProgramOptions) -> Self {
        Context {
            options,
            interner: Interner::new(),
            arena: NodeArena::new(),
            tables: TableArena::new(),
            diagnostics: Diagnostics::new(),
        }
    }
}

/// The outcome of a parse: a tree (present unless a pass aborted) and the
/// context that owns it, including the ordered diagnostics.
#[derive(Debug)]
pub struct Parsed {
    /// Root of the tree, a `ParticularProgram` node, unless a fatal pass
    /// failure stopped the pipeline early.
    pub root: Option<NodeId>,
    pub context: Context,
}

impl Parsed {
    /// Whether the program parsed without any diagnostics at all.
    pub fn is_clean(&self) -> bool {
        self.root.is_some() && self.context.diagnostics.is_empty()
    }
}

/// Run the whole front end over `path`. Fatal pass failures are folded into
/// the diagnostics and yield a `Parsed` without a tree.
pub fn parse_program(options: ProgramOptions, loader: &dyn Loader, path: &str) -> Parsed {
    let mut context = Context::new(options);

    match parse_program_inner(&mut context, loader, path) {
        Ok(root) => Parsed {
            root: Some(root),
            context,
        },
        Err(fatal) => {
            log::debug!("parse aborted: {}", fatal);
            record_fatal(&mut context, path, &fatal);
            Parsed {
                root: None,
                context,
            }
        }
    }
}

fn parse_program_inner(
    context: &mut Context,
    loader: &dyn Loader,
    path: &str,
) -> Result<NodeId, FatalError> {
    let store = SourceStore::build(&context.options, loader, path, &mut context.interner)?;

    let tokens = lexer::tokenize(context, &store)?;
    let tokens = parser::refinement::expand(context, tokens);
    parser::brackets::check(context, tokens)?;
    let root = parser::parse(context, tokens)?;

    Ok(root)
}

fn record_fatal(context: &mut Context, path: &str, fatal: &FatalError) {
    use diagnostics::{Diagnostic, Severity};

    let (path, line, column, message) = match fatal {
        FatalError::Source { path, message } | FatalError::Bracket { path, message } => {
            (path.clone(), 0, 0, message.clone())
        }
        FatalError::Lex {
            path,
            line,
            column,
            message,
        }
        | FatalError::Structure {
            path,
            line,
            column,
            message,
        } => (path.clone(), *line, *column, message.clone()),
        FatalError::Resource | FatalError::TooManyErrors => {
            (path.to_string(), 0, 0, fatal.to_string())
        }
    };

    context.diagnostics.add(Diagnostic {
        severity: Severity::Error,
        path,
        line,
        column,
        message,
    });
}
