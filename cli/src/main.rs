//! Command-line driver: parse a source file, print diagnostics and
//! optionally the reduced tree.

#![allow(clippy::print_stderr)]

use algol68_compiler::options::{ProgramOptions, Stropping};
use algol68_compiler::source::FileLoader;
use algol68_compiler::parse_program;
use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "a68", version, about = "Parse an Algol 68 program")]
struct Args {
    /// Source file to parse.
    file: String,

    /// Stropping regime of the source.
    #[arg(long, default_value = "bold")]
    stropping: Stropping,

    /// Treat `[ ]` and `{ }` as alternate spellings of `( )`.
    #[arg(long)]
    bracketed_clauses: bool,

    /// Warn about constructs that are not portable Algol 68.
    #[arg(long)]
    portability_warnings: bool,

    /// Print the reduced tree as an s-expression.
    #[arg(long)]
    tree: bool,

    /// Print the reduced tree as JSON.
    #[arg(long, conflicts_with = "tree")]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = ProgramOptions {
        stropping: args.stropping,
        bracketed_clauses: args.bracketed_clauses,
        portability_warnings: args.portability_warnings,
    };
    let parsed = parse_program(options, &FileLoader, &args.file);

    for diagnostic in parsed.context.diagnostics.iter() {
        eprintln!("{diagnostic}");
    }

    if let Some(root) = parsed.root {
        if args.json {
            let tree = parsed.context.arena.to_json(&parsed.context.interner, root);
            println!("{}", serde_json::to_string_pretty(&tree)?);
        } else if args.tree {
            println!("{}", parsed.context.arena.render(&parsed.context.interner, root));
        }
    }

    if parsed.root.is_none() || parsed.context.diagnostics.error_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}
