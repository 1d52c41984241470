//! Program options handed in by the driver layer.

use serde::Serialize;

/// The lexical convention distinguishing reserved words from identifiers.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Stropping {
    /// Reserved words are bare upper-case runs (`BEGIN`); identifiers are
    /// lower case.
    #[default]
    Bold,

    /// Reserved words are quoted upper-case runs (`'BEGIN'`); ordinary
    /// identifiers are upper case.
    Quote,
}

/// Options the front end receives from the (external) CLI layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramOptions {
    /// The stropping regime the source is written in.
    pub stropping: Stropping,

    /// Treat `[ ]` and `{ }` as alternate spellings of `( )`.
    pub bracketed_clauses: bool,

    /// Emit warnings for constructs that are not portable Algol 68.
    pub portability_warnings: bool,
}
