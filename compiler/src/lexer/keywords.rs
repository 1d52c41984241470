//! The reserved-word table.
//!
//! Both stropping regimes normalise to the same canonical upper-case
//! spelling before lookup, so `BEGIN` and `'BEGIN'` classify identically.

use crate::syntax::Attribute;
use lazy_static::lazy_static;
use std::collections::BTreeMap;

lazy_static! {
    /// Ordered table mapping canonical spelling to terminal attribute.
    pub static ref KEYWORDS: BTreeMap<&'static str, Attribute> = {
        use Attribute::*;

        BTreeMap::from([
            ("AT", AtSymbol),
            ("ANDF", AndfSymbol),
            ("BEGIN", BeginSymbol),
            ("BITS", BitsSymbol),
            ("BOOL", BoolSymbol),
            ("BY", BySymbol),
            ("BYTES", BytesSymbol),
            ("CASE", CaseSymbol),
            ("CHANNEL", ChannelSymbol),
            ("CHAR", CharSymbol),
            ("CODE", CodeSymbol),
            ("COL", ColumnSymbol),
            ("COMPL", ComplSymbol),
            ("DIAG", DiagonalSymbol),
            ("DO", DoSymbol),
            ("DOWNTO", DowntoSymbol),
            ("EDOC", EdocSymbol),
            ("ELIF", ElifSymbol),
            ("ELSE", ElseSymbol),
            ("ELSF", OrfSymbol),
            ("EMPTY", EmptySymbol),
            ("END", EndSymbol),
            ("ESAC", EsacSymbol),
            ("EXIT", ExitSymbol),
            ("FALSE", FalseSymbol),
            ("FI", FiSymbol),
            ("FILE", FileSymbol),
            ("FLEX", FlexSymbol),
            ("FOR", ForSymbol),
            ("FORMAT", FormatSymbol),
            ("FROM", FromSymbol),
            ("GO", GoSymbol),
            ("GOTO", GotoSymbol),
            ("HEAP", HeapSymbol),
            ("IF", IfSymbol),
            ("IN", InSymbol),
            ("INT", IntSymbol),
            ("IS", IsSymbol),
            ("ISNT", IsntSymbol),
            ("LOC", LocSymbol),
            ("LONG", LongSymbol),
            ("MODE", ModeSymbol),
            ("NEW", NewSymbol),
            ("NIL", NilSymbol),
            ("OD", OdSymbol),
            ("OF", OfSymbol),
            ("OP", OpSymbol),
            ("ORF", OrfSymbol),
            ("OUSE", OuseSymbol),
            ("OUT", OutSymbol),
            ("PAR", ParSymbol),
            ("PRIO", PrioSymbol),
            ("PROC", ProcSymbol),
            ("REAL", RealSymbol),
            ("REF", RefSymbol),
            ("ROW", RowSymbol),
            ("SEMA", SemaSymbol),
            ("SHORT", ShortSymbol),
            ("SKIP", SkipSymbol),
            ("STRING", StringSymbol),
            ("STRUCT", StructSymbol),
            ("THEF", AndfSymbol),
            ("THEN", ThenSymbol),
            ("TO", ToSymbol),
            ("TRNSP", TransposeSymbol),
            ("TRUE", TrueSymbol),
            ("UNION", UnionSymbol),
            ("UNTIL", UntilSymbol),
            ("VOID", VoidSymbol),
            ("WHILE", WhileSymbol),
        ])
    };
}

/// Look up a bold word after normalisation. `None` means the word is a user
/// tag (indicant or operator, decided by the tag resolver).
pub fn lookup(word: &str) -> Option<Attribute> {
    KEYWORDS.get(word).copied()
}

/// Bold words that, while not reserved, name standard operators; they stay
/// `BoldTag` at lexing time and are classified through the standard
/// environment's operator tags.
pub const STANDARD_MONADS: &[&str] = &[
    "ABS", "ARG", "BIN", "CONJ", "DOWN", "ENTIER", "IM", "LENG", "LEVEL", "NOT", "ODD", "RE",
    "REPR", "ROUND", "SHORTEN", "SIGN", "UP",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_and_aliases() {
        assert_eq!(lookup("BEGIN"), Some(Attribute::BeginSymbol));
        assert_eq!(lookup("ELSF"), Some(Attribute::OrfSymbol));
        assert_eq!(lookup("THEF"), Some(Attribute::AndfSymbol));
        assert_eq!(lookup("FOO"), None);
    }
}
