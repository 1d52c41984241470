//! String interning shared by every pass.

use lasso::Rodeo;
use std::fmt;

/// An interned string. Two symbols are equal exactly when the strings they
/// were interned from are equal, so comparisons are key comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(lasso::Spur);

/// The token/text interning table. One per compilation, owned by the
/// [`Context`](crate::Context); distinct strings are written once and read
/// many times.
#[derive(Debug)]
pub struct Interner {
    rodeo: Rodeo,
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            rodeo: Rodeo::default(),
        }
    }

    pub fn intern(&mut self, s: impl AsRef<str>) -> Symbol {
        Symbol(self.rodeo.get_or_intern(s.as_ref()))
    }

    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.rodeo.resolve(&symbol.0)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Interner::new()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol#{:?}", self.0)
    }
}
