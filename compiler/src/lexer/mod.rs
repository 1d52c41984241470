//! The scanner: source lines in, a flat list of attributed token nodes out.
//!
//! The scanner is stateful by necessity: the stropping regime decides how
//! words are read, a one-token save/restore slot gives bounded look-ahead for
//! denotations, and format texts (`$ ... $`) switch the whole scanner into a
//! mode where single characters are format items. An enclosed clause inside a
//! format (a dynamic replicator `n(...)` or a general pattern `g(...)`)
//! recursively re-enters ordinary mode and resumes format mode afterwards.

pub mod keywords;

use crate::options::Stropping;
use crate::source::SourceStore;
use crate::syntax::{Attribute, Location, NodeId};
use crate::{Context, FatalError};

/// Recursion guard for format-mode re-entry and deeply nested brackets
/// inside formats.
const MAX_DEPTH: usize = 1000;

// Operator composition character classes. An operator is a monad or nomad,
// optionally followed by a nomad, optionally followed by `:=` or `=:`.
const MONADS: &str = "%^&+-~!?";
const NOMADS: &str = "></=*";

/// Extensions beyond the revised report, flagged when portability warnings
/// are requested.
const NON_PORTABLE: &[&str] = &[
    "ANDF", "COL", "DIAG", "DOWNTO", "ELSF", "NEW", "ORF", "ROW", "THEF", "TRNSP", "UNTIL",
];

/// Tokenise the whole store. Returns the head of the token list.
pub fn tokenize(context: &mut Context, store: &SourceStore) -> Result<NodeId, FatalError> {
    let mut lexer = Lexer {
        context,
        store,
        line: 0,
        column: 0,
        saved: None,
        head: None,
        tail: None,
        depth: 0,
    };

    lexer.run()?;

    lexer.head.ok_or(FatalError::Source {
        path: String::new(),
        message: "empty program".to_string(),
    })
}

struct Lexer<'a> {
    context: &'a mut Context,
    store: &'a SourceStore,
    /// Line index into the store (not the user-facing line number).
    line: usize,
    /// Byte offset into the current line.
    column: usize,
    /// One-position save slot for bounded look-ahead.
    saved: Option<(usize, usize)>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    depth: usize,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), FatalError> {
        while self.peek().is_some() {
            self.scan_token()?;
        }
        Ok(())
    }

    // --- cursor -----------------------------------------------------------

    fn peek(&self) -> Option<char> {
        let line = self.store.lines.get(self.line)?;
        line.text[self.column..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        let line = self.store.lines.get(self.line)?;
        line.text[self.column..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.column += c.len_utf8();
        if self.column >= self.store.lines[self.line].text.len() {
            self.line += 1;
            self.column = 0;
        }
        Some(c)
    }

    fn save(&mut self) {
        self.saved = Some((self.line, self.column));
    }

    fn restore(&mut self) {
        if let Some((line, column)) = self.saved.take() {
            self.line = line;
            self.column = column;
        }
    }

    fn location(&self) -> Location {
        match self.store.lines.get(self.line) {
            Some(line) => Location {
                path: line.path,
                line: line.number,
                column: self.column as u32 + 1,
            },
            None => {
                // End of input: attribute to the last line.
                let line = self.store.lines.last().expect("store is never empty");
                Location {
                    path: line.path,
                    line: line.number,
                    column: line.text.len() as u32,
                }
            }
        }
    }

    fn fatal(&self, location: Location, message: impl Into<String>) -> FatalError {
        FatalError::Lex {
            path: self
                .context
                .interner
                .resolve(location.path)
                .to_string(),
            line: location.line,
            column: location.column,
            message: message.into(),
        }
    }

    // --- emission ---------------------------------------------------------

    fn emit(&mut self, attribute: Attribute, text: &str, location: Location) -> NodeId {
        let symbol = self.context.interner.intern(text);
        let id = self.context.arena.add(attribute, Some(symbol), location);

        match self.tail {
            Some(tail) => self.context.arena.link(tail, id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        id
    }

    // --- ordinary mode ----------------------------------------------------

    fn scan_token(&mut self) -> Result<(), FatalError> {
        let location = self.location();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(()),
        };

        match c {
            c if c.is_whitespace() => {
                self.bump();
                Ok(())
            }
            '#' => self.skip_brief_comment(location),
            '"' => self.scan_string(location),
            '\'' => match self.context.options.stropping {
                Stropping::Quote => self.scan_quoted_word(location),
                Stropping::Bold => Err(self.fatal(location, "unworthy character '''")),
            },
            '0'..='9' => self.scan_number(location),
            '.' => self.scan_point(location),
            '$' => {
                self.bump();
                self.emit(Attribute::FormatDelimiterSymbol, "$", location);
                self.scan_format(location)
            }
            '(' => self.punct(Attribute::OpenSymbol, "(", location),
            ')' => self.punct(Attribute::CloseSymbol, ")", location),
            '[' => {
                let attribute = if self.context.options.bracketed_clauses {
                    Attribute::OpenSymbol
                } else {
                    Attribute::SubSymbol
                };
                self.punct(attribute, "[", location)
            }
            ']' => {
                let attribute = if self.context.options.bracketed_clauses {
                    Attribute::CloseSymbol
                } else {
                    Attribute::BusSymbol
                };
                self.punct(attribute, "]", location)
            }
            '{' => {
                let attribute = if self.context.options.bracketed_clauses {
                    Attribute::OpenSymbol
                } else {
                    Attribute::AccoSymbol
                };
                self.punct(attribute, "{", location)
            }
            '}' => {
                let attribute = if self.context.options.bracketed_clauses {
                    Attribute::CloseSymbol
                } else {
                    Attribute::OccaSymbol
                };
                self.punct(attribute, "}", location)
            }
            ';' => self.punct(Attribute::GoOnSymbol, ";", location),
            ',' => self.punct(Attribute::CommaSymbol, ",", location),
            '@' => self.punct(Attribute::AtSymbol, "@", location),
            ':' => self.scan_colon(location),
            c if MONADS.contains(c) || NOMADS.contains(c) => self.scan_operator(location),
            c if c.is_ascii_uppercase() => match self.context.options.stropping {
                Stropping::Bold => self.scan_bold_word(location),
                Stropping::Quote => self.scan_identifier(location),
            },
            c if c.is_ascii_lowercase() => self.scan_identifier(location),
            c => Err(self.fatal(location, format!("unworthy character '{c}'"))),
        }
    }

    fn punct(
        &mut self,
        attribute: Attribute,
        text: &str,
        location: Location,
    ) -> Result<(), FatalError> {
        self.bump();
        self.emit(attribute, text, location);
        Ok(())
    }

    fn skip_brief_comment(&mut self, location: Location) -> Result<(), FatalError> {
        self.bump();
        loop {
            match self.bump() {
                Some('#') => return Ok(()),
                Some(_) => {}
                None => return Err(self.fatal(location, "unterminated comment")),
            }
        }
    }

    /// A string denotation, `"`-delimited; a doubled quote is an escaped
    /// quote. A string not closed before the end of the line is an error.
    fn scan_string(&mut self, location: Location) -> Result<(), FatalError> {
        self.bump();
        let mut text = String::new();

        loop {
            match self.peek() {
                Some('"') => {
                    self.bump();
                    if self.peek() == Some('"') {
                        self.bump();
                        text.push('"');
                    } else {
                        self.emit(Attribute::RowCharDenotation, &text, location);
                        return Ok(());
                    }
                }
                Some('\n') | None => {
                    return Err(self.fatal(location, "unterminated string denotation"));
                }
                Some(c) => {
                    self.bump();
                    text.push(c);
                }
            }
        }
    }

    /// Quote-stropped bold word: `'BEGIN'`.
    fn scan_quoted_word(&mut self, location: Location) -> Result<(), FatalError> {
        self.bump();
        let mut word = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    self.bump();
                    break;
                }
                Some(c) if c.is_ascii_uppercase() => {
                    self.bump();
                    word.push(c);
                }
                Some(c) if c == ' ' => {
                    // Typographical display: spaces inside a bold word are
                    // insignificant.
                    self.bump();
                }
                _ => return Err(self.fatal(location, "unterminated quoted bold word")),
            }
        }

        if word.is_empty() {
            return Err(self.fatal(location, "quoted bold word with zero letters"));
        }

        // Comment and pragmat openers are intercepted before keyword lookup,
        // as in the bold regime; the terminator is matched in its quoted
        // spelling.
        match word.as_str() {
            "CO" | "COMMENT" => return self.skip_quoted_comment(&word, location),
            "PR" | "PRAGMAT" => return self.skip_quoted_pragmat(&word, location),
            _ => {}
        }

        self.classify_bold_word(&word, location)
    }

    /// Bold-stropped reserved word or user tag: a maximal upper-case run.
    fn scan_bold_word(&mut self, location: Location) -> Result<(), FatalError> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_uppercase() {
                self.bump();
                word.push(c);
            } else {
                break;
            }
        }

        // Comment and pragmat openers are handled here, before keyword
        // lookup, because their contents are opaque to the grammar.
        match word.as_str() {
            "CO" | "COMMENT" => return self.skip_bold_comment(&word, location),
            "PR" | "PRAGMAT" => return self.skip_pragmat(&word, location),
            _ => {}
        }

        self.classify_bold_word(&word, location)
    }

    fn classify_bold_word(&mut self, word: &str, location: Location) -> Result<(), FatalError> {
        if self.context.options.portability_warnings && NON_PORTABLE.contains(&word) {
            let path = self.context.interner.resolve(location.path).to_string();
            self.context.diagnostics.warning(
                &path,
                location.line,
                location.column,
                format!("'{word}' is not portable Algol 68"),
            );
        }

        match keywords::lookup(word) {
            Some(attribute) => {
                self.emit(attribute, word, location);
            }
            None => {
                self.emit(Attribute::BoldTag, word, location);
            }
        }
        Ok(())
    }

    /// Skip a `CO ... CO` / `COMMENT ... COMMENT` run.
    fn skip_bold_comment(&mut self, opener: &str, location: Location) -> Result<(), FatalError> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_uppercase() => {
                    let mut word = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_uppercase() {
                            self.bump();
                            word.push(c);
                        } else {
                            break;
                        }
                    }
                    if word == opener {
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.fatal(location, "unterminated comment")),
            }
        }
    }

    /// Skip a pragmat. Include directives were already consumed by the
    /// source store; remaining pragmat content (pragmat options) is ignored,
    /// but embedded strings must be skipped so a quoted `PR` cannot
    /// terminate the run early.
    fn skip_pragmat(&mut self, opener: &str, location: Location) -> Result<(), FatalError> {
        loop {
            match self.peek() {
                Some('"') => {
                    let at = self.location();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('"') => break,
                            Some('\n') | None => {
                                return Err(self.fatal(at, "unterminated string in pragmat"));
                            }
                            Some(_) => {}
                        }
                    }
                }
                Some(c) if c.is_ascii_uppercase() => {
                    let mut word = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_uppercase() {
                            self.bump();
                            word.push(c);
                        } else {
                            break;
                        }
                    }
                    if word == opener {
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.fatal(location, "unterminated pragmat")),
            }
        }
    }

    /// Skip a `'CO' ... 'CO'` / `'COMMENT' ... 'COMMENT'` run in the quote
    /// regime.
    fn skip_quoted_comment(&mut self, opener: &str, location: Location) -> Result<(), FatalError> {
        loop {
            match self.peek() {
                Some('\'') => {
                    if self.quoted_word_matches(opener) {
                        return Ok(());
                    }
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.fatal(location, "unterminated comment")),
            }
        }
    }

    /// Skip a quote-regime pragmat. As in the bold regime, embedded strings
    /// are opaque so a quoted `'PR'` inside one cannot terminate the run.
    fn skip_quoted_pragmat(&mut self, opener: &str, location: Location) -> Result<(), FatalError> {
        loop {
            match self.peek() {
                Some('"') => {
                    let at = self.location();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('"') => break,
                            Some('\n') | None => {
                                return Err(self.fatal(at, "unterminated string in pragmat"));
                            }
                            Some(_) => {}
                        }
                    }
                }
                Some('\'') => {
                    if self.quoted_word_matches(opener) {
                        return Ok(());
                    }
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
                None => return Err(self.fatal(location, "unterminated pragmat")),
            }
        }
    }

    /// Consume the quoted bold word at the cursor when it spells `opener`;
    /// otherwise leave the cursor on the opening quote.
    fn quoted_word_matches(&mut self, opener: &str) -> bool {
        self.save();
        self.bump();
        let mut word = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    self.bump();
                    break;
                }
                Some(c) if c.is_ascii_uppercase() => {
                    self.bump();
                    word.push(c);
                }
                Some(' ') => {
                    self.bump();
                }
                _ => {
                    self.restore();
                    return false;
                }
            }
        }

        if word == opener {
            self.saved = None;
            true
        } else {
            self.restore();
            false
        }
    }

    /// Identifier: a letter followed by letters, digits and underscores.
    fn scan_identifier(&mut self, location: Location) -> Result<(), FatalError> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump();
                text.push(c);
            } else {
                break;
            }
        }

        self.emit(Attribute::Identifier, &text, location);
        Ok(())
    }

    /// Numeric denotations with maximal munch and bounded look-ahead:
    /// `123`, `123.45`, `123e6`, `123.45e-6`, `16r1f`.
    fn scan_number(&mut self, location: Location) -> Result<(), FatalError> {
        let mut text = String::new();
        self.digits(&mut text);

        // Radix notation: digits `r` radix-digits is a bits denotation.
        if self.peek() == Some('r') || self.peek() == Some('R') {
            self.save();
            let marker = self.bump().expect("marker was peeked");
            if self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                text.push(marker);
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphanumeric() {
                        self.bump();
                        text.push(c);
                    } else {
                        break;
                    }
                }
                self.emit(Attribute::BitsDenotation, &text, location);
                return Ok(());
            }
            // Just an identifier starting with `r` after the number.
            self.restore();
        }

        let mut real = false;

        // A point makes it a real denotation only when a digit follows;
        // otherwise the point is a separate symbol (refinement terminator).
        if self.peek() == Some('.') {
            self.save();
            self.bump();
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                real = true;
                text.push('.');
                self.digits(&mut text);
            } else {
                self.restore();
            }
        }

        // An `e` is an exponent marker only when (sign and) digits follow;
        // otherwise it starts an identifier.
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.save();
            self.bump();
            let mut exponent = String::from("e");
            if matches!(self.peek(), Some('+') | Some('-')) {
                exponent.push(self.bump().unwrap());
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                real = true;
                text.push_str(&exponent);
                self.digits(&mut text);
            } else {
                self.restore();
            }
        }

        let attribute = if real {
            Attribute::RealDenotation
        } else {
            Attribute::IntDenotation
        };
        self.emit(attribute, &text, location);

        Ok(())
    }

    fn digits(&mut self, into: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
                into.push(c);
            } else {
                break;
            }
        }
    }

    /// A `.` begins a real denotation when a digit follows, else it is the
    /// point symbol.
    fn scan_point(&mut self, location: Location) -> Result<(), FatalError> {
        self.bump();

        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let mut text = String::from(".");
            self.digits(&mut text);

            if matches!(self.peek(), Some('e') | Some('E')) {
                self.save();
                self.bump();
                let mut exponent = String::from("e");
                if matches!(self.peek(), Some('+') | Some('-')) {
                    exponent.push(self.bump().expect("sign was peeked"));
                }
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    text.push_str(&exponent);
                    self.digits(&mut text);
                } else {
                    self.restore();
                }
            }

            self.emit(Attribute::RealDenotation, &text, location);
        } else {
            self.emit(Attribute::PointSymbol, ".", location);
        }

        Ok(())
    }

    /// Colon-led compound tokens: `:=`, `:=:`, `:/=:`, bare `:`.
    fn scan_colon(&mut self, location: Location) -> Result<(), FatalError> {
        self.bump();

        match self.peek() {
            Some('=') => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    self.emit(Attribute::IsSymbol, ":=:", location);
                } else {
                    self.emit(Attribute::AssignSymbol, ":=", location);
                }
            }
            Some('/') => {
                // `:/=:` or a plain colon followed by an operator.
                self.save();
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    if self.peek() == Some(':') {
                        self.bump();
                        self.emit(Attribute::IsntSymbol, ":/=:", location);
                        return Ok(());
                    }
                }
                self.restore();
                self.emit(Attribute::ColonSymbol, ":", location);
            }
            Some(':') => {
                return Err(self.fatal(location, "invalid operator spelling starting with '::'"));
            }
            _ => {
                self.emit(Attribute::ColonSymbol, ":", location);
            }
        }

        Ok(())
    }

    /// Operator symbols: a monad or nomad, optionally a second nomad,
    /// optionally a `:=` or `=:` suffix. A bare `=` is the equals terminal.
    fn scan_operator(&mut self, location: Location) -> Result<(), FatalError> {
        let mut text = String::new();
        text.push(self.bump().expect("dispatched on an operator character"));

        // `=:` suffix binds tighter than a second nomad so `+=:` scans as
        // one operator.
        if self.peek() == Some('=') && self.peek_at(1) == Some(':') {
            self.bump();
            self.bump();
            text.push_str("=:");
            self.emit(Attribute::Operator, &text, location);
            return Ok(());
        }

        if self.peek().is_some_and(|c| NOMADS.contains(c)) {
            text.push(self.bump().expect("nomad was peeked"));
        }

        if self.peek() == Some(':') && self.peek_at(1) == Some('=') {
            self.bump();
            self.bump();
            text.push_str(":=");
        } else if self.peek() == Some('=') && self.peek_at(1) == Some(':') {
            self.bump();
            self.bump();
            text.push_str("=:");
        }

        if text == "=" {
            self.emit(Attribute::EqualsSymbol, "=", location);
            return Ok(());
        }

        if text == "==" || text == "=:" {
            return Err(self.fatal(location, format!("invalid operator spelling '{text}'")));
        }

        self.emit(Attribute::Operator, &text, location);
        Ok(())
    }

    // --- format mode ------------------------------------------------------

    /// Scan the inside of `$ ... $`. Single letters and a few punctuation
    /// characters are format items; digits are replicators; `(`/`)` group
    /// collections; an enclosed clause after an `n`, `g` or `f` item
    /// recursively re-enters ordinary mode.
    fn scan_format(&mut self, opening: Location) -> Result<(), FatalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FatalError::Resource);
        }

        let mut last_item = ' ';

        loop {
            let location = self.location();
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.fatal(opening, "unterminated format text")),
            };

            match c {
                '$' => {
                    self.bump();
                    self.emit(Attribute::FormatDelimiterSymbol, "$", location);
                    self.depth -= 1;
                    return Ok(());
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '"' => {
                    self.scan_string(location)?;
                    last_item = '"';
                }
                '0'..='9' => {
                    let mut text = String::new();
                    self.digits(&mut text);
                    self.emit(Attribute::IntDenotation, &text, location);
                    last_item = '0';
                }
                ',' => {
                    self.bump();
                    self.emit(Attribute::CommaSymbol, ",", location);
                    last_item = ',';
                }
                '(' => {
                    self.bump();
                    if matches!(last_item, 'n' | 'g' | 'f') {
                        // Dynamic replicator or general pattern: tokenise the
                        // enclosed clause in ordinary mode, then resume.
                        self.emit(Attribute::OpenSymbol, "(", location);
                        self.scan_embedded_clause(location)?;
                    } else {
                        self.emit(Attribute::FormatOpenSymbol, "(", location);
                    }
                    last_item = '(';
                }
                ')' => {
                    self.bump();
                    self.emit(Attribute::FormatCloseSymbol, ")", location);
                    last_item = ')';
                }
                c if c.is_ascii_lowercase() => {
                    self.bump();
                    let attribute = format_letter(c);
                    self.emit(attribute, &c.to_string(), location);
                    last_item = c;
                }
                '+' => {
                    self.bump();
                    self.emit(Attribute::FormatItemPlus, "+", location);
                    last_item = '+';
                }
                '-' => {
                    self.bump();
                    self.emit(Attribute::FormatItemMinus, "-", location);
                    last_item = '-';
                }
                '.' => {
                    self.bump();
                    self.emit(Attribute::FormatItemPoint, ".", location);
                    last_item = '.';
                }
                '%' => {
                    self.bump();
                    self.emit(Attribute::FormatItemPercent, "%", location);
                    last_item = '%';
                }
                '\\' => {
                    self.bump();
                    self.emit(Attribute::FormatItemEscape, "\\", location);
                    last_item = '\\';
                }
                '/' => {
                    self.bump();
                    self.emit(Attribute::FormatItemSolidus, "/", location);
                    last_item = '/';
                }
                c => return Err(self.fatal(location, format!("unworthy character '{c}' in format text"))),
            }
        }
    }

    /// Ordinary-mode tokenising of an enclosed clause inside a format, up to
    /// the matching close parenthesis. Re-entry state (cursor, bracket
    /// nesting) is preserved exactly: the scan simply continues at the
    /// character after the closer.
    fn scan_embedded_clause(&mut self, opening: Location) -> Result<(), FatalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FatalError::Resource);
        }

        let mut nesting = 1usize;

        loop {
            let location = self.location();
            match self.peek() {
                Some('(') => {
                    self.bump();
                    nesting += 1;
                    self.emit(Attribute::OpenSymbol, "(", location);
                }
                Some(')') => {
                    self.bump();
                    nesting -= 1;
                    self.emit(Attribute::CloseSymbol, ")", location);
                    if nesting == 0 {
                        self.depth -= 1;
                        return Ok(());
                    }
                }
                Some(_) => self.scan_token()?,
                None => {
                    return Err(self.fatal(opening, "unterminated clause in format text"));
                }
            }
        }
    }
}

fn format_letter(c: char) -> Attribute {
    use Attribute::*;

    match c {
        'a' => FormatItemA,
        'b' => FormatItemB,
        'c' => FormatItemC,
        'd' => FormatItemD,
        'e' => FormatItemE,
        'f' => FormatItemF,
        'g' => FormatItemG,
        'h' => FormatItemH,
        'i' => FormatItemI,
        'j' => FormatItemJ,
        'k' => FormatItemK,
        'l' => FormatItemL,
        'm' => FormatItemM,
        'n' => FormatItemN,
        'o' => FormatItemO,
        'p' => FormatItemP,
        'q' => FormatItemQ,
        'r' => FormatItemR,
        's' => FormatItemS,
        't' => FormatItemT,
        'u' => FormatItemU,
        'v' => FormatItemV,
        'w' => FormatItemW,
        'x' => FormatItemX,
        'y' => FormatItemY,
        'z' => FormatItemZ,
        _ => unreachable!("format_letter is only called for ascii lowercase"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ProgramOptions;
    use crate::source::MemoryLoader;
    use rstest::rstest;

    fn context_after(
        options: ProgramOptions,
        text: &str,
    ) -> (Context, Result<NodeId, FatalError>) {
        let mut context = Context::new(options);
        let loader = MemoryLoader::new([("main.a68", text)]);
        let store =
            SourceStore::build(&context.options, &loader, "main.a68", &mut context.interner)
                .expect("in-memory source builds");
        let head = tokenize(&mut context, &store);
        (context, head)
    }

    /// Tokenize `text` and return the user-line tokens, without the wrapper.
    fn scan_with(
        options: ProgramOptions,
        text: &str,
    ) -> Result<Vec<(Attribute, String)>, FatalError> {
        let (context, head) = context_after(options, text);
        let head = head?;

        Ok(context
            .arena
            .siblings(Some(head))
            .filter(|&id| context.arena.get(id).location.line > 0)
            .map(|id| {
                let node = context.arena.get(id);
                let text = node.text.expect("every token carries text");
                (node.attribute, context.interner.resolve(text).to_string())
            })
            .collect())
    }

    fn scan(text: &str) -> Vec<(Attribute, String)> {
        scan_with(ProgramOptions::default(), text).expect("program tokenizes")
    }

    fn scan_message(text: &str) -> String {
        match scan_with(ProgramOptions::default(), text) {
            Err(FatalError::Lex { message, .. }) => message,
            other => panic!("expected a lexical error, got {other:?}"),
        }
    }

    fn kinds(tokens: &[(Attribute, String)]) -> Vec<Attribute> {
        tokens.iter().map(|(attribute, _)| *attribute).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            scan("BEGIN x END"),
            vec![
                (Attribute::BeginSymbol, "BEGIN".to_string()),
                (Attribute::Identifier, "x".to_string()),
                (Attribute::EndSymbol, "END".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_bold_words_are_tags() {
        assert_eq!(
            scan("REF FOO"),
            vec![
                (Attribute::RefSymbol, "REF".to_string()),
                (Attribute::BoldTag, "FOO".to_string()),
            ]
        );
    }

    #[rstest]
    #[case("123", Attribute::IntDenotation, "123")]
    #[case("3.14", Attribute::RealDenotation, "3.14")]
    #[case("2e10", Attribute::RealDenotation, "2e10")]
    #[case("2E-4", Attribute::RealDenotation, "2e-4")]
    #[case(".5", Attribute::RealDenotation, ".5")]
    #[case("16r1f", Attribute::BitsDenotation, "16r1f")]
    #[case("2r101", Attribute::BitsDenotation, "2r101")]
    fn denotations(#[case] text: &str, #[case] attribute: Attribute, #[case] expected: &str) {
        assert_eq!(scan(text), vec![(attribute, expected.to_string())]);
    }

    #[test]
    fn radix_marker_needs_radix_digits() {
        // `2r` alone is an integer followed by an identifier.
        assert_eq!(
            kinds(&scan("2r x")),
            vec![
                Attribute::IntDenotation,
                Attribute::Identifier,
                Attribute::Identifier,
            ]
        );
    }

    #[test]
    fn point_without_digits_is_the_point_symbol() {
        assert_eq!(
            kinds(&scan("1.")),
            vec![Attribute::IntDenotation, Attribute::PointSymbol]
        );
    }

    #[test]
    fn doubled_quote_escapes_inside_strings() {
        assert_eq!(
            scan(r#""he said ""no""""#),
            vec![(Attribute::RowCharDenotation, "he said \"no\"".to_string())]
        );
    }

    #[test]
    fn unterminated_string_is_fatal() {
        assert_eq!(scan_message("\"oops"), "unterminated string denotation");
    }

    #[rstest]
    #[case(":=", Attribute::AssignSymbol)]
    #[case(":=:", Attribute::IsSymbol)]
    #[case(":/=:", Attribute::IsntSymbol)]
    fn colon_compounds(#[case] text: &str, #[case] attribute: Attribute) {
        assert_eq!(scan(text), vec![(attribute, text.to_string())]);
    }

    #[test]
    fn lone_colon_before_an_operator_stays_a_colon() {
        assert_eq!(
            kinds(&scan("x:/y")),
            vec![
                Attribute::Identifier,
                Attribute::ColonSymbol,
                Attribute::Operator,
                Attribute::Identifier,
            ]
        );
    }

    #[test]
    fn double_colon_is_rejected() {
        assert_eq!(
            scan_message("x :: y"),
            "invalid operator spelling starting with '::'"
        );
    }

    #[rstest]
    #[case("+*")]
    #[case("+:=")]
    #[case("+=:")]
    #[case("<=")]
    #[case("/=")]
    #[case("~")]
    fn operator_spellings(#[case] text: &str) {
        assert_eq!(scan(text), vec![(Attribute::Operator, text.to_string())]);
    }

    #[test]
    fn bare_equals_is_its_own_terminal() {
        assert_eq!(scan("="), vec![(Attribute::EqualsSymbol, "=".to_string())]);
    }

    #[test]
    fn doubled_equals_is_rejected() {
        assert_eq!(scan_message("x == y"), "invalid operator spelling '=='");
    }

    #[test]
    fn comments_and_pragmats_are_skipped() {
        assert_eq!(
            kinds(&scan("1 # brief # CO bold CO PR list PR 2")),
            vec![Attribute::IntDenotation, Attribute::IntDenotation]
        );
    }

    #[test]
    fn quote_stropping_reads_quoted_bold_words() {
        let options = ProgramOptions {
            stropping: Stropping::Quote,
            ..Default::default()
        };
        assert_eq!(
            scan_with(options, "'INT' i := 'TRUE'").expect("program tokenizes"),
            vec![
                (Attribute::IntSymbol, "INT".to_string()),
                (Attribute::Identifier, "i".to_string()),
                (Attribute::AssignSymbol, ":=".to_string()),
                (Attribute::TrueSymbol, "TRUE".to_string()),
            ]
        );
    }

    #[test]
    fn quoted_comments_and_pragmats_are_skipped() {
        let options = ProgramOptions {
            stropping: Stropping::Quote,
            ..Default::default()
        };
        assert_eq!(
            scan_with(options, "'CO' ignore me 'CO' 1 'PR' list 'PR' 2")
                .expect("program tokenizes"),
            vec![
                (Attribute::IntDenotation, "1".to_string()),
                (Attribute::IntDenotation, "2".to_string()),
            ]
        );
    }

    #[test]
    fn stray_quotes_inside_a_quoted_comment_are_harmless() {
        let options = ProgramOptions {
            stropping: Stropping::Quote,
            ..Default::default()
        };
        assert_eq!(
            scan_with(options, "'COMMENT' don't mind 'CO' this 'COMMENT' 1")
                .expect("program tokenizes"),
            vec![(Attribute::IntDenotation, "1".to_string())]
        );
    }

    #[test]
    fn quoted_bold_words_ignore_typographical_spaces() {
        let options = ProgramOptions {
            stropping: Stropping::Quote,
            ..Default::default()
        };
        assert_eq!(
            scan_with(options, "'B E G I N'").expect("program tokenizes"),
            vec![(Attribute::BeginSymbol, "BEGIN".to_string())]
        );
    }

    #[test]
    fn bracketed_clauses_respell_square_brackets() {
        let options = ProgramOptions {
            bracketed_clauses: true,
            ..Default::default()
        };
        assert_eq!(
            kinds(&scan_with(options, "[1]").expect("program tokenizes")),
            vec![
                Attribute::OpenSymbol,
                Attribute::IntDenotation,
                Attribute::CloseSymbol,
            ]
        );
    }

    #[test]
    fn format_mode_reads_single_characters() {
        assert_eq!(
            kinds(&scan("$5d, 2x$")),
            vec![
                Attribute::FormatDelimiterSymbol,
                Attribute::IntDenotation,
                Attribute::FormatItemD,
                Attribute::CommaSymbol,
                Attribute::IntDenotation,
                Attribute::FormatItemX,
                Attribute::FormatDelimiterSymbol,
            ]
        );
    }

    #[test]
    fn dynamic_replicator_re_enters_ordinary_mode() {
        assert_eq!(
            kinds(&scan("$n(m)d$")),
            vec![
                Attribute::FormatDelimiterSymbol,
                Attribute::FormatItemN,
                Attribute::OpenSymbol,
                Attribute::Identifier,
                Attribute::CloseSymbol,
                Attribute::FormatItemD,
                Attribute::FormatDelimiterSymbol,
            ]
        );
    }

    #[test]
    fn format_collections_use_format_frames() {
        assert_eq!(
            kinds(&scan("$c(\"up\")$")),
            vec![
                Attribute::FormatDelimiterSymbol,
                Attribute::FormatItemC,
                Attribute::FormatOpenSymbol,
                Attribute::RowCharDenotation,
                Attribute::FormatCloseSymbol,
                Attribute::FormatDelimiterSymbol,
            ]
        );
    }

    #[test]
    fn uppercase_in_format_text_is_rejected() {
        assert_eq!(
            scan_message("$D$"),
            "unworthy character 'D' in format text"
        );
    }

    #[test]
    fn portability_warnings_flag_extensions() {
        let options = ProgramOptions {
            portability_warnings: true,
            ..Default::default()
        };
        let (context, head) = context_after(options, "1 DOWNTO 2");
        head.expect("program tokenizes");

        let messages: Vec<&str> = context
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect();
        assert_eq!(messages, vec!["'DOWNTO' is not portable Algol 68"]);
    }
}
