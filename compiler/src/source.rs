//! The program as an ordered sequence of logical source lines.
//!
//! The store holds the main file wrapped in a regime-specific prelude and
//! postlude, with `PR include "file" PR` / `PR read "file" PR` directives
//! spliced in recursively. Lines are created once and never deleted;
//! inclusion inserts a sub-sequence at the position of the triggering
//! pragmat, preserving line numbering for diagnostics.

use crate::helpers::{Interner, Symbol};
use crate::options::{ProgramOptions, Stropping};
use crate::FatalError;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Abstracts file access so the front end can be driven from memory in tests.
pub trait Loader {
    /// Read the full text of a source file.
    fn load(&self, path: &str) -> io::Result<String>;

    /// Canonicalize a path for duplicate-inclusion detection.
    fn resolve(&self, path: &str) -> io::Result<PathBuf>;
}

/// Loader backed by `std::fs`.
pub struct FileLoader;

impl Loader for FileLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        Path::new(path).canonicalize()
    }
}

/// Loader backed by an in-memory list, for tests.
pub struct MemoryLoader {
    files: Vec<(String, String)>,
}

impl MemoryLoader {
    pub fn new(files: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        MemoryLoader {
            files: files
                .into_iter()
                .map(|(path, text)| (path.into(), text.into()))
                .collect(),
        }
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}")))
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        Ok(PathBuf::from(path))
    }
}

/// One logical source line. Its text always ends with a newline.
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// `<= 0` marks synthetic prelude/postlude lines, which are invisible to
    /// user-facing diagnostics.
    pub number: i32,
    pub text: String,
    pub path: Symbol,
}

/// The total, ordered sequence of source lines the lexer consumes.
#[derive(Debug, Default)]
pub struct SourceStore {
    pub lines: Vec<SourceLine>,
    included: HashSet<PathBuf>,
}

// Fixed standard-environment wrappers, one pair per stropping regime. `!` is
// an internal statement separator expanded into newline-terminated lines.
const BOLD_PRELUDE: &str = "BEGIN MODE DOUBLE = LONG REAL, QUAD = LONG LONG REAL;!";
const BOLD_POSTLUDE: &str = ";!stop: SKIP!END";
const QUOTE_PRELUDE: &str =
    "'BEGIN' 'MODE' 'DOUBLE' = 'LONG' 'REAL', 'QUAD' = 'LONG' 'LONG' 'REAL';!";
const QUOTE_POSTLUDE: &str = ";!STOP: 'SKIP'!'END'";

impl SourceStore {
    /// Load `path` through `loader`, wrap it in the prelude and postlude for
    /// the configured regime, and resolve include pragmats recursively.
    pub fn build(
        options: &ProgramOptions,
        loader: &dyn Loader,
        path: &str,
        interner: &mut Interner,
    ) -> Result<SourceStore, FatalError> {
        let mut store = SourceStore::default();

        let (prelude, postlude) = match options.stropping {
            Stropping::Bold => (BOLD_PRELUDE, BOLD_POSTLUDE),
            Stropping::Quote => (QUOTE_PRELUDE, QUOTE_POSTLUDE),
        };

        let path_symbol = interner.intern(path);
        store.push_template(prelude, path_symbol);

        let text = loader.load(path).map_err(|error| FatalError::Source {
            path: path.to_string(),
            message: error.to_string(),
        })?;

        if let Ok(resolved) = loader.resolve(path) {
            store.included.insert(resolved);
        }

        store.push_file(&text, path_symbol);
        store.push_template(postlude, path_symbol);

        store.expand_includes(loader, interner)?;

        Ok(store)
    }

    fn push_template(&mut self, template: &str, path: Symbol) {
        for part in template.split('!') {
            self.lines.push(SourceLine {
                number: 0,
                text: format!("{part}\n"),
                path,
            });
        }
    }

    fn push_file(&mut self, text: &str, path: Symbol) {
        for (index, line) in text.lines().enumerate() {
            self.lines.push(SourceLine {
                number: index as i32 + 1,
                text: format!("{line}\n"),
                path,
            });
        }
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Scan user lines for include pragmats, splicing loaded files in place.
    /// Scanning resumes at the pragmat line, so spliced-in text is itself
    /// scanned and includes may include. Re-inclusion of an already-loaded
    /// resolved path is silently ignored.
    fn expand_includes(
        &mut self,
        loader: &dyn Loader,
        interner: &mut Interner,
    ) -> Result<(), FatalError> {
        let mut from = 0;

        loop {
            match self.find_directive(from, interner)? {
                Some(directive) => {
                    from = directive.start.0;
                    self.apply_include(loader, interner, directive)?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Find the first include/read directive at or after line index `from`,
    /// skipping string denotations and all comment forms so quoted or
    /// commented text can never produce a false hit.
    fn find_directive(
        &self,
        from: usize,
        interner: &Interner,
    ) -> Result<Option<Directive>, FatalError> {
        let mut cursor = Cursor {
            store: self,
            line: from,
            column: 0,
        };

        while let Some(c) = cursor.current() {
            // Directives only occur in user lines; synthetic lines hold the
            // fixed wrapper text.
            if self.lines[cursor.line].number <= 0 {
                cursor.next_line();
                continue;
            }

            match c {
                '"' => {
                    cursor.advance();
                    // A string runs to its closing quote or, if absent, to
                    // the end of the line; the lexer reports the latter.
                    while let Some(c) = cursor.current() {
                        cursor.advance();
                        if c == '"' || c == '\n' {
                            break;
                        }
                    }
                }
                '#' => {
                    let start = cursor.position();
                    cursor.advance();
                    if !cursor.skip_until_char('#') {
                        return Err(self.unterminated("comment", start, interner));
                    }
                }
                c if c.is_ascii_uppercase() => {
                    let start = cursor.position();
                    let word = cursor.take_uppercase_run();
                    match word.as_str() {
                        "CO" | "COMMENT" => {
                            if !cursor.skip_until_word(&word) {
                                return Err(self.unterminated("comment", start, interner));
                            }
                        }
                        "PR" | "PRAGMAT" => {
                            let Some(body) = cursor.take_until_word(&word) else {
                                return Err(self.unterminated("pragmat", start, interner));
                            };

                            if let Some(filename) =
                                self.directive_filename(&body, start, interner)?
                            {
                                return Ok(Some(Directive {
                                    start,
                                    end: cursor.position(),
                                    filename,
                                }));
                            }
                        }
                        _ => {}
                    }
                }
                _ => cursor.advance(),
            }
        }

        Ok(None)
    }

    /// Extract the filename from a pragmat body carrying an `include` or
    /// `read` directive, if any.
    fn directive_filename(
        &self,
        body: &str,
        at: (usize, usize),
        interner: &Interner,
    ) -> Result<Option<String>, FatalError> {
        for word in ["include", "read"] {
            let Some(found) = find_word(body, word) else {
                continue;
            };

            let tail = body[found + word.len()..].trim_start();
            let Some(stripped) = tail.strip_prefix('"') else {
                return Err(FatalError::Source {
                    path: interner.resolve(self.lines[at.0].path).to_string(),
                    message: format!(
                        "malformed filename in {} pragmat in line {}",
                        word, self.lines[at.0].number
                    ),
                });
            };
            let Some(end) = stripped.find('"') else {
                return Err(FatalError::Source {
                    path: interner.resolve(self.lines[at.0].path).to_string(),
                    message: format!(
                        "malformed filename in {} pragmat in line {}",
                        word, self.lines[at.0].number
                    ),
                });
            };

            return Ok(Some(stripped[..end].to_string()));
        }

        Ok(None)
    }

    /// Splice the directive's file after the line the pragmat ends on, then
    /// blank the consumed pragmat so it is not seen again.
    fn apply_include(
        &mut self,
        loader: &dyn Loader,
        interner: &mut Interner,
        directive: Directive,
    ) -> Result<(), FatalError> {
        self.blank_span(directive.start, directive.end);

        let resolved = loader
            .resolve(&directive.filename)
            .unwrap_or_else(|_| PathBuf::from(&directive.filename));

        if self.included.contains(&resolved) {
            // Idempotent mutual inclusion: already loaded, not an error.
            log::debug!("skipping repeated include of {}", directive.filename);
            return Ok(());
        }

        let text = loader
            .load(&directive.filename)
            .map_err(|error| FatalError::Source {
                path: directive.filename.clone(),
                message: error.to_string(),
            })?;

        log::debug!("including {}", directive.filename);
        self.included.insert(resolved);

        let path_symbol = interner.intern(&directive.filename);
        let at = directive.end.0 + 1;
        let spliced: Vec<SourceLine> = text
            .lines()
            .enumerate()
            .map(|(index, line)| SourceLine {
                number: index as i32 + 1,
                text: format!("{line}\n"),
                path: path_symbol,
            })
            .collect();

        self.lines.splice(at..at, spliced);

        Ok(())
    }

    /// Overwrite the inclusive span with spaces, keeping line structure.
    fn blank_span(&mut self, start: (usize, usize), end: (usize, usize)) {
        for index in start.0..=end.0 {
            let from = if index == start.0 { start.1 } else { 0 };
            let to = if index == end.0 {
                end.1
            } else {
                self.lines[index].text.len()
            };

            let line = &mut self.lines[index];
            let blanked: String = line
                .text
                .char_indices()
                .map(|(at, c)| {
                    if at >= from && at < to && c != '\n' {
                        ' '
                    } else {
                        c
                    }
                })
                .collect();
            line.text = blanked;
        }
    }

    fn unterminated(
        &self,
        what: &str,
        at: (usize, usize),
        interner: &Interner,
    ) -> FatalError {
        FatalError::Source {
            path: interner.resolve(self.lines[at.0].path).to_string(),
            message: format!(
                "unterminated {} starting in line {}",
                what, self.lines[at.0].number
            ),
        }
    }
}

/// Position of `word` in `body` as a whole word; a match inside a longer
/// word (`read` in `threads`) does not count.
fn find_word(body: &str, word: &str) -> Option<usize> {
    let boundary = |c: Option<char>| !matches!(c, Some(c) if c.is_alphanumeric() || c == '_');
    let mut from = 0;

    while let Some(offset) = body[from..].find(word) {
        let found = from + offset;
        let before = body[..found].chars().next_back();
        let after = body[found + word.len()..].chars().next();

        if boundary(before) && boundary(after) {
            return Some(found);
        }
        from = found + word.len();
    }

    None
}

#[derive(Debug)]
struct Directive {
    start: (usize, usize),
    end: (usize, usize),
    filename: String,
}

/// A `(line index, byte column)` cursor over the line store used by the
/// directive scan.
struct Cursor<'a> {
    store: &'a SourceStore,
    line: usize,
    column: usize,
}

impl Cursor<'_> {
    fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    fn current(&self) -> Option<char> {
        if self.line >= self.store.line_count() {
            return None;
        }

        self.store.lines[self.line].text[self.column..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.column += c.len_utf8();
            if self.column >= self.store.lines[self.line].text.len() {
                self.next_line();
            }
        }
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    /// Consume a run of upper-case letters.
    fn take_uppercase_run(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if c.is_ascii_uppercase() {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    /// Skip forward until after the next occurrence of `c`. Returns `false`
    /// on end of input.
    fn skip_until_char(&mut self, target: char) -> bool {
        while let Some(c) = self.current() {
            self.advance();
            if c == target {
                return true;
            }
        }
        false
    }

    /// Skip forward until after the next standalone occurrence of the bold
    /// word `word`. Returns `false` on end of input.
    fn skip_until_word(&mut self, word: &str) -> bool {
        self.take_until_word(word).is_some()
    }

    /// Collect text until the next occurrence of the bold word `word`,
    /// consuming it. Returns `None` on end of input.
    fn take_until_word(&mut self, word: &str) -> Option<String> {
        let mut body = String::new();

        while let Some(c) = self.current() {
            if c.is_ascii_uppercase() {
                let run = self.take_uppercase_run();
                if run == word {
                    return Some(body);
                }
                body.push_str(&run);
            } else {
                body.push(c);
                self.advance();
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ProgramOptions;

    fn build(files: &[(&str, &str)]) -> Result<SourceStore, FatalError> {
        let mut interner = Interner::new();
        let loader = MemoryLoader::new(files.iter().map(|&(path, text)| (path, text)));
        SourceStore::build(&ProgramOptions::default(), &loader, "main.a68", &mut interner)
    }

    fn numbers(store: &SourceStore) -> Vec<i32> {
        store.lines.iter().map(|line| line.number).collect()
    }

    #[test]
    fn prelude_and_postlude_wrap_the_program() {
        let store = build(&[("main.a68", "SKIP")]).expect("store builds");

        // Two synthetic lines before, three after; user lines keep their own
        // numbering.
        assert_eq!(numbers(&store), vec![0, 0, 1, 0, 0, 0]);
        assert_eq!(store.lines[2].text, "SKIP\n");
    }

    #[test]
    fn include_pragmat_splices_the_file() {
        let store = build(&[
            ("main.a68", "BEGIN\nPR include \"lib.a68\" PR\nx\nEND"),
            ("lib.a68", "INT x = 1;"),
        ])
        .expect("store builds");

        let user: Vec<&str> = store
            .lines
            .iter()
            .filter(|line| line.number > 0)
            .map(|line| line.text.as_str())
            .collect();

        assert_eq!(user.len(), 5);
        assert_eq!(user[0], "BEGIN\n");
        // The consumed pragmat is blanked in place, keeping line structure.
        assert!(user[1].trim().is_empty());
        assert_eq!(user[2], "INT x = 1;\n");
        assert_eq!(user[3], "x\n");
        assert_eq!(user[4], "END\n");
    }

    #[test]
    fn spliced_lines_carry_their_own_path_and_numbering() {
        let mut interner = Interner::new();
        let loader = MemoryLoader::new([
            ("main.a68", "PR read \"lib.a68\" PR\nSKIP"),
            ("lib.a68", "first\nsecond"),
        ]);
        let store =
            SourceStore::build(&ProgramOptions::default(), &loader, "main.a68", &mut interner)
                .expect("store builds");

        let spliced: Vec<(i32, &str)> = store
            .lines
            .iter()
            .filter(|line| interner.resolve(line.path) == "lib.a68")
            .map(|line| (line.number, line.text.as_str()))
            .collect();
        assert_eq!(spliced, vec![(1, "first\n"), (2, "second\n")]);
    }

    #[test]
    fn repeated_includes_load_once() {
        let store = build(&[
            (
                "main.a68",
                "PR include \"lib.a68\" PR\nPR include \"lib.a68\" PR\nSKIP",
            ),
            ("lib.a68", "INT x = 1;"),
        ])
        .expect("store builds");

        let copies = store
            .lines
            .iter()
            .filter(|line| line.text == "INT x = 1;\n")
            .count();
        assert_eq!(copies, 1);
    }

    #[test]
    fn missing_include_is_fatal() {
        let error = build(&[("main.a68", "PR include \"nowhere.a68\" PR")]).unwrap_err();
        assert!(matches!(error, FatalError::Source { path, .. } if path == "nowhere.a68"));
    }

    #[test]
    fn malformed_include_filename_is_fatal() {
        let error = build(&[("main.a68", "PR include lib PR")]).unwrap_err();
        match error {
            FatalError::Source { message, .. } => {
                assert_eq!(message, "malformed filename in include pragmat in line 1");
            }
            other => panic!("expected a source error, got {other:?}"),
        }
    }

    #[test]
    fn directives_inside_strings_and_comments_are_ignored() {
        let store = build(&[(
            "main.a68",
            "print (\"PR include not really PR\");\n# PR include \"ghost.a68\" PR #\nSKIP",
        )])
        .expect("store builds");

        assert_eq!(numbers(&store), vec![0, 0, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn directive_words_inside_longer_words_are_ignored() {
        let store = build(&[("main.a68", "PR threads PR\nSKIP")]).expect("store builds");

        assert_eq!(numbers(&store), vec![0, 0, 1, 2, 0, 0, 0]);
    }
}
