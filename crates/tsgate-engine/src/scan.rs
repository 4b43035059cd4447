//! Import scanning
//!
//! Finds the module specifiers of top-level import and re-export statements
//! without building a syntax tree. The source is tokenized with logos and the
//! token stream is matched against the statement shapes that name a module:
//!
//! ```text
//! import "x";                      import x = require("x");
//! import a, { b } from "x";        export * from "x";
//! import * as ns from "x";         export * as ns from "x";
//! import type { T } from "x";      export { a, type T } from "x";
//! ```
//!
//! Dynamic `import("x")`, `import.meta` and statements nested in blocks are
//! not module dependencies and are skipped.

use std::ops::Range;

use logos::Logos;

/// Tokens relevant to import scanning.
///
/// Everything that cannot change the meaning of an import statement collapses
/// into `Other`.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum ScanToken {
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[token("import")]
    Import,

    #[token("export")]
    Export,

    #[token("from")]
    From,

    #[token("require")]
    Require,

    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, parse_string)]
    Str(String),

    #[regex(r"`([^`\\]|\\.)*`")]
    Template,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token(";")]
    Semicolon,

    #[token("*")]
    Star,

    #[token("=")]
    Equals,

    #[token(".")]
    Dot,

    #[token("]")]
    RightBracket,

    /// Division operator, or the start of a regex literal
    #[token("/")]
    Slash,

    /// Regex literal, produced by the scanner rather than the lexer
    Regex,

    #[regex(r#"[^ \t\r\n\fA-Za-z0-9_$"'`{}();*=./\]]"#)]
    Other,
}

fn lex_block_comment(lex: &mut logos::Lexer<ScanToken>) -> logos::Skip {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(remainder.len()),
    }
    logos::Skip
}

fn parse_string(lex: &mut logos::Lexer<ScanToken>) -> Option<String> {
    let s = lex.slice();
    Some(unescape(&s[1..s.len() - 1]))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Statement form an import was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from "x"` or `import "x"`
    Import,
    /// `import x = require("x")`
    ImportEquals,
    /// `export ... from "x"`
    ReExport,
}

/// A module specifier found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// The specifier text, unescaped
    pub specifier: String,
    /// Byte range of the string literal, quotes included
    pub span: Range<usize>,
    /// Statement form
    pub kind: ImportKind,
}

/// Find the specifiers of all top-level imports and re-exports in `source`.
///
/// Specifiers are returned in source order. Empty specifiers are dropped.
pub fn scan_imports(source: &str) -> Vec<ImportRef> {
    let mut lexer = ScanToken::lexer(source);
    let mut tokens: Vec<(ScanToken, Range<usize>)> = Vec::new();
    while let Some(token) = lexer.next() {
        let Ok(token) = token else { continue };
        if token == ScanToken::Slash && regex_allowed_after(tokens.last().map(|(t, _)| t)) {
            if let Some(len) = regex_body_len(lexer.remainder()) {
                lexer.bump(len);
                tokens.push((ScanToken::Regex, lexer.span()));
                continue;
            }
        }
        tokens.push((token, lexer.span()));
    }

    Scanner {
        tokens: &tokens,
        imports: Vec::new(),
    }
    .run()
}

/// Whether a `/` following `prev` starts a regex literal rather than a division
fn regex_allowed_after(prev: Option<&ScanToken>) -> bool {
    match prev {
        None => true,
        Some(ScanToken::Ident(name)) => matches!(
            name.as_str(),
            "return"
                | "typeof"
                | "instanceof"
                | "in"
                | "of"
                | "new"
                | "delete"
                | "void"
                | "throw"
                | "case"
                | "do"
                | "else"
                | "yield"
                | "await"
        ),
        Some(
            ScanToken::Str(_)
            | ScanToken::Template
            | ScanToken::Number
            | ScanToken::Regex
            | ScanToken::RightParen
            | ScanToken::RightBracket
            | ScanToken::Require
            | ScanToken::Dot,
        ) => false,
        Some(_) => true,
    }
}

/// Length of a regex literal's body, closing slash and flags, given the text
/// after its opening slash. `None` if the literal is not closed on this line.
fn regex_body_len(rest: &str) -> Option<usize> {
    let mut in_class = false;
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                match chars.next() {
                    Some((_, '\n')) | None => return None,
                    Some(_) => {}
                }
            }
            '\n' | '\r' => return None,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                let flags = rest[i + 1..]
                    .find(|f: char| !f.is_ascii_alphabetic())
                    .unwrap_or(rest.len() - i - 1);
                return Some(i + 1 + flags);
            }
            _ => {}
        }
    }
    None
}

struct Scanner<'t> {
    tokens: &'t [(ScanToken, Range<usize>)],
    imports: Vec<ImportRef>,
}

impl<'t> Scanner<'t> {
    fn run(mut self) -> Vec<ImportRef> {
        let tokens = self.tokens;
        let mut depth = 0usize;
        for (i, (token, _)) in tokens.iter().enumerate() {
            match token {
                ScanToken::LeftBrace | ScanToken::LeftParen => depth += 1,
                ScanToken::RightBrace | ScanToken::RightParen => depth = depth.saturating_sub(1),
                ScanToken::Import if depth == 0 && !self.after_dot(i) => self.import_decl(i + 1),
                ScanToken::Export if depth == 0 && !self.after_dot(i) => self.export_decl(i + 1),
                _ => {}
            }
        }
        self.imports
    }

    fn kind(&self, i: usize) -> Option<&'t ScanToken> {
        let tokens: &'t [(ScanToken, Range<usize>)] = self.tokens;
        tokens.get(i).map(|(token, _)| token)
    }

    fn is_ident(&self, i: usize, name: &str) -> bool {
        matches!(self.kind(i), Some(ScanToken::Ident(n)) if n == name)
    }

    fn after_dot(&self, i: usize) -> bool {
        i > 0 && matches!(self.kind(i - 1), Some(ScanToken::Dot))
    }

    /// Record the string literal at `i`, if there is one
    fn push(&mut self, i: usize, kind: ImportKind) -> bool {
        let Some((ScanToken::Str(specifier), span)) = self.tokens.get(i) else {
            return false;
        };
        if !specifier.is_empty() {
            self.imports.push(ImportRef {
                specifier: specifier.clone(),
                span: span.clone(),
                kind,
            });
        }
        true
    }

    /// Tokens following an `import` keyword, starting at `i`
    fn import_decl(&mut self, mut i: usize) {
        match self.kind(i) {
            Some(ScanToken::Str(_)) => {
                self.push(i, ImportKind::Import);
                return;
            }
            // import("x") and import.meta
            Some(ScanToken::LeftParen) | Some(ScanToken::Dot) | None => return,
            _ => {}
        }

        // import [type] x = require("x")
        let typed =
            self.is_ident(i, "type") && matches!(self.kind(i + 1), Some(ScanToken::Ident(_)));
        let name = if typed {
            i + 1
        } else {
            i
        };
        if matches!(self.kind(name), Some(ScanToken::Ident(_)))
            && matches!(self.kind(name + 1), Some(ScanToken::Equals))
        {
            if matches!(self.kind(name + 2), Some(ScanToken::Require))
                && matches!(self.kind(name + 3), Some(ScanToken::LeftParen))
            {
                self.push(name + 4, ImportKind::ImportEquals);
            }
            return;
        }

        let mut depth = 0usize;
        while let Some(token) = self.kind(i) {
            match token {
                ScanToken::LeftBrace => depth += 1,
                ScanToken::RightBrace => depth = depth.saturating_sub(1),
                ScanToken::From if depth == 0 => {
                    if self.push(i + 1, ImportKind::Import) {
                        return;
                    }
                }
                ScanToken::Semicolon | ScanToken::Import | ScanToken::Export if depth == 0 => {
                    return
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Tokens following an `export` keyword, starting at `i`
    fn export_decl(&mut self, mut i: usize) {
        if self.is_ident(i, "type") {
            i += 1;
        }
        match self.kind(i) {
            Some(ScanToken::Star) => {
                // export * from "x" | export * as ns from "x"
                let mut from = i + 1;
                if self.is_ident(from, "as") {
                    from += 2;
                }
                if matches!(self.kind(from), Some(ScanToken::From)) {
                    self.push(from + 1, ImportKind::ReExport);
                }
            }
            Some(ScanToken::LeftBrace) => {
                let mut depth = 0usize;
                while let Some(token) = self.kind(i) {
                    match token {
                        ScanToken::LeftBrace => depth += 1,
                        ScanToken::RightBrace => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                if matches!(self.kind(i + 1), Some(ScanToken::From)) {
                    self.push(i + 2, ImportKind::ReExport);
                }
            }
            _ => {}
        }
    }
}
