//! Heading-delimited markdown document model.
//!
//! # Responsibility
//! - Parse raw markdown text into an ordered list of level-1/2 sections.
//! - Serialize sections back to text without reformatting body lines.
//! - Provide first-match lookup/removal keyed by `(name, level)`.
//!
//! # Invariants
//! - Only `# ` and `## ` open a section; `###` and deeper stay body text.
//! - Section order is document order and survives serialize/parse.
//! - `parse(serialize(tree))` reproduces the same `(level, name, body)` list.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::ControlFlow;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,2})\s(.+)$").expect("valid header regex"));

/// Deepest heading level that still opens a section.
pub const MAX_SECTION_LEVEL: u8 = 2;

/// Parse failure for section text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A body line appeared before any `#`/`##` heading.
    NoHeaderFound {
        /// 1-based line number of the offending line.
        line: usize,
    },
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHeaderFound { line } => {
                write!(f, "no header found before body text at line {line}")
            }
        }
    }
}

impl Error for ParseError {}

/// One heading plus the raw lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading depth, `1` or `2`.
    pub level: u8,
    /// Heading text without the `#` marker; lookup key together with `level`.
    pub name: String,
    /// Lines up to, not including, the next level-1/2 heading.
    pub body: Vec<String>,
}

impl Section {
    /// Creates a section with an empty body.
    pub fn new(level: u8, name: impl Into<String>) -> Self {
        debug_assert!((1..=MAX_SECTION_LEVEL).contains(&level));
        Self {
            level,
            name: name.into(),
            body: Vec::new(),
        }
    }

    /// Creates a section whose body is a single blank line.
    ///
    /// Used for carry-over sections that do not exist on disk yet.
    pub fn blank(level: u8, name: impl Into<String>) -> Self {
        let mut section = Self::new(level, name);
        section.push_line("");
        section
    }

    /// Appends one body line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    /// Returns `true` when this section has the given lookup key.
    pub fn matches(&self, name: &str, level: u8) -> bool {
        self.level == level && self.name == name
    }

    /// Renders the heading line without a trailing newline.
    pub fn header(&self) -> String {
        format!("{} {}", "#".repeat(usize::from(self.level)), self.name)
    }

    /// Drops blank lines at both ends of the body; interior blanks are kept.
    pub fn trim_blank_lines(&mut self) {
        let is_blank = |line: &String| line.trim().is_empty();
        let end = self
            .body
            .iter()
            .rposition(|line| !is_blank(line))
            .map_or(0, |idx| idx + 1);
        self.body.truncate(end);
        let start = self
            .body
            .iter()
            .position(|line| !is_blank(line))
            .unwrap_or(self.body.len());
        self.body.drain(..start);
    }

    /// Returns a copy with trimmed body followed by one blank separator line.
    pub fn with_trailing_separator(&self) -> Self {
        let mut section = self.clone();
        section.trim_blank_lines();
        section.push_line("");
        section
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.header());
        out.push('\n');
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Ordered collection of sections parsed from, or written to, one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTree {
    sections: Vec<Section>,
}

impl SectionTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses markdown text line by line.
    ///
    /// Empty input produces an empty tree. A trailing `\r` is dropped from
    /// every line.
    ///
    /// # Errors
    /// - `ParseError::NoHeaderFound` when body text precedes the first heading.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut tree = Self::new();
        let mut current: Option<Section> = None;

        for (idx, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match HEADER_RE.captures(line) {
                Some(caps) => {
                    if let Some(done) = current.take() {
                        tree.push(done);
                    }
                    let level = caps[1].len() as u8;
                    current = Some(Section::new(level, &caps[2]));
                }
                None => match current.as_mut() {
                    Some(section) => section.push_line(line),
                    None => return Err(ParseError::NoHeaderFound { line: idx + 1 }),
                },
            }
        }

        if let Some(done) = current {
            tree.push(done);
        }
        Ok(tree)
    }

    /// Serializes every section in order; an empty tree yields `""`.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.write_to(&mut out);
        }
        out
    }

    /// Appends a section at the end.
    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Returns the first section matching `(name, level)`.
    pub fn find(&self, name: &str, level: u8) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.matches(name, level))
    }

    /// Removes and returns the first section matching `(name, level)`.
    pub fn pop(&mut self, name: &str, level: u8) -> Option<Section> {
        let idx = self
            .sections
            .iter()
            .position(|section| section.matches(name, level))?;
        Some(self.sections.remove(idx))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Visits sections in order until the visitor breaks.
    pub fn walk<F>(&self, mut visitor: F)
    where
        F: FnMut(&Section) -> ControlFlow<()>,
    {
        for section in &self.sections {
            if visitor(section).is_break() {
                break;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Mutable access for in-place edits such as placeholder substitution.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.iter_mut()
    }
}

impl Display for SectionTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromIterator<Section> for SectionTree {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}
