// src/types.rs

use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use crate::mime::MimeType;

/// One converter program in a chain.
///
/// `cost` only matters while the resolver picks the cheapest chain. It is
/// never used to carry runtime state; the tracker keeps its own
/// pid → filter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// Executable name, absolute or relative to the filter directory.
    pub program: String,
    pub cost: u32,
    pub source: Option<MimeType>,
    pub dest: Option<MimeType>,
}

impl FilterSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cost: 0,
            source: None,
            dest: None,
        }
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_types(mut self, source: MimeType, dest: MimeType) -> Self {
        self.source = Some(source);
        self.dest = Some(dest);
        self
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)
    }
}

/// Ordered, resolved sequence of filters. Stage `i` feeds stage `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    stages: Vec<FilterSpec>,
}

impl FilterChain {
    pub fn new(stages: Vec<FilterSpec>) -> Self {
        Self { stages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Return a new chain with `filter` placed in front of the existing stages.
    pub fn with_first(self, filter: FilterSpec) -> Self {
        let mut stages = Vec::with_capacity(self.stages.len() + 1);
        stages.push(filter);
        stages.extend(self.stages);
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterSpec> {
        self.stages.iter()
    }

    pub fn total_cost(&self) -> u64 {
        self.stages.iter().map(|f| u64::from(f.cost)).sum()
    }

    pub fn programs(&self) -> Vec<&str> {
        self.stages.iter().map(|f| f.program.as_str()).collect()
    }
}

impl From<Vec<FilterSpec>> for FilterChain {
    fn from(stages: Vec<FilterSpec>) -> Self {
        Self::new(stages)
    }
}

impl<'a> IntoIterator for &'a FilterChain {
    type Item = &'a FilterSpec;
    type IntoIter = std::slice::Iter<'a, FilterSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

/// Ordered job options (`name=value`).
///
/// Names compare case-insensitively; adding a name that already exists
/// replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOptions {
    entries: Vec<(String, String)>,
}

impl JobOptions {
    /// Reserved option carried in its own argv slot.
    pub const COPIES: &'static str = "copies";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn copies(&self) -> Option<&str> {
        self.get(Self::COPIES)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `-o` style option string and add every option it contains.
    ///
    /// Accepts `name=value`, `name="quoted value"`, `name='quoted'` and bare
    /// `name` (stored as `true`). A backslash takes the next character
    /// literally, both inside and outside quotes.
    pub fn parse_into(&mut self, input: &str) {
        let mut chars = input.chars().peekable();

        loop {
            skip_whitespace(&mut chars);

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '=' || c.is_whitespace() {
                    break;
                }
                name.push(c);
                chars.next();
            }

            if name.is_empty() {
                // Stray '=' with no name: drop the rest of this token.
                if chars.peek() == Some(&'=') {
                    chars.next();
                    read_value(&mut chars);
                    continue;
                }
                break;
            }

            if chars.peek() == Some(&'=') {
                chars.next();
                let value = read_value(&mut chars);
                self.add(name, value);
            } else {
                self.add(name, "true");
            }
        }
    }
}

impl FromStr for JobOptions {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut options = JobOptions::new();
        options.parse_into(s);
        Ok(options)
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn read_value(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut value = String::new();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (c, quote) {
            ('\\', _) => {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            }
            (q, None) if q == '"' || q == '\'' => quote = Some(q),
            (q, Some(open)) if q == open => quote = None,
            (w, None) if w.is_whitespace() => break,
            (other, _) => value.push(other),
        }
    }

    value
}
