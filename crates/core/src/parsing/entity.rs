use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::EntityMatching;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Brand,
    Color,
    Location,
    Model,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Color => "color",
            Self::Location => "location",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the catalog value a piece of free text refers to.
pub trait EntityMatcher: Send + Sync {
    fn find<'a>(&self, text: &str, candidates: &'a [String]) -> Option<&'a str>;
}

/// Matches whole tokens only, so `Mini` no longer fires inside `minivan`. When several
/// values match, the longest wins; ties keep catalog order.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenEntityMatcher;

impl EntityMatcher for TokenEntityMatcher {
    fn find<'a>(&self, text: &str, candidates: &'a [String]) -> Option<&'a str> {
        let haystack = tokenize(text);
        let mut best: Option<&'a str> = None;

        for candidate in candidates {
            let needle = tokenize(candidate);
            if needle.is_empty() || !contains_sequence(&haystack, &needle) {
                continue;
            }
            if best.map_or(true, |current| candidate.len() > current.len()) {
                best = Some(candidate.as_str());
            }
        }

        best
    }
}

/// First catalog value whose lowercase form appears anywhere in the lowercased text.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubstringEntityMatcher;

impl EntityMatcher for SubstringEntityMatcher {
    fn find<'a>(&self, text: &str, candidates: &'a [String]) -> Option<&'a str> {
        let lowered = text.to_lowercase();
        candidates
            .iter()
            .find(|candidate| !candidate.is_empty() && lowered.contains(&candidate.to_lowercase()))
            .map(String::as_str)
    }
}

pub fn matcher_for(mode: EntityMatching) -> Arc<dyn EntityMatcher> {
    match mode {
        EntityMatching::Token => Arc::new(TokenEntityMatcher),
        EntityMatching::Substring => Arc::new(SubstringEntityMatcher),
    }
}

/// Distinct catalog values per entity kind, queried through one matcher.
#[derive(Clone)]
pub struct EntityIndex {
    matcher: Arc<dyn EntityMatcher>,
    values: HashMap<EntityKind, Vec<String>>,
}

impl EntityIndex {
    pub fn new(matcher: Arc<dyn EntityMatcher>) -> Self {
        Self { matcher, values: HashMap::new() }
    }

    /// Adds values for `kind`, skipping blanks and case-insensitive duplicates.
    pub fn insert<I, S>(&mut self, kind: EntityKind, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.values.entry(kind).or_default();
        for value in values {
            let value = value.into();
            let trimmed = value.trim();
            if trimmed.is_empty()
                || entry.iter().any(|existing| existing.eq_ignore_ascii_case(trimmed))
            {
                continue;
            }
            entry.push(trimmed.to_string());
        }
    }

    pub fn values(&self, kind: EntityKind) -> &[String] {
        self.values.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn detect(&self, kind: EntityKind, text: &str) -> Option<String> {
        self.matcher.find(text, self.values(kind)).map(str::to_string)
    }
}

impl fmt::Debug for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityIndex").field("values", &self.values).finish_non_exhaustive()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
