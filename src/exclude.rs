use crate::error::{PackError, PackResult};
use glob::{MatchOptions, Pattern};
use std::path::{Component, Path};

/// Patterns excluded unless the caller opts out: virtual environment directories.
pub const DEFAULT_EXCLUDES: &[&str] = &[".venv", "venv"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A set of glob patterns deciding which paths stay out of an archive.
///
/// A path (relative to the template root) is excluded when a pattern matches
/// the whole relative path, or any single component of it. A pattern such as
/// `.venv` therefore excludes that directory at any depth, while `build/out`
/// only excludes that exact relative path (and, by pruning, its contents).
#[derive(Clone, Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<Pattern>,
}

impl ExcludeSet {
    pub fn new() -> Self {
        ExcludeSet::default()
    }

    /// The set holding only [`DEFAULT_EXCLUDES`].
    pub fn with_defaults() -> Self {
        let mut set = ExcludeSet::new();
        for pattern in DEFAULT_EXCLUDES {
            // Built-in patterns are known to be valid.
            if let Ok(pattern) = Pattern::new(pattern) {
                set.patterns.push(pattern);
            }
        }
        set
    }

    pub fn from_patterns<I, S>(patterns: I) -> PackResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = ExcludeSet::new();
        for pattern in patterns {
            set.exclude_pattern(pattern.as_ref())?;
        }
        Ok(set)
    }

    /// Adds a pattern to the set. Patterns already present are not duplicated.
    pub fn exclude_pattern(&mut self, pattern: &str) -> PackResult<()> {
        let compiled = Pattern::new(pattern).map_err(|source| PackError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if !self.patterns.contains(&compiled) {
            self.patterns.push(compiled);
        }
        Ok(())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.patterns.iter().map(Pattern::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `relative` (a path relative to the template root) is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.patterns
            .iter()
            .any(|pattern| self.pattern_matches(pattern, relative))
    }

    fn pattern_matches(&self, pattern: &Pattern, relative: &Path) -> bool {
        if pattern.matches_path_with(relative, MATCH_OPTIONS) {
            return true;
        }
        relative.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .map_or(false, |name| pattern.matches_with(name, MATCH_OPTIONS)),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_virtualenvs_at_any_depth() {
        let set = ExcludeSet::with_defaults();
        assert!(set.is_excluded(Path::new(".venv")));
        assert!(set.is_excluded(Path::new("venv/lib/site.py")));
        assert!(set.is_excluded(Path::new("backend/.venv/bin/python")));
        assert!(!set.is_excluded(Path::new("src/venvironment.py")));
        assert!(!set.is_excluded(Path::new("README.md")));
    }

    #[test]
    fn wildcard_matches_file_names_anywhere() {
        let set = ExcludeSet::from_patterns(&["*.pyc"]).unwrap();
        assert!(set.is_excluded(Path::new("mod.pyc")));
        assert!(set.is_excluded(Path::new("src/pkg/mod.pyc")));
        assert!(!set.is_excluded(Path::new("src/pkg/mod.py")));
    }

    #[test]
    fn relative_path_patterns_are_anchored() {
        let set = ExcludeSet::from_patterns(&["build/out"]).unwrap();
        assert!(set.is_excluded(Path::new("build/out")));
        assert!(!set.is_excluded(Path::new("build")));
        assert!(!set.is_excluded(Path::new("src/build/out")));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        match ExcludeSet::from_patterns(&["[unterminated"]) {
            Err(PackError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[unterminated"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut set = ExcludeSet::with_defaults();
        set.exclude_pattern(".venv").unwrap();
        assert_eq!(set.patterns().count(), DEFAULT_EXCLUDES.len());
    }
}
