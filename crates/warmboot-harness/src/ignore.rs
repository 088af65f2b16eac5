//! Ignore-rule matching for diagnostic findings.
//!
//! Rules are literal message prefixes supplied by the concrete suite. They
//! are never interpreted as regex: a rule containing `.*` or `(` matches
//! those characters themselves. A row is suppressed when its rendered text
//! starts with any rule.

/// A compiled set of literal ignore prefixes.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    prefixes: Vec<String>,
}

impl IgnoreMatcher {
    #[must_use]
    pub fn compile(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// True when `message` starts with any configured prefix.
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        self.prefixes.iter().any(|p| message.starts_with(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_suppresses_nothing() {
        let matcher = IgnoreMatcher::default();
        assert!(matcher.is_empty());
        assert!(!matcher.matches("Undefined index: foo"));
    }

    #[test]
    fn prefix_match_ignores_trailing_content() {
        let matcher = IgnoreMatcher::compile(vec!["Undefined index".to_owned()]);
        assert!(matcher.matches("Undefined index: foo in template.html"));
        assert!(matcher.matches("Undefined index"));
        assert!(!matcher.matches("Warning: Undefined index: foo"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let matcher = IgnoreMatcher::compile(vec!["error (code .*)".to_owned()]);
        assert!(matcher.matches("error (code .*) at line 3"));
        assert!(!matcher.matches("error (code 42) at line 3"));
    }

    #[test]
    fn any_of_several_prefixes_suppresses() {
        let matcher = IgnoreMatcher::compile(vec![
            "Deprecated function".to_owned(),
            "Undefined index".to_owned(),
        ]);
        assert!(matcher.matches("Deprecated function: each()"));
        assert!(matcher.matches("Undefined index: bar"));
        assert!(!matcher.matches("Fatal error: oom"));
    }
}
