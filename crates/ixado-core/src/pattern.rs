use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated action or pattern string.
///
/// Grammar: the literal `*`, or a non-empty sequence of lower-kebab
/// segments joined by `:`, optionally ending in a trailing `:*` wildcard
/// segment. The same grammar is used for concrete action identifiers
/// (`git:privileged:push`) and for allow/deny patterns
/// (`git:privileged:*`) — whether a given instance is used as one or the
/// other is determined by where it is stored, not by its shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(String);

/// The pattern/action string fails the grammar described on [`Pattern`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid action/pattern string: {0:?}")]
pub struct PatternError(pub String);

impl Pattern {
    /// Validate and wrap a string as a [`Pattern`].
    pub fn new(s: impl Into<String>) -> Result<Self, PatternError> {
        let s = s.into();
        if validate(&s) {
            Ok(Self(s))
        } else {
            Err(PatternError(s))
        }
    }

    /// The underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if this pattern matches `action` under the grammar's
    /// matching rule: the literal `*` matches anything; a `P:*` pattern
    /// matches any action beginning with `P:`; otherwise the comparison
    /// is exact equality. Note this is an exactness check, not a deep
    /// prefix match: `foo:bar:*` does not match the bare string `foo:bar`.
    pub fn matches(&self, action: &str) -> bool {
        if self.0 == "*" {
            return true;
        }
        if let Some(prefix) = self.0.strip_suffix('*') {
            return action.starts_with(prefix);
        }
        self.0 == action
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Pattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pattern> for String {
    fn from(value: Pattern) -> Self {
        value.0
    }
}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

fn validate(s: &str) -> bool {
    if s == "*" {
        return true;
    }
    if s.is_empty() {
        return false;
    }
    let parts: Vec<&str> = s.split(':').collect();
    let (segments, wildcard_suffix) = match parts.split_last() {
        Some((&"*", rest)) if !rest.is_empty() => (rest, true),
        _ => (parts.as_slice(), false),
    };
    let _ = wildcard_suffix;
    !segments.is_empty() && segments.iter().all(|seg| is_valid_segment(seg))
}

fn is_valid_segment(seg: &str) -> bool {
    let mut chars = seg.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
