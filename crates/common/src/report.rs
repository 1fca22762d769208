use std::collections::BTreeMap;
use std::fmt;

/// Keyed accumulator of validation errors.
///
/// Every mutating repository operation returns one of these instead of
/// failing outright; an empty report means success. Keys are stable
/// identifiers (`"access"`, `"file_tests"`, `"changed_title"`, ...) so that
/// several independent problems can be surfaced at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a report holding a single error.
    pub fn error(key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.add_error(key, message);
        report
    }

    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    /// Adds one error per message, keyed `<prefix><index>`.
    pub fn add_errors<I, S>(&mut self, prefix: &str, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (index, message) in messages.into_iter().enumerate() {
            self.add_error(format!("{}{}", prefix, index), message);
        }
    }

    pub fn has_error(&self, key: &str) -> bool {
        self.errors.contains_key(key)
    }

    pub fn get_error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when valid, the report itself otherwise.
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    /// Merges `other`, rewriting each key as `<prefix>.<key>`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationReport) {
        for (key, message) in other.errors {
            self.errors.insert(format!("{}.{}", prefix, key), message);
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .errors
            .iter()
            .map(|(key, message)| format!("{}: {}", key, message))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}
