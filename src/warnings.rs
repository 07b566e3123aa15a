use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

/// Ordered sink of non-fatal diagnostics, threaded explicitly through a parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "curlir::warnings", code, "{message}");
        self.0.push(Warning {
            code: code.to_string(),
            message,
        });
    }

    pub fn has(&self, code: &str) -> bool {
        self.0.iter().any(|w| w.code == code)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(|w| w.code.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_keep_order() {
        let mut warnings = Warnings::new();
        warnings.push("b", "second");
        warnings.push("a", "first");
        warnings.push("b", "third");
        assert_eq!(warnings.codes(), vec!["b", "a", "b"]);
        assert!(warnings.has("a"));
        assert!(!warnings.has("c"));
        assert_eq!(warnings.len(), 3);
    }
}
