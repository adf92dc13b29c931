//! Errors raised while extracting documentation from Go sources.

use thiserror::Error;

/// Errors that can occur while walking a package's source files.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A file failed to parse; the whole package is rejected.
    #[error("syntax error in {file} at line {line}")]
    Syntax { file: String, line: usize },

    #[error("found packages {first} and {second} in {file}")]
    MultiplePackages {
        first: String,
        second: String,
        file: String,
    },

    #[error("parser produced no tree for {file}")]
    ParserFailed { file: String },

    #[error("failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

/// Result type alias for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Converts into the core error, attributing it to `import_path`.
    pub fn for_package(self, import_path: impl Into<String>) -> gowalker_core::WalkerError {
        gowalker_core::WalkerError::Extract {
            path: import_path.into(),
            source: Box::new(self),
        }
    }
}

impl From<ExtractError> for gowalker_core::WalkerError {
    fn from(err: ExtractError) -> Self {
        err.for_package(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display() {
        let err = ExtractError::Syntax {
            file: "a.go".into(),
            line: 3,
        };
        assert_eq!(err.to_string(), "syntax error in a.go at line 3");
    }

    #[test]
    fn test_conversion_keeps_path() {
        let err = ExtractError::ParserFailed { file: "a.go".into() }.for_package("github.com/a/b");
        assert!(matches!(
            &err,
            gowalker_core::WalkerError::Extract { path, .. } if path == "github.com/a/b"
        ));
        assert!(!err.is_not_found());
    }
}
