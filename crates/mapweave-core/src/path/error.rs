//! Error types for field path parsing and manipulation
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Field path errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Empty input string
    #[error("Empty path expression")]
    Empty,

    /// The path string could not be parsed
    #[error("Malformed path '{path}' at position {position}: {message}")]
    Malformed {
        path: String,
        position: usize,
        message: String,
    },

    /// An index operation targeted a segment that is not a collection
    #[error("Segment {segment} of '{path}' is not a collection")]
    NotACollection { path: String, segment: usize },

    /// A segment position past the end of the path
    #[error("Segment {segment} is out of range for '{path}' ({len} segments)")]
    SegmentOutOfRange {
        path: String,
        segment: usize,
        len: usize,
    },
}

impl PathError {
    /// Create a malformed-path error
    pub fn malformed(path: impl Into<String>, position: usize, message: impl Into<String>) -> Self {
        PathError::Malformed {
            path: path.into(),
            position,
            message: message.into(),
        }
    }

    /// Suggestions for fixing the error, used in validation reports
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PathError::Empty => vec!["Use '/' to address the document root".to_string()],
            PathError::Malformed { message, .. } if message.contains("index") => vec![
                "Collection indexes must be non-negative integers, e.g. 'items[0]'".to_string(),
                "Leave the brackets empty to address the whole collection, e.g. 'items[]'"
                    .to_string(),
            ],
            PathError::Malformed { .. } => vec![
                "Separate segments with '/'".to_string(),
                "Use name[i] for arrays, name<i> for lists and name{i} for maps".to_string(),
            ],
            PathError::NotACollection { .. } => {
                vec!["Only collection segments carry an index".to_string()]
            }
            PathError::SegmentOutOfRange { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = PathError::malformed("/a[", 2, "unbalanced collection marker");
        assert_eq!(
            err.to_string(),
            "Malformed path '/a[' at position 2: unbalanced collection marker"
        );
    }

    #[test]
    fn test_recovery_suggestions_for_index_errors() {
        let err = PathError::malformed("/a[-1]", 3, "invalid collection index '-1'");
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("non-negative"));
    }
}
