//! Projection failures.

use thiserror::Error;

/// What went wrong while projecting a present value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionErrorKind {
    /// A text converter met a map or sequence.
    #[error("expected a scalar, found {found}")]
    ExpectedScalar { found: &'static str },

    /// An object shape met a scalar or sequence.
    #[error("expected a {shape} map, found {found}")]
    ExpectedObject {
        shape: &'static str,
        found: &'static str,
    },

    /// A collection field did not hold a sequence.
    #[error("expected a sequence, found {found}")]
    MalformedCollection { found: &'static str },

    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// A projection failure with the path of the offending value,
/// e.g. `trainServices[0].origin`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("projection failed at `{}`: {kind}", display_path(.path))]
pub struct ProjectionError {
    pub path: String,
    pub kind: ProjectionErrorKind,
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;

impl ProjectionError {
    pub fn new(kind: ProjectionErrorKind) -> Self {
        Self {
            path: String::new(),
            kind,
        }
    }

    /// Prefix the path with the enclosing field name.
    pub fn in_field(mut self, field: &str) -> Self {
        self.path = if self.path.is_empty() {
            field.to_string()
        } else if self.path.starts_with('[') {
            format!("{field}{}", self.path)
        } else {
            format!("{field}.{}", self.path)
        };
        self
    }

    /// Prefix the path with the enclosing sequence index.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path = if self.path.is_empty() || self.path.starts_with('[') {
            format!("[{index}]{}", self.path)
        } else {
            format!("[{index}].{}", self.path)
        };
        self
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_building() {
        let err = ProjectionError::new(ProjectionErrorKind::MalformedCollection { found: "map" })
            .in_field("location")
            .at_index(0)
            .in_field("origin")
            .at_index(2)
            .in_field("trainServices");
        assert_eq!(err.path, "trainServices[2].origin[0].location");
    }

    #[test]
    fn test_nested_index_path() {
        let err = ProjectionError::new(ProjectionErrorKind::ExpectedObject {
            shape: "calling_point",
            found: "scalar",
        })
        .at_index(1)
            .at_index(0)
            .in_field("previousCallingPoints");
        assert_eq!(err.path, "previousCallingPoints[0][1]");
    }

    #[test]
    fn test_error_display() {
        let err = ProjectionError::new(ProjectionErrorKind::ExpectedScalar { found: "map" })
            .in_field("crs");
        assert_eq!(
            err.to_string(),
            "projection failed at `crs`: expected a scalar, found map"
        );
        let root = ProjectionError::new(ProjectionErrorKind::ExpectedObject {
            shape: "station_board",
            found: "sequence",
        });
        assert_eq!(
            root.to_string(),
            "projection failed at `<root>`: expected a station_board map, found sequence"
        );
    }
}
