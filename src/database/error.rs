use std::fmt::{self, Display};

use serde::Serialize;

/// Failure of the underlying relational store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Unique constraint violated ({0})")]
    UniqueViolation(String),
    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                Self::UniqueViolation(e.constraint().unwrap_or("unique").to_string())
            }
            e => Self::Database(format!("{e}")),
        }
    }
}

/// One element of a field path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Issue at a single top-level key.
    pub fn at(key: &str, message: impl Into<String>) -> Self {
        Self::new(vec![key.into()], message)
    }

    pub fn is_at(&self, path: &[&str]) -> bool {
        self.path.len() == path.len()
            && self.path.iter().zip(path).all(|(segment, key)| match segment {
                PathSegment::Key(k) => k == key,
                PathSegment::Index(i) => i.to_string() == *key,
            })
    }
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .path
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(k) => k.to_owned(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<String>>()
            .join(".");
        write!(f, "{path}: {}", self.message)
    }
}

/// Every violated field of one input, collected in a single pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed with {} issue(s)", issues.len())]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: FieldIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn has_issue_at(&self, path: &[&str]) -> bool {
        self.issues.iter().any(|issue| issue.is_at(path))
    }
}

/// Conversion failure of an untyped value into an enumerated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }

    pub fn info(&self) -> &str {
        &self.info
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.info)
    }
}

impl std::error::Error for TypeError {}

/// Outcome taxonomy of the recipe operations exposed to boundary handlers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecipeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Recipe not found")]
    NotFound,
    #[error("Slug '{0}' already exists")]
    Conflict(String),
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}
