use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use super::error::{FieldIssue, PathSegment, TypeError};

pub type FormData = Map<String, Value>;

/// How a missing or `null` field is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absence and `null` are both issues, reported with the given message.
    Required(&'static str),
    /// May be absent, but not `null`.
    NonNull,
    /// May be absent or `null`.
    Nullable,
}

/// Read access to an untyped object that records every issue it meets
/// instead of stopping at the first one.
///
/// Getters return `None` when the field is absent or invalid, `Some(None)`
/// for an accepted `null` and `Some(Some(value))` otherwise.
pub struct Form<'a> {
    inner: &'a FormData,
    prefix: Vec<PathSegment>,
    issues: Vec<FieldIssue>,
}

impl<'a> Form<'a> {
    pub fn from_data(data: &'a FormData) -> Self {
        Self::nested(data, vec![])
    }

    pub fn nested(data: &'a FormData, prefix: Vec<PathSegment>) -> Self {
        Self {
            inner: data,
            prefix,
            issues: vec![],
        }
    }

    pub fn path(&self, key: &str) -> Vec<PathSegment> {
        let mut path = self.prefix.clone();
        path.push(key.into());
        path
    }

    pub fn issue(&mut self, key: &str, message: impl Into<String>) {
        let path = self.path(key);
        self.issues.push(FieldIssue::new(path, message));
    }

    pub fn extend(&mut self, issues: Vec<FieldIssue>) {
        self.issues.extend(issues);
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.issues
    }

    /// Resolves absence / `null` according to `presence`. Returns the value
    /// only when there is something left to check.
    fn lookup(&mut self, key: &str, presence: Presence) -> Option<Option<&'a Value>> {
        let inner: &'a FormData = self.inner;
        match (inner.get(key), presence) {
            (None, Presence::Required(message)) => {
                self.issue(key, message);
                None
            }
            (None, _) => None,
            (Some(Value::Null), Presence::Required(message)) => {
                self.issue(key, message);
                None
            }
            (Some(Value::Null), Presence::NonNull) => {
                self.issue(key, "Expected a value, received null");
                None
            }
            (Some(Value::Null), Presence::Nullable) => Some(None),
            (Some(value), _) => Some(Some(value)),
        }
    }

    pub fn get_str(
        &mut self,
        key: &str,
        presence: Presence,
        min: usize,
        max: Option<usize>,
        too_short: &str,
    ) -> Option<Option<String>> {
        let value = match self.lookup(key, presence)? {
            Some(value) => value,
            None => return Some(None),
        };

        let Some(text) = value.as_str() else {
            self.issue(key, "Expected string");
            return None;
        };

        let length = text.chars().count();
        if length < min {
            self.issue(key, too_short);
            return None;
        }
        if let Some(max) = max {
            if length > max {
                self.issue(
                    key,
                    format!("String must contain at most {max} character(s)"),
                );
                return None;
            }
        }

        Some(Some(text.to_string()))
    }

    pub fn get_number(
        &mut self,
        key: &str,
        presence: Presence,
        min: i64,
        too_small: &str,
    ) -> Option<Option<i32>> {
        let value = match self.lookup(key, presence)? {
            Some(value) => value,
            None => return Some(None),
        };

        let Some(number) = as_integer(value) else {
            self.issue(key, "Expected integer");
            return None;
        };

        if number < min {
            self.issue(key, too_small);
            return None;
        }

        match i32::try_from(number) {
            Ok(number) => Some(Some(number)),
            Err(_) => {
                self.issue(key, "Number is too large");
                None
            }
        }
    }

    pub fn get_value<T>(&mut self, key: &str, presence: Presence) -> Option<Option<T>>
    where
        T: for<'v> TryFrom<&'v Value, Error = TypeError>,
    {
        let value = match self.lookup(key, presence)? {
            Some(value) => value,
            None => return Some(None),
        };

        match T::try_from(value) {
            Ok(value) => Some(Some(value)),
            Err(e) => {
                self.issue(key, e.info());
                None
            }
        }
    }

    /// Accepts absolute URLs only.
    pub fn get_url(&mut self, key: &str, presence: Presence) -> Option<Option<String>> {
        let value = match self.lookup(key, presence)? {
            Some(value) => value,
            None => return Some(None),
        };

        match value.as_str().map(Url::parse) {
            Some(Ok(_)) => Some(value.as_str().map(String::from)),
            _ => {
                self.issue(key, "Must be a valid URL");
                None
            }
        }
    }

    pub fn get_uuid(&mut self, key: &str, presence: Presence) -> Option<Option<Uuid>> {
        let value = match self.lookup(key, presence)? {
            Some(value) => value,
            None => return Some(None),
        };

        match value.as_str().map(Uuid::parse_str) {
            Some(Ok(id)) => Some(Some(id)),
            _ => {
                self.issue(key, "Invalid uuid");
                None
            }
        }
    }

    /// Array elements that are objects, with their index. Non-object
    /// elements are reported and skipped.
    pub fn get_objects(&mut self, key: &str) -> Option<Vec<(usize, &'a FormData)>> {
        let value = self.lookup(key, Presence::NonNull)??;

        let Some(items) = value.as_array() else {
            self.issue(key, "Expected array");
            return None;
        };

        let mut objects = vec![];
        for (index, item) in items.iter().enumerate() {
            match item.as_object() {
                Some(object) => objects.push((index, object)),
                None => {
                    let mut path = self.path(key);
                    path.push(index.into());
                    self.issues.push(FieldIssue::new(path, "Expected object"));
                }
            }
        }

        Some(objects)
    }
}

/// Whole JSON numbers, including ones written as `4.0`.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }

    value
        .as_f64()
        .filter(|number| number.is_finite() && number.fract() == 0.0)
        .map(|number| number as i64)
}
