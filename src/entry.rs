//! Parsed log entries.

use crate::directive::{param_field_name, sanitize_name, ParamRule};
use crate::error::{Error, Result};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type alias for the underlying field storage.
/// Values are the raw matched text; conversion happens on demand.
pub type Fields = HashMap<String, String>;

/// The fields captured from one log line.
///
/// Keys are the fixed field names (`host`, `status`, `time`, ...) and, for
/// parameterized directives, `<category>___<name>` such as
/// `reqHeader___useragent`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    fields: Fields,
}

impl Entry {
    /// Create a new empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entry from a fields map.
    pub fn from_fields(fields: Fields) -> Self {
        Self { fields }
    }

    /// Get a field value as a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use rsapache::Entry;
    /// # use std::collections::HashMap;
    /// let mut fields = HashMap::new();
    /// fields.insert("status".to_string(), "200".to_string());
    /// let entry = Entry::from_fields(fields);
    ///
    /// assert_eq!(entry.field("status").unwrap(), "200");
    /// assert!(entry.field("nonexistent").is_err());
    /// ```
    pub fn field(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| Error::field_not_found(name))
    }

    /// Get a field value if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Whether the entry has a value for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get a parameterized field by its directive family and the name as it
    /// was written in the format.
    ///
    /// # Arguments
    ///
    /// * `rule` - The directive family (e.g., `ParamRule::ReqHeader` for `%{...}i`)
    /// * `name` - The braced name, unsanitized (e.g., `"User-Agent"`)
    ///
    /// # Returns
    ///
    /// The captured value, or [`Error::FieldNotFound`] if the format had no
    /// such directive.
    pub fn param_field(&self, rule: ParamRule, name: &str) -> Result<&str> {
        self.field(&param_field_name(rule, &sanitize_name(name)))
    }

    /// Get a field value as a float.
    ///
    /// # Arguments
    ///
    /// * `name` - The field name to retrieve and convert
    ///
    /// # Returns
    ///
    /// The field value as a f64, or an error if the field doesn't exist or cannot be parsed.
    pub fn float_field(&self, name: &str) -> Result<f64> {
        let value = self.field(name)?;
        value
            .parse::<f64>()
            .map_err(|e| Error::field_parse_error(name, value, "f64", e))
    }

    /// Get a field value as a 64-bit integer.
    pub fn int64_field(&self, name: &str) -> Result<i64> {
        let value = self.field(name)?;
        value
            .parse::<i64>()
            .map_err(|e| Error::field_parse_error(name, value, "i64", e))
    }

    /// Get a field value as a 32-bit integer.
    pub fn int_field(&self, name: &str) -> Result<i32> {
        let value = self.field(name)?;
        value
            .parse::<i32>()
            .map_err(|e| Error::field_parse_error(name, value, "i32", e))
    }

    /// Get a byte count field, treating the CLF `-` as zero.
    pub fn bytes_field(&self, name: &str) -> Result<u64> {
        match self.field(name)? {
            "-" => Ok(0),
            value => value
                .parse::<u64>()
                .map_err(|e| Error::field_parse_error(name, value, "u64", e)),
        }
    }

    /// Create a partial entry containing only specified fields.
    ///
    /// Missing fields are included with empty string values.
    pub fn partial(&self, field_names: &[&str]) -> Entry {
        let fields = field_names
            .iter()
            .map(|&name| {
                let value = self.fields.get(name).cloned().unwrap_or_default();
                (name.to_string(), value)
            })
            .collect();
        Entry::from_fields(fields)
    }

    /// Get an iterator over all field names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter()
    }

    /// Get the number of fields in this entry.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if this entry has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a reference to the underlying fields map.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl From<Fields> for Entry {
    fn from(fields: Fields) -> Self {
        Self::from_fields(fields)
    }
}

impl From<Entry> for Fields {
    fn from(entry: Entry) -> Self {
        entry.fields
    }
}
