//! Name records: one deadname paired with the name that replaces it.
//!
//! A record has a stable identity and freely editable content. Blank fields
//! are a normal transient state while the user types, so nothing here
//! validates.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a name record.
///
/// The id never changes while the record's fields are edited, which lets a
/// deferred removal confirm it is still pointing at the row the user chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two editable fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    /// The name being replaced. Rendered as an obscured input.
    DeadName,
    /// The name substituted in its place.
    CurrentName,
}

impl RecordField {
    /// Whether the field's content should be hidden while editing.
    #[must_use]
    pub const fn is_obscured(self) -> bool {
        matches!(self, Self::DeadName)
    }

    /// Placeholder label shown in an empty input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DeadName => "Deadname",
            Self::CurrentName => "Chosen name",
        }
    }
}

/// A deadname/current-name pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    /// Stable identity.
    pub id: RecordId,
    /// The name the user no longer uses.
    pub dead_name: String,
    /// The name that replaces it.
    pub current_name: String,
}

impl NameRecord {
    /// Creates a record with both fields set.
    #[must_use]
    pub fn new(dead_name: impl Into<String>, current_name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            dead_name: dead_name.into(),
            current_name: current_name.into(),
        }
    }

    /// Creates a record with both fields empty, as inserted by the add gestures.
    #[must_use]
    pub fn blank() -> Self {
        Self::new("", "")
    }

    /// Reads one field.
    #[must_use]
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::DeadName => &self.dead_name,
            RecordField::CurrentName => &self.current_name,
        }
    }

    /// Overwrites one field, leaving the other and the id untouched.
    pub fn set_field(&mut self, field: RecordField, value: impl Into<String>) {
        let slot = match field {
            RecordField::DeadName => &mut self.dead_name,
            RecordField::CurrentName => &mut self.current_name,
        };
        *slot = value.into();
    }

    /// True when the record cannot match anything.
    ///
    /// A rule with an empty dead name is valid data; the matching engine must
    /// skip it rather than reject it.
    #[must_use]
    pub fn is_noop_rule(&self) -> bool {
        self.dead_name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_record_is_noop_rule() {
        let r = NameRecord::blank();
        assert_eq!(r.dead_name, "");
        assert_eq!(r.current_name, "");
        assert!(r.is_noop_rule());

        let spaces = NameRecord::new("   ", "Alice");
        assert!(spaces.is_noop_rule());
    }

    #[test]
    fn set_field_keeps_identity_and_other_field() {
        let mut r = NameRecord::new("Tom", "Alice");
        let id = r.id;

        r.set_field(RecordField::CurrentName, "Alicia");
        assert_eq!(r.id, id);
        assert_eq!(r.field(RecordField::DeadName), "Tom");
        assert_eq!(r.field(RecordField::CurrentName), "Alicia");
        assert!(!r.is_noop_rule());

        r.set_field(RecordField::DeadName, "");
        assert!(r.is_noop_rule());
    }

    #[test]
    fn record_ids_are_unique() {
        let a = NameRecord::blank();
        let b = NameRecord::blank();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn dead_name_is_obscured() {
        assert!(RecordField::DeadName.is_obscured());
        assert!(!RecordField::CurrentName.is_obscured());
        assert_eq!(RecordField::CurrentName.label(), "Chosen name");
    }

    #[test]
    fn record_serde_shape() {
        let r = NameRecord::new("Tom", "Alice");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["dead_name"], "Tom");
        assert_eq!(json["current_name"], "Alice");
        assert!(json["id"].is_string());

        let back: NameRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
