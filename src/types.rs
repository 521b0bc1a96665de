/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Managers have unrestricted rights, employees only see
/// and touch what is assigned to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Manager,
    #[default]
    Employee,
}

/// Project priority, ordered from least to most pressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Project status. Any value may follow any other; there is no transition graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// Text forms double as the database representation.
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

text_enum!(Role, "role", {
    Manager => "MANAGER",
    Employee => "EMPLOYEE",
});

text_enum!(Priority, "priority", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Urgent => "URGENT",
});

text_enum!(ProjectStatus, "status", {
    NotStarted => "NOT_STARTED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
});

/// A field in a partial update: either left untouched or set to a value.
///
/// Use `#[serde(default)]` on the field so a missing key becomes `Absent`.
/// For nullable columns wrap an `Option`: `Patch<Option<T>>` turns an
/// explicit JSON `null` into `Set(None)`, which clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Absent => None,
        }
    }

    /// Overwrite `target` when a value is present
    pub fn apply_to(&self, target: &mut T)
    where
        T: Clone,
    {
        if let Patch::Set(value) = self {
            *target = value.clone();
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        note: Patch<Option<String>>,
    }

    #[test]
    fn missing_fields_are_absent() {
        let s: Sample = serde_json::from_str("{}").unwrap();
        assert!(s.name.is_absent());
        assert!(s.note.is_absent());
    }

    #[test]
    fn explicit_null_clears_nullable_field() {
        let s: Sample = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(s.note, Patch::Set(None));
        assert!(s.name.is_absent());
    }

    #[test]
    fn null_is_rejected_for_required_field() {
        assert!(serde_json::from_str::<Sample>(r#"{"name": null}"#).is_err());
    }

    #[test]
    fn apply_to_only_touches_present_values() {
        let mut name = "old".to_string();
        Patch::Absent.apply_to(&mut name);
        assert_eq!(name, "old");
        Patch::Set("new".to_string()).apply_to(&mut name);
        assert_eq!(name, "new");
    }

    #[test]
    fn enums_use_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&ProjectStatus::NotStarted).unwrap(), "\"NOT_STARTED\"");
        assert_eq!("IN_PROGRESS".parse::<ProjectStatus>().unwrap(), ProjectStatus::InProgress);
        assert!("DONE".parse::<ProjectStatus>().is_err());
        assert_eq!(Role::default(), Role::Employee);
        assert!(Priority::Urgent > Priority::High && Priority::Medium > Priority::Low);
    }
}
