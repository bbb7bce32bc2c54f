//! Record filter predicates.
//!
//! # Responsibility
//! - Describe per-field filter clauses for the record table.
//! - Evaluate those clauses against records.
//!
//! # Invariants
//! - A missing clause never constrains the result.
//! - Matching is case-insensitive substring matching on case-folded values.
//! - Unknown presence-state labels resolve to `Any`.

use crate::model::record::Record;

/// Tri-state presence constraint for one optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceState {
    /// Field must be non-empty (and contain the clause text, if any).
    Present,
    /// Field must be empty.
    Absent,
    /// No constraint.
    #[default]
    Any,
}

impl PresenceState {
    /// Parses a UI/CLI label. Unrecognized labels fall back to `Any`.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "present" | "yes" => Self::Present,
            "absent" | "no" => Self::Absent,
            _ => Self::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Any => "any",
        }
    }
}

/// Filter clause for one optional field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldClause {
    pub state: PresenceState,
    /// Substring to look for; only consulted when `state` is `Present`.
    pub text: Option<String>,
}

impl FieldClause {
    pub fn present() -> Self {
        Self {
            state: PresenceState::Present,
            text: None,
        }
    }

    pub fn absent() -> Self {
        Self {
            state: PresenceState::Absent,
            text: None,
        }
    }

    pub fn containing(text: impl Into<String>) -> Self {
        Self {
            state: PresenceState::Present,
            text: Some(text.into()),
        }
    }

    /// Evaluates the clause against one field value.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = value.filter(|value| !value.is_empty());
        match self.state {
            PresenceState::Any => true,
            PresenceState::Absent => value.is_none(),
            PresenceState::Present => match value {
                None => false,
                Some(value) => match normalized_needle(self.text.as_deref()) {
                    Some(needle) => value.to_lowercase().contains(&needle),
                    None => true,
                },
            },
        }
    }

    fn is_constraint(&self) -> bool {
        self.state != PresenceState::Any
    }
}

/// Full filter specification for the record table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    /// Case-insensitive substring matched against `display_name`.
    pub name: Option<String>,
    pub git: Option<FieldClause>,
    pub email: Option<FieldClause>,
    pub phone: Option<FieldClause>,
    pub messaging: Option<FieldClause>,
    /// Clause over the rendered primary contact.
    pub contact: Option<FieldClause>,
}

impl FilterSpec {
    /// Returns whether any clause can exclude a record.
    pub fn is_active(&self) -> bool {
        normalized_needle(self.name.as_deref()).is_some()
            || [
                &self.git,
                &self.email,
                &self.phone,
                &self.messaging,
                &self.contact,
            ]
            .into_iter()
            .flatten()
            .any(FieldClause::is_constraint)
    }

    /// Returns whether `record` satisfies every present clause.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(needle) = normalized_needle(self.name.as_deref()) {
            if !record.display_name().to_lowercase().contains(&needle) {
                return false;
            }
        }

        let contact = record.primary_contact().map(|contact| contact.to_string());
        let checks = [
            (&self.git, record.git()),
            (&self.email, record.email()),
            (&self.phone, record.phone()),
            (&self.messaging, record.messaging_handle()),
            (&self.contact, contact.as_deref()),
        ];
        let matched = checks
            .into_iter()
            .all(|(clause, value)| clause.as_ref().map_or(true, |clause| clause.matches(value)));
        matched
    }
}

/// Returns the records satisfying `spec`, preserving input order.
pub fn apply(records: &[Record], spec: &FilterSpec) -> Vec<Record> {
    if !spec.is_active() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect()
}

fn normalized_needle(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::{apply, FieldClause, FilterSpec, PresenceState};
    use crate::model::record::{Record, RecordFields};

    fn sample() -> Vec<Record> {
        vec![
            Record::new(1, RecordFields::new("Ivanov", "Ivan")).unwrap(),
            Record::new(
                2,
                RecordFields::new("Petrov", "Petr")
                    .with_git("https://github.com/petrov")
                    .with_email("petr@mail.ru"),
            )
            .unwrap(),
            Record::new(
                3,
                RecordFields::new("Sidorov", "Sidor")
                    .with_git("https://gitlab.com/sidorov")
                    .with_messaging_handle("@sidorov"),
            )
            .unwrap(),
        ]
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn empty_spec_returns_input_unchanged() {
        let records = sample();
        assert_eq!(ids(&apply(&records, &FilterSpec::default())), vec![1, 2, 3]);
    }

    #[test]
    fn name_clause_matches_display_name_case_insensitively() {
        let spec = FilterSpec {
            name: Some("IVA".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &spec)), vec![1]);
    }

    #[test]
    fn blank_name_clause_is_ignored() {
        let spec = FilterSpec {
            name: Some("   ".to_string()),
            ..FilterSpec::default()
        };
        assert!(!spec.is_active());
        assert_eq!(apply(&sample(), &spec).len(), 3);
    }

    #[test]
    fn presence_states_filter_git() {
        let present = FilterSpec {
            git: Some(FieldClause::present()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &present)), vec![2, 3]);

        let absent = FilterSpec {
            git: Some(FieldClause::absent()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &absent)), vec![1]);

        let gitlab = FilterSpec {
            git: Some(FieldClause::containing("GITLAB")),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &gitlab)), vec![3]);
    }

    #[test]
    fn text_is_ignored_for_absent_and_any_states() {
        let clause = FieldClause {
            state: PresenceState::Absent,
            text: Some("github".to_string()),
        };
        assert!(clause.matches(None));
        assert!(!clause.matches(Some("https://github.com/x")));

        let any = FieldClause {
            state: PresenceState::Any,
            text: Some("nothing-matches".to_string()),
        };
        assert!(any.matches(None));
    }

    #[test]
    fn contact_clause_uses_rendered_primary_contact() {
        let spec = FilterSpec {
            contact: Some(FieldClause::containing("telegram")),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &spec)), vec![3]);

        let without = FilterSpec {
            contact: Some(FieldClause::absent()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &without)), vec![1]);
    }

    #[test]
    fn clauses_combine_with_and() {
        let spec = FilterSpec {
            git: Some(FieldClause::present()),
            email: Some(FieldClause::present()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&sample(), &spec)), vec![2]);
    }

    #[test]
    fn unknown_state_labels_are_permissive() {
        assert_eq!(PresenceState::from_label("yes"), PresenceState::Present);
        assert_eq!(PresenceState::from_label(" Absent "), PresenceState::Absent);
        assert_eq!(PresenceState::from_label("maybe"), PresenceState::Any);
    }
}
