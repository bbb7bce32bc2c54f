//! Student record domain model.
//!
//! # Responsibility
//! - Define the canonical student record and its editable field set.
//! - Validate field formats once, at construction time.
//! - Derive display projections (`display_name`, `primary_contact`).
//!
//! # Invariants
//! - A `Record` is immutable; edits build a new value with the same `id`.
//! - `id` is positive and assigned by the store.
//! - Equality, hashing and ordering use `(last_name, first_name, patronymic)`
//!   only; two records with different ids but the same name compare equal.
//! - Optional fields never hold empty strings.

use crate::model::validate::{
    is_valid_email, is_valid_git, is_valid_messaging_handle, is_valid_name, is_valid_phone,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Store-assigned record identifier.
pub type RecordId = u64;

/// Validation failure for record construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Record id must be a positive integer.
    ZeroId,
    /// Persisted shape without an `id` was converted directly.
    MissingId,
    /// Required name field is empty after trim.
    MissingName { field: &'static str },
    /// Name does not match the capitalized-word pattern.
    InvalidName { field: &'static str, value: String },
    InvalidGit(String),
    InvalidEmail(String),
    InvalidPhone(String),
    InvalidMessagingHandle(String),
}

impl RecordValidationError {
    /// Field name the error refers to, for UI highlighting.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ZeroId | Self::MissingId => "id",
            Self::MissingName { field } | Self::InvalidName { field, .. } => field,
            Self::InvalidGit(_) => "git",
            Self::InvalidEmail(_) => "email",
            Self::InvalidPhone(_) => "phone",
            Self::InvalidMessagingHandle(_) => "messaging_handle",
        }
    }
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroId => write!(f, "record id must be positive"),
            Self::MissingId => write!(f, "record id is missing"),
            Self::MissingName { field } => write!(f, "{field} is required"),
            Self::InvalidName { field, value } => {
                write!(f, "invalid {field} `{value}`: expected a capitalized word")
            }
            Self::InvalidGit(value) => write!(
                f,
                "invalid git `{value}`: expected https://github.com/... or https://gitlab.com/..."
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::InvalidPhone(value) => write!(f, "invalid phone `{value}`"),
            Self::InvalidMessagingHandle(value) => write!(
                f,
                "invalid messaging handle `{value}`: expected @ followed by at least 5 characters"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// Editable field set used for create and update requests.
///
/// Values are raw user input. Construction of a [`Record`] trims every value
/// and treats blank optional values as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub git: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub messaging_handle: Option<String>,
}

impl RecordFields {
    /// Creates a field set with the two required names and nothing else.
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    pub fn with_patronymic(mut self, value: impl Into<String>) -> Self {
        self.patronymic = Some(value.into());
        self
    }

    pub fn with_git(mut self, value: impl Into<String>) -> Self {
        self.git = Some(value.into());
        self
    }

    pub fn with_email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn with_phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    pub fn with_messaging_handle(mut self, value: impl Into<String>) -> Self {
        self.messaging_handle = Some(value.into());
        self
    }
}

/// Source of a record's primary contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Messaging,
    Email,
    Phone,
}

impl ContactKind {
    /// Source tag rendered in front of the contact value.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Messaging => "telegram",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// One contact value tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub kind: ContactKind,
    pub value: String,
}

impl Display for Contact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.kind.tag(), self.value)
    }
}

/// Persisted JSON shape of one record.
///
/// `id` is optional so loaders can assign ids to legacy entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub git: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "telegram", alias = "messaging_handle")]
    pub messaging_handle: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PersistedRecord {
    /// Splits the persisted shape into its optional id and editable fields.
    pub fn into_parts(self) -> (Option<RecordId>, RecordFields) {
        let fields = RecordFields {
            first_name: self.first_name,
            last_name: self.last_name,
            patronymic: self.patronymic,
            git: self.git,
            email: self.email,
            phone: self.phone,
            messaging_handle: self.messaging_handle,
        };
        (self.id, fields)
    }
}

/// Canonical validated student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PersistedRecord", into = "PersistedRecord")]
pub struct Record {
    id: RecordId,
    first_name: String,
    last_name: String,
    patronymic: Option<String>,
    git: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    messaging_handle: Option<String>,
}

impl Record {
    /// Validates `fields` and builds a record with the given id.
    ///
    /// # Errors
    /// - Returns the first failing field in order: last name, first name,
    ///   patronymic, git, email, phone, messaging handle.
    pub fn new(id: RecordId, fields: RecordFields) -> Result<Self, RecordValidationError> {
        if id == 0 {
            return Err(RecordValidationError::ZeroId);
        }

        let last_name = required_name("last_name", &fields.last_name)?;
        let first_name = required_name("first_name", &fields.first_name)?;

        let patronymic = normalize_optional(fields.patronymic.as_deref());
        if let Some(value) = patronymic.as_deref() {
            if !is_valid_name(value) {
                return Err(RecordValidationError::InvalidName {
                    field: "patronymic",
                    value: value.to_string(),
                });
            }
        }

        let git = checked_optional(
            fields.git.as_deref(),
            is_valid_git,
            RecordValidationError::InvalidGit,
        )?;
        let email = checked_optional(
            fields.email.as_deref(),
            is_valid_email,
            RecordValidationError::InvalidEmail,
        )?;
        let phone = checked_optional(
            fields.phone.as_deref(),
            is_valid_phone,
            RecordValidationError::InvalidPhone,
        )?;
        let messaging_handle = checked_optional(
            fields.messaging_handle.as_deref(),
            is_valid_messaging_handle,
            RecordValidationError::InvalidMessagingHandle,
        )?;

        Ok(Self {
            id,
            first_name,
            last_name,
            patronymic,
            git,
            email,
            phone,
            messaging_handle,
        })
    }

    /// Builds the edited version of this record, keeping its id.
    pub fn with_fields(&self, fields: RecordFields) -> Result<Self, RecordValidationError> {
        Self::new(self.id, fields)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn patronymic(&self) -> Option<&str> {
        self.patronymic.as_deref()
    }

    pub fn git(&self) -> Option<&str> {
        self.git.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn messaging_handle(&self) -> Option<&str> {
        self.messaging_handle.as_deref()
    }

    /// Returns the editable fields of this record.
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            patronymic: self.patronymic.clone(),
            git: self.git.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            messaging_handle: self.messaging_handle.clone(),
        }
    }

    /// Surname followed by initials, e.g. `Ivanov I.P.` or `Petrov P.`.
    pub fn display_name(&self) -> String {
        let mut name = format!("{} {}.", self.last_name, initial(&self.first_name));
        if let Some(patronymic) = self.patronymic.as_deref() {
            name.push_str(&format!("{}.", initial(patronymic)));
        }
        name
    }

    /// First present contact in priority order: messaging handle, email,
    /// phone.
    pub fn primary_contact(&self) -> Option<Contact> {
        let candidates = [
            (ContactKind::Messaging, &self.messaging_handle),
            (ContactKind::Email, &self.email),
            (ContactKind::Phone, &self.phone),
        ];
        candidates.into_iter().find_map(|(kind, value)| {
            value.as_ref().map(|value| Contact {
                kind,
                value: value.clone(),
            })
        })
    }

    pub fn has_git(&self) -> bool {
        self.git.is_some()
    }

    pub fn has_contact(&self) -> bool {
        self.messaging_handle.is_some() || self.email.is_some() || self.phone.is_some()
    }

    /// One-line summary: id, display name, contact and git, skipping absent
    /// parts.
    pub fn short_info(&self) -> String {
        let mut parts = vec![self.id.to_string(), self.display_name()];
        if let Some(contact) = self.primary_contact() {
            parts.push(contact.to_string());
        }
        if let Some(git) = self.git.as_deref() {
            parts.push(git.to_string());
        }
        parts.join(", ")
    }

    fn comparison_key(&self) -> (&str, &str, &str) {
        (
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.patronymic.as_deref().unwrap_or(""),
        )
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.comparison_key().hash(state);
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparison_key().cmp(&other.comparison_key())
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {}, Last name: {}, First name: {}",
            self.id, self.last_name, self.first_name
        )?;
        let optional = [
            ("Patronymic", &self.patronymic),
            ("Phone", &self.phone),
            ("Email", &self.email),
            ("Telegram", &self.messaging_handle),
            ("Git", &self.git),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                write!(f, ", {label}: {value}")?;
            }
        }
        Ok(())
    }
}

impl TryFrom<PersistedRecord> for Record {
    type Error = RecordValidationError;

    fn try_from(value: PersistedRecord) -> Result<Self, Self::Error> {
        let (id, fields) = value.into_parts();
        let id = id.ok_or(RecordValidationError::MissingId)?;
        Self::new(id, fields)
    }
}

impl From<Record> for PersistedRecord {
    fn from(value: Record) -> Self {
        Self {
            id: Some(value.id),
            first_name: value.first_name,
            last_name: value.last_name,
            patronymic: value.patronymic,
            git: value.git,
            phone: value.phone,
            messaging_handle: value.messaging_handle,
            email: value.email,
        }
    }
}

fn required_name(field: &'static str, raw: &str) -> Result<String, RecordValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RecordValidationError::MissingName { field });
    }
    if !is_valid_name(value) {
        return Err(RecordValidationError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn checked_optional(
    raw: Option<&str>,
    is_valid: fn(&str) -> bool,
    invalid: impl FnOnce(String) -> RecordValidationError,
) -> Result<Option<String>, RecordValidationError> {
    match normalize_optional(raw) {
        Some(value) if !is_valid(&value) => Err(invalid(value)),
        other => Ok(other),
    }
}

fn initial(name: &str) -> char {
    name.chars().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{ContactKind, Record, RecordFields, RecordValidationError};

    fn ivanov() -> RecordFields {
        RecordFields::new("Ivanov", "Ivan").with_patronymic("Petrovich")
    }

    #[test]
    fn display_name_uses_initials() {
        let record = Record::new(1, ivanov()).unwrap();
        assert_eq!(record.display_name(), "Ivanov I.P.");

        let record = Record::new(2, RecordFields::new("Petrov", "Petr")).unwrap();
        assert_eq!(record.display_name(), "Petrov P.");
    }

    #[test]
    fn blank_optional_fields_become_absent() {
        let fields = RecordFields::new(" Ivanov ", "Ivan")
            .with_patronymic("   ")
            .with_email("");
        let record = Record::new(1, fields).unwrap();
        assert_eq!(record.last_name(), "Ivanov");
        assert_eq!(record.patronymic(), None);
        assert_eq!(record.email(), None);
    }

    #[test]
    fn primary_contact_follows_priority_order() {
        let fields = ivanov()
            .with_phone("+79991234567")
            .with_email("ivan@mail.ru");
        let record = Record::new(1, fields.clone()).unwrap();
        let contact = record.primary_contact().unwrap();
        assert_eq!(contact.kind, ContactKind::Email);
        assert_eq!(contact.to_string(), "email - ivan@mail.ru");

        let record = Record::new(1, fields.with_messaging_handle("@ivanov")).unwrap();
        assert_eq!(record.primary_contact().unwrap().to_string(), "telegram - @ivanov");

        let record = Record::new(1, ivanov()).unwrap();
        assert!(record.primary_contact().is_none());
        assert!(!record.has_contact());
    }

    #[test]
    fn validation_reports_first_failing_field() {
        let err = Record::new(1, RecordFields::new("", "Ivan")).unwrap_err();
        assert_eq!(
            err,
            RecordValidationError::MissingName { field: "last_name" }
        );

        let err = Record::new(1, RecordFields::new("Ivanov", "ivan")).unwrap_err();
        assert_eq!(err.field(), "first_name");

        let err = Record::new(1, ivanov().with_git("https://example.com/x")).unwrap_err();
        assert!(matches!(err, RecordValidationError::InvalidGit(_)));

        let err = Record::new(1, ivanov().with_messaging_handle("@abc")).unwrap_err();
        assert_eq!(err.field(), "messaging_handle");
    }

    #[test]
    fn zero_id_is_rejected() {
        assert_eq!(
            Record::new(0, ivanov()).unwrap_err(),
            RecordValidationError::ZeroId
        );
    }

    #[test]
    fn equality_ignores_id() {
        let a = Record::new(1, ivanov()).unwrap();
        let b = Record::new(7, ivanov().with_email("other@mail.ru")).unwrap();
        assert_eq!(a, b);

        let c = Record::new(2, RecordFields::new("Petrov", "Petr")).unwrap();
        assert!(a < c);
    }

    #[test]
    fn with_fields_keeps_id() {
        let record = Record::new(5, ivanov()).unwrap();
        let edited = record
            .with_fields(RecordFields::new("Sidorov", "Sidor"))
            .unwrap();
        assert_eq!(edited.id(), 5);
        assert_eq!(edited.last_name(), "Sidorov");
        assert_eq!(record.last_name(), "Ivanov");
    }

    #[test]
    fn short_info_skips_absent_parts() {
        let record = Record::new(3, ivanov().with_git("https://github.com/ivanov")).unwrap();
        assert_eq!(
            record.short_info(),
            "3, Ivanov I.P., https://github.com/ivanov"
        );
    }

    #[test]
    fn long_form_lists_present_fields() {
        let record = Record::new(3, ivanov().with_messaging_handle("@ivanov")).unwrap();
        assert_eq!(
            record.to_string(),
            "ID: 3, Last name: Ivanov, First name: Ivan, Patronymic: Petrovich, Telegram: @ivanov"
        );
    }
}
