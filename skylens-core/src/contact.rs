use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // literal pattern, compiles
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("static email regex should compile")
});

/// Minimum name length in Unicode scalar values. A base letter followed by a
/// combining mark counts as two, so decomposed names come out longer than
/// they look.
const MIN_NAME_LEN: usize = 4;

/// Contact form contents. All fields start empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn validate(&self) -> Vec<ValidationError> {
        validate(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Name,
    Email,
    Phone,
}

/// Why a contact form field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    NameEmpty,
    #[error("Name must be at least 4 characters")]
    NameTooShort,
    #[error("Name cannot contain numbers")]
    NameContainsDigits,
    #[error("Email cannot be empty")]
    EmailEmpty,
    #[error("Please enter a valid email address")]
    EmailInvalid,
    #[error("Phone number cannot be empty")]
    PhoneEmpty,
    #[error("Phone must contain digits only")]
    PhoneInvalid,
}

impl ValidationError {
    /// Stable identifier, usable as a list key in a UI.
    pub fn id(&self) -> &'static str {
        match self {
            ValidationError::NameEmpty => "name_empty",
            ValidationError::NameTooShort => "name_too_short",
            ValidationError::NameContainsDigits => "name_contains_digits",
            ValidationError::EmailEmpty => "email_empty",
            ValidationError::EmailInvalid => "email_invalid",
            ValidationError::PhoneEmpty => "phone_empty",
            ValidationError::PhoneInvalid => "phone_invalid",
        }
    }

    pub fn field(&self) -> ContactField {
        match self {
            ValidationError::NameEmpty
            | ValidationError::NameTooShort
            | ValidationError::NameContainsDigits => ContactField::Name,
            ValidationError::EmailEmpty | ValidationError::EmailInvalid => ContactField::Email,
            ValidationError::PhoneEmpty | ValidationError::PhoneInvalid => ContactField::Phone,
        }
    }
}

/// Checks every field of `contact`.
///
/// Each field reports at most one error (the first failing rule), and errors
/// come back in field order: name, email, phone. An empty result means the
/// form may be submitted.
pub fn validate(contact: &Contact) -> Vec<ValidationError> {
    [validate_name(&contact.name), validate_email(&contact.email), validate_phone(&contact.phone)]
        .into_iter()
        .flatten()
        .collect()
}

fn validate_name(name: &str) -> Option<ValidationError> {
    if name.is_empty() {
        Some(ValidationError::NameEmpty)
    } else if name.chars().count() < MIN_NAME_LEN {
        Some(ValidationError::NameTooShort)
    } else if name.chars().any(char::is_numeric) {
        Some(ValidationError::NameContainsDigits)
    } else {
        None
    }
}

fn validate_email(email: &str) -> Option<ValidationError> {
    if email.is_empty() {
        Some(ValidationError::EmailEmpty)
    } else if !EMAIL_REGEX.is_match(email) {
        Some(ValidationError::EmailInvalid)
    } else {
        None
    }
}

fn validate_phone(phone: &str) -> Option<ValidationError> {
    if phone.is_empty() {
        Some(ValidationError::PhoneEmpty)
    } else if !phone.chars().all(char::is_numeric) {
        Some(ValidationError::PhoneInvalid)
    } else {
        None
    }
}
