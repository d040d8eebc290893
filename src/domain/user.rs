use serde::{Deserialize, Serialize};

use crate::domain::validate;
use crate::error::Error;
use crate::store::document::{Document, Value};

pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHOTO: &str = "photo";
    pub const ROLE: &str = "role";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CHANGED_AT: &str = "passwordChangedAt";
    pub const ACTIVE: &str = "active";
    pub const CREATED_AT: &str = "createdAt";
}

pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Guide,
    LeadGuide,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::User => "user",
        }
    }

    pub fn from_wire(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "guide" => Some(Role::Guide),
            "lead-guide" => Some(Role::LeadGuide),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl SignupInput {
    pub fn validate(&self) -> Result<(), Error> {
        validate::non_empty(fields::NAME, &self.name)?;
        validate::email(fields::EMAIL, &self.email)?;
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }
        if self.password != self.password_confirm {
            return Err(Error::Validation("passwords are not the same".to_string()));
        }
        Ok(())
    }

    /// Builds the stored form. The caller supplies the already-hashed
    /// password; new accounts always start as plain users.
    pub fn into_document(self, password_hash: String, now_ms: i64) -> Document {
        let mut doc = Document::new()
            .with(fields::NAME, Value::Text(self.name))
            .with(fields::EMAIL, Value::Text(self.email.to_lowercase()))
            .with(fields::ROLE, Value::Text(Role::User.as_str().to_string()))
            .with(fields::PASSWORD, Value::Text(password_hash))
            .with(fields::ACTIVE, Value::Boolean(true))
            .with(fields::CREATED_AT, Value::Timestamp(now_ms));
        if let Some(photo) = self.photo {
            doc.set(fields::PHOTO, Value::Text(photo));
        }
        doc
    }
}

/// Strips credential-bearing fields before a user document leaves the
/// domain layer.
pub fn sanitize(doc: &mut Document) {
    doc.remove(fields::PASSWORD);
    doc.remove(fields::PASSWORD_CHANGED_AT);
    doc.remove(fields::ACTIVE);
}

pub fn role_of(doc: &Document) -> Role {
    doc.text(fields::ROLE)
        .ok()
        .and_then(Role::from_wire)
        .unwrap_or(Role::User)
}

#[cfg(test)]
mod tests {
    use super::{role_of, sanitize, Role, SignupInput};
    use crate::store::document::{Document, Value};

    fn signup() -> SignupInput {
        SignupInput {
            name: "Monica Geller".to_string(),
            email: "Monica@Example.com".to_string(),
            password: "pass-word-123".to_string(),
            password_confirm: "pass-word-123".to_string(),
            photo: None,
        }
    }

    #[test]
    fn password_confirmation_must_match() {
        let mut input = signup();
        input.password_confirm = "different-123".to_string();
        assert!(input.validate().is_err());
        assert!(signup().validate().is_ok());
    }

    #[test]
    fn stored_email_is_lowercased_and_role_defaults_to_user() {
        let doc = signup().into_document("hash".to_string(), 0);
        assert_eq!(doc.text("email").unwrap(), "monica@example.com");
        assert_eq!(role_of(&doc), Role::User);
    }

    #[test]
    fn sanitize_removes_credential_fields() {
        let mut doc = signup().into_document("hash".to_string(), 0);
        doc.set("passwordChangedAt", Value::Timestamp(1));
        sanitize(&mut doc);
        assert!(doc.get("password").is_none());
        assert!(doc.get("passwordChangedAt").is_none());
        assert!(doc.get("active").is_none());
        assert!(doc.get("name").is_some());
    }

    #[test]
    fn role_parses_kebab_case_wire_names() {
        assert_eq!(Role::from_wire("lead-guide"), Some(Role::LeadGuide));
        assert_eq!(Role::from_wire("superuser"), None);
        let doc = Document::new().with("role", Value::Text("guide".into()));
        assert_eq!(role_of(&doc), Role::Guide);
    }
}
