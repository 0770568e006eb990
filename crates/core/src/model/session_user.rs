use crate::model::ids::UserId;
use crate::model::role::{Capability, Role};
use crate::model::validation::{DraftErrors, is_valid_email, is_valid_phone};

/// The signed-in account, created at login and dropped at logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    id: UserId,
    name: String,
    email: String,
    role: Role,
}

impl SessionUser {
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        self.role.allows(capability)
    }
}

/// How long a login should survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persistence {
    /// Keep the session record across restarts ("remember me").
    Remember,
    /// Keep the session for this run only.
    #[default]
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Phone(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: LoginIdentifier,
    password: String,
}

impl Credentials {
    /// Parses the single "email or phone" login field.
    ///
    /// # Errors
    ///
    /// Returns `DraftErrors` when the identifier is neither an email nor a
    /// ten-digit phone number, or the password is blank.
    pub fn parse(identifier: &str, password: &str) -> Result<Self, DraftErrors> {
        let mut errors = DraftErrors::new();
        let trimmed = identifier.trim();
        let identifier = if is_valid_email(trimmed) {
            Some(LoginIdentifier::Email(trimmed.to_string()))
        } else if is_valid_phone(trimmed) {
            Some(LoginIdentifier::Phone(trimmed.to_string()))
        } else {
            errors.push(
                "identifier",
                "Please enter a valid email address or 10-digit phone number.",
            );
            None
        };
        errors.require("password", "Password", password);

        match identifier {
            Some(identifier) if errors.is_empty() => Ok(Self {
                identifier,
                password: password.to_string(),
            }),
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &LoginIdentifier {
        &self.identifier
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_accept_email_or_phone() {
        let by_email = Credentials::parse(" head@school.edu ", "secret").unwrap();
        assert_eq!(
            by_email.identifier(),
            &LoginIdentifier::Email("head@school.edu".into())
        );
        let by_phone = Credentials::parse("9876543210", "secret").unwrap();
        assert_eq!(by_phone.identifier(), &LoginIdentifier::Phone("9876543210".into()));
    }

    #[test]
    fn credentials_report_every_problem() {
        let errors = Credentials::parse("nope", "").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.message_for("password").is_some());
    }

    #[test]
    fn session_user_capabilities_follow_role() {
        let user = SessionUser::new(UserId::new(3), "Ana", "ana@x.io", Role::Student);
        assert!(user.allows(Capability::TakeMockTests));
        assert!(!user.allows(Capability::ManageBlogs));
    }
}
