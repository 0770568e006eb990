use crate::model::ids::SalesPersonId;
use crate::model::status::ActiveStatus;
use crate::model::validation::{DraftErrors, trimmed};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesPerson {
    pub id: SalesPersonId,
    pub name: String,
    pub email: String,
    pub status: ActiveStatus,
}

/// Registration form for a new sales team member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesPersonDraft {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSalesPerson {
    name: String,
    email: String,
    password: String,
}

impl SalesPersonDraft {
    /// # Errors
    ///
    /// Returns every missing field, a malformed email, and a password shorter
    /// than six characters.
    pub fn validate(self) -> Result<ValidSalesPerson, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("name", "Name", &self.name);
        errors.require("email", "Email", &self.email);
        errors.require("password", "Password", &self.password);
        errors.check_email("email", &self.email);
        if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
            );
        }
        errors.into_result()?;

        Ok(ValidSalesPerson {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            password: self.password,
        })
    }
}

impl ValidSalesPerson {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
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
    fn short_password_rejected() {
        let errors = SalesPersonDraft {
            name: "Kiran".into(),
            email: "kiran@sales.in".into(),
            password: "12345".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.to_string(),
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn blank_form_lists_required_fields_in_order() {
        let errors = SalesPersonDraft::default().validate().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "Name is required. Email is required. Password is required"
        );
    }

    #[test]
    fn valid_form_is_trimmed() {
        let valid = SalesPersonDraft {
            name: " Kiran ".into(),
            email: " kiran@sales.in".into(),
            password: "secret1".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.name(), "Kiran");
        assert_eq!(valid.email(), "kiran@sales.in");
    }
}
