use crate::model::ids::SchoolId;
use crate::model::status::ActiveStatus;
use crate::model::validation::{DraftErrors, is_valid_phone, normalize_optional, trimmed};

/// A registered school as listed on the dashboards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub address: String,
    pub email: String,
    pub admin_name: String,
    pub phone: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: ActiveStatus,
}

impl School {
    /// Case-insensitive match on name, email, address or city.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            Some(self.name.as_str()),
            Some(self.email.as_str()),
            Some(self.address.as_str()),
            self.city.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }

    /// Draft pre-filled for the edit form.
    #[must_use]
    pub fn to_draft(&self) -> SchoolDraft {
        SchoolDraft {
            name: self.name.clone(),
            address: self.address.clone(),
            email: self.email.clone(),
            admin_name: self.admin_name.clone(),
            phone: self.phone.clone(),
            city: self.city.clone().unwrap_or_default(),
            state: self.state.clone().unwrap_or_default(),
        }
    }
}

/// Add/edit school form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolDraft {
    pub name: String,
    pub address: String,
    pub email: String,
    pub admin_name: String,
    pub phone: String,
    pub city: String,
    pub state: String,
}

/// A school form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSchool {
    name: String,
    address: String,
    email: String,
    admin_name: String,
    phone: String,
    city: Option<String>,
    state: Option<String>,
}

impl SchoolDraft {
    /// # Errors
    ///
    /// Returns every missing or malformed field.
    pub fn validate(self) -> Result<ValidSchool, DraftErrors> {
        let mut errors = DraftErrors::new();
        errors.require("name", "School name", &self.name);
        errors.require("address", "School address", &self.address);
        errors.require("email", "School email", &self.email);
        errors.check_email("email", &self.email);
        errors.require("admin_name", "Admin name", &self.admin_name);
        errors.require("phone", "School phone", &self.phone);
        if !self.phone.trim().is_empty() && !is_valid_phone(&self.phone) {
            errors.push("phone", "Phone number must be 10 digits");
        }
        errors.into_result()?;

        Ok(ValidSchool {
            name: trimmed(&self.name),
            address: trimmed(&self.address),
            email: trimmed(&self.email),
            admin_name: trimmed(&self.admin_name),
            phone: trimmed(&self.phone),
            city: normalize_optional(Some(self.city)),
            state: normalize_optional(Some(self.state)),
        })
    }
}

impl ValidSchool {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn admin_name(&self) -> &str {
        &self.admin_name
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The record as it looks once the server assigned `id`.
    #[must_use]
    pub fn into_school(self, id: SchoolId, status: ActiveStatus) -> School {
        School {
            id,
            name: self.name,
            address: self.address,
            email: self.email,
            admin_name: self.admin_name,
            phone: self.phone,
            city: self.city,
            state: self.state,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SchoolDraft {
        SchoolDraft {
            name: " Green Valley High ".into(),
            address: "12 Park Road".into(),
            email: "office@gvh.edu".into(),
            admin_name: "R. Mehta".into(),
            phone: "9876543210".into(),
            city: "  ".into(),
            state: "Punjab".into(),
        }
    }

    #[test]
    fn validate_trims_and_normalizes() {
        let valid = draft().validate().unwrap();
        assert_eq!(valid.name(), "Green Valley High");
        assert_eq!(valid.city(), None);
        assert_eq!(valid.state(), Some("Punjab"));
    }

    #[test]
    fn validate_collects_all_errors() {
        let errors = SchoolDraft {
            email: "office".into(),
            phone: "12".into(),
            ..SchoolDraft::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.message_for("name"), Some("School name is required"));
        assert_eq!(
            errors.message_for("email"),
            Some("Please enter a valid email address")
        );
        assert_eq!(errors.message_for("phone"), Some("Phone number must be 10 digits"));
        assert!(errors.message_for("admin_name").is_some());
    }

    #[test]
    fn search_matches_city_and_name() {
        let school = draft()
            .validate()
            .unwrap()
            .into_school(SchoolId::new("7"), ActiveStatus::Active);
        assert!(school.matches("valley"));
        assert!(school.matches("OFFICE@"));
        assert!(!school.matches("ludhiana"));
        assert!(school.matches(""));
    }
}
