use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::ids::UserId;
use crate::model::validation::{DraftErrors, is_valid_phone, normalize_optional, trimmed};

/// Exam a user signed up for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredExam {
    pub title: String,
    pub subject: String,
    pub date: Option<NaiveDate>,
}

/// A student account as returned by the users endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    /// Human-facing code such as `user12`.
    pub user_code: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub school: Option<String>,
    pub user_class: Option<String>,
    pub registered_exams: Vec<RegisteredExam>,
}

impl UserAccount {
    #[must_use]
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone().unwrap_or_default(),
            school: self.school.clone().unwrap_or_default(),
            user_class: self.user_class.clone().unwrap_or_default(),
        }
    }
}

fn validate_contact(errors: &mut DraftErrors, name: &str, email: &str, phone: &str) {
    errors.require("name", "Name", name);
    errors.require("email", "Email", email);
    errors.check_email("email", email);
    if !phone.trim().is_empty() && !is_valid_phone(phone) {
        errors.push("phone", "Phone number must be 10 digits");
    }
}

/// Sign-up form used by admins to add a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUserDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub school: String,
    pub user_class: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub school: Option<String>,
    pub user_class: Option<String>,
    pub password: String,
}

impl NewUserDraft {
    /// # Errors
    ///
    /// Returns missing name, email or password and malformed email or phone.
    pub fn validate(self) -> Result<ValidNewUser, DraftErrors> {
        let mut errors = DraftErrors::new();
        validate_contact(&mut errors, &self.name, &self.email, &self.phone);
        errors.require("password", "Password", &self.password);
        errors.into_result()?;

        Ok(ValidNewUser {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            phone: normalize_optional(Some(self.phone)),
            school: normalize_optional(Some(self.school)),
            user_class: normalize_optional(Some(self.user_class)),
            password: self.password,
        })
    }
}

/// Shortest password the public sign-up form accepts.
pub const MIN_SIGNUP_PASSWORD_LEN: usize = 8;

/// School picked on the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchoolChoice {
    #[default]
    Unselected,
    /// A registered school, stored as `"Name, Address"`.
    Listed { name: String, address: String },
    /// A school typed in by hand.
    Other { name: String, address: String },
}

impl SchoolChoice {
    /// The `school` value sent to the backend; hand-typed schools are upper-cased.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Unselected => None,
            Self::Listed { name, address } => Some(format!("{}, {}", name.trim(), address.trim())),
            Self::Other { name, address } => {
                if name.trim().is_empty() || address.trim().is_empty() {
                    return None;
                }
                Some(format!(
                    "{}, {}",
                    name.trim().to_uppercase(),
                    address.trim().to_uppercase()
                ))
            }
        }
    }
}

/// Public student sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_class: String,
    pub password: String,
    pub confirm_password: String,
    pub school: SchoolChoice,
}

impl RegistrationDraft {
    /// # Errors
    ///
    /// Returns missing or malformed contact fields, a missing class, a short
    /// or mismatched password, and a missing school.
    pub fn validate(self) -> Result<ValidNewUser, DraftErrors> {
        let mut errors = DraftErrors::new();
        validate_contact(&mut errors, &self.name, &self.email, &self.phone);
        errors.require("phone", "Phone", &self.phone);
        errors.require("user_class", "Class", &self.user_class);
        if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords do not match");
        }
        if self.password.chars().count() < MIN_SIGNUP_PASSWORD_LEN {
            errors.push(
                "password",
                format!("Password must be at least {MIN_SIGNUP_PASSWORD_LEN} characters long"),
            );
        }
        let school = self.school.label();
        if school.is_none() {
            errors.push("school", "Please select a school or provide manual school details");
        }
        errors.into_result()?;

        Ok(ValidNewUser {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            phone: normalize_optional(Some(self.phone)),
            school,
            user_class: normalize_optional(Some(self.user_class)),
            password: self.password,
        })
    }
}

/// Edit form; the password is not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub school: String,
    pub user_class: String,
}

impl UserUpdate {
    /// Trims every field and blanks out empty optionals.
    ///
    /// # Errors
    ///
    /// Returns missing name or email and malformed email or phone.
    pub fn validate(self) -> Result<Self, DraftErrors> {
        let mut errors = DraftErrors::new();
        validate_contact(&mut errors, &self.name, &self.email, &self.phone);
        errors.into_result()?;

        Ok(Self {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            phone: trimmed(&self.phone),
            school: trimmed(&self.school),
            user_class: trimmed(&self.user_class),
        })
    }
}

/// Search box plus class/school dropdowns on the users table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: String,
    /// `None` means "All".
    pub user_class: Option<String>,
    pub school: Option<String>,
}

impl UserFilter {
    #[must_use]
    pub fn matches(&self, user: &UserAccount) -> bool {
        let term = self.search.trim().to_lowercase();
        let search_ok = term.is_empty()
            || [
                Some(user.name.as_str()),
                Some(user.email.as_str()),
                Some(user.user_code.as_str()),
                user.school.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term));
        let class_ok = self
            .user_class
            .as_deref()
            .is_none_or(|class| user.user_class.as_deref() == Some(class));
        let school_ok = self
            .school
            .as_deref()
            .is_none_or(|school| user.school.as_deref() == Some(school));
        search_ok && class_ok && school_ok
    }

    #[must_use]
    pub fn apply<'a>(&self, users: &'a [UserAccount]) -> Vec<&'a UserAccount> {
        users.iter().filter(|user| self.matches(user)).collect()
    }

    /// Distinct non-empty classes, sorted, for the dropdown.
    #[must_use]
    pub fn class_options(users: &[UserAccount]) -> Vec<String> {
        distinct(users.iter().map(|user| user.user_class.as_deref()))
    }

    #[must_use]
    pub fn school_options(users: &[UserAccount]) -> Vec<String> {
        distinct(users.iter().map(|user| user.school.as_deref()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationDraft {
        RegistrationDraft {
            name: "Asha Rao".into(),
            email: "asha@mail.com".into(),
            phone: "9876543210".into(),
            user_class: "8".into(),
            password: "olympiad1".into(),
            confirm_password: "olympiad1".into(),
            school: SchoolChoice::Listed {
                name: "Green Valley".into(),
                address: "Pune".into(),
            },
        }
    }

    #[test]
    fn registration_composes_school_label() {
        let valid = registration().validate().unwrap();
        assert_eq!(valid.school.as_deref(), Some("Green Valley, Pune"));

        let manual = RegistrationDraft {
            school: SchoolChoice::Other {
                name: "st. mary's".into(),
                address: "goa".into(),
            },
            ..registration()
        };
        assert_eq!(
            manual.validate().unwrap().school.as_deref(),
            Some("ST. MARY'S, GOA")
        );
    }

    #[test]
    fn registration_checks_password_and_school() {
        let errors = RegistrationDraft {
            password: "short".into(),
            confirm_password: "shorter".into(),
            school: SchoolChoice::Other {
                name: "Somewhere".into(),
                address: " ".into(),
            },
            ..registration()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.message_for("confirm_password"), Some("Passwords do not match"));
        assert_eq!(
            errors.message_for("password"),
            Some("Password must be at least 8 characters long")
        );
        assert!(errors.message_for("school").is_some());
    }

    #[test]
    fn registration_requires_phone_and_class() {
        let errors = RegistrationDraft {
            phone: String::new(),
            user_class: String::new(),
            ..registration()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.message_for("phone"), Some("Phone is required"));
        assert_eq!(errors.message_for("user_class"), Some("Class is required"));
    }

    fn user(id: u64, name: &str, class: &str, school: &str) -> UserAccount {
        UserAccount {
            id: UserId::new(id),
            user_code: format!("user{id}"),
            name: name.into(),
            email: format!("{}@mail.com", name.to_lowercase()),
            phone: None,
            school: Some(school.into()),
            user_class: Some(class.into()),
            registered_exams: Vec::new(),
        }
    }

    #[test]
    fn filter_combines_search_class_and_school() {
        let users = vec![
            user(1, "Asha", "8", "DPS"),
            user(2, "Ravi", "9", "DPS"),
            user(3, "Meera", "8", "KV"),
        ];
        let filter = UserFilter {
            search: String::new(),
            user_class: Some("8".into()),
            school: None,
        };
        assert_eq!(filter.apply(&users).len(), 2);

        let filter = UserFilter {
            search: "USER2".into(),
            ..UserFilter::default()
        };
        let hits = filter.apply(&users);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ravi");

        let filter = UserFilter {
            search: "kv".into(),
            user_class: Some("8".into()),
            school: Some("KV".into()),
        };
        assert_eq!(filter.apply(&users).len(), 1);
    }

    #[test]
    fn dropdown_options_are_distinct_and_sorted() {
        let users = vec![user(1, "A", "9", "KV"), user(2, "B", "8", "DPS"), user(3, "C", "9", "KV")];
        assert_eq!(UserFilter::class_options(&users), vec!["8", "9"]);
        assert_eq!(UserFilter::school_options(&users), vec!["DPS", "KV"]);
    }

    #[test]
    fn new_user_requires_password_and_valid_phone() {
        let errors = NewUserDraft {
            name: "Asha".into(),
            email: "asha@mail.com".into(),
            phone: "123".into(),
            ..NewUserDraft::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.message_for("password").is_some());
        assert!(errors.message_for("phone").is_some());
    }

    #[test]
    fn update_round_trips_account_fields() {
        let account = user(4, "Dev", "10", "KV");
        let update = account.to_update().validate().unwrap();
        assert_eq!(update.user_class, "10");
        assert_eq!(update.phone, "");
    }
}
