use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoleError {
    #[error("unknown role: {0:?}")]
    Unknown(String),
}

/// Account role returned by the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    School,
    Salesman,
    Student,
}

/// Dashboard actions a role may be offered.
///
/// These only decide what the client renders; the server is the real authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewSchools,
    ManageSchools,
    DeleteSchools,
    ViewUsers,
    AddUsers,
    EditUsers,
    DeleteUsers,
    ManageSalesTeam,
    ManageBlogs,
    ManageMockTests,
    ManageExams,
    AssignTasks,
    ViewTasks,
    ViewOwnResults,
    TakeMockTests,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::School, Role::Salesman, Role::Student];

    /// Normalizes a backend role string.
    ///
    /// The backend reports students as `"user"`; casing and padding vary.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::Unknown` for anything outside the four roles.
    pub fn parse(raw: &str) -> Result<Self, RoleError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "school" => Ok(Self::School),
            "salesman" | "sales" => Ok(Self::Salesman),
            "student" | "user" => Ok(Self::Student),
            _ => Err(RoleError::Unknown(raw.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::School => "school",
            Self::Salesman => "salesman",
            Self::Student => "student",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::School => "School",
            Self::Salesman => "Sales",
            Self::Student => "Student",
        }
    }

    #[must_use]
    pub fn allows(self, capability: Capability) -> bool {
        use Capability as C;
        match self {
            Self::Admin => matches!(
                capability,
                C::ViewSchools
                    | C::ManageSchools
                    | C::DeleteSchools
                    | C::ViewUsers
                    | C::AddUsers
                    | C::EditUsers
                    | C::DeleteUsers
                    | C::ManageSalesTeam
                    | C::ManageBlogs
                    | C::ManageMockTests
                    | C::ManageExams
                    | C::AssignTasks
                    | C::ViewTasks
            ),
            Self::School => matches!(capability, C::ViewUsers | C::EditUsers),
            Self::Salesman => matches!(capability, C::ViewSchools | C::ManageSchools | C::ViewTasks),
            Self::Student => matches!(capability, C::ViewOwnResults | C::TakeMockTests),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_backend_strings() {
        assert_eq!(Role::parse(" Admin ").unwrap(), Role::Admin);
        assert_eq!(Role::parse("user").unwrap(), Role::Student);
        assert_eq!(Role::parse("SALESMAN").unwrap(), Role::Salesman);
        assert!(matches!(Role::parse("coordinator"), Err(RoleError::Unknown(_))));
    }

    #[test]
    fn round_trips_canonical_names() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn school_management_is_admin_or_sales() {
        assert!(Role::Admin.allows(Capability::ManageSchools));
        assert!(Role::Salesman.allows(Capability::ManageSchools));
        assert!(!Role::School.allows(Capability::ManageSchools));
        assert!(!Role::Salesman.allows(Capability::DeleteSchools));
    }

    #[test]
    fn user_edits_are_admin_or_school() {
        assert!(Role::School.allows(Capability::EditUsers));
        assert!(!Role::School.allows(Capability::DeleteUsers));
        assert!(!Role::Salesman.allows(Capability::EditUsers));
    }

    #[test]
    fn sales_sees_schools_and_tasks_but_not_users() {
        assert!(Role::Salesman.allows(Capability::ViewTasks));
        assert!(!Role::Salesman.allows(Capability::AssignTasks));
        assert!(!Role::Salesman.allows(Capability::ViewUsers));
        assert!(Role::Admin.allows(Capability::AssignTasks));
    }

    #[test]
    fn content_management_is_admin_only() {
        for capability in [Capability::ManageMockTests, Capability::ManageExams] {
            for role in Role::ALL {
                assert_eq!(role.allows(capability), role == Role::Admin);
            }
        }
    }

    #[test]
    fn only_students_take_mock_tests() {
        for role in Role::ALL {
            assert_eq!(role.allows(Capability::TakeMockTests), role == Role::Student);
        }
    }
}
