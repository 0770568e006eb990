use std::fmt;

/// Active/inactive flag shared by schools and sales staff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActiveStatus {
    Active,
    #[default]
    Inactive,
}

impl ActiveStatus {
    /// Anything other than a case-insensitive `"active"` (including a missing
    /// value) is treated as inactive.
    #[must_use]
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("active") => Self::Active,
            _ => Self::Inactive,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for ActiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_status_is_inactive() {
        assert_eq!(ActiveStatus::from_wire(None), ActiveStatus::Inactive);
        assert_eq!(ActiveStatus::from_wire(Some("ACTIVE")), ActiveStatus::Active);
        assert_eq!(ActiveStatus::from_wire(Some("pending")), ActiveStatus::Inactive);
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(ActiveStatus::Active.toggled(), ActiveStatus::Inactive);
        assert_eq!(ActiveStatus::Inactive.toggled(), ActiveStatus::Active);
    }
}
