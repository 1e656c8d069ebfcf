#![forbid(unsafe_code)]

//! Authenticated user and the login form it is fabricated from.
//!
//! Login is not authentication: the form's only gate is that both fields are
//! filled in. The resulting [`User`] lives in transient session state and is
//! discarded on logout.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Identifier assigned to every fabricated user.
pub const FABRICATED_USER_ID: &str = "u1";
/// Display name for citizens.
pub const CITIZEN_NAME: &str = "Citoyen Anonyme";
/// Display name for every professional role.
pub const PROFESSIONAL_NAME: &str = "Utilisateur Santé";
/// Facility attached to directors.
pub const DIRECTOR_FACILITY: &str = "CHU Ibn Sina";
/// Region attached to ministry supervisors.
pub const MINISTRY_REGION: &str = "Rabat-Salé-Kénitra";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub facility: Option<String>,
    pub region: Option<String>,
    /// National identity card number ("CIN") typed at login.
    pub national_id: Option<String>,
}

impl User {
    /// Fabricate the session user for `role`.
    ///
    /// Facility is set only for directors and region only for ministry
    /// supervisors.
    pub fn fabricate(role: Role, national_id: Option<String>) -> Self {
        let name = if role.is_citizen() {
            CITIZEN_NAME
        } else {
            PROFESSIONAL_NAME
        };
        Self {
            id: FABRICATED_USER_ID.to_string(),
            name: name.to_string(),
            role,
            facility: (role == Role::Director).then(|| DIRECTOR_FACILITY.to_string()),
            region: (role == Role::Ministry).then(|| MINISTRY_REGION.to_string()),
            national_id,
        }
    }

    /// First character of the display name, used for the header avatar.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

/// Which login field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginError {
    MissingNationalId,
    MissingPassword,
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginError::MissingNationalId => write!(f, "national identifier is required"),
            LoginError::MissingPassword => write!(f, "password is required"),
        }
    }
}

impl std::error::Error for LoginError {}

/// Contents of the login form at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub national_id: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(national_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            national_id: national_id.into(),
            password: password.into(),
        }
    }

    /// Required-field check: both fields must be non-empty, nothing more.
    pub fn validate(&self) -> Result<(), LoginError> {
        if self.national_id.is_empty() {
            return Err(LoginError::MissingNationalId);
        }
        if self.password.is_empty() {
            return Err(LoginError::MissingPassword);
        }
        Ok(())
    }
}

// The password never leaves the form; keep it out of debug logs too.
impl fmt::Display for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoginForm {{ national_id: {:?}, password: *** }}", self.national_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citizen_has_no_facility_or_region() {
        let user = User::fabricate(Role::Citizen, None);
        assert_eq!(user.name, CITIZEN_NAME);
        assert_eq!(user.facility, None);
        assert_eq!(user.region, None);
    }

    #[test]
    fn director_gets_facility_only() {
        let user = User::fabricate(Role::Director, Some("AB123456".into()));
        assert_eq!(user.facility.as_deref(), Some("CHU Ibn Sina"));
        assert_eq!(user.region, None);
        assert_eq!(user.national_id.as_deref(), Some("AB123456"));
    }

    #[test]
    fn ministry_gets_region_only() {
        let user = User::fabricate(Role::Ministry, None);
        assert_eq!(user.facility, None);
        assert_eq!(user.region.as_deref(), Some("Rabat-Salé-Kénitra"));
    }

    #[test]
    fn professionals_share_a_name() {
        for role in Role::PROFESSIONAL {
            let user = User::fabricate(*role, None);
            assert_eq!(user.name, PROFESSIONAL_NAME);
            assert_eq!(user.id, "u1");
        }
    }

    #[test]
    fn initial_is_first_char() {
        assert_eq!(User::fabricate(Role::Doctor, None).initial(), 'U');
        assert_eq!(User::fabricate(Role::Citizen, None).initial(), 'C');
    }

    #[test]
    fn form_requires_both_fields() {
        assert_eq!(
            LoginForm::new("", "pw").validate(),
            Err(LoginError::MissingNationalId)
        );
        assert_eq!(LoginForm::new("  ", "pw").validate(), Ok(()));
        assert_eq!(
            LoginForm::new("AB1", "").validate(),
            Err(LoginError::MissingPassword)
        );
        assert_eq!(LoginForm::new("AB1", "x").validate(), Ok(()));
    }

    #[test]
    fn form_display_masks_password() {
        let shown = LoginForm::new("AB1", "secret").to_string();
        assert!(shown.contains("AB1"));
        assert!(!shown.contains("secret"));
    }
}
