#![forbid(unsafe_code)]

//! User roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of an authenticated user. Gates visible tabs and dashboard content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Doctor,
    Director,
    Ministry,
    Admin,
    Citizen,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Doctor,
        Role::Director,
        Role::Ministry,
        Role::Admin,
        Role::Citizen,
    ];

    /// Roles offered by the professional login selector, in display order.
    pub const PROFESSIONAL: &'static [Role] =
        &[Role::Doctor, Role::Director, Role::Ministry, Role::Admin];

    /// Stable identifier used on the wire and in logs.
    pub const fn id(self) -> &'static str {
        match self {
            Role::Doctor => "DOCTOR",
            Role::Director => "DIRECTOR",
            Role::Ministry => "MINISTRY",
            Role::Admin => "ADMIN",
            Role::Citizen => "CITIZEN",
        }
    }

    /// Label shown in the login role selector.
    pub const fn label(self) -> &'static str {
        match self {
            Role::Doctor => "Médecin",
            Role::Director => "Directeur",
            Role::Ministry => "Superviseur / Ministère",
            Role::Admin => "Administrateur",
            Role::Citizen => "Citoyen",
        }
    }

    #[inline]
    pub const fn is_citizen(self) -> bool {
        matches!(self, Role::Citizen)
    }

    /// Next professional role in selector order, wrapping around.
    ///
    /// Citizens have no selector; the role is returned unchanged.
    pub fn next_professional(self) -> Role {
        cycle(self, 1)
    }

    /// Previous professional role in selector order, wrapping around.
    pub fn prev_professional(self) -> Role {
        cycle(self, Role::PROFESSIONAL.len() - 1)
    }
}

fn cycle(role: Role, step: usize) -> Role {
    match Role::PROFESSIONAL.iter().position(|r| *r == role) {
        Some(idx) => Role::PROFESSIONAL[(idx + step) % Role::PROFESSIONAL.len()],
        None => role,
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when parsing an unknown role identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.id().parse::<Role>(), Ok(*role));
        }
        assert_eq!("ministry".parse::<Role>(), Ok(Role::Ministry));
        assert!("NURSE".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_screaming_ids() {
        let json = serde_json::to_string(&Role::Ministry).unwrap();
        assert_eq!(json, "\"MINISTRY\"");
    }

    #[test]
    fn professional_cycle_wraps() {
        assert_eq!(Role::Admin.next_professional(), Role::Doctor);
        assert_eq!(Role::Doctor.prev_professional(), Role::Admin);
        assert_eq!(Role::Director.next_professional(), Role::Ministry);
    }

    #[test]
    fn citizen_does_not_cycle() {
        assert_eq!(Role::Citizen.next_professional(), Role::Citizen);
        assert_eq!(Role::Citizen.prev_professional(), Role::Citizen);
    }
}
