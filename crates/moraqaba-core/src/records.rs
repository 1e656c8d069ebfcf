#![forbid(unsafe_code)]

//! Attendance records, citizen feedback and administrative regions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Attendance status for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub const fn id(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Late => "LATE",
        }
    }
}

/// Check-in time of day, or the `-` sentinel when nobody checked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckInTime {
    At { hour: u8, minute: u8 },
    Missing,
}

impl CheckInTime {
    pub const fn at(hour: u8, minute: u8) -> Self {
        CheckInTime::At { hour, minute }
    }
}

impl fmt::Display for CheckInTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckInTime::At { hour, minute } => write!(f, "{hour:02}:{minute:02}"),
            CheckInTime::Missing => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub date: String,
    pub check_in: CheckInTime,
    pub status: AttendanceStatus,
    pub facility: String,
}

impl AttendanceRecord {
    /// One-line summary shown under the employee name.
    pub fn summary(&self) -> String {
        match self.status {
            AttendanceStatus::Present => format!("Arrivé à {}", self.check_in),
            AttendanceStatus::Late => format!("Retard {}", self.check_in),
            AttendanceStatus::Absent => "Absent".to_string(),
        }
    }

    /// Avatar letter: the first letter of the name after the "Dr. " prefix.
    pub fn avatar(&self) -> char {
        let name = self.user_name.strip_prefix("Dr. ").unwrap_or(&self.user_name);
        name.chars().next().unwrap_or('?')
    }
}

/// Rejected rating value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingError(pub u8);

impl fmt::Display for RatingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rating must be between 1 and 5, got {}", self.0)
    }
}

impl std::error::Error for RatingError {}

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= 1 && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingError(value))
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Five-glyph star strip, filled up to the rating.
    pub fn stars(self) -> String {
        (1..=Self::MAX)
            .map(|s| if s <= self.0 { '★' } else { '☆' })
            .collect()
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub citizen_name: String,
    pub facility: String,
    pub rating: Rating,
    pub comment: String,
    pub date: String,
}

/// Administrative region shown on the national map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub id: &'static str,
    pub name: &'static str,
}
