#![forbid(unsafe_code)]

//! Role-gated navigation.
//!
//! [`tabs_for`] is the whole table. Adding a [`Role`] variant without a row
//! here is a compile error.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A content pane of the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    Dashboard,
    #[serde(rename = "checkin")]
    CheckIn,
    History,
    Employees,
    FacilityStats,
    Map,
    Predictions,
    CitizenReviews,
    UserMgt,
    FacilityMgt,
    Settings,
    Facilities,
    MyReviews,
}

impl Tab {
    pub const ALL: &'static [Tab] = &[
        Tab::Dashboard,
        Tab::CheckIn,
        Tab::History,
        Tab::Employees,
        Tab::FacilityStats,
        Tab::Map,
        Tab::Predictions,
        Tab::CitizenReviews,
        Tab::UserMgt,
        Tab::FacilityMgt,
        Tab::Settings,
        Tab::Facilities,
        Tab::MyReviews,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::CheckIn => "checkin",
            Tab::History => "history",
            Tab::Employees => "employees",
            Tab::FacilityStats => "facility-stats",
            Tab::Map => "map",
            Tab::Predictions => "predictions",
            Tab::CitizenReviews => "citizen-reviews",
            Tab::UserMgt => "user-mgt",
            Tab::FacilityMgt => "facility-mgt",
            Tab::Settings => "settings",
            Tab::Facilities => "facilities",
            Tab::MyReviews => "my-reviews",
        }
    }

    /// Sidebar label.
    pub const fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Tableau de bord",
            Tab::CheckIn => "Check-in Face ID",
            Tab::History => "Mon historique",
            Tab::Employees => "Gestion Personnel",
            Tab::FacilityStats => "Stats Établissement",
            Tab::Map => "Carte Nationale",
            Tab::Predictions => "Prédictions IA",
            Tab::CitizenReviews => "Avis Citoyens",
            Tab::UserMgt => "Utilisateurs",
            Tab::FacilityMgt => "Établissements",
            Tab::Settings => "Paramètres",
            Tab::Facilities => "Établissements",
            Tab::MyReviews => "Mes avis",
        }
    }

    pub fn from_id(id: &str) -> Option<Tab> {
        Tab::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Title shown in the main header for this tab when not on the dashboard:
    /// the id with its first character upper-cased.
    pub fn heading(self) -> String {
        let id = self.id();
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Ordered sidebar tabs for `role`.
///
/// Every role except citizens starts with the dashboard. Citizens still land
/// on [`Tab::Dashboard`], which renders the facility-rating view for them, but
/// it is not listed in their sidebar.
pub const fn tabs_for(role: Role) -> &'static [Tab] {
    match role {
        Role::Doctor => &[Tab::Dashboard, Tab::CheckIn, Tab::History],
        Role::Director => &[Tab::Dashboard, Tab::Employees, Tab::FacilityStats],
        Role::Ministry => &[
            Tab::Dashboard,
            Tab::Map,
            Tab::Predictions,
            Tab::CitizenReviews,
        ],
        Role::Admin => &[
            Tab::Dashboard,
            Tab::UserMgt,
            Tab::FacilityMgt,
            Tab::Settings,
        ],
        Role::Citizen => &[Tab::Facilities, Tab::MyReviews],
    }
}

/// Whether `role` may select `tab`.
///
/// The dashboard is always reachable because it is the landing pane after
/// login for every role.
pub fn is_permitted(role: Role, tab: Tab) -> bool {
    tab == Tab::Dashboard || tabs_for(role).contains(&tab)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(role: Role) -> Vec<&'static str> {
        tabs_for(role).iter().map(|t| t.id()).collect()
    }

    #[test]
    fn table_matches_roles() {
        assert_eq!(ids(Role::Doctor), ["dashboard", "checkin", "history"]);
        assert_eq!(
            ids(Role::Director),
            ["dashboard", "employees", "facility-stats"]
        );
        assert_eq!(
            ids(Role::Ministry),
            ["dashboard", "map", "predictions", "citizen-reviews"]
        );
        assert_eq!(
            ids(Role::Admin),
            ["dashboard", "user-mgt", "facility-mgt", "settings"]
        );
        assert_eq!(ids(Role::Citizen), ["facilities", "my-reviews"]);
    }

    #[test]
    fn from_id_round_trips() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_id(tab.id()), Some(*tab));
        }
        assert_eq!(Tab::from_id("nope"), None);
    }

    #[test]
    fn serde_ids_match_tab_ids() {
        for tab in Tab::ALL {
            let json = serde_json::to_string(tab).unwrap();
            assert_eq!(json, format!("\"{}\"", tab.id()));
        }
    }

    #[test]
    fn heading_capitalizes_id() {
        assert_eq!(Tab::FacilityStats.heading(), "Facility-stats");
        assert_eq!(Tab::Map.heading(), "Map");
    }

    #[test]
    fn citizens_reach_dashboard_but_not_staff_tabs() {
        assert!(is_permitted(Role::Citizen, Tab::Dashboard));
        assert!(is_permitted(Role::Citizen, Tab::MyReviews));
        assert!(!is_permitted(Role::Citizen, Tab::Predictions));
        assert!(!is_permitted(Role::Doctor, Tab::Map));
    }
}
