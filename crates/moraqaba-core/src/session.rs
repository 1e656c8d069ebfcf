#![forbid(unsafe_code)]

//! View Router.
//!
//! The session is the only true state machine of the application:
//!
//! ```text
//!   LANDING ──Enter──▶ LOGIN ──SubmitLogin──▶ APP
//!      ▲                 │                      │
//!      └──BackToLanding──┘                      │
//!      └──────────────────Logout────────────────┘
//! ```
//!
//! All transitions go through [`Session::apply`]. An action that does not
//! belong to the current view is rejected and leaves the session untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::nav::{self, Tab};
use crate::role::Role;
use crate::user::{LoginError, LoginForm, User};

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Landing,
    Login,
    App,
}

/// Entry chosen on the landing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Professional,
    Citizen,
}

impl EntryKind {
    /// Role pre-filled in the login form for this entry.
    pub const fn default_role(self) -> Role {
        match self {
            EntryKind::Professional => Role::Doctor,
            EntryKind::Citizen => Role::Citizen,
        }
    }
}

/// Input to the View Router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Enter(EntryKind),
    SelectLoginRole(Role),
    BackToLanding,
    SubmitLogin(LoginForm),
    SelectTab(Tab),
    Logout,
}

impl SessionAction {
    pub const fn name(&self) -> &'static str {
        match self {
            SessionAction::Enter(_) => "enter",
            SessionAction::SelectLoginRole(_) => "select_login_role",
            SessionAction::BackToLanding => "back_to_landing",
            SessionAction::SubmitLogin(_) => "submit_login",
            SessionAction::SelectTab(_) => "select_tab",
            SessionAction::Logout => "logout",
        }
    }
}

/// Observable effect of an accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The visible screen changed.
    ViewChanged { from: View, to: View },
    /// The active tab changed within the main screen.
    TabChanged { from: Tab, to: Tab },
    /// Login form state changed; the screen did not.
    FormUpdated,
    /// Accepted, but nothing changed (e.g. re-selecting the active tab).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The action is not valid in the current view.
    InvalidTransition { view: View, action: &'static str },
    /// Login form failed its required-field check.
    Login(LoginError),
    /// Citizens have no role selector; staff roles cannot be picked from it.
    RoleNotSelectable(Role),
    /// Tab is not in the current role's table.
    TabNotPermitted { role: Role, tab: Tab },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidTransition { view, action } => {
                write!(f, "action {action} is not valid in view {view:?}")
            }
            SessionError::Login(e) => write!(f, "login rejected: {e}"),
            SessionError::RoleNotSelectable(role) => {
                write!(f, "role {role} cannot be selected for this entry")
            }
            SessionError::TabNotPermitted { role, tab } => {
                write!(f, "tab {} is not available to role {role}", tab.id())
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Login(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LoginError> for SessionError {
    fn from(e: LoginError) -> Self {
        SessionError::Login(e)
    }
}

/// Serializable session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    view: View,
    entry: EntryKind,
    login_role: Role,
    current_user: Option<User>,
    active_tab: Tab,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub const fn new() -> Self {
        Self {
            view: View::Landing,
            entry: EntryKind::Citizen,
            login_role: Role::Citizen,
            current_user: None,
            active_tab: Tab::Dashboard,
        }
    }

    #[inline]
    pub const fn view(&self) -> View {
        self.view
    }

    #[inline]
    pub const fn entry(&self) -> EntryKind {
        self.entry
    }

    /// Role currently selected in the login form.
    #[inline]
    pub const fn login_role(&self) -> Role {
        self.login_role
    }

    #[inline]
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    #[inline]
    pub const fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Whether the login form shows the role selector.
    #[inline]
    pub const fn role_selector_visible(&self) -> bool {
        matches!(self.view, View::Login) && matches!(self.entry, EntryKind::Professional)
    }

    /// Sidebar tabs for the signed-in user (empty when signed out).
    pub fn visible_tabs(&self) -> &'static [Tab] {
        match &self.current_user {
            Some(user) if self.view == View::App => nav::tabs_for(user.role),
            _ => &[],
        }
    }

    /// Apply `action`, returning what changed.
    ///
    /// On error the session is left exactly as it was.
    pub fn apply(&mut self, action: SessionAction) -> Result<Transition, SessionError> {
        let action_name = action.name();
        let result = match (self.view, action) {
            (View::Landing, SessionAction::Enter(entry)) => {
                self.entry = entry;
                self.login_role = entry.default_role();
                Ok(self.go(View::Login))
            }
            (View::Login, SessionAction::SelectLoginRole(role)) => {
                if self.entry != EntryKind::Professional || role.is_citizen() {
                    Err(SessionError::RoleNotSelectable(role))
                } else if role == self.login_role {
                    Ok(Transition::Unchanged)
                } else {
                    self.login_role = role;
                    Ok(Transition::FormUpdated)
                }
            }
            (View::Login, SessionAction::BackToLanding) => Ok(self.go(View::Landing)),
            (View::Login, SessionAction::SubmitLogin(form)) => {
                form.validate()?;
                let national_id = Some(form.national_id);
                let user = User::fabricate(self.login_role, national_id);
                info!(role = %user.role, "login accepted");
                self.current_user = Some(user);
                self.active_tab = Tab::Dashboard;
                Ok(self.go(View::App))
            }
            (View::App, SessionAction::SelectTab(tab)) => self.select_tab(tab),
            (View::App, SessionAction::Logout) => {
                info!("logout");
                self.current_user = None;
                self.active_tab = Tab::Dashboard;
                Ok(self.go(View::Landing))
            }
            (view, _) => Err(SessionError::InvalidTransition {
                view,
                action: action_name,
            }),
        };
        debug!(action = action_name, ?result, "session action");
        result
    }

    fn go(&mut self, to: View) -> Transition {
        let from = self.view;
        self.view = to;
        Transition::ViewChanged { from, to }
    }

    fn select_tab(&mut self, tab: Tab) -> Result<Transition, SessionError> {
        let role = match &self.current_user {
            Some(user) => user.role,
            None => {
                return Err(SessionError::InvalidTransition {
                    view: self.view,
                    action: "select_tab",
                });
            }
        };
        if !nav::is_permitted(role, tab) {
            return Err(SessionError::TabNotPermitted { role, tab });
        }
        let from = self.active_tab;
        if from == tab {
            return Ok(Transition::Unchanged);
        }
        self.active_tab = tab;
        Ok(Transition::TabChanged { from, to: tab })
    }
}
