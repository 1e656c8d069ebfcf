#![forbid(unsafe_code)]

//! Login form.
//!
//! The form never checks credentials. Submission only requires both fields to
//! be filled; the session fabricates the user from the selected role.

use moraqaba_core::{EntryKind, LoginError, LoginForm, Role, Session, SessionAction};
use moraqaba_runtime::{Cmd, Frame, KeyCode, KeyEvent, Rect};

use super::{HelpEntry, Screen, print_centered, text_width};
use crate::app::AppMsg;
use crate::theme;

pub const ID_PLACEHOLDER: &str = "Ex: AB123456";
const PASSWORD_PLACEHOLDER: &str = "••••••••";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    NationalId,
    Password,
    Role,
    Submit,
    Back,
}

/// French message for a rejected submission.
pub const fn error_text(error: LoginError) -> &'static str {
    match error {
        LoginError::MissingNationalId => "Veuillez saisir votre CIN / Identifiant.",
        LoginError::MissingPassword => "Veuillez saisir votre mot de passe.",
    }
}

#[derive(Debug, Clone)]
pub struct LoginScreen {
    national_id: String,
    password: String,
    focus: LoginField,
    entry: EntryKind,
    role: Role,
    selector_visible: bool,
    error: Option<LoginError>,
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            national_id: String::new(),
            password: String::new(),
            focus: LoginField::NationalId,
            entry: EntryKind::Citizen,
            role: Role::Citizen,
            selector_visible: false,
            error: None,
        }
    }

    /// Clear the form for a fresh visit to the login view.
    pub fn reset(&mut self, session: &Session) {
        *self = Self::new();
        self.sync(session);
    }

    /// Mirror the role fields of `session`.
    pub fn sync(&mut self, session: &Session) {
        self.entry = session.entry();
        self.role = session.login_role();
        self.selector_visible = session.role_selector_visible();
    }

    pub fn set_error(&mut self, error: LoginError) {
        self.focus = match error {
            LoginError::MissingNationalId => LoginField::NationalId,
            LoginError::MissingPassword => LoginField::Password,
        };
        self.error = Some(error);
    }

    pub fn error(&self) -> Option<LoginError> {
        self.error
    }

    pub fn focus(&self) -> LoginField {
        self.focus
    }

    pub fn national_id(&self) -> &str {
        &self.national_id
    }

    pub fn paste(&mut self, text: &str) {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if let Some(field) = self.focused_text_mut() {
            field.push_str(&text);
            self.error = None;
        }
    }

    fn fields(&self) -> &'static [LoginField] {
        if self.selector_visible {
            &[
                LoginField::NationalId,
                LoginField::Password,
                LoginField::Role,
                LoginField::Submit,
                LoginField::Back,
            ]
        } else {
            &[
                LoginField::NationalId,
                LoginField::Password,
                LoginField::Submit,
                LoginField::Back,
            ]
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % fields.len()
        } else {
            (idx + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            LoginField::NationalId => Some(&mut self.national_id),
            LoginField::Password => Some(&mut self.password),
            _ => None,
        }
    }

    fn form(&self) -> LoginForm {
        LoginForm::new(self.national_id.clone(), self.password.clone())
    }

    fn field_row(&self, frame: &mut Frame, area: Rect, field: LoginField, label: &str) {
        frame.print(area, label, theme::heading());
        let focused = self.focus == field;
        let value = match field {
            LoginField::NationalId => self.national_id.clone(),
            _ => "•".repeat(self.password.chars().count()),
        };
        let input = Rect::new(area.x, area.y + 1, area.width, 3);
        let border = if focused { theme::accent() } else { theme::border() };
        frame.draw_box(input, border);
        let text_area = Rect::new(input.x + 2, input.y + 1, input.width.saturating_sub(4), 1);
        if value.is_empty() {
            let placeholder = match field {
                LoginField::NationalId => ID_PLACEHOLDER,
                _ => PASSWORD_PLACEHOLDER,
            };
            frame.print(text_area, placeholder, theme::faint());
        } else {
            frame.print(text_area, &value, theme::base());
        }
        if focused {
            let x = (text_area.x + text_width(&value)).min(text_area.right().saturating_sub(1));
            frame.set_cursor(Some((x, text_area.y)));
        }
    }
}

fn session(action: SessionAction) -> Cmd<AppMsg> {
    Cmd::msg(AppMsg::Session(action))
}

impl Screen for LoginScreen {
    fn update(&mut self, key: &KeyEvent) -> Cmd<AppMsg> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                Cmd::none()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                Cmd::none()
            }
            KeyCode::Escape => session(SessionAction::BackToLanding),
            KeyCode::Enter => match self.focus {
                LoginField::Back => session(SessionAction::BackToLanding),
                _ => session(SessionAction::SubmitLogin(self.form())),
            },
            KeyCode::Left if self.focus == LoginField::Role => {
                session(SessionAction::SelectLoginRole(self.role.prev_professional()))
            }
            KeyCode::Right if self.focus == LoginField::Role => {
                session(SessionAction::SelectLoginRole(self.role.next_professional()))
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_text_mut() {
                    field.pop();
                }
                Cmd::none()
            }
            KeyCode::Char(c) if !key.ctrl() && !key.alt() => {
                if let Some(field) = self.focused_text_mut() {
                    field.push(c);
                    self.error = None;
                }
                Cmd::none()
            }
            _ => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(56);
        let col = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);
        let mut y = area.height.saturating_sub(24) / 2;

        let welcome = match self.entry {
            EntryKind::Citizen => "Bienvenue Citoyen",
            EntryKind::Professional => "Espace Professionnel",
        };
        print_centered(frame, col.row(y), super::landing::LOGO, theme::accent());
        y += 2;
        print_centered(frame, col.row(y), welcome, theme::title());
        y += 1;
        let blurb = Rect::new(col.x, col.y + y, col.width, 2);
        y += super::print_wrapped_centered(
            frame,
            blurb,
            "Connectez-vous pour accéder à votre tableau de bord personnalisé Moraqaba AI.",
            theme::muted(),
        ) + 1;

        frame.print(col.row(y), "Identification", theme::heading());
        y += 2;
        self.field_row(
            frame,
            Rect::new(col.x, col.y + y, col.width, 4),
            LoginField::NationalId,
            "CIN / Identifiant",
        );
        y += 4;
        self.field_row(
            frame,
            Rect::new(col.x, col.y + y, col.width, 4),
            LoginField::Password,
            "Mot de passe",
        );
        y += 5;

        if self.selector_visible {
            let focused = self.focus == LoginField::Role;
            let style = if focused { theme::selected() } else { theme::accent() };
            frame.print(
                col.row(y),
                &format!("◀ Rôle: {} ▶", self.role.label()),
                style,
            );
            y += 2;
        }

        let submit_style = if self.focus == LoginField::Submit {
            theme::selected()
        } else {
            theme::button()
        };
        let submit = Rect::new(col.x, col.y + y, col.width, 1);
        frame.buffer.fill(submit, submit_style);
        print_centered(frame, submit, "Se connecter", submit_style);
        y += 2;
        let back_style = if self.focus == LoginField::Back {
            theme::accent()
        } else {
            theme::muted()
        };
        print_centered(frame, col.row(y), "Retour à l'accueil", back_style);
        y += 2;

        if let Some(error) = self.error {
            print_centered(frame, col.row(y), error_text(error), theme::danger());
        }
    }

    fn keybindings(&self) -> Vec<HelpEntry> {
        let mut keys = vec![
            HelpEntry::new("Tab", "Champ suivant"),
            HelpEntry::new("Entrée", "Se connecter"),
            HelpEntry::new("Échap", "Retour"),
        ];
        if self.selector_visible {
            keys.push(HelpEntry::new("←/→", "Rôle"));
        }
        keys
    }

    fn title(&self) -> &'static str {
        "login"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    fn typed(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.update(&key(KeyCode::Char(c)));
        }
    }

    fn professional() -> LoginScreen {
        let mut session = Session::new();
        session
            .apply(SessionAction::Enter(EntryKind::Professional))
            .unwrap();
        let mut screen = LoginScreen::new();
        screen.reset(&session);
        screen
    }

    #[test]
    fn enter_submits_typed_form() {
        let mut screen = professional();
        typed(&mut screen, "AB123456");
        screen.update(&key(KeyCode::Tab));
        typed(&mut screen, "pw");
        match screen.update(&key(KeyCode::Enter)) {
            Cmd::Msg(AppMsg::Session(SessionAction::SubmitLogin(form))) => {
                assert_eq!(form, LoginForm::new("AB123456", "pw"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn role_field_only_for_professionals() {
        let mut screen = professional();
        for _ in 0..2 {
            screen.update(&key(KeyCode::Tab));
        }
        assert_eq!(screen.focus(), LoginField::Role);
        match screen.update(&key(KeyCode::Right)) {
            Cmd::Msg(AppMsg::Session(SessionAction::SelectLoginRole(role))) => {
                assert_eq!(role, Role::Director);
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut session = Session::new();
        session.apply(SessionAction::Enter(EntryKind::Citizen)).unwrap();
        let mut citizen = LoginScreen::new();
        citizen.reset(&session);
        for _ in 0..2 {
            citizen.update(&key(KeyCode::Tab));
        }
        assert_eq!(citizen.focus(), LoginField::Submit);
    }

    #[test]
    fn back_and_escape_return_to_landing() {
        let mut screen = professional();
        assert!(matches!(
            screen.update(&key(KeyCode::Escape)),
            Cmd::Msg(AppMsg::Session(SessionAction::BackToLanding))
        ));
        screen.update(&key(KeyCode::BackTab));
        assert_eq!(screen.focus(), LoginField::Back);
        assert!(matches!(
            screen.update(&key(KeyCode::Enter)),
            Cmd::Msg(AppMsg::Session(SessionAction::BackToLanding))
        ));
    }

    #[test]
    fn error_moves_focus_and_typing_clears_it() {
        let mut screen = professional();
        screen.update(&key(KeyCode::Tab));
        screen.set_error(LoginError::MissingNationalId);
        assert_eq!(screen.focus(), LoginField::NationalId);
        assert_eq!(screen.error(), Some(LoginError::MissingNationalId));
        typed(&mut screen, "X");
        assert_eq!(screen.error(), None);
        screen.update(&key(KeyCode::Backspace));
        assert_eq!(screen.national_id(), "");
    }

    #[test]
    fn password_is_masked() {
        let mut screen = professional();
        screen.update(&key(KeyCode::Tab));
        typed(&mut screen, "hunter2");
        let mut frame = Frame::new(80, 40);
        let area = frame.area();
        screen.view(&mut frame, area);
        let text = frame.buffer.to_text();
        assert!(!text.contains("hunter2"));
        assert!(text.contains("•••••••"));
        assert!(text.contains("Espace Professionnel"));
        assert!(text.contains("Rôle: Médecin"));
        assert!(frame.cursor().is_some());
    }

    #[test]
    fn paste_strips_control_characters() {
        let mut screen = professional();
        screen.paste("AB\n12");
        assert_eq!(screen.national_id(), "AB12");
    }
}
