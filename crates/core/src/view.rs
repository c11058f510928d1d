//! Presentation state that does not depend on any rendering technology.

use std::{fmt, str::FromStr, time::Duration};

use tokio::time::Instant;

use crate::error::{Result, ScopeError};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);
pub const AUTH_MESSAGE_TTL: Duration = Duration::from_secs(5);
pub const TEMPORARY_MESSAGE_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation<S> {
    Changed { from: S, to: S },
    Unchanged,
}

/// Exactly one of a set of sections is active at any time.
#[derive(Debug, Clone)]
pub struct SectionController<S> {
    active: S,
}

impl<S: Copy + PartialEq> SectionController<S> {
    pub fn new(initial: S) -> Self {
        Self { active: initial }
    }

    pub fn active(&self) -> S {
        self.active
    }

    pub fn is_active(&self, section: S) -> bool {
        self.active == section
    }

    pub fn activate(&mut self, section: S) -> Activation<S> {
        if self.active == section {
            return Activation::Unchanged;
        }
        let from = std::mem::replace(&mut self.active, section);
        Activation::Changed { from, to: section }
    }
}

impl<S: Copy + PartialEq + Default> Default for SectionController<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Home,
    Portal,
    Single,
    Youtube,
    Results,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::Portal,
        Section::Single,
        Section::Youtube,
        Section::Results,
    ];

    /// Fragment name used in links, without the `#`.
    pub fn hash(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Portal => "portal",
            Section::Single => "single",
            Section::Youtube => "youtube",
            Section::Results => "results",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hash())
    }
}

impl FromStr for Section {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_start_matches('#');
        Section::ALL
            .into_iter()
            .find(|section| section.hash() == name)
            .ok_or_else(|| ScopeError::validation(format!("Unknown section: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthTab {
    #[default]
    SignIn,
    SignUp,
    ForgotPassword,
}

impl AuthTab {
    pub fn header(&self) -> &'static str {
        match self {
            AuthTab::SignIn => "Welcome Back",
            AuthTab::SignUp => "Create Account",
            AuthTab::ForgotPassword => "Reset Password",
        }
    }

    /// The tab switcher is hidden while the reset form is up.
    pub fn shows_tab_switcher(&self) -> bool {
        !matches!(self, AuthTab::ForgotPassword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordVisibility {
    #[default]
    Hidden,
    Shown,
}

impl PasswordVisibility {
    pub fn toggle(&mut self) -> Self {
        *self = match self {
            PasswordVisibility::Hidden => PasswordVisibility::Shown,
            PasswordVisibility::Shown => PasswordVisibility::Hidden,
        };
        *self
    }

    /// The `type` attribute the input field should carry.
    pub fn input_type(&self) -> &'static str {
        match self {
            PasswordVisibility::Hidden => "password",
            PasswordVisibility::Shown => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Toasts with an expiry; callers decide when to `prune`.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: u64,
    active: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> u64 {
        self.push(kind, message.into(), now + NOTIFICATION_TTL)
    }

    pub fn notify_auth(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> u64 {
        self.push(kind, message.into(), now + AUTH_MESSAGE_TTL)
    }

    /// Short-lived confirmation such as "Copied!".
    pub fn notify_temporary(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        let expires_at = now + TEMPORARY_MESSAGE_TTL;
        self.push(NotificationKind::Success, message.into(), expires_at)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Drop everything expired at `now`. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| n.expires_at > now);
        before - self.active.len()
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    fn push(&mut self, kind: NotificationKind, message: String, expires_at: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(Notification {
            id,
            kind,
            message,
            expires_at,
        });
        id
    }
}

/// Visibility of the detail panels on the analyzer page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub article: bool,
    pub listing: bool,
    pub summary_button: bool,
    pub summary: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            article: false,
            listing: true,
            summary_button: true,
            summary: false,
        }
    }
}

impl PanelState {
    pub fn show_article(&mut self) {
        self.article = true;
        self.listing = false;
        self.summary_button = false;
        self.summary = false;
    }

    /// Back to the listing. The summary panel keeps whatever state it had.
    pub fn hide_article(&mut self) {
        self.article = false;
        self.listing = true;
        self.summary_button = true;
    }

    pub fn show_summary(&mut self) {
        self.summary = true;
        self.summary_button = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activating_the_active_section_is_a_no_op() {
        let mut sections = SectionController::<Section>::default();
        assert_eq!(sections.activate(Section::Home), Activation::Unchanged);
        assert_eq!(
            sections.activate(Section::Results),
            Activation::Changed {
                from: Section::Home,
                to: Section::Results,
            }
        );
        assert_eq!(sections.activate(Section::Results), Activation::Unchanged);
        assert!(sections.is_active(Section::Results));
    }

    #[test]
    fn sections_parse_from_hash() {
        assert_eq!("#youtube".parse::<Section>().unwrap(), Section::Youtube);
        assert_eq!("portal".parse::<Section>().unwrap(), Section::Portal);
        assert!("#admin".parse::<Section>().is_err());
    }

    #[test]
    fn auth_tabs_switch_exclusively() {
        let mut tabs = SectionController::new(AuthTab::SignIn);
        tabs.activate(AuthTab::ForgotPassword);
        assert_eq!(tabs.active().header(), "Reset Password");
        assert!(!tabs.active().shows_tab_switcher());
        tabs.activate(AuthTab::SignUp);
        assert_eq!(tabs.active().header(), "Create Account");
    }

    #[test]
    fn password_toggle_flips_input_type() {
        let mut visibility = PasswordVisibility::default();
        assert_eq!(visibility.input_type(), "password");
        assert_eq!(visibility.toggle(), PasswordVisibility::Shown);
        assert_eq!(visibility.input_type(), "text");
        visibility.toggle();
        assert_eq!(visibility, PasswordVisibility::Hidden);
    }

    #[test]
    fn notifications_expire() {
        let start = Instant::now();
        let mut center = NotificationCenter::new();
        center.notify(NotificationKind::Info, "Extracting...", start);
        center.notify_auth(NotificationKind::Error, "Invalid credentials", start);

        assert_eq!(center.prune(start + Duration::from_secs(3)), 0);
        assert_eq!(center.prune(start + Duration::from_secs(4)), 1);
        assert_eq!(center.active()[0].message, "Invalid credentials");
        assert_eq!(center.prune(start + Duration::from_secs(5)), 1);
        assert!(center.active().is_empty());
    }

    #[test]
    fn temporary_messages_vanish_first_and_can_be_dismissed() {
        let start = Instant::now();
        let mut center = NotificationCenter::new();
        let copied = center.notify_temporary("Copied!", start);
        let saved = center.notify(NotificationKind::Success, "Exported", start);

        assert_eq!(center.prune(start + Duration::from_secs(2)), 1);
        assert_eq!(center.active()[0].id, saved);
        assert!(!center.dismiss(copied));
        assert!(center.dismiss(saved));
        assert!(center.active().is_empty());
    }

    #[test]
    fn article_and_summary_panels() {
        let mut panels = PanelState::default();
        panels.show_article();
        assert!(panels.article && !panels.listing && !panels.summary_button);
        panels.hide_article();
        assert_eq!(panels, PanelState::default());
        panels.show_summary();
        assert!(panels.summary && !panels.summary_button);
    }
}
