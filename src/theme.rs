use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

/// Mode used when the host cannot report a color-scheme preference.
pub const DEFAULT_MODE: ThemeMode = ThemeMode::Dark;

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// `None` means the host has no `prefers-color-scheme` support.
    pub fn from_prefers_dark(prefers_dark: Option<bool>) -> Self {
        match prefers_dark {
            Some(true) => Self::Dark,
            Some(false) => Self::Light,
            None => DEFAULT_MODE,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &DARK_PALETTE,
            Self::Light => &LIGHT_PALETTE,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Dark => "☀️",
            Self::Light => "🌙",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Primary,
    Background,
    BackgroundSecondary,
    Text,
    TextHighlight,
    CardBackground,
    CardBorder,
    NavBackground,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Primary,
        Role::Background,
        Role::BackgroundSecondary,
        Role::Text,
        Role::TextHighlight,
        Role::CardBackground,
        Role::CardBorder,
        Role::NavBackground,
    ];

    pub fn css_name(self) -> &'static str {
        match self {
            Self::Primary => "--color-primary",
            Self::Background => "--color-background",
            Self::BackgroundSecondary => "--color-background-secondary",
            Self::Text => "--color-text",
            Self::TextHighlight => "--color-text-highlight",
            Self::CardBackground => "--color-card-background",
            Self::CardBorder => "--color-card-border",
            Self::NavBackground => "--color-nav-background",
        }
    }
}

/// Named colors for one [`ThemeMode`]. Values are CSS color strings.
#[derive(Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub background: &'static str,
    pub background_secondary: &'static str,
    pub text: &'static str,
    pub text_highlight: &'static str,
    pub card_background: &'static str,
    pub card_border: &'static str,
    pub nav_background: &'static str,
}

pub static DARK_PALETTE: Palette = Palette {
    primary: "#64ffda",
    background: "#0a192f",
    background_secondary: "#112240",
    text: "#8892b0",
    text_highlight: "#ccd6f6",
    card_background: "rgba(255, 255, 255, 0.03)",
    card_border: "rgba(255, 255, 255, 0.1)",
    nav_background: "rgba(10, 25, 47, 0.95)",
};

pub static LIGHT_PALETTE: Palette = Palette {
    primary: "#006C51",
    background: "#FFFBFF",
    background_secondary: "#F4F0F4",
    text: "#1A1C1E",
    text_highlight: "#006C51",
    card_background: "rgba(255, 251, 255, 0.95)",
    card_border: "rgba(0, 108, 81, 0.12)",
    nav_background: "rgba(255, 251, 255, 0.98)",
};

impl Palette {
    pub fn role(&self, role: Role) -> &'static str {
        match role {
            Role::Primary => self.primary,
            Role::Background => self.background,
            Role::BackgroundSecondary => self.background_secondary,
            Role::Text => self.text,
            Role::TextHighlight => self.text_highlight,
            Role::CardBackground => self.card_background,
            Role::CardBorder => self.card_border,
            Role::NavBackground => self.nav_background,
        }
    }

    /// Inline style declaring every role as a CSS custom property.
    pub fn css_variables(&self) -> String {
        Role::ALL
            .iter()
            .map(|role| format!("{}: {};", role.css_name(), self.role(*role)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whether OS preference changes keep applying after a manual toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemSyncPolicy {
    #[default]
    UntilToggled,
    Always,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeAction {
    Toggle,
    SystemChanged(ThemeMode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeStore {
    mode: ThemeMode,
    policy: SystemSyncPolicy,
    manually_toggled: bool,
}

impl ThemeStore {
    pub fn new(initial: ThemeMode, policy: SystemSyncPolicy) -> Self {
        Self {
            mode: initial,
            policy,
            manually_toggled: false,
        }
    }

    pub fn current_mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn palette(&self) -> &'static Palette {
        self.mode.palette()
    }

    pub fn manually_toggled(&self) -> bool {
        self.manually_toggled
    }

    pub fn toggle(&mut self) {
        self.mode = self.mode.toggled();
        self.manually_toggled = true;
    }

    pub fn toggled(&self) -> Self {
        let mut next = self.clone();
        next.toggle();
        next
    }

    /// Returns whether the mode changed.
    pub fn system_changed(&mut self, mode: ThemeMode) -> bool {
        if self.manually_toggled && self.policy == SystemSyncPolicy::UntilToggled {
            return false;
        }

        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    pub fn apply(&self, action: ThemeAction) -> Self {
        let mut next = self.clone();
        match action {
            ThemeAction::Toggle => next.toggle(),
            ThemeAction::SystemChanged(mode) => {
                next.system_changed(mode);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_role_is_populated_in_both_palettes() {
        for mode in [ThemeMode::Dark, ThemeMode::Light] {
            for role in Role::ALL {
                assert!(!mode.palette().role(role).is_empty(), "{mode:?} {role:?}");
            }
        }
    }

    #[test]
    fn palette_lookup_is_deterministic() {
        assert!(std::ptr::eq(ThemeMode::Dark.palette(), ThemeMode::Dark.palette()));
        assert_eq!(ThemeMode::Dark.palette().primary, "#64ffda");
        assert_eq!(ThemeMode::Light.palette().primary, "#006C51");
        assert_ne!(ThemeMode::Dark.palette(), ThemeMode::Light.palette());
    }

    #[test]
    fn css_variables_cover_every_role() {
        let css = DARK_PALETTE.css_variables();

        for role in Role::ALL {
            assert!(css.contains(role.css_name()), "missing {}", role.css_name());
        }
        assert!(css.starts_with("--color-primary: #64ffda;"));
    }

    #[test]
    fn toggle_twice_restores_mode() {
        for initial in [ThemeMode::Dark, ThemeMode::Light] {
            let mut store = ThemeStore::new(initial, SystemSyncPolicy::default());
            store.toggle();
            assert_eq!(store.current_mode(), initial.toggled());
            store.toggle();
            assert_eq!(store.current_mode(), initial);
        }
    }

    #[test]
    fn missing_preference_falls_back_to_default() {
        assert_eq!(ThemeMode::from_prefers_dark(None), DEFAULT_MODE);
        assert_eq!(ThemeMode::from_prefers_dark(Some(false)), ThemeMode::Light);
    }

    #[test]
    fn system_change_applies_before_manual_toggle() {
        let mut store = ThemeStore::new(ThemeMode::Dark, SystemSyncPolicy::UntilToggled);

        assert!(store.system_changed(ThemeMode::Light));
        assert_eq!(store.current_mode(), ThemeMode::Light);
        assert!(!store.system_changed(ThemeMode::Light));
    }

    #[test]
    fn manual_toggle_pins_mode_for_the_session() {
        let store = ThemeStore::new(ThemeMode::Dark, SystemSyncPolicy::UntilToggled)
            .apply(ThemeAction::Toggle)
            .apply(ThemeAction::SystemChanged(ThemeMode::Dark));

        assert_eq!(store.current_mode(), ThemeMode::Light);
        assert!(store.manually_toggled());
    }

    #[test]
    fn always_policy_lets_system_win_after_toggle() {
        let store = ThemeStore::new(ThemeMode::Dark, SystemSyncPolicy::Always)
            .apply(ThemeAction::Toggle)
            .apply(ThemeAction::SystemChanged(ThemeMode::Dark));

        assert_eq!(store.current_mode(), ThemeMode::Dark);
    }

    #[test]
    fn toggled_leaves_original_untouched() {
        let store = ThemeStore::new(ThemeMode::Light, SystemSyncPolicy::default());
        let next = store.toggled();

        assert_eq!(store.current_mode(), ThemeMode::Light);
        assert_eq!(next.current_mode(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_label_names_the_next_mode() {
        assert_eq!(ThemeMode::Dark.toggle_label(), "Switch to light theme");
    }
}
