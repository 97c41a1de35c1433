use crate::motion::{MotionFrame, Variant, MENU_EXIT, MENU_HIDDEN, MENU_VISIBLE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn button_glyph(self) -> &'static str {
        match self {
            Self::Closed => "☰",
            Self::Open => "✕",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Self::Closed => "Open navigation",
            Self::Open => "Close navigation",
        }
    }
}

/// Whether the menu panel is in the render tree, and which animation it runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayPhase {
    #[default]
    Absent,
    Visible,
    Exiting,
}

impl OverlayPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Visible => "visible",
            Self::Exiting => "exiting",
        }
    }

    /// Keyframes for the phase. Entry and exit need distinct names so the
    /// browser restarts the animation, and reports its end, on every switch.
    pub fn keyframes(self) -> Option<&'static str> {
        match self {
            Self::Absent => None,
            Self::Visible => Some("menu-enter"),
            Self::Exiting => Some("menu-exit"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavOverlay {
    menu: MenuState,
    phase: OverlayPhase,
}

impl NavOverlay {
    pub fn menu(&self) -> MenuState {
        self.menu
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_mounted(&self) -> bool {
        self.phase != OverlayPhase::Absent
    }

    pub fn toggle(&mut self) {
        self.menu = self.menu.toggled();
        self.phase = match (self.menu, self.phase) {
            (MenuState::Open, _) => OverlayPhase::Visible,
            (MenuState::Closed, OverlayPhase::Absent) => OverlayPhase::Absent,
            (MenuState::Closed, _) => OverlayPhase::Exiting,
        };
    }

    /// Called when the exit animation ends; a reopened menu stays mounted.
    pub fn exit_finished(&mut self) {
        if self.phase == OverlayPhase::Exiting && self.menu == MenuState::Closed {
            self.phase = OverlayPhase::Absent;
        }
    }

    /// The animation the panel runs in its current phase, as start and end poses.
    pub fn panel_motion(&self) -> Option<(MotionFrame, Variant)> {
        match self.phase {
            OverlayPhase::Visible => Some((MENU_HIDDEN, MENU_VISIBLE)),
            OverlayPhase::Exiting => Some((MotionFrame::REST, MENU_EXIT)),
            OverlayPhase::Absent => None,
        }
    }

    /// Inline style feeding the `menu-enter`/`menu-exit` keyframes in `styles.css`.
    pub fn panel_style(&self) -> String {
        let (Some((from, to)), Some(keyframes)) = (self.panel_motion(), self.phase.keyframes())
        else {
            return String::new();
        };

        format!(
            "--from-opacity: {}; --from-y: {}px; --from-scale: {}; \
             --to-opacity: {}; --to-y: {}px; --to-scale: {}; \
             animation: {} {}ms {} forwards;",
            from.opacity,
            from.translate_y,
            from.scale,
            to.frame.opacity,
            to.frame.translate_y,
            to.frame.scale,
            keyframes,
            to.duration_ms,
            to.easing.css()
        )
    }
}

pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem { label: "About", href: "#about" },
    NavItem { label: "Experience", href: "#experience" },
    NavItem { label: "Projects", href: "#projects" },
    NavItem { label: "Contact", href: "#contact" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_closed_and_unmounted() {
        let overlay = NavOverlay::default();
        assert_eq!(overlay.menu(), MenuState::Closed);
        assert!(!overlay.is_mounted());
    }

    #[test]
    fn each_toggle_flips_the_menu() {
        let mut overlay = NavOverlay::default();
        let mut expected = MenuState::Closed;

        for _ in 0..5 {
            overlay.toggle();
            expected = expected.toggled();
            assert_eq!(overlay.menu(), expected);
        }
    }

    #[test]
    fn closing_keeps_panel_until_exit_finishes() {
        let mut overlay = NavOverlay::default();
        overlay.toggle();
        assert_eq!(overlay.phase(), OverlayPhase::Visible);

        overlay.toggle();
        assert_eq!(overlay.phase(), OverlayPhase::Exiting);
        assert!(overlay.is_mounted());
        assert_eq!(overlay.panel_motion(), Some((MotionFrame::REST, MENU_EXIT)));
        assert!(overlay.panel_style().contains("150ms ease-in"));

        overlay.exit_finished();
        assert_eq!(overlay.phase(), OverlayPhase::Absent);
        assert!(!overlay.is_mounted());
    }

    #[test]
    fn reopening_mid_exit_cancels_removal() {
        let mut overlay = NavOverlay::default();
        overlay.toggle();
        overlay.toggle();
        overlay.toggle();
        overlay.exit_finished();

        assert_eq!(overlay.menu(), MenuState::Open);
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
    }

    #[test]
    fn stray_exit_event_is_ignored() {
        let mut overlay = NavOverlay::default();
        overlay.toggle();
        overlay.exit_finished();
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
    }

    #[test]
    fn entering_panel_starts_from_hidden_pose() {
        let mut overlay = NavOverlay::default();
        assert!(overlay.panel_style().is_empty());

        overlay.toggle();
        let style = overlay.panel_style();
        assert!(style.contains("--from-opacity: 0;"));
        assert!(style.contains("--from-y: -20px;"));
        assert!(style.contains("menu-enter 200ms ease-out"));
    }

    #[test]
    fn entry_and_exit_run_differently_named_animations() {
        let mut overlay = NavOverlay::default();
        overlay.toggle();
        let entering = overlay.panel_style();
        overlay.toggle();
        let exiting = overlay.panel_style();

        assert!(entering.contains("animation: menu-enter "));
        assert!(exiting.contains("animation: menu-exit 150ms ease-in"));
        assert_eq!(overlay.phase().as_str(), "exiting");
        assert_ne!(
            OverlayPhase::Visible.keyframes(),
            OverlayPhase::Exiting.keyframes()
        );

        overlay.toggle();
        assert!(overlay.panel_style().contains("animation: menu-enter "));
    }

    #[test]
    fn nav_items_are_in_page_anchors() {
        assert!(NAV_ITEMS.iter().all(|item| item.href.starts_with('#')));
    }
}
