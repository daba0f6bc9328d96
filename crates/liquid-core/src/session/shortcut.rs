//! Keyboard shortcuts of an app window.

use super::event::WindowAction;

/// Key sequences and the action each one triggers.
pub const SHORTCUTS: &[(&str, WindowAction)] = &[
    ("Ctrl+M", WindowAction::ToggleMute),
    ("Ctrl+Left", WindowAction::GoBack),
    ("Backspace", WindowAction::GoBack),
    ("Ctrl+Right", WindowAction::GoForward),
    ("Ctrl+R", WindowAction::Reload),
    ("F5", WindowAction::Reload),
    ("Ctrl+Shift+R", WindowAction::HardReload),
    ("Ctrl+Shift+F", WindowAction::ToggleFullscreen),
    ("F11", WindowAction::ToggleFullscreen),
    ("Escape", WindowAction::StopOrExitFullscreen),
    ("Ctrl+L", WindowAction::ToggleGeometryLock),
    ("Ctrl+Q", WindowAction::Quit),
    ("Ctrl+W", WindowAction::Quit),
    ("Ctrl+=", WindowAction::ZoomIn),
    ("Ctrl++", WindowAction::ZoomIn),
    ("Ctrl+-", WindowAction::ZoomOut),
    ("Ctrl+Shift+=", WindowAction::ZoomInFine),
    ("Ctrl+Shift++", WindowAction::ZoomInFine),
    ("Ctrl+Shift+-", WindowAction::ZoomOutFine),
    ("Ctrl+0", WindowAction::ZoomReset),
    ("Ctrl+Shift+0", WindowAction::ZoomReset),
];

/// Looks up a key sequence such as `ctrl+shift+r`; case and spaces are ignored.
pub fn action_for(sequence: &str) -> Option<WindowAction> {
    let wanted: String = sequence.chars().filter(|c| !c.is_whitespace()).collect();
    if wanted.is_empty() {
        return None;
    }
    SHORTCUTS
        .iter()
        .find(|(keys, _)| keys.eq_ignore_ascii_case(&wanted))
        .map(|(_, action)| *action)
}

/// All key sequences bound to `action`.
pub fn sequences_for(action: WindowAction) -> Vec<&'static str> {
    SHORTCUTS
        .iter()
        .filter(|(_, a)| *a == action)
        .map(|(keys, _)| *keys)
        .collect()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(action_for("ctrl+m"), Some(WindowAction::ToggleMute));
        assert_eq!(action_for("CTRL + SHIFT + R"), Some(WindowAction::HardReload));
        assert_eq!(action_for("f11"), Some(WindowAction::ToggleFullscreen));
        assert_eq!(action_for("Ctrl+K"), None);
        assert_eq!(action_for("  "), None);
    }

    #[test]
    fn test_every_action_has_a_shortcut() {
        for action in WindowAction::iter() {
            assert!(
                !sequences_for(action).is_empty(),
                "{} has no shortcut",
                action
            );
        }
    }

    #[test]
    fn test_sequences_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (keys, _) in SHORTCUTS {
            assert!(seen.insert(keys.to_ascii_lowercase()), "{} bound twice", keys);
        }
    }
}
