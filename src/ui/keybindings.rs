//! Centralized keyboard shortcuts registry.
//!
//! Single source of truth for the keys the form understands. It is consumed
//! by the help dialog and the footer hint line.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Primary key for this shortcut
    pub key: KeyCode,
    /// Alternative key (e.g., arrow key variant)
    pub alt_key: Option<KeyCode>,
    /// Whether Ctrl must be held
    pub ctrl: bool,
    /// What the key does
    pub action: Action,
    /// Human-readable description of what this shortcut does
    pub description: &'static str,
    /// Short label for the footer; empty when not shown there
    pub hint: &'static str,
    /// Category for grouping in help
    pub category: ShortcutCategory,
    /// Context where this shortcut is active
    pub context: ShortcutContext,
}

/// Commands a shortcut maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ToggleHelp,
    ToggleTheme,
    /// Advance, or submit on the last step
    Confirm,
    Back,
    NextField,
    PrevField,
    Newline,
    DismissAlert,
    /// Plain text editing, handled by the focused field
    Edit,
}

/// Categories for organizing shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Editing,
}

/// Contexts where shortcuts are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Filling in the form
    Form,
    /// An alert is covering the form
    Alert,
    /// The success panel replaced the form
    Success,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Editing => "Editing",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Navigation,
            ShortcutCategory::Editing,
        ]
    }
}

impl ShortcutContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutContext::Form => "Form",
            ShortcutContext::Alert => "Alert",
            ShortcutContext::Success => "Submitted",
        }
    }

    /// All contexts in display order
    pub fn all() -> &'static [ShortcutContext] {
        &[
            ShortcutContext::Form,
            ShortcutContext::Alert,
            ShortcutContext::Success,
        ]
    }
}

impl Shortcut {
    /// Format key for display (e.g., "Esc", "Ctrl+T", "Tab/↓")
    pub fn key_display(&self) -> String {
        let prefix = if self.ctrl { "Ctrl+" } else { "" };
        let primary = format!("{prefix}{}", format_keycode(&self.key));
        match &self.alt_key {
            Some(alt) => format!("{}/{}{}", primary, prefix, format_keycode(alt)),
            None => primary,
        }
    }

    /// Format key for help dialog (left-padded to 12 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<12}", self.key_display())
    }

    /// Whether a key event triggers this shortcut
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.modifiers.contains(KeyModifiers::CONTROL) != self.ctrl {
            return false;
        }
        let code = normalize(event.code);
        code == normalize(self.key) || self.alt_key.is_some_and(|alt| code == normalize(alt))
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Format a KeyCode for display
fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", key),
    }
}

/// Static registry of all keyboard shortcuts
pub static SHORTCUTS: &[Shortcut] = &[
    // === Form Context ===
    // General
    Shortcut {
        key: KeyCode::Esc,
        alt_key: None,
        ctrl: false,
        action: Action::Quit,
        description: "Quit",
        hint: "quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::F(1),
        alt_key: None,
        ctrl: false,
        action: Action::ToggleHelp,
        description: "Toggle help",
        hint: "help",
        category: ShortcutCategory::General,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::Char('t'),
        alt_key: None,
        ctrl: true,
        action: Action::ToggleTheme,
        description: "Switch light/dark theme",
        hint: "theme",
        category: ShortcutCategory::General,
        context: ShortcutContext::Form,
    },
    // Navigation
    Shortcut {
        key: KeyCode::Enter,
        alt_key: None,
        ctrl: false,
        action: Action::Confirm,
        description: "Next step (submit on the last step)",
        hint: "next",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::PageUp,
        alt_key: None,
        ctrl: false,
        action: Action::Back,
        description: "Previous step",
        hint: "back",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::Tab,
        alt_key: Some(KeyCode::Down),
        ctrl: false,
        action: Action::NextField,
        description: "Next field (↓ moves down a line first in multi-line fields)",
        hint: "",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::BackTab,
        alt_key: Some(KeyCode::Up),
        ctrl: false,
        action: Action::PrevField,
        description: "Previous field (↑ moves up a line first in multi-line fields)",
        hint: "",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Form,
    },
    // Editing
    Shortcut {
        key: KeyCode::Char('j'),
        alt_key: None,
        ctrl: true,
        action: Action::Newline,
        description: "New line in a multi-line field",
        hint: "newline",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::Left,
        alt_key: Some(KeyCode::Right),
        ctrl: false,
        action: Action::Edit,
        description: "Move cursor",
        hint: "",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::Home,
        alt_key: Some(KeyCode::End),
        ctrl: false,
        action: Action::Edit,
        description: "Start / end of value",
        hint: "",
        category: ShortcutCategory::Editing,
        context: ShortcutContext::Form,
    },
    // === Alert Context ===
    Shortcut {
        key: KeyCode::Enter,
        alt_key: Some(KeyCode::Esc),
        ctrl: false,
        action: Action::DismissAlert,
        description: "Dismiss alert",
        hint: "dismiss",
        category: ShortcutCategory::General,
        context: ShortcutContext::Alert,
    },
    // === Success Context ===
    Shortcut {
        key: KeyCode::Esc,
        alt_key: Some(KeyCode::Enter),
        ctrl: false,
        action: Action::Quit,
        description: "Quit",
        hint: "quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Success,
    },
    Shortcut {
        key: KeyCode::Char('t'),
        alt_key: None,
        ctrl: true,
        action: Action::ToggleTheme,
        description: "Switch light/dark theme",
        hint: "theme",
        category: ShortcutCategory::General,
        context: ShortcutContext::Success,
    },
];

/// Get all shortcuts for a given context
pub fn shortcuts_for_context(context: ShortcutContext) -> impl Iterator<Item = &'static Shortcut> {
    SHORTCUTS.iter().filter(move |s| s.context == context)
}

/// Get shortcuts grouped by category for a given context
pub fn shortcuts_by_category_for_context(
    context: ShortcutContext,
) -> Vec<(ShortcutCategory, Vec<&'static Shortcut>)> {
    let mut result = Vec::new();
    for category in ShortcutCategory::all() {
        let shortcuts: Vec<&Shortcut> = SHORTCUTS
            .iter()
            .filter(|s| s.context == context && s.category == *category)
            .collect();
        if !shortcuts.is_empty() {
            result.push((*category, shortcuts));
        }
    }
    result
}

/// `(key, label)` pairs for the footer line of a context
pub fn footer_hints(context: ShortcutContext) -> Vec<(String, &'static str)> {
    shortcuts_for_context(context)
        .filter(|s| !s.hint.is_empty())
        .map(|s| (s.key_display(), s.hint))
        .collect()
}

/// Find the first shortcut in `context` triggered by `event`
pub fn lookup(context: ShortcutContext, event: &KeyEvent) -> Option<&'static Shortcut> {
    shortcuts_for_context(context).find(|s| s.matches(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_all_shortcuts_have_descriptions() {
        for shortcut in SHORTCUTS {
            assert!(
                !shortcut.description.is_empty(),
                "Shortcut {:?} has empty description",
                shortcut.key
            );
        }
    }

    #[test]
    fn test_key_display() {
        let theme = lookup(
            ShortcutContext::Form,
            &key(KeyCode::Char('t'), KeyModifiers::CONTROL),
        )
        .unwrap();
        assert_eq!(theme.key_display(), "Ctrl+T");

        let next_field = lookup(ShortcutContext::Form, &key(KeyCode::Tab, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(next_field.key_display(), "Tab/↓");
    }

    #[test]
    fn test_ctrl_must_match() {
        // A plain 't' is text input, not the theme toggle
        assert!(lookup(
            ShortcutContext::Form,
            &key(KeyCode::Char('t'), KeyModifiers::NONE)
        )
        .is_none());
        let newline = lookup(
            ShortcutContext::Form,
            &key(KeyCode::Char('J'), KeyModifiers::CONTROL | KeyModifiers::SHIFT),
        )
        .unwrap();
        assert_eq!(newline.action, Action::Newline);
    }

    #[test]
    fn test_alt_key_matches() {
        let prev = lookup(ShortcutContext::Form, &key(KeyCode::Up, KeyModifiers::NONE)).unwrap();
        assert_eq!(prev.action, Action::PrevField);
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(format_keycode(&KeyCode::Enter), "Enter");
        assert_eq!(format_keycode(&KeyCode::PageUp), "PgUp");
        assert_eq!(format_keycode(&KeyCode::F(1)), "F1");
        assert_eq!(format_keycode(&KeyCode::BackTab), "Shift+Tab");
    }

    #[test]
    fn test_footer_hints_skip_unlabelled() {
        let hints = footer_hints(ShortcutContext::Form);
        assert!(hints.iter().any(|(k, l)| k == "Enter" && *l == "next"));
        assert!(hints.iter().all(|(_, l)| !l.is_empty()));
        assert!(!hints.iter().any(|(k, _)| k == "Tab/↓"));
    }

    #[test]
    fn test_every_context_has_shortcuts() {
        for context in ShortcutContext::all() {
            assert!(
                shortcuts_for_context(*context).next().is_some(),
                "{} has no shortcuts",
                context.display_name()
            );
        }
    }

    #[test]
    fn test_grouping_by_category() {
        let grouped = shortcuts_by_category_for_context(ShortcutContext::Form);
        let categories: Vec<_> = grouped.iter().map(|(cat, _)| *cat).collect();
        assert_eq!(
            categories,
            vec![
                ShortcutCategory::General,
                ShortcutCategory::Navigation,
                ShortcutCategory::Editing
            ]
        );
    }
}
