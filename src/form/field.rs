//! Form field definitions, state and the per-field validation rule

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tui_textarea::{CursorMove, TextArea};

/// `local-part@domain.tld`, no whitespace and no extra `@` in any part
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern compiles"));

/// Input kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line free text
    #[default]
    Text,
    /// Single-line email address, format-checked when required
    Email,
    /// Multi-line free text
    Multiline,
}

impl FieldKind {
    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::Multiline)
    }
}

/// Declared shape of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key used in the submitted payload
    pub name: String,
    /// Human-readable label
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }
}

/// Strip whitespace the way a browser `trim()` does, byte order marks included
pub fn trim_value(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Returns true when `value` is an acceptable email address
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(trim_value(value))
}

/// Check a value against a field's rules.
///
/// Only required fields can fail: they must be non-blank after trimming, and
/// email fields must also match the address pattern.
pub fn check_value(kind: FieldKind, required: bool, value: &str) -> bool {
    if !required {
        return true;
    }
    let trimmed = trim_value(value);
    if trimmed.is_empty() {
        return false;
    }
    match kind {
        FieldKind::Email => is_valid_email(trimmed),
        FieldKind::Text | FieldKind::Multiline => true,
    }
}

/// A single editing operation applied to a field's value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    /// Insert a line break (ignored by single-line fields)
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Replace the whole value
    Set(String),
}

/// Live state of one field inside a form session
#[derive(Debug, Clone)]
pub struct FieldState {
    pub spec: FieldSpec,
    /// 1-based index of the step that owns this field
    pub step: usize,
    /// Current text; for multi-line fields the editor lines joined with `\n`
    value: String,
    /// Cursor position in characters (single-line fields)
    cursor: usize,
    /// Line editor backing multi-line fields
    editor: Option<Box<TextArea<'static>>>,
    /// Error styling currently applied
    flagged: bool,
}

impl FieldState {
    pub fn new(spec: FieldSpec, step: usize) -> Self {
        let editor = spec
            .kind
            .is_multiline()
            .then(|| Box::new(TextArea::default()));
        Self {
            spec,
            step,
            value: String::new(),
            cursor: 0,
            editor,
            flagged: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The multi-line editor, if this field has one
    pub fn editor(&self) -> Option<&TextArea<'static>> {
        self.editor.as_deref()
    }

    pub fn required(&self) -> bool {
        self.spec.required
    }

    pub fn kind(&self) -> FieldKind {
        self.spec.kind
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) {
        self.flagged = flagged;
    }

    /// Derived on demand, never cached
    pub fn has_error(&self) -> bool {
        !check_value(self.spec.kind, self.spec.required, &self.value)
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Move the cursor one line up or down inside a multi-line field.
    ///
    /// Returns false for single-line fields and when the cursor is already
    /// on the first (or last) line.
    pub fn move_line(&mut self, down: bool) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let (row, _) = editor.cursor();
        if (down && row + 1 >= editor.lines().len()) || (!down && row == 0) {
            return false;
        }
        editor.move_cursor(if down { CursorMove::Down } else { CursorMove::Up });
        true
    }

    /// Apply an edit; returns true if the value changed
    pub fn apply(&mut self, edit: FieldEdit) -> bool {
        if let Some(editor) = self.editor.as_mut() {
            edit_lines(editor, edit);
            let value = editor.lines().join("\n");
            let changed = value != self.value;
            self.value = value;
            return changed;
        }

        match edit {
            FieldEdit::Insert(c) => {
                if c == '\n' && !self.spec.kind.is_multiline() {
                    return false;
                }
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            FieldEdit::Newline => self.apply(FieldEdit::Insert('\n')),
            FieldEdit::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.value.remove(at);
                true
            }
            FieldEdit::Delete => {
                if self.cursor >= self.char_len() {
                    return false;
                }
                let at = self.byte_offset(self.cursor);
                self.value.remove(at);
                true
            }
            FieldEdit::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            FieldEdit::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                false
            }
            FieldEdit::Home => {
                self.cursor = 0;
                false
            }
            FieldEdit::End => {
                self.cursor = self.char_len();
                false
            }
            FieldEdit::Set(value) => {
                let value = value.replace('\n', " ");
                let changed = value != self.value;
                self.value = value;
                self.cursor = self.char_len();
                changed
            }
        }
    }
}

fn edit_lines(editor: &mut TextArea<'static>, edit: FieldEdit) {
    match edit {
        FieldEdit::Insert('\n') | FieldEdit::Newline => editor.insert_newline(),
        FieldEdit::Insert(c) => editor.insert_char(c),
        FieldEdit::Backspace => {
            editor.delete_char();
        }
        FieldEdit::Delete => {
            editor.delete_next_char();
        }
        FieldEdit::Left => editor.move_cursor(CursorMove::Back),
        FieldEdit::Right => editor.move_cursor(CursorMove::Forward),
        FieldEdit::Home => editor.move_cursor(CursorMove::Head),
        FieldEdit::End => editor.move_cursor(CursorMove::End),
        FieldEdit::Set(value) => {
            *editor = TextArea::new(value.split('\n').map(str::to_string).collect());
            editor.move_cursor(CursorMove::Bottom);
            editor.move_cursor(CursorMove::End);
        }
    }
}
