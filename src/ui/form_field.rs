//! Rendering for a single form field

use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::palette::Palette;
use crate::form::field::trim_value;
use crate::form::{FieldKind, FieldState};

/// Rows of text visible in a multi-line field
const MULTILINE_ROWS: u16 = 5;

/// Total height of a field including its border
pub fn field_height(field: &FieldState) -> u16 {
    if field.kind().is_multiline() {
        MULTILINE_ROWS + 2
    } else {
        3
    }
}

/// Message under a flagged field
fn error_hint(field: &FieldState) -> &'static str {
    if trim_value(field.value()).is_empty() {
        "This field is required"
    } else if field.kind() == FieldKind::Email {
        "Enter a valid email address"
    } else {
        "Invalid value"
    }
}

/// Draw a field into `area`, placing the terminal cursor when focused
pub fn render_field(
    frame: &mut Frame,
    area: Rect,
    field: &FieldState,
    focused: bool,
    palette: &Palette,
) {
    let border_color = if field.is_flagged() {
        palette.error
    } else if focused {
        palette.focus
    } else {
        palette.border
    };

    let mut title = vec![Span::styled(
        format!(" {}", field.spec.label),
        Style::default().fg(palette.text),
    )];
    if field.required() {
        title.push(Span::styled(" *", Style::default().fg(palette.error)));
    }
    title.push(Span::raw(" "));

    let mut block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    if field.is_flagged() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", error_hint(field)),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let placeholder = field.spec.placeholder.clone().unwrap_or_default();

    if let Some(editor) = field.editor() {
        let mut editor = editor.clone();
        editor.set_block(block);
        editor.set_style(Style::default().fg(palette.text));
        editor.set_cursor_line_style(Style::default());
        editor.set_cursor_style(if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });
        editor.set_placeholder_text(placeholder);
        editor.set_placeholder_style(Style::default().fg(palette.muted));
        frame.render_widget(&editor, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let col = field.cursor();
    let offset = (col + 1).saturating_sub(inner.width as usize);

    let content = if field.value().is_empty() {
        Line::from(Span::styled(placeholder, Style::default().fg(palette.muted)))
    } else {
        Line::from(field.value())
    };

    let para = Paragraph::new(content)
        .style(Style::default().fg(palette.text))
        .scroll((0, offset as u16));
    frame.render_widget(para, inner);

    if focused {
        let max_x = inner.width.saturating_sub(1) as usize;
        let x = inner.x + col.saturating_sub(offset).min(max_x) as u16;
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldEdit, FieldSpec};
    use crate::theme::Theme;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(field: &FieldState, focused: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, field_height(field))).unwrap();
        let palette = Palette::for_theme(Theme::Dark);
        terminal
            .draw(|f| render_field(f, f.area(), field, focused, &palette))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_heights() {
        let single = FieldState::new(FieldSpec::new("a", "A", FieldKind::Text, false), 1);
        let multi = FieldState::new(FieldSpec::new("b", "B", FieldKind::Multiline, false), 1);
        assert_eq!(field_height(&single), 3);
        assert_eq!(field_height(&multi), 7);
    }

    #[test]
    fn test_placeholder_shown_when_empty() {
        let field = FieldState::new(
            FieldSpec::new("email", "Email", FieldKind::Email, true).with_placeholder("you@x.io"),
            1,
        );
        let text = draw(&field, false);
        assert!(text.contains("Email *"));
        assert!(text.contains("you@x.io"));
    }

    #[test]
    fn test_flagged_field_shows_hint() {
        let mut field = FieldState::new(FieldSpec::new("email", "Email", FieldKind::Email, true), 1);
        field.apply(FieldEdit::Set("nope".into()));
        field.set_flagged(true);
        let text = draw(&field, true);
        assert!(text.contains("nope"));
        assert!(text.contains("Enter a valid email address"));
    }

    #[test]
    fn test_multiline_value_rendered_on_rows() {
        let mut field =
            FieldState::new(FieldSpec::new("notes", "Notes", FieldKind::Multiline, false), 1);
        field.apply(FieldEdit::Set("first\nsecond".into()));
        let text = draw(&field, true);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].contains("first"));
        assert!(rows[2].contains("second"));
    }

    #[test]
    fn test_long_multiline_line_scrolls_to_cursor() {
        let mut field =
            FieldState::new(FieldSpec::new("notes", "Notes", FieldKind::Multiline, false), 1);
        let line = format!("{}END", "abcdefghij".repeat(4));
        field.apply(FieldEdit::Set(line));
        let text = draw(&field, true);
        assert!(text.contains("END"), "tail missing:\n{text}");
    }

    #[test]
    fn test_long_single_line_scrolls_to_cursor() {
        let mut field = FieldState::new(FieldSpec::new("site", "Site", FieldKind::Text, false), 1);
        field.apply(FieldEdit::Set(format!("{}END", "x".repeat(50))));
        let text = draw(&field, true);
        assert!(text.contains("END"));
    }

    #[test]
    fn test_multiline_placeholder() {
        let field = FieldState::new(
            FieldSpec::new("goals", "Goals", FieldKind::Multiline, false)
                .with_placeholder("What does success look like?"),
            1,
        );
        let text = draw(&field, false);
        assert!(text.contains("What does success look like?"));
    }
}
