//! Popups drawn over the form: the failure alert and the help overlay

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::keybindings::{shortcuts_by_category_for_context, ShortcutCategory, ShortcutContext};
use super::palette::Palette;

/// Helper to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Blocking message box; stays up until dismissed
pub fn render_alert(frame: &mut Frame, message: &str, palette: &Palette) {
    let area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(palette.text))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", palette.key_hint()),
            Span::styled(" OK", Style::default().fg(palette.muted)),
        ]),
    ];

    let alert = Paragraph::new(text)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error)),
        )
        .style(palette.base())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(alert, area);
}

pub struct HelpDialog {
    pub visible: bool,
}

impl HelpDialog {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn render(&self, frame: &mut Frame, palette: &Palette) {
        if !self.visible {
            return;
        }

        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);

        let mut help_text = vec![
            Line::from(Span::styled("Keyboard Shortcuts", palette.heading())),
            Line::from(""),
        ];

        for (category, shortcuts) in shortcuts_by_category_for_context(ShortcutContext::Form) {
            if category != ShortcutCategory::General {
                help_text.push(Line::from(""));
            }
            help_text.push(Line::from(Span::styled(
                category.display_name(),
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC),
            )));

            for shortcut in shortcuts {
                help_text.push(Line::from(vec![
                    Span::styled(shortcut.key_display_padded(), palette.key_hint()),
                    Span::raw(shortcut.description),
                ]));
            }
        }

        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(palette.muted),
        )));

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            )
            .style(palette.base())
            .alignment(Alignment::Left);

        frame.render_widget(help, area);
    }
}

impl Default for HelpDialog {
    fn default() -> Self {
        Self::new()
    }
}
