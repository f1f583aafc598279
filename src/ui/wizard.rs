//! Full-screen rendering of a form session: progress, step, buttons and success panel

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::dialogs::centered_rect;
use super::form_field::{field_height, render_field};
use super::keybindings::{footer_hints, ShortcutContext};
use super::palette::Palette;
use crate::form::{FormSession, Indicator, ERROR_BANNER};

/// First field to draw so that `focus` fits in `available` rows.
///
/// Keeps the previous `offset` when the focused field is already visible.
pub fn visible_from(heights: &[u16], available: u16, focus: usize, offset: usize) -> usize {
    if heights.is_empty() {
        return 0;
    }
    let focus = focus.min(heights.len() - 1);
    let mut offset = offset.min(focus);
    while offset < focus && heights[offset..=focus].iter().sum::<u16>() > available {
        offset += 1;
    }
    offset
}

/// Stateful view over a session; remembers the field scroll position
#[derive(Debug, Default)]
pub struct WizardView {
    scroll: usize,
}

impl WizardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump back to the top of the step
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    pub fn render(&mut self, frame: &mut Frame, session: &FormSession, palette: &Palette) {
        let area = frame.area();
        frame.render_widget(Block::default().style(palette.base()), area);

        if session.success_visible() {
            render_success(frame, session, palette);
            return;
        }

        let banner_height = u16::from(session.has_banner(session.current_step()));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(2),             // Progress
                Constraint::Length(2),             // Step heading
                Constraint::Length(banner_height), // Error banner
                Constraint::Min(3),                // Fields
                Constraint::Length(3),             // Buttons
                Constraint::Length(1),             // Footer
            ])
            .split(area);

        frame.render_widget(progress_line(session, palette), chunks[0]);

        let step = session.current_step();
        let title = session
            .step_spec(step)
            .map(|s| s.title.as_str())
            .unwrap_or_default();
        let heading = Paragraph::new(Line::from(vec![
            Span::styled(title, palette.heading()),
            Span::styled(
                format!("   Step {} of {}", step, session.total_steps()),
                Style::default().fg(palette.muted),
            ),
        ]));
        frame.render_widget(heading, chunks[1]);

        if banner_height > 0 {
            let banner = Paragraph::new(Line::from(Span::styled(
                ERROR_BANNER,
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            )));
            frame.render_widget(banner, chunks[2]);
        }

        self.render_fields(frame, chunks[3], session, palette);
        render_buttons(frame, chunks[4], session, palette);
        render_footer(frame, chunks[5], ShortcutContext::Form, palette);
    }

    fn render_fields(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        session: &FormSession,
        palette: &Palette,
    ) {
        let indices = session.step_field_indices(session.current_step());
        let fields = session.fields();
        let heights: Vec<u16> = indices.iter().map(|&i| field_height(&fields[i])).collect();
        let focused = session.focused_field();
        let focus_pos = focused
            .and_then(|f| indices.iter().position(|&i| i == f))
            .unwrap_or(0);

        self.scroll = visible_from(&heights, area.height, focus_pos, self.scroll);

        let mut y = area.y;
        for (pos, &idx) in indices.iter().enumerate().skip(self.scroll) {
            let height = heights[pos];
            if y + height > area.y + area.height {
                break;
            }
            let rect = Rect::new(area.x, y, area.width, height);
            render_field(frame, rect, &fields[idx], focused == Some(idx), palette);
            y += height;
        }
    }
}

fn progress_line<'a>(session: &FormSession, palette: &Palette) -> Paragraph<'a> {
    let progress = session.progress();
    let mut spans = Vec::new();

    for (i, indicator) in progress.indicators.iter().enumerate() {
        if i > 0 {
            let color = if progress.connectors[i - 1] {
                palette.accent
            } else {
                palette.muted
            };
            spans.push(Span::styled(" ──── ", Style::default().fg(color)));
        }

        let step = i + 1;
        let (marker, style) = match indicator {
            Indicator::Completed => ("✓".to_string(), Style::default().fg(palette.success)),
            Indicator::Active => (
                step.to_string(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            ),
            Indicator::Pending => (step.to_string(), Style::default().fg(palette.muted)),
        };
        spans.push(Span::styled(format!("({marker})"), style));

        let label = session
            .step_spec(step)
            .map(|s| s.label().to_string())
            .unwrap_or_default();
        let label_style = if indicator.is_highlighted() {
            Style::default().fg(palette.text)
        } else {
            Style::default().fg(palette.muted)
        };
        spans.push(Span::styled(format!(" {label}"), label_style));
    }

    Paragraph::new(Line::from(spans))
}

fn button<'a>(label: &str, style: Style) -> Span<'a> {
    Span::styled(format!("[ {label} ]"), style)
}

fn top_rule<'a>(palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(palette.border))
}

fn render_buttons(frame: &mut Frame, area: Rect, session: &FormSession, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let active = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);

    if session.current_step() > 1 {
        let back = Paragraph::new(Line::from(button(
            "Back",
            Style::default().fg(palette.text),
        )))
        .block(top_rule(palette));
        frame.render_widget(back, chunks[0]);
    }

    let forward = if session.is_last_step() {
        let control = session.submit_control();
        let style = if control.enabled {
            active
        } else {
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::DIM)
        };
        button(&control.label, style)
    } else {
        button("Next", active)
    };

    let next = Paragraph::new(Line::from(forward))
        .alignment(Alignment::Right)
        .block(top_rule(palette));
    frame.render_widget(next, chunks[1]);
}

fn render_footer(frame: &mut Frame, area: Rect, context: ShortcutContext, palette: &Palette) {
    let mut spans = Vec::new();
    for (key, label) in footer_hints(context) {
        spans.push(Span::styled(key, palette.key_hint()));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(palette.muted),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_success(frame: &mut Frame, session: &FormSession, palette: &Palette) {
    let area = centered_rect(60, 50, frame.area());
    let schema = session.schema();

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            schema.success_title.as_str(),
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            schema.success_message.as_str(),
            Style::default().fg(palette.text),
        )),
    ];

    let panel = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.success)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);

    let footer_area = Rect::new(
        area.x,
        (area.y + area.height).min(frame.area().height.saturating_sub(1)),
        area.width,
        1,
    );
    render_footer(frame, footer_area, ShortcutContext::Success, palette);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormSchema, SubmitError};
    use crate::theme::Theme;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn session() -> FormSession {
        FormSession::new(FormSchema::client_brief(), "me@example.com").unwrap()
    }

    fn draw(view: &mut WizardView, session: &FormSession) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let palette = Palette::for_theme(Theme::Dark);
        terminal
            .draw(|f| view.render(f, session, &palette))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn to_last_step(s: &mut FormSession) {
        s.set_value("name", "Jane");
        s.set_value("email", "jane@company.com");
        s.advance();
        s.set_value("project-type", "Site");
        s.set_value("budget", "5k");
        s.set_value("timeline", "May");
        s.advance();
        s.set_value("description", "Shop");
    }

    #[test]
    fn test_visible_from() {
        let heights = [3, 3, 7, 3];
        assert_eq!(visible_from(&heights, 20, 3, 0), 0);
        assert_eq!(visible_from(&heights, 10, 2, 0), 1);
        assert_eq!(visible_from(&heights, 10, 3, 0), 2);
        // Scrolling back up follows focus
        assert_eq!(visible_from(&heights, 10, 0, 2), 0);
        // A single oversized field still starts at itself
        assert_eq!(visible_from(&heights, 4, 2, 0), 2);
        assert_eq!(visible_from(&[], 10, 0, 5), 0);
    }

    #[test]
    fn test_first_step_layout() {
        let s = session();
        let text = draw(&mut WizardView::new(), &s);
        assert!(text.contains("About You"));
        assert!(text.contains("Step 1 of 3"));
        assert!(text.contains("(1) Contact"));
        assert!(text.contains("(3) Details"));
        assert!(text.contains("[ Next ]"));
        assert!(!text.contains("[ Back ]"));
        assert!(!text.contains(ERROR_BANNER));
    }

    #[test]
    fn test_banner_after_failed_advance() {
        let mut s = session();
        s.advance();
        let text = draw(&mut WizardView::new(), &s);
        assert!(text.contains(ERROR_BANNER));
        assert!(text.contains("This field is required"));
    }

    #[test]
    fn test_last_step_shows_submit_control() {
        let mut s = session();
        to_last_step(&mut s);
        let text = draw(&mut WizardView::new(), &s);
        assert!(text.contains("(✓) Contact"));
        assert!(text.contains("[ Back ]"));
        assert!(text.contains("[ Submit Brief ]"));

        s.begin_submit().unwrap();
        let text = draw(&mut WizardView::new(), &s);
        assert!(text.contains("[ Submitting... ]"));
    }

    #[test]
    fn test_success_panel_replaces_form() {
        let mut s = session();
        to_last_step(&mut s);
        s.begin_submit().unwrap();
        s.complete_submit(Ok(()));
        let text = draw(&mut WizardView::new(), &s);
        assert!(text.contains("Thank you!"));
        assert!(!text.contains("Project Details"));
        assert!(!text.contains("[ Submit Brief ]"));
    }

    #[test]
    fn test_failure_keeps_form() {
        let mut s = session();
        to_last_step(&mut s);
        s.begin_submit().unwrap();
        s.complete_submit(Err(SubmitError::Status(500)));
        let text = draw(&mut WizardView::new(), &s);
        assert!(text.contains("[ Submit Brief ]"));
    }

    #[test]
    fn test_scroll_reset() {
        let mut view = WizardView { scroll: 2 };
        view.reset_scroll();
        assert_eq!(view.scroll, 0);
    }
}
