use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::Config;
use crate::form::{EnterAction, FieldEdit, FormSession, FormTransport, SubmitError};
use crate::theme::{Theme, ThemeStore};
use crate::ui::keybindings::{lookup, Action, ShortcutContext};
use crate::ui::{install_panic_hook, render_alert, HelpDialog, Palette, TerminalGuard, WizardView};

type SubmitResult = Result<(), SubmitError>;

pub struct App {
    config: Config,
    session: FormSession,
    view: WizardView,
    help_dialog: HelpDialog,
    theme: Theme,
    theme_store: ThemeStore,
    transport: Arc<dyn FormTransport>,
    /// Completion of the one request allowed in flight
    in_flight: Option<oneshot::Receiver<SubmitResult>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, session: FormSession, transport: Arc<dyn FormTransport>) -> Self {
        let theme_store = ThemeStore::new(&config.state_path());
        let theme = theme_store.resolve(config.ui.default_theme);
        tracing::debug!(theme = %theme, "Theme resolved");

        Self {
            config,
            session,
            view: WizardView::new(),
            help_dialog: HelpDialog::new(),
            theme,
            theme_store,
            transport,
            in_flight: None,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn help_visible(&self) -> bool {
        self.help_dialog.visible
    }

    pub fn submission_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let mut guard = TerminalGuard::enter()?;

        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms);
        tracing::info!(form = %self.session.schema().name, "Form opened");

        while !self.should_quit {
            guard.terminal().draw(|f| self.draw(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.poll_submission();
        }

        guard.leave();
        if self.in_flight.is_some() {
            tracing::warn!("Exiting with a submission still in flight");
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        if self.session.take_scroll_reset() {
            self.view.reset_scroll();
        }

        let palette = Palette::for_theme(self.theme);
        self.view.render(frame, &self.session, &palette);
        if let Some(message) = self.session.alert() {
            render_alert(frame, message, &palette);
        }
        self.help_dialog.render(frame, &palette);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Help closes on any key
        if self.help_dialog.visible {
            self.help_dialog.visible = false;
            return;
        }

        // The alert blocks everything until dismissed
        if self.session.alert().is_some() {
            if lookup(ShortcutContext::Alert, &key).map(|s| s.action) == Some(Action::DismissAlert)
            {
                self.session.dismiss_alert();
            }
            return;
        }

        let context = if self.session.success_visible() {
            ShortcutContext::Success
        } else {
            ShortcutContext::Form
        };

        match lookup(context, &key).map(|s| s.action) {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::ToggleHelp) => self.help_dialog.toggle(),
            Some(Action::ToggleTheme) => self.toggle_theme(),
            Some(Action::Confirm) => self.confirm(),
            Some(Action::Back) => {
                self.session.retreat();
            }
            // Arrows walk the lines of a multi-line field before leaving it
            Some(Action::NextField) => {
                if key.code != KeyCode::Down || !self.session.move_focused_line(true) {
                    self.session.focus_next();
                }
            }
            Some(Action::PrevField) => {
                if key.code != KeyCode::Up || !self.session.move_focused_line(false) {
                    self.session.focus_prev();
                }
            }
            Some(Action::Newline) => {
                self.session.input_focused(FieldEdit::Newline);
            }
            Some(Action::DismissAlert) => self.session.dismiss_alert(),
            Some(Action::Edit) | None => {
                if context == ShortcutContext::Form {
                    self.edit(key);
                }
            }
        }
    }

    fn edit(&mut self, key: KeyEvent) {
        let edit = match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                FieldEdit::Insert(c)
            }
            KeyCode::Backspace => FieldEdit::Backspace,
            KeyCode::Delete => FieldEdit::Delete,
            KeyCode::Left => FieldEdit::Left,
            KeyCode::Right => FieldEdit::Right,
            KeyCode::Home => FieldEdit::Home,
            KeyCode::End => FieldEdit::End,
            _ => return,
        };
        self.session.input_focused(edit);
    }

    fn confirm(&mut self) {
        match self.session.on_enter() {
            EnterAction::Submit => self.start_submission(),
            EnterAction::Blocked => tracing::debug!(
                step = self.session.current_step(),
                "Advance blocked by validation"
            ),
            EnterAction::Advanced | EnterAction::Ignored => {}
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = match self.theme_store.toggle(self.theme) {
            Ok(theme) => theme,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save theme preference");
                self.theme.toggled()
            }
        };
    }

    /// Validate, lock the control and post in the background
    fn start_submission(&mut self) {
        let payload = match self.session.begin_submit() {
            Ok(payload) => payload,
            Err(reason) => {
                tracing::debug!(%reason, "Submit rejected");
                return;
            }
        };

        let transport = Arc::clone(&self.transport);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = transport.post_form(&payload).await;
            // Receiver is gone if the app already quit
            let _ = tx.send(result);
        });
        self.in_flight = Some(rx);
    }

    /// Apply a finished submission, if any. Returns true when one completed.
    pub fn poll_submission(&mut self) -> bool {
        let Some(rx) = self.in_flight.as_mut() else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => Err(SubmitError::Network(
                "submission task ended without a result".to_string(),
            )),
        };

        self.in_flight = None;
        self.session.complete_submit(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormSchema, SubmissionStatus};
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StubTransport {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FormTransport for StubTransport {
        async fn post_form(&self, _fields: &[(String, String)]) -> SubmitResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SubmitError::Status(500))
            } else {
                Ok(())
            }
        }

        fn destination(&self) -> &str {
            "stub"
        }
    }

    fn app(fail: bool) -> (App, Arc<StubTransport>, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = dir.path().to_string_lossy().to_string();
        config.ui.default_theme = Theme::Light;

        let transport = Arc::new(StubTransport {
            fail,
            calls: AtomicUsize::new(0),
        });
        let session = FormSession::new(FormSchema::client_brief(), "me@example.com").unwrap();
        let app = App::new(config, session, transport.clone());
        (app, transport, dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Fill every required field through the keyboard and land on the last step
    fn fill_to_last_step(app: &mut App) {
        type_text(app, "Jane");
        press(app, KeyCode::Tab);
        type_text(app, "jane@company.com");
        press(app, KeyCode::Enter);
        type_text(app, "Website");
        press(app, KeyCode::Tab);
        type_text(app, "5k");
        press(app, KeyCode::Tab);
        type_text(app, "June");
        press(app, KeyCode::Enter);
        type_text(app, "A new shop");
    }

    async fn wait_for_completion(app: &mut App) {
        for _ in 0..200 {
            if app.poll_submission() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("submission never completed");
    }

    #[tokio::test]
    async fn test_enter_is_gated_by_validation() {
        let (mut app, _, _dir) = app(false);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().current_step(), 1);
        assert!(app.session().has_banner(1));

        type_text(&mut app, "J");
        assert!(!app.session().fields()[0].is_flagged());
    }

    #[tokio::test]
    async fn test_page_up_goes_back() {
        let (mut app, _, _dir) = app(false);
        fill_to_last_step(&mut app);
        assert_eq!(app.session().current_step(), 3);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.session().current_step(), 2);
    }

    #[tokio::test]
    async fn test_ctrl_j_inserts_newline() {
        let (mut app, _, _dir) = app(false);
        fill_to_last_step(&mut app);
        ctrl(&mut app, 'j');
        type_text(&mut app, "more");
        assert_eq!(
            app.session().field("description").unwrap().value(),
            "A new shop\nmore"
        );
    }

    #[tokio::test]
    async fn test_arrows_move_between_lines_before_fields() {
        let (mut app, _, _dir) = app(false);
        fill_to_last_step(&mut app);
        ctrl(&mut app, 'j');
        type_text(&mut app, "more");
        let description = app.session().focused_field();

        press(&mut app, KeyCode::Up);
        assert_eq!(app.session().focused_field(), description);
        press(&mut app, KeyCode::End);
        type_text(&mut app, "!");
        assert_eq!(
            app.session().field("description").unwrap().value(),
            "A new shop!\nmore"
        );

        press(&mut app, KeyCode::Up);
        assert_ne!(app.session().focused_field(), description);
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let (mut app, transport, _dir) = app(false);
        fill_to_last_step(&mut app);
        press(&mut app, KeyCode::Enter);
        assert!(app.submission_in_flight());
        assert_eq!(app.session().status(), SubmissionStatus::Submitting);

        // A second Enter while in flight does nothing
        press(&mut app, KeyCode::Enter);

        wait_for_completion(&mut app).await;
        assert_eq!(app.session().status(), SubmissionStatus::Succeeded);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_failed_submission_shows_alert_then_retries() {
        let (mut app, transport, _dir) = app(true);
        fill_to_last_step(&mut app);
        press(&mut app, KeyCode::Enter);
        wait_for_completion(&mut app).await;

        assert_eq!(app.session().status(), SubmissionStatus::Failed);
        assert!(app.session().alert().is_some());

        // Typing is blocked by the alert
        type_text(&mut app, "x");
        assert_eq!(
            app.session().field("description").unwrap().value(),
            "A new shop"
        );

        press(&mut app, KeyCode::Enter);
        assert!(app.session().alert().is_none());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().status(), SubmissionStatus::Submitting);
        wait_for_completion(&mut app).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_theme_toggle_persists() {
        let (mut app, _, dir) = app(false);
        let initial = app.theme();
        ctrl(&mut app, 't');
        assert_eq!(app.theme(), initial.toggled());
        assert_eq!(
            ThemeStore::new(dir.path()).stored().unwrap(),
            Some(initial.toggled())
        );
        // Plain 't' is typed into the field, not a toggle
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme(), initial.toggled());
        assert_eq!(app.session().fields()[0].value(), "t");
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let (mut app, _, _dir) = app(false);
        press(&mut app, KeyCode::F(1));
        assert!(app.help_visible());
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.help_visible());
        assert_eq!(app.session().fields()[0].value(), "");
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_anywhere() {
        let (mut app, _, _dir) = app(false);
        press(&mut app, KeyCode::F(1));
        ctrl(&mut app, 'c');
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_draw_consumes_scroll_reset() {
        let (mut app, _, _dir) = app(false);
        fill_to_last_step(&mut app);
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(!app.session.take_scroll_reset());
    }
}
