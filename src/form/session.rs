//! Form session: step navigation, validation and the submission state machine
//!
//! The session owns all mutable form state and exposes it through an explicit
//! command interface. It knows nothing about terminals; the UI layer maps
//! key events onto these commands and renders the resulting state.

use std::collections::BTreeSet;

use super::error::{SchemaError, SubmitError, SubmitRejected};
use super::field::{FieldEdit, FieldState};
use super::progress::Progress;
use super::schema::{FormSchema, StepSpec};
use super::submission::{FormTransport, SubmissionStatus, SubmitControl, SUBMIT_LABEL};

/// Shared banner shown at the top of a step that failed validation
pub const ERROR_BANNER: &str = "Please fill in all required fields correctly.";

/// What pressing Enter resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    /// Moved to the next step
    Advanced,
    /// Stayed put because the current step is invalid
    Blocked,
    /// On the final step; the caller should start a submission
    Submit,
    /// Nothing to do (form already submitted)
    Ignored,
}

/// Alert text for a failed submission
pub fn failure_alert(fallback_contact: &str) -> String {
    format!(
        "There was an error submitting your form. Please try again or contact me directly at {fallback_contact}"
    )
}

/// In-memory state of one multi-step form
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: FormSchema,
    current_step: usize,
    fields: Vec<FieldState>,
    banners: BTreeSet<usize>,
    /// Position of the focused field within the current step
    focus: usize,
    status: SubmissionStatus,
    control: SubmitControl,
    alert: Option<String>,
    scroll_reset: bool,
    fallback_contact: String,
}

impl FormSession {
    /// Start a session if a usable schema is present.
    ///
    /// Absent or invalid definitions yield `None`; nothing else happens.
    pub fn init(schema: Option<FormSchema>, fallback_contact: &str) -> Option<Self> {
        let Some(schema) = schema else {
            tracing::warn!("No form definition present; form is inactive");
            return None;
        };
        match Self::new(schema, fallback_contact) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Form definition rejected; form is inactive");
                None
            }
        }
    }

    /// Build a session from a schema, checking its contract first
    pub fn new(schema: FormSchema, fallback_contact: &str) -> Result<Self, SchemaError> {
        schema.check()?;

        let fields = schema
            .steps
            .iter()
            .flat_map(|step| {
                step.fields
                    .iter()
                    .map(move |spec| FieldState::new(spec.clone(), step.index))
            })
            .collect();

        tracing::debug!(
            form = %schema.name,
            steps = schema.total_steps(),
            "Form session initialized"
        );

        Ok(Self {
            schema,
            current_step: 1,
            fields,
            banners: BTreeSet::new(),
            focus: 0,
            status: SubmissionStatus::NotSubmitted,
            control: SubmitControl::new(SUBMIT_LABEL),
            alert: None,
            scroll_reset: false,
            fallback_contact: fallback_contact.to_string(),
        })
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.schema.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    pub fn step_spec(&self, step: usize) -> Option<&StepSpec> {
        step.checked_sub(1).and_then(|i| self.schema.steps.get(i))
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    /// Global indices of the fields that belong to `step`
    pub fn step_field_indices(&self, step: usize) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.step == step)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn submit_control(&self) -> &SubmitControl {
        &self.control
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn has_banner(&self, step: usize) -> bool {
        self.banners.contains(&step)
    }

    /// The form is hidden once a submission succeeds
    pub fn form_visible(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn success_visible(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn progress(&self) -> Progress {
        Progress::at(self.current_step, self.total_steps())
    }

    /// Consume a pending scroll-to-top request
    pub fn take_scroll_reset(&mut self) -> bool {
        std::mem::take(&mut self.scroll_reset)
    }

    // ─── Focus ─────────────────────────────────────────────────────────────

    /// Global index of the focused field
    pub fn focused_field(&self) -> Option<usize> {
        self.step_field_indices(self.current_step)
            .get(self.focus)
            .copied()
    }

    pub fn focus_next(&mut self) {
        let count = self.step_field_indices(self.current_step).len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.step_field_indices(self.current_step).len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Focus a field by global index; ignored if it is not on the current step
    pub fn set_focus(&mut self, field_idx: usize) {
        if let Some(pos) = self
            .step_field_indices(self.current_step)
            .iter()
            .position(|&i| i == field_idx)
        {
            self.focus = pos;
        }
    }

    fn enter_step(&mut self, step: usize) {
        self.current_step = step;
        self.focus = 0;
        self.scroll_reset = true;
    }

    // ─── Validation ────────────────────────────────────────────────────────

    /// Check the required fields of `step`, updating flags and the banner.
    ///
    /// Steps outside `1..=total_steps` are considered valid.
    pub fn validate(&mut self, step: usize) -> bool {
        if step == 0 || step > self.total_steps() {
            return true;
        }

        let mut first_invalid = None;
        for (i, field) in self.fields.iter_mut().enumerate() {
            if field.step != step {
                continue;
            }
            let invalid = field.has_error();
            field.set_flagged(invalid);
            if invalid && first_invalid.is_none() {
                first_invalid = Some(i);
            }
        }

        match first_invalid {
            Some(idx) => {
                self.banners.insert(step);
                if step == self.current_step {
                    self.set_focus(idx);
                }
                tracing::debug!(
                    step,
                    field = self.fields[idx].name(),
                    "Step failed validation"
                );
                false
            }
            None => {
                self.banners.remove(&step);
                true
            }
        }
    }

    // ─── Navigation ────────────────────────────────────────────────────────

    /// Move forward one step if the current step validates
    pub fn advance(&mut self) -> bool {
        if !self.form_visible() {
            return false;
        }
        if !self.validate(self.current_step) {
            return false;
        }
        let next = (self.current_step + 1).min(self.total_steps());
        self.enter_step(next);
        tracing::debug!(step = next, "Advanced");
        true
    }

    /// Move back one step; never validates
    pub fn retreat(&mut self) -> bool {
        if !self.form_visible() || self.current_step <= 1 {
            return false;
        }
        let prev = self.current_step - 1;
        self.enter_step(prev);
        tracing::debug!(step = prev, "Retreated");
        true
    }

    /// Interpret Enter: advance on intermediate steps, submit on the last
    pub fn on_enter(&mut self) -> EnterAction {
        if !self.form_visible() {
            EnterAction::Ignored
        } else if self.is_last_step() {
            EnterAction::Submit
        } else if self.advance() {
            EnterAction::Advanced
        } else {
            EnterAction::Blocked
        }
    }

    // ─── Editing ───────────────────────────────────────────────────────────

    /// Apply an edit to a field, clearing its error flag once the value changes.
    ///
    /// Returns true if the value changed.
    pub fn input(&mut self, field_idx: usize, edit: FieldEdit) -> bool {
        if !self.form_visible() {
            return false;
        }
        let Some(field) = self.fields.get_mut(field_idx) else {
            return false;
        };
        let changed = field.apply(edit);

        if changed && field.is_flagged() {
            field.set_flagged(false);
            let step = field.step;
            if !self.fields.iter().any(|f| f.step == step && f.is_flagged()) {
                self.banners.remove(&step);
            }
        }
        changed
    }

    /// Apply an edit to the focused field
    pub fn input_focused(&mut self, edit: FieldEdit) -> bool {
        match self.focused_field() {
            Some(idx) => self.input(idx, edit),
            None => false,
        }
    }

    /// Move between lines of the focused multi-line field
    pub fn move_focused_line(&mut self, down: bool) -> bool {
        if !self.form_visible() {
            return false;
        }
        match self.focused_field() {
            Some(idx) => self.fields[idx].move_line(down),
            None => false,
        }
    }

    /// Replace a field's value by name; returns false for unknown names
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter().position(|f| f.name() == name) {
            Some(idx) => {
                self.input(idx, FieldEdit::Set(value.to_string()));
                true
            }
            None => false,
        }
    }

    // ─── Submission ────────────────────────────────────────────────────────

    /// All pairs sent with a submission: hidden fields first, then declared fields
    pub fn payload(&self) -> Vec<(String, String)> {
        self.schema
            .hidden
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(
                self.fields
                    .iter()
                    .map(|f| (f.name().to_string(), f.value().to_string())),
            )
            .collect()
    }

    /// Enter `Submitting` and hand back the payload to send
    pub fn begin_submit(&mut self) -> Result<Vec<(String, String)>, SubmitRejected> {
        self.status.can_begin()?;
        if !self.is_last_step() {
            return Err(SubmitRejected::NotOnFinalStep);
        }
        if !self.validate(self.current_step) {
            return Err(SubmitRejected::Invalid);
        }

        self.status = SubmissionStatus::Submitting;
        self.control.lock();
        self.alert = None;
        tracing::info!(form = %self.schema.name, "Submitting form");
        Ok(self.payload())
    }

    /// Record the outcome of the in-flight request
    pub fn complete_submit(&mut self, result: Result<(), SubmitError>) {
        if self.status != SubmissionStatus::Submitting {
            tracing::warn!(
                status = self.status.label(),
                "Ignoring submission result with nothing in flight"
            );
            return;
        }

        match result {
            Ok(()) => {
                self.status = SubmissionStatus::Succeeded;
                self.control.loading = false;
                self.scroll_reset = true;
                tracing::info!(form = %self.schema.name, "Form submitted");
            }
            Err(e) => {
                self.status = SubmissionStatus::Failed;
                self.control.restore();
                self.alert = Some(failure_alert(&self.fallback_contact));
                tracing::error!(form = %self.schema.name, error = %e, "Form submission failed");
            }
        }
    }

    /// Run one full submission through `transport`
    pub async fn submit(
        &mut self,
        transport: &dyn FormTransport,
    ) -> Result<SubmissionStatus, SubmitRejected> {
        let payload = self.begin_submit()?;
        tracing::debug!(
            destination = transport.destination(),
            fields = payload.len(),
            "Posting form"
        );
        let result = transport.post_form(&payload).await;
        self.complete_submit(result);
        Ok(self.status)
    }
}
