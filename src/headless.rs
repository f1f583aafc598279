//! Non-interactive form filling from an answers file
//!
//! Answers are a flat TOML table of field name to value. The session is driven
//! through the same commands the terminal uses, so validation and the
//! submission lifecycle behave identically.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::form::{FormSession, FormTransport, SubmissionStatus};

pub type Answers = BTreeMap<String, String>;

pub fn load_answers(path: &Path) -> Result<Answers> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid answers file {}", path.display()))
}

/// Copy answers into the session; unknown names are an error
pub fn apply_answers(session: &mut FormSession, answers: &Answers) -> Result<()> {
    for (name, value) in answers {
        if !session.set_value(name, value) {
            bail!("Answers file sets unknown field '{name}'");
        }
    }
    Ok(())
}

/// Names of flagged fields on the current step
fn flagged_on_current_step(session: &FormSession) -> Vec<String> {
    session
        .step_field_indices(session.current_step())
        .into_iter()
        .map(|i| &session.fields()[i])
        .filter(|f| f.is_flagged())
        .map(|f| f.name().to_string())
        .collect()
}

/// Advance through every step, stopping at the first invalid one
pub fn walk_to_last_step(session: &mut FormSession) -> Result<()> {
    while !session.is_last_step() {
        if !session.advance() {
            let step = session.current_step();
            let title = session
                .step_spec(step)
                .map(|s| s.title.clone())
                .unwrap_or_default();
            bail!(
                "Step {step} ({title}) is incomplete: {}",
                flagged_on_current_step(session).join(", ")
            );
        }
    }
    Ok(())
}

/// Fill, validate and submit a session once
pub async fn submit_answers(
    session: &mut FormSession,
    answers: &Answers,
    transport: &dyn FormTransport,
) -> Result<SubmissionStatus> {
    apply_answers(session, answers)?;
    walk_to_last_step(session)?;

    match session.submit(transport).await {
        Ok(status) => Ok(status),
        Err(reason) => {
            let flagged = flagged_on_current_step(session);
            if flagged.is_empty() {
                bail!("Submission rejected: {reason}");
            }
            bail!("Submission rejected: {reason} ({})", flagged.join(", "))
        }
    }
}
