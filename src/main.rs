use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use client_brief::app::App;
use client_brief::config::Config;
use client_brief::form::{FormSchema, FormSession, HttpTransport, SubmissionStatus};
use client_brief::headless;
use client_brief::logging;
use client_brief::theme::{Theme, ThemeStore};

#[derive(Parser)]
#[command(name = "client-brief")]
#[command(about = "Multi-step client brief form for the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in and submit the form from an answers file
    Submit {
        /// TOML table of field name to value
        #[arg(short, long)]
        answers: PathBuf,

        /// Print the payload instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show or change the light/dark preference
    Theme {
        #[arg(value_enum, default_value_t = ThemeCommand::Show)]
        action: ThemeCommand,
    },

    /// Validate a form definition
    Check {
        /// Definition to check (defaults to the configured one)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Print the definition as TOML
        #[arg(long)]
        print: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeCommand {
    Show,
    Toggle,
    Dark,
    Light,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Submit { answers, dry_run }) => {
            cmd_submit(&config, &answers, dry_run).await?;
        }
        Some(Commands::Theme { action }) => {
            cmd_theme(&config, action)?;
        }
        Some(Commands::Check { schema, print }) => {
            cmd_check(&config, schema, print)?;
        }
        None => {
            run_tui(config, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let schema = match config.form_schema() {
        Ok(schema) => Some(schema),
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Form definition unavailable");
            None
        }
    };

    let Some(session) = FormSession::init(schema, &config.contact.fallback) else {
        eprintln!("No usable form definition found; nothing to show.");
        return Ok(());
    };

    let transport = Arc::new(HttpTransport::new(
        &config.endpoint.origin,
        &config.endpoint.path,
    ));
    let mut app = App::new(config, session, transport);
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

async fn cmd_submit(config: &Config, answers_path: &Path, dry_run: bool) -> Result<()> {
    let schema = config.form_schema()?;
    let mut session =
        FormSession::new(schema, &config.contact.fallback).context("Invalid form definition")?;
    let answers = headless::load_answers(answers_path)?;

    if dry_run {
        headless::apply_answers(&mut session, &answers)?;
        headless::walk_to_last_step(&mut session)?;
        let payload = session
            .begin_submit()
            .map_err(|reason| anyhow::anyhow!("Submission rejected: {reason}"))?;
        for (name, value) in payload {
            println!("{name}={value}");
        }
        return Ok(());
    }

    let transport = HttpTransport::new(&config.endpoint.origin, &config.endpoint.path);
    println!("Submitting to {}", transport.url());

    match headless::submit_answers(&mut session, &answers, &transport).await? {
        SubmissionStatus::Succeeded => {
            println!("{}", session.schema().success_title);
            println!("{}", session.schema().success_message);
            Ok(())
        }
        status => {
            let message = session.alert().unwrap_or("Submission failed").to_string();
            eprintln!("{message}");
            bail!("Submission ended as {}", status.label())
        }
    }
}

fn cmd_theme(config: &Config, action: ThemeCommand) -> Result<()> {
    let store = ThemeStore::new(&config.state_path());
    let current = store.resolve(config.ui.default_theme);

    let theme = match action {
        ThemeCommand::Show => {
            if store.stored().ok().flatten().is_some() {
                println!("{current} (saved in {})", store.path().display());
                return Ok(());
            }
            let source = if Theme::system_preference().is_some() {
                "terminal"
            } else {
                "default"
            };
            println!("{current} ({source})");
            return Ok(());
        }
        ThemeCommand::Toggle => store.toggle(current)?,
        ThemeCommand::Dark => {
            store.save(Theme::Dark)?;
            Theme::Dark
        }
        ThemeCommand::Light => {
            store.save(Theme::Light)?;
            Theme::Light
        }
    };

    println!("Theme set to {theme}");
    Ok(())
}

fn cmd_check(config: &Config, schema_path: Option<PathBuf>, print: bool) -> Result<()> {
    let schema = match schema_path {
        Some(path) => FormSchema::load(&path)?,
        None => config.form_schema()?,
    };

    if print {
        print!("{}", schema.to_toml()?);
        return Ok(());
    }

    println!(
        "Form '{}' is valid ({} steps)",
        schema.name,
        schema.total_steps()
    );
    println!("{}", "─".repeat(60));
    for step in &schema.steps {
        println!("{}. {}", step.index, step.title);
        for field in &step.fields {
            let marker = if field.required { "*" } else { " " };
            println!("   {marker} {} ({:?})", field.name, field.kind);
        }
    }
    if !schema.hidden.is_empty() {
        println!("Hidden:");
        for (key, value) in &schema.hidden {
            println!("   {key}={value}");
        }
    }

    Ok(())
}
