//! `coach` command: an interactive session in the terminal

use crate::claude::ClaudeClient;
use crate::cli::render::{print_comparison, print_criteria_to, print_error, print_header};
use crate::client::ApiClient;
use crate::coaching::CoachingService;
use crate::config::AppConfig;
use crate::model::{ContextField, Criterion, SelfAssessment};
use crate::session::{compare, CoachingBackend, Progress, Session, SessionManager};
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input, Select};
use std::io::{self, BufRead};
use tracing::{debug, info};

const SUBMIT: &str = "Submit a draft";
const NOTE: &str = "Add or edit a note on a criterion";
const RESET: &str = "Start over with a new piece";
const QUIT: &str = "Quit";

const REVISE: &str = "Revise the last assessed draft in your editor";
const FROM_FILE: &str = "Read a draft from a file";
const TYPE_IT: &str = "Type a new draft here";

pub async fn run_coach_command(config: AppConfig, server: Option<String>) -> Result<()> {
    match server {
        Some(url) => {
            let client = ApiClient::new(url)?;
            info!("Coaching through {}", client.base_url());
            coach(SessionManager::new(client)).await
        }
        None => {
            let service = CoachingService::new(ClaudeClient::from_config(&config)?, &config)?;
            service
                .ensure_ready()
                .context("Set ANTHROPIC_API_KEY or pass --server")?;
            coach(SessionManager::new(service)).await
        }
    }
}

async fn coach<B: CoachingBackend>(mut manager: SessionManager<B>) -> Result<()> {
    print_header("WRITING GYM")?;

    loop {
        gather_context(&mut manager).await?;
        if !practice(&mut manager).await? {
            return Ok(());
        }
        manager.reset();
        println!();
    }
}

fn question(field: ContextField) -> &'static str {
    match field {
        ContextField::Audience => "Who is this for?",
        ContextField::Intent => "What should they do, think or feel after reading it?",
        ContextField::Concerns => "What are you worried about getting wrong?",
        ContextField::Type => "What kind of writing is it (email, essay, post...)?",
    }
}

/// Ask the pre-draft questions until criteria come back
async fn gather_context<B: CoachingBackend>(manager: &mut SessionManager<B>) -> Result<()> {
    let theme = ColorfulTheme::default();

    loop {
        let mut context = manager.session().context().clone();
        for field in ContextField::ALL {
            let answer: String = Input::with_theme(&theme)
                .with_prompt(question(field))
                .with_initial_text(context.get(field))
                .interact_text()?;
            context.set(field, answer);
        }
        manager.update_context(context)?;

        println!("\nWorking out what good looks like for this piece...");
        match manager.submit_context().await {
            Ok(Progress::CriteriaReady) => {
                println!();
                print_criteria_to(&mut io::stdout(), manager.session().criteria())?;
                return Ok(());
            }
            Ok(Progress::RequestFailed { message }) => {
                print_error(&format!("Could not extract criteria: {message}"));
                let retry = Confirm::with_theme(&theme)
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !retry {
                    bail!("No criteria to practise against");
                }
            }
            Ok(other) => debug!("Unexpected progress after context: {:?}", other),
            Err(e) => print_error(&e.to_string()),
        }
    }
}

/// Draft loop. Returns `true` when the writer asked to start over.
async fn practice<B: CoachingBackend>(manager: &mut SessionManager<B>) -> Result<bool> {
    let theme = ColorfulTheme::default();
    let options = [SUBMIT, NOTE, RESET, QUIT];

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&options)
            .default(0)
            .interact()?;

        match options[choice] {
            SUBMIT => submit_draft(manager).await?,
            NOTE => edit_note(manager)?,
            RESET => {
                let confirmed = Confirm::with_theme(&theme)
                    .with_prompt("Discard this session and all its drafts?")
                    .default(false)
                    .interact()?;
                if confirmed {
                    return Ok(true);
                }
            }
            _ => return Ok(false),
        }
    }
}

async fn submit_draft<B: CoachingBackend>(manager: &mut SessionManager<B>) -> Result<()> {
    let Some(draft) = recover(read_draft(revision_seed(manager.session())).await) else {
        return Ok(());
    };

    let progress = match manager.submit_draft(&draft).await {
        Ok(progress) => progress,
        Err(e) => {
            print_error(&e.to_string());
            return Ok(());
        }
    };

    let progress = match progress {
        Progress::AwaitingSelfAssessment { iteration_id } => {
            println!("\nBefore the coach weighs in, rate your own draft.");
            loop {
                let scores = ask_self_assessment(manager.session().criteria())?;
                println!("\nAssessing...");
                match manager.submit_self_assessment(iteration_id, scores).await {
                    Ok(progress) => break progress,
                    Err(e) => print_error(&e.to_string()),
                }
            }
        }
        other => other,
    };

    match progress {
        Progress::Assessed { iteration_id } => {
            println!();
            if let Some(comparison) = compare(manager.session(), iteration_id) {
                print_comparison(&comparison)?;
            }
        }
        Progress::RequestFailed { message } => {
            print_error(&format!("Assessment failed: {message}"));
            println!("Your draft is kept. Submit it again to retry.");
        }
        other => debug!("Unexpected progress after draft: {:?}", other),
    }
    Ok(())
}

/// Show a failed step without ending the session
fn recover<T>(result: Result<T>) -> Option<T> {
    result.map_err(|e| print_error(&format!("{e:#}"))).ok()
}

/// The last assessed draft, which a new revision starts from
fn revision_seed(session: &Session) -> Option<&str> {
    let draft = session.working_draft();
    (!draft.trim().is_empty()).then_some(draft)
}

fn draft_sources(seed: Option<&str>) -> Vec<&'static str> {
    match seed {
        Some(_) => vec![REVISE, FROM_FILE, TYPE_IT],
        None => vec![FROM_FILE, TYPE_IT],
    }
}

async fn read_draft(seed: Option<&str>) -> Result<String> {
    let sources = draft_sources(seed);
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Where is the draft?")
        .items(&sources)
        .default(0)
        .interact()?;

    match (sources[choice], seed) {
        (REVISE, Some(seed)) => revise_in_editor(seed),
        (FROM_FILE, _) => read_draft_file().await,
        _ => type_draft(),
    }
}

fn revise_in_editor(seed: &str) -> Result<String> {
    match Editor::new().extension(".md").edit(seed)? {
        Some(draft) => Ok(draft),
        None => bail!("Editor closed without saving; nothing was submitted"),
    }
}

async fn read_draft_file() -> Result<String> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Draft file")
        .interact_text()?;

    load_draft(path.trim()).await
}

async fn load_draft(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read draft from {path}"))
}

/// Typed in and ended with a lone `.`
fn type_draft() -> Result<String> {
    println!("Type your draft. Finish with a line containing only '.'");
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim() == "." {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn ask_self_assessment(criteria: &[Criterion]) -> Result<SelfAssessment> {
    let theme = ColorfulTheme::default();
    let mut scores = SelfAssessment::new();

    for criterion in criteria {
        let scale = criterion.scale;
        let score: u8 = Input::with_theme(&theme)
            .with_prompt(format!(
                "{} ({}-{})",
                criterion.description, scale.min, scale.max
            ))
            .validate_with(|score: &u8| -> std::result::Result<(), String> {
                if scale.contains(i64::from(*score)) {
                    Ok(())
                } else {
                    Err(format!("Pick a score from {} to {}", scale.min, scale.max))
                }
            })
            .interact_text()?;
        scores.insert(criterion.id.clone(), score);
    }
    Ok(scores)
}

fn edit_note<B: CoachingBackend>(manager: &mut SessionManager<B>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let criteria = manager.session().criteria().to_vec();
    let items: Vec<&str> = criteria.iter().map(|c| c.description.as_str()).collect();

    let index = Select::with_theme(&theme)
        .with_prompt("Which criterion?")
        .items(&items)
        .default(0)
        .interact()?;
    let criterion = &criteria[index];

    let current = manager
        .session()
        .criterion_notes()
        .get(&criterion.id)
        .cloned()
        .unwrap_or_default();
    let note: String = Input::with_theme(&theme)
        .with_prompt("Note for the coach (blank removes it)")
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;

    manager.set_note(&criterion.id, &note)?;
    Ok(())
}
