//! SemPlan - semester plan state and validation engine
//!
//! CLI entry point. Commands load the persisted plan, run mutations through
//! the session, and flush through the autosave pipeline before exiting.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use semplan::cli::{Cli, Command, OutputFormat};
use semplan::config::Config;
use semplan::persist::{load_plan, FilePendingStore, FilePlanSink};
use semplan::{catalog, export, AutosaveController, AutosaveStatus, OnboardingData, PlannerSession, Severity};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > RUST_LOG > default (WARN). Logs go to
    // stderr so command output stays pipeable.
    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

fn data_dir(cli: &Cli, config: &Config) -> Result<PathBuf> {
    let dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.storage.resolved_data_dir());
    std::fs::create_dir_all(&dir).context(format!("Failed to create data directory {}", dir.display()))?;
    Ok(dir)
}

/// Build a session from the persisted plan with the autosave pipeline wired
fn open_session(dir: &PathBuf, config: &Config) -> Result<PlannerSession> {
    let plan = load_plan(dir)?.ok_or_else(|| eyre::eyre!("No plan found. Run `sp init` first."))?;

    let sink = Arc::new(FilePlanSink::new(dir));
    let pending = Arc::new(FilePendingStore::open(dir)?);
    let handle = AutosaveController::spawn(config.autosave.clone(), sink, pending);

    Ok(PlannerSession::from_plan(plan, config.undo.capacity)
        .with_autosave(handle)
        .with_max_credits(config.planner.max_credits))
}

/// Flush pending autosave work and report a failed save as an error
async fn flush(session: &PlannerSession) -> Result<()> {
    match session.flush().await {
        Some(AutosaveStatus::Error) => Err(eyre::eyre!("Failed to save the plan")),
        _ => Ok(()),
    }
}

/// Resolve a course argument (id or code) against the catalog
fn resolve_course_id(key: &str) -> Result<String> {
    catalog::find_course(key)
        .map(|c| c.id)
        .ok_or_else(|| eyre::eyre!("Unknown course: {}", key))
}

fn print_violations(violations: &[semplan::ConstraintViolation]) {
    for v in violations {
        let tag = match v.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {}: {}", tag, v.message);
        if let Some(suggestion) = &v.suggestion {
            println!("    {} {}", "hint:".dimmed(), suggestion);
        }
    }
}

fn print_status_text(session: &PlannerSession) {
    let store = session.store();
    let plan = session.plan();
    println!("{}", plan.name.bold());
    println!(
        "  {} courses, {} earned credits, GPA {:.2}",
        store.total_courses(),
        store.earned_credits(),
        store.gpa()
    );
    println!();
    for semester in store.semesters() {
        println!(
            "{} ({}/{} credits)",
            semester.label.cyan(),
            semester.planned_credits(),
            semester.max_credits
        );
        for course in &semester.courses {
            let grade = course.grade.as_deref().map(|g| format!(" [{}]", g)).unwrap_or_default();
            println!("  {} {} ({} cr){}", course.course.code.green(), course.course.title, course.course.credits, grade);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let dir = data_dir(&cli, &config)?;
    debug!(data_dir = %dir.display(), "main: resolved data directory");

    match cli.command {
        Command::Init { year } => {
            let admitted_year = year.unwrap_or(config.planner.admitted_year);
            info!(admitted_year, "Initializing plan");

            let sink = Arc::new(FilePlanSink::new(&dir));
            let pending = Arc::new(FilePendingStore::open(&dir)?);
            let handle = AutosaveController::spawn(config.autosave.clone(), sink, pending);

            let mut session = PlannerSession::new(config.undo.capacity)
                .with_autosave(handle)
                .with_max_credits(config.planner.max_credits);
            session.complete_onboarding(OnboardingData {
                major_id: catalog::cs_major().id,
                catalog_year: catalog::cs_major().catalog_year,
                admitted_year,
                target_graduation: format!("Spring {}", admitted_year + 4),
                completed_courses: Vec::new(),
                existing_gpa: None,
            });
            flush(&session).await?;
            println!(
                "{} Created default plan starting Fall {} ({} semesters)",
                "✓".green(),
                admitted_year,
                session.plan().semesters.len()
            );
        }

        Command::Status { format } => {
            let session = open_session(&dir, &config)?;
            match format {
                OutputFormat::Text => print_status_text(&session),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(session.plan())?),
            }
        }

        Command::Validate { course, semester } => {
            let session = open_session(&dir, &config)?;
            let catalog_course = catalog::find_course(&course).ok_or_else(|| eyre::eyre!("Unknown course: {}", course))?;
            let target = session
                .store()
                .semester(&semester)
                .ok_or_else(|| eyre::eyre!("Unknown semester: {}", semester))?;
            let placed = semplan::PlannedCourse::place(catalog_course, &semester);
            let result = semplan::validate(&placed, target, session.store().semesters());

            if result.violations.is_empty() {
                println!("{} {} fits in {}", "✓".green(), placed.course.code, semester);
            } else {
                print_violations(&result.violations);
            }
            if !result.permitted {
                std::process::exit(1);
            }
        }

        Command::Move { course, from, to, force } => {
            let mut session = open_session(&dir, &config)?;
            let course_id = resolve_course_id(&course)?;

            if !force {
                if let Some(check) = session.check_move(&course_id, &from, &to) {
                    if check.permitted && check.warnings().next().is_some() {
                        print_violations(&check.violations);
                        println!("{}", "Warnings reported. Re-run with --force to apply anyway.".yellow());
                        return Ok(());
                    }
                }
            }

            let outcome = session.propose_move(&course_id, &from, &to);
            print_violations(&outcome.validation.violations);
            if outcome.applied {
                flush(&session).await?;
                println!("{} Moved {} to {}", "✓".green(), course, to);
            } else {
                println!("{} Move rejected", "✗".red());
                std::process::exit(1);
            }
        }

        Command::Add { course, semester } => {
            let mut session = open_session(&dir, &config)?;
            let catalog_course = catalog::find_course(&course).ok_or_else(|| eyre::eyre!("Unknown course: {}", course))?;
            let code = catalog_course.code.clone();

            let outcome = session.propose_add(catalog_course, &semester);
            print_violations(&outcome.validation.violations);
            if outcome.applied {
                flush(&session).await?;
                println!("{} Added {} to {}", "✓".green(), code, semester);
            } else {
                println!("{} Add rejected", "✗".red());
                std::process::exit(1);
            }
        }

        Command::Remove { course, semester } => {
            let mut session = open_session(&dir, &config)?;
            let course_id = resolve_course_id(&course)?;

            if session.remove_course(&course_id, &semester) {
                flush(&session).await?;
                println!("{} Removed {} from {}", "✓".green(), course, semester);
            } else {
                println!("{} not found in {}", course, semester);
            }
        }

        Command::Complete { course, grade } => {
            let mut session = open_session(&dir, &config)?;
            let course_id = resolve_course_id(&course)?;

            if session.mark_completed(&course_id, &grade) {
                flush(&session).await?;
                println!(
                    "{} Completed {} with grade {} (GPA now {:.2})",
                    "✓".green(),
                    course,
                    grade,
                    session.store().gpa()
                );
            } else {
                return Err(eyre::eyre!("{} is not placed in the plan", course));
            }
        }

        Command::Undo => {
            let mut session = open_session(&dir, &config)?;
            match session.undo() {
                Some(description) => {
                    flush(&session).await?;
                    println!("{} Undid: {}", "✓".green(), description);
                }
                None => println!("Nothing to undo"),
            }
        }

        Command::Export { output, courses } => {
            let session = open_session(&dir, &config)?;
            let selected: Vec<String> = courses
                .iter()
                .map(|c| resolve_course_id(c))
                .collect::<Result<_>>()?;
            let sections = catalog::sample_sections();
            let ics = export::export_plan(session.store().semesters(), &sections, &selected);
            std::fs::write(&output, &ics).context(format!("Failed to write {}", output.display()))?;
            println!("{} Exported calendar to {}", "✓".green(), output.display());
        }

        Command::Catalog { format } => match format {
            OutputFormat::Text => {
                for course in catalog::course_catalog() {
                    let prereqs = if course.prerequisites.is_empty() {
                        String::new()
                    } else {
                        format!(" (requires {})", course.prerequisites.join(", "))
                    };
                    println!("{} {} - {} cr{}", course.code.green(), course.title, course.credits, prereqs);
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog::course_catalog())?),
        },
    }

    Ok(())
}
