//! `telephone` — classroom CLI over a persisted game session.
//!
//! Game output is JSON on stdout; logs go to stderr through `tracing`
//! (`RUST_LOG`, default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use telephone_engine::catalog::PROMPT_RECIPE;
use telephone_engine::{resolve_task, route, Participant, Route, TaskDescriptor};
use telephone_runtime::access::AccessGate;
use telephone_runtime::config::RuntimeConfig;
use telephone_runtime::dashboard::{chain_detail, class_progress};
use telephone_runtime::generator::{ArtifactGenerator, DigestGenerator};
use telephone_runtime::picker::Picker;
use telephone_runtime::replay::verify_determinism;
use telephone_runtime::session::{Session, TurnDraft};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Visual telephone classroom game", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `data_dir` from the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Overrides `session_id` from the configuration
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what a group should be doing right now
    Status {
        #[arg(long = "as")]
        participant: Participant,
    },
    /// Generate an artifact from a prompt and submit it as the group's turn
    Submit {
        #[arg(long = "as")]
        participant: Participant,
        #[arg(long)]
        prompt: String,
        /// Round the group saw; defaults to its current active round
        #[arg(long)]
        round: Option<usize>,
        /// Project the group saw; required together with --round
        #[arg(long, requires = "round")]
        project: Option<String>,
    },
    /// Class progress, or one chain with --project
    Dashboard {
        #[arg(long)]
        passcode: String,
        #[arg(long)]
        project: Option<String>,
    },
    /// Discard every turn of the session
    Reset {
        #[arg(long)]
        passcode: String,
        /// Confirm the reset
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Replay the event log twice and print the state hash
    Replay,
    /// Print the four-part prompt formula
    Guide,
    /// Pick a random student who has not been picked yet
    Pick {
        #[arg(long)]
        section: String,
    },
    /// Picked / total for a section
    PickStatus {
        #[arg(long)]
        section: String,
    },
    /// Put every student of a section back in the draw
    PickReset {
        #[arg(long)]
        section: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = RuntimeConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(session) = args.session {
        config.session_id = session;
    }

    run(args.command, &config)
}

fn open_session(config: &RuntimeConfig) -> Result<Session> {
    Session::open(
        &config.data_dir,
        &config.session_id,
        config.snapshot_interval,
    )
    .with_context(|| format!("opening session {:?}", config.session_id))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: &RuntimeConfig) -> Result<()> {
    let gate = AccessGate::new(config.teacher_passcode.as_str());

    match command {
        Command::Status { participant } => {
            let session = open_session(config)?;
            match route(participant, session.state())? {
                Route::Dashboard => print_json(&class_progress(session.state()))?,
                Route::Task(task) => {
                    print_json(&serde_json::json!({
                        "participant": participant,
                        "task": task,
                        "theme": task.theme(),
                        "blocked_by": task.blocked_by().map(|(round, group)| {
                            serde_json::json!({ "round": round, "group": group })
                        }),
                    }))?;
                }
            }
        }

        Command::Submit {
            participant,
            prompt,
            round,
            project,
        } => {
            let mut session = open_session(config)?;
            let generator = DigestGenerator::new(config.prompt_suffix.as_str());
            let artifact = generator
                .generate(&prompt)
                .context("artifact generation failed")?;
            let draft = TurnDraft {
                author: participant,
                prompt: prompt.trim().to_string(),
                artifact,
            };

            let result = match (project, round) {
                (Some(project), Some(round)) => session.submit(&project, round, draft)?,
                (None, Some(round)) => {
                    let project = match resolve_task(participant, session.state())? {
                        TaskDescriptor::Active { project, .. }
                        | TaskDescriptor::Waiting { project, .. } => project.id.clone(),
                        TaskDescriptor::Complete => bail!("{participant} has no turns left"),
                    };
                    session.submit(&project, round, draft)?
                }
                _ => session.submit_current(draft)?,
            };
            print_json(&result)?;
        }

        Command::Dashboard { passcode, project } => {
            gate.select_role(Participant::Teacher, Some(&passcode))?;
            let session = open_session(config)?;
            match project {
                Some(id) => match chain_detail(session.state(), &id) {
                    Some(steps) => print_json(&steps)?,
                    None => bail!("unknown project {id:?}"),
                },
                None => print_json(&class_progress(session.state()))?,
            }
        }

        Command::Reset { passcode, yes } => {
            gate.check(&passcode)?;
            if !yes {
                bail!("reset discards every turn of {:?}; pass --yes to confirm", config.session_id);
            }
            let mut session = open_session(config)?;
            print_json(&session.reset()?)?;
        }

        Command::Replay => {
            let session = open_session(config)?;
            let events = session.events()?;
            let hash = verify_determinism(&events)?;
            if hash != session.current_hash() {
                bail!("replayed hash {hash} differs from live state {}", session.current_hash());
            }
            info!(events = events.len(), hash = %hash, "replay verified");
            print_json(&serde_json::json!({
                "session": session.session_id(),
                "events": events.len(),
                "hash": hash,
            }))?;
        }

        Command::Guide => {
            println!("Subject + Style + Material + Vibe\n");
            for category in &PROMPT_RECIPE {
                println!("{} ({})", category.name, category.description);
                println!("  {}\n", category.examples.join(", "));
            }
        }

        Command::Pick { section } => {
            let mut picker = Picker::open(&config.picker_history_path(), config.sections.clone())?;
            let spin = picker.spin(&section, &mut rand::thread_rng())?;
            print_json(&spin)?;
        }

        Command::PickStatus { section } => {
            let picker = Picker::open(&config.picker_history_path(), config.sections.clone())?;
            let (picked, total) = picker.status(&section)?;
            print_json(&serde_json::json!({
                "section": section,
                "picked": picked,
                "total": total,
                "available": picker.available(&section)?,
            }))?;
        }

        Command::PickReset { section } => {
            let mut picker = Picker::open(&config.picker_history_path(), config.sections.clone())?;
            picker.reset_section(&section)?;
            println!("section {section} reset");
        }
    }

    Ok(())
}
