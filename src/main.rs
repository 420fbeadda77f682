use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use redmark::auth::KeyStore;
use redmark::banner::{BannerInfo, print_banner, print_session_summary};
use redmark::commands::{CommandRegistry, CommandResult, LoadedImage, SessionInfo, StateChange};
use redmark::consts::{API_KEY_ENV, DEFAULT_MODEL};
use redmark::flows::Grader;
use redmark::flows::report::GradingRequest;
use redmark::image::DataUri;
use redmark::model::Model;
use redmark::model::gemini::GeminiModel;
use redmark::model::human::HumanModel;
use redmark::roster::memory::InMemoryRoster;
use redmark::roster::{ExamStore, Task};
use redmark::spinner::Spinner;

#[derive(Debug, Clone, ValueEnum)]
enum Provider {
    Human,
    Gemini,
}

#[derive(Parser)]
#[command(name = "redmark", version, about = "A red pen, guided by criteria.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Model provider
    #[arg(short, long, value_enum, default_value_t = Provider::Gemini)]
    provider: Provider,

    /// Model name (provider-specific, ignored for human)
    #[arg(long)]
    model: Option<String>,

    /// Grade a single photo and exit (non-interactive); requires --exam and --task
    #[arg(short, long, value_name = "IMAGE")]
    grade: Option<PathBuf>,

    /// Exam id for --grade
    #[arg(long)]
    exam: Option<String>,

    /// Task id for --grade
    #[arg(long)]
    task: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store an API key in ~/.redmark/api_key
    Set {
        /// The key; prompted for when omitted
        key: Option<String>,
    },
    /// Remove the stored API key
    Clear,
}

/// Mutable REPL state the commands report changes into.
#[derive(Default)]
struct Session {
    exam_id: Option<String>,
    task: Option<Task>,
    image: Option<LoadedImage>,
    report: Option<String>,
}

impl Session {
    fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::OpenExam(id) => {
                // Selecting a different exam drops the task selection
                if self.exam_id.as_deref() != Some(&id) {
                    self.task = None;
                }
                self.exam_id = Some(id);
            }
            StateChange::SelectTask(task) => self.task = Some(task),
            StateChange::Image(image) => self.image = Some(image),
            StateChange::Report(report) => self.report = Some(report),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        match command {
            Command::Key { action } => return handle_key(action),
        }
    }

    // Wire up the model based on provider
    let (model, provider_name, model_name, auth_status): (Box<dyn Model>, &str, String, String) =
        match cli.provider {
            Provider::Human => {
                if cli.model.is_some() {
                    eprintln!("warning: --model is ignored for human provider");
                }
                (Box::new(HumanModel), "human", "—".to_string(), "N/A".to_string())
            }
            Provider::Gemini => {
                let keys = KeyStore::new();
                let auth_status = keys.status(API_KEY_ENV);
                let model_name = cli.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
                let model = Box::new(GeminiModel::new(cli.model.clone(), keys));
                (model, "gemini", model_name, auth_status)
            }
        };

    let grader = Grader::with_stub_relevance(model);
    let roster = Arc::new(InMemoryRoster::seeded());

    // Single grade mode
    if let Some(image_path) = cli.grade {
        let result = run_grade_once(&grader, roster.as_ref(), &image_path, &cli.exam, &cli.task).await;
        if let Err(e) = result {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        print_session_summary(grader.session_usage());
        return Ok(());
    }

    print_banner(&BannerInfo {
        provider: provider_name,
        model: &model_name,
        auth_status: &auth_status,
        exams: roster.list().await?.len(),
    });
    println!("type /help for commands");

    let registry = CommandRegistry::new();
    let mut session = Session::default();

    // REPL — async stdin so Ctrl+C is caught at the prompt too
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nredmark> ");
        io::stdout().flush()?;

        // Read next line, interruptible by Ctrl+C
        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        // Snapshot the open exam for this turn
        let exam = match &session.exam_id {
            Some(id) => roster.get(id).await?,
            None => None,
        };

        let info = SessionInfo {
            provider: provider_name,
            model: &model_name,
            auth_status: &auth_status,
            roster: roster.as_ref(),
            exam: exam.as_ref(),
            task: session.task.as_ref(),
            image: session.image.as_ref(),
            report: session.report.as_deref(),
            usage: grader.session_usage(),
            grader: Some(&grader),
        };

        // Ctrl+C during a command cancels the command, not the REPL
        let result = tokio::select! {
            result = registry.dispatch(input, &info) => result,
            _ = tokio::signal::ctrl_c() => {
                println!("\n\ninterrupted");
                continue;
            }
        };

        match result {
            CommandResult::NotACommand => {
                println!("not a command: {input}");
                println!("type /help for available commands");
            }
            CommandResult::Handled => {}
            CommandResult::StateChanged(change) => session.apply(change),
            CommandResult::Quit => break,
        }
    }

    print_session_summary(grader.session_usage());
    Ok(())
}

/// Non-interactive mode: grade one photo against one task and exit.
async fn run_grade_once(
    grader: &Grader,
    roster: &dyn ExamStore,
    image_path: &PathBuf,
    exam_id: &Option<String>,
    task_id: &Option<String>,
) -> anyhow::Result<()> {
    let (exam_id, task_id) = match (exam_id, task_id) {
        (Some(e), Some(t)) => (e, t),
        _ => anyhow::bail!("--grade requires --exam <id> and --task <id>"),
    };

    let exam = roster
        .get(exam_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unknown exam: {exam_id}"))?;
    let task = exam
        .task(task_id)
        .ok_or_else(|| anyhow::anyhow!("no task {task_id} in {}", exam.name))?;

    let uri = DataUri::from_file(image_path)?;
    if !uri.is_image() {
        anyhow::bail!("{} is not an image file", image_path.display());
    }

    let request = GradingRequest {
        photo_data_uri: uri.to_string(),
        task_criteria: task.criteria.clone(),
    };

    let spinner = Spinner::start("grading");
    let result = grader.grade(&request).await;
    spinner.stop().await;

    let report = result?;
    println!("\n{}", report.report);
    Ok(())
}

fn handle_key(action: &KeyAction) -> anyhow::Result<()> {
    let store = KeyStore::new();
    match action {
        KeyAction::Set { key } => {
            let key = match key {
                Some(key) => key.clone(),
                None => {
                    print!("API key: ");
                    io::stdout().flush()?;
                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;
                    input.trim().to_string()
                }
            };
            if key.is_empty() {
                anyhow::bail!("no API key provided");
            }
            store.set(&key)?;
            println!("✓ API key saved to {}", store.path().display());
        }
        KeyAction::Clear => {
            store.clear()?;
            println!("✓ API key removed.");
        }
    }
    Ok(())
}
