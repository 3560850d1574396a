//! Command-line interface for the FitFusion coaching API.
//!
//! The session cookie lives in the process cookie jar only (cookie
//! persistence is out of scope), so commands that need an authenticated
//! session take `--username`/`--password` and log in first. The interactive
//! chat mode keeps the session alive across turns.

mod metrics;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use fitfusion_api::{FitnessContent, ProfileBundle, RegisterRequest};
use fitfusion_config::Config;
use fitfusion_core::{Coach, Flight};
use render::SnapshotPrinter;

#[derive(Parser)]
#[command(name = "fitfusion", version, about = "Client for the FitFusion coaching API")]
struct Cli {
    /// Override the API base URL from config / environment.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Username to authenticate with before running the command.
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Password for --username.
    #[arg(short, long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify credentials against the API.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session.
    Logout,
    /// Create an account.
    Register(RegisterArgs),
    /// Show a section of your profile.
    Profile {
        #[arg(value_enum, default_value_t = ProfileSection::Basic)]
        section: ProfileSection,
    },
    /// Show the combined profile setup, or apply one from a YAML file.
    Setup {
        /// YAML file with the profile bundle to apply; omit to show the
        /// current state.
        #[arg(long)]
        apply: Option<PathBuf>,
    },
    /// Manage fitness content (admin session required).
    #[command(subcommand)]
    Content(ContentCommand),
    /// Semantic search over the content library.
    Search {
        query: String,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
    },
    /// Ask the AI coach. With no query, starts an interactive session.
    Chat { query: Option<String> },
    /// Fetch personalized recommendations.
    Recommend,
}

#[derive(Args)]
struct RegisterArgs {
    username: String,
    email: String,
    #[arg(long)]
    password: String,
    /// Confirmation; defaults to --password.
    #[arg(long)]
    password2: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long)]
    gender: Option<String>,
    /// Height in cm.
    #[arg(long)]
    height: Option<u32>,
    /// Weight in kg.
    #[arg(long)]
    weight: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileSection {
    Basic,
    Physical,
    Fitness,
    Dietary,
    Detail,
}

#[derive(Subcommand)]
enum ContentCommand {
    /// List content, optionally filtered.
    List {
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        difficulty: Option<i32>,
    },
    /// Show one content entry.
    Get { id: u64 },
    /// Create a content entry from a YAML file.
    Add {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update a content entry from a YAML file.
    Update {
        id: u64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a content entry.
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    tracing::debug!(base_url = %config.api.base_url, "using api base url");
    let coach = Coach::from_config(&config)?;

    if let (Some(username), Some(password)) = (&cli.username, &cli.password) {
        coach.client().login(username, password).await?;
    }

    match cli.command {
        Command::Login { username, password } => {
            coach.client().login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            if coach.client().logout().await {
                println!("Logged out");
            } else {
                println!("Logout failed");
            }
        }
        Command::Register(args) => {
            let request = register_request(args);
            let response = coach.client().register(&request).await?;
            println!("{}", response.message);
            if let Some(next_steps) = response.next_steps {
                println!("{}", next_steps);
            }
        }
        Command::Profile { section } => {
            let client = coach.client();
            let rendered = match section {
                ProfileSection::Basic => pretty(&client.profile().await?)?,
                ProfileSection::Physical => pretty(&client.physical_profile().await?)?,
                ProfileSection::Fitness => pretty(&client.fitness_profile().await?)?,
                ProfileSection::Dietary => pretty(&client.dietary_profile().await?)?,
                ProfileSection::Detail => pretty(&client.user_details().await?)?,
            };
            println!("{}", rendered);
        }
        Command::Setup { apply } => match apply {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let bundle: ProfileBundle = serde_yaml::from_str(&contents)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                let summary = coach.client().submit_profile_setup(&bundle).await?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            None => {
                let bundle = coach.client().profile_setup().await?;
                println!("{}", pretty(&bundle)?);
            }
        },
        Command::Content(command) => run_content(&coach, command).await?,
        Command::Search {
            query,
            content_type,
            difficulty,
        } => {
            let hits = coach
                .client()
                .search(&query, content_type.as_deref(), difficulty.as_deref())
                .await?;
            if hits.is_empty() {
                println!("No results found. Try a different search query.");
            }
            for hit in hits {
                println!("{} (score {:.2})", hit.metadata.title, hit.score);
                if !hit.metadata.description.is_empty() {
                    println!("  {}", hit.metadata.description);
                }
            }
        }
        Command::Chat { query } => match query {
            Some(query) => ask_once(&coach, &query).await?,
            None => chat_loop(&coach).await?,
        },
        Command::Recommend => match coach.recommendations().await? {
            Flight::Completed(set) => println!("{}", pretty(&set)?),
            Flight::Skipped => {
                println!("Recommendation request already in progress, skipping duplicate call")
            }
        },
    }

    Ok(())
}

fn register_request(args: RegisterArgs) -> RegisterRequest {
    RegisterRequest {
        username: args.username,
        email: args.email,
        password2: args.password2.unwrap_or_else(|| args.password.clone()),
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        age: args.age,
        gender: args.gender,
        height: args.height,
        weight: args.weight,
        ..Default::default()
    }
}

async fn run_content(coach: &Coach, command: ContentCommand) -> Result<()> {
    let client = coach.client();
    match command {
        ContentCommand::List {
            content_type,
            difficulty,
        } => {
            let items = client.list_content(content_type.as_deref(), difficulty).await?;
            println!("{}", pretty(&items)?);
        }
        ContentCommand::Get { id } => {
            println!("{}", pretty(&client.get_content(id).await?)?);
        }
        ContentCommand::Add { file } => {
            let content = read_content_file(&file)?;
            let created = client.create_content(&content).await?;
            match created.id {
                Some(id) => println!("Created content {} ({})", id, created.title),
                None => println!("Created content ({})", created.title),
            }
        }
        ContentCommand::Update { id, file } => {
            let content = read_content_file(&file)?;
            let updated = client.update_content(id, &content).await?;
            println!("Updated content {} ({})", id, updated.title);
        }
        ContentCommand::Delete { id } => {
            client.delete_content(id).await?;
            println!("Deleted content {}", id);
        }
    }
    Ok(())
}

fn read_content_file(path: &PathBuf) -> Result<FitnessContent> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

async fn ask_once(coach: &Coach, query: &str) -> Result<()> {
    let mut printer = SnapshotPrinter::new(std::io::stdout());
    match coach.ask(query, |snapshot| printer.update(snapshot)).await? {
        Flight::Completed(_) => printer.finish(),
        Flight::Skipped => println!("Chat request already in progress, skipping duplicate call"),
    }
    Ok(())
}

/// Interactive chat: one rustyline prompt per question, answer streamed in
/// place, timing summary on exit.
async fn chat_loop(coach: &Coach) -> Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;
    println!("FitFusion coach. Ask anything; 'exit' or Ctrl-D to leave.");

    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = editor.add_history_entry(line);
                if let Err(err) = ask_once(coach, line).await {
                    eprintln!("error: {err}");
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    println!("{}", metrics::summarize_turns(&coach.turn_timings()));
    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
