mod bank;
mod models;
mod quiz;
mod score;
mod session;
mod shuffle;
mod store;
mod telemetry;
mod tui;
mod view;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use bank::QuestionBank;
use models::{option_letter, JsonOutput};
use quiz::{Quiz, QuizConfig, QuizError, ValidationError};
use session::{build_session, CategoryFilter, QuestionCount};
use store::{MemoryStore, NameStore, Store};

const APP_DIR: &str = "exam-mcq";
const DEFAULT_DB_NAME: &str = "exam-mcq.db";
const LOG_FILE_NAME: &str = "exam-mcq.log";
const DB_ENV: &str = "EXAM_MCQ_DB";
const BANK_ENV: &str = "EXAM_MCQ_BANK";

#[derive(Parser)]
#[command(name = "exam-mcq")]
#[command(about = "Multiple-choice practice exam for English teaching candidates")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Load questions from a JSON file instead of the built-in bank
    #[arg(long, global = true, value_name = "PATH")]
    bank: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories with their question counts
    Categories,

    /// List questions in the bank
    Questions {
        /// Only show this category
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Show one question with its answer and explanation
    Show {
        /// Question ID
        id: String,
    },

    /// Show or change the remembered display name
    Name {
        /// New display name
        name: Option<String>,
    },

    /// Print the ordered question list for a seed
    Session {
        /// Category, or "All"
        #[arg(long, short)]
        category: Option<String>,

        /// Number of questions, or "all"
        #[arg(long, short = 'n', default_value = "20")]
        count: String,

        /// Shuffle seed (drawn at random when omitted)
        #[arg(long, short)]
        seed: Option<u64>,
    },

    /// Take the test in the terminal UI
    Quiz {
        /// Display name (defaults to the remembered one)
        #[arg(long)]
        name: Option<String>,

        /// Category, or "All"
        #[arg(long, short)]
        category: Option<String>,

        /// Number of questions, or "all"
        #[arg(long, short = 'n', default_value = "20")]
        count: String,

        /// Shuffle seed (drawn at random when omitted)
        #[arg(long, short)]
        seed: Option<u64>,
    },
}

fn config_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);

    std::fs::create_dir_all(&dir).ok();
    dir
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_ENV) {
        return PathBuf::from(path);
    }
    config_dir().join(DEFAULT_DB_NAME)
}

fn get_log_path() -> PathBuf {
    match get_db_path().parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOG_FILE_NAME),
        _ => PathBuf::from(LOG_FILE_NAME),
    }
}

/// `--bank` wins over `EXAM_MCQ_BANK`; otherwise the built-in bank is used.
fn resolve_bank_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var_os(BANK_ENV).map(PathBuf::from))
}

fn load_bank(flag: Option<PathBuf>) -> Result<QuestionBank, bank::BankError> {
    match resolve_bank_path(flag) {
        Some(path) => {
            debug!(path = %path.display(), "loading question bank");
            QuestionBank::load(path)
        }
        None => QuestionBank::builtin(),
    }
}

fn open_name_store(path: &Path) -> Box<dyn NameStore> {
    match Store::open(path).and_then(|store| store.init().map(|_| store)) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "name store unavailable, using memory");
            Box::new(MemoryStore::default())
        }
    }
}

fn parse_filter(bank: &QuestionBank, category: Option<&str>) -> Result<CategoryFilter, QuizError> {
    let filter = category.map(CategoryFilter::parse_label).unwrap_or_default();
    if let CategoryFilter::Only(name) = &filter {
        if !bank.has_category(name) {
            return Err(ValidationError::UnknownCategory(name.clone()).into());
        }
    }
    Ok(filter)
}

fn parse_count(raw: &str) -> Result<QuestionCount, QuizError> {
    raw.parse::<QuestionCount>().map_err(QuizError::from)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Commands::Quiz { .. }) {
        telemetry::init_file(&get_log_path());
    } else {
        telemetry::init_stderr();
    }

    let bank = load_bank(cli.bank)?;

    match cli.command {
        Commands::Categories => {
            let counts: Vec<(String, usize)> = bank
                .categories()
                .into_iter()
                .map(|c| (c.to_string(), bank.count_in(c)))
                .collect();

            if cli.json {
                let data: Vec<_> = counts
                    .iter()
                    .map(|(name, count)| serde_json::json!({ "name": name, "questions": count }))
                    .collect();
                println!("{}", serde_json::to_string(&JsonOutput::ok(data))?);
            } else {
                println!("{:<40} QUESTIONS", "CATEGORY");
                println!("{}", "-".repeat(50));
                for (name, count) in &counts {
                    println!("{:<40} {}", truncate(name, 38), count);
                }
                println!("{}", "-".repeat(50));
                println!("{:<40} {}", bank::ALL_LABEL, bank.len());
            }
        }

        Commands::Questions { category } => {
            let filter = parse_filter(&bank, category.as_deref())?;
            let questions: Vec<_> = bank
                .questions()
                .iter()
                .filter(|q| filter.matches(q))
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&questions))?);
            } else if questions.is_empty() {
                println!("No questions found.");
            } else {
                println!("{:<8} {:<28} PROMPT", "ID", "CATEGORY");
                println!("{}", "-".repeat(90));
                for q in questions {
                    println!(
                        "{:<8} {:<28} {}",
                        q.id,
                        truncate(&q.category, 26),
                        truncate(&q.prompt, 52)
                    );
                }
            }
        }

        Commands::Show { id } => {
            if let Some(q) = bank.get(id.trim()) {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(q))?);
                } else {
                    println!("Question: {}", q.id);
                    println!("Category: {}", q.category);
                    println!();
                    println!("{}", q.prompt);
                    for (i, option) in q.options.iter().enumerate() {
                        let marker = if q.is_correct(i) { "*" } else { " " };
                        println!(" {} {}. {}", marker, option_letter(i), option);
                    }
                    if let Some(explanation) = &q.explanation {
                        println!();
                        println!("Explanation: {}", explanation);
                    }
                }
            } else if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::<()>::err("Question not found"))?
                );
            } else {
                println!("Question not found.");
            }
        }

        Commands::Name { name } => {
            let store = open_name_store(&get_db_path());

            match name {
                Some(new_name) => {
                    let trimmed = new_name.trim();
                    if trimmed.is_empty() {
                        return Err(ValidationError::EmptyName.into());
                    }
                    store.save_display_name(trimmed);

                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "name": trimmed
                            })))?
                        );
                    } else {
                        println!("Display name set to '{}'.", trimmed);
                    }
                }
                None => {
                    let current = store.load_display_name();
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "name": current
                            })))?
                        );
                    } else if let Some(current) = current {
                        println!("{}", current);
                    } else {
                        println!("No display name saved.");
                    }
                }
            }
        }

        Commands::Session {
            category,
            count,
            seed,
        } => {
            let filter = parse_filter(&bank, category.as_deref())?;
            let count = parse_count(&count)?;
            let seed = seed.unwrap_or_else(shuffle::draw_seed);
            let questions = build_session(&bank, &filter, seed, count)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "seed": seed,
                        "category": filter.label(),
                        "count": count.label(),
                        "questions": questions
                    })))?
                );
            } else {
                println!(
                    "Seed {} | {} | {} of {} question(s)",
                    seed,
                    filter,
                    questions.len(),
                    count.label()
                );
                println!();
                for (i, q) in questions.iter().enumerate() {
                    println!("{}. [{}] {}", i + 1, q.category, q.prompt);
                    for (j, option) in q.options.iter().enumerate() {
                        println!("   {}. {}", option_letter(j), option);
                    }
                }
            }
        }

        Commands::Quiz {
            name,
            category,
            count,
            seed,
        } => {
            let filter = parse_filter(&bank, category.as_deref())?;
            let count = parse_count(&count)?;
            let store = open_name_store(&get_db_path());

            let name = match name.map(|n| n.trim().to_string()) {
                Some(n) if !n.is_empty() => {
                    store.save_display_name(&n);
                    n
                }
                _ => store.load_display_name().unwrap_or_default(),
            };

            let mut quiz = Quiz::new(bank);
            quiz.configure(QuizConfig {
                name,
                filter,
                count,
            })?;
            let export_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            tui::run(quiz, store, seed, export_dir)?;
        }
    }

    Ok(())
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
