//! medu-dx CLI: interactive differential diagnosis.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use medu_dx::config::DxConfig;
use medu_dx::console::{ChatDriver, Console};
use medu_dx::extract::build_extractor;
use medu_dx::graph::KnowledgeGraph;
use medu_dx::graph::analytics::GraphStats;
use medu_dx::matcher::{MatchConfig, SymptomMatcher};
use medu_dx::normalize::capitalize;
use medu_dx::refine::{AnswerSource, ScriptedAnswers};
use medu_dx::session::DiagnosisSession;
use medu_dx::table::load_graph;

#[derive(Parser)]
#[command(name = "medu-dx", version, about = "Interactive differential diagnosis")]
struct Cli {
    /// Knowledge base table (CSV or TSV).
    #[arg(long, global = true)]
    kb: Option<PathBuf>,

    /// Configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive diagnosis chat.
    Chat,

    /// Run one extraction, refinement round, and report.
    Diagnose {
        /// Free-text symptom description.
        #[arg(long)]
        symptoms: String,

        /// Scripted answers (comma-separated yes/no/unsure/quit).
        /// Without this, questions are asked on the terminal.
        #[arg(long)]
        answers: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show fuzzy matches for one symptom string.
    Match {
        /// Symptom text to match.
        text: String,

        /// Number of matches to keep.
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum similarity score (exclusive).
        #[arg(long)]
        min_score: Option<u8>,
    },

    /// Show knowledge graph statistics.
    Info {
        /// Number of most common symptoms to list.
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Write the default configuration to a file.
    InitConfig {
        /// Destination path.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => DxConfig::load(path)?,
        None => DxConfig::default(),
    };

    match cli.command {
        Commands::InitConfig { path } => {
            DxConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }

        Commands::Info { top } => {
            let graph = open_graph(cli.kb.as_deref())?;
            println!("{}", GraphStats::collect(&graph, top));
        }

        Commands::Match {
            text,
            top_k,
            min_score,
        } => {
            let graph = open_graph(cli.kb.as_deref())?;
            let match_config = MatchConfig {
                top_k: top_k.unwrap_or(config.matcher.top_k),
                min_score: min_score.unwrap_or(config.matcher.min_score),
            };
            if match_config.top_k == 0 || match_config.min_score > 100 {
                miette::bail!("--top-k must be at least 1 and --min-score at most 100");
            }
            let matches = SymptomMatcher::new(match_config).find(&text, graph.symptom_vocabulary());
            if matches.is_empty() {
                println!("No symptoms match \"{text}\".");
            } else {
                println!("Matches for \"{text}\":");
                for (i, m) in matches.iter().enumerate() {
                    println!("  {}. {} (score: {})", i + 1, m.symptom, m.score);
                }
            }
        }

        Commands::Diagnose {
            symptoms,
            answers,
            json,
        } => {
            let graph = open_graph(cli.kb.as_deref())?;
            let extractor = build_extractor(&config.extractor)?;
            let mut session = DiagnosisSession::new(Arc::new(graph), &config);

            session.describe(&symptoms, &*extractor);
            if session.potential_diseases().is_empty() {
                eprintln!("No potential diseases found based on the given symptoms.");
            } else if !json {
                println!("Potential diseases based on initial symptoms:");
                for disease in session.potential_diseases().diseases() {
                    println!("- {}", capitalize(disease));
                }
            }

            let mut source: Box<dyn AnswerSource> = match answers {
                Some(script) => Box::new(ScriptedAnswers::new(script.split(',').map(str::trim))),
                None => Box::new(Console::new(io::stdin().lock(), io::stdout())),
            };
            let outcome = session.refine(source.as_mut());
            if outcome.quit() {
                println!("Exiting the diagnosis process.");
                return Ok(());
            }

            session.diagnose();
            let report = session.report();
            if json {
                let out = serde_json::to_string_pretty(&report).into_diagnostic()?;
                println!("{out}");
            } else {
                println!("\n{report}");
            }
        }

        Commands::Chat => {
            let graph = open_graph(cli.kb.as_deref())?;
            let extractor = build_extractor(&config.extractor)?;
            let session = DiagnosisSession::new(Arc::new(graph), &config);
            run_chat(session, &*extractor, io::stdin().lock(), io::stdout())?;
        }
    }

    Ok(())
}

fn open_graph(kb: Option<&Path>) -> Result<KnowledgeGraph> {
    let Some(path) = kb else {
        miette::bail!("--kb <path> is required for this command");
    };
    Ok(load_graph(path)?)
}

fn run_chat<R: BufRead, W: Write>(
    session: DiagnosisSession,
    extractor: &dyn medu_dx::extract::SymptomExtractor,
    input: R,
    output: W,
) -> Result<()> {
    let mut driver = ChatDriver::new(session, extractor, Console::new(input, output));
    let end = driver.run().into_diagnostic()?;
    tracing::debug!(end = ?end, "chat finished");
    Ok(())
}
