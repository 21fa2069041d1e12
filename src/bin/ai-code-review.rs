//! Command-line entry point for the Python code reviewer.
use ai_code_reviewer::analysis::{project, timings};
use ai_code_reviewer::config::{load_config, AnalyzerConfig, ProviderSettings};
use ai_code_reviewer::feedback::FeedbackResolver;
use ai_code_reviewer::fix::{auto_fix_code, format_unified_diff};
use ai_code_reviewer::hook::install_pre_commit_hook;
use ai_code_reviewer::ProjectError;
use ai_code_reviewer::report::format_table;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ai-code-review",
    version,
    about = "AI Code Quality Analyzer for Python",
    long_about = "Detect style and quality issues in Python code, score complexity and maintainability, and get review suggestions from LLM backends (OpenRouter, Ollama, Gemini) with a rule-based fallback.",
    after_help = "Examples:\n  ai-code-review scan --path src/\n  ai-code-review diff --path app.py\n  ai-code-review --no-ai review --path .",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
struct Cli {
    #[arg(long, global = true, action = clap::ArgAction::SetTrue, help = "Skip LLM backends and use rule-based feedback")]
    no_ai: bool,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze files, print a summary table, exit non-zero on critical findings
    Scan {
        #[arg(long, help = "Python file or directory")]
        path: PathBuf,
    },
    /// Analyze files and print review feedback per file
    Review {
        #[arg(long, help = "Python file or directory")]
        path: PathBuf,
    },
    /// Rewrite files with cosmetic auto-fixes
    Apply {
        #[arg(long, help = "Python file or directory")]
        path: PathBuf,
    },
    /// Analyze files and print the project score
    Report {
        #[arg(long, help = "Python file or directory")]
        path: PathBuf,
    },
    /// Print the auto-fix changes as unified diffs without writing
    Diff {
        #[arg(long, help = "Python file or directory")]
        path: PathBuf,
    },
    /// Install the git pre-commit hook in the current repository
    Hook {
        #[arg(long, help = "Repository root (default: current dir)")]
        path: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_resolver(no_ai: bool) -> Result<FeedbackResolver> {
    if no_ai {
        return Ok(FeedbackResolver::rule_based_only());
    }
    FeedbackResolver::from_settings(&ProviderSettings::from_env())
        .context("Failed to set up suggestion backends")
}

fn python_files_or_fail(path: &Path, config: &AnalyzerConfig) -> Result<Vec<PathBuf>> {
    let files = project::collect_python_files(path, config);
    if files.is_empty() {
        return Err(ProjectError::NoFilesFound(path.to_path_buf()).into());
    }
    Ok(files)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config();

    match cli.cmd {
        Commands::Scan { path } => {
            let resolver = build_resolver(cli.no_ai)?;
            let report = project::analyze_project(&path, &config, &resolver).await?;
            print!("{}", format_table(&report));
            if report.scan_failed() {
                println!("Critical issues found. Fix before commit.");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Review { path } => {
            let resolver = build_resolver(cli.no_ai)?;
            let report = project::analyze_project(&path, &config, &resolver).await?;
            for row in &report.files {
                println!("\nFile: {}", row.file.display());
                println!("{}", row.ai_feedback());
            }
        }
        Commands::Apply { path } => {
            for file in python_files_or_fail(&path, &config)? {
                let original = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                std::fs::write(&file, auto_fix_code(&original))
                    .with_context(|| format!("Failed to write {}", file.display()))?;
            }
            println!("Auto fixes applied.");
        }
        Commands::Report { path } => {
            let resolver = build_resolver(cli.no_ai)?;
            let report = project::analyze_project(&path, &config, &resolver).await?;
            println!("Project Score: {}", report.project_score);
        }
        Commands::Diff { path } => {
            for file in python_files_or_fail(&path, &config)? {
                let original = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let diff = format_unified_diff(
                    &file.display().to_string(),
                    &original,
                    &auto_fix_code(&original),
                );
                if !diff.is_empty() {
                    print!("{}", diff);
                }
            }
        }
        Commands::Hook { path } => {
            let root = match path {
                Some(p) => p,
                None => std::env::current_dir().context("Failed to read current directory")?,
            };
            let exe = std::env::current_exe().context("Failed to locate the ai-code-review binary")?;
            let hook_path = install_pre_commit_hook(&root, &exe)?;
            println!("Git pre-commit hook installed successfully.");
            println!("Location: {}", hook_path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<ProjectError>() {
                Some(no_files) => eprintln!("{}", no_files),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    };

    let summary = timings::summary();
    if !summary.is_empty() {
        eprint!("{}", summary);
    }
    code
}
