//! CLI entry point for `sql2native`.

use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use sql2native::classifier::native_execution::NativeExecutionClassifier;
use sql2native::classifier::patterns::RoutingPolicy;
use sql2native::classifier::vocabulary::Vocabulary;
use sql2native::output::{formatter, report};
use sql2native::parser::preprocess::clean_query;
use sql2native::parser::sql_parser::SqlparserBackend;
use sql2native::pipeline::{self, QueryAnalysis};
use sql2native::rewriter::transformer;
use sql2native::validator::tool::{SqlValidationTool, DEFAULT_DIALECT};

#[derive(Parser)]
#[command(
    name = "sql2native",
    about = "Route SQL a federated engine cannot evaluate to native passthrough queries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file extending the detector vocabulary
    #[arg(long, global = true)]
    vocabulary: Option<PathBuf>,

    /// Detector signals that route a query to native execution: `json` or `all`
    #[arg(long, global = true, default_value = "json")]
    routing: RoutingPolicy,

    /// Print verbose diagnostics
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run every detector and report the routing decision for each query
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Report format printed to stdout
        #[arg(long, default_value = "markdown")]
        format: OutputFormat,

        /// Write report, JSON analysis, and SQL files here instead of printing
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the passthrough rewrite of each query
    Transform {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Validate each query the way the agent tool does
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Parser dialect
        #[arg(long, default_value = DEFAULT_DIALECT)]
        dialect: String,
    },
}

#[derive(Args)]
struct InputArgs {
    /// SQL files, one query per file (stdin when neither files nor --query are given)
    input: Vec<PathBuf>,

    /// Query text given inline; takes precedence over input files
    #[arg(long)]
    query: Option<String>,
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let classifier = match build_classifier(cli.vocabulary.as_ref(), cli.routing) {
        Ok(classifier) => classifier,
        Err(e) => fail(&e),
    };

    match cli.command {
        Command::Analyze {
            input,
            format,
            output_dir,
        } => {
            let queries = read_queries(&input).unwrap_or_else(|e| fail(&e));
            let analyses: Vec<QueryAnalysis> = queries
                .iter()
                .map(|(label, sql)| pipeline::analyze_query(label.as_str(), sql, &classifier))
                .collect();

            if let Some(dir) = output_dir {
                let name = queries
                    .first()
                    .map_or("output", |(label, _)| label.as_str());
                if let Err(e) = formatter::write_output(&dir, name, &analyses) {
                    fail(&format!("Error writing output: {e}"));
                }
                return;
            }

            match format {
                OutputFormat::Markdown => print!("{}", report::build_report(&analyses)),
                OutputFormat::Json => match serde_json::to_string_pretty(&analyses) {
                    Ok(json) => println!("{json}"),
                    Err(e) => fail(&format!("Error serializing analysis: {e}")),
                },
            }
        }
        Command::Transform { input } => {
            let queries = read_queries(&input).unwrap_or_else(|e| fail(&e));
            for (label, sql) in &queries {
                let rewritten = transformer::rewrite(&clean_query(sql));
                if cli.verbose {
                    eprintln!(
                        "{label}: {}",
                        rewritten
                            .database
                            .as_deref()
                            .map_or("no qualified source database".to_string(), |db| {
                                format!("routed to {db}")
                            })
                    );
                }
                println!("{}", rewritten.sql);
            }
        }
        Command::Validate { input, dialect } => {
            let queries = read_queries(&input).unwrap_or_else(|e| fail(&e));
            let tool = SqlValidationTool::new(SqlparserBackend)
                .with_dialect(dialect)
                .with_classifier(classifier);

            let mut all_valid = true;
            for (_, sql) in &queries {
                let outcome = tool.evaluate(sql);
                all_valid &= outcome.is_valid();
                println!("{outcome}");
            }
            if !all_valid {
                process::exit(1);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_classifier(
    vocabulary_path: Option<&PathBuf>,
    routing: RoutingPolicy,
) -> Result<NativeExecutionClassifier, String> {
    let Some(path) = vocabulary_path else {
        return Ok(NativeExecutionClassifier::builtin(routing));
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading vocabulary {}: {e}", path.display()))?;
    let mut vocabulary = Vocabulary::new();
    vocabulary
        .load_from_json(&content)
        .map_err(|e| format!("Error parsing vocabulary: {e}"))?;
    NativeExecutionClassifier::new(vocabulary, routing)
}

/// Collect `(label, sql)` pairs from `--query`, the input files, or stdin.
fn read_queries(args: &InputArgs) -> Result<Vec<(String, String)>, String> {
    if let Some(query) = &args.query {
        return Ok(vec![("query".to_string(), query.clone())]);
    }

    if args.input.is_empty() {
        let mut sql = String::new();
        std::io::stdin()
            .read_to_string(&mut sql)
            .map_err(|e| format!("Error reading stdin: {e}"))?;
        if sql.trim().is_empty() {
            return Err("No input SQL provided".to_string());
        }
        return Ok(vec![("stdin".to_string(), sql)]);
    }

    args.input
        .iter()
        .map(|path| {
            let sql = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
            let label = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("query")
                .to_string();
            Ok((label, sql))
        })
        .collect()
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(2);
}
