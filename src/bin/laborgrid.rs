use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use laborgrid::app::{App, build_store};
use laborgrid::client::HttpDatasetClient;
use laborgrid::config::{ConfigLoader, ResolvedConfig};
use laborgrid::domain::{Dataset, FilterArg};
use laborgrid::download::{DirectorySaver, DownloadOutcome};
use laborgrid::error::GridError;
use laborgrid::output::{JsonOutput, OutputMode, TextOutput};
use laborgrid::session::{Explorer, SessionSettings};
use laborgrid::tui::Tui;

#[derive(Parser)]
#[command(name = "laborgrid")]
#[command(about = "Filter, preview and download labor force and employment statistics")]
#[command(version, author)]
struct Cli {
    /// Print JSON on stdout instead of text or the TUI.
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    /// Overrides `base_url` from the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Explore a dataset interactively (default)")]
    Explore(ExploreArgs),
    #[command(about = "Preview rows matching the filters")]
    Preview(FilterArgs),
    #[command(about = "Ask the server for area suggestions")]
    Suggest(SuggestArgs),
    #[command(about = "Download the full extract for the filters")]
    Download(DownloadArgs),
    #[command(about = "Print the query string for the filters")]
    Query(FilterArgs),
}

#[derive(Args, Default)]
struct ExploreArgs {
    #[arg(long)]
    dataset: Option<Dataset>,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    dataset: Option<Dataset>,

    #[arg(long = "filter", value_name = "FACET=VALUE")]
    filters: Vec<FilterArg>,

    /// A query string as printed by `laborgrid query`.
    #[arg(long)]
    query: Option<String>,
}

#[derive(Args)]
struct SuggestArgs {
    #[arg(long)]
    dataset: Option<Dataset>,

    text: String,
}

#[derive(Args)]
struct DownloadArgs {
    #[command(flatten)]
    filters: FilterArgs,

    /// Directory to save into; defaults to the configured download directory.
    #[arg(long)]
    out: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GridError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GridError) -> u8 {
    match error {
        GridError::InvalidDataset(_)
        | GridError::InvalidFilter(_)
        | GridError::InvalidQuery(_)
        | GridError::NoActiveFilters
        | GridError::ConfigRead(_)
        | GridError::ConfigParse(_) => 2,
        error if error.is_network() => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let client =
        HttpDatasetClient::new(&config.base_url, config.http_timeout, config.preview_limit)?;

    match cli.command.unwrap_or(Commands::Explore(ExploreArgs::default())) {
        Commands::Explore(args) => run_explore(args, client, &config, output_mode),
        Commands::Preview(args) => {
            let dataset = args.dataset.unwrap_or(config.dataset);
            let store = build_store(dataset, args.query.as_deref(), &args.filters)?;
            let result = App::new(client).preview(dataset, &store)?;
            let printed = match output_mode {
                OutputMode::NonInteractive => JsonOutput::print_preview(&result),
                OutputMode::Interactive => TextOutput::print_preview(&result),
            };
            printed.into_diagnostic()
        }
        Commands::Suggest(args) => {
            let dataset = args.dataset.unwrap_or(config.dataset);
            let result = App::new(client).suggest(dataset, &args.text)?;
            let printed = match output_mode {
                OutputMode::NonInteractive => JsonOutput::print_suggestions(&result),
                OutputMode::Interactive => TextOutput::print_suggestions(&result),
            };
            printed.into_diagnostic()
        }
        Commands::Download(args) => run_download(args, client, &config, output_mode),
        Commands::Query(args) => {
            let dataset = args.dataset.unwrap_or(config.dataset);
            let store = build_store(dataset, args.query.as_deref(), &args.filters)?;
            let result = App::new(client).query(&store);
            let printed = match output_mode {
                OutputMode::NonInteractive => JsonOutput::print_query(&result),
                OutputMode::Interactive => TextOutput::print_query(&result),
            };
            printed.into_diagnostic()
        }
    }
}

fn run_explore(
    args: ExploreArgs,
    client: HttpDatasetClient,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    if matches!(output_mode, OutputMode::NonInteractive) {
        return Err(miette::Report::msg(
            "explore needs a terminal (try `laborgrid preview --help`)",
        ));
    }
    let dataset = args.dataset.unwrap_or(config.dataset);
    let saver = DirectorySaver::new(config.download_dir.clone());
    let explorer = Explorer::new(
        Arc::new(client),
        dataset,
        SessionSettings::from(config),
        Box::new(saver),
    );
    Tui::new(explorer).run()
}

fn run_download(
    args: DownloadArgs,
    client: HttpDatasetClient,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let dataset = args.filters.dataset.unwrap_or(config.dataset);
    let store = build_store(
        dataset,
        args.filters.query.as_deref(),
        &args.filters.filters,
    )?;
    let dir = args
        .out
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| config.download_dir.clone());
    let saver = DirectorySaver::new(dir);
    let app = App::new(client);

    let result = match output_mode {
        OutputMode::NonInteractive => {
            let result = app.download(dataset, &store, &saver, &JsonOutput)?;
            JsonOutput::print_download(&result).into_diagnostic()?;
            result
        }
        OutputMode::Interactive => {
            let result = app.download(dataset, &store, &saver, &TextOutput)?;
            TextOutput::print_download(&result).into_diagnostic()?;
            result
        }
    };

    if let DownloadOutcome::Failed { message } = result.outcome {
        return Err(GridError::NetworkFailure(message).into());
    }
    Ok(())
}
