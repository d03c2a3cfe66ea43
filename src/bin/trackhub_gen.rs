use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use trackhub_gen::app::{App, CreateResult};
use trackhub_gen::config::{Config, ConfigLoader};
use trackhub_gen::diagnostics::TracingSink;
use trackhub_gen::domain::{BrowserMode, HubLayout};
use trackhub_gen::error::HubError;
use trackhub_gen::output::{JsonHubWriter, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "trackhub-gen")]
#[command(about = "Create UCSC and Ensembl compatible track hubs from globbed files with sample metadata")]
#[command(version, author)]
struct Cli {
    /// Print machine-readable JSON instead of the human summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create track hubs from globbed files with sample metadata")]
    Create(CreateArgs),
    #[command(about = "Create a template sample sheet")]
    Template(TemplateArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// JSON config file (defaults to ./trackhub.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Glob patterns for bigWig files (e.g. "data/*.bw")
    #[arg(long, num_args = 1.., alias = "signal")]
    bigwig: Vec<String>,

    /// Glob patterns for bigBed files (e.g. "annotations/*.bb")
    #[arg(long, num_args = 1.., alias = "annotation")]
    bigbed: Vec<String>,

    /// Optional sample sheet CSV
    #[arg(long)]
    sample_sheet: Option<String>,

    /// Base name for the hubs (e.g. "RiboSeq")
    #[arg(long)]
    hub_name: Option<String>,

    /// Genome assembly (e.g. "hg38")
    #[arg(long)]
    genome: Option<String>,

    /// Directory to write the hubs to
    #[arg(long)]
    output_dir: Option<String>,

    /// Regex with a named group "sample_id"
    #[arg(long)]
    sample_regex: Option<String>,

    /// Regex with a named group "annotation_type"
    #[arg(long)]
    annotation_regex: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// URL where the hubs will be hosted
    #[arg(long)]
    hub_url: Option<String>,

    /// File containing an HTML hub description
    #[arg(long)]
    hub_description: Option<String>,

    /// Shorthand for --mode cross-compatible
    #[arg(long, conflicts_with = "mode")]
    ensembl_compatible: bool,

    #[arg(long, value_enum)]
    mode: Option<BrowserMode>,

    #[arg(long, value_enum)]
    layout: Option<HubLayout>,
}

#[derive(Args)]
struct TemplateArgs {
    /// Output file for the template sample sheet
    output_file: PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<HubError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HubError) -> u8 {
    match error {
        HubError::NoInputs
        | HubError::MissingSetting(_)
        | HubError::MissingConfig(_)
        | HubError::ConfigParse(_)
        | HubError::SheetRead(_)
        | HubError::SheetParse(_)
        | HubError::MissingColumns(_)
        | HubError::InvalidRegex { .. }
        | HubError::InvalidPattern { .. } => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let app = App::new(JsonHubWriter);

    match cli.command {
        Commands::Create(args) => run_create(args, app, output_mode),
        Commands::Template(args) => {
            let result = app.template(&args.output_file, &TracingSink)?;
            match output_mode {
                OutputMode::Json => JsonOutput::print_template(&result).into_diagnostic(),
                OutputMode::Human => {
                    println!("Sample sheet template written to {}", result.path);
                    Ok(())
                }
            }
        }
    }
}

fn run_create(
    args: CreateArgs,
    app: App<JsonHubWriter>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let file_config = ConfigLoader::load(args.config.as_deref())?;
    let mode = if args.ensembl_compatible {
        Some(BrowserMode::CrossCompatible)
    } else {
        args.mode
    };
    let cli_config = Config {
        schema_version: None,
        hub_name: args.hub_name,
        genome: args.genome,
        output_dir: args.output_dir,
        bigwig: args.bigwig,
        bigbed: args.bigbed,
        sample_sheet: args.sample_sheet,
        sample_regex: args.sample_regex,
        annotation_regex: args.annotation_regex,
        email: args.email,
        hub_url: args.hub_url,
        hub_description: args.hub_description,
        mode,
        layout: args.layout,
    };

    let resolved = ConfigLoader::resolve_config(file_config.overlay(cli_config))?;
    let request = resolved.into_request(&TracingSink);
    let result = app.create(request, &TracingSink)?;

    match output_mode {
        OutputMode::Json => JsonOutput::print_create(&result).into_diagnostic(),
        OutputMode::Human => {
            print_create_summary(&result);
            Ok(())
        }
    }
}

fn print_create_summary(result: &CreateResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!();
    println!("{cyan}Track Hub Creation Complete!{reset}");
    println!("Track hubs have been created in: {}", result.output_dir);
    println!("Browser mode: {}", result.mode);
    println!(
        "{green}Tracks: {} bigWig, {} bigBed across {} samples{reset}",
        result.signal_tracks, result.annotation_tracks, result.samples
    );
    if let Some(merge) = &result.merge {
        let color = if merge.unmatched > 0 { yellow } else { green };
        println!(
            "{color}Sample sheet: {} tracks matched, {} without metadata{reset}",
            merge.matched, merge.unmatched
        );
    }
    println!("{green}Hubs: {}{reset}", result.hubs.len());
    for hub in &result.hubs {
        println!("  {} ({}, {} tracks) -> {}", hub.name, hub.genome, hub.tracks, hub.path);
    }

    let urls: Vec<&str> = result
        .hubs
        .iter()
        .filter_map(|hub| hub.hub_url.as_deref())
        .collect();
    if urls.is_empty() {
        println!();
        println!("To use these track hubs, you need to:");
        println!("1. Host the hub directory on a web server");
        println!(
            "2. Use the URL to the hub.txt file when adding the hub to UCSC Genome Browser or Ensembl"
        );
        return;
    }

    println!();
    for url in &urls {
        println!("{cyan}Hub URL: {url}{reset}");
    }
    println!("To add to UCSC Genome Browser:");
    println!("1. Go to https://genome.ucsc.edu/cgi-bin/hgHubConnect");
    println!("2. Click 'My Hubs' tab");
    println!("3. Paste the URL above");
    println!("4. Click 'Add Hub'");

    if matches!(result.mode, BrowserMode::CrossCompatible) {
        println!();
        println!("To add to Ensembl:");
        println!("1. Go to https://www.ensembl.org");
        println!("2. Navigate to a species page");
        println!("3. Click 'Add your data' (in the left menu)");
        println!("4. Select 'Add Track Hub'");
        println!("5. Paste the URL above");
    }
}
