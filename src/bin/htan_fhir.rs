use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::info;
use tracing_subscriber::EnvFilter;

use htan_fhir::config::{ConfigLoader, ConfigOverrides, ResolvedConfig};
use htan_fhir::emit::NdjsonEmitter;
use htan_fhir::error::HtanError;
use htan_fhir::ontology::OntologyIndex;
use htan_fhir::output::JsonOutput;
use htan_fhir::pipeline::Pipeline;
use htan_fhir::table::TableReader;

#[derive(Parser)]
#[command(name = "htan-fhir")]
#[command(about = "Normalize HTAN metadata tables against the HTAN schema and emit FHIR NDJSON")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Convert the table into per-resource NDJSON files")]
    Convert(CommonArgs),
    #[command(about = "Print the normalized tree of every row as JSON lines")]
    Normalize(CommonArgs),
}

#[derive(Args, Clone, Default)]
struct CommonArgs {
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    #[arg(long)]
    schema: Option<Utf8PathBuf>,

    #[arg(long)]
    table: Option<Utf8PathBuf>,

    #[arg(long)]
    output_dir: Option<Utf8PathBuf>,

    #[arg(long)]
    study_id: Option<String>,

    #[arg(long)]
    keep_empty: bool,

    #[arg(long)]
    sample_assays: bool,
}

impl CommonArgs {
    fn resolve(self) -> Result<ResolvedConfig, HtanError> {
        let overrides = ConfigOverrides {
            schema: self.schema,
            table: self.table,
            output_dir: self.output_dir,
            study_id: self.study_id,
            keep_empty: self.keep_empty,
            sample_assays: self.sample_assays,
        };
        ConfigLoader::resolve(self.config.as_deref(), overrides)
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(htan) = report.downcast_ref::<HtanError>() {
            return ExitCode::from(map_exit_code(htan));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HtanError) -> u8 {
    match error {
        HtanError::SchemaRead(_)
        | HtanError::TableRead(_)
        | HtanError::ConfigRead(_) => 2,
        HtanError::MissingAssayClass { .. }
        | HtanError::MissingAssayLineage(_)
        | HtanError::MissingSpecimen { .. }
        | HtanError::MissingParticipant { .. }
        | HtanError::MissingField { .. }
        | HtanError::UnknownBranch(_) => 3,
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
    match cli.command.unwrap_or(Commands::Convert(CommonArgs::default())) {
        Commands::Convert(args) => run_convert(args.resolve()?),
        Commands::Normalize(args) => run_normalize(args.resolve()?),
    }
}

fn run_convert(config: ResolvedConfig) -> miette::Result<()> {
    let ontology = OntologyIndex::load(&config.schema)?;
    let rows = TableReader::open(&config.table)?.rows();
    info!(
        schema = %config.schema,
        table = %config.table,
        output = %config.output_dir,
        "converting"
    );

    let mut emitter = NdjsonEmitter::new(config.output_dir.clone());
    let mut pipeline = Pipeline::new(&ontology, config.pipeline_options());
    let summary = pipeline.run(rows, &mut emitter)?;
    JsonOutput::print_summary(&summary).into_diagnostic()?;
    Ok(())
}

fn run_normalize(config: ResolvedConfig) -> miette::Result<()> {
    let ontology = OntologyIndex::load(&config.schema)?;
    let mut pipeline = Pipeline::new(&ontology, config.pipeline_options());
    for row in TableReader::open(&config.table)?.rows() {
        if let Some(tree) = pipeline.normalize_row(row?)? {
            JsonOutput::print_tree(&tree).into_diagnostic()?;
        }
    }
    Ok(())
}
