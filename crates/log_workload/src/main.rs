use {
    clap::Parser,
    colorful::{Color, Colorful},
    log_workload::{
        MemoryLog, Properties, TaskOutcome, WorkloadDriver, WorkloadError, COUNT_KEY, RATIO_KEY,
        THREADS_KEY,
    },
    op_history::{HistoryFormat, HistorySerializer, DEFAULT_HISTORY_PATH},
    std::{path::PathBuf, process::ExitCode},
    tracing::{debug, error, info},
    tracing_subscriber::EnvFilter,
};

/// Runs concurrent writers and readers against an in-memory log and writes the history they
/// observed.
#[derive(Debug, Parser)]
#[command(name = "log_workload")]
struct Args {
    /// Property file with one `key=value` per line. Later files override earlier ones.
    #[arg(short = 'P', value_name = "FILE")]
    property_files: Vec<PathBuf>,

    /// A single property, overriding property files.
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE")]
    properties: Vec<String>,

    /// Operations per writer task [default: 10]
    #[arg(long)]
    count: Option<usize>,

    /// Total writer and reader tasks [default: 5]
    #[arg(long)]
    threads: Option<usize>,

    /// Share of tasks that write, within [0, 1] [default: 0.8]
    #[arg(long)]
    ratio: Option<f64>,

    /// Where to write the history.
    #[arg(long, short, default_value = DEFAULT_HISTORY_PATH)]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Format {
    /// Line format read by the linearizability checker.
    Text,
    /// One JSON object per record.
    Jsonl,
}

impl From<Format> for HistoryFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => HistoryFormat::Text,
            Format::Jsonl => HistoryFormat::JsonLines,
        }
    }
}

impl Args {
    fn properties(&self) -> Result<Properties, WorkloadError> {
        let mut properties = Properties::new();
        for path in &self.property_files {
            properties.load(path)?;
        }
        for assignment in &self.properties {
            properties.set_assignment(assignment)?;
        }
        for (key, value) in [
            (COUNT_KEY, self.count.map(|v| v.to_string())),
            (THREADS_KEY, self.threads.map(|v| v.to_string())),
            (RATIO_KEY, self.ratio.map(|v| v.to_string())),
        ] {
            if let Some(value) = value {
                properties.set_property(key, value);
            }
        }
        Ok(properties)
    }
}

fn run(args: &Args) -> Result<bool, WorkloadError> {
    let properties = args.properties()?;
    for (key, value) in properties.iter() {
        debug!(key, value, "Property.");
    }
    let log = MemoryLog::from_properties(&properties)?;
    let driver = WorkloadDriver::from_properties(properties)?;
    let plan = driver.plan();
    println!(
        "Running with {} writers and {} readers.",
        plan.num_writers, plan.num_readers
    );

    let serializer = HistorySerializer::new(args.format.into());
    let report = driver.run_and_dump(move |_| log.client(), serializer, &args.output)?;
    let stats = report.history.stats();
    info!(?stats, output = %args.output.display(), "Workload complete.");

    for task in report.failures() {
        let msg = match &task.outcome {
            TaskOutcome::InitFailed(error) => {
                format!("{:?} {}: {error}", task.role, task.actor_id)
            }
            TaskOutcome::Crashed {
                request_id, error, ..
            } => format!(
                "{:?} {}: request {request_id} left incomplete ({error})",
                task.role, task.actor_id
            ),
            TaskOutcome::Panicked(panic) => {
                format!("{:?} {}: panicked ({panic})", task.role, task.actor_id)
            }
            TaskOutcome::SpawnFailed(error) => {
                format!("{:?} {}: not started ({error})", task.role, task.actor_id)
            }
            TaskOutcome::Completed { .. } => continue,
        };
        println!("{}", msg.color(Color::Red));
    }
    let summary = format!(
        "Wrote {} records ({} incomplete) to {}.",
        report.history.len(),
        stats.incomplete,
        args.output.display()
    );
    println!("{}", summary.color(Color::Green));
    Ok(report.is_clean())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        // The history was written, but some tasks failed.
        Ok(false) => ExitCode::from(2),
        Err(WorkloadError::Dump { source, report }) => {
            error!(%source, records = report.history.len(), "History was not written.");
            eprintln!("{}", format!("error: {source}").color(Color::Red));
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(%err, "Workload did not run.");
            eprintln!("{}", format!("error: {err}").color(Color::Red));
            ExitCode::FAILURE
        }
    }
}
