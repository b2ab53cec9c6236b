mod config;
mod logging;
mod ui;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{AppConfig, FrameSource};
use product_inspect_adapters::{
    present_dashboard, present_detection_row, present_metrics, present_product_row,
    present_report_table, present_status, present_upload, write_png, BackgroundInspectionRunner,
    ColorThresholdDetector, ImageFolderCamera, PdfReportWriter, SharedOverlay,
    SqliteSnapshotStore, SyntheticCamera, SystemClock, XlsxReportWriter,
};
use product_inspect_application::{
    AddProductCommand, ApplicationService, BootstrapCommand, CaptureDevice, DashboardQuery,
    DeleteProductCommand, ExportReportCommand, InspectionMetricsQuery, InspectionStatusQuery,
    ListProductsQuery, PollInspectionCommand, RecentDetectionsQuery, ReportPreviewQuery,
    ReportWriter, StartInspectionCommand, StopInspectionCommand, TrainModelCommand,
    UpdateProductCommand, UploadSamplesCommand,
};
use product_inspect_domain::{ProductDraft, ProductId, ReportFormat, SampleKind, TickMetrics};
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const DELETE_PROMPT: &str = "Are you sure you want to delete this product? [y/N] ";

#[derive(Parser, Debug)]
#[command(author, version, about = "Product quality inspection station", long_about = None)]
struct Cli {
    /// SQLite file holding counters, history and the product catalog
    #[arg(long, global = true)]
    snapshot_path: Option<PathBuf>,

    /// Directory exported reports are written to
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the inspection window (default)
    Ui,
    /// Print the dashboard counters
    Dashboard,
    /// List the most recent detections, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Run the classifier headless for a fixed duration
    Inspect(InspectArgs),
    #[command(subcommand)]
    Products(ProductsCommand),
    #[command(subcommand)]
    Samples(SamplesCommand),
    /// Request model training
    Train,
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// `synthetic` or a folder of jpg/png frames
    #[arg(long, default_value = "synthetic")]
    source: String,

    #[arg(long, default_value_t = 5)]
    duration_secs: u64,

    #[arg(long)]
    interval_ms: Option<u64>,

    /// Write the last annotated frame to this png
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ProductsCommand {
    List,
    Add(ProductFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long = "type")]
    product_type: String,
    #[arg(long, default_value = "")]
    criteria: String,
}

impl ProductFields {
    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            product_type: self.product_type,
            criteria: self.criteria,
        }
    }
}

#[derive(Subcommand, Debug)]
enum SamplesCommand {
    Upload {
        #[arg(long, value_enum)]
        kind: SampleKindArg,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SampleKindArg {
    Good,
    Defective,
}

impl From<SampleKindArg> for SampleKind {
    fn from(kind: SampleKindArg) -> Self {
        match kind {
            SampleKindArg::Good => SampleKind::Good,
            SampleKindArg::Defective => SampleKind::Defective,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Print the detailed inspection log
    Show,
    Export {
        #[arg(long, value_enum)]
        format: ReportFormatArg,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportFormatArg {
    Xlsx,
    Pdf,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(format: ReportFormatArg) -> Self {
        match format {
            ReportFormatArg::Xlsx => ReportFormat::Spreadsheet,
            ReportFormatArg::Pdf => ReportFormat::Pdf,
        }
    }
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn apply_overrides(cli: &Cli, mut config: AppConfig) -> AppConfig {
    if let Some(path) = &cli.snapshot_path {
        config.snapshot_path = path.clone();
    }
    if let Some(dir) = &cli.report_dir {
        config.report_dir = dir.clone();
    }
    if let Some(Command::Inspect(args)) = &cli.command {
        config.frame_source = FrameSource::parse(&args.source);
        if let Some(interval_ms) = args.interval_ms {
            config.tick_interval_ms = interval_ms;
        }
    }
    config
}

fn build_application_service(config: &AppConfig, overlay: Arc<SharedOverlay>) -> ApplicationService {
    let clock = Arc::new(SystemClock);
    let device: Box<dyn CaptureDevice> = match &config.frame_source {
        FrameSource::Synthetic => Box::new(SyntheticCamera::new()),
        FrameSource::Folder(path) => Box::new(ImageFolderCamera::new(path.clone())),
    };
    let runner = BackgroundInspectionRunner::new(
        device,
        Box::new(ColorThresholdDetector::new()),
        overlay,
        clock.clone(),
        config.tick_interval(),
    );
    let writers: Vec<Box<dyn ReportWriter>> =
        vec![Box::new(XlsxReportWriter), Box::new(PdfReportWriter)];
    ApplicationService::new(
        Box::new(SqliteSnapshotStore::new(config.snapshot_path.clone())),
        Box::new(runner),
        writers,
        clock,
    )
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let config = apply_overrides(&cli, AppConfig::default());
    let overlay = Arc::new(SharedOverlay::new());
    let mut service = build_application_service(&config, overlay.clone());
    service
        .bootstrap(BootstrapCommand)
        .map_err(|error| CommandError::Runtime(format!("failed to bootstrap product-inspect: {error}")))?;
    info!(
        snapshot_path = %config.snapshot_path.display(),
        source = %config.frame_source.describe(),
        "product-inspect ready"
    );

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => ui::launch_window(&mut service, overlay, &config).map_err(CommandError::Runtime),
        Command::Dashboard => {
            println!("{}", present_dashboard(&service.dashboard(DashboardQuery)));
            Ok(())
        }
        Command::History { limit } => {
            let detections = service.recent_detections(RecentDetectionsQuery { limit });
            if detections.is_empty() {
                println!("no detections recorded");
                return Ok(());
            }
            for detection in detections {
                println!("{}", present_detection_row(&detection));
            }
            Ok(())
        }
        Command::Inspect(args) => run_inspection(&mut service, &overlay, &config, args),
        Command::Products(command) => run_products(&mut service, command),
        Command::Samples(SamplesCommand::Upload { kind, files }) => {
            let report = service
                .upload_training_samples(UploadSamplesCommand {
                    kind: kind.into(),
                    files,
                })
                .map_err(|error| CommandError::Runtime(format!("upload failed: {error}")))?;
            println!("{}", present_upload(&report));
            Ok(())
        }
        Command::Train => {
            println!("{}", service.train_model(TrainModelCommand));
            Ok(())
        }
        Command::Report(ReportCommand::Show) => {
            println!("{}", present_report_table(&service.report_preview(ReportPreviewQuery)));
            Ok(())
        }
        Command::Report(ReportCommand::Export { format, out_dir }) => {
            let path = service
                .export_report(ExportReportCommand {
                    format: format.into(),
                    out_dir: out_dir.unwrap_or_else(|| config.report_dir.clone()),
                })
                .map_err(|error| CommandError::Runtime(error.to_string()))?;
            println!("report written to {}", path.display());
            Ok(())
        }
    }
}

fn run_inspection(
    service: &mut ApplicationService,
    overlay: &SharedOverlay,
    config: &AppConfig,
    args: InspectArgs,
) -> Result<(), CommandError> {
    let deadline = inspection_deadline(Instant::now(), args.duration_secs)?;
    overlay.set_attached(true);
    let status = service
        .start_inspection(StartInspectionCommand {
            request: config.capture,
        })
        .map_err(|error| CommandError::Runtime(error.to_string()))?;
    println!(
        "inspecting {} for {}s: {}",
        config.frame_source.describe(),
        args.duration_secs,
        present_status(&status)
    );

    let mut recorded = 0;
    while Instant::now() < deadline {
        thread::sleep(POLL_INTERVAL);
        recorded += service
            .poll_inspection(PollInspectionCommand)
            .map_err(|error| CommandError::Runtime(error.to_string()))?;
        if !service.inspection_status(InspectionStatusQuery).active {
            let metrics = service
                .inspection_metrics(InspectionMetricsQuery)
                .map_err(|error| CommandError::Runtime(error.to_string()))?;
            eprintln!("{}", early_end_message(&config.frame_source, &metrics));
            break;
        }
    }

    let metrics = service
        .inspection_metrics(InspectionMetricsQuery)
        .map_err(|error| CommandError::Runtime(error.to_string()))?;
    recorded += service
        .stop_inspection(StopInspectionCommand)
        .map_err(|error| CommandError::Runtime(error.to_string()))?;

    if let Some(path) = args.snapshot {
        match overlay.latest() {
            Some(frame) => {
                write_png(&frame, &path).map_err(|error| CommandError::Runtime(error.to_string()))?;
                println!("annotated frame written to {}", path.display());
            }
            None => eprintln!("no frame was captured; snapshot skipped"),
        }
    }

    println!("recorded {recorded} detections");
    println!("{}", present_metrics(&metrics));
    println!("{}", present_dashboard(&service.dashboard(DashboardQuery)));
    Ok(())
}

fn inspection_deadline(start: Instant, duration_secs: u64) -> Result<Instant, CommandError> {
    start
        .checked_add(Duration::from_secs(duration_secs))
        .ok_or_else(|| CommandError::Usage(format!("duration too large: {duration_secs}s")))
}

fn early_end_message(source: &FrameSource, metrics: &TickMetrics) -> String {
    let hint = match source {
        FrameSource::Synthetic => "the synthetic feed stopped",
        FrameSource::Folder(_) => "no readable frames remain in the folder",
    };
    format!(
        "capture feed from {} ended early after {} frames ({} idle ticks): {hint}",
        source.describe(),
        metrics.ticks_run,
        metrics.ticks_idle
    )
}

fn run_products(service: &mut ApplicationService, command: ProductsCommand) -> Result<(), CommandError> {
    match command {
        ProductsCommand::List => {
            let products = service.list_products(ListProductsQuery);
            if products.is_empty() {
                println!("no products configured");
            }
            for product in &products {
                println!("{}", present_product_row(product));
            }
            let samples = service.company().training_samples;
            println!(
                "training samples: good={} defective={}",
                samples.good, samples.defective
            );
            Ok(())
        }
        ProductsCommand::Add(fields) => {
            let id = service
                .add_product(AddProductCommand {
                    draft: fields.into_draft(),
                })
                .map_err(|error| CommandError::Runtime(format!("add failed: {error}")))?;
            println!("product {} added", id.get());
            Ok(())
        }
        ProductsCommand::Update { id, fields } => {
            let id = parse_product_id(id)?;
            service
                .update_product(UpdateProductCommand {
                    id,
                    draft: fields.into_draft(),
                })
                .map_err(|error| CommandError::Runtime(format!("update failed: {error}")))?;
            println!("product {} updated", id.get());
            Ok(())
        }
        ProductsCommand::Delete { id, yes } => {
            let id = parse_product_id(id)?;
            let confirmed = yes || confirm(DELETE_PROMPT, &mut io::stdin().lock())?;
            let removed = service
                .delete_product(DeleteProductCommand { id, confirmed })
                .map_err(|error| CommandError::Runtime(format!("delete failed: {error}")))?;
            match (confirmed, removed) {
                (false, _) => println!("delete cancelled"),
                (true, 0) => println!("no product with id {}", id.get()),
                (true, _) => println!("product {} deleted", id.get()),
            }
            Ok(())
        }
    }
}

fn parse_product_id(id: i64) -> Result<ProductId, CommandError> {
    ProductId::new(id).map_err(|error| CommandError::Usage(format!("invalid product id: {error}")))
}

fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool, CommandError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|error| CommandError::Runtime(error.to_string()))?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|error| CommandError::Runtime(error.to_string()))?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
