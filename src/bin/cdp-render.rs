use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cdp_render::{
    AudioInfoCache, AudioInfoProvider, CycleCountCache, FfprobeProvider, RenderConfig,
    RenderEvent, RenderJob, RenderOutcome, RenderPipeline, TempNamer, TimeRange,
};

#[derive(Parser, Debug)]
#[command(name = "cdp-render", version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a render job through the CDP toolchain.
    Render(RenderArgs),
    /// Write one parameter's curve file and print the resulting argument.
    Curve(CurveArgs),
    /// Print channel count, sample rate and length of an audio file (requires `ffprobe`).
    Probe(ProbeArgs),
    /// Count wave cycles in an audio file with `distort cyclecnt`.
    Cycles(CyclesArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Render configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CDP binaries directory (overrides the configuration file).
    #[arg(long)]
    binaries: Option<PathBuf>,

    /// Directory for intermediate files (overrides the configuration file).
    #[arg(long)]
    render_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Render job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Move the rendered file here instead of leaving it in the render directory.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct CurveArgs {
    /// Render job JSON holding the processor and selection.
    #[arg(long)]
    job: PathBuf,

    /// Parameter name.
    #[arg(long)]
    param: String,

    /// Input duration in seconds; probed from the job's input when omitted.
    #[arg(long)]
    duration: Option<f64>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct CyclesArgs {
    file: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Curve(args) => cmd_curve(args),
        Command::Probe(args) => cmd_probe(args),
        Command::Cycles(args) => cmd_cycles(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<RenderConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => RenderConfig::default(),
    };
    if let Some(dir) = &args.binaries {
        cfg.binaries_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.render_dir {
        cfg.render_dir = dir.clone();
    }
    Ok(cfg)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let job = RenderJob::load(&args.job)?;
    let audio = AudioInfoCache::new(FfprobeProvider::default());

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            match event {
                RenderEvent::Status(s) => eprintln!("{s}"),
                RenderEvent::Failed(s) => eprintln!("failed: {s}"),
                RenderEvent::Superseded { .. } | RenderEvent::Committed(_) => {}
            }
        }
    });

    let pipeline = RenderPipeline::new(cfg).with_events(tx);
    let outcome = pipeline.render(&job, &audio);
    let output = pipeline.take_committed_output();
    drop(pipeline);
    let _ = printer.join();

    match outcome? {
        RenderOutcome::Committed(_) => {}
        RenderOutcome::Superseded => anyhow::bail!("render was superseded"),
    }
    let output = output.context("render committed no output")?;
    let output = match args.out {
        Some(out) => {
            move_file(&output, &out)?;
            out
        }
        None => output,
    };
    println!("{}", output.display());
    Ok(())
}

fn move_file(from: &Path, to: &Path) -> anyhow::Result<()> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to)
            .with_context(|| format!("copy '{}' to '{}'", from.display(), to.display()))?;
        std::fs::remove_file(from).with_context(|| format!("remove '{}'", from.display()))?;
    }
    Ok(())
}

fn cmd_curve(args: CurveArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let job = RenderJob::load(&args.job)?;
    let duration = match args.duration {
        Some(d) => d,
        None => FfprobeProvider::default().get_length_seconds(&job.input)?,
    };
    let param = job
        .processor
        .parameter(&args.param)
        .with_context(|| format!("no parameter named '{}'", args.param))?;
    let selection: TimeRange = job.resolve_selection(duration)?;
    let namer = TempNamer::new(&cfg.render_dir);
    let arg = cdp_render::materialize_argument(
        param,
        &job.processor,
        duration,
        selection,
        cfg.curve_subdivisions,
        &namer,
    )?;
    println!("{}", arg.text);
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = FfprobeProvider::default().probe(&args.file)?;
    let out = serde_json::json!({
        "channels": info.channels,
        "sample_rate": info.sample_rate,
        "length_frames": info.length_frames,
        "length_seconds": info.length_seconds(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_cycles(args: CyclesArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    cfg.validate_binaries()?;
    let count = CycleCountCache::new().count(&cfg, &args.file)?;
    println!("{count}");
    Ok(())
}
