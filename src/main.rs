// src/main.rs
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use microrheo::{
    render_moduli_png, ComplexModuli, Execution, MicrorheologyPipeline, ModuliConfig, PlotStyle,
    SignalTable,
};

#[derive(Parser)]
#[command(name = "microrheo")]
#[command(about = "Viscoelastic moduli from a measured relaxation curve", long_about = None)]
#[command(version)]
struct Cli {
    /// Whitespace-delimited table: time in column 0, normalized signal in column 1
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// JSON file with moduli settings; flags below override it
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Thermal energy scale
    #[arg(long)]
    kt: Option<f64>,

    /// Probe length scale
    #[arg(long)]
    at: Option<f64>,

    /// Resample on a log-spaced grid with a cubic spline before transforming
    #[arg(long)]
    interpolate: bool,

    /// Oversampling factor used with --interpolate
    #[arg(long)]
    n_times: Option<usize>,

    /// Number of log-spaced frequencies
    #[arg(short = 'n', long)]
    frequencies: Option<usize>,

    /// Largest tolerated gap between g_dot_inf and the last segment slope
    #[arg(long)]
    asymptote_tolerance: Option<f64>,

    /// Evaluate on a pool of this many worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Write a log-log PNG of the moduli
    #[arg(long, value_name = "PNG")]
    plot: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit JSON instead of three text columns
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let execution = match cli.workers {
        Some(workers) => Execution::Parallel { workers },
        None => Execution::Sequential,
    };
    let table = SignalTable::from_path(&cli.input)
        .with_context(|| format!("failed to read table {}", cli.input.display()))?;
    log::info!(
        "read {} rows x {} columns from {}",
        table.rows(),
        table.columns(),
        cli.input.display()
    );

    let moduli = MicrorheologyPipeline::new(config)
        .with_execution(execution)
        .process(&table)
        .context("moduli computation failed")?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_moduli(BufWriter::new(file), &moduli, cli.json)?;
        }
        None => write_moduli(io::stdout().lock(), &moduli, cli.json)?,
    }

    if let Some(path) = &cli.plot {
        let png = render_moduli_png(&moduli, PlotStyle::default())?;
        std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("plot saved to {}", path.display());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ModuliConfig> {
    let mut config = match &cli.config {
        Some(path) => ModuliConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ModuliConfig::default(),
    };
    if let Some(kt) = cli.kt {
        config.kt = kt;
    }
    if let Some(at) = cli.at {
        config.at = at;
    }
    if cli.interpolate {
        config.interpolate = true;
    }
    if let Some(n_times) = cli.n_times {
        config.n_times = n_times;
    }
    if let Some(n) = cli.frequencies {
        config.n_frequencies = n;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(tolerance) = cli.asymptote_tolerance {
        config.asymptote_tolerance = tolerance;
    }
    Ok(config)
}

fn write_moduli(mut out: impl Write, moduli: &ComplexModuli, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut out, moduli)?;
        writeln!(out)?;
    } else {
        writeln!(out, "# frequency storage_modulus loss_modulus")?;
        for (omega, storage, loss) in moduli.rows() {
            writeln!(out, "{omega:.6e} {storage:.6e} {loss:.6e}")?;
        }
    }
    out.flush()?;
    Ok(())
}
