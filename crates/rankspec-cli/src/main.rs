mod config;
mod input;
mod report;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use rankspec_core::{all_tabloids, rank, unrank, DenseMatrix, MatrixView, Shape, Tabloid};
use rankspec_engine::{final_decomposition, raw_data_sorting, JohnsonCache, JohnsonGraph};

use config::OutputFormat;
use report::Report;

#[derive(Parser)]
#[command(
    name = "rankspec",
    version,
    about = "Spectral decomposition of approval data over Johnson graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompose a purified 0/1 data file
    Decompose {
        /// JSON array of rows, one 0/1 entry per item
        file: PathBuf,

        /// Expected number of items per row
        #[arg(short = 'n', long)]
        items: Option<usize>,

        /// Output format (default from config)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Ranked rows shown per component in table mode (default from config)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Print the rank of a tabloid, e.g. `--tabloid 1,2,1`
    Rank {
        #[arg(short, long)]
        tabloid: Tabloid,
    },

    /// Print the tabloid of a given shape and rank
    Unrank {
        /// Shape, e.g. `2,1`
        #[arg(short, long)]
        shape: Shape,

        /// 1-based rank
        rank: usize,
    },

    /// Describe the Johnson graph J(n, k)
    Johnson {
        #[arg(short, long)]
        n: usize,

        #[arg(short, long)]
        k: usize,
    },

    /// Time Johnson cache construction and a synthetic decomposition
    Bench {
        /// Largest number of items
        #[arg(long, default_value = "8")]
        max_n: usize,
    },

    /// Show configuration path and effective values
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decompose {
            file,
            items,
            format,
            top,
        } => cmd_decompose(&file, items, format, top),
        Commands::Rank { tabloid } => cmd_rank(&tabloid),
        Commands::Unrank { shape, rank } => cmd_unrank(&shape, rank),
        Commands::Johnson { n, k } => cmd_johnson(n, k),
        Commands::Bench { max_n } => cmd_bench(max_n),
        Commands::Config => cmd_config(),
    }
}

fn cmd_decompose(
    file: &Path,
    items: Option<usize>,
    format: Option<OutputFormat>,
    top: Option<usize>,
) -> Result<()> {
    let cfg = config::load_config()?;
    let dataset = input::load_dataset(file, items)?;
    let n = dataset.matrix.cols();

    let min_n = cfg.johnson.min_n.min(n);
    let max_n = cfg.johnson.max_n.max(n);
    let cache = JohnsonCache::build(min_n..=max_n).context("building Johnson graphs")?;

    let sorted = raw_data_sorting(&dataset.matrix, n)?;
    let decomposition = final_decomposition(&sorted, &cache)?;
    info!(
        file = %file.display(),
        components = decomposition.components.len(),
        "decomposed"
    );
    let report = Report::new(&sorted, decomposition, dataset.fingerprint);

    match format.unwrap_or(cfg.output.format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", report.render_table(top.unwrap_or(cfg.output.top))),
    }
    Ok(())
}

fn cmd_rank(tabloid: &Tabloid) -> Result<()> {
    let shape = tabloid.shape()?;
    let r = rank(tabloid)?;
    println!("{tabloid}  shape {shape}  rank {r} of {}", shape.size());
    Ok(())
}

fn cmd_unrank(shape: &Shape, r: usize) -> Result<()> {
    if r == 0 || r > shape.size() {
        bail!("rank {r} out of range 1..={} for shape {shape}", shape.size());
    }
    println!("{}", unrank(r, shape)?);
    Ok(())
}

fn cmd_johnson(n: usize, k: usize) -> Result<()> {
    let t0 = Instant::now();
    let graph = JohnsonGraph::build(n, k)?;
    let build_ms = t0.elapsed().as_secs_f64() * 1000.0;

    println!("J({n}, {k}), tabloid shape {}", graph.shape());
    println!("{}", "─".repeat(58));
    println!("  vertices   = {}", graph.order());
    println!("  edges      = {}", graph.adjacency().nnz() / 2);
    println!("  degree     = {}", graph.degree());
    println!("  symmetric  = {}", graph.adjacency().is_symmetric());
    println!("  built in   {}", format_duration(build_ms));
    println!();
    println!("{:>4} {:>12} {:>10}", "m", "eigenvalue", "dimension");
    for (m, (theta, dim)) in graph
        .eigenvalues()
        .into_iter()
        .zip(graph.eigenspace_dims())
        .enumerate()
    {
        println!("{m:>4} {theta:>12} {dim:>10}");
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    let cfg = config::load_config()?;
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[johnson]");
    println!("  min_n = {}", cfg.johnson.min_n);
    println!("  max_n = {}", cfg.johnson.max_n);
    println!();
    println!("[output]");
    let format = match cfg.output.format {
        OutputFormat::Table => "table",
        OutputFormat::Json => "json",
    };
    println!("  format = {format}");
    println!("  top = {}", cfg.output.top);
    Ok(())
}

/// Deterministic approval rows: each item has its own approval rate.
fn synthetic_data(rows: usize, n: usize) -> Result<DenseMatrix> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let data: Vec<Vec<f64>> = (0..rows)
        .map(|_| {
            (0..n)
                .map(|item| {
                    state = state
                        .wrapping_mul(6_364_136_223_846_793_005)
                        .wrapping_add(1_442_695_040_888_963_407);
                    let u = (state >> 33) as f64 / (1u64 << 31) as f64;
                    let rate = 0.3 + 0.4 * item as f64 / n.max(1) as f64;
                    if u < rate {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();
    Ok(DenseMatrix::from_real_rows(&data)?)
}

fn cmd_bench(max_n: usize) -> Result<()> {
    const ROWS: usize = 1000;

    if max_n < 2 {
        bail!("--max-n must be at least 2");
    }

    // --- Johnson cache ---
    let t0 = Instant::now();
    let cache = JohnsonCache::build(2..=max_n)?;
    let cache_ms = t0.elapsed().as_secs_f64() * 1000.0;

    // --- Rank / unrank round trip on the middle shape ---
    let shape = Shape::two_row(max_n, max_n / 2)?;
    let tabloids = all_tabloids(&shape)?;
    let t0 = Instant::now();
    for t in &tabloids {
        let r = rank(t)?;
        let back = unrank(r, &shape)?;
        if &back != t {
            bail!("rank/unrank mismatch for {t}");
        }
    }
    let rank_ms = t0.elapsed().as_secs_f64() * 1000.0;

    // --- Sorting and decomposition ---
    let data = synthetic_data(ROWS, max_n)?;
    let t0 = Instant::now();
    let sorted = raw_data_sorting(&data, max_n)?;
    let sort_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let t0 = Instant::now();
    let decomposition = final_decomposition(&sorted, &cache)?;
    let decompose_ms = t0.elapsed().as_secs_f64() * 1000.0;

    // --- Output ---
    println!("rankspec benchmark (n = 2..={max_n}, {ROWS} synthetic rows)");
    println!("{}", "─".repeat(58));
    print_bench_row("Johnson cache", cache.len(), cache_ms);
    print_bench_row("Rank + unrank", tabloids.len(), rank_ms);
    print_bench_row("Raw data sorting", ROWS, sort_ms);
    print_bench_row(
        "Final decomposition",
        decomposition.components.len(),
        decompose_ms,
    );
    println!("{}", "─".repeat(58));
    println!(
        "Platform: {}-{}",
        std::env::consts::ARCH,
        std::env::consts::OS
    );

    Ok(())
}

fn print_bench_row(label: &str, ops: usize, total_ms: f64) {
    let per_op = total_ms / ops.max(1) as f64;
    let (total_str, per_str) = (format_duration(total_ms), format_duration(per_op));
    println!(
        "{:<24} {:>6} ops {:>12} {:>12}/op",
        label, ops, total_str, per_str
    );
}

fn format_duration(ms: f64) -> String {
    if ms < 0.001 {
        format!("{:.1} ns", ms * 1_000_000.0)
    } else if ms < 1.0 {
        format!("{:.1} µs", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.1} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}
