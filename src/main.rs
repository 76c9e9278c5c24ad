use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use seq_assembler::assemble::{self, Algorithm, AssembleOpt};
use seq_assembler::correct::{self, CorrectOpt};
use seq_assembler::io::fasta;
use seq_assembler::report::RunReport;
use seq_assembler::util::CancelToken;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seq-assembler", author, version, about = "Assemble short overlapping reads into contigs", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble reads (FASTA) into contigs
    Assemble {
        /// Reads FASTA file
        input: PathBuf,
        /// Output FASTA path
        #[arg(default_value = "output.fasta")]
        output: PathBuf,
        /// JSON options file; command-line flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(short = 'a', long, value_enum)]
        algorithm: Option<Algorithm>,
        /// De Bruijn k-mer length
        #[arg(short = 'k', long)]
        k: Option<usize>,
        #[arg(long = "no-error-correction")]
        no_error_correction: bool,
        #[arg(long = "correction-k")]
        correction_k: Option<usize>,
        /// K-mers seen at most this many times are suspicious
        #[arg(long)]
        threshold: Option<u32>,
        #[arg(short = 'm', long = "min-overlap")]
        min_overlap: Option<usize>,
        #[arg(long = "mismatch-fraction")]
        mismatch_fraction: Option<f64>,
        #[arg(long = "no-simplify")]
        no_simplify: bool,
        #[arg(short = 't', long)]
        threads: Option<usize>,
        /// Write a JSON run report
        #[arg(long)]
        report: Option<PathBuf>,
        /// Retry with OLC when the De Bruijn graph is not Eulerian
        #[arg(long = "fallback-olc")]
        fallback_olc: bool,
    },
    /// Only run k-mer error correction and write the corrected reads
    Correct {
        input: PathBuf,
        #[arg(default_value = "corrected.fasta")]
        output: PathBuf,
        #[arg(short = 'k', long, default_value_t = 10)]
        k: usize,
        #[arg(long, default_value_t = 2)]
        threshold: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Assemble {
            input,
            output,
            config,
            algorithm,
            k,
            no_error_correction,
            correction_k,
            threshold,
            min_overlap,
            mismatch_fraction,
            no_simplify,
            threads,
            report,
            fallback_olc,
        } => {
            let mut opt = match config.as_deref() {
                Some(p) => load_config(p)?,
                None => AssembleOpt::default(),
            };
            if let Some(a) = algorithm {
                opt.algorithm = a;
            }
            if let Some(k) = k {
                opt.k = k;
            }
            if no_error_correction {
                opt.correction.enabled = false;
            }
            if let Some(ck) = correction_k {
                opt.correction.k = ck;
            }
            if let Some(t) = threshold {
                opt.correction.threshold = t;
            }
            if let Some(m) = min_overlap {
                opt.min_overlap = m;
            }
            if let Some(f) = mismatch_fraction {
                opt.mismatch_fraction = f;
            }
            if no_simplify {
                opt.simplify = false;
            }
            if let Some(t) = threads {
                opt.threads = t;
            }
            run_assemble(&input, &output, &opt, report.as_deref(), fallback_olc)
        }
        Commands::Correct { input, output, k, threshold } => {
            let opt = CorrectOpt { enabled: true, k, threshold };
            run_correct(&input, &output, &opt)
        }
    }
}

fn load_config(path: &Path) -> Result<AssembleOpt> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config '{}'", path.display()))
}

fn load_reads(path: &Path) -> Result<Vec<Vec<u8>>> {
    let reads = fasta::read_sequences(path)?;
    if reads.is_empty() {
        anyhow::bail!("FASTA file '{}' contains no sequences", path.display());
    }
    info!(reads = reads.len(), input = %path.display(), "reads loaded");
    Ok(reads)
}

fn run_assemble(input: &Path, output: &Path, opt: &AssembleOpt, report: Option<&Path>, fallback_olc: bool) -> Result<()> {
    let reads = load_reads(input)?;
    let started = Instant::now();
    let cancel = CancelToken::new();

    let asm = if fallback_olc {
        assemble::assemble_with_fallback(&reads, opt, Algorithm::Olc, &cancel)?
    } else {
        assemble::assemble(&reads, opt, &cancel)?
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if asm.is_empty() {
        warn!("no contig survived the noise filter; output will be empty");
    }
    fasta::write_file(output, "contig_", &asm.contigs)?;
    info!(output = %output.display(), contigs = asm.contigs.len(), elapsed_ms, "contigs written");

    if let Some(path) = report {
        let rep = RunReport::new(
            &input.display().to_string(),
            &output.display().to_string(),
            reads.len(),
            opt,
            &asm,
            elapsed_ms,
        );
        std::fs::write(path, rep.to_json()?).with_context(|| format!("cannot write report '{}'", path.display()))?;
        info!(report = %path.display(), "report written");
    }
    Ok(())
}

fn run_correct(input: &Path, output: &Path, opt: &CorrectOpt) -> Result<()> {
    if opt.k == 0 {
        anyhow::bail!("k must be at least 1");
    }
    let reads = load_reads(input)?;
    let fixed = correct::correct_reads(&reads, opt, &CancelToken::new())?;
    fasta::write_file(output, "read_", &fixed)?;
    info!(output = %output.display(), "corrected reads written");
    Ok(())
}
