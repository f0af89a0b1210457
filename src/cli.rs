// Command-line interface for BPS patch tooling.
//
// Three subcommands: `encode` creates a patch, `decode` applies one,
// `info` prints a patch's framing and command statistics. Warnings from
// decode go to stderr and do not affect the exit code; hard errors
// exit nonzero.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::bps::command::Command as BpsCommand;
use crate::bps::decoder::Patch;
use crate::bps::encoder::EncodeOptions;
use crate::io;
use crate::search::Backend;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// BPS v1 binary patch encoder/decoder.
#[derive(Parser, Debug)]
#[command(
    name = "bpsdelta",
    version,
    about = "BPS binary patch encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a patch from a source file and a target file.
    Encode(EncodeArgs),
    /// Apply a patch to a source file.
    Decode(DecodeArgs),
    /// Print a patch's header, checksums, and command statistics.
    Info(InfoArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// Pick by source size.
    Auto,
    Linear,
    Rolling,
    Suffix,
}

impl BackendArg {
    fn resolve(self) -> Option<Backend> {
        match self {
            Self::Auto => None,
            Self::Linear => Some(Backend::Linear),
            Self::Rolling => Some(Backend::RollingHash),
            Self::Suffix => Some(Backend::SuffixArray),
        }
    }
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Original file the patch will be applied to.
    source: PathBuf,
    /// Modified file the patch reproduces.
    target: PathBuf,
    /// Patch file to write.
    patch: PathBuf,
    /// Metadata string stored in the patch header.
    metadata: Option<String>,

    /// Substring-search backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Original file the patch applies to.
    source: PathBuf,
    /// Patch file to apply.
    patch: PathBuf,
    /// Output file for the reconstructed target.
    target: PathBuf,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Patch file to inspect.
    patch: PathBuf,

    /// List every command instead of summary counts.
    #[arg(long)]
    commands: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let exit_code = match &cli.command {
        Cmd::Encode(args) => cmd_encode(&cli, args),
        Cmd::Decode(args) => cmd_decode(&cli, args),
        Cmd::Info(args) => cmd_info(args),
    };
    process::exit(exit_code);
}

fn refuse_overwrite(path: &Path, force: bool) -> bool {
    if !force && path.exists() {
        eprintln!(
            "bpsdelta: {}: exists, use --force to overwrite",
            path.display()
        );
        return true;
    }
    false
}

fn cmd_encode(cli: &Cli, args: &EncodeArgs) -> i32 {
    if refuse_overwrite(&args.patch, cli.force) {
        return 1;
    }
    let opts = EncodeOptions {
        backend: args.backend.resolve(),
    };
    match io::encode_file(
        &args.source,
        &args.target,
        &args.patch,
        args.metadata.as_deref().unwrap_or(""),
        &opts,
    ) {
        Ok(stats) => {
            if !cli.quiet {
                eprintln!(
                    "bpsdelta: {} -> {} bytes ({:.1}% of target)",
                    stats.target_size,
                    stats.patch_size,
                    stats.ratio() * 100.0
                );
            }
            0
        }
        Err(e) => {
            eprintln!("bpsdelta: encode: {e}");
            1
        }
    }
}

fn cmd_decode(cli: &Cli, args: &DecodeArgs) -> i32 {
    if refuse_overwrite(&args.target, cli.force) {
        return 1;
    }
    match io::decode_file(&args.source, &args.patch, &args.target) {
        Ok(stats) => {
            // Warnings are diagnostic: the output was still written and
            // the exit code stays zero.
            for w in &stats.warnings {
                eprintln!("bpsdelta: warning: {w}");
            }
            if !cli.quiet {
                eprintln!("bpsdelta: wrote {} bytes", stats.output_size);
            }
            0
        }
        Err(e) => {
            eprintln!("bpsdelta: decode: {e}");
            1
        }
    }
}

fn cmd_info(args: &InfoArgs) -> i32 {
    let data = match std::fs::read(&args.patch) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("bpsdelta: {}: {e}", args.patch.display());
            return 1;
        }
    };
    let patch = match Patch::parse(&data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("bpsdelta: {}: {e}", args.patch.display());
            return 1;
        }
    };

    println!("patch size:   {}", data.len());
    println!("source size:  {}", patch.header.source_size);
    println!("target size:  {}", patch.header.target_size);
    println!(
        "metadata:     {}",
        if patch.header.metadata.is_empty() {
            "(none)".into()
        } else {
            String::from_utf8_lossy(&patch.header.metadata)
        }
    );
    println!("source crc32: {:08X}", patch.trailer.source_crc);
    println!("target crc32: {:08X}", patch.trailer.target_crc);
    println!("patch crc32:  {:08X}", patch.trailer.patch_crc);

    let mut counts = [0usize; 4];
    let mut out_bytes = 0usize;
    for cmd in patch.commands() {
        let cmd = match cmd {
            Ok(c) => c,
            Err(e) => {
                eprintln!("bpsdelta: command stream: {e}");
                return 1;
            }
        };
        let (name, idx) = match cmd {
            BpsCommand::SourceRead { .. } => ("SourceRead", 0),
            BpsCommand::TargetRead { .. } => ("TargetRead", 1),
            BpsCommand::SourceCopy { .. } => ("SourceCopy", 2),
            BpsCommand::TargetCopy { .. } => ("TargetCopy", 3),
        };
        counts[idx] += 1;
        out_bytes += cmd.length();
        if args.commands {
            match cmd {
                BpsCommand::SourceCopy { length, delta }
                | BpsCommand::TargetCopy { length, delta } => {
                    println!("  {name} length={length} delta={delta:+}");
                }
                _ => println!("  {name} length={}", cmd.length()),
            }
        }
    }
    println!(
        "commands:     {} SourceRead, {} TargetRead, {} SourceCopy, {} TargetCopy ({out_bytes} output bytes)",
        counts[0], counts[1], counts[2], counts[3]
    );
    0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
