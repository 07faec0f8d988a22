use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use static_huffman::{HuffmanError, decode, encode};

#[derive(Parser)]
#[command(name = "huffman", version)]
#[command(about = "Compress or decompress a file with a static Huffman code.", long_about = None)]
struct Cli {
    /// Don't print the summary after a successful run
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Compress SOURCE into DEST
    Encode { source: PathBuf, dest: PathBuf },
    /// Decompress SOURCE into DEST
    Decode { source: PathBuf, dest: PathBuf },
}

fn open_input(path: &Path) -> Result<File, HuffmanError> {
    File::open(path)
        .inspect_err(|e| error!("Failed to open input file {}: {}", path.display(), e))
        .map_err(HuffmanError::from)
}

fn create_output(path: &Path) -> Result<File, HuffmanError> {
    File::create(path)
        .inspect_err(|e| error!("Failed to open output file {}: {}", path.display(), e))
        .map_err(HuffmanError::from)
}

fn run_encode(source: &Path, dest: &Path, quiet: bool) -> Result<(), HuffmanError> {
    let mut input = BufReader::new(open_input(source)?);
    let mut output = BufWriter::new(create_output(dest)?);
    let report = encode(&mut input, &mut output)?;
    output.flush()?;

    if !quiet {
        println!(
            "\r\n✅ Encoding successful.\n\
             📂  Input:       {} ({} bytes)\n\
             💾  Output:      {} ({} bytes)\n\
             🔣  Symbols:     {}\n\
             ℹ️  Entropy:     {:.4} bits/symbol\n\
             🗜️  Ratio:       {:.4}%",
            source.display(),
            report.original_size,
            dest.display(),
            report.total_size(),
            report.active_symbols,
            report.entropy,
            report.ratio()
        );
    }
    Ok(())
}

fn run_decode(source: &Path, dest: &Path, quiet: bool) -> Result<(), HuffmanError> {
    let mut input = BufReader::new(open_input(source)?);
    let mut output = BufWriter::new(create_output(dest)?);
    let result = decode(&mut input, &mut output);
    // Whatever was decoded before a failure stays in the output.
    output.flush()?;
    let report = result?;

    if !quiet {
        let input_size = fs::metadata(source).map(|m| m.len()).unwrap_or(0);
        println!(
            "\r\n✅ Decoding successful.\n\
             📂  Input:       {} ({} bytes)\n\
             💾  Output:      {} ({} bytes)\n\
             🔣  Symbols:     {}",
            source.display(),
            input_size,
            dest.display(),
            report.original_size,
            report.active_symbols
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let result = match &cli.mode {
        Mode::Encode { source, dest } => {
            info!("--- Start Encoding ---");
            run_encode(source, dest, cli.quiet)
        }
        Mode::Decode { source, dest } => {
            info!("--- Start Decoding ---");
            run_decode(source, dest, cli.quiet)
        }
    };

    match result {
        Ok(()) => {
            info!("--- End ---");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("huffman: {}", e);
            ExitCode::FAILURE
        }
    }
}
