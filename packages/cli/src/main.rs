mod api_client;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Fingerprint;

use crate::api_client::{ApiClient, Receipt};

#[derive(Parser)]
#[command(name = "receipt")]
#[command(about = "Issue and look up origin receipts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Receipt server base URL.
    #[arg(
        long,
        global = true,
        env = "ORIGIN_RECEIPT_SERVER",
        default_value = "http://127.0.0.1:3000"
    )]
    server: String,
}

#[derive(Subcommand)]
enum Command {
    /// Compute a file's receipt id locally, without contacting the server.
    Fingerprint { file: PathBuf },
    /// Upload a file and print its receipt.
    Issue { file: PathBuf },
    /// Print the receipt stored under an id.
    Show { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Fingerprint { file } => {
            let fp = fingerprint_file(&file)?;
            println!("id:           {}", fp.id);
            println!("content hash: {}", fp.content_hash);
            println!("size:         {} bytes", fp.size_bytes);
        }
        Command::Issue { file } => {
            let client = ApiClient::new(&cli.server)?;
            let issued = client.issue(&file)?;
            print_receipt(&issued.receipt);
            println!("url:          {}", client.url(&issued.url)?);
        }
        Command::Show { id } => {
            let client = ApiClient::new(&cli.server)?;
            match client.show(&id)? {
                Some(receipt) => print_receipt(&receipt),
                None => {
                    eprintln!("Not found");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn fingerprint_file(path: &Path) -> Result<Fingerprint> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Fingerprint::from_reader(file)
        .with_context(|| format!("failed to read {}", path.display()))
}

fn print_receipt(receipt: &Receipt) {
    println!("id:           {}", receipt.id);
    println!("created at:   {}", receipt.created_at);
    println!("content hash: {}", receipt.content_hash);
    println!("filename:     {}", receipt.filename.as_deref().unwrap_or("-"));
    println!("type:         {}", receipt.mime.as_deref().unwrap_or("-"));
    println!("size:         {} bytes", receipt.size_bytes);
}
