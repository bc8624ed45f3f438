use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use cloudnotes::client::{self, UnlockedNote};
use cloudnotes::{NotesService, ServiceConfig};
use cn_crypto::Decryption;

#[derive(Parser, Debug)]
#[command(name = "cloudnotes")]
#[command(author, version, about = "Zero-knowledge notes with burn-after-read sharing", long_about = None)]
struct Cli {
    /// Config file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Admin credential for the note vault
    #[arg(long, global = true, env = "CLOUDNOTES_CREDENTIAL", hide_env_values = true)]
    credential: Option<String>,

    /// Note passphrase (prompted when omitted)
    #[arg(long, global = true, env = "CLOUDNOTES_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt and store a note (reads stdin when --text is omitted)
    Save {
        #[arg(long)]
        text: Option<String>,
    },
    /// List the notes the passphrase opens
    List,
    /// Delete a note by id
    Delete { id: i64 },
    /// Publish a note as a one-time share link
    Share {
        id: i64,
        /// Page the link points at
        #[arg(long, default_value = "http://localhost:8787/")]
        base_url: String,
    },
    /// Open (and burn) a shared note
    Open { public_id: String },
    /// Write a decrypted note to Note_<id>.txt
    Export {
        id: i64,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudnotes=info,cn_store=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let service = NotesService::open(&config).await?;

    match &cli.command {
        Commands::Save { text } => {
            let text = match text {
                Some(text) => text.clone(),
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            if text.trim().is_empty() {
                bail!("note is empty");
            }
            let passphrase = passphrase(&cli)?;
            let id = client::save_note(&service, credential(&cli)?, &text, &passphrase).await?;
            print_json(&serde_json::json!({ "id": id }))?;
        }

        Commands::List => {
            let passphrase = passphrase(&cli)?;
            let notes = client::load_notes(&service, credential(&cli)?, &passphrase).await?;
            print_json(&notes)?;
        }

        Commands::Delete { id } => {
            service.delete_private_note(credential(&cli)?, *id).await?;
            print_json(&serde_json::json!({ "success": true }))?;
        }

        Commands::Share { id, base_url } => {
            let note = find_note(&service, &cli, *id).await?;
            let public_id = client::share_note(&service, credential(&cli)?, &note).await?;
            print_json(&serde_json::json!({
                "public_id": public_id,
                "link": client::share_link(base_url, &public_id),
            }))?;
        }

        Commands::Open { public_id } => {
            let passphrase = passphrase(&cli)?;
            match client::open_share(&service, public_id, &passphrase).await? {
                Decryption::Decrypted(text) => println!("{text}"),
                Decryption::Rejected => bail!("wrong passphrase; the share has been destroyed"),
            }
        }

        Commands::Export { id, dir } => {
            let note = find_note(&service, &cli, *id).await?;
            let path = client::export_note(&note, dir)?;
            print_json(&serde_json::json!({ "path": path }))?;
        }
    }

    Ok(())
}

fn credential(cli: &Cli) -> Result<&str> {
    cli.credential
        .as_deref()
        .ok_or_else(|| anyhow!("missing --credential (or CLOUDNOTES_CREDENTIAL)"))
}

fn passphrase(cli: &Cli) -> Result<String> {
    if let Some(pw) = cli.passphrase.as_ref().filter(|pw| !pw.is_empty()) {
        return Ok(pw.clone());
    }
    let pw = rpassword::prompt_password("Passphrase: ").map_err(|e| anyhow!("passphrase prompt: {e}"))?;
    if pw.is_empty() {
        bail!("passphrase is empty");
    }
    Ok(pw)
}

async fn find_note(service: &NotesService, cli: &Cli, id: i64) -> Result<UnlockedNote> {
    let passphrase = passphrase(cli)?;
    client::load_notes(service, credential(cli)?, &passphrase)
        .await?
        .into_iter()
        .find(|note| note.id == id)
        .ok_or_else(|| anyhow!("no note {id} opens with this passphrase"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
