//! Headless front end: runs one library operation against the configured
//! backend and prints the resulting notifications.

use clap::{Parser, Subcommand};
use shared::library::Album;
use shared::notification::{Severity, Toast};
use tagotomatik::backend::BackendClientBuilder;
use tagotomatik::diff::smart_diff;
use tagotomatik::fields::TrackField;
use tagotomatik::status::status_summary;
use tagotomatik::store::FileStore;
use tagotomatik::{AppConfig, Result, Services, ServicesBuilder};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tagotomatik")]
#[command(about = "Reconcile and correct a tagged music library")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-scan every known root and list the library
    Load,
    /// Scan a directory and merge what it holds
    Scan { path: String },
    /// Drop an album and exclude its path from future scans
    Remove { id: String },
    /// Re-read one album from disk
    Refresh { id: String },
    /// Ask the backend for corrections and show what would change
    Preview {
        id: String,
        /// Write the corrections instead of discarding them
        #[arg(long)]
        apply: bool,
    },
    /// Set one field on every track of an album and write it
    Set {
        id: String,
        field: TrackField,
        value: String,
    },
    /// Write the album as it is
    Save { id: String },
    /// Show the word-bounded difference between two values
    Diff { before: String, after: String },
    /// List case-correction rules
    Exceptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Command::Diff { before, after } = &args.command {
        match smart_diff(before, after) {
            Some(diff) => println!("{:?} -> {:?}", diff.original, diff.corrected),
            None => println!("No difference."),
        }
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let client = BackendClientBuilder::from_config(&config).build()?;
    info!("Using backend at {}", client.base_url());

    let services = ServicesBuilder::new()
        .config(&config)
        .store(FileStore::open(config.state_dir())?)
        .backend(client)
        .build()?;

    let printer = tokio::spawn(print_toasts(services.subscribe()));
    services.library().warm_start().await;

    run(&services, args.command).await;

    let failed = services.state().last_error().await.is_some();
    drop(services);
    let _ = printer.await;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(services: &Services, command: Command) {
    let library = services.library();
    let corrections = services.corrections();

    match command {
        Command::Load => {
            library.load_library().await;
            for album in services.state().albums().await {
                print_album(&album);
            }
        }
        Command::Scan { path } => {
            library.scan_directory(&path, false).await;
        }
        Command::Remove { id } => {
            if !library.remove_album(&id).await {
                eprintln!("No album with id {id}");
            }
        }
        Command::Refresh { id } => library.refresh_album(&id).await,
        Command::Preview { id, apply } => {
            let Some(before) = services.state().album(&id).await else {
                eprintln!("No album with id {id}");
                return;
            };
            corrections.preview_correction(&id).await;
            if let Some(after) = services.state().album(&id).await {
                print_changes(&before, &after);
            }
            if apply {
                corrections.apply_correction(&id).await;
            } else {
                corrections.cancel_correction(&id).await;
            }
        }
        Command::Set { id, field, value } => {
            let changed = corrections.update_tracks_field(&id, field, &value).await;
            println!("{changed} track(s) changed");
            if changed > 0 {
                corrections.save_direct(&id).await;
            }
        }
        Command::Save { id } => corrections.save_direct(&id).await,
        Command::Exceptions => {
            let rules = services.exceptions();
            rules.load().await;
            for rule in rules.rules().await {
                let id = rule.id.map(|i| i.to_string()).unwrap_or_default();
                println!(
                    "{id:>5}  [{}] {} -> {}",
                    rule.category, rule.original, rule.corrected
                );
            }
        }
        Command::Diff { .. } => {}
    }
}

fn print_album(album: &Album) {
    println!(
        "{}  {} - {} ({} tracks)",
        album.id,
        album.artist,
        album.title,
        album.tracks.len()
    );
    for line in status_summary(album).lines() {
        println!("    {line}");
    }
}

fn print_changes(before: &Album, after: &Album) {
    if before.title != after.title {
        println!("album title: {:?} -> {:?}", before.title, after.title);
    }
    if before.artist != after.artist {
        println!("album artist: {:?} -> {:?}", before.artist, after.artist);
    }
    for (old, new) in before.tracks.iter().zip(&after.tracks) {
        for (field, a, b) in [
            ("title", &old.title, &new.title),
            ("artist", &old.artist, &new.artist),
            ("album", &old.album, &new.album),
        ] {
            if a != b {
                println!("{}: {field}: {a:?} -> {b:?}", new.filename);
            }
        }
    }
}

async fn print_toasts(mut rx: broadcast::Receiver<Toast>) {
    loop {
        match rx.recv().await {
            Ok(toast) => {
                let label = match toast.severity {
                    Severity::Success => "ok",
                    Severity::Info => "info",
                    Severity::Warning => "warning",
                    Severity::Error => "error",
                };
                eprintln!("[{label}] {}", toast.message);
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}
