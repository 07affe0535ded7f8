//! Icymux CLI — dump an ICY radio stream

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use icymux::config::protocol::READ_CHUNK_SIZE;
use icymux::{IcySource, StreamConfig};

#[derive(Parser)]
#[command(name = "icymux", about = "Dump an ICY radio stream's audio bytes", version)]
struct Cli {
    /// Stream URL
    url: String,

    /// Write audio bytes to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not request in-band metadata
    #[arg(long)]
    no_metadata: bool,

    /// Fail instead of reconnecting when the connection drops
    #[arg(long)]
    no_reconnect: bool,

    /// Reconnect attempts before giving up
    #[arg(long)]
    max_retries: Option<u32>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StreamConfig {
        enable_metadata: !cli.no_metadata,
        auto_reconnect: !cli.no_reconnect,
        ..Default::default()
    };
    if let Some(max_retries) = cli.max_retries {
        config.max_retries = max_retries;
    }

    let source = IcySource::new(config)?;
    if !source.is_stream_url(&cli.url) {
        eprintln!("Warning: {} does not look like a radio stream", cli.url);
    }

    let track = source.load_track(&cli.url)?;
    eprintln!(
        "Playing: {}{}",
        track.title,
        track
            .bitrate
            .as_deref()
            .map(|br| format!(" ({br} kbps)"))
            .unwrap_or_default()
    );

    let mut stream = source.open(&cli.url)?;

    // Print title changes as they arrive, off the byte-copy path
    let titles = stream.subscribe();
    thread::spawn(move || {
        for event in titles {
            eprintln!("Now playing: {}", event.title);
        }
    });

    let mut out: Box<dyn Write> = match cli.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        match stream.read(&mut buf)? {
            0 => return Ok(()),
            n => out.write_all(&buf[..n])?,
        }
    }
}
