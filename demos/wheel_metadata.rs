//! Print the METADATA of a remote wheel without downloading the whole file
//!
//! Opens the wheel through a lazily-fetched file, lets the zip reader seek
//! around the central directory, and reads only the `*.dist-info/METADATA`
//! member.
//!
//! # Usage
//! ```bash
//! wheel-metadata https://files.example.org/pkg-1.0-py3-none-any.whl
//!
//! # With client settings
//! wheel-metadata https://files.example.org/pkg-1.0-py3-none-any.whl lazyfile.yaml
//! ```

use anyhow::{bail, Context};
use lazyfile::{HttpRangeProvider, LazyConfig, LazyFile};
use std::env;
use std::io::{self, Read, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout carries only the metadata
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let Some(url) = args.next() else {
        bail!("usage: wheel-metadata <url> [config.yaml]");
    };

    let config = match args.next() {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            LazyConfig::from_file(&path)?
        }
        None => LazyConfig::default(),
    };

    let provider = HttpRangeProvider::with_config(url.as_str(), &config)?;
    let file = LazyFile::new(provider).with_context(|| format!("opening {}", url))?;
    let total = file.len();

    let mut archive = zip::ZipArchive::new(file).context("reading zip directory")?;

    let names: Vec<String> = archive
        .file_names()
        .filter(|name| name.ends_with(".dist-info/METADATA"))
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        bail!("no .dist-info/METADATA member in {}", url);
    }

    let mut stdout = io::stdout().lock();
    for name in names {
        let mut member = archive
            .by_name(&name)
            .with_context(|| format!("opening member {}", name))?;
        let mut contents = Vec::new();
        member.read_to_end(&mut contents)?;
        stdout.write_all(&contents)?;
    }
    stdout.flush()?;

    let stats = archive.into_inner().cache().metrics().get_stats();
    info!(
        "Fetched {} of {} bytes in {} request(s)",
        stats.bytes_fetched, total, stats.fetch_calls
    );

    Ok(())
}
