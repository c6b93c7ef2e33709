//! `sealdex build`

use anyhow::{ensure, Context, Result};
use clap::Args;
use sealdex_core::SealdexConfig;
use sealdex_crypto::{Effects, SymmetricKey};
use sealdex_index::{persist, IndexBuilder, JsonFileSource};
use sealdex_sharing::{distribute, parse_prime, save_share_bundles, setup_key_custody};
use std::path::PathBuf;
use tracing::info;

use super::SHARES_DIR;

/// Build options; unset flags fall back to the config file
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Corpus file: JSON array or newline-delimited JSON of {title, text}
    #[arg(long)]
    pub corpus: PathBuf,

    /// Only index the first N documents
    #[arg(long)]
    pub limit: Option<usize>,

    /// Keyword threshold (terms must occur more often than this)
    #[arg(short, long)]
    pub threshold: Option<u64>,

    /// Number of data users
    #[arg(short = 'n', long)]
    pub users: Option<u16>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Build the index, persist it, then split and save both keys
pub async fn run(args: BuildArgs, config: &SealdexConfig) -> Result<()> {
    let threshold = args.threshold.unwrap_or(config.index.threshold);
    let data_users = args.users.unwrap_or(config.sharing.data_users);
    let output = args.output.unwrap_or_else(|| config.index.output_dir.clone());
    let key_bytes = config.index.key_bytes;

    let effects = Effects::production();
    let index_key = SymmetricKey::generate(key_bytes, &effects)?;
    let file_key = SymmetricKey::generate(key_bytes, &effects)?;

    let builder = IndexBuilder::new(index_key.clone(), file_key.clone(), threshold, effects.clone())?
        .with_worker_threads(config.index.worker_threads)?;
    let source = JsonFileSource::new(&args.corpus).with_limit(args.limit);
    let built = tokio::task::spawn_blocking(move || builder.build_from(&source))
        .await
        .context("index build task panicked")??;

    let report = persist(&built, &output, config.index.write_concurrency).await?;
    ensure!(
        report.documents_written == built.documents.len(),
        "wrote {} of {} documents",
        report.documents_written,
        built.documents.len()
    );

    let prime = parse_prime(&config.sharing.prime_hex)?;
    let (dealer, table) = setup_key_custody(prime, &index_key, &file_key, data_users, &effects)?;
    let (users, custodian) = distribute(&dealer, &table)?;
    let written = save_share_bundles(&output.join(SHARES_DIR), &users, &custodian)?;
    ensure!(
        written.len() == usize::from(data_users) + 1,
        "saved {} share bundles for {} participants",
        written.len(),
        usize::from(data_users) + 1
    );

    info!(
        documents = report.documents_written,
        keywords = built.keywords.len(),
        data_users,
        output = %output.display(),
        "build complete"
    );
    println!(
        "Indexed {} documents, {} keywords; shares for {} data users in {}",
        report.documents_written,
        built.keywords.len(),
        data_users,
        output.join(SHARES_DIR).display()
    );
    Ok(())
}
