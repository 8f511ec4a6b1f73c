//! WRAITH CLI
//!
//! Command-line interface for EIP-5564 stealth addresses with passkey-derived keys.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wraith_core::constants::{DEFAULT_BLOCK_INTERVAL, DEFAULT_SIGNING_MESSAGE};
use wraith_core::traits::ProgressCallback;
use wraith_core::types::{
    Announcement, CompressedPoint, CredentialAssertion, EthAddress, MetaAddress, PrivateKey,
    StealthAddressRecord, StealthKeys,
};
use wraith_crypto::{
    derive_from_assertion, derive_stealth_keys, keypair_from_private, secret_key, EntropySource,
    MetaAddressExt,
};
use wraith_registry::{FileStore, MemoryFeed};
use wraith_scanner::{ScanOutcome, ScanSummary, Scanner, ScannerConfig};
use wraith_stealth::{generate_for, recover_stealth_private_key, StealthAccount, StealthPrivateKey};

/// WRAITH - EIP-5564 Stealth Addresses
#[derive(Parser)]
#[command(name = "wraith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive spending/viewing keys and the meta-address from a credential
    Derive {
        /// Credential identifier (hex)
        #[arg(long)]
        credential_id: String,
        /// Assertion signature (hex), required with `--entropy signature`
        #[arg(long)]
        signature: Option<String>,
        /// Entropy source: credential-id or signature
        #[arg(long, default_value = "credential-id")]
        entropy: EntropySource,
        /// Message mixed into the HKDF info
        #[arg(long, env = "WRAITH_MESSAGE", default_value = DEFAULT_SIGNING_MESSAGE)]
        message: String,
        /// Output file for keys (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a one-time stealth address for a meta-address
    Generate {
        /// Recipient meta-address (st:eth:0x...)
        meta_address: String,
        /// Block number to stamp on the printed announcement
        #[arg(long, default_value = "0")]
        block: u64,
    },

    /// Scan announcements for payments
    Scan {
        /// Path to keys file
        #[arg(short, long, env = "WRAITH_KEYS")]
        keys: PathBuf,
        /// Path to announcements file (JSON array)
        #[arg(short, long, env = "WRAITH_ANNOUNCEMENTS")]
        announcements: PathBuf,
        /// First block to scan
        #[arg(long, default_value = "0")]
        from: u64,
        /// Last block to scan (defaults to the latest announced block)
        #[arg(long)]
        to: Option<u64>,
        /// Blocks per window
        #[arg(long, default_value_t = DEFAULT_BLOCK_INTERVAL)]
        interval: u64,
        /// Concurrent shards
        #[arg(long, default_value = "1")]
        shards: usize,
        /// Store file for found records
        #[arg(short, long)]
        records: Option<PathBuf>,
    },

    /// Recover the private key of a stealth address
    Recover {
        /// Path to keys file
        #[arg(short, long, env = "WRAITH_KEYS")]
        keys: PathBuf,
        /// Announced ephemeral public key (hex)
        ephemeral_key: String,
        /// Stealth address the key must control
        #[arg(long)]
        address: Option<String>,
    },

    /// Run benchmarks
    Bench {
        /// Number of announcements to generate
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

/// On-disk key file.
#[derive(Serialize, Deserialize)]
struct KeyFile {
    spending_pk: String,
    spending_sk: String,
    viewing_pk: String,
    viewing_sk: String,
    meta_address: String,
}

impl KeyFile {
    fn from_keys(keys: &StealthKeys, meta_address: &str) -> Self {
        Self {
            spending_pk: keys.spending.public.to_hex(),
            spending_sk: keys.spending.private.to_hex(),
            viewing_pk: keys.viewing.public.to_hex(),
            viewing_sk: keys.viewing.private.to_hex(),
            meta_address: meta_address.to_string(),
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open keys file {}", path.display()))?;
        serde_json::from_reader(file).context("Keys file is not valid JSON")
    }

    /// Rebuilds the account from the private halves; the public halves are checked against them.
    fn account(&self) -> Result<StealthAccount> {
        let spending = keypair_from_private(
            &PrivateKey::from_hex(&self.spending_sk).context("Invalid spending_sk")?,
        )?;
        let viewing = keypair_from_private(
            &PrivateKey::from_hex(&self.viewing_sk).context("Invalid viewing_sk")?,
        )?;
        let spending_pk = CompressedPoint::from_hex(&self.spending_pk).context("Invalid spending_pk")?;
        let viewing_pk = CompressedPoint::from_hex(&self.viewing_pk).context("Invalid viewing_pk")?;
        if spending.public != spending_pk || viewing.public != viewing_pk {
            bail!("Public keys in keys file do not match the private keys");
        }
        Ok(StealthAccount::from_keys(StealthKeys::new(spending, viewing))?)
    }
}

fn decode_hex(value: &str, what: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .with_context(|| format!("Invalid {} hex", what))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "wraith=debug,info"
    } else {
        "wraith=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Derive {
            credential_id,
            signature,
            entropy,
            message,
            output,
        } => cmd_derive(&credential_id, signature.as_deref(), entropy, &message, output),
        Commands::Generate {
            meta_address,
            block,
        } => cmd_generate(&meta_address, block),
        Commands::Scan {
            keys,
            announcements,
            from,
            to,
            interval,
            shards,
            records,
        } => {
            let mut config = ScannerConfig::new()
                .from_block(from)
                .block_interval(interval)
                .shards(shards);
            if let Some(to) = to {
                config = config.to_block(to);
            }
            cmd_scan(&keys, &announcements, config, records.as_deref()).await
        }
        Commands::Recover {
            keys,
            ephemeral_key,
            address,
        } => cmd_recover(&keys, &ephemeral_key, address.as_deref()),
        Commands::Bench { count } => cmd_bench(count).await,
    }
}

/// Derive keys from a credential
fn cmd_derive(
    credential_id: &str,
    signature: Option<&str>,
    entropy: EntropySource,
    message: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "🔑 Deriving WRAITH keys...".cyan().bold());

    let signature = match signature {
        Some(sig) => decode_hex(sig, "signature")?,
        None => Vec::new(),
    };
    let assertion = CredentialAssertion::new(decode_hex(credential_id, "credential id")?, signature);

    let keys = derive_from_assertion(&assertion, message, entropy)
        .context("Failed to derive keys")?;
    let account = StealthAccount::from_keys(keys)?;
    let meta = account.meta_address().to_string();
    let key_file = KeyFile::from_keys(account.keys(), &meta);

    println!("   {} {}", "Meta-address:".green(), meta);

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&key_file)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "✅ Keys saved to:".green(), path.display());
    } else {
        println!("\n{}", "Keys (JSON):".yellow().bold());
        println!("{}", serde_json::to_string_pretty(&key_file)?);
    }

    println!("\n{}", "⚠️  IMPORTANT: Keep your secret keys safe!".red().bold());
    println!("   spending_sk and viewing_sk must never be shared.");

    Ok(())
}

/// Generate a stealth address
fn cmd_generate(meta_address: &str, block: u64) -> Result<()> {
    println!("{} {}", "💸 Generating stealth address for:".cyan().bold(), meta_address);

    let meta = MetaAddress::parse(meta_address)
        .context("Invalid meta-address")?;
    let generated = generate_for(&meta).context("Failed to generate stealth address")?;

    println!("\n{}", "✅ Stealth address generated:".green().bold());
    println!("   {} {}", "Address:".yellow(), generated.stealth_address);
    println!("   {} {}", "View tag:".dimmed(), format_view_tag(generated.view_tag));
    println!("   {} {}", "Ephemeral key:".dimmed(), generated.ephemeral_public_key);

    let mut announcement = generated.to_announcement();
    announcement.block_number = block;

    println!("\n{}", "📋 Announcement (JSON):".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&announcement)?);

    println!("\n{}", "ℹ️  Next steps:".cyan());
    println!("   1. Send funds to the stealth address above");
    println!("   2. Publish the announcement");

    Ok(())
}

/// Scan for payments
async fn cmd_scan(
    keys_path: &Path,
    announcements_path: &Path,
    config: ScannerConfig,
    records_path: Option<&Path>,
) -> Result<()> {
    println!("{}", "🔎 Scanning for payments...".cyan().bold());

    let account = KeyFile::load(keys_path)?.account()?;

    let json = std::fs::read_to_string(announcements_path)
        .with_context(|| format!("Failed to read {}", announcements_path.display()))?;
    let feed = MemoryFeed::from_json(&json).context("Invalid announcements file")?;
    println!("   Loaded {} announcement(s)", feed.len());
    tracing::debug!(path = %announcements_path.display(), count = feed.len(), "Loaded announcement feed");

    if feed.is_empty() {
        println!("\n{}", "⚠️  No announcements to scan.".yellow());
        return Ok(());
    }

    let mut scanner = Scanner::from_account(&account);
    if let Some(path) = records_path {
        let store = FileStore::open(path)
            .await
            .with_context(|| format!("Failed to open record store {}", path.display()))?;
        println!("   Saving records to: {}", path.display());
        scanner = scanner.with_record_store(Arc::new(store));
    }

    let outcome: ScanOutcome = if config.shards > 1 {
        scanner.scan_sharded(&feed, &config).await?
    } else {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% block {msg}")?
                .progress_chars("#>-"),
        );
        let bar = pb.clone();
        let callback: ProgressCallback = Box::new(move |progress| {
            bar.set_position(progress.percent() as u64);
            bar.set_message(progress.current_block.to_string());
        });
        let outcome = scanner.scan_with_progress(&feed, &config, callback).await?;
        pb.finish_with_message("done");
        outcome
    };

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &ScanOutcome) {
    if outcome.report.matches.is_empty() {
        println!("\n{}", "No payments found.".yellow());
    } else {
        println!(
            "\n{} {} payment(s) found:",
            "✅".green(),
            outcome.report.matches.len()
        );
        for record in &outcome.report.matches {
            println!("   {} {}", "Address:".green(), record.stealth_address);
            println!(
                "      Ephemeral key: 0x{}",
                hex::encode(&record.ephemeral_public_key)
            );
        }
    }

    if !outcome.report.skipped.is_empty() {
        println!(
            "\n{} {} malformed announcement(s) skipped:",
            "⚠️ ".yellow(),
            outcome.report.skipped.len()
        );
        for skipped in &outcome.report.skipped {
            println!(
                "   block {} log {}: {}",
                skipped.block_number, skipped.log_index, skipped.reason
            );
        }
    }

    let summary = ScanSummary::from(outcome.stats.clone());
    println!(
        "\n   {} {} scanned, {:.1}% filtered by view tag, next block {}",
        "Summary:".dimmed(),
        summary.total_scanned,
        summary.filter_efficiency,
        outcome.position.next_block
    );
}

/// Recover a stealth private key
fn cmd_recover(keys_path: &Path, ephemeral_key: &str, address: Option<&str>) -> Result<()> {
    println!("{}", "🗝️  Recovering stealth private key...".cyan().bold());

    let key = recover_key(keys_path, ephemeral_key, address)?;
    let (address, private_key) = recovered_fields(&key);

    println!("\n{}", "✅ Recovered:".green().bold());
    println!("   {} {}", "Address:".yellow(), address);
    println!("   {} {}", "Private key:".red(), private_key);
    println!("\n{}", "⚠️  Anyone with this key controls the address.".red().bold());

    Ok(())
}

fn recover_key(
    keys_path: &Path,
    ephemeral_key: &str,
    address: Option<&str>,
) -> Result<StealthPrivateKey> {
    let account = KeyFile::load(keys_path)?.account()?;
    let ephemeral = decode_hex(ephemeral_key, "ephemeral key")?;

    let key = match address {
        Some(address) => {
            let record = StealthAddressRecord {
                stealth_address: address
                    .parse::<EthAddress>()
                    .context("Invalid stealth address")?,
                ephemeral_public_key: ephemeral,
                metadata: Vec::new(),
            };
            account
                .recover(&record)
                .context("Key does not control the given address")?
        }
        None => recover_stealth_private_key(
            &ephemeral,
            account.scan_keys().viewing_secret(),
            &secret_key(&account.keys().spending.private)?,
        )?,
    };
    Ok(key)
}

/// Address and exported private key, as printed.
fn recovered_fields(key: &StealthPrivateKey) -> (String, String) {
    (key.address().to_string(), key.to_hex())
}

fn format_view_tag(tag: u8) -> String {
    format!("0x{:02x}", tag)
}

/// Run benchmarks
async fn cmd_bench(count: usize) -> Result<()> {
    println!("{} {} announcements", "📊 Benchmarking with".cyan().bold(), count);

    println!("\n{}", "1. Deriving keys...".dimmed());
    let start = Instant::now();
    let assertion = CredentialAssertion::new(b"wraith-bench-credential".to_vec(), Vec::new());
    let keys = derive_from_assertion(&assertion, DEFAULT_SIGNING_MESSAGE, EntropySource::default())?;
    let account = StealthAccount::from_keys(keys)?;
    println!("   ✓ Key derivation: {:?}", start.elapsed());

    println!("\n{}", "2. Creating announcements...".dimmed());
    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    // Payments for someone else fill the feed around ours
    let stranger = StealthAccount::from_keys(derive_stealth_keys(
        b"wraith-bench-stranger",
        DEFAULT_SIGNING_MESSAGE,
    )?)?;

    let start = Instant::now();
    let mut announcements = Vec::with_capacity(count);
    for i in 0..count {
        let recipient = if i % 100 == 0 { &account } else { &stranger };
        let mut announcement: Announcement =
            generate_for(recipient.meta_address())?.to_announcement();
        announcement.block_number = i as u64;
        announcements.push(announcement);
        pb.inc(1);
    }
    pb.finish();
    println!("   ✓ Created {} announcements: {:?}", count, start.elapsed());

    println!("\n{}", "3. Scanning...".dimmed());
    let feed = MemoryFeed::from_announcements(announcements);
    let scanner = Scanner::from_account(&account);
    let start = Instant::now();
    let outcome = scanner.scan(&feed, &ScannerConfig::new()).await?;
    let scan_time = start.elapsed();

    let rate = count as f64 / scan_time.as_secs_f64();
    let found = outcome.report.matches.len();

    println!("   ✓ Scanned {} announcements: {:?}", count, scan_time);
    println!("   ✓ Found {} payments", found);
    println!("\n{}", "📈 Results:".green().bold());
    println!("   Scan rate: {:.0} announcements/sec", rate);
    println!(
        "   Time per announcement: {:.2}µs",
        scan_time.as_micros() as f64 / count.max(1) as f64
    );

    let expected = count.div_ceil(100);
    if found == expected {
        println!("   {} All expected payments found!", "✅".green());
    } else {
        println!("   {} Expected {}, found {}", "❌".red(), expected, found);
    }

    Ok(())
}
