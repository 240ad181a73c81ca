//! AgenticWallet CLI — `awl` command.
//!
//! Creates keys, manages tagged records in a wallet directory, and signs or
//! verifies message fields with detached signatures.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use serde_json::{json, Map, Value};

use agentic_wallet::config::{self, DEFAULT_WALLET_NAME};
use agentic_wallet::crypto::did_from_verkey;
use agentic_wallet::{
    GenericRecord, KeyStore, Message, Record, RecordRegistry, SignatureEnvelope, StorageService,
    TagMap, WalletConfig,
};

// ── CLI structure ─────────────────────────────────────────────────────────────

/// AgenticWallet CLI — keys, tagged records and signed messages for
/// identity agents.
#[derive(Parser, Debug)]
#[command(
    name = "awl",
    about = "AgenticWallet CLI",
    version,
    long_about = "awl — AgenticWallet CLI\n\nCreate Ed25519 keys, store tagged records in a wallet,\nand sign or verify message fields with detached signatures."
)]
struct Cli {
    /// Wallet name (default: default)
    #[arg(long, global = true, default_value = DEFAULT_WALLET_NAME)]
    wallet: String,

    /// Wallet directory (overrides the default location for --wallet)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ed25519 keys
    Key {
        #[command(subcommand)]
        subcommand: KeyCommands,
    },

    /// Tagged records stored in the wallet
    Record {
        #[command(subcommand)]
        subcommand: RecordCommands,
    },

    /// Detached message field signatures
    Message {
        #[command(subcommand)]
        subcommand: MessageCommands,
    },

    /// Wallet configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum KeyCommands {
    /// Create a key and print its verkey and DID
    Create {
        /// 32-byte text seed for a deterministic key
        #[arg(long)]
        seed: Option<String>,
    },

    /// Print the DID derived from a verkey
    Did {
        /// Base58 verkey
        verkey: String,
    },
}

#[derive(Subcommand, Debug)]
enum RecordCommands {
    /// Store a new record
    Save {
        #[arg(long = "type")]
        record_type: String,
        #[arg(long)]
        id: String,
        /// Tag as key=value (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// JSON object payload
        #[arg(long)]
        data: Option<String>,
    },

    /// Replace an existing record
    Update {
        #[arg(long = "type")]
        record_type: String,
        #[arg(long)]
        id: String,
        /// Tag as key=value (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// JSON object payload
        #[arg(long)]
        data: Option<String>,
    },

    /// Print one record
    Get {
        #[arg(long = "type")]
        record_type: String,
        #[arg(long)]
        id: String,
    },

    /// Print all records of a type
    List {
        #[arg(long = "type")]
        record_type: String,
    },

    /// Print records whose tags match every key=value given
    Find {
        #[arg(long = "type")]
        record_type: String,
        /// Tag as key=value (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Remove a record
    Delete {
        #[arg(long = "type")]
        record_type: String,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum MessageCommands {
    /// Replace FIELD with a FIELD~sig block signed by the seed's key
    Sign {
        #[arg(long)]
        field: String,
        /// 32-byte text seed of the signing key
        #[arg(long)]
        seed: String,
        /// Message JSON file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Check FIELD~sig and print the message with FIELD restored
    Verify {
        #[arg(long)]
        field: String,
        /// Message JSON file (stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the resolved wallet configuration
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    // RUST_LOG refines the level; --verbose raises the default to debug.
    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Key { subcommand } => match subcommand {
            KeyCommands::Create { seed } => cmd_key_create(seed.as_deref(), verbose).await,
            KeyCommands::Did { verkey } => cmd_key_did(&verkey),
        },
        Commands::Record { subcommand } => {
            match open_wallet(&cli.wallet, cli.dir.as_ref()) {
                Ok(wallet) => cmd_record(&wallet, subcommand, verbose).await,
                Err(e) => Err(e),
            }
        }
        Commands::Message { subcommand } => match subcommand {
            MessageCommands::Sign { field, seed, file } => {
                cmd_message_sign(&field, &seed, file.as_ref(), verbose).await
            }
            MessageCommands::Verify { field, file } => {
                cmd_message_verify(&field, file.as_ref()).await
            }
        },
        Commands::Config { subcommand } => match subcommand {
            ConfigCommands::Show => cmd_config_show(&cli.wallet, cli.dir.as_ref()),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn wallet_config(name: &str, dir: Option<&PathBuf>) -> Result<WalletConfig> {
    let config = match dir {
        Some(dir) => WalletConfig::with_storage_dir(name, dir)?,
        None => WalletConfig::new(name)?,
    };
    Ok(config)
}

fn open_wallet(name: &str, dir: Option<&PathBuf>) -> Result<WalletConfig> {
    let resolved = wallet_config(name, dir)?;
    let config = WalletConfig::open(&resolved.name, &resolved.storage_dir)
        .with_context(|| format!("failed to open wallet '{name}'"))?;
    debug!("wallet '{}' at {}", config.name, config.storage_dir.display());
    Ok(config)
}

fn parse_tags(pairs: &[String]) -> Result<TagMap> {
    let mut tags = TagMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid tag '{pair}', expected key=value"))?;
        if key.is_empty() {
            bail!("invalid tag '{pair}', key must not be empty");
        }
        tags.insert(key.to_string(), value.to_string());
    }
    Ok(tags)
}

fn parse_data(data: Option<&str>) -> Result<Map<String, Value>> {
    match data {
        None => Ok(Map::new()),
        Some(text) => match serde_json::from_str(text).context("--data is not valid JSON")? {
            Value::Object(map) => Ok(map),
            _ => bail!("--data must be a JSON object"),
        },
    }
}

fn build_record(
    record_type: &str,
    id: &str,
    tags: &[String],
    data: Option<&str>,
) -> Result<GenericRecord> {
    let mut record = GenericRecord::new(record_type, id).with_data(parse_data(data)?);
    record.tags = parse_tags(tags)?;
    Ok(record)
}

fn record_json(record: &GenericRecord) -> Value {
    json!({
        "type": record.record_type(),
        "id": record.id(),
        "tags": record.tags,
        "data": record.data,
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_message(file: Option<&PathBuf>) -> Result<Message> {
    let bytes = match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read message from stdin")?;
            buf
        }
    };
    Ok(Message::from_slice(&bytes)?)
}

// ── Key commands ──────────────────────────────────────────────────────────────

async fn cmd_key_create(seed: Option<&str>, verbose: bool) -> Result<()> {
    let store = KeyStore::new();
    let verkey = match seed {
        Some(seed) => store.create_key_from_seed_str(seed).await?,
        None => store.create_key(None).await,
    };
    let did = did_from_verkey(verkey.as_str())?;

    println!("Verkey: {verkey}");
    println!("DID:    {did}");
    if verbose {
        println!("  Deterministic: {}", seed.is_some());
    }
    Ok(())
}

fn cmd_key_did(verkey: &str) -> Result<()> {
    println!("{}", did_from_verkey(verkey)?);
    Ok(())
}

// ── Record commands ───────────────────────────────────────────────────────────

async fn record_service(
    wallet: &WalletConfig,
    record_type: &str,
) -> Result<StorageService<GenericRecord>> {
    let backend = Arc::new(wallet.file_backend().await?);
    let registry = RecordRegistry::new().register(record_type, GenericRecord::from_props);
    Ok(StorageService::new(backend, registry))
}

async fn cmd_record(wallet: &WalletConfig, command: RecordCommands, verbose: bool) -> Result<()> {
    match command {
        RecordCommands::Save {
            record_type,
            id,
            tags,
            data,
        } => {
            let service = record_service(wallet, &record_type).await?;
            let record = build_record(&record_type, &id, &tags, data.as_deref())?;
            service.save(&record).await?;
            println!("Saved {record_type} '{id}'");
            if verbose {
                println!("  Tags:   {}", record.tags.len());
                println!("  Wallet: {}", wallet.storage_dir.display());
            }
        }
        RecordCommands::Update {
            record_type,
            id,
            tags,
            data,
        } => {
            let service = record_service(wallet, &record_type).await?;
            let record = build_record(&record_type, &id, &tags, data.as_deref())?;
            service.update(&record).await?;
            println!("Updated {record_type} '{id}'");
        }
        RecordCommands::Get { record_type, id } => {
            let service = record_service(wallet, &record_type).await?;
            let record = service.get_by_id(&record_type, &id).await?;
            print_json(&record_json(&record))?;
        }
        RecordCommands::List { record_type } => {
            let service = record_service(wallet, &record_type).await?;
            let records = service.get_all(&record_type).await?;
            print_records(&records, verbose)?;
        }
        RecordCommands::Find { record_type, tags } => {
            let query = parse_tags(&tags)?;
            let service = record_service(wallet, &record_type).await?;
            let records = service.find_by_query(&record_type, &query).await?;
            print_records(&records, verbose)?;
        }
        RecordCommands::Delete { record_type, id } => {
            let service = record_service(wallet, &record_type).await?;
            service.delete(&GenericRecord::new(&record_type, &id)).await?;
            println!("Deleted {record_type} '{id}'");
        }
    }
    Ok(())
}

fn print_records(records: &[GenericRecord], verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} record(s)", records.len());
    }
    let values: Vec<Value> = records.iter().map(record_json).collect();
    print_json(&Value::Array(values))
}

// ── Message commands ──────────────────────────────────────────────────────────

async fn cmd_message_sign(
    field: &str,
    seed: &str,
    file: Option<&PathBuf>,
    verbose: bool,
) -> Result<()> {
    let message = read_message(file)?;
    let store = Arc::new(KeyStore::new());
    let verkey = store.create_key_from_seed_str(seed).await?;
    let envelope = SignatureEnvelope::new(store);

    let signed = envelope.sign(&message, field, verkey.as_str()).await?;
    if verbose {
        eprintln!("Signed '{field}' of {} with {verkey}", message.id());
    }
    print_json(&signed.into_value())
}

async fn cmd_message_verify(field: &str, file: Option<&PathBuf>) -> Result<()> {
    let message = read_message(file)?;
    let envelope = SignatureEnvelope::new(Arc::new(KeyStore::new()));
    let opened = envelope.verify(&message, field).await?;
    print_json(&opened.into_value())
}

// ── Config commands ───────────────────────────────────────────────────────────

fn cmd_config_show(name: &str, dir: Option<&PathBuf>) -> Result<()> {
    let resolved = wallet_config(name, dir)?;
    let path = resolved.config_path();
    let config = if path.exists() {
        WalletConfig::load(&path)?
    } else {
        resolved
    };
    let home = config::default_home().ok();

    println!("Wallet:  {}", config.name);
    println!("  Dir:     {}", config.storage_dir.display());
    println!("  Records: {}", config.records_dir().display());
    println!("  Config:  {}", path.display());
    println!("  Saved:   {}", if path.exists() { "yes" } else { "no" });
    if let Some(home) = home {
        println!("  Home:    {}", home.display());
    }
    Ok(())
}
