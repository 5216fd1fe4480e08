use std::error::Error;
use std::process;

use clap::{Parser, Subcommand};

use zip_unicode_path::unicode_path::UnicodePath;

#[derive(Parser)]
#[command(
    name = "unipath",
    about = "Inspect and build ZIP Unicode Path (0x7075) extra fields",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a record given as hex
    Inspect {
        /// Record bytes in hex
        record: String,

        /// Input includes the 4-byte extra field header
        #[arg(long)]
        framed: bool,

        /// Entry name from the file header, checked against the record
        #[arg(long = "legacy-name", value_name = "NAME", conflicts_with = "legacy_hex")]
        legacy_name: Option<String>,

        /// Entry name from the file header, as hex bytes
        #[arg(long = "legacy-hex", value_name = "HEX")]
        legacy_hex: Option<String>,
    },
    /// Build a record and print it as hex
    Encode {
        /// Unicode name to store
        name: String,

        /// Legacy header name bytes the checksum should cover (default: NAME)
        #[arg(long = "legacy-hex", value_name = "HEX")]
        legacy_hex: Option<String>,

        /// Prefix the 4-byte extra field header
        #[arg(long)]
        framed: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Inspect {
            record,
            framed,
            legacy_name,
            legacy_hex,
        } => inspect(&record, framed, legacy_name, legacy_hex),
        Command::Encode {
            name,
            legacy_hex,
            framed,
        } => encode(&name, legacy_hex.as_deref(), framed),
    };

    if let Err(e) = result {
        eprintln!("err: {e}");
        process::exit(1);
    }
}

fn inspect(
    record: &str,
    framed: bool,
    legacy_name: Option<String>,
    legacy_hex: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let bytes = hex::decode(record.trim())?;
    let parsed = if framed {
        UnicodePath::parse_framed(&bytes)?
    } else {
        UnicodePath::parse(&bytes)?
    };

    println!("version  : {}", parsed.version());
    println!("crc32    : {:08x}", parsed.entry_name_crc32());
    println!("name     : {}", parsed.value());

    let legacy = match (legacy_name, legacy_hex) {
        (Some(name), _) => Some(name.into_bytes()),
        (None, Some(h)) => Some(hex::decode(h.trim())?),
        (None, None) => None,
    };
    if let Some(legacy) = legacy {
        let trusted = if parsed.is_trusted_for(&legacy) { "yes" } else { "no" };
        println!("trusted  : {trusted}");
        println!("resolved : {}", parsed.resolve_name(&legacy));
    }

    Ok(())
}

fn encode(name: &str, legacy_hex: Option<&str>, framed: bool) -> Result<(), Box<dyn Error>> {
    let mut record = UnicodePath::default();
    match legacy_hex {
        Some(h) => record.set_names(&hex::decode(h.trim())?, name),
        None => record.set_entry_name(name.as_bytes())?,
    }

    let bytes = if framed {
        record.to_framed()?
    } else {
        record.serialize()
    };
    println!("{}", hex::encode(bytes));
    Ok(())
}
