//! Canonical serializer for test-result trees.
//!
//! Reads result trees as JSON, validates their external references, and
//! writes the deterministic, key-sorted form. Also builds reference markers
//! for scripts that need to embed one.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;

use canon::canonicalize::canonicalize_file;
use canon::core::canonical::CanonicalObject;
use canon::core::external::{ExternalDataInfo, FileAttrs};
use canon::exit_codes;
use canon::io::config::{CanonConfig, DEFAULT_CONFIG_FILE, load_config};
use canon::io::tree_store::{load_tree, render_json, write_json};
use canon::logging;
use canon::refs::{ReferenceCheckFailed, check_references, collect_references};

#[derive(Parser)]
#[command(
    name = "canon",
    version,
    about = "Canonical JSON serializer for test-result trees"
)]
struct Cli {
    /// Config file (defaults to `canon.toml` in the working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the canonical form of a JSON result tree.
    Serialize {
        /// Input JSON file.
        input: PathBuf,
        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line output, overriding `pretty` from config.
        #[arg(long)]
        compact: bool,
    },
    /// List external references found in a JSON result tree.
    Refs {
        /// Input JSON file.
        input: PathBuf,
        /// Validate references and fail if any is invalid.
        #[arg(long)]
        check: bool,
    },
    /// Print a new reference marker.
    #[command(subcommand)]
    New(NewReference),
}

#[derive(Subcommand)]
enum NewReference {
    /// Local file.
    File {
        path: String,
        #[arg(long)]
        checksum: Option<String>,
        #[arg(long)]
        diff_tool: Option<String>,
        /// File stays on the local filesystem.
        #[arg(long)]
        local: bool,
        #[arg(long)]
        diff_file_name: Option<String>,
        /// Diff tool timeout in seconds.
        #[arg(long)]
        diff_tool_timeout: Option<u64>,
        /// Size in bytes.
        #[arg(long)]
        size: Option<u64>,
    },
    /// Sandbox resource.
    Resource {
        id: String,
        #[arg(long)]
        checksum: Option<String>,
    },
    /// Upload that has not completed yet.
    Delayed {
        upload_id: String,
        #[arg(long)]
        checksum: String,
    },
    /// Remote http(s) resource.
    Http {
        url: String,
        #[arg(long)]
        checksum: Option<String>,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            if err.downcast_ref::<ReferenceCheckFailed>().is_some() {
                exit_codes::BAD_REFERENCE
            } else {
                exit_codes::INVALID
            }
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let cfg = load_config(&config_path).context("load config")?;
    match cli.command {
        Command::Serialize {
            input,
            output,
            compact,
        } => cmd_serialize(&cfg, &input, output.as_deref(), compact),
        Command::Refs { input, check } => cmd_refs(&cfg, &input, check),
        Command::New(reference) => cmd_new(&cfg, reference),
    }
}

fn cmd_serialize(
    cfg: &CanonConfig,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<i32> {
    let json = canonicalize_file(input, cfg)?;
    let pretty = cfg.pretty && !compact;
    match output {
        Some(path) => write_json(path, &json, pretty)?,
        None => print_json(&json, pretty)?,
    }
    Ok(exit_codes::OK)
}

fn cmd_refs(cfg: &CanonConfig, input: &Path, check: bool) -> Result<i32> {
    let tree = load_tree(input)?;
    let entries = collect_references(&tree)?;
    let mut stdout = std::io::stdout().lock();
    for entry in &entries {
        writeln!(stdout, "{}", entry.to_line()).context("write stdout")?;
    }
    if check {
        let errors = check_references(&entries, cfg)?;
        if !errors.is_empty() {
            return Err(ReferenceCheckFailed { errors }.into());
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_new(cfg: &CanonConfig, reference: NewReference) -> Result<i32> {
    let object: CanonicalObject = match reference {
        NewReference::File {
            path,
            checksum,
            diff_tool,
            local,
            diff_file_name,
            diff_tool_timeout,
            size,
        } => ExternalDataInfo::serialize_file(
            &path,
            checksum.as_deref(),
            FileAttrs {
                diff_tool,
                local,
                diff_file_name,
                diff_tool_timeout,
                size,
            },
        ),
        NewReference::Resource { id, checksum } => {
            ExternalDataInfo::serialize_resource(&id, checksum.as_deref())
        }
        NewReference::Delayed {
            upload_id,
            checksum,
        } => ExternalDataInfo::serialize_delayed(&upload_id, &checksum),
        NewReference::Http { url, checksum } => {
            ExternalDataInfo::serialize_http(&url, checksum.as_deref())?
        }
    };
    print_json(&JsonValue::from(object), cfg.pretty)?;
    Ok(exit_codes::OK)
}

fn print_json(value: &JsonValue, pretty: bool) -> Result<()> {
    let buf = render_json(value, pretty)?;
    std::io::stdout()
        .lock()
        .write_all(buf.as_bytes())
        .context("write stdout")
}
