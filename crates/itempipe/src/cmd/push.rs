//! Push command - Submit one value as a poller would
//!
//! Handy for checking that a manager is reachable and accepts values.
//!
//! # Usage
//!
//! ```bash
//! itempipe push --itemid 1001 --type uint64 57
//! itempipe push --itemid 7 --type float --not-supported "Timeout while connecting"
//! itempipe push --itemid 42 --type text --discovery '[{"{#FSNAME}":"/"}]'
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use itempipe_client::{FailurePolicy, LoggingDiscovery, PreprocessingClient};
use itempipe_config::Config;
use itempipe_protocol::{AgentResult, ItemFlags, LogRecord, Measurement, ValueType};

/// Value type as accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeArg {
    Float,
    Str,
    Log,
    Uint64,
    Text,
}

impl From<TypeArg> for ValueType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Float => ValueType::Float,
            TypeArg::Str => ValueType::Str,
            TypeArg::Log => ValueType::Log,
            TypeArg::Uint64 => ValueType::Uint64,
            TypeArg::Text => ValueType::Text,
        }
    }
}

/// Push command arguments
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Item identifier
    #[arg(long)]
    pub itemid: u64,

    /// Value type of the item
    #[arg(long = "type", value_enum, default_value = "text")]
    pub value_type: TypeArg,

    /// Measured value, parsed according to --type
    #[arg(required_unless_present = "not_supported")]
    pub value: Option<String>,

    /// Submit a failed measurement with this error message
    #[arg(long, value_name = "ERROR", conflicts_with = "value")]
    pub not_supported: Option<String>,

    /// Mark the item as a discovery rule
    #[arg(long)]
    pub discovery: bool,

    /// Socket path (overrides [ipc] socket_path)
    #[arg(short, long)]
    pub socket: Option<PathBuf>,
}

/// Run the push command
pub async fn run(args: PushArgs, config: Config) -> Result<()> {
    let socket_path = super::socket_path(&config, args.socket.clone());
    let measurement = build_measurement(&args)?;
    let itemid = measurement.itemid;

    let mut client = PreprocessingClient::connect_lazy(&socket_path, Arc::new(LoggingDiscovery))
        .with_policy(FailurePolicy::Propagate);

    client
        .preprocess_item_value(measurement)
        .await
        .context("failed to submit value")?;
    client
        .flush()
        .await
        .with_context(|| format!("failed to send to {}", socket_path.display()))?;

    let stats = client.stats();
    info!(
        itemid,
        enqueued = stats.values_enqueued,
        discovery = stats.discovery_forwarded,
        "value submitted"
    );
    Ok(())
}

/// Turn the command-line arguments into a measurement
fn build_measurement(args: &PushArgs) -> Result<Measurement> {
    let value_type = ValueType::from(args.value_type);

    let measurement = match (&args.not_supported, &args.value) {
        (Some(error), _) => {
            Measurement::not_supported(args.itemid, value_type, error.as_str(), None)
        }
        (None, Some(raw)) => {
            let result = parse_result(value_type, raw)?;
            Measurement::value(args.itemid, value_type, result, None)
        }
        (None, None) => anyhow::bail!("either a value or --not-supported is required"),
    };

    Ok(if args.discovery {
        measurement.with_flags(ItemFlags::DISCOVERY_RULE)
    } else {
        measurement
    })
}

fn parse_result(value_type: ValueType, raw: &str) -> Result<AgentResult> {
    Ok(match value_type {
        ValueType::Float => AgentResult::double(
            raw.parse()
                .with_context(|| format!("'{raw}' is not a float"))?,
        ),
        ValueType::Uint64 => AgentResult::uint64(
            raw.parse()
                .with_context(|| format!("'{raw}' is not an unsigned integer"))?,
        ),
        ValueType::Str => AgentResult::str(raw),
        ValueType::Text => AgentResult::text(raw),
        ValueType::Log => AgentResult::log(LogRecord::new(raw)),
    })
}
