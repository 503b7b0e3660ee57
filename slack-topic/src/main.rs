//! slack-topic - Slack Channel Topic Setter
//!
//! Sets the topic for a named Slack channel. The topic may be a template
//! filled from a JSON object read from standard input.
//!
//! # Usage
//!
//! ```bash
//! # Static topic
//! slack-topic --token xoxb-... --channel general --topic "Release week"
//!
//! # Templated topic with stdin parameters
//! echo '{"name": "Alice"}' | \
//!     slack-topic -k xoxb-... -C general -t 'Man on duty: {{.name}}' -i
//! ```
//!
//! Success is silent. On failure a single error line is logged and the
//! process exits with a code identifying the error kind: 2 usage, 3 stdin,
//! 4 network/API, 5 channel not found, 6 template.

mod error;
mod render;
mod resolve;
mod slack;

use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::{
    error::{Error, Result},
    render::{ParameterSet, render_topic},
    resolve::resolve_channel,
    slack::SlackApi,
};

/// Sets the topic for a Slack channel.
#[derive(Parser, Debug)]
#[command(name = "slack-topic", version)]
#[command(about = "Sets the topic for a Slack channel")]
struct Args {
    /// Slack API token.
    #[arg(short = 'k', long, env = "SLACK_TOPIC_TOKEN")]
    token: String,

    /// Name of the channel to operate on.
    #[arg(short = 'C', long, env = "SLACK_TOPIC_CHANNEL")]
    channel: String,

    /// Topic text; interpreted as a template when --stdin-params is set.
    #[arg(short = 't', long)]
    topic: String,

    /// Read a JSON object from stdin as template parameters.
    #[arg(short = 'i', long)]
    stdin_params: bool,

    /// Request timeout in seconds.
    #[arg(long, env = "SLACK_TOPIC_TIMEOUT", default_value = "30")]
    timeout: u64,
}

/// Decodes the stdin document into a parameter object.
fn parse_params(input: &str) -> Result<ParameterSet> {
    match serde_json::from_str(input)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::StdinNotObject),
    }
}

async fn read_stdin_params() -> Result<ParameterSet> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    parse_params(&input)
}

/// Fetch directory, resolve the channel name, render the topic, set it.
/// The first failure aborts the rest; the set-topic call is the only
/// mutation and runs last.
async fn run(args: &Args, params: Option<&ParameterSet>) -> Result<()> {
    let api = SlackApi::new(args.token.clone(), Duration::from_secs(args.timeout))?;

    let channels = api.list_channels().await?;
    debug!(count = channels.len(), "fetched channel directory");

    let channel_id = resolve_channel(&args.channel, &channels)?;
    let topic = render_topic(&args.topic, params)?;

    api.set_topic(channel_id, &topic).await
}

fn exit_with(err: Error) -> ! {
    error!("{err}");
    std::process::exit(err.exit_code());
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Stdin is consumed fully before any network activity.
    let params = if args.stdin_params {
        match read_stdin_params().await {
            Ok(map) => Some(map),
            Err(err) => exit_with(err),
        }
    } else {
        None
    };

    if let Err(err) = run(&args, params.as_ref()).await {
        exit_with(err);
    }
}
