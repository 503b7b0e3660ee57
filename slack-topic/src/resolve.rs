//! Channel name resolution.

use crate::error::{Error, Result};
use crate::slack::Channel;

/// Resolves a channel name to its stable ID.
///
/// Exact, case-sensitive match; the first matching channel wins. Slack does
/// not guarantee unique names or a stable listing order, so which duplicate
/// wins can vary between invocations — a known limitation of the directory,
/// not something resolution can fix.
pub fn resolve_channel<'a>(name: &str, channels: &'a [Channel]) -> Result<&'a str> {
    channels
        .iter()
        .find(|channel| channel.name == name)
        .map(|channel| channel.id.as_str())
        .ok_or_else(|| Error::ChannelNotFound {
            name: name.to_string(),
        })
}
