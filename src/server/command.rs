//! The `extract` chat command
//!
//! `extract <duration-or-count> [all]`:
//! - a count (`30`) replies with the last messages directly
//! - a duration (`10m`, `2h30m`) replies with a link to the HTTP extract
//! - a trailing `all` widens the scope from the invoking room to every room

use crate::query::{just_now, ExtractArg, QueryEngine, RoomFilter};
use crate::session::{ChatSession, CommandCall, CommandSpec};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const COMMAND_NAME: &str = "extract";

pub const INVALID_DURATION_REPLY: &str = "Error, invalid duration";

pub const EMPTY_REPLY: &str = "No messages found";

/// Registration details for the `extract` command
pub fn command_spec() -> CommandSpec {
    CommandSpec {
        name: COMMAND_NAME.to_string(),
        args_info: "duration".to_string(),
        info: "Extract the messages posted in `duration`".to_string(),
    }
}

/// Build the retrieval URL for a time window
///
/// Room names lose their leading `#`; the HTTP side puts it back.
pub fn extract_url(
    public_url: &str,
    scope: &RoomFilter,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> String {
    let base = public_url.trim_end_matches('/');
    let (from, to) = (from.timestamp_millis(), to.timestamp_millis());
    match scope {
        RoomFilter::All => format!("{}/timespan-all/{}/{}/extract.txt", base, from, to),
        RoomFilter::Room(room) => {
            let room = room.strip_prefix('#').unwrap_or(room);
            format!("{}/timespan/{}/{}/{}/extract.txt", base, room, from, to)
        }
    }
}

/// Split a trailing `all` off the arguments
fn split_scope<'a>(args: &'a str, room: &str) -> (&'a str, RoomFilter) {
    let args = args.trim();
    if args == "all" {
        return ("", RoomFilter::All);
    }
    match args.rsplit_once(char::is_whitespace) {
        Some((head, "all")) => (head.trim_end(), RoomFilter::All),
        _ => (args, RoomFilter::from_room(room)),
    }
}

/// What to send back into the invoking room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Extracted messages
    Text(String),
    /// Link to the HTTP extract
    Url(String),
    /// Argument could not be parsed
    Invalid,
}

impl Reply {
    pub fn into_message(self) -> String {
        match self {
            Self::Text(text) if text.is_empty() => EMPTY_REPLY.to_string(),
            Self::Text(text) => text,
            Self::Url(url) => url,
            Self::Invalid => INVALID_DURATION_REPLY.to_string(),
        }
    }
}

/// Answers `extract` invocations
pub struct CommandHandler {
    engine: QueryEngine,
    session: Arc<dyn ChatSession>,
    public_url: String,
    bot_name: String,
}

impl CommandHandler {
    pub fn new(
        engine: QueryEngine,
        session: Arc<dyn ChatSession>,
        public_url: impl Into<String>,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            session,
            public_url: public_url.into(),
            bot_name: bot_name.into(),
        }
    }

    /// Work out the reply to `call` as of `now`
    pub fn respond(&self, call: &CommandCall, now: DateTime<Utc>) -> Reply {
        let (arg, scope) = split_scope(&call.args, &call.room);

        match ExtractArg::parse(arg, now) {
            Ok(ExtractArg::Count(count)) => Reply::Text(self.engine.count_back(count, &scope)),
            Ok(ExtractArg::Since(from)) => {
                Reply::Url(extract_url(&self.public_url, &scope, from, just_now(now)))
            }
            Err(e) => {
                debug!(room = %call.room, error = %e, "Rejected extract argument");
                Reply::Invalid
            }
        }
    }

    /// Answer one invocation in the room it came from
    pub async fn handle(&self, call: CommandCall) {
        let reply = self.respond(&call, Utc::now());
        debug!(room = %call.room, from = %call.from, reply = ?reply, "Answering extract");

        let message = reply.into_message();
        if let Err(e) = self
            .session
            .send_message(&call.room, &self.bot_name, &message)
            .await
        {
            warn!(room = %call.room, error = %e, "Failed to send extract reply");
        }
    }

    /// Serve invocations until the command feed closes
    pub async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<CommandCall>) {
        while let Some(call) = commands.recv().await {
            if call.name != COMMAND_NAME {
                debug!(name = %call.name, "Ignoring unknown command");
                continue;
            }

            let handler = self.clone();
            tokio::spawn(async move { handler.handle(call).await });
        }
    }
}
