//! WebSocket session to the chat service
//!
//! Frames are JSON objects tagged by `type`. After connecting, the client
//! sends `auth`, `listen` and one `register_command` per command, then the
//! server streams `message` and `command` frames. An `error` frame ends the
//! session.

use super::{ChatSession, CommandCall, CommandSpec, IncomingMessage, SessionError, SessionFeeds};

use async_trait::async_trait;
use futures::{SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tracing::{debug, info, warn};

/// Messages buffered between the socket and the ingest loop
const FEED_BUFFER: usize = 1024;

const OUTBOUND_BUFFER: usize = 100;

/// Frames from this service to the chat server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Authenticate with the bot token
    Auth { token: String },
    /// Subscribe to every message in every room
    Listen,
    /// Register a slash command
    RegisterCommand {
        name: String,
        args_info: String,
        info: String,
    },
    /// Post a message into a room
    Send {
        room: String,
        from: String,
        data: String,
    },
}

/// Frames from the chat server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A message posted in a room
    Message {
        room: String,
        from: String,
        data: String,
    },
    /// A registered command was invoked
    Command {
        room: String,
        from: String,
        name: String,
        #[serde(default)]
        args: String,
    },
    /// Fatal session error
    Error { message: String },
}

fn encode(frame: &ClientFrame) -> Result<Message, SessionError> {
    let text = serde_json::to_string(frame).map_err(|e| SessionError::Protocol(e.to_string()))?;
    Ok(Message::Text(text))
}

fn connection_error(e: tungstenite::Error) -> SessionError {
    SessionError::Connection(e.to_string())
}

/// Chat session over a WebSocket
pub struct WsSession {
    tx: mpsc::Sender<ClientFrame>,
}

impl WsSession {
    /// Connect, authenticate and register `commands`
    ///
    /// Returns the outbound handle and the inbound feeds. Socket failures
    /// after this point arrive as an `Err` on the message feed.
    pub async fn connect(
        url: &str,
        token: &str,
        commands: &[CommandSpec],
    ) -> Result<(Self, SessionFeeds), SessionError> {
        let (ws_stream, _) = connect_async(url).await.map_err(connection_error)?;
        let (mut sink, mut stream) = ws_stream.split();

        let mut handshake = vec![
            ClientFrame::Auth {
                token: token.to_string(),
            },
            ClientFrame::Listen,
        ];
        handshake.extend(commands.iter().map(|c| ClientFrame::RegisterCommand {
            name: c.name.clone(),
            args_info: c.args_info.clone(),
            info: c.info.clone(),
        }));
        for frame in &handshake {
            sink.send(encode(frame)?).await.map_err(connection_error)?;
        }

        info!(url = url, commands = commands.len(), "Connected to chat service");

        let (out_tx, mut out_rx) = mpsc::channel::<ClientFrame>(OUTBOUND_BUFFER);
        let (msg_tx, msg_rx) = mpsc::channel(FEED_BUFFER);
        let (cmd_tx, cmd_rx) = mpsc::channel(OUTBOUND_BUFFER);

        // Forward outbound frames to the socket
        let write_errors = msg_tx.clone();
        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let message = match encode(&frame) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(error = %e, "Dropping unencodable frame");
                        continue;
                    }
                };
                if let Err(e) = sink.send(message).await {
                    let _ = write_errors.send(Err(connection_error(e))).await;
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let reason = read_frames(&mut stream, &msg_tx, &cmd_tx).await;
            debug!(reason = %reason, "Chat stream ended");
            let _ = msg_tx.send(Err(reason)).await;
        });

        Ok((
            Self { tx: out_tx },
            SessionFeeds {
                messages: msg_rx,
                commands: cmd_rx,
            },
        ))
    }
}

#[async_trait]
impl ChatSession for WsSession {
    async fn send_message(&self, room: &str, from: &str, text: &str) -> Result<(), SessionError> {
        let frame = ClientFrame::Send {
            room: room.to_string(),
            from: from.to_string(),
            data: text.to_string(),
        };
        self.tx.send(frame).await.map_err(|_| SessionError::Closed)
    }
}

/// Route inbound frames until the stream ends, returning why it ended
async fn read_frames<S>(
    stream: &mut S,
    messages: &mpsc::Sender<Result<IncomingMessage, SessionError>>,
    commands: &mpsc::Sender<CommandCall>,
) -> SessionError
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(item) = stream.next().await {
        let text = match item {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => {
                    debug!("Ignoring non-UTF-8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(_)) => return SessionError::Closed,
            Ok(_) => continue,
            Err(e) => return connection_error(e),
        };

        match serde_json::from_str::<ServerFrame>(&text) {
            Ok(ServerFrame::Message { room, from, data }) => {
                if messages
                    .send(Ok(IncomingMessage { room, from, data }))
                    .await
                    .is_err()
                {
                    return SessionError::Closed;
                }
            }
            Ok(ServerFrame::Command {
                room,
                from,
                name,
                args,
            }) => {
                let call = CommandCall {
                    room,
                    from,
                    name,
                    args,
                };
                if commands.send(call).await.is_err() {
                    debug!("Command receiver dropped");
                }
            }
            Ok(ServerFrame::Error { message }) => return SessionError::Upstream(message),
            Err(e) => warn!(error = %e, "Ignoring unrecognized frame"),
        }
    }

    SessionError::Closed
}
