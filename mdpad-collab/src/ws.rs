//! WebSocket engine over tokio-tungstenite.
//!
//! Each [`SyncEngine::connect`] spawns one task that owns the socket:
//!
//! ```text
//!   WsHandle ── ClientMsg (mpsc) ──►┐
//!                                   │  connection task
//!                                   │   ├─ writer: ClientMsg → Text frame
//!   EventSink ◄── EngineEvent ──────┤   └─ reader: Text frame → ServerMsg
//!                                   │                → RemoteTracker
//!                                   ▼
//!                               WebSocket
//! ```
//!
//! The task reports `Connected` once the handshake completes and exactly
//! one `Disconnected` when the socket ends, unless the handle was
//! disposed first. Must be used from within a tokio runtime.

use futures_util::{SinkExt, StreamExt};
use mdpad_core::{PresenceRoster, UserInfo};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::engine::{EngineEvent, EventSink, SyncEngine, SyncHandle};
use crate::protocol::{ClientMsg, ProtocolError, RemoteTracker, ServerMsg};

#[derive(Debug, Clone, Default)]
pub struct WsEngine;

impl WsEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SyncEngine for WsEngine {
    type Handle = WsHandle;

    fn connect(&self, address: &str, events: EventSink) -> WsHandle {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(address.to_string(), events, outgoing_rx));
        WsHandle {
            outgoing: Some(outgoing_tx),
            task: Some(task),
        }
    }
}

/// Handle to one WebSocket connection task.
#[derive(Debug)]
pub struct WsHandle {
    outgoing: Option<mpsc::UnboundedSender<ClientMsg>>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle for WsHandle {
    fn set_info(&mut self, info: &UserInfo) {
        // Queued until the socket is open.
        if let Some(tx) = &self.outgoing {
            let _ = tx.send(ClientMsg::ClientInfo(info.clone()));
        }
    }

    fn dispose(&mut self) {
        self.outgoing = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for WsHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_connection(
    address: String,
    events: EventSink,
    mut outgoing: mpsc::UnboundedReceiver<ClientMsg>,
) {
    let stream = match tokio_tungstenite::connect_async(address.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            log::warn!("Connection to {address} failed: {e}");
            events.send(EngineEvent::Disconnected);
            return;
        }
    };
    log::debug!("WebSocket open: {address}");
    events.send(EngineEvent::Connected);

    let (mut writer, mut reader) = stream.split();
    let mut tracker = RemoteTracker::new();

    let reason: Result<(), ProtocolError> = loop {
        tokio::select! {
            msg = outgoing.recv() => {
                let Some(msg) = msg else {
                    break Ok(());
                };
                match msg.encode() {
                    Ok(text) => {
                        if let Err(e) = writer.send(Message::Text(text.into())).await {
                            break Err(e.into());
                        }
                    }
                    Err(e) => log::warn!("Dropping outgoing message: {e}"),
                }
            }
            frame = reader.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match ServerMsg::decode(text.as_str()) {
                        Ok(msg) => {
                            if let Some(event) = tracker.apply(msg) {
                                events.send(event);
                            }
                        }
                        Err(e) => log::debug!("Ignoring frame: {e}"),
                    },
                    Some(Ok(Message::Close(_))) | None => break Err(ProtocolError::ConnectionClosed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e.into()),
                }
            }
        }
    };

    match reason {
        Ok(()) => log::debug!("WebSocket to {address} released"),
        Err(e) => log::info!("WebSocket to {address} ended: {e}"),
    }

    // Remote participants are unknown while disconnected.
    if !tracker.roster().is_empty() {
        events.send(EngineEvent::Users(PresenceRoster::new()));
    }
    events.send(EngineEvent::Disconnected);
}
