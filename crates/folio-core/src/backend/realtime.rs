//! Realtime change feed over the backend's Phoenix websocket.
//!
//! One connection per subscribed table. The connection joins
//! `realtime:public:{table}` with a `postgres_changes` filter for every event,
//! heartbeats on the `phoenix` topic, and forwards each change message as a
//! [`ChangeEvent`]. Lost connections are retried after a fixed delay until the
//! feed is dropped.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use super::ChangeFeed;
use crate::error::{BackendError, BackendResult};
use crate::model::{ChangeEvent, ChangeKind, Table};

/// Delay before reconnecting after the socket drops.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Interval between heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Phoenix serializer version requested in the socket URL.
const PROTOCOL_VERSION: &str = "1.0.0";

/// Websocket URL for the project at `base`.
pub fn websocket_url(base: &str, api_key: &str) -> BackendResult<Url> {
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };

    let mut url = Url::parse(&format!(
        "{}/realtime/v1/websocket",
        ws_base.trim_end_matches('/')
    ))
    .map_err(|e| BackendError::Realtime(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("apikey", api_key)
        .append_pair("vsn", PROTOCOL_VERSION);
    Ok(url)
}

/// Channel topic for `table`.
pub fn topic(table: Table) -> String {
    format!("realtime:public:{table}")
}

/// `phx_join` message subscribing to every change on `table`.
pub fn join_message(table: Table, api_key: &str, msg_ref: u64) -> Value {
    json!({
        "topic": topic(table),
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": table.name() }
                ]
            },
            "access_token": api_key
        },
        "ref": msg_ref.to_string()
    })
}

/// Heartbeat message.
pub fn heartbeat_message(msg_ref: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string()
    })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Parse a server frame into a change on `table`, if it is one.
///
/// Accepts both `postgres_changes` frames (kind under `payload.data.type`)
/// and legacy `INSERT` / `UPDATE` / `DELETE` frames.
pub fn parse_change(frame: &str, table: Table) -> Option<ChangeEvent> {
    let envelope: Envelope = serde_json::from_str(frame).ok()?;
    if envelope.topic != topic(table) {
        return None;
    }

    let kind = match envelope.event.as_str() {
        "postgres_changes" => envelope
            .payload
            .pointer("/data/type")
            .and_then(Value::as_str)
            .map_or(ChangeKind::Unknown, ChangeKind::from_wire),
        "INSERT" | "UPDATE" | "DELETE" => ChangeKind::from_wire(&envelope.event),
        _ => return None,
    };
    Some(ChangeEvent { table, kind })
}

/// Spawn the connection task for `table` and return its feed.
pub fn spawn_feed(base: &str, api_key: &str, table: Table, reconnect_delay: Duration) -> ChangeFeed {
    let (tx, rx) = mpsc::channel(ChangeFeed::CAPACITY);
    let base = base.to_string();
    let api_key = api_key.to_string();
    let task = tokio::spawn(async move {
        run_connection_loop(base, api_key, table, reconnect_delay, tx).await;
    });
    ChangeFeed::with_task(rx, task)
}

enum ReaderResult {
    Closed,
    Error(String),
    ChannelClosed,
}

async fn run_connection_loop(
    base: String,
    api_key: String,
    table: Table,
    reconnect_delay: Duration,
    tx: mpsc::Sender<ChangeEvent>,
) {
    let url = match websocket_url(&base, &api_key) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "realtime disabled");
            return;
        }
    };

    loop {
        info!(%table, "connecting to realtime");

        match connect_async(url.as_str()).await {
            Ok((ws_stream, _response)) => {
                info!(%table, "connected to realtime");
                match run_session(ws_stream, &api_key, table, &tx).await {
                    ReaderResult::Closed => info!(%table, "realtime connection closed"),
                    ReaderResult::Error(e) => warn!(%table, error = %e, "realtime reader error"),
                    ReaderResult::ChannelClosed => {
                        debug!(%table, "change feed dropped, stopping realtime");
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(%table, error = %e, "failed to connect to realtime");
            }
        }

        if tx.is_closed() {
            return;
        }
        info!(delay = ?reconnect_delay, "reconnecting to realtime");
        tokio::time::sleep(reconnect_delay).await;
    }
}

async fn run_session(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    api_key: &str,
    table: Table,
    tx: &mpsc::Sender<ChangeEvent>,
) -> ReaderResult {
    let (mut write, mut read) = ws_stream.split();
    let mut msg_ref: u64 = 1;

    let join = join_message(table, api_key, msg_ref).to_string();
    if let Err(e) = write.send(Message::text(join)).await {
        return ReaderResult::Error(e.to_string());
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // Skip the immediate first tick; the join just went out.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                msg_ref += 1;
                let beat = heartbeat_message(msg_ref).to_string();
                if let Err(e) = write.send(Message::text(beat)).await {
                    return ReaderResult::Error(e.to_string());
                }
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = parse_change(&text, table) {
                        debug!(%table, kind = ?event.kind, "change received");
                        if tx.send(event).await.is_err() {
                            return ReaderResult::ChannelClosed;
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        return ReaderResult::Error(e.to_string());
                    }
                }
                Some(Ok(Message::Close(_))) | None => return ReaderResult::Closed,
                Some(Ok(_)) => {}
                Some(Err(e)) => return ReaderResult::Error(e.to_string()),
            },
            () = tx.closed() => return ReaderResult::ChannelClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_swaps_scheme() {
        let url = websocket_url("https://abc.supabase.co", "anon").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );

        let local = websocket_url("http://localhost:54321/", "k").unwrap();
        assert_eq!(local.scheme(), "ws");
        assert_eq!(local.path(), "/realtime/v1/websocket");
    }

    #[test]
    fn join_message_filters_all_events() {
        let join = join_message(Table::Projects, "anon", 1);
        assert_eq!(join["topic"], "realtime:public:projects");
        assert_eq!(join["event"], "phx_join");
        let filter = &join["payload"]["config"]["postgres_changes"][0];
        assert_eq!(filter["event"], "*");
        assert_eq!(filter["table"], "projects");
    }

    #[test]
    fn heartbeat_goes_to_phoenix_topic() {
        let beat = heartbeat_message(7);
        assert_eq!(beat["topic"], "phoenix");
        assert_eq!(beat["event"], "heartbeat");
        assert_eq!(beat["ref"], "7");
    }

    #[test]
    fn parses_postgres_changes_frame() {
        let frame = r#"{"topic":"realtime:public:posts","event":"postgres_changes","payload":{"data":{"type":"DELETE","table":"posts"}},"ref":null}"#;
        assert_eq!(
            parse_change(frame, Table::Posts),
            Some(ChangeEvent {
                table: Table::Posts,
                kind: ChangeKind::Delete
            })
        );
    }

    #[test]
    fn parses_legacy_frame() {
        let frame = r#"{"topic":"realtime:public:posts","event":"INSERT","payload":{"type":"INSERT"},"ref":null}"#;
        assert_eq!(
            parse_change(frame, Table::Posts).map(|e| e.kind),
            Some(ChangeKind::Insert)
        );
    }

    #[test]
    fn ignores_replies_and_other_topics() {
        let reply = r#"{"topic":"realtime:public:posts","event":"phx_reply","payload":{"status":"ok"},"ref":"1"}"#;
        assert_eq!(parse_change(reply, Table::Posts), None);

        let other = r#"{"topic":"realtime:public:projects","event":"INSERT","payload":{}}"#;
        assert_eq!(parse_change(other, Table::Posts), None);

        assert_eq!(parse_change("not json", Table::Posts), None);
    }
}
