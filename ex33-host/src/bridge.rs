//! Relay of sandbox `postMessage` payloads to the host log feed via a tokio
//! broadcast channel. Fire-and-forget: nobody subscribed means dropped.

use ex33_core::{LogEntry, SandboxMessage};
use tokio::sync::broadcast;

/// Messages buffered per subscriber before the slowest one starts lagging.
pub const BRIDGE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct MessageBridge {
    tx: broadcast::Sender<LogEntry>,
}

impl Default for MessageBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BRIDGE_CAPACITY);
        Self { tx }
    }

    /// Decodes a raw payload from the sandbox and forwards it, stamped with the
    /// current time. Malformed payloads and messages with no listener are dropped.
    pub fn post(&self, raw: &str) {
        match SandboxMessage::parse(raw) {
            Ok(msg) => self.post_message(msg),
            Err(e) => tracing::warn!(error = %e, "dropping sandbox payload"),
        }
    }

    pub fn post_message(&self, msg: SandboxMessage) {
        let _ = self.tx.send(LogEntry::from(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Moves everything currently buffered in `rx` into `sink`, oldest first.
/// Lagged messages are skipped.
pub fn drain(rx: &mut broadcast::Receiver<LogEntry>, mut sink: impl FnMut(LogEntry)) -> usize {
    let mut delivered = 0;
    loop {
        match rx.try_recv() {
            Ok(entry) => {
                sink(entry);
                delivered += 1;
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "log bridge lagged");
            }
            Err(_) => break,
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use ex33_core::LogLevel;

    #[test]
    fn delivers_to_subscriber() {
        let bridge = MessageBridge::new();
        let mut rx = bridge.subscribe();
        bridge.post(r#"{"type":"log","level":"info","message":"hi"}"#);
        bridge.post(r#"{"type":"log","level":"error","message":"boom (line 2)"}"#);

        let mut got = Vec::new();
        assert_eq!(drain(&mut rx, |e| got.push(e)), 2);
        assert_eq!(got[0].message, "hi");
        assert_eq!(got[1].level, LogLevel::Error);
    }

    #[test]
    fn drops_without_listener() {
        let bridge = MessageBridge::new();
        bridge.post(r#"{"type":"log","level":"info","message":"lost"}"#);
        assert_eq!(bridge.listeners(), 0);

        let mut rx = bridge.subscribe();
        assert_eq!(drain(&mut rx, |_| {}), 0);
    }

    #[test]
    fn drops_malformed_payload() {
        let bridge = MessageBridge::new();
        let mut rx = bridge.subscribe();
        bridge.post("{\"type\":\"log\"");
        assert_eq!(drain(&mut rx, |_| {}), 0);
    }
}
