use std::io;

use tokio::{
    io::AsyncWriteExt,
    net::tcp::OwnedWriteHalf,
    sync::{Mutex, watch},
};
use tracing::{debug, warn};

use crate::message::{Message, write_message};

/// State shared between the sending side and the receiver task of one
/// TCP connection. Never reopened once closed.
pub struct Connection {
    host: String,
    port: u16,
    writer: Mutex<OwnedWriteHalf>,
    closed: watch::Sender<bool>,
}

impl Connection {
    pub(crate) fn new(host: String, port: u16, writer: OwnedWriteHalf) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            host,
            port,
            writer: Mutex::new(writer),
            closed,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_open(&self) -> bool {
        !*self.closed.borrow()
    }

    /// Resolves once [`Connection::close`] has been called.
    pub async fn closed(&self) {
        let mut watcher = self.closed.subscribe();
        watcher.wait_for(|closed| *closed).await.ok();
    }

    pub(crate) async fn send(&self, message: &Message) -> io::Result<()> {
        if !self.is_open() {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "connection already closed",
            ));
        }
        let mut writer = self.writer.lock().await;
        write_message(&mut *writer, message).await
    }

    /// Marks the connection closed and shuts down the write half.
    ///
    /// Only the first call does any work, so the receiver task and the sender
    /// may both call this. Shutdown failures are logged and swallowed.
    pub async fn close(&self) {
        if self.closed.send_replace(true) {
            debug!(host = %self.host, port = self.port, "connection already closed");
            return;
        }

        let mut writer = self.writer.lock().await;
        if let Err(error) = writer.shutdown().await {
            warn!(?error, host = %self.host, port = self.port, "failed to close connection cleanly");
        }
    }
}
