use std::{io, sync::Arc};

use tokio::{io::BufReader, net::TcpStream};
use tracing::{error, info, warn};

use crate::{
    connection::Connection,
    listener::{ClientListener, ListenerId, ListenerRegistry},
    message::Message,
    receiver,
};

pub const DEFAULT_USERNAME: &str = "Dummy";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 15214;

/// A chat client holding at most one server connection at a time.
///
/// Inbound traffic is handled by a background task spawned for each
/// successful [`ChatClient::connect_to_server`]; outbound messages are
/// written synchronously by [`ChatClient::send_message`].
pub struct ChatClient {
    username: String,
    listeners: Arc<ListenerRegistry>,
    connection: Option<Arc<Connection>>,
}

impl ChatClient {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            listeners: Arc::new(ListenerRegistry::new()),
            connection: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn add_listener(&self, listener: Arc<dyn ClientListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|connection| connection.is_open())
    }

    /// Host and port of the current connection while it is open.
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        self.connection
            .as_deref()
            .filter(|connection| connection.is_open())
            .map(|connection| (connection.host(), connection.port()))
    }

    /// Replaces any existing connection with a new one to `host:port`.
    ///
    /// Failures are logged and reported as `false`; there is no retry.
    pub async fn connect_to_server(&mut self, host: &str, port: u16) -> bool {
        if let Some(previous) = self.connection.take() {
            previous.close().await;
        }

        if host.trim().is_empty() || port == 0 {
            error!(host, port, "invalid server address");
            return false;
        }

        let stream = match TcpStream::connect((host, port)).await {
            Ok(stream) => stream,
            Err(error) => {
                error!(?error, host, port, "could not connect to server");
                return false;
            }
        };
        info!(host, port, "connected to server");

        let (reader, writer) = stream.into_split();
        let connection = Arc::new(Connection::new(host.to_string(), port, writer));
        spawn_receiver(BufReader::new(reader), &connection, &self.listeners);
        self.connection = Some(connection);

        self.listeners.publish_connected(&self.username, port, host);
        true
    }

    /// Sends `text` as a message from the current username.
    ///
    /// A peer reset also closes the local side of the connection. Any other
    /// write failure leaves the connection as it is.
    pub async fn send_message(&self, text: &str) -> bool {
        let Some(connection) = self.connection.as_ref() else {
            warn!("cannot send message: not connected");
            return false;
        };

        let message = Message::new(text, self.username.as_str());
        match connection.send(&message).await {
            Ok(()) => true,
            Err(error) if error.kind() == io::ErrorKind::NotConnected => {
                warn!("cannot send message: connection closed");
                false
            }
            Err(error) if is_peer_reset(&error) => {
                connection.close().await;
                error!(?error, "server closed connection");
                false
            }
            Err(error) => {
                error!(?error, "unable to send message to server");
                false
            }
        }
    }

    /// Closes the current connection. Harmless when already closed.
    pub async fn disconnect(&self) {
        if let Some(connection) = &self.connection {
            connection.close().await;
        }
    }
}

fn spawn_receiver(
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    connection: &Arc<Connection>,
    listeners: &Arc<ListenerRegistry>,
) {
    let connection = Arc::clone(connection);
    let listeners = Arc::clone(listeners);
    tokio::spawn(async move {
        let exit = receiver::run(reader, connection, listeners).await;
        info!(?exit, "receiver stopped");
    });
}

fn is_peer_reset(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_reset_kinds() {
        for kind in [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::BrokenPipe,
        ] {
            assert!(is_peer_reset(&io::Error::from(kind)));
        }
        assert!(!is_peer_reset(&io::Error::from(io::ErrorKind::TimedOut)));
    }

    #[tokio::test]
    async fn new_client_is_disconnected() {
        let client = ChatClient::new(DEFAULT_USERNAME);
        assert!(!client.is_connected());
        assert!(client.endpoint().is_none());
        assert!(!client.send_message("hello").await);
        client.disconnect().await;
    }

    #[tokio::test]
    async fn invalid_address_is_rejected_without_connecting() {
        let mut client = ChatClient::new("alice");
        assert!(!client.connect_to_server("", DEFAULT_PORT).await);
        assert!(!client.connect_to_server("127.0.0.1", 0).await);
        assert!(!client.is_connected());
    }
}
