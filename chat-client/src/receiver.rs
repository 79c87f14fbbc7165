use std::{io, sync::Arc};

use tokio::{
    io::{AsyncBufRead, AsyncWriteExt},
    select,
};
use tracing::{error, info};

use crate::{
    connection::Connection,
    listener::ListenerRegistry,
    message::{Message, read_message},
};

/// Result of one attempt to pull a message off the wire.
#[derive(Debug)]
pub enum Inbound {
    Message(Message),
    EndOfStream,
    Failed(io::Error),
}

impl From<io::Result<Option<Message>>> for Inbound {
    fn from(result: io::Result<Option<Message>>) -> Self {
        match result {
            Ok(Some(message)) => Inbound::Message(message),
            Ok(None) => Inbound::EndOfStream,
            Err(error) => Inbound::Failed(error),
        }
    }
}

/// Why the receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverExit {
    /// The connection was closed locally while waiting for input.
    Closed,
    /// The server finished the stream cleanly.
    EndOfStream,
    /// A read or decode error ended the loop.
    Failed,
}

pub async fn receive<R>(reader: &mut R) -> Inbound
where
    R: AsyncBufRead + Unpin,
{
    read_message(reader).await.into()
}

/// Background read loop for one connection.
///
/// Publishes every decoded message to `listeners`, echoes it to stdout, and
/// closes `connection` on every exit path.
pub async fn run<R>(
    mut reader: R,
    connection: Arc<Connection>,
    listeners: Arc<ListenerRegistry>,
) -> ReceiverExit
where
    R: AsyncBufRead + Unpin,
{
    let exit = loop {
        let inbound = select! {
            _ = connection.closed() => break ReceiverExit::Closed,
            inbound = receive(&mut reader) => inbound,
        };

        match inbound {
            Inbound::Message(message) => {
                listeners.publish_message(message.sender(), message.content());
                if let Err(error) = echo(&message).await {
                    error!(?error, "failed to echo message to console");
                }
            }
            Inbound::EndOfStream => {
                info!("connection closed by server");
                break ReceiverExit::EndOfStream;
            }
            Inbound::Failed(error) => {
                error!(?error, "failed to receive message from server");
                break ReceiverExit::Failed;
            }
        }
    };

    connection.close().await;
    exit
}

async fn echo(message: &Message) -> io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{message}\n\n").as_bytes())
        .await?;
    stdout.flush().await
}
