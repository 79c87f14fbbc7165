use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::client::ChatClient;

/// Typed on its own line to leave the chat. Never sent to the server.
pub const QUIT_COMMAND: &str = "/quit";

const LINE_ENDINGS: &[char] = &['\n', '\r'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    Disconnected,
    EndOfInput,
}

/// Feeds input lines to the client until `/quit`, end of input, or the
/// connection drops. Only a failure to read `input` is returned as an error.
pub async fn run<R, W>(
    client: &ChatClient,
    input: &mut R,
    output: &mut W,
) -> io::Result<ConsoleExit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    while client.is_connected() {
        buf.clear();
        let bytes_read = input.read_until(b'\n', &mut buf).await?;
        if bytes_read == 0 {
            // End of input still goes out once, as an empty message.
            client.send_message("").await;
            blank_line(output).await;
            return Ok(ConsoleExit::EndOfInput);
        }

        // Bytes that are not UTF-8 become U+FFFD instead of ending the session.
        let line = String::from_utf8_lossy(&buf);
        let text = line.trim_end_matches(LINE_ENDINGS);
        if text == QUIT_COMMAND {
            return Ok(ConsoleExit::Quit);
        }

        client.send_message(text).await;
        blank_line(output).await;
    }

    Ok(ConsoleExit::Disconnected)
}

async fn blank_line<W>(output: &mut W)
where
    W: AsyncWrite + Unpin,
{
    let result = async {
        output.write_all(b"\n").await?;
        output.flush().await
    }
    .await;
    if let Err(error) = result {
        debug!(?error, "failed to write console separator");
    }
}
