use std::{fmt, io};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const LINE_ENDINGS: &[char] = &['\n', '\r'];

/// One unit of chat content exchanged with the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    content: String,
    sender: String,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: sender.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {}", self.sender, self.content)
    }
}

/// Reads the next newline-delimited JSON message.
///
/// Returns `Ok(None)` when the peer has closed the stream between frames.
/// Malformed frames, including a final frame cut off before its newline,
/// surface as `io::ErrorKind::InvalidData`.
pub async fn read_message<R>(reader: &mut R) -> io::Result<Option<Message>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader.read_line(&mut line).await?;
        if bytes == 0 {
            return Ok(None);
        }

        if !line.ends_with('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "stream ended in the middle of a message",
            ));
        }

        let trimmed = line.trim_end_matches(LINE_ENDINGS);
        if trimmed.is_empty() {
            continue;
        }

        let parsed = serde_json::from_str(trimmed).map_err(to_io_error)?;
        return Ok(Some(parsed));
    }
}

pub async fn write_message<W>(writer: &mut W, message: &Message) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = serde_json::to_vec(message).map_err(to_io_error)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}

fn to_io_error(err: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn roundtrip_preserves_sender_and_content() {
        let (mut writer, reader) = tokio::io::duplex(1024);
        let mut reader = BufReader::new(reader);
        let message = Message::new("hello\nacross lines", "Jane Doe");

        write_message(&mut writer, &message)
            .await
            .expect("write message");
        let parsed = read_message(&mut reader)
            .await
            .expect("read message")
            .expect("expected message");

        assert_eq!(message, parsed);
        assert_eq!(parsed.content(), "hello\nacross lines");
        assert_eq!(parsed.sender(), "Jane Doe");
    }

    #[tokio::test]
    async fn end_of_stream_is_not_an_error() {
        let (writer, reader) = tokio::io::duplex(64);
        drop(writer);
        let mut reader = BufReader::new(reader);

        let outcome = read_message(&mut reader).await.expect("clean end");
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn malformed_frame_is_invalid_data() {
        let mut reader = BufReader::new(&b"{\"content\": 42}\n"[..]);

        let err = read_message(&mut reader).await.expect_err("bad frame");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn truncated_frame_is_invalid_data() {
        let mut reader = BufReader::new(&b"{\"content\":\"hi\",\"sender\":\"bo"[..]);

        let err = read_message(&mut reader).await.expect_err("truncated");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn blank_lines_between_frames_are_skipped() {
        let input = b"\n\r\n{\"content\":\"hi\",\"sender\":\"bob\"}\n";
        let mut reader = BufReader::new(&input[..]);

        let parsed = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(parsed, Message::new("hi", "bob"));
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[test]
    fn display_matches_console_echo() {
        assert_eq!(Message::new("hi there", "alice").to_string(), "<alice> hi there");
    }
}
