//! Single game-server connection.
//!
//! The wire protocol is line-based: one request per line
//! (`<verb> <json-args>`), one response line per request (`OK <json>` or
//! `ERR <code> <message>`). A `login <password>` exchange authenticates the
//! connection before it is handed out.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use warden_core::{GameClientError, GameResult};

/// Error code a removal gets when its target is already gone.
const ERR_NOT_FOUND: &str = "not_found";

/// One authenticated connection to the game server.
pub struct RconConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RconConnection {
    /// Connect and authenticate.
    pub async fn connect(address: &str, password: &str) -> GameResult<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        let mut conn = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        };

        conn.command::<_, serde_json::Value>("login", &password).await?;
        tracing::debug!(address, "Game server connection established");

        Ok(conn)
    }

    /// Send one request line and parse the response line.
    pub async fn command<A, R>(&mut self, verb: &str, args: &A) -> GameResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let args = serde_json::to_string(args)
            .map_err(|e| GameClientError::Protocol(e.to_string()))?;
        self.writer
            .write_all(format!("{verb} {args}\n").as_bytes())
            .await?;
        self.writer.flush().await?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(GameClientError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by game server",
            )));
        }

        Self::parse_response(line.trim_end())
    }

    fn parse_response<R: DeserializeOwned>(line: &str) -> GameResult<R> {
        if let Some(body) = line.strip_prefix("OK") {
            let body = body.trim_start();
            let body = if body.is_empty() { "null" } else { body };
            return serde_json::from_str(body)
                .map_err(|e| GameClientError::Protocol(format!("bad OK body: {e}")));
        }

        if let Some(rest) = line.strip_prefix("ERR ") {
            let (code, message) = rest.split_once(' ').unwrap_or((rest, ""));
            return if code == ERR_NOT_FOUND {
                Err(GameClientError::NotFound)
            } else {
                Err(GameClientError::Transient(format!("{code}: {message}")))
            };
        }

        Err(GameClientError::Protocol(format!("unrecognized response: {line}")))
    }
}
