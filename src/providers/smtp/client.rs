//! Low-level SMTP protocol client.
//!
//! Drives the command/reply exchange over any already-established stream.
//! Securing the stream is the [`Dialer`](super::Dialer)'s job; by the time a
//! [`SmtpClient`] exists the server greeting is the first thing on the wire.

use std::collections::HashMap;

use base64::Engine;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::error::SmtpError;

/// Longest accepted reply line, CRLF included (RFC 5321 4.5.3.1.5).
const MAX_REPLY_LINE: usize = 512;
/// Most lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 100;

/// A complete, possibly multi-line, server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    /// All reply lines joined by a space.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// SMTP client bound to one connection.
pub struct SmtpClient<S> {
    stream: BufReader<S>,
    server_name: String,
    local_name: String,
    /// EHLO keywords (upper-cased) and their parameters. `None` until the
    /// hello exchange has run.
    extensions: Option<HashMap<String, String>>,
}

impl<S> SmtpClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap `stream` and read the server greeting, which must be 220.
    ///
    /// `local_name` is announced in EHLO/HELO.
    pub async fn new(stream: S, server_name: &str, local_name: &str) -> Result<Self, SmtpError> {
        let mut client = Self {
            stream: BufReader::new(stream),
            server_name: server_name.to_string(),
            local_name: local_name.to_string(),
            extensions: None,
        };
        let greeting = client.read_reply().await?;
        expect(greeting, &[220])?;
        Ok(client)
    }

    /// Host name the client was created for.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Parameter of an advertised extension (empty string when it has none).
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.extensions
            .as_ref()?
            .get(&name.to_uppercase())
            .map(String::as_str)
    }

    /// EHLO, falling back to HELO. Runs at most once per connection.
    async fn hello(&mut self) -> Result<(), SmtpError> {
        if self.extensions.is_some() {
            return Ok(());
        }

        let ehlo = format!("EHLO {}", self.local_name);
        let reply = self.command(&ehlo).await?;
        if reply.code == 250 {
            let extensions = reply
                .lines
                .iter()
                .skip(1)
                .map(|line| match line.split_once(' ') {
                    Some((keyword, param)) => (keyword.to_uppercase(), param.to_string()),
                    None => (line.to_uppercase(), String::new()),
                })
                .collect();
            self.extensions = Some(extensions);
            return Ok(());
        }

        debug!("EHLO rejected, trying HELO");
        let helo = format!("HELO {}", self.local_name);
        let reply = self.command(&helo).await?;
        expect(reply, &[250])?;
        self.extensions = Some(HashMap::new());
        Ok(())
    }

    /// AUTH PLAIN with an initial response.
    pub async fn auth_plain(&mut self, username: &str, password: &str) -> Result<(), SmtpError> {
        self.hello().await?;

        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("\0{}\0{}", username, password));
        debug!("C: AUTH PLAIN <redacted>");
        self.write_line(&format!("AUTH PLAIN {}", token)).await?;
        let reply = self.read_reply().await?;
        expect(reply, &[235])?;
        Ok(())
    }

    /// MAIL FROM.
    pub async fn mail(&mut self, from: &str) -> Result<(), SmtpError> {
        validate_line(from)?;
        self.hello().await?;

        let mut cmd = format!("MAIL FROM:<{}>", from);
        if self.extension("8BITMIME").is_some() {
            cmd.push_str(" BODY=8BITMIME");
        }
        let reply = self.command(&cmd).await?;
        expect(reply, &[250])?;
        Ok(())
    }

    /// RCPT TO.
    pub async fn rcpt(&mut self, to: &str) -> Result<(), SmtpError> {
        validate_line(to)?;
        let reply = self.command(&format!("RCPT TO:<{}>", to)).await?;
        expect(reply, &[250, 251])?;
        Ok(())
    }

    /// Issue DATA and return a writer for the payload.
    ///
    /// The message is only submitted once [`DataWriter::close`] succeeds.
    pub async fn data(&mut self) -> Result<DataWriter<'_, S>, SmtpError> {
        let reply = self.command("DATA").await?;
        expect(reply, &[354])?;
        Ok(DataWriter {
            client: self,
            line_start: true,
            after_cr: false,
        })
    }

    /// QUIT and drop the connection.
    pub async fn quit(mut self) -> Result<(), SmtpError> {
        let reply = self.command("QUIT").await?;
        expect(reply, &[221])?;
        Ok(())
    }

    /// Send a command and read the reply.
    async fn command(&mut self, cmd: &str) -> Result<Reply, SmtpError> {
        debug!("C: {}", cmd);
        self.write_line(cmd).await?;
        self.read_reply().await
    }

    async fn write_line(&mut self, line: &str) -> Result<(), SmtpError> {
        let stream = self.stream.get_mut();
        stream.write_all(format!("{}\r\n", line).as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Read a complete reply (may be multi-line).
    async fn read_reply(&mut self) -> Result<Reply, SmtpError> {
        let mut code = 0;
        let mut lines = Vec::new();

        loop {
            let mut buf = String::new();
            let read = (&mut self.stream)
                .take(MAX_REPLY_LINE as u64 + 1)
                .read_line(&mut buf)
                .await?;
            if read == 0 {
                return Err(SmtpError::ConnectionClosed);
            }
            if read > MAX_REPLY_LINE {
                return Err(SmtpError::MalformedReply(format!(
                    "reply line longer than {} bytes",
                    MAX_REPLY_LINE
                )));
            }
            let line = buf.trim_end_matches(&['\r', '\n'][..]);
            debug!("S: {}", line);

            let (line_code, last, text) = parse_reply_line(line)?;
            if lines.is_empty() {
                code = line_code;
            } else if line_code != code {
                return Err(SmtpError::MalformedReply(line.to_string()));
            }
            lines.push(text.to_string());

            if last {
                return Ok(Reply { code, lines });
            }
            if lines.len() >= MAX_REPLY_LINES {
                return Err(SmtpError::MalformedReply(format!(
                    "reply longer than {} lines",
                    MAX_REPLY_LINES
                )));
            }
        }
    }
}

/// Writer for the DATA phase.
///
/// Bare LF is sent as CRLF and lines starting with `.` are dot-stuffed.
/// A lone CR is passed through as is; only LF marks a line end.
pub struct DataWriter<'a, S> {
    client: &'a mut SmtpClient<S>,
    line_start: bool,
    after_cr: bool,
}

impl<S> DataWriter<'_, S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Write payload bytes.
    pub async fn write(&mut self, buf: &[u8]) -> Result<(), SmtpError> {
        let mut out = Vec::with_capacity(buf.len() + buf.len() / 64 + 2);
        for &byte in buf {
            if self.line_start && byte == b'.' {
                out.push(b'.');
            }
            if byte == b'\n' && !self.after_cr {
                out.push(b'\r');
            }
            out.push(byte);
            self.after_cr = byte == b'\r';
            self.line_start = byte == b'\n';
        }
        self.client.stream.get_mut().write_all(&out).await?;
        Ok(())
    }

    /// Terminate the payload and read the server's verdict.
    pub async fn close(self) -> Result<Reply, SmtpError> {
        let terminator: &[u8] = if self.line_start {
            b".\r\n"
        } else {
            b"\r\n.\r\n"
        };
        let stream = self.client.stream.get_mut();
        stream.write_all(terminator).await?;
        stream.flush().await?;

        let reply = self.client.read_reply().await?;
        expect(reply, &[250])
    }
}

/// Check the reply code, turning anything unexpected into an error.
fn expect(reply: Reply, codes: &[u16]) -> Result<Reply, SmtpError> {
    if codes.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(SmtpError::Reply {
            code: reply.code,
            message: reply.text(),
        })
    }
}

/// Split `NNN text`, `NNN-text` or bare `NNN` into code, last-line flag and text.
fn parse_reply_line(line: &str) -> Result<(u16, bool, &str), SmtpError> {
    let malformed = || SmtpError::MalformedReply(line.to_string());

    let digits = line.get(..3).ok_or_else(malformed)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let code: u16 = digits.parse().map_err(|_| malformed())?;

    match line.as_bytes().get(3) {
        None => Ok((code, true, "")),
        Some(b' ') => Ok((code, true, &line[4..])),
        Some(b'-') => Ok((code, false, &line[4..])),
        Some(_) => Err(malformed()),
    }
}

/// Reject arguments that would smuggle extra commands onto the wire.
fn validate_line(arg: &str) -> Result<(), SmtpError> {
    if arg.contains(&['\r', '\n'][..]) {
        return Err(SmtpError::InvalidLine(arg.to_string()));
    }
    Ok(())
}
