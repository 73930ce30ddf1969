// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain-text email over SMTP
//!
//! Speaks the minimal unauthenticated dialogue a local relay accepts:
//! HELO, MAIL FROM, RCPT TO, DATA, QUIT.

use super::{Contact, Notice, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Clone, Debug)]
pub struct SmtpNotifyAdapter {
    host: String,
    port: u16,
    from: String,
    subject: String,
    timeout: Duration,
}

impl SmtpNotifyAdapter {
    pub fn new(host: impl Into<String>, port: u16, from: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            from: from.into(),
            subject: "Class Enrollment Notification".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// RFC 5322 message with dot-stuffed body and CRLF line endings
    fn build_message(&self, to: &str, body: &str) -> String {
        let mut message = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n",
            self.from, to, self.subject
        );
        for line in body.lines() {
            if line.starts_with('.') {
                message.push('.');
            }
            message.push_str(line);
            message.push_str("\r\n");
        }
        message.push_str(".\r\n");
        message
    }

    async fn deliver(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let (read, mut write) = stream.into_split();
        let mut replies = BufReader::new(read);

        expect_reply(&mut replies, 220).await?;
        command(&mut write, &mut replies, "HELO localhost", 250).await?;
        command(&mut write, &mut replies, &format!("MAIL FROM:<{}>", self.from), 250).await?;
        command(&mut write, &mut replies, &format!("RCPT TO:<{}>", to), 250).await?;
        command(&mut write, &mut replies, "DATA", 354).await?;
        write.write_all(self.build_message(to, body).as_bytes()).await?;
        expect_reply(&mut replies, 250).await?;
        command(&mut write, &mut replies, "QUIT", 221).await?;
        Ok(())
    }
}

async fn command<W, R>(
    write: &mut W,
    replies: &mut R,
    line: &str,
    expected: u16,
) -> Result<(), NotifyError>
where
    W: AsyncWriteExt + Unpin,
    R: AsyncBufReadExt + Unpin,
{
    write.write_all(line.as_bytes()).await?;
    write.write_all(b"\r\n").await?;
    write.flush().await?;
    expect_reply(replies, expected).await
}

/// Read a (possibly multi-line) reply and check its code
async fn expect_reply<R>(replies: &mut R, expected: u16) -> Result<(), NotifyError>
where
    R: AsyncBufReadExt + Unpin,
{
    loop {
        let mut line = String::new();
        if replies.read_line(&mut line).await? == 0 {
            return Err(NotifyError::Smtp("connection closed".to_string()));
        }
        let code: u16 = line
            .get(..3)
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| NotifyError::Smtp(format!("malformed reply: {}", line.trim_end())))?;
        // "250-..." continues, "250 ..." ends the reply
        if line.as_bytes().get(3) == Some(&b'-') {
            continue;
        }
        if code != expected {
            return Err(NotifyError::Smtp(format!(
                "expected {}, got: {}",
                expected,
                line.trim_end()
            )));
        }
        return Ok(());
    }
}

/// Envelope and header values must not smuggle extra lines into the dialogue
fn single_line(field: &str, value: &str) -> Result<(), NotifyError> {
    if value.contains(['\r', '\n']) {
        return Err(NotifyError::Smtp(format!("{} contains a line break", field)));
    }
    Ok(())
}

#[async_trait]
impl NotifyAdapter for SmtpNotifyAdapter {
    async fn send(&self, contact: &Contact, notice: &Notice) -> Result<(), NotifyError> {
        let Contact::Email(to) = contact else {
            return Err(NotifyError::Unsupported {
                adapter: "smtp",
                kind: contact.kind(),
            });
        };
        single_line("recipient", to)?;
        single_line("sender", &self.from)?;
        single_line("subject", &self.subject)?;
        tokio::time::timeout(self.timeout, self.deliver(to, &notice.message))
            .await
            .map_err(|_| NotifyError::Timeout)?
    }
}

#[cfg(test)]
#[path = "smtp_tests.rs"]
mod tests;
