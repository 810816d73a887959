use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::interpreter::Interpreter;
use crate::message::{parse_inbound, Inbound, Outbound};
use crate::metrics::Metrics;
use crate::store::{JsonLedgerStore, LedgerStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct LedgerAgent<S> {
    pub interpreter: Interpreter<S>,
    pub metrics: Metrics,
}

impl LedgerAgent<JsonLedgerStore> {
    /// Open the JSON ledger under `config.data_dir` and build an agent on it
    pub fn open(config: Config) -> Result<Self, AgentError> {
        let store = JsonLedgerStore::open(&config.data_dir)?;
        Ok(Self::new(Interpreter::new(config, store)))
    }
}

impl<S: LedgerStore> LedgerAgent<S> {
    pub fn new(interpreter: Interpreter<S>) -> Self {
        Self {
            interpreter,
            metrics: Metrics::new(),
        }
    }

    /// Handle one message to completion. A persistence failure yields an
    /// error envelope and no reply.
    pub fn process(&mut self, msg: &Inbound) -> Option<Outbound> {
        let user_id = msg.user_id();
        match self.interpreter.handle(msg) {
            Ok(Some(response)) => {
                self.metrics.record_reply(response.kind());
                match Outbound::reply(user_id, &response) {
                    Ok(out) => Some(out),
                    Err(e) => {
                        error!(user_id = %user_id, error = %e, "failed to encode reply");
                        Some(Outbound::error(user_id, &e.to_string()))
                    }
                }
            }
            Ok(None) => {
                self.metrics.record_ignored();
                None
            }
            Err(e) => {
                self.metrics.record_failure();
                error!(user_id = %user_id, error = %e, "request failed");
                Some(Outbound::error(user_id, &e.to_string()))
            }
        }
    }

    /// Read line-delimited inbound JSON until EOF, writing one outbound JSON
    /// line per reply.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), AgentError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("agent ready, reading messages");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let msg = match parse_inbound(trimmed.as_bytes()) {
                Ok(msg) => msg,
                Err(e) => {
                    self.metrics.record_malformed();
                    warn!(error = %e, "failed to parse inbound message");
                    continue;
                }
            };

            if let Some(out) = self.process(&msg) {
                let mut data = serde_json::to_vec(&out)?;
                data.push(b'\n');
                writer.write_all(&data).await?;
                writer.flush().await?;
            }
        }

        info!(
            messages = self.metrics.messages_total,
            replies = self.metrics.replies_sent,
            ignored = self.metrics.ignored,
            failures = self.metrics.failures,
            malformed = self.metrics.malformed,
            success_rate = self.metrics.success_rate(),
            "input closed, agent stopping"
        );
        Ok(())
    }
}
