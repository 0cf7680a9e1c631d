//! Time-limited warning prompt guarding the reset.
//!
//! The operator must type back a freshly generated `Yes-{n}` token. The token
//! is shown in the prompt itself, so this guards against scripted or mistyped
//! invocations, not against a determined operator.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

use super::ResetError;

/// Upper bound (inclusive) of the number embedded in the token.
const TOKEN_MAX: u32 = 30;

/// One prompt's expected answer. Consumed by the comparison.
#[derive(Debug)]
pub struct ConfirmationChallenge {
    expected_token: String,
    timeout: Duration,
}

impl ConfirmationChallenge {
    pub fn generate(timeout: Duration) -> Self {
        let n = rand::thread_rng().gen_range(1..=TOKEN_MAX);
        Self {
            expected_token: format!("Yes-{n}"),
            timeout,
        }
    }

    pub fn expected_token(&self) -> &str {
        &self.expected_token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn prompt_text(&self) -> String {
        format!(
            "\nATTENTION!  You are about to reset Taurus Engine's message queues/exchanges, \
             model checkpoints, and repository.\n\n\
             To back out immediately without making any changes, type anything but \
             \"{token}\" in the prompt below and press return. \
             (auto-abort in {secs} seconds)\n\n\
             Are you sure you want to continue? ",
            token = self.expected_token,
            secs = self.timeout.as_secs(),
        )
    }

    fn check(self, answer: &str) -> Result<(), ResetError> {
        if answer == self.expected_token {
            Ok(())
        } else {
            Err(ResetError::UserAborted {
                expected: self.expected_token,
                actual: answer.to_string(),
            })
        }
    }
}

/// Something that can approve the reset before anything is deleted.
#[async_trait]
pub trait Confirmation: Send {
    async fn confirm(&mut self) -> Result<(), ResetError>;
}

/// Prompts on `output` and waits up to `timeout` for one line on `input`.
pub struct ConfirmationGate<R, W> {
    input: R,
    output: W,
    timeout: Duration,
}

impl ConfirmationGate<BufReader<Stdin>, std::io::Stdout> {
    pub fn stdio(timeout: Duration) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout(), timeout)
    }
}

impl<R, W> ConfirmationGate<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W, timeout: Duration) -> Self {
        Self {
            input,
            output,
            timeout,
        }
    }

    pub(crate) async fn answer(&mut self, challenge: ConfirmationChallenge) -> Result<(), ResetError> {
        self.output
            .write_all(challenge.prompt_text().as_bytes())
            .and_then(|()| self.output.flush())
            .map_err(ResetError::PromptIo)?;

        let mut line = String::new();
        match tokio::time::timeout(challenge.timeout(), self.input.read_line(&mut line)).await {
            Err(_) => {
                // Leave the cursor on a fresh line for whatever is printed next.
                let _ = writeln!(self.output);
                warn!(timeout_secs = challenge.timeout().as_secs(), "warning prompt timed out");
                Err(ResetError::PromptTimeout(challenge.timeout()))
            }
            Ok(Err(e)) => Err(ResetError::PromptIo(e)),
            Ok(Ok(_)) => challenge.check(line.trim_end_matches(['\r', '\n'])),
        }
    }
}

#[async_trait]
impl<R, W> Confirmation for ConfirmationGate<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn confirm(&mut self) -> Result<(), ResetError> {
        let challenge = ConfirmationChallenge::generate(self.timeout);
        self.answer(challenge).await
    }
}
