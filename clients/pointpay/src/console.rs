//! Terminal I/O used by the interactive controllers.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::errors::Result;

/// Output, blocking alerts and line prompts.
#[async_trait]
pub trait Console: Send {
    async fn show(&mut self, text: &str) -> Result<()>;

    /// A notification the user must see; `detail` is the raw error text.
    async fn alert(&mut self, detail: &str) -> Result<()>;

    /// Prompt for one line. `None` means the input is closed.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Yes/no question; anything but `y`/`yes` (or closed input) is no.
    async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N] ")).await?;
        Ok(matches!(
            answer.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        ))
    }
}

/// [`Console`] over the process's stdin/stdout.
pub struct StdConsole {
    input: Lines<BufReader<Stdin>>,
    output: Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            output: tokio::io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn show(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            self.output.write_all(b"\n").await?;
        }
        self.output.flush().await?;
        Ok(())
    }

    async fn alert(&mut self, detail: &str) -> Result<()> {
        self.show(&format!("\n*** {detail}\n")).await
    }

    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self.input.next_line().await?)
    }
}
