use anyhow::{Result, bail};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::core::AppConfig;
use crate::openai::{Message, Role};
use crate::transcribe::{self, TerminationReason};

pub async fn run() -> Result<()> {
    let config = AppConfig::default();

    let mut subtitles = String::new();
    tokio::io::stdin().read_to_string(&mut subtitles).await?;
    if subtitles.trim().is_empty() {
        bail!("No subtitle text on stdin");
    }

    let transcript = vec![
        Message::new(Role::System, &config.system_prompt),
        Message::new(Role::User, &subtitles),
    ];

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = tokio::spawn(async move {
        let client = reqwest::Client::new();
        transcribe::run(tx, transcript, &config, &client).await
    });

    let mut stdout = tokio::io::stdout();
    while let Some(chunk) = rx.recv().await {
        stdout.write_all(chunk.as_bytes()).await?;
        stdout.flush().await?;
    }

    match handle.await? {
        TerminationReason::RoundsExhausted => {
            eprintln!("Warning: round budget exhausted before the end marker; transcript may be truncated");
        }
        TerminationReason::BackendError => {
            bail!("Backend request failed");
        }
        TerminationReason::Finished | TerminationReason::Cancelled => {}
    }

    Ok(())
}
