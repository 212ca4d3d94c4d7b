//! Multi-round streaming continuation controller.
//!
//! Completion backends cap output length per call. This module treats
//! that cap as a round boundary: the model is instructed to emit a
//! literal `<end/>` marker once the full transcript has been produced,
//! and until the marker shows up the controller keeps the conversation
//! going with a fixed "continue" prompt, forwarding every fragment to
//! the output channel as it arrives. Truncation by the token cap is
//! otherwise indistinguishable from true completion, which is why the
//! end of a backend stream is never taken as the end of the answer.

use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;

use crate::core::AppConfig;
use crate::openai::{Message, Role, completion_stream};

/// End-of-output marker the model is prompted to emit. Never forwarded
/// to the caller.
pub const END_SENTINEL: &str = "<end/>";

/// Prompt appended to resume an unfinished answer. The backend already
/// holds the full history so the subject text is not repeated.
pub const CONTINUE_PROMPT: &str = "continue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The end marker was observed; the output is complete.
    Finished,
    /// The round budget ran out before the end marker; the output may
    /// be truncated.
    RoundsExhausted,
    /// The client went away; consumption stopped early.
    Cancelled,
    /// The backend failed mid-round; a diagnostic fragment was written
    /// to the output before stopping.
    BackendError,
}

/// Scans a fragment stream for [`END_SENTINEL`], which may arrive split
/// across fragment boundaries. Text is released for flushing as soon as
/// it can no longer be part of the marker: after each push the splitter
/// holds back only the longest trailing run that is a proper prefix of
/// the marker (at most 5 bytes, always ASCII so never inside a UTF-8
/// character).
#[derive(Default)]
struct SentinelSplitter {
    carry: String,
}

impl SentinelSplitter {
    /// Absorb the next fragment. Returns the text that is safe to flush
    /// and whether the sentinel was found. Once found, the sentinel and
    /// anything after it is discarded.
    fn push(&mut self, fragment: &str) -> (String, bool) {
        self.carry.push_str(fragment);

        if let Some(idx) = self.carry.find(END_SENTINEL) {
            let out = self.carry[..idx].to_string();
            self.carry.clear();
            return (out, true);
        }

        let keep = longest_sentinel_prefix(&self.carry);
        let split = self.carry.len() - keep;
        let out = self.carry[..split].to_string();
        self.carry.drain(..split);
        (out, false)
    }

    /// Release held-back text once the round's stream has ended without
    /// producing the sentinel.
    fn take_rest(&mut self) -> String {
        std::mem::take(&mut self.carry)
    }
}

/// Length in bytes of the longest suffix of `text` that is a proper
/// prefix of [`END_SENTINEL`].
fn longest_sentinel_prefix(text: &str) -> usize {
    let max = (END_SENTINEL.len() - 1).min(text.len());
    (1..=max)
        .rev()
        .find(|&k| text.ends_with(&END_SENTINEL[..k]))
        .unwrap_or(0)
}

/// Drive sequential completion rounds until the end marker is seen or
/// the round budget is exhausted, forwarding output fragments to `tx`
/// in arrival order.
///
/// The transcript must already hold the system instruction and the
/// subject text; validating the subject is the caller's job. Owning
/// `tx` guarantees the channel closes exactly once on every exit path.
/// A closed receiver (client disconnect) stops fragment consumption and
/// aborts the in-flight backend call by dropping its stream. Backend
/// errors are not retried; a short diagnostic is written inline since
/// the response status has long been committed by the time they occur.
pub async fn run(
    tx: UnboundedSender<String>,
    mut transcript: Vec<Message>,
    config: &AppConfig,
    client: &reqwest::Client,
) -> TerminationReason {
    let max_rounds = config.max_rounds.max(1);

    for round in 0..max_rounds {
        if tx.is_closed() {
            return TerminationReason::Cancelled;
        }

        let mut stream = completion_stream(client, config, &transcript);
        let mut splitter = SentinelSplitter::default();
        let mut accumulated = String::new();
        let mut finished = false;

        while let Some(fragment) = stream.next().await {
            let fragment = match fragment {
                Ok(fragment) => fragment,
                Err(e) => {
                    tracing::error!("Backend stream failed on round {}: {}", round, e);
                    let _ = tx.send(format!("\nError: {}\n", e));
                    return TerminationReason::BackendError;
                }
            };

            let (flushed, found) = splitter.push(&fragment);
            if !flushed.is_empty() {
                accumulated.push_str(&flushed);
                if tx.send(flushed).is_err() {
                    return TerminationReason::Cancelled;
                }
            }
            if found {
                // Don't wait for the backend to close its stream.
                finished = true;
                break;
            }
        }

        if finished {
            return TerminationReason::Finished;
        }

        // The round hit its token cap. Flush anything held back by the
        // splitter, then delimit the round for the caller.
        let rest = splitter.take_rest();
        if !rest.is_empty() {
            accumulated.push_str(&rest);
            if tx.send(rest).is_err() {
                return TerminationReason::Cancelled;
            }
        }
        if tx.send("\n".to_string()).is_err() {
            return TerminationReason::Cancelled;
        }

        if round + 1 == max_rounds {
            tracing::warn!(
                "Round budget of {} exhausted without the end marker; output may be truncated",
                max_rounds
            );
            return TerminationReason::RoundsExhausted;
        }

        transcript.push(Message::new(Role::Assistant, &accumulated));
        transcript.push(Message::new(Role::User, CONTINUE_PROMPT));
    }

    TerminationReason::RoundsExhausted
}
