//! # Payment Code Reader
//!
//! A reader hands out a [`ScanSubscription`]: a stream of decoded codes
//! that stays open until it is cancelled or dropped.
//!
//! ## Subscription Lifecycle
//! ```text
//! reader.start() ──► ScanSubscription { id, events, cancel }
//!                         │
//!       next().await ◄────┤  ScanEvent::Decoded("…")   (0..n times)
//!                         │  ScanEvent::Failed("…")    (device error)
//!                         │  None                      (reader closed)
//!                         │
//!       cancel() / drop ──┘  stops the producer, closes the stream
//! ```

use std::io::BufRead;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::CollaboratorError;

/// Buffered events per subscription.
const EVENT_BUFFER: usize = 16;

/// One thing the reader saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Text decoded from a code.
    Decoded(String),
    /// The device reported an error. The stream ends after this.
    Failed(String),
}

/// Code-reading collaborator.
pub trait CodeReader: Send + Sync {
    fn start(&self) -> Result<ScanSubscription, CollaboratorError>;
}

// =============================================================================
// Subscription
// =============================================================================

/// A running scan session.
#[derive(Debug)]
pub struct ScanSubscription {
    id: Uuid,
    events: ReceiverStream<ScanEvent>,
    cancel: Option<oneshot::Sender<()>>,
    cancelled: bool,
}

impl ScanSubscription {
    /// Subscription whose producer stops when its sender sees the channel
    /// close.
    pub fn new(events: mpsc::Receiver<ScanEvent>) -> Self {
        ScanSubscription {
            id: Uuid::new_v4(),
            events: ReceiverStream::new(events),
            cancel: None,
            cancelled: false,
        }
    }

    /// Subscription whose producer also listens for an explicit stop signal.
    pub fn with_cancel(events: mpsc::Receiver<ScanEvent>, cancel: oneshot::Sender<()>) -> Self {
        ScanSubscription {
            id: Uuid::new_v4(),
            events: ReceiverStream::new(events),
            cancel: Some(cancel),
            cancelled: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next event, or `None` once the reader is done or cancelled.
    pub async fn next(&mut self) -> Option<ScanEvent> {
        if self.cancelled {
            return None;
        }
        self.events.next().await
    }

    /// Stops the reader. Safe to call more than once.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if let Some(stop) = self.cancel.take() {
            // the producer may already be gone
            let _ = stop.send(());
        }
        self.events.close();
        debug!(subscription = %self.id, "Scan subscription cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for ScanSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// Readers
// =============================================================================

/// Reads one code per line from standard input.
///
/// Handheld scanners in keyboard mode type the decoded text followed by
/// Enter, so this doubles as the hardware reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinCodeReader;

impl CodeReader for StdinCodeReader {
    fn start(&self) -> Result<ScanSubscription, CollaboratorError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        // Blocking stdin lives on its own thread so a pending read never
        // holds up runtime shutdown.
        std::thread::Builder::new()
            .name("maligai-scanner".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let event = match line {
                        Ok(text) if text.trim().is_empty() => continue,
                        Ok(text) => ScanEvent::Decoded(text.trim().to_string()),
                        Err(e) => {
                            let _ = tx.blocking_send(ScanEvent::Failed(e.to_string()));
                            break;
                        }
                    };
                    if tx.blocking_send(event).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| CollaboratorError::Unavailable(format!("Scanner ({})", e)))?;

        Ok(ScanSubscription::new(rx))
    }
}

/// Replays a fixed list of events, one every `interval`.
///
/// Stands in for a camera when wiring up another front end, and drives the
/// checkout tests.
#[derive(Debug, Clone, Default)]
pub struct ChannelCodeReader {
    events: Vec<ScanEvent>,
    interval: Duration,
}

impl ChannelCodeReader {
    pub fn new(events: Vec<ScanEvent>) -> Self {
        ChannelCodeReader {
            events,
            interval: Duration::ZERO,
        }
    }

    /// Decoded text events, one per string.
    pub fn decoding<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(codes.into_iter().map(|c| ScanEvent::Decoded(c.into())).collect())
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl CodeReader for ChannelCodeReader {
    fn start(&self) -> Result<ScanSubscription, CollaboratorError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let events = self.events.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            for event in events {
                tokio::select! {
                    _ = &mut stop_rx => return,
                    _ = tokio::time::sleep(interval) => {}
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            // Keep the stream open like a camera that sees nothing more.
            let _ = stop_rx.await;
        });

        Ok(ScanSubscription::with_cancel(rx, stop_tx))
    }
}

/// Reader for counters without a scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCodeReader;

impl CodeReader for UnavailableCodeReader {
    fn start(&self) -> Result<ScanSubscription, CollaboratorError> {
        warn!("Scan requested but no scanner is configured");
        Err(CollaboratorError::Unavailable("Scanner".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_reader_replays_then_cancels() {
        let reader = ChannelCodeReader::decoding(["first", "second"]);
        let mut sub = reader.start().unwrap();

        assert_eq!(sub.next().await, Some(ScanEvent::Decoded("first".to_string())));
        assert_eq!(sub.next().await, Some(ScanEvent::Decoded("second".to_string())));

        sub.cancel();
        assert!(sub.is_cancelled());
        assert_eq!(sub.next().await, None);
        sub.cancel();
    }

    #[tokio::test]
    async fn test_each_subscription_has_its_own_id() {
        let reader = ChannelCodeReader::default();
        let a = reader.start().unwrap();
        let b = reader.start().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_unavailable_reader() {
        assert!(matches!(
            UnavailableCodeReader.start(),
            Err(CollaboratorError::Unavailable(_))
        ));
    }
}
