//! # Fan-in Aggregation
//!
//! Many producers, one consumer. The aggregator task takes ownership of the
//! table it fills, applies every message in arrival order, and hands the table
//! back when the stage is complete. Nothing else ever touches the table while a
//! stage runs, so it needs no lock.
//!
//! A stage is complete when the first of these happens:
//!
//! 1. every expected producer has sent its `Finished` marker,
//! 2. the channel closes because every sender is gone,
//! 3. nothing arrives for a whole inactivity window.
//!
//! The first two are the normal paths. Producers send a `Heartbeat` before
//! every fetch, so a live producer is never silent for longer than one fetch.
//! The window therefore only fires when a single step hangs; the stage driver
//! then abandons the remaining producers instead of waiting for them.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::HarvestError;

/// Message sent over a fan-in channel
#[derive(Debug)]
pub enum Envelope<M> {
    /// A table mutation
    Item(M),
    /// The sending producer is alive and about to fetch
    Heartbeat,
    /// The sending producer has no more items
    Finished {
        /// Whether the producer's unit ended with an error
        failed: bool,
    },
}

/// Table that can absorb messages of type `M`
pub trait Apply<M> {
    /// Apply one message; returns `false` if it was rejected
    fn apply(&mut self, message: M) -> bool;
}

/// Sending half handed to a single producer
#[derive(Debug)]
pub struct Producer<M> {
    tx: mpsc::Sender<Envelope<M>>,
}

impl<M> Clone for Producer<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M: Send> Producer<M> {
    /// Wrap a channel sender
    pub fn new(tx: mpsc::Sender<Envelope<M>>) -> Self {
        Self { tx }
    }

    /// Send a table mutation
    pub async fn emit(&self, message: M) -> Result<(), HarvestError> {
        self.send(Envelope::Item(message)).await
    }

    /// Reset the aggregator's inactivity window
    pub async fn heartbeat(&self) -> Result<(), HarvestError> {
        self.send(Envelope::Heartbeat).await
    }

    /// Report that this producer is done
    pub async fn finish(self, failed: bool) {
        if self.tx.send(Envelope::Finished { failed }).await.is_err() {
            debug!("Aggregator already stopped before producer finished");
        }
    }

    async fn send(&self, envelope: Envelope<M>) -> Result<(), HarvestError> {
        self.tx
            .send(envelope)
            .await
            .map_err(|_| HarvestError::ChannelClosed)
    }
}

/// How an aggregation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every expected producer reported `Finished`
    AllProducersFinished,
    /// All senders were dropped
    ChannelClosed,
    /// Nothing arrived within the inactivity window
    IdleTimeout,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllProducersFinished => write!(f, "all producers finished"),
            Self::ChannelClosed => write!(f, "channel closed"),
            Self::IdleTimeout => write!(f, "idle timeout"),
        }
    }
}

/// Result of an aggregation: the table and how it got there
#[derive(Debug)]
pub struct Aggregated<T> {
    /// The table with every applied message
    pub table: T,

    /// Why the aggregator stopped
    pub completion: Completion,

    /// Producers the aggregator waited for
    pub expected: usize,

    /// Producers that reported `Finished`
    pub finished: usize,

    /// Finished producers whose unit ended with an error
    pub failed: usize,

    /// Messages applied to the table
    pub applied: usize,

    /// Messages the table rejected
    pub rejected: usize,
}

impl<T> Aggregated<T> {
    /// Whether the safety net fired before every producer reported
    pub fn stalled(&self) -> bool {
        self.completion == Completion::IdleTimeout && self.finished < self.expected
    }
}

/// Drain `rx` into `table` until the stage is complete
pub async fn aggregate<T, M>(
    mut table: T,
    mut rx: mpsc::Receiver<Envelope<M>>,
    expected: usize,
    idle_timeout: Duration,
) -> Aggregated<T>
where
    T: Apply<M>,
{
    info!("Aggregator started, waiting for {} producers", expected);

    let mut finished = 0;
    let mut failed = 0;
    let mut applied = 0;
    let mut rejected = 0;

    let completion = loop {
        if finished >= expected {
            break Completion::AllProducersFinished;
        }

        match tokio::time::timeout(idle_timeout, rx.recv()).await {
            Ok(Some(Envelope::Item(message))) => {
                if table.apply(message) {
                    applied += 1;
                } else {
                    rejected += 1;
                }
            }
            Ok(Some(Envelope::Heartbeat)) => {}
            Ok(Some(Envelope::Finished { failed: unit_failed })) => {
                finished += 1;
                failed += usize::from(unit_failed);
            }
            Ok(None) => {
                info!(
                    "Aggregator channel closed with {}/{} producers finished",
                    finished, expected
                );
                break Completion::ChannelClosed;
            }
            Err(_) => {
                warn!(
                    "No activity for {:?}, stopping aggregator with {}/{} producers finished",
                    idle_timeout, finished, expected
                );
                break Completion::IdleTimeout;
            }
        }
    };

    debug!(
        "Aggregator done ({}): {} applied, {} rejected",
        completion, applied, rejected
    );

    Aggregated {
        table,
        completion,
        expected,
        finished,
        failed,
        applied,
        rejected,
    }
}
