use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use crate::{
    assets::{
        decode::decode_frame,
        source::FrameSource,
        store::{Frame, FrameStore},
    },
    foundation::error::{ReelError, ReelResult},
};

/// How often a blocked loader wakes up to check cancellation and deadlines.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Shared cancellation flag handed to a load.
///
/// Cancelling abandons every suspended wait; fetches already running on worker threads finish
/// on their own but their results are dropped.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Options controlling [`FrameLoader`] scheduling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOpts {
    /// Maximum number of fetch attempts in flight at once.
    pub concurrency: usize,
    /// Per-attempt deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Extra attempts granted to a frame after its first failure or timeout.
    pub retries: u32,
}

impl Default for LoadOpts {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Some(Duration::from_secs(10)),
            retries: 1,
        }
    }
}

impl LoadOpts {
    /// One frame in flight, no deadline, no retry.
    pub fn sequential() -> Self {
        Self {
            concurrency: 1,
            timeout: None,
            retries: 0,
        }
    }
}

struct AttemptMsg {
    attempt: u64,
    result: ReelResult<Frame>,
}

struct InFlight {
    slot: usize,
    tries: u32,
    deadline: Option<Instant>,
}

/// Loads a whole frame sequence into a [`FrameStore`].
pub struct FrameLoader {
    source: Arc<dyn FrameSource>,
    total: usize,
    opts: LoadOpts,
}

impl FrameLoader {
    pub fn new(source: Arc<dyn FrameSource>, total: usize, opts: LoadOpts) -> ReelResult<Self> {
        if opts.concurrency == 0 {
            return Err(ReelError::validation("loader concurrency must be >= 1"));
        }
        if opts.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ReelError::validation("loader timeout must be > 0 when set"));
        }
        Ok(Self {
            source,
            total,
            opts,
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Fetch and decode positions `1..=N`, then publish the store in one piece.
    ///
    /// Every attempt that settles (success, failure after retries, or timeout after retries)
    /// advances the completion counter and reports `completed / N * 100` to `on_progress`, so the
    /// reported values never decrease and the last one is exactly `100`. Frames that never load
    /// leave their slot empty.
    ///
    /// The cancellation token is checked before every state update. Once it fires the load
    /// returns [`ReelError::Cancelled`] without reporting or publishing anything further.
    #[tracing::instrument(skip(self, cancel, on_progress), fields(total = self.total))]
    pub fn load(
        &self,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(f64),
    ) -> ReelResult<FrameStore> {
        let total = self.total;
        if total == 0 {
            on_progress(100.0);
            return Ok(FrameStore::empty(0));
        }

        let (tx, rx) = mpsc::channel::<AttemptMsg>();
        let mut slots: Vec<Option<Arc<Frame>>> = vec![None; total];
        let mut queue: VecDeque<(usize, u32)> = (0..total).map(|slot| (slot, 0)).collect();
        let mut in_flight: HashMap<u64, InFlight> = HashMap::new();
        let mut next_attempt = 0u64;
        let mut completed = 0usize;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(completed, "load cancelled");
                return Err(ReelError::Cancelled);
            }

            while in_flight.len() < self.opts.concurrency {
                let Some((slot, tries)) = queue.pop_front() else {
                    break;
                };
                let attempt = next_attempt;
                next_attempt += 1;
                self.spawn_attempt(attempt, slot, tx.clone())?;
                in_flight.insert(
                    attempt,
                    InFlight {
                        slot,
                        tries: tries + 1,
                        deadline: self.opts.timeout.map(|t| Instant::now() + t),
                    },
                );
            }

            if in_flight.is_empty() {
                break;
            }

            let wait = next_wait(&in_flight);
            let settled: Vec<(InFlight, Option<ReelResult<Frame>>)> = match rx.recv_timeout(wait)
            {
                Ok(msg) => match in_flight.remove(&msg.attempt) {
                    Some(info) => vec![(info, Some(msg.result))],
                    None => {
                        tracing::debug!(attempt = msg.attempt, "dropping result of abandoned attempt");
                        Vec::new()
                    }
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    let now = Instant::now();
                    let expired: Vec<u64> = in_flight
                        .iter()
                        .filter(|(_, f)| f.deadline.is_some_and(|d| d <= now))
                        .map(|(id, _)| *id)
                        .collect();
                    expired
                        .into_iter()
                        .filter_map(|id| in_flight.remove(&id))
                        .map(|info| (info, None))
                        .collect()
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(ReelError::load("loader channel disconnected unexpectedly"));
                }
            };

            for (info, result) in settled {
                let position = info.slot as u32 + 1;
                let failure = match result {
                    Some(Ok(frame)) => {
                        if cancel.is_cancelled() {
                            return Err(ReelError::Cancelled);
                        }
                        slots[info.slot] = Some(Arc::new(frame));
                        None
                    }
                    Some(Err(err)) => Some(err.to_string()),
                    None => Some("timed out".to_string()),
                };

                if let Some(reason) = failure {
                    if info.tries <= self.opts.retries {
                        tracing::debug!(position, tries = info.tries, %reason, "retrying frame");
                        queue.push_front((info.slot, info.tries));
                        continue;
                    }
                    tracing::warn!(
                        position,
                        source = %self.source.describe(position),
                        %reason,
                        "frame failed to load; slot left empty"
                    );
                }

                if cancel.is_cancelled() {
                    return Err(ReelError::Cancelled);
                }
                completed += 1;
                on_progress(completed as f64 / total as f64 * 100.0);
            }
        }

        let store = FrameStore::from_slots(slots)?;
        tracing::info!(
            resolved = store.resolved(),
            missing = store.missing(),
            "frame sequence loaded"
        );
        Ok(store)
    }

    fn spawn_attempt(
        &self,
        attempt: u64,
        slot: usize,
        tx: mpsc::Sender<AttemptMsg>,
    ) -> ReelResult<()> {
        let source = Arc::clone(&self.source);
        let position = slot as u32 + 1;
        std::thread::Builder::new()
            .name(format!("scrollreel-load-{position:03}"))
            .spawn(move || {
                let result = source
                    .fetch(position)
                    .and_then(|bytes| decode_frame(position, &bytes));
                // The loader may have returned already; a closed channel is fine.
                let _ = tx.send(AttemptMsg { attempt, result });
            })
            .map_err(|e| ReelError::load(format!("failed to spawn loader thread: {e}")))?;
        Ok(())
    }
}

fn next_wait(in_flight: &HashMap<u64, InFlight>) -> Duration {
    let now = Instant::now();
    in_flight
        .values()
        .filter_map(|f| f.deadline)
        .map(|d| d.saturating_duration_since(now))
        .min()
        .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
