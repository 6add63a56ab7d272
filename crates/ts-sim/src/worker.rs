//! Background simulation for interactive frontends.
//!
//! Each submission runs on its own thread and reports over a channel. A newer
//! submission supersedes every older one: superseded runs stop at their next
//! stage boundary and nothing they produce is delivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ts_graph::EditCommand;

use crate::progress::SimProgressEvent;
use crate::simulator::{Baseline, Comparison, Simulator};

#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Progress(SimProgressEvent),
    Complete {
        generation: u64,
        comparison: Box<Comparison>,
    },
    Error {
        generation: u64,
        message: String,
    },
}

impl WorkerMessage {
    pub fn generation(&self) -> u64 {
        match self {
            WorkerMessage::Progress(event) => event.generation,
            WorkerMessage::Complete { generation, .. } | WorkerMessage::Error { generation, .. } => {
                *generation
            }
        }
    }

    fn is_final(&self) -> bool {
        !matches!(self, WorkerMessage::Progress(_))
    }
}

pub struct SimulationWorker {
    simulator: Arc<Simulator>,
    baseline: Arc<Baseline>,
    generation: Arc<AtomicU64>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    handles: Vec<JoinHandle<()>>,
}

impl SimulationWorker {
    pub fn new(simulator: Simulator, baseline: Baseline) -> Self {
        let (tx, rx) = channel();
        Self {
            simulator: Arc::new(simulator),
            baseline: Arc::new(baseline),
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
            handles: Vec::new(),
        }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Generation of the most recent submission (0 before the first).
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start simulating `edit`, superseding anything still running.
    /// Returns the generation assigned to this run.
    pub fn submit(&mut self, edit: EditCommand) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.handles.retain(|h| !h.is_finished());

        let simulator = Arc::clone(&self.simulator);
        let baseline = Arc::clone(&self.baseline);
        let latest = Arc::clone(&self.generation);
        let tx = self.tx.clone();

        let handle = thread::spawn(move || {
            let started = Instant::now();
            let current = || latest.load(Ordering::SeqCst) == generation;

            let result = simulator.simulate_observed(&baseline, &edit, &mut |stage| {
                if !current() {
                    tracing::debug!(generation, %stage, "superseded");
                    return false;
                }
                let elapsed = started.elapsed().as_secs_f64();
                let _ = tx.send(WorkerMessage::Progress(SimProgressEvent::stage(
                    generation, stage, elapsed,
                )));
                true
            });

            if !current() {
                return;
            }
            let message = match result {
                Ok(Some(comparison)) => WorkerMessage::Complete {
                    generation,
                    comparison: Box::new(comparison),
                },
                Ok(None) => return,
                Err(e) => WorkerMessage::Error {
                    generation,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(message);
        });
        self.handles.push(handle);
        generation
    }

    /// Supersede whatever is running without starting anything new.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Next message for the latest generation, if one is waiting.
    /// Messages from superseded runs are discarded.
    pub fn try_recv(&self) -> Option<WorkerMessage> {
        while let Ok(message) = self.rx.try_recv() {
            if message.generation() == self.latest_generation() {
                return Some(message);
            }
        }
        None
    }

    /// Block until the latest run completes or fails, or `timeout` passes.
    pub fn wait_latest(&self, timeout: Duration) -> Option<WorkerMessage> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(message)
                    if message.is_final() && message.generation() == self.latest_generation() =>
                {
                    return Some(message);
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}
