use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::booking::IntervalBookingScheduler;
use crate::error::{Error, Result};
use crate::jobs::PriorityJobScheduler;
use crate::model::*;

// ── Job worker channel ───────────────────────────────────

enum JobCommand {
    Submit {
        payload: JobPayload,
        priority: PriorityClass,
        response: oneshot::Sender<Result<ScheduledJob>>,
    },
    ServeNext {
        response: oneshot::Sender<Result<ScheduledJob>>,
    },
    PeekNext {
        response: oneshot::Sender<Result<ScheduledJob>>,
    },
    ListAll {
        response: oneshot::Sender<Vec<ScheduledJob>>,
    },
    Search {
        term: String,
        response: oneshot::Sender<Vec<ScheduledJob>>,
    },
    Stats {
        response: oneshot::Sender<JobQueueStats>,
    },
    Clear {
        response: oneshot::Sender<()>,
    },
}

/// Point-in-time view of a job queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobQueueStats {
    pub size: usize,
    pub capacity: usize,
    pub is_empty: bool,
    pub is_full: bool,
    pub counts: PriorityCount,
}

impl JobQueueStats {
    fn of(s: &PriorityJobScheduler) -> Self {
        Self {
            size: s.len(),
            capacity: s.capacity(),
            is_empty: s.is_empty(),
            is_full: s.is_full(),
            counts: s.priority_counts(),
        }
    }
}

/// Task that owns the job scheduler. Commands are applied strictly in
/// arrival order; the loop ends when every handle is dropped.
async fn job_worker_loop(mut scheduler: PriorityJobScheduler, mut rx: mpsc::Receiver<JobCommand>) {
    debug!(capacity = scheduler.capacity(), "job worker started");
    while let Some(cmd) = rx.recv().await {
        // A dropped receiver only means the caller stopped waiting.
        match cmd {
            JobCommand::Submit {
                payload,
                priority,
                response,
            } => {
                let _ = response.send(scheduler.submit(payload, priority));
            }
            JobCommand::ServeNext { response } => {
                let _ = response.send(scheduler.serve_next());
            }
            JobCommand::PeekNext { response } => {
                let _ = response.send(scheduler.peek_next().cloned());
            }
            JobCommand::ListAll { response } => {
                let _ = response.send(scheduler.list_all().to_vec());
            }
            JobCommand::Search { term, response } => {
                let found = scheduler.search_by_name(&term).into_iter().cloned().collect();
                let _ = response.send(found);
            }
            JobCommand::Stats { response } => {
                let _ = response.send(JobQueueStats::of(&scheduler));
            }
            JobCommand::Clear { response } => {
                scheduler.clear();
                let _ = response.send(());
            }
        }
    }
    debug!(remaining = scheduler.len(), "job worker stopped");
}

/// Cloneable handle to a job worker.
#[derive(Debug, Clone)]
pub struct JobHandle {
    tx: mpsc::Sender<JobCommand>,
}

pub fn spawn_job_worker(
    scheduler: PriorityJobScheduler,
    channel_depth: usize,
) -> (JobHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(channel_depth.max(1));
    let task = tokio::spawn(job_worker_loop(scheduler, rx));
    (JobHandle { tx }, task)
}

impl JobHandle {
    async fn call<T>(&self, cmd: impl FnOnce(oneshot::Sender<T>) -> JobCommand) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(cmd(tx)).await.map_err(|_| Error::WorkerGone)?;
        rx.await.map_err(|_| Error::WorkerGone)
    }

    pub async fn submit(&self, payload: JobPayload, priority: PriorityClass) -> Result<ScheduledJob> {
        self.call(|response| JobCommand::Submit {
            payload,
            priority,
            response,
        })
        .await?
    }

    pub async fn serve_next(&self) -> Result<ScheduledJob> {
        self.call(|response| JobCommand::ServeNext { response }).await?
    }

    pub async fn peek_next(&self) -> Result<ScheduledJob> {
        self.call(|response| JobCommand::PeekNext { response }).await?
    }

    pub async fn list_all(&self) -> Result<Vec<ScheduledJob>> {
        self.call(|response| JobCommand::ListAll { response }).await
    }

    pub async fn search_by_name(&self, term: impl Into<String>) -> Result<Vec<ScheduledJob>> {
        let term = term.into();
        self.call(|response| JobCommand::Search { term, response }).await
    }

    pub async fn stats(&self) -> Result<JobQueueStats> {
        self.call(|response| JobCommand::Stats { response }).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.call(|response| JobCommand::Clear { response }).await
    }
}

// ── Booking worker channel ───────────────────────────────

/// Room, date and half-open time range of a booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub room: String,
    pub date: Date,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

enum BookingCommand {
    Add {
        slot: Slot,
        owner: Option<String>,
        response: oneshot::Sender<Result<Booking>>,
    },
    Cancel {
        id: BookingId,
        response: oneshot::Sender<Result<Booking>>,
    },
    IsAvailable {
        slot: Slot,
        response: oneshot::Sender<Result<bool>>,
    },
    ListChronological {
        response: oneshot::Sender<Vec<Booking>>,
    },
    FindExact {
        slot: Slot,
        response: oneshot::Sender<Result<Booking>>,
    },
}

async fn booking_worker_loop(
    mut scheduler: IntervalBookingScheduler,
    mut rx: mpsc::Receiver<BookingCommand>,
) {
    debug!(bookings = scheduler.len(), "booking worker started");
    while let Some(cmd) = rx.recv().await {
        match cmd {
            BookingCommand::Add {
                slot,
                owner,
                response,
            } => {
                let r = scheduler.add(slot.room, slot.date, slot.start, slot.end, owner);
                let _ = response.send(r);
            }
            BookingCommand::Cancel { id, response } => {
                let _ = response.send(scheduler.cancel(id));
            }
            BookingCommand::IsAvailable { slot, response } => {
                let r = scheduler.is_available(&slot.room, slot.date, slot.start, slot.end);
                let _ = response.send(r);
            }
            BookingCommand::ListChronological { response } => {
                let _ = response.send(scheduler.list_chronological());
            }
            BookingCommand::FindExact { slot, response } => {
                let r = scheduler
                    .find_exact(&slot.room, slot.date, slot.start, slot.end)
                    .cloned();
                let _ = response.send(r);
            }
        }
    }
    debug!(bookings = scheduler.len(), "booking worker stopped");
}

/// Cloneable handle to a booking worker.
#[derive(Debug, Clone)]
pub struct BookingHandle {
    tx: mpsc::Sender<BookingCommand>,
}

pub fn spawn_booking_worker(
    scheduler: IntervalBookingScheduler,
    channel_depth: usize,
) -> (BookingHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(channel_depth.max(1));
    let task = tokio::spawn(booking_worker_loop(scheduler, rx));
    (BookingHandle { tx }, task)
}

impl BookingHandle {
    async fn call<T>(&self, cmd: impl FnOnce(oneshot::Sender<T>) -> BookingCommand) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(cmd(tx)).await.map_err(|_| Error::WorkerGone)?;
        rx.await.map_err(|_| Error::WorkerGone)
    }

    pub async fn add(&self, slot: Slot, owner: Option<String>) -> Result<Booking> {
        self.call(|response| BookingCommand::Add {
            slot,
            owner,
            response,
        })
        .await?
    }

    pub async fn cancel(&self, id: BookingId) -> Result<Booking> {
        self.call(|response| BookingCommand::Cancel { id, response }).await?
    }

    pub async fn is_available(&self, slot: Slot) -> Result<bool> {
        self.call(|response| BookingCommand::IsAvailable { slot, response })
            .await?
    }

    pub async fn list_chronological(&self) -> Result<Vec<Booking>> {
        self.call(|response| BookingCommand::ListChronological { response })
            .await
    }

    pub async fn find_exact(&self, slot: Slot) -> Result<Booking> {
        self.call(|response| BookingCommand::FindExact { slot, response })
            .await?
    }
}
