
use std::cmp::Ordering;

use tracing::{debug, info};

use crate::collections::MaxHeap;
use crate::error::{Error, Result};
use crate::limits::*;
use crate::model::*;
use crate::observability::{JOBS_QUEUED, JOBS_REJECTED_TOTAL, JOBS_SERVED_TOTAL, JOBS_SUBMITTED_TOTAL};

/// Serving order: higher priority class first, then earlier submission.
///
/// Jobs stamped in the same millisecond fall back to id order, which is
/// submission order because ids are issued sequentially.
pub fn job_order(a: &ScheduledJob, b: &ScheduledJob) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| b.submitted_at.cmp(&a.submitted_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Bounded priority queue of print-style jobs.
#[derive(Debug)]
pub struct PriorityJobScheduler {
    heap: MaxHeap<ScheduledJob>,
    capacity: usize,
    next_id: JobId,
}

impl Default for PriorityJobScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_CAPACITY)
    }
}

impl PriorityJobScheduler {
    /// `capacity` is clamped to [`MAX_JOB_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: MaxHeap::new(job_order as fn(&ScheduledJob, &ScheduledJob) -> Ordering),
            capacity: capacity.min(MAX_JOB_CAPACITY),
            next_id: 1,
        }
    }

    pub fn submit(&mut self, payload: JobPayload, priority: PriorityClass) -> Result<ScheduledJob> {
        self.submit_at(payload, priority, now_ms())
    }

    /// Submit with an explicit submission timestamp.
    pub fn submit_at(
        &mut self,
        payload: JobPayload,
        priority: PriorityClass,
        now: Ms,
    ) -> Result<ScheduledJob> {
        if payload.name.len() > MAX_PAYLOAD_NAME_LEN {
            return Err(Error::LimitExceeded("job name too long"));
        }
        if self.is_full() {
            metrics::counter!(JOBS_REJECTED_TOTAL).increment(1);
            debug!(capacity = self.capacity, "job queue full, rejecting {}", payload.name);
            return Err(Error::CapacityExceeded(self.capacity));
        }

        let job = ScheduledJob {
            id: self.next_id,
            payload,
            priority,
            submitted_at: now,
            served_at: None,
        };
        self.next_id += 1;
        self.heap.insert(job.clone());

        info!(job_id = job.id, %priority, "job submitted: {}", job.payload.name);
        metrics::counter!(JOBS_SUBMITTED_TOTAL, "priority" => priority.to_string()).increment(1);
        metrics::gauge!(JOBS_QUEUED).set(self.heap.len() as f64);
        Ok(job)
    }

    pub fn serve_next(&mut self) -> Result<ScheduledJob> {
        self.serve_next_at(now_ms())
    }

    /// Remove the highest-priority job, stamping it as served at `now`.
    pub fn serve_next_at(&mut self, now: Ms) -> Result<ScheduledJob> {
        let mut job = self.heap.extract_max()?;
        job.served_at = Some(now);

        info!(
            job_id = job.id,
            priority = %job.priority,
            waited_ms = now.saturating_sub(job.submitted_at),
            "job served: {}",
            job.payload.name
        );
        metrics::counter!(JOBS_SERVED_TOTAL, "priority" => job.priority.to_string()).increment(1);
        metrics::gauge!(JOBS_QUEUED).set(self.heap.len() as f64);
        Ok(job)
    }

    pub fn peek_next(&self) -> Result<&ScheduledJob> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Queued jobs in heap storage order, not serving order.
    pub fn list_all(&self) -> &[ScheduledJob] {
        self.heap.as_slice()
    }

    /// Jobs whose name contains `term`, ignoring case, in storage order.
    /// A blank term matches nothing.
    pub fn search_by_name(&self, term: &str) -> Vec<&ScheduledJob> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }
        self.heap.iter().filter(|job| job.matches_name(term)).collect()
    }

    pub fn priority_counts(&self) -> PriorityCount {
        let mut counts = PriorityCount::default();
        for job in self.heap.iter() {
            match job.priority {
                PriorityClass::High => counts.high += 1,
                PriorityClass::Normal => counts.normal += 1,
                PriorityClass::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Drop every queued job. Job ids keep counting up.
    pub fn clear(&mut self) {
        let dropped = self.heap.len();
        self.heap.clear();
        info!(dropped, "job queue cleared");
        metrics::gauge!(JOBS_QUEUED).set(0.0);
    }
}
