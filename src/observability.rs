use std::net::SocketAddr;

use crate::wire::Request;

// ── Request metrics ─────────────────────────────────────────────

/// Counter: total driver requests. Labels: op, status.
pub const REQUESTS_TOTAL: &str = "campus_requests_total";

/// Histogram: request latency in seconds. Labels: op.
pub const REQUEST_DURATION_SECONDS: &str = "campus_request_duration_seconds";

// ── Job scheduler ───────────────────────────────────────────────

/// Counter: jobs accepted. Labels: priority.
pub const JOBS_SUBMITTED_TOTAL: &str = "campus_jobs_submitted_total";

/// Counter: jobs served. Labels: priority.
pub const JOBS_SERVED_TOTAL: &str = "campus_jobs_served_total";

/// Counter: submissions rejected because the queue was full.
pub const JOBS_REJECTED_TOTAL: &str = "campus_jobs_rejected_total";

/// Gauge: jobs currently queued.
pub const JOBS_QUEUED: &str = "campus_jobs_queued";

// ── Booking scheduler ───────────────────────────────────────────

/// Counter: bookings stored.
pub const BOOKINGS_ADDED_TOTAL: &str = "campus_bookings_added_total";

/// Counter: bookings rejected. Labels: reason.
pub const BOOKINGS_REJECTED_TOTAL: &str = "campus_bookings_rejected_total";

/// Counter: bookings cancelled.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "campus_bookings_cancelled_total";

/// Gauge: live bookings.
pub const BOOKINGS_ACTIVE: &str = "campus_bookings_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a Request variant to a short label for metrics.
pub fn request_label(req: &Request) -> &'static str {
    match req {
        Request::SubmitJob { .. } => "submit_job",
        Request::ServeNext => "serve_next",
        Request::PeekNext => "peek_next",
        Request::ListJobs => "list_jobs",
        Request::SearchJobs { .. } => "search_jobs",
        Request::JobStats => "job_stats",
        Request::ClearJobs => "clear_jobs",
        Request::AddBooking { .. } => "add_booking",
        Request::CancelBooking { .. } => "cancel_booking",
        Request::IsAvailable { .. } => "is_available",
        Request::ListBookings => "list_bookings",
        Request::FindBooking { .. } => "find_booking",
    }
}
