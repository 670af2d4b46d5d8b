use tokio::io::BufReader;
use tracing::info;

use campus_core::booking::IntervalBookingScheduler;
use campus_core::config::Config;
use campus_core::jobs::PriorityJobScheduler;
use campus_core::wire::{self, Handler};
use campus_core::worker::{spawn_booking_worker, spawn_job_worker};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Config::from_env();
    campus_core::observability::init(config.metrics_port)?;

    info!(
        job_capacity = config.job_capacity,
        channel_depth = config.channel_depth,
        metrics_port = ?config.metrics_port,
        "campus-core reading requests from stdin"
    );

    let (jobs, job_task) =
        spawn_job_worker(PriorityJobScheduler::new(config.job_capacity), config.channel_depth);
    let (bookings, booking_task) =
        spawn_booking_worker(IntervalBookingScheduler::new(), config.channel_depth);

    let handler = Handler::new(jobs, bookings);
    let stdin = BufReader::new(tokio::io::stdin());
    wire::serve(stdin, tokio::io::stdout(), &handler).await?;

    // Workers exit once the last handle is gone.
    drop(handler);
    job_task.await?;
    booking_task.await?;

    info!("campus-core stopped");
    Ok(())
}
