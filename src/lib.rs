pub mod booking;
pub mod collections;
pub mod config;
pub mod error;
pub mod jobs;
pub mod limits;
pub mod model;
pub mod observability;
pub mod wire;
pub mod worker;

pub use booking::IntervalBookingScheduler;
pub use error::{Error, Result};
pub use jobs::PriorityJobScheduler;
