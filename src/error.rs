use crate::model::{BookingId, TimeOfDay};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Index outside `[0, len)`.
    Bounds { index: usize, len: usize },
    CapacityExceeded(usize),
    EmptyStructure,
    NotFound(String),
    InvalidInterval { start: TimeOfDay, end: TimeOfDay },
    /// Rejected because it overlaps the booking with this id.
    Conflict(BookingId),
    LimitExceeded(&'static str),
    WorkerGone,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Bounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Error::CapacityExceeded(cap) => write!(f, "capacity {cap} exceeded"),
            Error::EmptyStructure => write!(f, "structure is empty"),
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::InvalidInterval { start, end } => {
                write!(f, "invalid interval [{start}, {end}): start must be before end")
            }
            Error::Conflict(id) => write!(f, "conflict with booking: #{id}"),
            Error::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            Error::WorkerGone => write!(f, "worker shut down"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
