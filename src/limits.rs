/// Upper bound on a job scheduler's capacity, whatever the configuration asks for.
pub const MAX_JOB_CAPACITY: usize = 100_000;

/// Default job queue capacity.
pub const DEFAULT_JOB_CAPACITY: usize = 100;

pub const MAX_PAYLOAD_NAME_LEN: usize = 255;
pub const MAX_ROOM_LEN: usize = 64;
pub const MAX_OWNER_LEN: usize = 128;

/// Longest request line the driver will parse.
pub const MAX_REQUEST_LINE_LEN: usize = 64 * 1024;
