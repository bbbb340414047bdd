//! Process exit codes for `rhino`.

/// The command succeeded (for `docker-run`: the job completed).
pub const SUCCESS: u8 = 0;

/// Any error, including a local job that finished `Failed`.
pub const FAILURE: u8 = 1;
