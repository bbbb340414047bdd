//! Domain types shared by the RHINO execution backends.
//!
//! Holds the job request and its validation, execution handles and
//! results, and the error taxonomy. Has no backend dependencies.

pub mod error;
pub mod execution;
pub mod job;

pub use error::{RhinoError, RhinoResult};
pub use execution::{Backend, ExecutionHandle, ExecutionResult, FailureReason, JobStatus};
pub use job::{DataSource, JobRequest, VolumeBinding};
