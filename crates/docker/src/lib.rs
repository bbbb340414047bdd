//! Local container backend.
//!
//! Runs a parallel job as a single container on the local engine:
//! image resolution, container launch, log streaming and exit-status
//! determination. [`LocalBackend`] ties the steps together;
//! [`BollardEngine`] talks to a Docker daemon.

pub mod backend;
pub mod bollard_engine;
pub mod completion;
pub mod engine;
pub mod image;
pub mod launch;
pub mod logs;

pub use backend::LocalBackend;
pub use bollard_engine::BollardEngine;
pub use engine::{ContainerEngine, EngineError, LogFrame, PullProgress, WaitSignals};
