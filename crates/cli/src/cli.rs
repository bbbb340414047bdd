//! Command-line arguments for `rhino`.
//!
//! Only parsing lives here; the subcommands are carried out in
//! [`crate::commands`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rhino_core::job::DEFAULT_PARALLELISM;

/// Run MPI functions locally in a container or as jobs on a cluster.
#[derive(Parser, Debug)]
#[command(name = "rhino")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an MPI function image in a local container.
    ///
    /// Pulls the image when it is not present, streams the program's
    /// output and exits non-zero when the program fails.
    DockerRun(DockerRunArgs),

    /// Submit an MPI function image as a RhinoJob on the cluster.
    ///
    /// Returns as soon as the job is accepted.
    Run(RunArgs),

    /// List RhinoJobs in a namespace.
    List(ClusterArgs),

    /// Delete a RhinoJob.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct DockerRunArgs {
    /// Image reference, e.g. `foo/matmul:v2.1`.
    pub image: String,

    /// Number of MPI processes.
    #[arg(
        long = "np",
        default_value_t = DEFAULT_PARALLELISM,
        allow_negative_numbers = true
    )]
    pub parallelism: i64,

    /// Mount a host directory, as `host_path:container_path`.
    #[arg(short = 'v', long = "volume", value_name = "HOST:CONTAINER")]
    pub volume: Option<String>,

    /// Arguments passed to the MPI program.
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image reference, e.g. `foo/matmul:v2.1`.
    pub image: String,

    /// Number of MPI processes.
    #[arg(
        long = "np",
        default_value_t = DEFAULT_PARALLELISM,
        allow_negative_numbers = true
    )]
    pub parallelism: i64,

    /// Seconds to keep the job after it finishes.
    ///
    /// Defaults to `RHINO_DEFAULT_TTL_SECS`, or 600.
    #[arg(short = 't', long = "ttl", allow_negative_numbers = true)]
    pub ttl_secs: Option<i64>,

    /// Address of the data server shared with every process.
    #[arg(long, requires = "dir")]
    pub server: Option<String>,

    /// Directory on the data server.
    #[arg(long, requires = "server")]
    pub dir: Option<String>,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Arguments passed to the MPI program.
    #[arg(last = true)]
    pub args: Vec<String>,
}

/// Where to find the cluster and which namespace to use.
#[derive(Args, Debug, Default)]
pub struct ClusterArgs {
    /// Namespace. Defaults to the kubeconfig's current context.
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Path to the kubeconfig file.
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name of the RhinoJob.
    pub name: String,

    #[command(flatten)]
    pub cluster: ClusterArgs,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
