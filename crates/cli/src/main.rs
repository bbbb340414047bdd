//! `rhino` -- run MPI functions in a local container or on a cluster.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default                          | Description                    |
//! |--------------------------|----------|----------------------------------|--------------------------------|
//! | `RHINO_KUBECONFIG`       | no       | `KUBECONFIG`, `~/.kube/config`   | Cluster configuration          |
//! | `RHINO_DEFAULT_TTL_SECS` | no       | `600`                            | Default `--ttl` for `run`      |
//! | `RUST_LOG`               | no       | `rhino=info,...`                 | Log filter (logs go to stderr) |

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rhino_cli::cli::Cli;
use rhino_cli::config::CliConfig;
use rhino_cli::{commands, exit_codes};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rhino=info,rhino_docker=info,rhino_cluster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();

    let outcome = match CliConfig::from_env() {
        Ok(config) => commands::dispatch(cli.command, &config).await,
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_codes::FAILURE)
        }
    }
}
