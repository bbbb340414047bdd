//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{bail, Context};

use rhino_cluster::{
    delete_job, list_jobs, load_kubeconfig, namespace_for, render_table, ClusterJobSubmitter,
    KubeJobApi,
};
use rhino_core::{DataSource, JobRequest, VolumeBinding};
use rhino_docker::{BollardEngine, LocalBackend};

use crate::cli::{ClusterArgs, Command, DeleteArgs, DockerRunArgs, RunArgs};
use crate::config::CliConfig;

/// Printed by `rhino list` when the namespace holds no jobs.
pub const NO_JOBS_WARNING: &str = "Warning: no RhinoJobs found in the namespace";

pub async fn dispatch(command: Command, config: &CliConfig) -> anyhow::Result<()> {
    match command {
        Command::DockerRun(args) => docker_run(args).await,
        Command::Run(args) => run(args, config).await,
        Command::List(args) => list(args, config).await,
        Command::Delete(args) => delete(args, config).await,
    }
}

/// Build the local request from `docker-run` arguments.
pub fn docker_request(args: DockerRunArgs) -> anyhow::Result<JobRequest> {
    let volume = match args.volume.as_deref() {
        Some(spec) => VolumeBinding::parse(spec)?,
        None => None,
    };

    Ok(JobRequest::new(args.image)
        .with_parallelism(args.parallelism)
        .with_volume(volume)
        .with_args(args.args))
}

/// Build the cluster request from `run` arguments.
pub fn cluster_request(args: RunArgs, config: &CliConfig) -> anyhow::Result<JobRequest> {
    let data_source = DataSource::from_pair(args.server, args.dir)?;

    Ok(JobRequest::new(args.image)
        .with_parallelism(args.parallelism)
        .with_ttl_secs(args.ttl_secs.unwrap_or(config.default_ttl_secs))
        .with_namespace(args.cluster.namespace)
        .with_data_source(data_source)
        .with_args(args.args))
}

async fn docker_run(args: DockerRunArgs) -> anyhow::Result<()> {
    let request = docker_request(args)?;
    request.validate()?;

    let backend = LocalBackend::new(BollardEngine::connect().await?);
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    let result = backend.run(&request, &mut stdout, &mut stderr).await?;

    if let Some(failure) = &result.failure {
        bail!(
            "{} finished with status {} (exit code {}): {failure}",
            request.job_name(),
            result.status(),
            result.exit_code
        );
    }
    Ok(())
}

async fn run(args: RunArgs, config: &CliConfig) -> anyhow::Result<()> {
    let kubeconfig = args.cluster.kubeconfig.clone();
    let request = cluster_request(args, config)?;
    request.validate()?;

    let (api, namespace) = connect(config, kubeconfig, request.namespace.as_deref()).await?;
    let handle = ClusterJobSubmitter::new(&api)
        .launch(&request, &namespace)
        .await?;

    println!("RhinoJob {} created", handle.id());
    Ok(())
}

async fn list(args: ClusterArgs, config: &CliConfig) -> anyhow::Result<()> {
    let (api, namespace) = connect(config, args.kubeconfig, args.namespace.as_deref()).await?;
    let jobs = list_jobs(&api, &namespace).await?;

    if jobs.is_empty() {
        println!("{NO_JOBS_WARNING}");
    } else {
        print!("{}", render_table(&jobs));
    }
    Ok(())
}

async fn delete(args: DeleteArgs, config: &CliConfig) -> anyhow::Result<()> {
    let DeleteArgs { name, cluster } = args;
    let (api, namespace) =
        connect(config, cluster.kubeconfig, cluster.namespace.as_deref()).await?;

    delete_job(&api, &namespace, &name).await?;
    println!("RhinoJob {name} deleted");
    Ok(())
}

/// Load the kubeconfig, settle the namespace and open a client.
async fn connect(
    config: &CliConfig,
    kubeconfig_flag: Option<PathBuf>,
    namespace: Option<&str>,
) -> anyhow::Result<(KubeJobApi, String)> {
    let path = config.kubeconfig_path(kubeconfig_flag)?;
    let kubeconfig = load_kubeconfig(&path)?;
    let namespace = namespace_for(namespace, &kubeconfig)?;

    tracing::debug!(kubeconfig = %path.display(), namespace = %namespace, "Using cluster");

    let api = KubeJobApi::connect(kubeconfig)
        .await
        .with_context(|| format!("connecting with {}", path.display()))?;
    Ok((api, namespace))
}
