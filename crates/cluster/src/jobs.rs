//! Listing and deletion of previously submitted jobs.

use kube::api::DynamicObject;
use kube::ResourceExt;

use rhino_core::{JobStatus, RhinoError, RhinoResult};

use crate::api::JobApi;

/// Placeholder for a field the job object does not carry (yet).
const MISSING: &str = "-";

/// Spacing between table columns.
const COLUMN_GAP: usize = 2;

/// One row of `rhino list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub name: String,
    pub parallelism: Option<i64>,
    /// Operator-reported status, e.g. `Pending`, `Running`, `Completed`.
    pub status: Option<String>,
}

impl JobSummary {
    pub fn from_object(object: &DynamicObject) -> Self {
        Self {
            name: object.name_any(),
            parallelism: object.data["spec"]["parallelism"].as_i64(),
            status: object.data["status"]["jobStatus"]
                .as_str()
                .map(str::to_string),
        }
    }

    /// Operator status as a known lifecycle state, if it is one.
    pub fn job_status(&self) -> Option<JobStatus> {
        self.status.as_deref().and_then(JobStatus::parse)
    }

    /// Whether the operator reports the job as `Completed` or `Failed`.
    pub fn is_finished(&self) -> bool {
        self.job_status().is_some_and(JobStatus::is_terminal)
    }
}

/// List all jobs in `namespace`.
pub async fn list_jobs<A: JobApi + ?Sized>(
    api: &A,
    namespace: &str,
) -> RhinoResult<Vec<JobSummary>> {
    let objects = api
        .list(namespace)
        .await
        .map_err(|e| RhinoError::backend("job listing", format!("namespace {namespace}: {e}")))?;

    let jobs: Vec<JobSummary> = objects.iter().map(JobSummary::from_object).collect();
    let finished = jobs.iter().filter(|job| job.is_finished()).count();
    tracing::debug!(namespace = %namespace, count = jobs.len(), finished, "Listed RhinoJobs");
    Ok(jobs)
}

/// Delete the job called `name` in `namespace`.
pub async fn delete_job<A: JobApi + ?Sized>(
    api: &A,
    namespace: &str,
    name: &str,
) -> RhinoResult<()> {
    api.delete(namespace, name).await.map_err(|e| {
        RhinoError::backend("job deletion", format!("{namespace}/{name}: {e}"))
    })?;

    tracing::info!(job = %name, namespace = %namespace, "RhinoJob deleted");
    Ok(())
}

/// Render summaries as a left-aligned `Name / Parallelism / Status` table.
pub fn render_table(jobs: &[JobSummary]) -> String {
    let header = ["Name".to_string(), "Parallelism".to_string(), "Status".to_string()];
    let rows: Vec<[String; 3]> = jobs
        .iter()
        .map(|job| {
            [
                job.name.clone(),
                job.parallelism
                    .map_or_else(|| MISSING.to_string(), |p| p.to_string()),
                job.status.clone().unwrap_or_else(|| MISSING.to_string()),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let last = row.len() - 1;
        for (i, cell) in row.iter().enumerate() {
            out.push_str(cell);
            if i < last {
                out.push_str(&" ".repeat(widths[i] - cell.len() + COLUMN_GAP));
            }
        }
        out.push('\n');
    }
    out
}
