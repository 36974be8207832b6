use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use tabprep_ingest::{read_table, write_table};
use tabprep_merge::{asof_merge_tables, merge_with_report};
use tabprep_model::{AsOfSpec, MergeReport, MergeSpec, Table};

use crate::cli::{AsOfArgs, MergeArgs, RunArgs};
use crate::config::{Job, JobConfig};

/// What a finished command wrote.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub output: PathBuf,
    pub report: MergeReport,
    pub report_path: Option<PathBuf>,
}

pub fn run_merge(args: &MergeArgs) -> Result<MergeOutcome> {
    execute_merge(&args.spec(), &args.inputs, &args.output, args.report.as_deref())
}

pub fn run_asof(args: &AsOfArgs) -> Result<MergeOutcome> {
    let inputs = [args.left.clone(), args.right.clone()];
    execute_asof(&args.spec(), &inputs, &args.output, args.report.as_deref())
}

pub fn run_job(args: &RunArgs) -> Result<MergeOutcome> {
    let config = JobConfig::load(&args.job)?;
    let span = info_span!("job", path = %args.job.display());
    let _guard = span.enter();
    match config.job(&args.job)? {
        Job::Merge(spec) => execute_merge(
            spec,
            &config.inputs,
            &config.output,
            config.report.as_deref(),
        ),
        Job::AsOf(spec) => execute_asof(
            spec,
            &config.inputs,
            &config.output,
            config.report.as_deref(),
        ),
    }
}

fn execute_merge(
    spec: &MergeSpec,
    inputs: &[PathBuf],
    output: &Path,
    report_path: Option<&Path>,
) -> Result<MergeOutcome> {
    let tables = load_tables(inputs)?;
    let (merged, report) = merge_with_report(spec, &tables).context("merge tables")?;
    finish(&merged, report, output, report_path)
}

fn execute_asof(
    spec: &AsOfSpec,
    inputs: &[PathBuf],
    output: &Path,
    report_path: Option<&Path>,
) -> Result<MergeOutcome> {
    if inputs.len() != 2 {
        bail!(
            "an as-of merge takes exactly two inputs (left, right), got {}",
            inputs.len()
        );
    }
    let tables = load_tables(inputs)?;
    let (merged, report) = asof_merge_tables(spec, &tables).context("as-of merge tables")?;
    finish(&merged, report, output, report_path)
}

fn load_tables(paths: &[PathBuf]) -> Result<Vec<Table>> {
    paths
        .iter()
        .map(|path| read_table(path).with_context(|| format!("load {}", path.display())))
        .collect()
}

fn finish(
    merged: &Table,
    report: MergeReport,
    output: &Path,
    report_path: Option<&Path>,
) -> Result<MergeOutcome> {
    write_table(output, merged).with_context(|| format!("write {}", output.display()))?;
    if let Some(path) = report_path {
        write_report(path, &report)?;
    }
    info!(
        output = %output.display(),
        strategy = report.strategy.as_str(),
        rows = report.output.rows,
        "merge written"
    );
    Ok(MergeOutcome {
        output: output.to_path_buf(),
        report,
        report_path: report_path.map(Path::to_path_buf),
    })
}

fn write_report(path: &Path, report: &MergeReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize merge report")?;
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))
}
