//! End-to-end tests for the merge commands.

use std::fs;
use std::path::Path;

use clap::Parser;
use tabprep_cli::cli::{Cli, Command};
use tabprep_cli::commands::{run_asof, run_job, run_merge};
use tabprep_model::{MergeError, MergeReport, MergeStrategy};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

fn command(args: &[&str]) -> Command {
    Cli::try_parse_from(args).unwrap().command
}

#[test]
fn test_full_join_from_files() {
    let dir = TempDir::new().unwrap();
    let people = write(dir.path(), "people.csv", "id,name\n1,A\n2,B\n");
    let scores = write(dir.path(), "scores.csv", "id,score\n2,90\n3,70\n");
    let output = dir.path().join("out/merged.csv");
    let report = dir.path().join("out/report.json");
    let output_arg = output.display().to_string();
    let report_arg = report.display().to_string();

    let Command::Merge(args) = command(&[
        "tabprep", "merge", "-i", &people, "-i", &scores, "-o", &output_arg, "--type",
        "horizontal", "--join-type", "full", "--key", "id", "--report", &report_arg,
    ]) else {
        panic!("expected merge command");
    };
    let outcome = run_merge(&args).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "id,name,score\n1,A,\n2,B,90\n3,,70\n"
    );
    assert_eq!(outcome.report.output.rows, 3);

    let written: MergeReport = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(written, outcome.report);
    assert_eq!(written.strategy, MergeStrategy::Keyed);
}

#[test]
fn test_vertical_mismatch_fails_with_structural_error() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "A,B\n1,2\n");
    let b = write(dir.path(), "b.csv", "A,C\n3,4\n");
    let output = dir.path().join("out.csv");
    let output_arg = output.display().to_string();

    let Command::Merge(args) = command(&["tabprep", "merge", "-i", &a, "-i", &b, "-o", &output_arg])
    else {
        panic!("expected merge command");
    };
    let err = run_merge(&args).unwrap_err();

    let merge_error = err.downcast_ref::<MergeError>().unwrap();
    assert_eq!(merge_error.issues().len(), 1);
    assert!(!output.exists());
}

#[test]
fn test_missing_input_names_the_file() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "A\n1\n");
    let missing = dir.path().join("missing.csv").display().to_string();
    let output = dir.path().join("out.csv").display().to_string();

    let Command::Merge(args) = command(&["tabprep", "merge", "-i", &a, "-i", &missing, "-o", &output])
    else {
        panic!("expected merge command");
    };
    let err = run_merge(&args).unwrap_err();
    assert!(format!("{err:#}").contains("missing.csv"));
}

#[test]
fn test_asof_command() {
    let dir = TempDir::new().unwrap();
    let trades = write(
        dir.path(),
        "trades.csv",
        "ts,qty\n2024-03-01 10:00:00,5\n2024-03-01 09:40:00,7\n",
    );
    let quotes = write(
        dir.path(),
        "quotes.csv",
        "time,price\n2024-03-01 09:00:00,100\n2024-03-01 09:30:00,101\n2024-03-01 10:00:00,102\n",
    );
    let output = dir.path().join("asof.csv");
    let output_arg = output.display().to_string();

    let Command::MergeAsof(args) = command(&[
        "tabprep", "merge-asof", "--left", &trades, "--right", &quotes, "-o", &output_arg,
        "--left-time", "ts", "--right-time", "time", "--tolerance", "300",
    ]) else {
        panic!("expected merge-asof command");
    };
    let outcome = run_asof(&args).unwrap();

    assert_eq!(outcome.report.strategy, MergeStrategy::AsOf);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "ts,qty,price\n2024-03-01 10:00:00,5,102\n2024-03-01 09:40:00,7,\n"
    );
}

#[test]
fn test_job_file_with_relative_paths() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", "id,v\n1,x\n");
    write(dir.path(), "b.csv", "id,v\n1,y\n");
    let job = write(
        dir.path(),
        "job.toml",
        r#"
inputs = ["a.csv", "b.csv"]
output = "merged.csv"

[merge]
mode = "horizontal"
keys = [{ left = "id", right = "id" }]
"#,
    );

    let Command::Run(args) = command(&["tabprep", "run", &job]) else {
        panic!("expected run command");
    };
    let outcome = run_job(&args).unwrap();

    assert_eq!(outcome.output, dir.path().join("merged.csv"));
    assert_eq!(
        fs::read_to_string(&outcome.output).unwrap(),
        "id,v,v_2\n1,x,y\n"
    );
}
