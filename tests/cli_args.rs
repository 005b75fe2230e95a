// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;

use filterchain::cli::{CliArgs, usage_exit_code};
use filterchain::job_from_args;

fn parse(args: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("filterchain").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn destination_type_and_file_are_required() {
    assert!(CliArgs::try_parse_from(["filterchain", "in.pdf"]).is_err());
    assert!(CliArgs::try_parse_from(["filterchain", "-m", "application/pdf"]).is_err());
}

#[test]
fn options_accumulate_and_copies_are_folded_in() {
    let args = parse(&[
        "-m",
        "application/postscript",
        "-o",
        "media=a4 sides=one-sided",
        "-o",
        "title=\"annual report\"",
        "-n",
        "3",
        "docs/in.pdf",
    ]);

    let job = job_from_args(&args);

    assert_eq!(job.input, PathBuf::from("docs/in.pdf"));
    assert_eq!(job.title, "in.pdf");
    assert_eq!(job.options.get("media"), Some("a4"));
    assert_eq!(job.options.get("sides"), Some("one-sided"));
    assert_eq!(job.options.get("title"), Some("annual report"));
    assert_eq!(job.options.copies(), Some("3"));
    assert!(job.ppd.is_none());
    assert!(!job.user.is_empty());
}

#[test]
fn copies_flag_overrides_copies_option() {
    let args = parse(&["-m", "a/b", "-o", "copies=9", "-n", "2", "x"]);
    assert_eq!(job_from_args(&args).options.copies(), Some("2"));
}

#[test]
fn title_and_ppd_flags() {
    let args = parse(&[
        "--mime-type",
        "application/pdf",
        "--title",
        "My Doc",
        "--ppd",
        "/etc/cups/ppd/office.ppd",
        "--dry-run",
        "in.txt",
    ]);

    assert!(args.dry_run);
    let job = job_from_args(&args);
    assert_eq!(job.title, "My Doc");
    assert_eq!(job.ppd, Some(PathBuf::from("/etc/cups/ppd/office.ppd")));
}

#[test]
fn usage_errors_exit_1_and_help_exits_0() {
    let missing = CliArgs::try_parse_from(["filterchain", "in.pdf"]).unwrap_err();
    assert_eq!(usage_exit_code(&missing), 1);

    let unknown = CliArgs::try_parse_from(["filterchain", "--bogus", "-m", "a/b", "x"]).unwrap_err();
    assert_eq!(usage_exit_code(&unknown), 1);

    let help = CliArgs::try_parse_from(["filterchain", "--help"]).unwrap_err();
    assert_eq!(usage_exit_code(&help), 0);

    let version = CliArgs::try_parse_from(["filterchain", "--version"]).unwrap_err();
    assert_eq!(usage_exit_code(&version), 0);
}
