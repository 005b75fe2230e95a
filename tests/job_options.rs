// tests/job_options.rs

use filterchain::types::JobOptions;

fn parsed(input: &str) -> Vec<(String, String)> {
    let opts: JobOptions = input.parse().unwrap();
    opts.iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

#[test]
fn parses_simple_pairs_in_order() {
    assert_eq!(
        parsed("media=a4 sides=one-sided"),
        pairs(&[("media", "a4"), ("sides", "one-sided")])
    );
}

#[test]
fn bare_name_means_true() {
    assert_eq!(
        parsed("landscape fit-to-page media=a4"),
        pairs(&[("landscape", "true"), ("fit-to-page", "true"), ("media", "a4")])
    );
}

#[test]
fn quoted_values_keep_whitespace() {
    assert_eq!(
        parsed(r#"job-name="quarterly report" note='it is fine'"#),
        pairs(&[("job-name", "quarterly report"), ("note", "it is fine")])
    );
}

#[test]
fn backslash_takes_next_character_literally() {
    assert_eq!(
        parsed(r"title=a\ b path=c:\\x"),
        pairs(&[("title", "a b"), ("path", r"c:\x")])
    );
}

#[test]
fn later_value_replaces_earlier_case_insensitively() {
    let mut opts = JobOptions::new();
    opts.parse_into("Media=a4 sides=one-sided");
    opts.parse_into("media=letter");

    assert_eq!(opts.len(), 2);
    assert_eq!(opts.get("MEDIA"), Some("letter"));
    let names: Vec<&str> = opts.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Media", "sides"]);
}

#[test]
fn copies_is_exposed_separately() {
    let opts: JobOptions = "Copies=5 media=a4".parse().unwrap();
    assert_eq!(opts.copies(), Some("5"));
}

#[test]
fn empty_and_blank_input_yield_nothing() {
    assert!(parsed("").is_empty());
    assert!(parsed("   \t ").is_empty());
}

#[test]
fn stray_equals_is_ignored() {
    assert_eq!(parsed("=oops media=a4"), pairs(&[("media", "a4")]));
}
