use super::*;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn run(stdout: &[&str], stderr: &[&str]) -> CapturedRun {
    CapturedRun::from_lines(stdout.iter().copied(), stderr.iter().copied())
}

#[test]
fn test_compare_identical() {
    let reference = run(&["#1 CLASS", "#1 TYPEID Main"], &["warning"]);
    let result = compare_runs(&reference, &reference.clone());
    assert!(result.is_match());
    assert_eq!(result.matched, 3);
}

#[test]
fn test_compare_empty_runs() {
    let result = compare_runs(&CapturedRun::default(), &CapturedRun::default());
    assert!(result.is_match());
    assert_eq!(result.matched, 0);
}

#[test]
fn test_first_divergence_index() {
    // Shared prefix of length k diverging at k+1, with differences after too.
    for k in 0..5 {
        let mut reference: Vec<String> = (0..8).map(|i| format!("line {i}")).collect();
        let mut candidate = reference.clone();
        candidate[k] = "different".to_string();
        candidate[7] = "also different".to_string();
        reference.push("extra".to_string());

        let (matched, divergence) = compare_stream(StreamKind::Stdout, &reference, &candidate);
        assert_eq!(matched, k);
        match divergence {
            Some(Divergence::Line {
                stream,
                index,
                reference: r,
                candidate: c,
            }) => {
                assert_eq!(stream, StreamKind::Stdout);
                assert_eq!(index, k + 1);
                assert_eq!(r, format!("line {k}"));
                assert_eq!(c, "different");
            }
            other => panic!("expected line divergence, got {other:?}"),
        }
    }
}

#[test]
fn test_trailing_length_mismatch() {
    let reference = lines(&["a", "b"]);
    let candidate = lines(&["a", "b", "c", "d"]);
    let (matched, divergence) = compare_stream(StreamKind::Stdout, &reference, &candidate);
    assert_eq!(matched, 2);
    assert_eq!(
        divergence,
        Some(Divergence::Length {
            stream: StreamKind::Stdout,
            reference: 2,
            candidate: 4,
        })
    );
}

#[test]
fn test_shorter_candidate_is_length_mismatch() {
    let (_, divergence) = compare_stream(StreamKind::Stderr, &lines(&["a", "b"]), &lines(&[]));
    assert_eq!(
        divergence,
        Some(Divergence::Length {
            stream: StreamKind::Stderr,
            reference: 2,
            candidate: 0,
        })
    );
}

#[test]
fn test_content_reported_before_length() {
    let (_, divergence) = compare_stream(
        StreamKind::Stdout,
        &lines(&["a", "x"]),
        &lines(&["a", "y", "z"]),
    );
    assert!(matches!(divergence, Some(Divergence::Line { index: 2, .. })));
}

#[test]
fn test_stderr_only_checked_after_stdout_matches() {
    let reference = run(&["same", "same"], &["e1", "e2", "e3"]);
    let candidate = run(&["same", "same"], &["e1", "E2", "e3"]);
    let result = compare_runs(&reference, &candidate);
    assert_eq!(result.matched, 3);
    let divergence = result.divergence.unwrap();
    assert_eq!(divergence.stream(), StreamKind::Stderr);
    assert_eq!(divergence.kind(), "stderr-mismatch");
    assert!(matches!(divergence, Divergence::Line { index: 2, .. }));
}

#[test]
fn test_stdout_divergence_masks_stderr() {
    let reference = run(&["a"], &["only in reference"]);
    let candidate = run(&["b"], &[]);
    let divergence = compare_runs(&reference, &candidate).divergence.unwrap();
    assert_eq!(divergence.stream(), StreamKind::Stdout);
    assert_eq!(divergence.kind(), "stdout-mismatch");
}

#[test]
fn test_stdout_length_masks_stderr() {
    let reference = run(&["a"], &["x"]);
    let candidate = run(&["a", "b"], &["y"]);
    let divergence = compare_runs(&reference, &candidate).divergence.unwrap();
    assert_eq!(divergence.kind(), "stdout-length");
}

#[test]
fn test_normalized_line_numbers_match() {
    let reference = run(&[], &["\"a.cl\", line #8: syntax error"]).normalized();
    let candidate = run(&[], &["\"a.cl\", line #7: syntax error"]).normalized();
    assert!(compare_runs(&reference, &candidate).is_match());
}

#[test]
fn test_raw_line_numbers_differ() {
    let reference = run(&[], &["line #8"]);
    let candidate = run(&[], &["line #7"]);
    assert!(!compare_runs(&reference, &candidate).is_match());
}

#[test]
fn test_extra_trailing_diagnostic() {
    let reference = run(&["#1 program"], &["err a", "err b"]).normalized();
    let candidate = run(&["#1 program"], &["err a", "err b", "Compilation halted"]).normalized();
    assert_eq!(
        compare_runs(&reference, &candidate).divergence,
        Some(Divergence::Length {
            stream: StreamKind::Stderr,
            reference: 2,
            candidate: 3,
        })
    );
}

#[test]
fn test_case_and_whitespace_are_significant() {
    let reference = run(&["CLASS  Main"], &[]);
    assert!(!compare_runs(&reference, &run(&["class  Main"], &[])).is_match());
    assert!(!compare_runs(&reference, &run(&["CLASS Main"], &[])).is_match());
}

#[test]
fn test_divergence_display() {
    let line = Divergence::Line {
        stream: StreamKind::Stdout,
        index: 4,
        reference: "a".into(),
        candidate: "b".into(),
    };
    assert_eq!(line.to_string(), "mismatch in stdout at line 4");

    let length = Divergence::Length {
        stream: StreamKind::Stderr,
        reference: 1,
        candidate: 2,
    };
    assert_eq!(
        length.to_string(),
        "stderr length mismatch: reference has 1 lines, candidate has 2"
    );
}
