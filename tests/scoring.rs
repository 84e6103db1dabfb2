//! End-to-end scoring behaviour through the public library API.

use plagcheck::{
    Comparator, Corpus, Document, RiskTier, ScoreError, Threshold,
    core::{MatcherOptions, Metric, aggregate::round2, aggregate::WEIGHTS},
    score,
};
use proptest::prelude::*;

fn corpus(docs: &[(&str, &str)]) -> Corpus {
    docs.iter()
        .map(|(name, text)| Document::new(*name, *text))
        .collect()
}

const LOOP_A: &str = "for item in inventory:
    if item.count > 10:
        restock(item)
    else:
        discard(item)
";

const LOOP_B: &str = "for row in matrix_rows:
    if len(row) == width_limit:
        print_table(row, sep)
    else:
        raise ValueError(width_limit)
";

#[test]
fn identical_submission_is_flagged_high() {
    let refs = corpus(&[
        ("greeting.py", "print('hello')\n"),
        ("area.py", "def area(w, h):\n    return w * h\n"),
    ]);

    let report = score("def area(w, h):\n    return w * h\n", &refs, 70.0).unwrap();
    let top = report.most_similar();

    assert_eq!(top.file, "area.py");
    assert_eq!(top.score, 100.0);
    assert_eq!(top.risk, RiskTier::High);
    assert!(top.plagiarised);
    for metric in Metric::ALL {
        assert_eq!(top.metrics.get(metric), 100.0, "{metric}");
    }
}

#[test]
fn shared_control_flow_alone_stays_below_threshold() {
    let refs = corpus(&[("loop.py", LOOP_A)]);
    let report = score(LOOP_B, &refs, 70.0).unwrap();
    let only = report.most_similar();

    assert_eq!(only.metrics.control_flow, 100.0);
    assert!(only.metrics.text < 70.0, "text {}", only.metrics.text);
    assert!(only.metrics.token < 50.0, "token {}", only.metrics.token);
    assert!(only.metrics.line < 50.0, "line {}", only.metrics.line);
    assert!(only.score < 70.0);
    assert_eq!(only.risk, RiskTier::Low);
    assert!(!only.plagiarised);
}

#[test]
fn consistent_renaming_keeps_variable_similarity() {
    let original = "def g(m, n):\n    p = m * n\n    return p\n";
    let renamed = "def h(q, r):\n    s = q * r\n    return s\n";

    let report = score(renamed, &corpus(&[("orig.py", original)]), 70.0).unwrap();
    let metrics = report.most_similar().metrics;

    assert_eq!(metrics.variable, 100.0);
    assert!(metrics.token < 100.0);
    assert_eq!(metrics.control_flow, 100.0);
}

#[test]
fn ranking_is_descending_and_stable_on_ties() {
    let refs = corpus(&[
        ("unrelated.py", "import os\nprint(os.getcwd())\n"),
        ("first_copy.py", LOOP_A),
        ("second_copy.py", LOOP_A),
    ]);

    let report = score(LOOP_A, &refs, 70.0).unwrap();
    let order: Vec<&str> = report.results().iter().map(|r| r.file.as_str()).collect();

    assert_eq!(order, vec!["first_copy.py", "second_copy.py", "unrelated.py"]);
    assert!(
        report
            .results()
            .windows(2)
            .all(|w| w[0].score >= w[1].score)
    );
}

#[test]
fn empty_inputs_score_full_marks() {
    let report = score("", &corpus(&[("empty.py", "")]), 70.0).unwrap();
    assert_eq!(report.most_similar().score, 100.0);
}

#[test]
fn threshold_only_moves_the_verdict() {
    let refs = corpus(&[("loop.py", LOOP_A)]);
    let strict = score(LOOP_B, &refs, 0.0).unwrap();
    let lenient = score(LOOP_B, &refs, 100.0).unwrap();

    assert_eq!(strict.most_similar().score, lenient.most_similar().score);
    assert!(strict.most_similar().plagiarised);
    assert_eq!(strict.most_similar().risk, RiskTier::Medium);
    assert!(!lenient.most_similar().plagiarised);
    assert_eq!(lenient.most_similar().risk, RiskTier::Low);
}

#[test]
fn empty_corpus_is_an_error() {
    let comparator = Comparator::new(&Corpus::new(), Threshold::default(), MatcherOptions::default()).unwrap();
    assert!(matches!(comparator.score("x = 1"), Err(ScoreError::EmptyCorpus)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_text_matches_itself_fully(text in "[a-z_ =+():\n]{0,80}") {
        let report = score(&text, &corpus(&[("self.py", &text)]), 70.0).unwrap();
        let top = report.most_similar();
        prop_assert_eq!(top.score, 100.0);
        prop_assert_eq!(top.risk, RiskTier::High);
    }

    #[test]
    fn composite_is_bounded_weighted_sum(
        a in "[a-z_ =+():\n]{0,60}",
        b in "[a-z_ =+():\n]{0,60}",
        threshold in 0.0f64..=100.0,
    ) {
        let report = score(&a, &corpus(&[("b.py", &b)]), threshold).unwrap();
        let r = report.most_similar();

        let weighted: f64 = WEIGHTS.iter().map(|(m, w)| r.metrics.get(*m) * w).sum();
        prop_assert!((0.0..=100.0).contains(&r.score));
        prop_assert_eq!(r.score, round2(weighted));
        prop_assert_eq!(r.plagiarised, r.score >= threshold);
        for (metric, value) in r.metrics.iter() {
            prop_assert!((0.0..=100.0).contains(&value), "{} = {}", metric, value);
        }
    }
}
