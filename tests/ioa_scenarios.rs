//! Reference agreement scenarios, run end to end through the public API

use observer_ioa::{
    compare_sessions, exact_agreement, partial_agreement, partition, window_agreement_continuous,
    window_agreement_discrete, BehaviorKey, IoaConfig, IoaMethod, IoaProcessor, IoaReport,
    RawSession, StartEndTimes,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

const BIN_WIDTH_MILLIS: u64 = 1000;

fn key(id: &str) -> BehaviorKey {
    BehaviorKey::from(id)
}

fn discrete(id: &str, times: &[u64]) -> BTreeMap<BehaviorKey, Vec<u64>> {
    let mut stream = BTreeMap::new();
    stream.insert(key(id), times.to_vec());
    stream
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-12
}

#[test]
fn exact_agreement_one_second_blocks() {
    let a = partition(&discrete("d", &[0, 1100, 1700]), 1700, BIN_WIDTH_MILLIS).unwrap();
    let b = partition(&discrete("d", &[0, 1100]), 2700, BIN_WIDTH_MILLIS).unwrap();

    let results = exact_agreement(&a, &b);
    let d = &results[&key("d")];

    assert_eq!(d.key(), &key("d"));
    assert_eq!(d.counts1(), vec![1, 2, 0]);
    assert_eq!(d.counts2(), vec![1, 1, 0]);
    assert_eq!(d.scores(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn partial_agreement_one_second_blocks() {
    let a = partition(&discrete("d", &[0, 1100, 1700]), 1700, BIN_WIDTH_MILLIS).unwrap();
    let b = partition(&discrete("d", &[0, 1100]), 2700, BIN_WIDTH_MILLIS).unwrap();

    let results = partial_agreement(&a, &b);
    let d = &results[&key("d")];

    assert_eq!(d.counts1(), vec![1, 2, 0]);
    assert_eq!(d.counts2(), vec![1, 1, 0]);
    assert_eq!(d.scores(), vec![1.0, 0.5, 1.0]);
}

#[test]
fn discrete_window_threshold_two() {
    let a = partition(
        &discrete("a", &[0, 1000, 1100, 5000, 8000, 8100]),
        10_000,
        BIN_WIDTH_MILLIS,
    )
    .unwrap();
    let b = partition(
        &discrete("a", &[0, 1000, 4000, 7000, 8000]),
        11_000,
        BIN_WIDTH_MILLIS,
    )
    .unwrap();

    let results = window_agreement_discrete(&a, &b, 2);
    let scores = results[&key("a")];

    assert!(close(scores.score_a_to_b.unwrap(), 5.0 / 6.0));
    assert_eq!(scores.score_b_to_a, Some(1.0));
}

#[test]
fn continuous_window_jaccard() {
    let mut first = BTreeMap::new();
    first.insert(key("c"), vec![StartEndTimes::new(0, 1000)]);
    let mut second = BTreeMap::new();
    second.insert(key("c"), vec![StartEndTimes::new(0, 2000)]);

    let a = partition(&first, 1700, BIN_WIDTH_MILLIS).unwrap();
    let b = partition(&second, 2700, BIN_WIDTH_MILLIS).unwrap();

    let results = window_agreement_continuous(&a, &b);
    assert!(close(results[&key("c")], 2.0 / 3.0));
}

#[test]
fn time_window_pipeline_with_two_behaviors() {
    let first = RawSession::new(10_000)
        .with_discrete("a", vec![0, 1000, 1100, 5000, 8000, 8100])
        .with_discrete("b", vec![4000, 9000, 9100]);
    let second = RawSession::new(11_000)
        .with_discrete("a", vec![0, 1000, 4000, 7000, 8000])
        .with_discrete("b", vec![1000, 7000, 10_000]);

    let config = IoaConfig::new(IoaMethod::TimeWindow).with_threshold(2);
    let report = compare_sessions(&first, &second, &config).unwrap();

    let IoaReport::TimeWindow {
        discrete,
        continuous,
        ..
    } = report
    else {
        panic!("expected time window report");
    };

    assert!(continuous.is_empty());
    assert!(close(discrete[&key("a")].score_a_to_b.unwrap(), 5.0 / 6.0));
    assert_eq!(discrete[&key("a")].score_b_to_a, Some(1.0));
    assert!(close(discrete[&key("b")].score_a_to_b.unwrap(), 2.0 / 3.0));
    assert!(close(discrete[&key("b")].score_b_to_a.unwrap(), 2.0 / 3.0));
}

#[test]
fn processor_is_shareable_across_threads() {
    let processor = IoaProcessor::new(IoaConfig::new(IoaMethod::Partial)).unwrap();
    let first = RawSession::new(1700).with_discrete("d", vec![0, 1100, 1700]);
    let second = RawSession::new(2700).with_discrete("d", vec![0, 1100]);

    let averages: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let report = processor.process(&first, &second).unwrap();
                    report.average_by_key()[&key("d")]
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(averages.len(), 4);
    assert!(averages.iter().all(|&avg| close(avg, 2.5 / 3.0)));
}
