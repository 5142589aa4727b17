//! Integration tests for the picking stream processor

use picking_stream::domain::{TemperatureZone, ZoneFilter};
use picking_stream::io::StopReason;
use picking_stream::services::{EventProcessorFactory, PickingProcessorFactory};
use picking_stream::ProcessError;
use serde_json::Value;
use std::io::{self, Cursor, Read};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWrite;

const HAPPY_PATH_INPUT: &str = include_str!("fixtures/happy-path-input.jsonl");
const HAPPY_PATH_OUTPUT: &str = include_str!("fixtures/happy-path-output.json");

fn chilled_excluded() -> PickingProcessorFactory {
    PickingProcessorFactory::new().with_zone_filter(ZoneFilter::new([TemperatureZone::Chilled]))
}

/// Run one processor over `input` and return the bytes written to the sink
async fn run(
    factory: &PickingProcessorFactory,
    max_events: usize,
    max_time: Duration,
    input: impl Read + Send + 'static,
) -> Result<Vec<u8>, ProcessError> {
    let processor = factory.create_processor(max_events, Some(max_time))?;
    let source: Box<dyn Read + Send> = Box::new(input);
    let mut sink: Vec<u8> = Vec::new();
    let sink_ref: &mut (dyn AsyncWrite + Send + Unpin) = &mut sink;
    processor.process(Some(source), Some(sink_ref)).await?;
    Ok(sink)
}

fn text(input: &str) -> Cursor<Vec<u8>> {
    Cursor::new(input.as_bytes().to_vec())
}

fn json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn expected(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

/// Assert that a run produced "no result": `[]` or nothing at all
fn assert_no_result(bytes: &[u8]) {
    assert!(bytes.is_empty() || bytes == b"[]", "unexpected output: {}", String::from_utf8_lossy(bytes));
}

#[tokio::test]
async fn test_happy_path() {
    let output = run(&chilled_excluded(), 100, Duration::from_secs(30), text(HAPPY_PATH_INPUT)).await.unwrap();
    assert_eq!(json(&output), expected(HAPPY_PATH_OUTPUT));
}

#[tokio::test]
async fn test_pickers_with_same_active_since_sorted_by_id() {
    let output = run(
        &chilled_excluded(),
        100,
        Duration::from_secs(30),
        text(include_str!("fixtures/same-active-since-input.jsonl")),
    )
    .await
    .unwrap();
    assert_eq!(json(&output), expected(include_str!("fixtures/same-active-since-output.json")));
}

#[tokio::test]
async fn test_pickers_with_same_name_kept_apart_by_id() {
    let output = run(
        &chilled_excluded(),
        100,
        Duration::from_secs(30),
        text(include_str!("fixtures/same-name-different-id-input.jsonl")),
    )
    .await
    .unwrap();
    assert_eq!(json(&output), expected(include_str!("fixtures/same-name-different-id-output.json")));
}

#[tokio::test]
async fn test_max_events_one_gives_single_pick() {
    let output = run(&chilled_excluded(), 1, Duration::from_secs(30), text(HAPPY_PATH_INPUT)).await.unwrap();
    assert_eq!(json(&output), expected(include_str!("fixtures/only-one-result-output.json")));
}

#[tokio::test]
async fn test_chilled_picks_are_excluded() {
    let output = run(
        &chilled_excluded(),
        100,
        Duration::from_secs(30),
        text(include_str!("fixtures/both-ambient-chilled-input.jsonl")),
    )
    .await
    .unwrap();
    assert_eq!(json(&output), expected(HAPPY_PATH_OUTPUT));
}

#[tokio::test]
async fn test_only_chilled_picks_give_empty_result() {
    let output = run(
        &chilled_excluded(),
        100,
        Duration::from_secs(10),
        text(include_str!("fixtures/only-chilled-input.jsonl")),
    )
    .await
    .unwrap();
    assert_eq!(output, b"[]");
}

#[tokio::test]
async fn test_no_exclusions_keeps_chilled_picks() {
    let factory = PickingProcessorFactory::new().with_zone_filter(ZoneFilter::default());
    let output = run(
        &factory,
        100,
        Duration::from_secs(10),
        text(include_str!("fixtures/only-chilled-input.jsonl")),
    )
    .await
    .unwrap();

    let pickers = json(&output);
    let pickers = pickers.as_array().unwrap();
    assert_eq!(pickers.len(), 2);
    // Mila is active since 07:00, Joris since 08:20
    assert_eq!(pickers[0]["picker_name"], "Mila");
    assert_eq!(pickers[1]["picker_name"], "Joris");
}

#[tokio::test]
async fn test_process_wide_policy_excludes_chilled_by_default() {
    let output = run(
        &PickingProcessorFactory::new(),
        100,
        Duration::from_secs(10),
        text(include_str!("fixtures/only-chilled-input.jsonl")),
    )
    .await
    .unwrap();
    assert_no_result(&output);
}

#[tokio::test]
async fn test_max_events_zero() {
    let output = run(&chilled_excluded(), 0, Duration::from_secs(30), text(HAPPY_PATH_INPUT)).await.unwrap();
    assert_eq!(output, b"[]");
}

#[tokio::test]
async fn test_max_time_zero() {
    let output = run(&chilled_excluded(), 100, Duration::ZERO, text(HAPPY_PATH_INPUT)).await.unwrap();
    assert_eq!(output, b"[]");
}

#[tokio::test]
async fn test_max_events_and_max_time_zero() {
    let output = run(&chilled_excluded(), 0, Duration::ZERO, text(HAPPY_PATH_INPUT)).await.unwrap();
    assert_eq!(output, b"[]");
}

#[tokio::test]
async fn test_empty_input() {
    let output = run(
        &chilled_excluded(),
        100,
        Duration::from_secs(30),
        text(include_str!("fixtures/empty-input.jsonl")),
    )
    .await
    .unwrap();
    assert_eq!(output, b"[]");
}

#[tokio::test]
async fn test_malformed_line_fails_and_writes_nothing() {
    let mut lines: Vec<&str> = HAPPY_PATH_INPUT.lines().collect();
    let broken = lines[2].replace(r#","quantity":1"#, "");
    lines[2] = &broken;
    let input = lines.join("\n");

    let factory = chilled_excluded();
    let processor = factory.create_processor(100, Some(Duration::from_secs(30))).unwrap();
    let source: Box<dyn Read + Send> = Box::new(text(&input));
    let mut sink: Vec<u8> = Vec::new();
    let sink_ref: &mut (dyn AsyncWrite + Send + Unpin) = &mut sink;

    let err = processor.process(Some(source), Some(sink_ref)).await.unwrap_err();
    assert!(matches!(err, ProcessError::Decode { line: 3, .. }), "unexpected error: {err:?}");
    assert!(sink.is_empty());
    assert_eq!(factory.metrics().report().decode_failures, 1);
}

#[tokio::test]
async fn test_malformed_line_past_count_limit_is_never_decoded() {
    let input = format!("{}not json at all\n", HAPPY_PATH_INPUT);
    let output = run(&chilled_excluded(), 5, Duration::from_secs(30), text(&input)).await.unwrap();
    assert_eq!(json(&output), expected(HAPPY_PATH_OUTPUT));
}

#[tokio::test]
async fn test_missing_max_time_is_rejected() {
    let err = chilled_excluded().create_processor(100, None).err().unwrap();
    assert!(matches!(err, ProcessError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_missing_source_or_sink_is_rejected() {
    let processor = chilled_excluded().create_processor(100, Some(Duration::from_secs(1))).unwrap();

    let mut sink: Vec<u8> = Vec::new();
    let sink_ref: &mut (dyn AsyncWrite + Send + Unpin) = &mut sink;
    let err = processor.process(None, Some(sink_ref)).await.unwrap_err();
    assert!(matches!(err, ProcessError::InvalidArgument(_)));
    assert!(sink.is_empty());

    let source: Box<dyn Read + Send> = Box::new(text(HAPPY_PATH_INPUT));
    let err = processor.process(Some(source), None).await.unwrap_err();
    assert!(matches!(err, ProcessError::InvalidArgument(_)));
}

/// Producer that sends its data, then stalls until the test drops the sender
struct StalledProducer {
    data: Cursor<Vec<u8>>,
    release: mpsc::Receiver<()>,
}

impl Read for StalledProducer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        let _ = self.release.recv();
        Ok(0)
    }
}

#[tokio::test]
async fn test_stalled_producer_returns_partial_result_at_deadline() {
    let (_release_tx, release) = mpsc::channel();
    let first_two: String = HAPPY_PATH_INPUT.lines().take(2).map(|l| format!("{l}\n")).collect();
    let producer = StalledProducer { data: text(&first_two), release };

    let factory = chilled_excluded();
    let processor = factory.create(100, Some(Duration::from_millis(200))).unwrap();
    let mut sink: Vec<u8> = Vec::new();

    let started = Instant::now();
    let summary = processor.process_stream(Some(producer), Some(&mut sink)).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.stop_reason, StopReason::Deadline);
    assert_eq!(summary.lines_read, 2);

    let pickers = json(&sink);
    let names: Vec<_> = pickers.as_array().unwrap().iter().map(|p| p["picker_name"].clone()).collect();
    assert_eq!(names, vec![Value::from("Ruben"), Value::from("Joris")]);
}

/// Producer whose underlying device fails after its data
struct BrokenProducer {
    data: Cursor<Vec<u8>>,
}

impl Read for BrokenProducer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "producer crashed"))
    }
}

#[tokio::test]
async fn test_read_failure_is_an_io_error() {
    let producer = BrokenProducer { data: text(HAPPY_PATH_INPUT) };
    let factory = chilled_excluded();
    let err = run(&factory, 100, Duration::from_secs(30), producer).await.unwrap_err();

    match err {
        ProcessError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected io error, got {other:?}"),
    }
    assert_eq!(factory.metrics().report().io_failures, 1);
}

/// Small deterministic generator so the property checks need no extra crates
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[tokio::test]
async fn test_output_ordering_and_exclusion_properties() {
    let mut rng = Lcg(42);
    let mut input = String::new();
    let mut ambient_count = 0;

    for seq in 0..300u64 {
        let picker = rng.next(8);
        // Few distinct values so ties are common
        let active_hour = 6 + picker % 3;
        let minute = rng.next(20);
        let chilled = rng.next(3) == 0;
        let (zone, name) = if chilled {
            ("chilled", format!("chilled-{seq:04}"))
        } else {
            ambient_count += 1;
            ("ambient", format!("item-{seq:04}"))
        };
        input.push_str(&format!(
            r#"{{"id":"e{seq}","timestamp":"2018-12-20T10:{minute:02}:00Z","picker":{{"id":"id-{picker}","name":"picker-{picker}","active_since":"2018-12-20T{active_hour:02}:00:00Z"}},"article":{{"id":"a{seq}","name":"{name}","temperature_zone":"{zone}"}},"quantity":1}}"#
        ));
        input.push('\n');
    }

    let output = run(&chilled_excluded(), 1000, Duration::from_secs(30), text(&input)).await.unwrap();
    let pickers = json(&output);
    let pickers = pickers.as_array().unwrap();

    // Pickers: active_since non-decreasing, then id (picker-N <-> id-N) increasing
    for pair in pickers.windows(2) {
        let a = (pair[0]["active_since"].as_str().unwrap(), pair[0]["picker_name"].as_str().unwrap());
        let b = (pair[1]["active_since"].as_str().unwrap(), pair[1]["picker_name"].as_str().unwrap());
        assert!(a < b, "pickers out of order: {a:?} then {b:?}");
    }

    let mut total = 0;
    for picker in pickers {
        let picks = picker["picks"].as_array().unwrap();
        total += picks.len();
        for pair in picks.windows(2) {
            let (ts_a, ts_b) = (pair[0]["timestamp"].as_str().unwrap(), pair[1]["timestamp"].as_str().unwrap());
            assert!(ts_a <= ts_b, "picks out of order");
            if ts_a == ts_b {
                // Input order preserved for ties
                assert!(pair[0]["article_name"].as_str().unwrap() < pair[1]["article_name"].as_str().unwrap());
            }
        }
        for pick in picks {
            let name = pick["article_name"].as_str().unwrap();
            assert!(name.starts_with("ITEM-"), "excluded pick leaked: {name}");
        }
    }
    assert_eq!(total, ambient_count);
}
