//! Feed parsing, ingestion and generation

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use intersection_sim::simulation::{
    ingest_reader, parse_record, position_for, FeedError, FeedGenerator, FeedReader, Lane,
    Shutdown, Sublane, VehicleRegistry, DEFAULT_SUBLANE, MAX_BATCH_PER_LANE, MIN_BATCH_PER_LANE,
};

fn temp_feed(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "intersection_sim_{}_{}.data",
        name,
        std::process::id()
    ));
    let _ = fs::remove_file(&path);
    path
}

fn reader_for(path: &PathBuf, registry: &Arc<VehicleRegistry>) -> FeedReader {
    FeedReader::new(
        path.clone(),
        Arc::clone(registry),
        Duration::from_millis(10),
        Duration::from_millis(10),
    )
}

#[test]
fn test_parse_full_record() {
    let request = parse_record("V001:A:3").unwrap();
    assert_eq!(request.id.as_str(), "V001");
    assert_eq!(request.lane, Lane::A);
    assert_eq!(request.sublane, Sublane::TURN);
}

#[test]
fn test_parse_defaults_sublane() {
    let request = parse_record("KD4TR071:C\r").unwrap();
    assert_eq!(request.lane, Lane::C);
    assert_eq!(request.sublane, DEFAULT_SUBLANE);
}

#[test]
fn test_parse_rejects_malformed_lines() {
    assert_eq!(parse_record("V001"), Err(FeedError::MissingField));
    assert_eq!(parse_record(":A:2"), Err(FeedError::EmptyId));
    assert_eq!(
        parse_record("V002:X:1"),
        Err(FeedError::InvalidLane("X".to_string()))
    );
    assert_eq!(
        parse_record("V002:AB"),
        Err(FeedError::InvalidLane("AB".to_string()))
    );
    assert_eq!(
        parse_record("V003:B:7"),
        Err(FeedError::InvalidSublane("7".to_string()))
    );
    assert_eq!(
        parse_record("V003:B:two"),
        Err(FeedError::InvalidSublane("two".to_string()))
    );
    assert_eq!(parse_record("V004:D:2:extra"), Err(FeedError::TooManyFields));
}

#[test]
fn test_ingest_scenario_skips_invalid_lane() {
    let registry = VehicleRegistry::with_capacity(10);
    let feed = "V001:A:2\nV002:X:1\nV003:B:3\n";

    let report = ingest_reader(Cursor::new(feed), &registry).unwrap();
    assert_eq!(report.accepted, 2);
    assert_eq!(report.malformed, 1);

    let ids: Vec<String> = registry
        .snapshot()
        .iter()
        .map(|v| v.id.to_string())
        .collect();
    assert_eq!(ids, vec!["V001", "V003"]);
    assert_eq!(
        registry.snapshot()[1].position,
        position_for(Lane::B, Sublane::TURN)
    );
}

#[test]
fn test_ingest_counts_dropped_spawns() {
    let registry = VehicleRegistry::with_capacity(1);
    let feed = "N1:A:1\n\nF1:B:2\nF2:C:2\n";

    let report = ingest_reader(Cursor::new(feed), &registry).unwrap();
    assert_eq!(report.rejected_forbidden, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected_full, 1);
    assert_eq!(report.lines(), 3);
}

#[test]
fn test_ingest_once_rereads_whole_file() {
    let path = temp_feed("reread");
    fs::write(&path, "V001:A:2\nV002:X:1\nV003:B:3\n").unwrap();

    let registry = Arc::new(VehicleRegistry::with_capacity(10));
    let reader = reader_for(&path, &registry);

    assert_eq!(reader.ingest_once().unwrap().accepted, 2);
    assert_eq!(registry.active_count(), 2);

    // Every line is submitted again on the next poll
    assert_eq!(reader.ingest_once().unwrap().accepted, 2);
    assert_eq!(registry.active_count(), 4);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_feed_is_an_error_not_a_panic() {
    let path = temp_feed("missing");
    let registry = Arc::new(VehicleRegistry::with_capacity(10));
    let reader = reader_for(&path, &registry);

    let err = reader.ingest_once().unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to open vehicle feed"));
    assert_eq!(registry.active_count(), 0);
}

#[test]
fn test_generator_output_is_readable_by_the_feed() {
    let path = temp_feed("generated");
    let mut generator = FeedGenerator::new(path.clone(), StdRng::seed_from_u64(11));

    let first = generator.write_batch().unwrap();
    let second = generator.write_batch().unwrap();
    assert!(first >= 4 * MIN_BATCH_PER_LANE && first <= 4 * MAX_BATCH_PER_LANE);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), first + second);

    for line in &lines {
        let (id, lane) = line.split_once(':').unwrap();
        assert_eq!(id.len(), 8);
        assert!(id[..2].chars().all(|c| c.is_ascii_uppercase()));
        assert!(id[2..3].chars().all(|c| c.is_ascii_digit()));
        assert!(id[3..5].chars().all(|c| c.is_ascii_uppercase()));
        assert!(id[5..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(lane.len(), 1);
    }

    // Lanes appear in A, B, C, D order within a batch
    let first_batch: Vec<char> = lines[..first]
        .iter()
        .map(|l| l.chars().last().unwrap())
        .collect();
    let mut sorted = first_batch.clone();
    sorted.sort();
    assert_eq!(first_batch, sorted);

    let registry = Arc::new(VehicleRegistry::with_capacity(100));
    let report = reader_for(&path, &registry).ingest_once().unwrap();
    assert_eq!(report.accepted, first + second);
    assert_eq!(report.malformed, 0);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_undecodable_line_is_malformed_not_fatal() {
    let registry = VehicleRegistry::with_capacity(10);
    let report =
        ingest_reader(Cursor::new(&b"V001:A:2\nV\xff02:B:2\nV003:C:2\r\n"[..]), &registry).unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.malformed, 1);
    let ids: Vec<String> = registry
        .snapshot()
        .iter()
        .map(|v| v.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["V001", "V003"]);
}

#[test]
fn test_feed_reader_picks_up_file_created_after_start() {
    let path = temp_feed("late");
    let registry = Arc::new(VehicleRegistry::with_capacity(10));
    let shutdown = Arc::new(Shutdown::new());

    let worker = {
        let reader = reader_for(&path, &registry);
        let shutdown = Arc::clone(&shutdown);
        thread::spawn(move || reader.run(&shutdown))
    };

    thread::sleep(Duration::from_millis(50));
    assert_eq!(registry.active_count(), 0);
    fs::write(&path, "LATE1:B:2\n").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while registry.active_count() == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    shutdown.request();
    worker.join().unwrap();

    assert_eq!(registry.active_count(), 1);
    assert_eq!(registry.snapshot()[0].id.as_str(), "LATE1");
    fs::remove_file(&path).unwrap();
}
