//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full harvest cycle end-to-end against a JSON record file.

use dex_harvest::config::{Config, UserAgentConfig};
use dex_harvest::crawler::{Harvester, StopReason};
use dex_harvest::model::{AttributeSet, Record, RecordMap};
use dex_harvest::storage::{JsonRecordStore, RecordStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/wiki/Category_index";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, records_path: &Path, batch_size: usize) -> Config {
    let mut config = Config::default();
    config.harvester.batch_size = batch_size;
    config.harvester.concurrency = 2;
    config.harvester.pause_secs = Some(0.0);
    config.source.base_url = base_url.to_string();
    config.source.list_path = LIST_PATH.to_string();
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: None,
    };
    config.output.records_path = records_path.to_string_lossy().into_owned();
    config
}

fn index_page(entries: &[(u32, &str)]) -> String {
    let rows: String = entries
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<tr><td>{:04}</td><td><a href="/wiki/File:{}.png"><img src="/img/{}.png"></a></td><td><a href="/wiki/{}">{}</a></td><td>Grass</td></tr>"#,
                id, name, name, name, name
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Index</title></head><body>
        <table class="roundy"><tr><th>#</th><th></th><th>Name</th><th>Type</th></tr>{}</table>
        </body></html>"#,
        rows
    )
}

/// Detail page with the stats section under an h4 heading, wrapped in the
/// usual decorative rows
fn detail_page(stats: [i32; 6]) -> String {
    let labels = ["HP", "Attack", "Defense", "Sp. Atk", "Sp. Def", "Speed"];
    let rows: String = labels
        .iter()
        .zip(stats.iter())
        .map(|(label, value)| {
            format!(
                r#"<tr><th><div style="float:left"><a href="/wiki/Stat"><span>{}</span></a></div><div style="float:right">{}</div></th><td></td></tr>"#,
                label, value
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <h2><span>Biology</span></h2><p>Text</p>
        <h4><span class="mw-headline">Base stats</span></h4>
        <table>
          <tr><th colspan="2">Stat</th></tr>
          <tr><th colspan="2">Range</th></tr>
          {}
          <tr><th><div><a><span>Total</span></a></div><div>{}</div></th></tr>
          <tr><td>Other stats</td></tr>
        </table>
        </body></html>"#,
        rows,
        stats.iter().sum::<i32>()
    )
}

fn attributes(stats: [i32; 6]) -> AttributeSet {
    AttributeSet {
        hp: stats[0],
        attack: stats[1],
        defense: stats[2],
        special_attack: stats[3],
        special_defense: stats[4],
        speed: stats[5],
    }
}

async fn mount_index(server: &MockServer, entries: &[(u32, &str)]) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(entries)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, name: &str, stats: [i32; 6]) {
    Mock::given(method("GET"))
        .and(path(format!("/wiki/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(stats)))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/wiki/{}", name)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn record(base_url: &str, id: u32, name: &str, stats: [i32; 6]) -> Record {
    Record {
        id,
        name: name.to_string(),
        url: format!("{}/wiki/{}", base_url, name),
        base: attributes(stats),
    }
}

const BULBASAUR: [i32; 6] = [45, 49, 49, 65, 65, 45];
const IVYSAUR: [i32; 6] = [60, 62, 63, 80, 80, 60];

#[tokio::test]
async fn test_harvest_two_entries() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("output").join("records.json");

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_page(&[(1, "Bulbasaur"), (2, "Ivysaur")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_detail(&server, "Bulbasaur", BULBASAUR).await;
    mount_detail(&server, "Ivysaur", IVYSAUR).await;

    let config = create_test_config(&base_url, &records_path, 10);
    let summary = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.listed, 2);
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.total, 2);

    let stored = JsonRecordStore::new(&records_path).load().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[&1], record(&base_url, 1, "Bulbasaur", BULBASAUR));
    assert_eq!(stored[&2], record(&base_url, 2, "Ivysaur", IVYSAUR));

    // File is keyed by the string form of the id
    let content = fs::read_to_string(&records_path).unwrap();
    assert!(content.contains("\"1\": {"));
    assert!(content.contains("\"special_defense\": 80"));
}

#[tokio::test]
async fn test_second_run_fetches_nothing_new() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.json");

    mount_index(&server, &[(1, "Bulbasaur"), (2, "Ivysaur")]).await;
    for (name, stats) in [("Bulbasaur", BULBASAUR), ("Ivysaur", IVYSAUR)] {
        Mock::given(method("GET"))
            .and(path(format!("/wiki/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(stats)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = create_test_config(&base_url, &records_path, 10);

    Harvester::new(config.clone())
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();
    let first = fs::read(&records_path).unwrap();

    let summary = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();
    let second = fs::read(&records_path).unwrap();

    assert_eq!(summary.previously_known, 2);
    assert_eq!(summary.fetched, 0);
    assert_eq!(summary.batches_completed, 0);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failing_batch_keeps_earlier_results() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.json");

    // One record from a previous run
    let existing = record(&base_url, 1, "A", [1, 1, 1, 1, 1, 1]);
    let mut known = RecordMap::new();
    known.insert(1, existing.clone());
    JsonRecordStore::new(&records_path).save(&known).unwrap();

    mount_index(
        &server,
        &[(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E"), (6, "F")],
    )
    .await;
    mount_detail(&server, "B", [2; 6]).await;
    mount_detail(&server, "C", [3; 6]).await;
    mount_status(&server, "D", 500).await;
    mount_detail(&server, "E", [5; 6]).await;
    mount_detail(&server, "F", [6; 6]).await;

    // Pending B..F in batches [B, C], [D, E], [F]
    let config = create_test_config(&base_url, &records_path, 2);
    let summary = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        summary.stopped,
        Some(StopReason::Failed { batch: 2, .. })
    ));
    assert_eq!(summary.batches_completed, 1);

    let stored = JsonRecordStore::new(&records_path).load().unwrap();
    assert_eq!(stored.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(stored[&1], existing);
    assert_eq!(stored[&3].base.speed, 3);
}

#[tokio::test]
async fn test_incomplete_stats_abort_batch() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.json");

    mount_index(&server, &[(1, "A"), (2, "B")]).await;
    mount_detail(&server, "A", [1; 6]).await;

    // B lacks its Speed row
    let broken = detail_page([2; 6]).replace("<span>Speed</span>", "<span>Agility</span>");
    Mock::given(method("GET"))
        .and(path("/wiki/B"))
        .respond_with(ResponseTemplate::new(200).set_body_string(broken))
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, &records_path, 1);
    let summary = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    match &summary.stopped {
        Some(StopReason::Failed { error, .. }) => {
            assert!(error.to_string().contains("0002:B"));
            assert!(error.to_string().contains("speed"));
        }
        other => panic!("unexpected stop reason: {:?}", other),
    }

    let stored = JsonRecordStore::new(&records_path).load().unwrap();
    assert_eq!(stored.keys().copied().collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn test_corrupt_record_file_is_overwritten() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.json");
    fs::write(&records_path, "{\"1\": {\"id\": \"oops\"").unwrap();

    mount_index(&server, &[(1, "Bulbasaur")]).await;
    mount_detail(&server, "Bulbasaur", BULBASAUR).await;

    let config = create_test_config(&base_url, &records_path, 10);
    let summary = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.previously_known, 0);
    assert_eq!(summary.fetched, 1);

    let stored = JsonRecordStore::new(&records_path).try_load().unwrap().unwrap();
    assert_eq!(stored[&1], record(&base_url, 1, "Bulbasaur", BULBASAUR));
}

#[tokio::test]
async fn test_index_failure_leaves_file_untouched() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.json");

    let mut known = RecordMap::new();
    known.insert(7, record(&base_url, 7, "Squirtle", [44, 48, 65, 50, 64, 43]));
    JsonRecordStore::new(&records_path).save(&known).unwrap();
    let before = fs::read(&records_path).unwrap();

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, &records_path, 10);
    let err = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(fs::read(&records_path).unwrap(), before);
}

#[tokio::test]
async fn test_malformed_index_leaves_file_missing() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();
    let records_path = dir.path().join("records.json");

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>No table</body></html>"))
        .mount(&server)
        .await;

    let config = create_test_config(&base_url, &records_path, 10);
    let result = Harvester::new(config)
        .unwrap()
        .run(CancellationToken::new())
        .await;

    assert!(result.is_err());
    assert!(!records_path.exists());
}
