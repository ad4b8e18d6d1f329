//! End-to-end harvest tests against a mocked MediaWiki API and image host.

use std::path::Path;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use flora_harvest::guard::HarvestManifest;
use flora_harvest::{
    HarvestConfig, HarvestError, HarvestOutcome, Harvester, PlantPart, SkipReason,
};

// ─────────────────────── helpers ───────────────────────

fn config(server: &MockServer, dir: &Path) -> HarvestConfig {
    HarvestConfig {
        api_url: format!("{}/w/api.php", server.uri()),
        output_dir: dir.to_path_buf(),
        ..HarvestConfig::default()
    }
}

/// Mount the `prop=images` response listing `titles` for one page.
async fn mount_page(server: &MockServer, titles: &[&str]) {
    let images: Vec<_> = titles.iter().map(|t| json!({ "ns": 6, "title": t })).collect();
    let body = json!({
        "batchcomplete": "",
        "query": { "pages": { "4402": { "pageid": 4402, "ns": 0, "title": "Rosa", "images": images } } }
    });
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the `prop=imageinfo` response for `title`, pointing at `file` on
/// the mock server.
async fn mount_image_info(server: &MockServer, title: &str, file: &str) {
    let body = json!({
        "query": { "pages": { "-1": {
            "ns": 6,
            "title": title,
            "imageinfo": [ { "url": format!("{}/images/{file}", server.uri()) } ]
        } } }
    });
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", title.replace(' ', "_")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, file: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/images/{file}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

fn completed(outcome: HarvestOutcome) -> flora_harvest::HarvestSummary {
    match outcome {
        HarvestOutcome::Completed(summary) => summary,
        HarvestOutcome::Skipped(reason) => panic!("expected a completed run, got {reason:?}"),
    }
}

// ═══════════════════════════════════════════════════════
// PIPELINE
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_two_images_are_saved_in_order() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &["File:Rosa flower.jpg", "File:Rosa bark.png"]).await;
    mount_image_info(&server, "File:Rosa flower.jpg", "rosa_flower.jpg").await;
    mount_image_info(&server, "File:Rosa bark.png", "rosa_bark.png").await;
    mount_image(&server, "rosa_flower.jpg", b"jpeg-bytes").await;
    mount_image(&server, "rosa_bark.png", b"png-bytes").await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let summary = completed(harvester.run(Some("Rosa")).await.unwrap());

    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.saved_count(), 2);
    assert_eq!(
        file_names(dir.path()),
        vec!["Rosa.manifest.json", "Rosa1.jpg", "Rosa1.xml", "Rosa2.png", "Rosa2.xml"]
    );

    assert_eq!(std::fs::read(dir.path().join("Rosa1.jpg")).unwrap(), b"jpeg-bytes");
    assert_eq!(std::fs::read(dir.path().join("Rosa2.png")).unwrap(), b"png-bytes");

    let first = read(dir.path(), "Rosa1.xml");
    assert!(first.contains("<Content>Flower</Content>"));
    assert!(first.contains("<MediaId>Rosa1</MediaId>"));
    assert!(first.contains("<FileName>Rosa1.jpg</FileName>"));
    assert!(first.contains("<ObservationId>Rosa</ObservationId>"));
    assert!(first.contains("<LearnTag>Train</LearnTag>"));

    let second = read(dir.path(), "Rosa2.xml");
    assert!(second.contains("<Content>Stem</Content>"));
    assert!(second.contains("<MediaId>Rosa2</MediaId>"));

    let manifest = HarvestManifest::read_from_dir(dir.path(), "Rosa").unwrap();
    assert_eq!(manifest.images.len(), 2);
    assert_eq!(manifest.images[0].plant_part, PlantPart::Flower);
    assert_eq!(manifest.images[1].plant_part, PlantPart::Stem);
}

#[tokio::test]
async fn test_zero_images_writes_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &[]).await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let summary = completed(harvester.run(Some("Rosa")).await.unwrap());

    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.saved_count(), 0);
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_vector_images_are_never_downloaded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &["File:Rosa range map.svg", "File:Rosa logo.SVG", "File:Rosa hip.jpg"]).await;
    mount_image_info(&server, "File:Rosa range map.svg", "rosa_range_map.svg").await;
    mount_image_info(&server, "File:Rosa logo.SVG", "rosa_logo.SVG").await;
    mount_image_info(&server, "File:Rosa hip.jpg", "rosa_hip_fruit.jpg").await;
    mount_image(&server, "rosa_hip_fruit.jpg", b"hip").await;

    Mock::given(method("GET"))
        .and(path("/images/rosa_range_map.svg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg/>"))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let summary = completed(harvester.run(Some("Rosa")).await.unwrap());

    assert_eq!(summary.vector_skipped, 2);
    assert_eq!(
        file_names(dir.path()),
        vec!["Rosa.manifest.json", "Rosa1.jpg", "Rosa1.xml"]
    );
    assert!(read(dir.path(), "Rosa1.xml").contains("<Content>Fruit</Content>"));
}

#[tokio::test]
async fn test_failed_download_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &["File:Gone.jpg", "File:Empty.jpg", "File:Rosa leaf.jpg"]).await;
    mount_image_info(&server, "File:Gone.jpg", "gone.jpg").await;
    mount_image_info(&server, "File:Empty.jpg", "empty.jpg").await;
    mount_image_info(&server, "File:Rosa leaf.jpg", "rosa_leaf.jpg").await;
    mount_image(&server, "empty.jpg", b"").await;
    mount_image(&server, "rosa_leaf.jpg", b"leaf").await;

    Mock::given(method("GET"))
        .and(path("/images/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let summary = completed(harvester.run(Some("Rosa")).await.unwrap());

    assert_eq!(summary.download_failures, 2);
    assert_eq!(summary.saved_count(), 1);
    assert_eq!(
        file_names(dir.path()),
        vec!["Rosa.manifest.json", "Rosa1.jpg", "Rosa1.xml"]
    );
    assert!(read(dir.path(), "Rosa1.xml").contains("<Content>Leaf</Content>"));
}

#[tokio::test]
async fn test_malformed_api_response_is_zero_images() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let summary = completed(harvester.run(Some("Rosa")).await.unwrap());

    assert_eq!(summary.resolved, 0);
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_malformed_image_info_skips_that_title() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &["File:Broken.jpg", "File:Rosa bloom.jpg"]).await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "imageinfo"))
        .and(query_param("titles", "File:Broken.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": { "pages": { "-1": {} } } })))
        .mount(&server)
        .await;
    mount_image_info(&server, "File:Rosa bloom.jpg", "rosa_bloom.jpg").await;
    mount_image(&server, "rosa_bloom.jpg", b"bloom").await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let summary = completed(harvester.run(Some("Rosa")).await.unwrap());

    assert_eq!(summary.resolved, 1);
    assert!(read(dir.path(), "Rosa1.xml").contains("<Content>Flower</Content>"));
}

#[tokio::test]
async fn test_write_failure_aborts_run_without_manifest() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &["File:Rosa flower.jpg", "File:Rosa bark.png"]).await;
    mount_image_info(&server, "File:Rosa flower.jpg", "rosa_flower.jpg").await;
    mount_image_info(&server, "File:Rosa bark.png", "rosa_bark.png").await;
    mount_image(&server, "rosa_flower.jpg", b"jpeg").await;

    // Serving the second image occupies its sidecar path with a directory,
    // after the guard has already passed.
    let blocker = dir.path().join("Rosa2.xml");
    Mock::given(method("GET"))
        .and(path("/images/rosa_bark.png"))
        .respond_with(move |_: &Request| {
            std::fs::create_dir_all(&blocker).unwrap();
            ResponseTemplate::new(200).set_body_bytes(b"png".to_vec())
        })
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let result = harvester.run(Some("Rosa")).await;

    assert!(matches!(result, Err(HarvestError::Io(_))), "got {result:?}");
    assert!(!dir.path().join("Rosa.manifest.json").exists());
    assert!(dir.path().join("Rosa1.xml").is_file());
    assert!(dir.path().join("Rosa2.png").is_file());

    let outcome = harvester.run(Some("Rosa")).await.unwrap();
    assert!(matches!(
        outcome,
        HarvestOutcome::Skipped(SkipReason::AlreadyProcessed { completed: false })
    ));
}

#[tokio::test]
async fn test_term_with_path_separator_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let outcome = harvester.run(Some("plants/Rosa")).await.unwrap();

    assert!(matches!(outcome, HarvestOutcome::Skipped(SkipReason::InvalidTerm)));
    assert_eq!(outcome.status_line(), "empty search or search already done");
    assert!(file_names(dir.path()).is_empty());
}

// ═══════════════════════════════════════════════════════
// GUARD
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_missing_term_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    for term in [None, Some(""), Some("   ")] {
        let outcome = harvester.run(term).await.unwrap();
        assert!(matches!(outcome, HarvestOutcome::Skipped(SkipReason::MissingInput)));
        assert_eq!(outcome.status_line(), "empty search or search already done");
    }
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_rerun_after_completion_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_page(&server, &["File:Rosa flower.jpg"]).await;
    mount_image_info(&server, "File:Rosa flower.jpg", "rosa_flower.jpg").await;
    mount_image(&server, "rosa_flower.jpg", b"jpeg").await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    completed(harvester.run(Some("Rosa")).await.unwrap());
    let before = file_names(dir.path());

    let outcome = harvester.run(Some("Rosa")).await.unwrap();
    assert!(matches!(
        outcome,
        HarvestOutcome::Skipped(SkipReason::AlreadyProcessed { completed: true })
    ));
    assert_eq!(file_names(dir.path()), before);
}

#[tokio::test]
async fn test_rerun_after_incomplete_run_is_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Rosa1.jpg"), b"partial").unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = Harvester::new(&config(&server, dir.path()));
    let outcome = harvester.run(Some("Rosa")).await.unwrap();

    assert!(matches!(
        outcome,
        HarvestOutcome::Skipped(SkipReason::AlreadyProcessed { completed: false })
    ));
    assert_eq!(file_names(dir.path()), vec!["Rosa1.jpg"]);
}
