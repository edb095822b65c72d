//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for Reddit's OAuth and API hosts and
//! run the full harvest cycle end-to-end: authenticate, list, load, expand,
//! flatten, filter, write, extract.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thread_harvest::config::{Config, Credentials};
use thread_harvest::harvester::run_harvest;
use thread_harvest::output::{extract_to_file, FlatRecord};
use thread_harvest::reddit::RedditApi;
use thread_harvest::{HarvestError, MoreStub, RedditClient, Reply};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server_uri: &str, sources: &[&str], out_dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.auth_url = server_uri.to_string();
    config.api.base_url = server_uri.to_string();
    config.harvest.sources = sources.iter().map(|s| s.to_string()).collect();
    config.harvest.rate_limit_ms = 0;
    config.harvest.retry_backoff_ms = 1;
    config.output.directory = out_dir.to_string_lossy().to_string();
    config
}

fn test_credentials() -> Credentials {
    Credentials {
        client_id: "test-id".to_string(),
        client_secret: "test-secret".to_string(),
        user_agent: "thread-harvest-tests/1.0".to_string(),
    }
}

fn link(id: &str, title: &str, created_utc: f64) -> Value {
    json!({"kind": "t3", "data": {"id": id, "title": title, "created_utc": created_utc}})
}

fn t1(id: &str, parent: &str, score: i64, body: &str, replies: Vec<Value>) -> Value {
    let replies = if replies.is_empty() {
        json!("")
    } else {
        json!({"kind": "Listing", "data": {"after": null, "children": replies}})
    };
    json!({"kind": "t1", "data": {
        "id": id, "parent_id": parent, "score": score, "body": body, "replies": replies
    }})
}

fn more(parent: &str, children: &[&str]) -> Value {
    json!({"kind": "more", "data": {
        "count": children.len(), "parent_id": parent, "children": children,
        "id": children.first().copied().unwrap_or("_")
    }})
}

fn listing(children: Vec<Value>, after: Option<&str>) -> Value {
    json!({"kind": "Listing", "data": {"after": after, "children": children}})
}

/// Mounts a successful token endpoint
async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .mount(server)
        .await;
}

fn output_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_full_harvest_single_source() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/stocks/new"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("limit", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![link("p1", "Daily discussion", 1_714_564_800.0)],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .and(query_param("sort", "top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![link("p1", "Daily discussion", 1_714_564_800.0)], None),
            listing(
                vec![
                    t1("c1", "t3_p1", 42, "great\nstock", vec![
                        t1("c1a", "t1_c1", 7, "agreed   fully", vec![]),
                    ]),
                    t1("c2", "t3_p1", 5, "[deleted]", vec![]),
                    t1("c3", "t3_p1", 1, "I am a bot", vec![]),
                    more("t3_p1", &["c4", "c5"]),
                ],
                None,
            ),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .and(query_param("link_id", "t3_p1"))
        .and(query_param("children", "c4,c5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "json": {"errors": [], "data": {"things": [
                t1("c4", "t3_p1", 0, "late to the party", vec![]),
                t1("c4a", "t1_c4", 0, "same", vec![]),
                t1("c5", "t3_p1", -2, "**User Report** nope", vec![]),
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &["stocks"], out.path());
    let client = RedditClient::connect(&config.api, &test_credentials())
        .await
        .expect("Failed to connect");

    let report = run_harvest(client, &config).await.expect("Harvest failed");

    // Metrics
    assert_eq!(report.metrics.sources_visited, 1);
    assert_eq!(report.metrics.posts_visited, 1);
    assert_eq!(report.metrics.comments_scraped, 7);
    assert_eq!(report.metrics.comments_kept, 4);

    // Persisted records: depth-first, stub replies spliced where the stub was
    let content = std::fs::read_to_string(&report.output_path).unwrap();
    let records: Vec<FlatRecord> = serde_json::from_str(&content).unwrap();
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["great stock", "agreed fully", "late to the party", "same"]
    );
    assert!(records
        .iter()
        .all(|r| r.created_at.timestamp() == 1_714_564_800));

    let raw: Vec<Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(raw[0]["created"], "2024-05-01 12:00:00");
    assert_eq!(raw[0]["score"], 42);

    let name = report.output_path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("scrape_") && name.ends_with(".json"));

    // Extraction of the persisted file
    let extracted = extract_to_file(&report.output_path, out.path(), "extracted.txt").unwrap();
    assert_eq!(
        std::fs::read_to_string(extracted).unwrap(),
        "great stock\nagreed fully\nlate to the party\nsame\n"
    );
}

#[tokio::test]
async fn test_continuation_stub_is_followed() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/stocks/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(vec![link("p1", "Thread", 1_700_000_000.0)], None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .and(query_param("comment", "deep"))
        .and(query_param("sort", "top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![link("p1", "Thread", 1_700_000_000.0)], None),
            listing(
                vec![t1("deep", "t1_mid", 3, "deep", vec![
                    t1("deeper", "t1_deep", 2, "continued", vec![]),
                ])],
                None,
            ),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &["stocks"], out.path());
    let client = RedditClient::connect(&config.api, &test_credentials())
        .await
        .unwrap();

    let post = client.list_recent_posts("stocks", 1).await.unwrap().remove(0);
    // A continuation stub lists no ids; its replies hang under the parent
    let stub = MoreStub {
        count: 0,
        parent_id: "t1_deep".to_string(),
        children: vec![],
    };

    let replies = client.expand_replies(&post, &stub).await.unwrap();

    assert_eq!(replies.len(), 1);
    match &replies[0] {
        Reply::Comment(node) => {
            assert_eq!(node.id, "deeper");
            assert_eq!(node.body, "continued");
        }
        other => panic!("expected a comment, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_listing_follows_cursor() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // Second page first: the more specific mock must take precedence
    Mock::given(method("GET"))
        .and(path("/r/investing/new"))
        .and(query_param("after", "t3_b"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![link("c", "C", 1_700_000_100.0), link("d", "D", 1_700_000_000.0)],
            Some("t3_d"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/investing/new"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![link("a", "A", 1_700_000_300.0), link("b", "B", 1_700_000_200.0)],
            Some("t3_b"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &["investing"], out.path());
    let client = RedditClient::connect(&config.api, &test_credentials())
        .await
        .unwrap();

    let posts = client.list_recent_posts("investing", 3).await.unwrap();

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Unauthorized", "error": 401
        })))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &["stocks"], out.path());

    let result = RedditClient::connect(&config.api, &test_credentials()).await;

    assert!(matches!(result, Err(HarvestError::Authentication(_))));
}

#[tokio::test]
async fn test_missing_subreddit_aborts_without_output() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/stocks/new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![], None)),
        )
        .mount(&server)
        .await;

    // Reddit redirects unknown subreddits to its search page
    Mock::given(method("GET"))
        .and(path("/r/doesnotexist/new"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/subreddits/search.json?q=doesnotexist"),
        )
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("out");
    let config = create_test_config(&server.uri(), &["stocks", "doesnotexist"], &out_dir);
    let client = RedditClient::connect(&config.api, &test_credentials())
        .await
        .unwrap();

    let result = run_harvest(client, &config).await;

    assert!(matches!(
        result,
        Err(HarvestError::SourceUnavailable { ref source_name, .. }) if source_name == "doesnotexist"
    ));
    assert!(output_files(&out_dir).is_empty());
}

#[tokio::test]
async fn test_transient_expansion_failure_is_retried() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/stocks/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing(vec![link("p1", "Thread", 1_700_000_000.0)], None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![link("p1", "Thread", 1_700_000_000.0)], None),
            listing(vec![more("t3_p1", &["x"])], None),
        ])))
        .mount(&server)
        .await;

    // First call fails with 503, then the real answer is served
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "json": {"errors": [], "data": {"things": [
                t1("x", "t3_p1", 1, "made it", vec![]),
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &["stocks"], out.path());
    let client = RedditClient::connect(&config.api, &test_credentials())
        .await
        .unwrap();

    let report = run_harvest(client, &config).await.expect("Harvest failed");

    let records: Vec<FlatRecord> =
        serde_json::from_str(&std::fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "made it");
}

#[tokio::test]
async fn test_failed_expansion_aborts_without_output() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/stocks/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![
                link("p1", "First", 1_700_000_100.0),
                link("p2", "Second", 1_700_000_000.0),
            ],
            None,
        )))
        .mount(&server)
        .await;

    // The first post harvests cleanly
    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![link("p1", "First", 1_700_000_100.0)], None),
            listing(vec![t1("a", "t3_p1", 3, "harvested", vec![])], None),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comments/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![link("p2", "Second", 1_700_000_000.0)], None),
            listing(vec![more("t3_p2", &["y"])], None),
        ])))
        .mount(&server)
        .await;

    // A 400 is permanent: one attempt, no retry
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("out");
    let config = create_test_config(&server.uri(), &["stocks"], &out_dir);
    let client = RedditClient::connect(&config.api, &test_credentials())
        .await
        .unwrap();

    let result = run_harvest(client, &config).await;

    assert!(matches!(
        result,
        Err(HarvestError::Expansion { ref post_id, .. }) if post_id == "p2"
    ));
    assert!(output_files(&out_dir).is_empty());
}
