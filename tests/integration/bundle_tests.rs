//! Integration tests for the bundler
//!
//! These tests use wiremock to create mock HTTP servers and drive a full
//! fetch, collect and download cycle through a `Session`.

use std::io::{Cursor, Read};
use std::time::Duration;
use web_code_bundler::bundler::{bundle, Session};
use web_code_bundler::config::{ArchiveConfig, Compression, Config, FetcherConfig, LocatorConfig};
use web_code_bundler::{BundleError, ReferenceScope, RunPhase};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipArchive;

/// Creates a test configuration writing to the given archive path
fn create_test_config(output_path: &str, scope: ReferenceScope) -> Config {
    Config {
        fetcher: FetcherConfig {
            user_agent: "TestBundler/1.0".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        locator: LocatorConfig { scope },
        archive: ArchiveConfig {
            output_path: output_path.to_string(),
            compression: Compression::Deflated,
        },
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn download_in_memory(session: &mut Session) -> ZipArchive<Cursor<Vec<u8>>> {
    let mut cursor = Cursor::new(Vec::new());
    session
        .download_to(&mut cursor)
        .expect("Failed to build archive");
    cursor.set_position(0);
    ZipArchive::new(cursor).expect("Archive should be readable")
}

fn member_names(archive: &ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

fn read_member(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut file = archive.by_name(name).expect("Member should exist");
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).expect("Member should be readable");
    buf
}

#[tokio::test]
async fn test_full_bundle_of_page_with_assets() {
    let mock_server = MockServer::start().await;

    mount_get(
        &mock_server,
        "/",
        html_page(
            r#"
            <link rel="stylesheet" href="css/site.css">
            <link rel="icon" href="favicon.ico">
            <script src="js/app.js"></script>
            <img src="img/logo.png">
            "#,
        ),
    )
    .await;
    mount_get(
        &mock_server,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_string("body { color: red; }"),
    )
    .await;
    mount_get(
        &mock_server,
        "/js/app.js",
        ResponseTemplate::new(200).set_body_string("console.log('hi');"),
    )
    .await;
    mount_get(
        &mock_server,
        "/img/logo.png",
        ResponseTemplate::new(200).set_body_bytes(vec![0x89u8, 0x50, 0x4e, 0x47]),
    )
    .await;
    mount_get(
        &mock_server,
        "/favicon.ico",
        ResponseTemplate::new(200).set_body_bytes(vec![0u8, 0, 1, 0]),
    )
    .await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");

    let report = session
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(report.located, 4);
    assert_eq!(report.collected, 4);
    assert!(report.failures.is_empty());
    assert_eq!(session.phase(), RunPhase::Ready);
    assert!(session.can_download());

    let collection = session.collection().expect("Collection should be present");
    assert_eq!(collection.html.len(), 1);
    assert_eq!(collection.css.len(), 1);
    assert_eq!(collection.js.len(), 1);
    assert_eq!(collection.assets.len(), 2);

    let mut archive = download_in_memory(&mut session);
    assert_eq!(session.phase(), RunPhase::Done);
    assert_eq!(
        member_names(&archive),
        vec!["app.js", "favicon.ico", "index.html", "logo.png", "site.css"]
    );
    assert_eq!(read_member(&mut archive, "site.css"), b"body { color: red; }");
    assert_eq!(read_member(&mut archive, "logo.png"), vec![0x89, 0x50, 0x4e, 0x47]);
    let index = String::from_utf8(read_member(&mut archive, "index.html")).unwrap();
    assert!(index.contains("css/site.css"));
}

#[tokio::test]
async fn test_absolute_stylesheet_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/",
        html_page(&format!(
            r#"
            <link rel="stylesheet" href="a.css">
            <link rel="stylesheet" href="/styles/b.css">
            <link rel="stylesheet" href="{}/external.css">
            "#,
            base_url
        )),
    )
    .await;
    mount_get(&mock_server, "/a.css", ResponseTemplate::new(200).set_body_string("a")).await;
    mount_get(
        &mock_server,
        "/styles/b.css",
        ResponseTemplate::new(200).set_body_string("b"),
    )
    .await;

    // Should never be called
    Mock::given(method("GET"))
        .and(path("/external.css"))
        .respond_with(ResponseTemplate::new(200).set_body_string("external"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");
    let report = session
        .fetch(&format!("{}/", base_url))
        .await
        .expect("Fetch failed");

    assert_eq!(report.located, 2);
    let collection = session.collection().unwrap();
    let mut names: Vec<&str> = collection.css.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a.css", "b.css"]);

    // Wiremock verifies the expect(0) when mock_server drops
}

#[tokio::test]
async fn test_same_origin_scope_fetches_absolute_same_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_get(
        &mock_server,
        "/",
        html_page(&format!(
            r#"<script src="{}/abs.js"></script><script src="https://elsewhere.invalid/x.js"></script>"#,
            base_url
        )),
    )
    .await;
    mount_get(&mock_server, "/abs.js", ResponseTemplate::new(200).set_body_string("abs")).await;

    let config = create_test_config("unused.zip", ReferenceScope::SameOrigin);
    let mut session = Session::new(config).expect("Failed to create session");
    let report = session
        .fetch(&format!("{}/", base_url))
        .await
        .expect("Fetch failed");

    assert_eq!(report.located, 1);
    assert_eq!(report.collected, 1);
    assert_eq!(session.collection().unwrap().js[0].name, "abs.js");
}

#[tokio::test]
async fn test_root_fetch_failure_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    // Nothing past the root should be requested
    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");
    let result = session.fetch(&format!("{}/", mock_server.uri())).await;

    match result {
        Err(BundleError::RootFetchFailed { reason, .. }) => assert_eq!(reason, "HTTP 500"),
        other => panic!("Expected RootFetchFailed, got {:?}", other),
    }
    assert_eq!(session.phase(), RunPhase::Failed);
    assert!(session.collection().is_none());
    assert!(!session.can_download());

    let download = session.download_to(Cursor::new(Vec::new()));
    assert!(matches!(
        download,
        Err(BundleError::NotReady {
            phase: RunPhase::Failed
        })
    ));
}

#[tokio::test]
async fn test_input_without_scheme_uses_https() {
    let mock_server = MockServer::start().await;
    let address = mock_server.address().to_string();

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");

    // The mock server only speaks plain HTTP, so an https:// request must fail
    let result = session.fetch(&format!("{}/", address)).await;
    match result {
        Err(BundleError::RootFetchFailed { url, .. }) => {
            assert_eq!(url, format!("https://{}/", address));
        }
        other => panic!("Expected RootFetchFailed, got {:?}", other),
    }

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_invalid_input_makes_no_requests() {
    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");

    assert!(matches!(
        session.fetch("").await,
        Err(BundleError::InvalidInput)
    ));
    assert!(matches!(
        session.fetch("http://exa mple.com").await,
        Err(BundleError::InvalidUrl(_))
    ));
    assert_eq!(session.phase(), RunPhase::Failed);
}

#[tokio::test]
async fn test_one_failing_asset_does_not_stop_others() {
    let mock_server = MockServer::start().await;

    mount_get(
        &mock_server,
        "/",
        html_page(
            r#"
            <img src="one.png"><img src="two.png"><img src="broken.png">
            <video src="clip.mp4"></video>
            "#,
        ),
    )
    .await;
    mount_get(&mock_server, "/one.png", ResponseTemplate::new(200).set_body_bytes(vec![1u8])).await;
    mount_get(&mock_server, "/two.png", ResponseTemplate::new(200).set_body_bytes(vec![2u8])).await;
    mount_get(&mock_server, "/broken.png", ResponseTemplate::new(404)).await;
    mount_get(
        &mock_server,
        "/clip.mp4",
        ResponseTemplate::new(200)
            .set_body_bytes(vec![3u8])
            .set_delay(Duration::from_millis(100)),
    )
    .await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");
    let report = session
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Asset failures must not fail the run");

    assert_eq!(report.located, 4);
    assert_eq!(report.collected, 3);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.as_str().ends_with("/broken.png"));
    assert!(report.is_settled());
    assert_eq!(session.phase(), RunPhase::Ready);

    let archive = download_in_memory(&mut session);
    assert_eq!(
        member_names(&archive),
        vec!["clip.mp4", "index.html", "one.png", "two.png"]
    );
}

#[tokio::test]
async fn test_same_basename_keeps_last_settled() {
    let mock_server = MockServer::start().await;

    mount_get(
        &mock_server,
        "/",
        html_page(r#"<img src="a/logo.png"><img src="b/logo.png">"#),
    )
    .await;
    mount_get(
        &mock_server,
        "/a/logo.png",
        ResponseTemplate::new(200).set_body_bytes(b"first".to_vec()),
    )
    .await;
    mount_get(
        &mock_server,
        "/b/logo.png",
        ResponseTemplate::new(200)
            .set_body_bytes(b"second".to_vec())
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");
    session
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(session.collection().unwrap().assets.len(), 2);

    let mut archive = download_in_memory(&mut session);
    assert_eq!(member_names(&archive), vec!["index.html", "logo.png"]);
    assert_eq!(read_member(&mut archive, "logo.png"), b"second");
}

#[tokio::test]
async fn test_new_fetch_replaces_previous_collection() {
    let mock_server = MockServer::start().await;

    mount_get(&mock_server, "/first", html_page(r#"<script src="first.js"></script>"#)).await;
    mount_get(&mock_server, "/second", html_page(r#"<script src="second.js"></script>"#)).await;
    mount_get(&mock_server, "/first.js", ResponseTemplate::new(200).set_body_string("1")).await;
    mount_get(&mock_server, "/second.js", ResponseTemplate::new(200).set_body_string("2")).await;
    mount_get(&mock_server, "/missing", ResponseTemplate::new(404)).await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");

    session
        .fetch(&format!("{}/first", mock_server.uri()))
        .await
        .expect("First fetch failed");
    session
        .fetch(&format!("{}/second", mock_server.uri()))
        .await
        .expect("Second fetch failed");

    let archive = download_in_memory(&mut session);
    assert_eq!(member_names(&archive), vec!["index.html", "second.js"]);

    // A failed run disables download again
    let result = session.fetch(&format!("{}/missing", mock_server.uri())).await;
    assert!(matches!(result, Err(BundleError::RootFetchFailed { .. })));
    assert!(!session.can_download());
    assert!(session.collection().is_none());
}

#[tokio::test]
async fn test_bundle_writes_configured_output() {
    let mock_server = MockServer::start().await;

    mount_get(&mock_server, "/", html_page(r#"<link rel="stylesheet" href="main.css">"#)).await;
    mount_get(&mock_server, "/main.css", ResponseTemplate::new(200).set_body_string("p{}")).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out").join("web_code.zip");
    let config = create_test_config(&output.display().to_string(), ReferenceScope::Prefix);

    let (report, summary) = bundle(config, &format!("{}/", mock_server.uri()))
        .await
        .expect("Bundle failed");

    assert_eq!(report.collected, 1);
    assert_eq!(summary.path.as_deref(), Some(output.as_path()));
    assert_eq!(summary.members, vec!["index.html", "main.css"]);

    let file = std::fs::File::open(&output).expect("Archive should exist");
    let archive = ZipArchive::new(file).expect("Archive should be readable");
    assert_eq!(archive.len(), 2);
}

#[tokio::test]
async fn test_archive_failure_keeps_download_enabled() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, "/", html_page("")).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");
    session
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    // Saving onto an existing directory cannot succeed
    let result = session.download_to_path(dir.path());
    assert!(matches!(result, Err(BundleError::ArchiveFailed(_))));
    assert_eq!(session.phase(), RunPhase::Ready);
    assert!(session.can_download());

    let retry = dir.path().join("retry.zip");
    let summary = session.download_to_path(&retry).expect("Retry failed");
    assert_eq!(summary.members, vec!["index.html"]);
    assert_eq!(session.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_abandoned_fetch_does_not_block_next_run() {
    let mock_server = MockServer::start().await;

    mount_get(
        &mock_server,
        "/slow",
        html_page("").set_delay(Duration::from_millis(500)),
    )
    .await;
    mount_get(&mock_server, "/fast", html_page(r#"<script src="app.js"></script>"#)).await;
    mount_get(&mock_server, "/app.js", ResponseTemplate::new(200).set_body_string("go()")).await;

    let config = create_test_config("unused.zip", ReferenceScope::Prefix);
    let mut session = Session::new(config).expect("Failed to create session");

    // Drop the fetch future while the root request is in flight
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        session.fetch(&format!("{}/slow", mock_server.uri())),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(session.phase(), RunPhase::FetchingRoot);
    assert!(!session.can_download());

    let report = session
        .fetch(&format!("{}/fast", mock_server.uri()))
        .await
        .expect("A new fetch must start after an abandoned one");
    assert_eq!(report.collected, 1);
    assert_eq!(session.phase(), RunPhase::Ready);

    let archive = download_in_memory(&mut session);
    assert_eq!(member_names(&archive), vec!["app.js", "index.html"]);
}
