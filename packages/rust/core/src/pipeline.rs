//! End-to-end pipeline: discovery → fetch → merge → normalize → write.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use userdb_normalize::normalize_user;
use userdb_shared::{AppConfig, OutputFormat, Result, User};
use userdb_sources::{Retriever, Source};

use crate::aggregator::aggregate;
use crate::merge::merge_and_sort;
use crate::output;
use crate::progress::{Progress, ProgressObserver};

/// Result of writing a database file.
#[derive(Debug)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub format: OutputFormat,
    /// Number of merged records written.
    pub user_count: usize,
    /// Size of the written file in bytes.
    pub bytes: usize,
    /// Total elapsed time, fetching included.
    pub elapsed: Duration,
}

/// Build the merged, sorted and normalized user list.
///
/// 1. Discover special registries (any failure aborts before fetching)
/// 2. Fetch all registries concurrently
/// 3. Merge by identifier in job order
/// 4. Normalize text fields
#[instrument(skip_all)]
pub async fn users(
    config: &AppConfig,
    observer: Option<&dyn ProgressObserver>,
) -> Result<Vec<User>> {
    let retriever = Retriever::new(&config.http)?;

    // --- Phase 1: Discovery ---
    let special_urls = userdb_discovery::discover(&retriever, &config.sources).await?;

    // --- Phase 2: Fetch ---
    let mut sources = Source::mandatory(&config.sources, config.sanity.min_quoted_lines);
    sources.extend(special_urls.into_iter().map(Source::special));

    let mut progress = Progress::new(observer);
    let fetched = aggregate(&retriever, sources, &mut progress).await?;

    // --- Phase 3: Merge ---
    let mut users = merge_and_sort(fetched)?;

    // --- Phase 4: Normalize ---
    users.iter_mut().for_each(normalize_user);

    progress.finish();
    info!(users = users.len(), "user database ready");

    Ok(users)
}

/// Build the user list and write it to `path` in the given layout.
///
/// The file is only touched once the list is complete, so a failed run
/// leaves any previous file in place.
#[instrument(skip(config, observer), fields(path = %path.display()))]
pub async fn write_users_file(
    path: &Path,
    format: OutputFormat,
    config: &AppConfig,
    observer: Option<&dyn ProgressObserver>,
) -> Result<WriteSummary> {
    let start = Instant::now();

    let users = users(config, observer).await?;
    let bytes = output::write_file(path, format, &users)?;

    let summary = WriteSummary {
        path: path.to_path_buf(),
        format,
        user_count: users.len(),
        bytes,
        elapsed: start.elapsed(),
    };

    info!(
        users = summary.user_count,
        bytes = summary.bytes,
        elapsed_ms = summary.elapsed.as_millis(),
        "user database written"
    );

    Ok(summary)
}

/// Write the length-prefixed md380tools layout.
pub async fn write_md380tools_file(
    path: &Path,
    config: &AppConfig,
    observer: Option<&dyn ProgressObserver>,
) -> Result<WriteSummary> {
    write_users_file(path, OutputFormat::Md380Tools, config, observer).await
}

/// Write the plain MD-2017 layout.
pub async fn write_md2017_file(
    path: &Path,
    config: &AppConfig,
    observer: Option<&dyn ProgressObserver>,
) -> Result<WriteSummary> {
    write_users_file(path, OutputFormat::Md2017, config, observer).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use url::Url;
    use userdb_shared::{SourcesConfig, UserDbError};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::progress::MAX_PROGRESS;

    const FIXED: &str = "1000001,FIXCALL\n1000003,W1FIX\n";
    const HAMDIGITAL: &str = concat!(
        "\"1000001\",\"HDCALL\",\"Ham Name\",\"Ham City\",\"Ham State\",\"Ham Country\"\n",
        "\"1000002\",\"HD2\",\"Only Ham\",\"\",\"\",\"\"\n",
    );
    const RADIOID: &str = concat!(
        "\"1000001\",\"RIDCALL\",\"Radioid Name\",\"\",\"\",\"Radioid Country\"\n",
        "\"#1000004\",\"N4ID\",\"José,  Núñez\",\"Town\",\"\",\"USA\"\n",
    );
    const REFLECTOR: &str = "header\n4000@XLX000@Reflector\n";
    const SPECIAL: &str = "ID,Call,Name,City,State,Nick,Country\n1000002,SPEC2,Special Name,,,,Special Land\n";

    fn url(server: &MockServer, route: &str) -> Url {
        Url::parse(&format!("{}{route}", server.uri())).unwrap()
    }

    /// Config pointing every registry at `server`.
    fn config_for(server: &MockServer, min_quoted_lines: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.sources = SourcesConfig {
            fixed_url: url(server, "/fixed.csv"),
            hamdigital_url: url(server, "/hamdigital.csv"),
            radioid_url: url(server, "/radioid.csv"),
            reflector_url: url(server, "/reflector.db"),
            special_directory_url: url(server, "/api/node.php"),
            special_path: "md380tools/special_IDs.csv".into(),
        };
        config.sanity.min_quoted_lines = min_quoted_lines;
        config
    }

    async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn ok(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(body)
    }

    /// Directory listing `count` special nodes, all served by `server`.
    fn directory(server: &MockServer, count: usize) -> String {
        let address = server.address().to_string();
        let nodes: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"id":"{i}","country":"XX","address":"{address}"}}"#))
            .collect();
        format!("[{}]", nodes.join(","))
    }

    async fn mount_registries(server: &MockServer, specials: usize) {
        mount(server, "/fixed.csv", ok(FIXED)).await;
        // Slowest job; its position in the job list still decides conflicts.
        mount(
            server,
            "/hamdigital.csv",
            ok(HAMDIGITAL).set_delay(Duration::from_millis(300)),
        )
        .await;
        mount(server, "/radioid.csv", ok(RADIOID)).await;
        mount(server, "/reflector.db", ok(REFLECTOR)).await;
        mount(server, "/api/node.php", ok(&directory(server, specials))).await;
        mount(server, "/md380tools/special_IDs.csv", ok(SPECIAL)).await;
    }

    #[tokio::test]
    async fn merges_in_job_order_regardless_of_completion_order() {
        let server = MockServer::start().await;
        mount_registries(&server, 1).await;

        let users = users(&config_for(&server, 2), None).await.unwrap();

        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["4000", "1000001", "1000002", "1000003", "1000004"]);

        let merged = &users[1];
        assert_eq!(merged.callsign, "RIDCALL");
        assert_eq!(merged.name, "Radioid Name");
        assert_eq!(merged.city, "Ham City");
        assert_eq!(merged.state, "Ham State");
        assert_eq!(merged.country, "Radioid Country");

        let special = &users[2];
        assert_eq!(special.callsign, "SPEC2");
        assert_eq!(special.name, "Special Name");
        assert_eq!(special.country, "Special Land");

        let normalized = &users[4];
        assert_eq!(normalized.name, "Jose; Nunez");
        assert_eq!(users[0].callsign, "XLX000");
    }

    #[tokio::test]
    async fn progress_reports_each_job_plus_start_and_finish() {
        let server = MockServer::start().await;
        mount_registries(&server, 2).await;

        let calls = Mutex::new(Vec::new());
        let observer = |current: u64| {
            calls.lock().unwrap().push(current);
            true
        };

        users(&config_for(&server, 2), Some(&observer)).await.unwrap();

        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.len(), 8);
        assert_eq!(calls[0], 0);
        assert_eq!(calls[6], 6 * (MAX_PROGRESS / 6));
        assert_eq!(calls[7], MAX_PROGRESS);
    }

    #[tokio::test]
    async fn declining_observer_cancels_the_run() {
        let server = MockServer::start().await;
        mount_registries(&server, 2).await;

        let count = Mutex::new(0usize);
        let observer = |_current: u64| {
            let mut n = count.lock().unwrap();
            *n += 1;
            *n != 3
        };

        let err = users(&config_for(&server, 2), Some(&observer)).await.unwrap_err();
        assert!(matches!(err, UserDbError::Cancelled));
        assert_eq!(count.into_inner().unwrap(), 3);
    }

    #[tokio::test]
    async fn discovery_failure_prevents_any_fetch() {
        let server = MockServer::start().await;
        mount(&server, "/api/node.php", ok("{ this is not json")).await;
        for route in ["/fixed.csv", "/hamdigital.csv", "/radioid.csv", "/reflector.db"] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ok(""))
                .expect(0)
                .mount(&server)
                .await;
        }

        let err = users(&config_for(&server, 2), None).await.unwrap_err();
        assert!(matches!(err, UserDbError::Decode { .. }));
        server.verify().await;
    }

    #[tokio::test]
    async fn short_quoted_feed_fails_the_run() {
        let server = MockServer::start().await;
        mount_registries(&server, 0).await;

        let err = users(&config_for(&server, 50_000), None).await.unwrap_err();
        assert!(matches!(err, UserDbError::TooFewEntries { min: 50_000, .. }));
    }

    #[tokio::test]
    async fn failing_special_registry_is_ignored() {
        let server = MockServer::start().await;
        mount(&server, "/fixed.csv", ok(FIXED)).await;
        mount(&server, "/hamdigital.csv", ok(HAMDIGITAL)).await;
        mount(&server, "/radioid.csv", ok(RADIOID)).await;
        mount(&server, "/reflector.db", ok(REFLECTOR)).await;
        mount(&server, "/api/node.php", ok(&directory(&server, 1))).await;
        mount(&server, "/md380tools/special_IDs.csv", ResponseTemplate::new(500)).await;

        let users = users(&config_for(&server, 2), None).await.unwrap();
        assert_eq!(users.len(), 5);
        assert_eq!(users[2].callsign, "HD2");
    }

    #[tokio::test]
    async fn bad_identifier_in_mandatory_feed_is_fatal() {
        let server = MockServer::start().await;
        mount_registries(&server, 0).await;
        mount(&server, "/fixed-broken.csv", ok("1000001,OK\nabc,BAD\n")).await;

        let mut config = config_for(&server, 2);
        config.sources.fixed_url = url(&server, "/fixed-broken.csv");

        let err = users(&config, None).await.unwrap_err();
        match err {
            UserDbError::InvalidId { id } => assert_eq!(id, "abc"),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn writes_both_layouts() {
        let server = MockServer::start().await;
        mount_registries(&server, 1).await;
        let config = config_for(&server, 2);
        let dir = tempfile::tempdir().unwrap();

        let sized = dir.path().join("md380.csv");
        let summary = write_md380tools_file(&sized, &config, None).await.unwrap();
        assert_eq!(summary.user_count, 5);
        assert_eq!(summary.format, OutputFormat::Md380Tools);
        let contents = std::fs::read_to_string(&sized).unwrap();
        let (header, body) = contents.split_once('\n').unwrap();
        assert_eq!(header.parse::<usize>().unwrap(), body.len());
        assert!(body.starts_with("4000,XLX000,,,,,\n"));
        assert!(body.contains("1000001,RIDCALL,Radioid Name,Ham City,Ham State,,Radioid Country\n"));

        let plain = dir.path().join("md2017.csv");
        write_md2017_file(&plain, &config, None).await.unwrap();
        let contents = std::fs::read_to_string(&plain).unwrap();
        assert!(contents.contains("1000001,RIDCALL,Radioid Name,,Ham City,Ham State,Radioid Country\n"));
        assert_eq!(contents.lines().count(), 5);
    }

    #[tokio::test]
    async fn failed_run_leaves_existing_file_alone() {
        let server = MockServer::start().await;
        mount(&server, "/api/node.php", ResponseTemplate::new(503)).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("users.csv");
        std::fs::write(&target, "previous\n").unwrap();

        let err = write_md2017_file(&target, &config_for(&server, 2), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UserDbError::Status { .. }));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous\n");
    }
}
