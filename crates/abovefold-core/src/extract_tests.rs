use super::*;

fn result_with(css: &str) -> ExtractionResult {
    ExtractionResult::new(css.to_string(), "mobile", "https://example.test", 1200)
}

#[test]
fn url_validation_accepts_http_and_https() {
    assert!(validate_url("https://example.test/page").is_ok());
    assert!(validate_url("http://example.test").is_ok());
}

#[test]
fn url_validation_rejects_other_schemes() {
    for url in ["ftp://example.test", "file:///etc/passwd", "javascript:alert(1)"] {
        let err = validate_url(url).unwrap_err();
        assert_eq!(err.kind(), "validation_error", "{} should be rejected", url);
    }
}

#[test]
fn url_validation_rejects_garbage() {
    assert_eq!(validate_url("not a url").unwrap_err().kind(), "validation_error");
    assert_eq!(validate_url("").unwrap_err().kind(), "validation_error");
}

#[test]
fn empty_css_fails_validation() {
    let report = validate_result(&result_with("   \n  "));
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("empty"));
}

#[test]
fn small_output_passes_validation() {
    let report = validate_result(&result_with(".hero{color:red}"));
    assert!(report.is_valid);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn oversized_output_warns_but_stays_valid() {
    let big = "x".repeat(20_000);
    let report = validate_result(&result_with(&big));
    assert!(report.is_valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("20000 bytes"));
}

#[test]
fn combined_prefers_mobile_order() {
    let mobile = ".hero{color:red}.nav{display:flex}";
    let desktop = ".nav{display:flex}.sidebar{width:200px}";
    let combined = combine_css(mobile, desktop);
    // Mobile rules first in their order; the shared `.nav` rule keeps its
    // mobile position; desktop-only rules follow.
    assert_eq!(combined, ".hero{color:red}.nav{display:flex}.sidebar{width:200px}");
}

#[test]
fn combined_keeps_media_scoped_duplicates_distinct() {
    let mobile = ".hero{font-size:18px}";
    let desktop = "@media (min-width:768px){.hero{font-size:32px}}";
    let combined = combine_css(mobile, desktop);
    assert_eq!(
        combined,
        ".hero{font-size:18px}@media (min-width:768px){.hero{font-size:32px}}"
    );
}

#[test]
fn combining_identical_outputs_is_a_noop() {
    let css = ".hero{color:red}@font-face{font-family:X;src:url(x.woff2)}";
    assert_eq!(combine_css(css, css), css);
}

#[tokio::test]
async fn deadline_covers_session_creation() {
    use abovefold_browser::{ChromeConfig, SessionManager};
    use abovefold_protocols::PerformanceProfile;

    // A debug endpoint that accepts connections but never answers HTTP:
    // session creation must still resolve within the request deadline.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let sessions = Arc::new(SessionManager::new(
        ChromeConfig { debug_port: port, ..ChromeConfig::default() },
        PerformanceProfile::default(),
    ));
    let extractor = Extractor::new(sessions);
    let options = ExtractOptions {
        timeout: Some(Duration::from_millis(100)),
        ..ExtractOptions::default()
    };

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        extractor.extract_critical_css("https://example.test", &options),
    )
    .await;

    let err = outcome
        .expect("extraction must resolve within its deadline")
        .unwrap_err();
    assert_eq!(err.kind(), "timeout_error");
}

#[test]
fn default_options_target_mobile() {
    let options = ExtractOptions::default();
    assert_eq!(options.viewport.label(), "mobile");
    assert!(options.timeout.is_none());
    assert!(!options.include_shadows);
}
