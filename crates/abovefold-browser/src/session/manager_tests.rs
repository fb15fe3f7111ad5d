use super::*;

fn manager() -> SessionManager {
    SessionManager::new(ChromeConfig::default(), PerformanceProfile::default())
}

#[tokio::test]
async fn starts_with_no_open_contexts() {
    let mgr = manager();
    assert_eq!(mgr.open_contexts().await, 0);
}

#[tokio::test]
async fn close_all_is_idempotent_without_browser() {
    let mgr = manager();
    mgr.close_all().await;
    mgr.close_all().await;
    assert_eq!(mgr.open_contexts().await, 0);
}

#[test]
fn limiter_is_sized_from_profile() {
    let profile = PerformanceProfile { max_contexts: 2, ..Default::default() };
    let mgr = SessionManager::new(ChromeConfig::default(), profile);
    assert_eq!(mgr.limiter.available_permits(), 2);
}

#[test]
fn profile_is_exposed() {
    let mgr = manager();
    assert_eq!(mgr.performance_profile().max_contexts, 4);
}
