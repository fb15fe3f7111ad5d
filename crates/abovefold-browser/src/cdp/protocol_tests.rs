use super::*;

#[test]
fn request_serializes_without_empty_fields() {
    let req = CdpRequest {
        id: 7,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert_eq!(json, r#"{"id":7,"method":"Page.enable"}"#);
}

#[test]
fn request_session_id_uses_camel_case() {
    let req = CdpRequest {
        id: 1,
        method: "Runtime.evaluate".to_string(),
        params: Some(serde_json::json!({"expression": "1+1"})),
        session_id: Some("SID".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains(r#""sessionId":"SID""#));
}

#[test]
fn response_and_event_both_decode() {
    let resp: CdpMessage =
        serde_json::from_str(r#"{"id":3,"result":{"frameId":"F1"},"sessionId":"S"}"#).unwrap();
    assert_eq!(resp.id, Some(3));
    assert!(resp.method.is_none());

    let event: CdpMessage =
        serde_json::from_str(r#"{"method":"Page.loadEventFired","params":{"timestamp":1.0}}"#)
            .unwrap();
    assert!(event.id.is_none());
    assert_eq!(event.method.as_deref(), Some("Page.loadEventFired"));
}

#[test]
fn error_body_decodes() {
    let resp: CdpMessage =
        serde_json::from_str(r#"{"id":9,"error":{"code":-32000,"message":"Target closed"}}"#)
            .unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.code, -32000);
    assert_eq!(err.message, "Target closed");
}

#[test]
fn browser_version_decodes_pascal_case() {
    let json = r#"{
        "Browser": "Chrome/120.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/abc"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/120.0.0.0");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}
