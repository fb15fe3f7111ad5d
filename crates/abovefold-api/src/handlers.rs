//! Extraction endpoint handlers.
//!
//! Request/response bodies are camelCase JSON. The viewport token selects
//! the single- or dual-viewport flow; anything other than
//! "mobile"/"desktop"/"both" is a validation error.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use abovefold_core::ExtractOptions;
use abovefold_protocols::{
    DualExtractionResult, ExtractError, ExtractionResult, ValidationReport, ViewportProfile,
};

use crate::state::ApiState;

/// Body of `POST /api/extract`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Page to extract from.
    pub url: String,

    /// "mobile", "desktop" or "both". Defaults to "mobile".
    #[serde(default = "default_viewport")]
    pub viewport: String,

    /// Keep box/text shadows in the output.
    #[serde(default)]
    pub include_shadows: bool,

    /// User-agent override.
    pub user_agent: Option<String>,
}

fn default_viewport() -> String {
    "mobile".to_string()
}

/// Success body for a single-viewport extraction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleExtractResponse {
    pub success: bool,
    pub url: String,
    pub viewport: String,
    pub css: String,
    pub size: usize,
    pub extraction_time: u128,
    pub validation: ValidationReport,
    pub processing_time: u128,
}

/// Per-viewport block inside a dual-viewport response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportBlock {
    pub css: String,
    pub size: usize,
    pub extraction_time: u128,
}

impl From<&ExtractionResult> for ViewportBlock {
    fn from(result: &ExtractionResult) -> Self {
        Self {
            css: result.css.clone(),
            size: result.size,
            extraction_time: result.extraction_time_ms,
        }
    }
}

/// Combined block inside a dual-viewport response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedBlock {
    pub css: String,
    pub size: usize,
}

/// Success body for a dual-viewport extraction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DualExtractResponse {
    pub success: bool,
    pub url: String,
    pub viewport: String,
    pub mobile: ViewportBlock,
    pub desktop: ViewportBlock,
    pub combined: CombinedBlock,
    pub processing_time: u128,
}

impl DualExtractResponse {
    fn new(result: &DualExtractionResult, processing_time: u128) -> Self {
        Self {
            success: true,
            url: result.url.clone(),
            viewport: "both".to_string(),
            mobile: (&result.mobile).into(),
            desktop: (&result.desktop).into(),
            combined: CombinedBlock {
                css: result.combined.css.clone(),
                size: result.combined.size,
            },
            processing_time,
        }
    }
}

/// Failure body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub processing_time: u128,
}

/// Map a classified extraction error to an HTTP status: validation failures
/// are the client's fault, everything else is a server-side failure.
pub fn status_for(error: &ExtractError) -> StatusCode {
    match error.kind() {
        "validation_error" => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &ExtractError, started: Instant) -> Response {
    let body = ErrorResponse {
        error: error.kind().to_string(),
        message: error.to_string(),
        processing_time: started.elapsed().as_millis(),
    };
    (status_for(error), Json(body)).into_response()
}

/// `POST /api/extract`.
pub async fn extract(
    State(state): State<ApiState>,
    Json(request): Json<ExtractRequest>,
) -> Response {
    let started = Instant::now();
    info!("Extraction request for {} ({})", request.url, request.viewport);

    let viewport = match request.viewport.as_str() {
        "mobile" => ViewportProfile::mobile(),
        "desktop" => ViewportProfile::desktop(),
        "both" => ViewportProfile::mobile(),
        other => {
            let err = ExtractError::validation(format!(
                "unsupported viewport {:?}; expected \"mobile\", \"desktop\" or \"both\"",
                other
            ));
            return error_response(&err, started);
        }
    };

    let options = ExtractOptions {
        viewport,
        timeout: None,
        include_shadows: request.include_shadows,
        user_agent: request.user_agent.clone(),
    };

    if request.viewport == "both" {
        match state
            .extractor
            .extract_for_both_viewports(&request.url, &options)
            .await
        {
            Ok(result) => {
                let body = DualExtractResponse::new(&result, started.elapsed().as_millis());
                (StatusCode::OK, Json(body)).into_response()
            }
            Err(e) => {
                error!("Dual extraction for {} failed: {}", request.url, e);
                error_response(&e, started)
            }
        }
    } else {
        match state
            .extractor
            .extract_critical_css(&request.url, &options)
            .await
        {
            Ok(result) => {
                let validation = state.extractor.validate_extraction(&result);
                let body = SingleExtractResponse {
                    success: true,
                    url: result.url,
                    viewport: result.viewport,
                    css: result.css,
                    size: result.size,
                    extraction_time: result.extraction_time_ms,
                    validation,
                    processing_time: started.elapsed().as_millis(),
                };
                (StatusCode::OK, Json(body)).into_response()
            }
            Err(e) => {
                error!("Extraction for {} failed: {}", request.url, e);
                error_response(&e, started)
            }
        }
    }
}

/// `GET /healthz`. Liveness only; does not touch the browser.
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_mobile() {
        let req: ExtractRequest =
            serde_json::from_str(r#"{"url": "https://example.test"}"#).unwrap();
        assert_eq!(req.viewport, "mobile");
        assert!(!req.include_shadows);
        assert!(req.user_agent.is_none());
    }

    #[test]
    fn request_accepts_camel_case_options() {
        let req: ExtractRequest = serde_json::from_str(
            r#"{"url": "https://x.test", "viewport": "both",
                "includeShadows": true, "userAgent": "TestBot/1.0"}"#,
        )
        .unwrap();
        assert_eq!(req.viewport, "both");
        assert!(req.include_shadows);
        assert_eq!(req.user_agent.as_deref(), Some("TestBot/1.0"));
    }

    #[test]
    fn single_response_uses_contract_field_names() {
        let body = SingleExtractResponse {
            success: true,
            url: "https://x.test".to_string(),
            viewport: "mobile".to_string(),
            css: ".a{color:red}".to_string(),
            size: 13,
            extraction_time: 1200,
            validation: ValidationReport::ok(),
            processing_time: 1250,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""extractionTime":1200"#));
        assert!(json.contains(r#""processingTime":1250"#));
        assert!(json.contains(r#""isValid":true"#));
    }

    #[test]
    fn error_response_uses_contract_field_names() {
        let body = ErrorResponse {
            error: "timeout_error".to_string(),
            message: "extraction exceeded 20000ms".to_string(),
            processing_time: 20001,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""error":"timeout_error""#));
        assert!(json.contains(r#""processingTime":20001"#));
    }

    #[test]
    fn validation_errors_map_to_400_everything_else_to_500() {
        assert_eq!(
            status_for(&ExtractError::validation("bad url")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ExtractError::timeout("too slow")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&ExtractError::network("dns failed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&ExtractError::rendering("crashed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dual_response_shape() {
        use abovefold_protocols::{CombinedCss, ExtractionResult};

        let mobile = ExtractionResult::new(".a{color:red}".into(), "mobile", "https://x.test", 900);
        let desktop =
            ExtractionResult::new(".a{color:blue}".into(), "desktop", "https://x.test", 800);
        let dual = DualExtractionResult {
            url: "https://x.test".to_string(),
            mobile,
            desktop,
            combined: CombinedCss { css: ".a{color:red}".to_string(), size: 13 },
        };
        let body = DualExtractResponse::new(&dual, 1800);
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""viewport":"both""#));
        assert!(json.contains(r#""mobile":{"#));
        assert!(json.contains(r#""combined":{"#));
        assert!(json.contains(r#""processingTime":1800"#));
    }
}
