//! Execution proxy: forwards code-run requests to a Judge0-compatible
//! judge service and relays a normalized result.
//!
//! Stateless — each request is one outbound call with base64 transfer
//! disabled and server-side wait enabled, bounded by the client's
//! configured timeout. Upstream failures of any kind surface to the
//! caller as a generic 500; detail stays in the server log.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub language_id: u32,
    pub source_code: String,
    #[serde(default)]
    pub stdin: String,
}

/// Normalized judge verdict returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Judge wire shape — only the fields the relay forwards.
#[derive(Debug, Deserialize)]
struct JudgeResponse {
    stdout: Option<String>,
    stderr: Option<String>,
    status: Option<JudgeStatus>,
}

#[derive(Debug, Deserialize)]
struct JudgeStatus {
    description: Option<String>,
}

/// POST /run — submit code to the judge and wait for the verdict.
/// Body: { "language_id": 71, "source_code": "...", "stdin": "" }
pub async fn run_code(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, (StatusCode, Json<ErrorBody>)> {
    tracing::debug!(language_id = req.language_id, "Forwarding execution request");

    let url = format!(
        "{}/submissions?base64_encoded=false&wait=true",
        state.judge_url.trim_end_matches('/')
    );

    let mut request = state
        .http
        .post(&url)
        .header("X-RapidAPI-Key", &state.judge_api_key)
        .json(&serde_json::json!({
            "language_id": req.language_id,
            "source_code": req.source_code,
            "stdin": req.stdin,
        }));
    if let Some(host) = judge_host(&state.judge_url) {
        request = request.header("X-RapidAPI-Host", host);
    }

    let response = request
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| {
            tracing::error!(error = %e, "Judge request failed");
            execution_failed()
        })?;

    let judge: JudgeResponse = response.json().await.map_err(|e| {
        tracing::error!(error = %e, "Judge response body could not be parsed");
        execution_failed()
    })?;

    Ok(Json(RunResponse {
        stdout: judge.stdout,
        stderr: judge.stderr,
        status: judge
            .status
            .and_then(|s| s.description)
            .unwrap_or_else(|| "Unknown Status".to_string()),
    }))
}

fn execution_failed() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Execution failed".to_string(),
        }),
    )
}

fn judge_host(judge_url: &str) -> Option<String> {
    reqwest::Url::parse(judge_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_defaults_to_empty() {
        let req: RunRequest =
            serde_json::from_str(r#"{"language_id":71,"source_code":"print('hi')"}"#).unwrap();
        assert_eq!(req.language_id, 71);
        assert_eq!(req.stdin, "");
    }

    #[test]
    fn judge_host_comes_from_the_configured_url() {
        assert_eq!(
            judge_host("https://judge0-ce.p.rapidapi.com").as_deref(),
            Some("judge0-ce.p.rapidapi.com")
        );
        assert_eq!(judge_host("not a url"), None);
    }

    #[test]
    fn missing_status_normalizes_to_unknown() {
        let judge: JudgeResponse = serde_json::from_str(r#"{"stdout":"hi\n"}"#).unwrap();
        let status = judge
            .status
            .and_then(|s| s.description)
            .unwrap_or_else(|| "Unknown Status".to_string());
        assert_eq!(status, "Unknown Status");
    }
}
