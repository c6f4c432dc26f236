use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Normalized result of one tool invocation.
///
/// The invoker never fails: transport errors, timeouts, non-success statuses,
/// and semantically empty responses all land here as `success: false`.
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl InvocationOutcome {
    fn ok(data: Value) -> Self {
        InvocationOutcome {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail<T: Into<String>>(error: T) -> Self {
        InvocationOutcome {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    fn fail_with_data<T: Into<String>>(error: T, data: Value) -> Self {
        InvocationOutcome {
            success: false,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}

/// Executes exactly one tool call. Retries are the orchestrator's concern,
/// and happen via fallback tools rather than by repeating the same endpoint.
pub struct ToolInvoker {
    client: reqwest::Client,
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(timeout: Duration) -> Self {
        ToolInvoker {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn from_timeout_ms(timeout_ms: u64) -> Self {
        Self::new(Duration::from_millis(timeout_ms))
    }

    /// POST the opaque params payload to the tool endpoint and normalize the
    /// response. A well-formed 2xx body carrying an `error` field with no
    /// usable primary payload is still a failure for orchestration purposes.
    pub async fn invoke(&self, tool_name: &str, endpoint: &str, params: &Value) -> InvocationOutcome {
        debug!("invoking tool {} via {}", tool_name, endpoint);

        let response = match self
            .client
            .post(endpoint)
            .json(params)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("tool {} transport failure: {}", tool_name, e);
                return InvocationOutcome::fail(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("tool {} failed: HTTP {}", tool_name, status.as_u16());
            return InvocationOutcome::fail(format!("HTTP {}: {}", status.as_u16(), body));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                error!("tool {} returned unparseable body: {}", tool_name, e);
                return InvocationOutcome::fail(format!("Invalid JSON response: {}", e));
            }
        };

        if let Some(embedded) = embedded_error(&body) {
            return InvocationOutcome::fail_with_data(embedded, body);
        }

        InvocationOutcome::ok(body)
    }
}

/// Detect the embedded-error case: a top-level `error` field alongside an
/// otherwise empty payload. Responses that carry usable data next to an error
/// field are treated as successes.
fn embedded_error(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    let error = object.get("error")?;
    if error.is_null() {
        return None;
    }

    let has_payload = object
        .iter()
        .filter(|(key, _)| key.as_str() != "error")
        .any(|(_, value)| is_usable(value));
    if has_payload {
        return None;
    }

    Some(match error {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
