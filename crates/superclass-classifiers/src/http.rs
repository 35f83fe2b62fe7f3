//! Shared HTTP plumbing for the vendor backends.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use superclass_core::error::{ErrorCode, SuperclassError, SuperclassResult};
use superclass_core::traits::Prompt;
use superclass_core::types::{ModelConfig, Provider};

/// Default request timeout for backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the HTTP client shared by backends.
pub fn build_client(timeout: Duration) -> SuperclassResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SuperclassError::configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Resolve the API key from the config, falling back to `env`.
pub(crate) fn resolve_api_key_with<F>(
    config: &ModelConfig,
    provider: Provider,
    env: F,
) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    config
        .api_key()
        .map(str::to_string)
        .or_else(|| env(provider.api_key_env()).filter(|k| !k.trim().is_empty()))
        .map(SecretString::new)
}

/// Resolve the API key from the config or the process environment.
pub(crate) fn resolve_api_key(config: &ModelConfig, provider: Provider) -> Option<SecretString> {
    resolve_api_key_with(config, provider, |key| std::env::var(key).ok())
}

/// Parse an endpoint URL, requiring http or https.
pub(crate) fn parse_endpoint(endpoint: &str) -> SuperclassResult<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| SuperclassError::configuration(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SuperclassError::configuration(format!(
            "Unsupported endpoint scheme '{}'",
            other
        ))),
    }
}

/// Header value carrying a secret; marked sensitive so it is never logged.
pub(crate) fn secret_header(value: &str) -> SuperclassResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| SuperclassError::configuration("Invalid API key format"))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Headers for a bearer-token authenticated JSON request.
pub(crate) fn bearer_headers(api_key: Option<&SecretString>) -> SuperclassResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(key) = api_key {
        headers.insert(
            reqwest::header::AUTHORIZATION,
            secret_header(&format!("Bearer {}", key.expose_secret()))?,
        );
    }
    Ok(headers)
}

/// Headers authenticating through a vendor-specific key header.
pub(crate) fn key_header(name: &'static str, api_key: &SecretString) -> SuperclassResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(name), secret_header(api_key.expose_secret())?);
    Ok(headers)
}

/// Chat message in the OpenAI-style envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// System and user messages for a prompt.
pub(crate) fn chat_messages(prompt: &Prompt) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: prompt.user.clone(),
    });
    messages
}

#[derive(Debug, Deserialize)]
struct VendorErrorEnvelope {
    error: VendorErrorDetail,
}

#[derive(Debug, Deserialize)]
struct VendorErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Map a non-success response body to a transport error.
///
/// Understands the `{"error": {"message", "type", "code"}}` envelope used
/// by OpenAI, Azure and Anthropic; other bodies are kept verbatim.
pub(crate) fn status_error(provider: Provider, status: u16, body: &str) -> SuperclassError {
    let (message, vendor_code) = match serde_json::from_str::<VendorErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = match envelope.error.code {
                Some(serde_json::Value::String(code)) => Some(code),
                Some(serde_json::Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            };
            (
                envelope.error.message.unwrap_or_else(|| body.to_string()),
                code.or(envelope.error.kind),
            )
        }
        Err(_) => (body.trim().to_string(), None),
    };

    error!(
        provider = %provider,
        status,
        vendor_code = vendor_code.as_deref().unwrap_or(""),
        "Backend API request failed"
    );
    SuperclassError::http_status(status, vendor_code, format!("{} API error: {}", provider, message))
}

fn request_error(provider: Provider, err: reqwest::Error) -> SuperclassError {
    let code = if err.is_timeout() {
        ErrorCode::NetTimeout
    } else {
        ErrorCode::NetConnectionFailed
    };
    error!(provider = %provider, error = %err, timeout = err.is_timeout(), "Backend request failed");
    SuperclassError::Transport {
        message: format!("{} API request failed: {}", provider, err),
        code,
        status: err.status().map(|s| s.as_u16()),
        vendor_code: None,
        source: Some(Box::new(err)),
    }
}

/// POST `body` as JSON and return the response body of a 2xx reply.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    provider: Provider,
    url: &Url,
    headers: HeaderMap,
    body: &T,
) -> SuperclassResult<String> {
    debug!(provider = %provider, host = url.host_str().unwrap_or(""), "Sending backend request");

    let response = client
        .post(url.clone())
        .headers(headers)
        .json(body)
        .send()
        .await
        .map_err(|e| request_error(provider, e))?;

    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = response.text().await.map_err(|e| request_error(provider, e))?;

    if !status.is_success() {
        return Err(status_error(provider, status.as_u16(), &text));
    }

    debug!(
        provider = %provider,
        status = status.as_u16(),
        request_id = request_id.as_deref().unwrap_or(""),
        body_length = text.len(),
        "Backend response received"
    );
    Ok(text)
}

/// Parse a vendor envelope, attaching the raw body on failure.
pub(crate) fn parse_envelope<T: serde::de::DeserializeOwned>(
    provider: Provider,
    body: &str,
) -> SuperclassResult<T> {
    serde_json::from_str(body).map_err(|e| {
        SuperclassError::decode(format!("Failed to decode {} response: {}", provider, e), body)
    })
}

/// Error for an envelope that carried no completion text.
pub(crate) fn empty_reply(provider: Provider, body: &str) -> SuperclassError {
    SuperclassError::Decode {
        message: format!("No classification result received from {}", provider),
        code: ErrorCode::DecEmptyResponse,
        raw: body.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    /// Request captured by [`serve`].
    #[derive(Debug, Clone)]
    pub struct Captured {
        pub headers: HeaderMap,
        pub body: serde_json::Value,
    }

    /// Serve a canned reply on a loopback port; returns the base URL and
    /// the captured requests.
    pub async fn serve(
        status: StatusCode,
        reply: serde_json::Value,
    ) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let app = Router::new().route(
            "/*path",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let sink = Arc::clone(&sink);
                let reply = reply.clone();
                async move {
                    sink.lock().unwrap().push(Captured { headers, body });
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }
}
