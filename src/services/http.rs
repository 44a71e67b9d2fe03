//! Shared response handling for the REST clients.

use crate::error::AppError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Decode a successful JSON response or map the failure to an `AppError`.
///
/// `service` names the remote side in messages (e.g., "Tracker").
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
    service: &str,
) -> Result<T, AppError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)));
    }

    let status_code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body)
        .map(|m| format!("{}: {}", service, m))
        .unwrap_or_else(|| format!("{} request failed ({}): {}", service, status_code, body));

    Err(AppError::provider_full(message, status_code, endpoint))
}

/// Pick a readable message for an error status, preferring the API's own text.
fn error_message(status: StatusCode, body: &str) -> Option<String> {
    match status {
        StatusCode::UNAUTHORIZED => return Some("token expired or revoked".to_string()),
        StatusCode::FORBIDDEN => return Some("access denied".to_string()),
        StatusCode::NOT_FOUND => return Some("resource not found".to_string()),
        StatusCode::TOO_MANY_REQUESTS => return Some("rate limit exceeded".to_string()),
        _ => {}
    }

    // Both APIs report errors as {"message": "..."}; the tracker also uses
    // {"errorMessages": ["..."]}
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .or_else(|| {
            value
                .get("errorMessages")
                .and_then(|m| m.as_array())
                .and_then(|a| a.first())
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
}

/// One-shot local HTTP server for client tests.
#[cfg(test)]
pub(crate) mod test_server {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer the next request with `status` and a JSON `body`.
    ///
    /// Returns the base URL and a handle yielding the raw request head.
    pub(crate) fn respond_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }
}
