use crate::error::{Error, ModelResult};
use error_stack::{ResultExt, report};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::value::Value;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
}

/// Converts a JSON object into a query string with keys sorted alphabetically.
///
/// `null` values are skipped, strings are inserted verbatim and any other
/// value uses its JSON representation.
///
/// # Errors
///
/// Returns `Error::ParseError` if `value` is not a JSON object.
pub fn value_to_sorted_querystring(value: &Value) -> ModelResult<String> {
    let mut pairs: Vec<(String, String)> = match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Null))
            .map(|(k, v)| {
                let value_str = match v {
                    Value::String(s) => s.to_string(),
                    _ => v.to_string(),
                };
                (k.clone(), value_str)
            })
            .collect(),
        _ => {
            return Err(report!(Error::ParseError)
                .attach_printable(format!("Invalid JSON Object: {value:?}")));
        }
    };

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&"))
}

/// Deserializes a successful response body as JSON.
///
/// Any status >= 400 yields `Error::HttpStatus` carrying the raw body, so that
/// callers can still inspect API-specific error envelopes.
pub async fn handle_reqwest_response<T: DeserializeOwned>(response: Response) -> ModelResult<T> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .change_context(Error::ReqwestError(
            "Failed to get text from response".to_string(),
        ))?;

    if status >= 400 {
        error!("Error Body ({status}): {body}");
        return Err(report!(Error::HttpStatus { status, body }));
    }

    debug!("Response body ({status}): {body}");

    serde_json::from_str(&body)
        .change_context(Error::SerdeDeserialize(
            "Failed to deserialize JSON".to_string(),
        ))
        .attach_printable(body)
}
