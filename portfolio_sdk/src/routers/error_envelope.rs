use error_stack::Report;
use portfolio_models::error::Error as ModelError;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, QuoteErrorReason};

const INSUFFICIENT_ASSET_LIQUIDITY: &str = "INSUFFICIENT_ASSET_LIQUIDITY";

/// Error bodies returned by the aggregator APIs.
///
/// ParaSwap answers `{"error": "..."}` or `{"message": "...", "status": ...}`,
/// 0x answers `{"code": .., "reason": "...", "validationErrors": [..]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorEnvelope {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// `error` wins over `message` when both are present
    pub fn error_text(&self) -> Option<&String> {
        self.error.as_ref().or(self.message.as_ref())
    }

    pub fn message(&self) -> Option<String> {
        let mut parts: Vec<String> = self
            .error_text()
            .into_iter()
            .chain(self.reason.iter())
            .cloned()
            .collect();
        parts.extend(self.validation_errors.iter().map(|v| {
            format!(
                "{}: {}",
                v.field.as_deref().unwrap_or("?"),
                v.reason.as_deref().unwrap_or("?")
            )
        }));
        if let Some(status) = &self.status {
            parts.push(format!("({status})"));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    pub fn reason(&self) -> QuoteErrorReason {
        let liquidity_validation = self
            .validation_errors
            .iter()
            .any(|v| v.reason.as_deref() == Some(INSUFFICIENT_ASSET_LIQUIDITY));
        let liquidity_message = self
            .error_text()
            .into_iter()
            .chain(self.reason.iter())
            .any(|m| is_liquidity_message(m));
        if liquidity_validation || liquidity_message {
            QuoteErrorReason::InsufficientAssetLiquidity
        } else {
            QuoteErrorReason::UpstreamError
        }
    }
}

fn is_liquidity_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("liquidity") || message.contains("no routes")
}

/// Turns a failed API call into a classified quote failure
pub fn classify_api_error(report: Report<ModelError>) -> Report<Error> {
    let (reason, message) = match report.current_context() {
        ModelError::HttpStatus { status, body } => match ApiErrorEnvelope::parse(body) {
            Some(envelope) => (
                envelope.reason(),
                envelope.message().unwrap_or_else(|| body.clone()),
            ),
            None => (
                QuoteErrorReason::UpstreamError,
                format!("HTTP {status}: {body}"),
            ),
        },
        ModelError::SerdeDeserialize(msg) => (QuoteErrorReason::InvalidResponse, msg.clone()),
        other => (QuoteErrorReason::UpstreamError, other.to_string()),
    };
    report
        .change_context(Error::QuoteFailed(reason))
        .attach_printable(message)
}
