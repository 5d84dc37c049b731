use error_stack::{AttachmentKind, FrameKind, Report};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

pub type SdkResult<T> = error_stack::Result<T, Error>;

/// Caller-facing classification of a failed quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteErrorReason {
    /// Not enough liquidity on any route for the requested amount
    InsufficientAssetLiquidity,
    /// Every aggregator is either excluded or unavailable on the chain
    NoAggregatorAvailable,
    /// Upstream transport or API error
    UpstreamError,
    /// Upstream answered with something we could not interpret
    InvalidResponse,
}

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Reqwest error")]
    ReqwestError,

    #[error("Models error")]
    ModelsError,

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("No signer available. Please provide a signer when connecting")]
    MissingSigner,

    #[error("You cannot swap a token to itself")]
    SelfSwap,

    #[error("Duplicate order: {0}")]
    DuplicateOrder(String),

    #[error("{0}")]
    NothingToDo(String),

    #[error("No amount set on order")]
    NoAmountSet,

    #[error("Invalid slippage: {0}")]
    InvalidSlippage(String),

    #[error("Invalid portfolio id: {0}")]
    InvalidPortfolioId(String),

    #[error("Quote failed: {0}")]
    QuoteFailed(QuoteErrorReason),

    #[error("Arithmetic error: {0}")]
    ArithmeticError(String),

    #[error("Signer error")]
    SignerError,

    #[error("Abi error: {0}")]
    AbiError(String),
}

impl Error {
    /// Reason of a quote failure, if this error is one
    pub fn quote_failure_reason(&self) -> Option<QuoteErrorReason> {
        match self {
            Error::QuoteFailed(reason) => Some(*reason),
            _ => None,
        }
    }
}

pub trait ReportDisplayExt {
    fn format(&self) -> String;
}

impl ReportDisplayExt for Report<Error> {
    fn format(&self) -> String {
        // frames() walks from the newest frame down, attachments are listed oldest first
        let attachments: Vec<String> = self
            .frames()
            .filter_map(|frame| match frame.kind() {
                FrameKind::Attachment(AttachmentKind::Printable(attachment)) => {
                    Some(attachment.to_string())
                }
                _ => None,
            })
            .collect();

        attachments
            .iter()
            .rev()
            .map(|attachment| attachment.trim())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}
