use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ModelResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Chain error: {0}")]
    ChainError(String),

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    /// Non-success HTTP status, carrying the status code and the raw body
    #[error("Http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Serde deserialize error: {0}")]
    SerdeDeserialize(String),
}
