//! Error type for the greeting card crate.
//!
//! Only setup and DOM plumbing produce errors. Media load failures and play
//! rejections are routine outcomes and travel as [`crate::audio::MediaEvent`]s.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum CardError {
    /// No global `window` (not running in a browser).
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    /// A DOM / web API call threw.
    #[error("DOM call failed: {0}")]
    Dom(String),

    /// An entry point was called before `start_card`.
    #[error("card not started")]
    NotStarted,

    /// `initialize` called on a controller that already owns a resource.
    #[error("audio controller already initialized")]
    AlreadyInitialized,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("logging init failed: {0}")]
    LoggingInit(String),

    #[cfg(feature = "serde_json")]
    #[error("failed to parse config JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl From<JsValue> for CardError {
    fn from(value: JsValue) -> Self {
        let msg = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        CardError::Dom(msg)
    }
}

impl From<CardError> for JsValue {
    fn from(err: CardError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CardError>;
