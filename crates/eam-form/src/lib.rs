//! The asset capture form.
//!
//! [`AssetForm`] is the single owner of the draft record and everything
//! attached to it. The capture widgets in `eam-capture` report into it, it
//! validates and assembles the submission payload, and it decides between
//! sending the payload through an [`eam_core::sink::AssetSink`] and holding it
//! in the offline queue.

pub mod connectivity;
pub mod error;
pub mod form;
pub mod http;
pub mod notify;

#[cfg(test)]
mod tests;

pub use error::{Error, Result, SubmitError};
pub use form::{AssetForm, SubmitMode, SubmitOutcome};
pub use http::HttpAssetSink;
