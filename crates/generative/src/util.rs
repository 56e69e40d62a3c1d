//! Shared utility functions for the generative adapter.

use chat_domain::Error;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type, mapping
/// to [`Error::Generative`] rather than the transport-generic variants
/// since every caller of this module is already inside the generative
/// boundary.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Generative(e.to_string())
    }
}
