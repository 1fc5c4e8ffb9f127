//! Opaque resume tokens for keyset pagination.
//!
//! A cursor is the pair (order value of the last row seen, primary key of
//! that row). The key must be the true primary key so the scan order stays
//! total even when order values repeat. One generic implementation covers
//! the string-, i32-, and i64-keyed flavors.

use crate::error::Error;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cursor<O, K> {
    pub order_value: O,
    pub key: K,
}

pub type TextCursor<O> = Cursor<O, String>;
pub type Int4Cursor<O> = Cursor<O, i32>;
pub type Int8Cursor<O> = Cursor<O, i64>;

impl<O, K> Cursor<O, K>
where
    O: Serialize + DeserializeOwned,
    K: Serialize + DeserializeOwned,
{
    pub fn new(order_value: O, key: K) -> Self {
        Cursor { order_value, key }
    }

    /// Structural serialization of the pair, then URL-safe base64. Tokens
    /// carry no version marker; a field-set change invalidates old tokens at
    /// decode instead of misparsing them.
    pub fn encode(&self) -> Result<String, Error> {
        let bytes = serde_json::to_vec(self).map_err(|e| Error::Internal(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// An empty token means "first page", not an error. A malformed token is
    /// a validation failure.
    pub fn decode(token: &str) -> Result<Option<Self>, Error> {
        if token.is_empty() {
            return Ok(None);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| Error::validation("cursor", format!("invalid cursor '{token}'")))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|_| Error::validation("cursor", format!("invalid cursor '{token}'")))
    }
}
