//! Attribute Decoder Service
//!
//! Turns a successful response body into `Attributes`.

use crate::domain::entities::Attributes;
use crate::domain::errors::FetchError;

pub struct AttributeDecoder;

impl AttributeDecoder {
    /// Decode a response body.
    ///
    /// An empty body or JSON `null` is an empty result ("not found"), not an
    /// error. Anything else that is not a JSON object, whitespace included,
    /// is `FetchError::Decode`.
    pub fn decode(body: &[u8]) -> Result<Attributes, FetchError> {
        if body.is_empty() {
            return Ok(Attributes::default());
        }

        let attrs: Option<Attributes> = serde_json::from_slice(body)?;
        Ok(attrs.unwrap_or_default())
    }
}
