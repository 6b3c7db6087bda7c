//! Request bodies.

use bytes::Bytes;

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Raw bytes, sent as-is.
    Bytes(Bytes),
    /// Text, sent as UTF-8.
    Text(String),
    /// Url-encoded form fields, in insertion order.
    Form(Vec<(String, String)>),
}

impl Body {
    /// Encode the body for the wire.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::Bytes(bytes) => bytes.clone(),
            Body::Text(text) => Bytes::from(text.clone()),
            Body::Form(fields) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter())
                    .finish();
                Bytes::from(encoded)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
