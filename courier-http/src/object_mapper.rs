//! Pluggable body (de)serialization.
//!
//! Mappers work on `serde_json::Value` so that they stay object safe and
//! can be swapped per request behind an `Arc`. Typed conversion happens in
//! the generic helpers below via serde.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::MapperError;

/// Converts between wire bytes and a structured value.
pub trait ObjectMapper: Send + Sync + fmt::Debug {
    /// Encode a value for a request body.
    fn write_value(&self, value: &serde_json::Value) -> Result<Vec<u8>, MapperError>;

    /// Decode a response body.
    fn read_value(&self, bytes: &[u8]) -> Result<serde_json::Value, MapperError>;
}

/// Default JSON mapper backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonObjectMapper;

impl ObjectMapper for JsonObjectMapper {
    fn write_value(&self, value: &serde_json::Value) -> Result<Vec<u8>, MapperError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn read_value(&self, bytes: &[u8]) -> Result<serde_json::Value, MapperError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Serialize any value through a mapper.
pub fn write_as<T: Serialize + ?Sized>(
    mapper: &dyn ObjectMapper,
    value: &T,
) -> Result<Vec<u8>, MapperError> {
    let value = serde_json::to_value(value)?;
    mapper.write_value(&value)
}

/// Deserialize bytes into `T` through a mapper.
pub fn read_as<T: DeserializeOwned>(
    mapper: &dyn ObjectMapper,
    bytes: &[u8],
) -> Result<T, MapperError> {
    let value = mapper.read_value(bytes)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn test_json_mapper_typed_helpers() {
        let mapper = JsonObjectMapper;
        let bytes = write_as(&mapper, &User { id: 7, name: "ada".into() }).unwrap();
        let user: User = read_as(&mapper, &bytes).unwrap();
        assert_eq!(user, User { id: 7, name: "ada".into() });
    }

    #[test]
    fn test_read_as_wrong_shape_fails() {
        let result: Result<User, _> = read_as(&JsonObjectMapper, br#"{"id":"seven"}"#);
        assert!(result.is_err());
    }
}
