// Courier - a fluent HTTP client for Rust
//
// Build requests declaratively, execute them blocking or on tokio, and work
// with typed responses classified as success or failure.

// Re-export the client
pub use courier_http::*;

// Re-export the client crate for fully qualified paths
pub use courier_http;
