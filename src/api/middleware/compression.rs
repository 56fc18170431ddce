//! Gzip support for request and response bodies.

use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;

/// Compresses responses when the client sends `Accept-Encoding: gzip`.
pub fn response_layer() -> CompressionLayer {
    CompressionLayer::new().gzip(true)
}

/// Inflates request bodies sent with `Content-Encoding: gzip`.
pub fn request_layer() -> RequestDecompressionLayer {
    RequestDecompressionLayer::new().gzip(true)
}
