//! The wallet's view of a mint.
//!
//! [`MintConnector`] is the contract the wallet consumes. [`HttpMintClient`] speaks the mint's HTTP/JSON API, and
//! the `mock` module (tests, or the `mocks` feature) provides an in-process mint that really signs.

pub mod data_objects;
mod error;
mod http_client;
#[cfg(any(test, feature = "mocks"))]
pub mod mock;
mod traits;

pub use error::MintError;
pub use http_client::HttpMintClient;
pub use traits::MintConnector;
