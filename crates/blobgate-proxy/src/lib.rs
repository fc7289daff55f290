//! Blobgate Origin Client
//!
//! This crate provides the client for fetching objects from the origin
//! blob store when neither cache tier holds them.

pub mod error;
pub mod origin;
pub mod s3;

pub use error::ProxyError;
pub use origin::{OriginFetcher, OriginObject};
pub use s3::{S3Origin, S3OriginConfig};
