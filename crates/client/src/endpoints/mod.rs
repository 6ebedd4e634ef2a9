//! REST and GraphQL endpoint implementations.
//!
//! Each function performs one logical API operation over a shared
//! `reqwest::Client` and maps failures into [`crate::error::ClientError`].

mod graphql;
mod query_jobs;
mod request;
mod streaming;
pub mod url_encoding;

pub use graphql::execute_graphql;
pub use query_jobs::{create_query_job, delete_query_job, poll_query_job, wait_for_query_job};
pub use request::{HttpFailure, send_request};
pub use streaming::{SleepFn, StreamRetryPolicy, is_transient, stream_query, tokio_sleep};
pub use url_encoding::encode_path_segment;
