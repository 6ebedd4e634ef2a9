//! Percent-encoding for repository names and query job ids in API paths.
//!
//! Repository and view names are user-supplied. Without encoding, a name such
//! as `team/logs` would add a path level and `a?b` would start a query string.
//!
//! # Example
//!
//! ```
//! use humio_client::endpoints::url_encoding::encode_path_segment;
//!
//! assert_eq!(encode_path_segment("team/logs"), "team%2Flogs");
//! ```

use percent_encoding::{AsciiSet, CONTROLS, percent_encode};

/// Characters that must be percent-encoded in URL path segments.
///
/// RFC 3986 path delimiters plus characters reqwest would otherwise pass
/// through verbatim. `%` is included so pre-encoded input is not decoded twice.
pub const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'+')
    .add(b';')
    .add(b'[')
    .add(b']');

/// Percent-encode a string for use as a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    percent_encode(segment.as_bytes(), PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Path of the query job collection for a repository.
pub(crate) fn query_jobs_path(repo: &str) -> String {
    format!("/api/v1/repositories/{}/queryjobs", encode_path_segment(repo))
}

/// Path of a single query job.
pub(crate) fn query_job_path(repo: &str, job_id: &str) -> String {
    format!("{}/{}", query_jobs_path(repo), encode_path_segment(job_id))
}

/// Path of the streaming query endpoint for a repository.
pub(crate) fn streaming_query_path(repo: &str) -> String {
    format!("/api/v1/repositories/{}/query", encode_path_segment(repo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_repo_names_unchanged() {
        assert_eq!(encode_path_segment("humio"), "humio");
        assert_eq!(encode_path_segment("prod-logs_2.eu"), "prod-logs_2.eu");
    }

    #[test]
    fn test_delimiters_encoded() {
        assert_eq!(encode_path_segment("team/logs"), "team%2Flogs");
        assert_eq!(encode_path_segment("a?b#c"), "a%3Fb%23c");
        assert_eq!(encode_path_segment("my repo"), "my%20repo");
    }

    #[test]
    fn test_percent_encoded_once() {
        assert_eq!(encode_path_segment("a%20b"), "a%2520b");
    }

    #[test]
    fn test_non_ascii_encoded_as_utf8() {
        assert_eq!(encode_path_segment("logs\u{00e9}"), "logs%C3%A9");
    }

    #[test]
    fn test_job_paths() {
        assert_eq!(
            query_jobs_path("team/logs"),
            "/api/v1/repositories/team%2Flogs/queryjobs"
        );
        assert_eq!(
            query_job_path("main", "P1-abc"),
            "/api/v1/repositories/main/queryjobs/P1-abc"
        );
        assert_eq!(streaming_query_path("main"), "/api/v1/repositories/main/query");
    }
}
