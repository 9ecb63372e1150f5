//! Complaint backlog adapters.

mod file;
mod http;
mod memory;

pub use file::JsonFileSource;
pub use http::{HttpComplaintSource, HttpSourceConfig};
pub use memory::InMemorySource;

use crate::domain::SourceError;
use serde::Deserialize;
use shared_types::ComplaintRecord;

#[derive(Deserialize)]
#[serde(untagged)]
enum Backlog {
    List(Vec<ComplaintRecord>),
    Wrapped { complaints: Vec<ComplaintRecord> },
}

/// Parses a JSON array of complaints or an object with a `complaints` array.
pub(crate) fn parse_backlog(bytes: &[u8]) -> Result<Vec<ComplaintRecord>, SourceError> {
    match serde_json::from_slice::<Backlog>(bytes) {
        Ok(Backlog::List(complaints)) | Ok(Backlog::Wrapped { complaints }) => Ok(complaints),
        Err(e) => Err(SourceError::Parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let complaints =
            parse_backlog(br#"[{"id":"c1","text":"a"},{"_id":{"$oid":"c2"},"text":"b"}]"#).unwrap();
        let ids: Vec<_> = complaints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2"]);
    }

    #[test]
    fn test_parse_wrapped() {
        let complaints = parse_backlog(br#"{"complaints":[{"id":"c1","text":"a"}]}"#).unwrap();
        assert_eq!(complaints.len(), 1);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(
            parse_backlog(br#"{"error":"Unauthorized"}"#),
            Err(SourceError::Parse(_))
        ));
        assert!(matches!(parse_backlog(b"not json"), Err(SourceError::Parse(_))));
    }
}
