//! Core domain types for jobwatch.

use serde::{Deserialize, Serialize};

/// One job posting extracted from a row of the listing table.
///
/// `document_link` is the identity key: two records with the same link are the
/// same posting, whatever their other fields say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Posting title, trimmed. May be empty.
    pub title: String,
    /// Department name, trimmed.
    pub department_name: String,
    /// Closing date as free text, trimmed. Never parsed.
    pub last_date: String,
    /// Link to the posting's document, as written in the page (absolute or relative).
    pub document_link: String,
}

impl JobRecord {
    /// Percent-encoded form of [`document_link`](Self::document_link), for display only.
    ///
    /// Uses query-component encoding: `/` becomes `%2F` and spaces become `+`.
    pub fn encoded_document_link(&self) -> String {
        url::form_urlencoded::byte_serialize(self.document_link.as_bytes()).collect()
    }
}
