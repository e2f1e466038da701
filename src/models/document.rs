use serde::Serialize;

/// An uploaded file as stored in the upload directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredDocument {
    /// File name without extension; also the name of its index directory.
    pub stem: String,
    pub file_name: String,
    pub size: u64,
}

/// A document that has a vector index and can be queried.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexedDocument {
    pub stem: String,
    pub has_summary: bool,
}
