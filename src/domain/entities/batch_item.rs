//! Request/response unit for bulk shortening and listing.

/// One element of a batch.
///
/// On input `short_code` is empty. On output it holds the assigned code, and
/// `original_url` is cleared when the URL had already been shortened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
    pub short_code: String,
}

impl BatchItem {
    pub fn new(correlation_id: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            original_url: original_url.into(),
            short_code: String::new(),
        }
    }

    /// Listing entry for an owner's existing record.
    pub fn listed(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            correlation_id: String::new(),
            original_url: original_url.into(),
            short_code: short_code.into(),
        }
    }
}
