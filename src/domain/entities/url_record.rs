//! Stored URL mapping.

/// A single original URL to short code mapping.
///
/// Records are never physically removed; deletion only flips `deleted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub short_code: String,
    pub original_url: String,
    /// Opaque id of the creator. Empty when the record was created anonymously.
    pub owner_id: String,
    pub deleted: bool,
}

impl UrlRecord {
    pub fn new(
        short_code: impl Into<String>,
        original_url: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            owner_id: owner_id.into(),
            deleted: false,
        }
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        !owner_id.is_empty() && self.owner_id == owner_id
    }
}
