//! Deletion request model.

/// A request to soft-delete codes on behalf of one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub owner_id: String,
    pub short_codes: Vec<String>,
}

impl DeletionRequest {
    pub fn new(owner_id: impl Into<String>, short_codes: Vec<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            short_codes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short_codes.is_empty()
    }

    /// Splits the codes into consecutive sub-batches of at most `size` codes.
    ///
    /// A `size` of zero is treated as one.
    pub fn batches(&self, size: usize) -> Vec<Vec<String>> {
        self.short_codes
            .chunks(size.max(1))
            .map(<[String]>::to_vec)
            .collect()
    }
}
