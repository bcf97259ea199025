//! Options controlling how a source document is turned into records.

/// Header row that marks the start of the embedded CSV dataset.
pub const DATASET_HEADER: &str = "prisoner_id,name,age,gender,crime,sentence_years,prison";

/// Options for ingesting a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Number of leading pages to skip (front matter with no data)
    pub skip_pages: usize,
    /// Marker line that starts the dataset
    pub header: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            skip_pages: 1,
            header: DATASET_HEADER.to_string(),
        }
    }
}

impl IngestOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many leading pages to skip.
    pub fn skip_pages(mut self, pages: usize) -> Self {
        self.skip_pages = pages;
        self
    }

    /// Set the header marker line.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = IngestOptions::new();
        assert_eq!(options.skip_pages, 1);
        assert_eq!(options.header, DATASET_HEADER);
    }

    #[test]
    fn test_builder() {
        let options = IngestOptions::new().skip_pages(0).header("a,b");
        assert_eq!(options.skip_pages, 0);
        assert_eq!(options.header, "a,b");
    }
}
