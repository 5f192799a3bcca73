//! Storage statistics and listing

/// A bundle held in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBundle {
    pub digest: String,
    pub package: String,
    pub version: String,
    /// Archive size in bytes
    pub size: u64,
}

impl StoredBundle {
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

/// Storage statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored bundle archives
    pub entries: usize,
    /// Number of recorded descriptor refs
    pub refs: usize,
    /// Total size of stored archives in bytes
    pub total_size: u64,
}

impl StorageStats {
    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        format_size(self.total_size)
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{bytes} B")
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_size() {
        let mut stats = StorageStats::default();
        assert_eq!(stats.formatted_size(), "0 B");
        stats.total_size = 2048;
        assert_eq!(stats.formatted_size(), "2.0 KB");
        stats.total_size = 5 * 1024 * 1024;
        assert_eq!(stats.formatted_size(), "5.0 MB");
    }
}
