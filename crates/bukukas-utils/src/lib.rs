//! Utility functions and helpers

use chrono::NaiveDateTime;

/// Truncate a string to at most `max` characters (not bytes)
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Lowercased extension of a file name, without the dot
pub fn file_extension(file_name: &str) -> Option<String> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// File name without directory and extension
pub fn file_stem(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Download file name such as `accounting_export_20240924_153000.xlsx`
pub fn timestamped_filename(prefix: &str, at: NaiveDateTime, extension: &str) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars(&"A".repeat(40), 31).chars().count(), 31);
        assert_eq!(truncate_chars("Kas", 31), "Kas");
        // multi-byte characters must not be split
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("ledger.XLSX"), Some("xlsx".to_string()));
        assert_eq!(file_extension("dir/ledger.csv"), Some("csv".to_string()));
        assert_eq!(file_extension("ledger"), None);
        assert_eq!(file_extension(".hidden"), None);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("C:\\data\\kas.csv"), "kas");
        assert_eq!(file_stem("kas"), "kas");
    }

    #[test]
    fn test_timestamped_filename() {
        let at = NaiveDate::from_ymd_opt(2024, 9, 24)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        assert_eq!(
            timestamped_filename("accounting_export", at, "xlsx"),
            "accounting_export_20240924_153000.xlsx"
        );
    }
}
