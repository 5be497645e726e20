use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Generate default output directory: output/aq-validated-{YYMMDD}
pub fn generate_default_output_dir() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let dirname = format!("aq-validated-{:02}{:02}{:02}", year, month, day);
    PathBuf::from("output").join(dirname)
}

/// Output directory for one export inside a batch run: {base}/{file stem}
pub fn output_dir_for_export(base: &Path, export: &Path) -> PathBuf {
    let stem = export
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export");
    base.join(format!("validado_{}", stem))
}

/// Whether a path looks like a delimited-text export we can read
pub fn is_export_file(path: &Path, pattern: &str) -> bool {
    let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    let extension_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "csv" | "txt" | "tsv"))
        .unwrap_or(false);

    extension_ok && (pattern.is_empty() || name.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_output_dir() {
        let dir = generate_default_output_dir();
        let dir_str = dir.to_string_lossy();

        assert!(dir_str.starts_with("output/"));

        let parts: Vec<&str> = dir_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[1].starts_with("aq-validated-"));
        assert_eq!(parts[1].len(), "aq-validated-".len() + 6);
    }

    #[test]
    fn test_output_dir_for_export() {
        let dir = output_dir_for_export(Path::new("out"), Path::new("/data/Trs_enero.csv"));
        assert_eq!(dir, PathBuf::from("out/validado_Trs_enero"));
    }

    #[test]
    fn test_is_export_file() {
        assert!(is_export_file(Path::new("a/Trs.csv"), ""));
        assert!(is_export_file(Path::new("a/Trs_2024.CSV"), "Trs"));
        assert!(!is_export_file(Path::new("a/Other.csv"), "Trs"));
        assert!(!is_export_file(Path::new("a/Trs.xlsx"), ""));
        assert!(!is_export_file(Path::new("a/Trs"), ""));
    }
}
