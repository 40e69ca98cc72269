use std::path::{Path, PathBuf};

const BASE_DIR_ENV: &str = "DOC_TRANSLATOR_DIR";
const DEFAULT_DIR_NAME: &str = ".doc-translator-rust";

pub(crate) fn settings_dir() -> Option<PathBuf> {
    if let Some(dir) = base_dir_override() {
        return Some(dir);
    }
    default_base_dir()
}

/// `<dir>/<stem>_<target>.<ext>` next to the input document.
pub fn default_output_path(input: &Path, target_language: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{}_{}.{}", stem, target_language, ext.to_string_lossy()),
        None => format!("{}_{}", stem, target_language),
    };
    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn base_dir_override() -> Option<PathBuf> {
    std::env::var(BASE_DIR_ENV)
        .ok()
        .and_then(|value| normalize_dir(&value))
}

fn default_base_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(DEFAULT_DIR_NAME))
        }
    })
}

fn normalize_dir(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_tilde(trimmed);
    let mut normalized = PathBuf::new();
    for component in Path::new(&expanded).components() {
        normalized.push(component.as_os_str());
    }
    Some(normalized)
}

fn expand_tilde(value: &str) -> String {
    if value == "~" || value.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let home = home.trim();
            if home.is_empty() {
                return value.to_string();
            }
            if value == "~" {
                return home.to_string();
            }
            return format!("{}{}", home, &value[1..]);
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_keeps_directory_and_extension() {
        let input = Path::new("reports/report.docx");
        assert_eq!(
            default_output_path(input, "pt-br"),
            PathBuf::from("reports/report_pt-br.docx")
        );
    }

    #[test]
    fn output_path_for_bare_file_name() {
        assert_eq!(
            default_output_path(Path::new("report.docx"), "pt-br"),
            PathBuf::from("report_pt-br.docx")
        );
    }

    #[test]
    fn output_path_without_extension() {
        assert_eq!(
            default_output_path(Path::new("/tmp/notes"), "ja"),
            PathBuf::from("/tmp/notes_ja")
        );
    }

    #[test]
    fn output_path_only_replaces_last_extension() {
        assert_eq!(
            default_output_path(Path::new("/data/archive.v2.txt"), "de"),
            PathBuf::from("/data/archive.v2_de.txt")
        );
    }

    #[test]
    fn normalize_dir_ignores_blank_values() {
        assert!(normalize_dir("   ").is_none());
        assert_eq!(
            normalize_dir("/opt/doc-translator/"),
            Some(PathBuf::from("/opt/doc-translator"))
        );
    }
}
