use std::io;
use std::path::{Path, PathBuf};

pub const TEMPLATES_SUFFIX: &str = ".zip.templates";
pub const VARIABLES_SUFFIX: &str = ".zip.variables";
pub const ALIAS_SUFFIX: &str = ".zip.var_alias";
pub const AGGREGATE_OUTPUT: &str = "var_alias.conf";

/// A templates file and, when present on disk, its variables companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub templates: PathBuf,
    pub variables: Option<PathBuf>,
}

/// Every `*.zip.templates` in `dir`, sorted by file name.
pub fn find_pairs(dir: &Path) -> io::Result<Vec<FilePair>> {
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(TEMPLATES_SUFFIX) && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| {
            let stem = &name[..name.len() - TEMPLATES_SUFFIX.len()];
            let variables = dir.join(format!("{stem}{VARIABLES_SUFFIX}"));
            FilePair {
                templates: dir.join(&name),
                variables: variables.is_file().then_some(variables),
            }
        })
        .collect())
}

/// The pair for an explicitly named archive; the templates path may not exist.
pub fn named_pair(dir: &Path, name: &str) -> FilePair {
    let variables = dir.join(format!("{name}{VARIABLES_SUFFIX}"));
    FilePair {
        templates: dir.join(format!("{name}{TEMPLATES_SUFFIX}")),
        variables: variables.is_file().then_some(variables),
    }
}

/// Base name of `dir`, ignoring trailing separators.
pub fn dataset_name(dir: &Path) -> String {
    dir.components()
        .last()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn default_output(dir: &Path, name: &str, aggregate: bool) -> PathBuf {
    if aggregate {
        dir.join(AGGREGATE_OUTPUT)
    } else {
        dir.join(format!("{name}{ALIAS_SUFFIX}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_name_ignores_trailing_slash() {
        assert_eq!(dataset_name(Path::new("/data/ssh/")), "ssh");
        assert_eq!(dataset_name(Path::new("logs")), "logs");
    }

    #[test]
    fn output_defaults() {
        let d = Path::new("/data/ssh");
        assert_eq!(default_output(d, "ssh", true), PathBuf::from("/data/ssh/var_alias.conf"));
        assert_eq!(default_output(d, "a", false), PathBuf::from("/data/ssh/a.zip.var_alias"));
    }
}
