//! GlobPattern - shell 風 glob による FilePattern

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::domain::ConfigError;
use crate::ports::FilePattern;

/// GlobPattern はいずれかのファイルがいずれかの glob に一致すれば match
///
/// # 使用例
/// ```ignore
/// let pattern = GlobPattern::new(["**/*.html", "*.txt"])?;
/// assert!(pattern.matches(&[PathBuf::from("docs/index.html")]));
/// ```
#[derive(Debug, Clone)]
pub struct GlobPattern {
    globs: Vec<Pattern>,
}

impl GlobPattern {
    pub fn new<I, S>(globs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let globs = globs
            .into_iter()
            .map(|glob| {
                let glob = glob.as_ref();
                Pattern::new(glob).map_err(|source| ConfigError::InvalidPattern {
                    pattern: glob.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { globs })
    }

    pub fn is_match(&self, file: &Path) -> bool {
        self.globs.iter().any(|glob| glob.matches_path(file))
    }

    /// 一致したファイルだけを順序を保って残す
    pub fn filter(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        files.iter().filter(|f| self.is_match(f)).cloned().collect()
    }
}

impl FilePattern for GlobPattern {
    fn matches(&self, files: &[PathBuf]) -> bool {
        files.iter().any(|f| self.is_match(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn files(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[rstest]
    #[case::direct_hit(&["index.html"], true)]
    #[case::nested_hit(&["css/site.css", "docs/guide.html"], true)]
    #[case::no_hit(&["css/site.css", "app.js"], false)]
    #[case::empty(&[], false)]
    fn matches_any_file(#[case] names: &[&str], #[case] expected: bool) {
        let pattern = GlobPattern::new(["**/*.html"]).unwrap();
        assert_eq!(pattern.matches(&files(names)), expected);
    }

    #[test]
    fn filter_keeps_input_order() {
        let pattern = GlobPattern::new(["*.md", "*.txt"]).unwrap();
        let kept = pattern.filter(&files(&["b.txt", "a.js", "a.md"]));
        assert_eq!(kept, files(&["b.txt", "a.md"]));
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let err = GlobPattern::new(["[unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
    }
}
