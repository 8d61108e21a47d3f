//! Options - ビルド全体の設定とタスクごとの設定

use serde::{Deserialize, Deserializer, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use super::errors::ConfigError;

/// 同時に開く出力ファイル数の既定の上限
pub const DEFAULT_WRITE_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(n) => n,
    None => unreachable!(),
};

/// BuildOptions はオーケストレータが全タスクに渡すビルド設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// 入力ファイル名の基準ディレクトリ
    pub src: PathBuf,

    /// 出力先の基準ディレクトリ
    pub dest: PathBuf,

    /// 1 回の実行での同時書き込み数の上限（`None` は無制限）
    #[serde(default = "default_write_concurrency")]
    pub write_concurrency: Option<NonZeroUsize>,

    /// その他の設定（handler へそのまま渡す）
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_write_concurrency() -> Option<NonZeroUsize> {
    Some(DEFAULT_WRITE_CONCURRENCY)
}

impl BuildOptions {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            write_concurrency: default_write_concurrency(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 書き込み上限を設定する（0 は無制限ではなくエラー）
    pub fn with_write_concurrency(mut self, limit: usize) -> Result<Self, ConfigError> {
        let limit = NonZeroUsize::new(limit).ok_or(ConfigError::ZeroConcurrency)?;
        self.write_concurrency = Some(limit);
        Ok(self)
    }

    pub fn unbounded_writes(mut self) -> Self {
        self.write_concurrency = None;
        self
    }

    pub fn source_path(&self, file: &Path) -> PathBuf {
        self.src.join(file)
    }
}

/// TaskConfig は handler 固有のタスク設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// All / Single mode の `map` が使う仮想ファイル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// 変換に使う静的データ（テンプレートの locals, 区切り文字など）
    #[serde(default)]
    pub data: serde_json::Value,

    /// テンプレート系 handler の開き/閉じデリミタ（どちらも空不可）
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_tags"
    )]
    pub tags: Option<(String, String)>,
}

fn check_tags(open: &str, close: &str) -> Result<(), ConfigError> {
    if open.is_empty() || close.is_empty() {
        return Err(ConfigError::EmptyDelimiter);
    }
    Ok(())
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Option<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Option::<(String, String)>::deserialize(deserializer)?;
    if let Some((open, close)) = &tags {
        check_tags(open, close).map_err(serde::de::Error::custom)?;
    }
    Ok(tags)
}

impl TaskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_tags(
        mut self,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let (open, close) = (open.into(), close.into());
        check_tags(&open, &close)?;
        self.tags = Some((open, close));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn options_from_json_defaults_the_write_cap() {
        let opts = BuildOptions::from_json(r#"{"src": "site", "dest": "public"}"#).unwrap();
        assert_eq!(opts.src, PathBuf::from("site"));
        assert_eq!(opts.dest, PathBuf::from("public"));
        assert_eq!(opts.write_concurrency, Some(DEFAULT_WRITE_CONCURRENCY));
        assert!(opts.extra.is_empty());
    }

    #[test]
    fn null_write_cap_means_unbounded_and_extras_are_kept() {
        let opts = BuildOptions::from_json(
            r#"{"src": "a", "dest": "b", "write_concurrency": null, "minify": true}"#,
        )
        .unwrap();
        assert_eq!(opts.write_concurrency, None);
        assert_eq!(opts.extra.get("minify"), Some(&json!(true)));
    }

    #[test]
    fn zero_write_cap_is_rejected() {
        let err = BuildOptions::new("a", "b").with_write_concurrency(0).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroConcurrency));

        let err = BuildOptions::from_json(r#"{"src": "a", "dest": "b", "write_concurrency": 0}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn task_config_roundtrips_through_json() {
        let config = TaskConfig::new()
            .with_file("bundle.js")
            .with_data(json!({"separator": "\n"}))
            .with_tags("<%", "%>")
            .unwrap();
        let s = serde_json::to_string(&config).unwrap();
        let back: TaskConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(back, config);
    }

    #[rstest]
    #[case::both("", "")]
    #[case::open_only("", "}}")]
    #[case::close_only("{{", "")]
    fn empty_tags_are_rejected(#[case] open: &str, #[case] close: &str) {
        let err = TaskConfig::new().with_tags(open, close).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDelimiter));

        let json = serde_json::to_string(&json!({"tags": [open, close]})).unwrap();
        let err = TaskConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("delimiters must not be empty"));
    }

    #[test]
    fn tags_from_json_are_kept() {
        let config = TaskConfig::from_json(r#"{"tags": ["<%", "%>"]}"#).unwrap();
        assert_eq!(config.tags, Some(("<%".to_string(), "%>".to_string())));
        assert_eq!(TaskConfig::from_json("{}").unwrap().tags, None);
    }
}
