//! Mapped / Output - 出力先の記述と handler の結果
//!
//! # 実装詳細
//! - どちらも単体と列の 2 形をとり、単体は要素 1 の列として扱う
//! - 出力の `i` 番目は出力先の `i` 番目に書かれる（位置で対応）

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::errors::TaskError;

/// `map` が計算した出力先（destination root からの相対パス）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mapped {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl Mapped {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Mapped::One(path) => std::slice::from_ref(path),
            Mapped::Many(paths) => paths,
        }
    }

    pub fn len(&self) -> usize {
        self.paths().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths().is_empty()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            Mapped::One(path) => vec![path],
            Mapped::Many(paths) => paths,
        }
    }
}

impl From<PathBuf> for Mapped {
    fn from(path: PathBuf) -> Self {
        Mapped::One(path)
    }
}

impl From<&Path> for Mapped {
    fn from(path: &Path) -> Self {
        Mapped::One(path.to_path_buf())
    }
}

impl From<&str> for Mapped {
    fn from(path: &str) -> Self {
        Mapped::One(PathBuf::from(path))
    }
}

impl From<Vec<PathBuf>> for Mapped {
    fn from(paths: Vec<PathBuf>) -> Self {
        Mapped::Many(paths)
    }
}

/// handler が書き出し用に返す結果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    /// 書き出すものなし
    #[default]
    None,
    One(Vec<u8>),
    Many(Vec<Vec<u8>>),
}

impl Output {
    pub fn len(&self) -> usize {
        match self {
            Output::None => 0,
            Output::One(_) => 1,
            Output::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_items(self) -> Vec<Vec<u8>> {
        match self {
            Output::None => Vec::new(),
            Output::One(bytes) => vec![bytes],
            Output::Many(items) => items,
        }
    }
}

impl From<Vec<u8>> for Output {
    fn from(bytes: Vec<u8>) -> Self {
        Output::One(bytes)
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::One(text.into_bytes())
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::One(text.as_bytes().to_vec())
    }
}

impl From<Vec<String>> for Output {
    fn from(texts: Vec<String>) -> Self {
        Output::Many(texts.into_iter().map(String::into_bytes).collect())
    }
}

/// 出力先と出力を位置で組にする。個数が違えば `ShapeMismatch`
pub fn align(mapped: Mapped, data: Output) -> Result<Vec<(PathBuf, Vec<u8>)>, TaskError> {
    if mapped.len() != data.len() {
        return Err(TaskError::ShapeMismatch {
            mapped: mapped.len(),
            data: data.len(),
        });
    }
    Ok(mapped.into_paths().into_iter().zip(data.into_items()).collect())
}
