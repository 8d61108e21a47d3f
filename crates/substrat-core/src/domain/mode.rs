//! Mode - handler の呼び出し単位

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ConfigError;

/// Mode は 1 回の実行で handler が呼ばれる回数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// 入力ファイルごとに 1 回
    Each,
    /// 入力ファイル全体で 1 回
    All,
    /// 入力ファイルなしで 1 回
    Single,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Each => "each",
            Mode::All => "all",
            Mode::Single => "single",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "each" => Ok(Mode::Each),
            "all" => Ok(Mode::All),
            "single" => Ok(Mode::Single),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}
