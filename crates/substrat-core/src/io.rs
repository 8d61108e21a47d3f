//! I/O - read / write と位置合わせ付きの複数ファイル書き込み
//!
//! 書き込みは atomic ではない。途中でクラッシュすると書きかけのファイルが残る。

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::domain::mapped::align;
use crate::domain::{Mapped, Output, TaskError};
use crate::iter;

/// Reads `root/file` completely.
pub async fn read(root: &Path, file: &Path) -> Result<Vec<u8>, TaskError> {
    let path = root.join(file);
    fs::read(&path)
        .await
        .map_err(|source| TaskError::Read { path, source })
}

/// `root/file` に書く。親ディレクトリがなければ先に作る
pub async fn write(root: &Path, file: &Path, data: &[u8]) -> Result<(), TaskError> {
    let target = root.join(file);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| TaskError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(&target, data)
        .await
        .map_err(|source| TaskError::Write {
            path: target,
            source,
        })
}

/// Writes every `data[i]` to `mapped[i]` below `root`, concurrently.
///
/// 単体は要素 1 の列として扱う。個数が合わなければ何も書かずに失敗する。
pub async fn writes(
    root: &Path,
    mapped: impl Into<Mapped>,
    data: impl Into<Output>,
    limit: Option<NonZeroUsize>,
) -> Result<(), TaskError> {
    let pairs = align(mapped.into(), data.into())?;
    iter::parallel(pairs, limit, move |_, (file, bytes): (PathBuf, Vec<u8>)| async move {
        write(root, &file, &bytes).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_then_read_roundtrips_bytes() {
        let dir = TempDir::new().unwrap();
        let bytes = vec![0u8, 159, 146, 150, b'\n', 255];

        write(dir.path(), Path::new("bin/blob.dat"), &bytes).await.unwrap();
        let back = read(dir.path(), Path::new("bin/blob.dat")).await.unwrap();

        assert_eq!(back, bytes);
    }

    #[tokio::test]
    async fn write_creates_nested_parents() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), Path::new("a/b/c/d.txt"), b"deep").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("a/b/c/d.txt")).unwrap(), b"deep");
    }

    #[tokio::test]
    async fn read_missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = read(dir.path(), Path::new("nope.txt")).await.unwrap_err();
        match err {
            TaskError::Read { path, source } => {
                assert_eq!(path, dir.path().join("nope.txt"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn writes_accepts_bare_values() {
        let dir = TempDir::new().unwrap();
        writes(dir.path(), "out.txt", "hello", None).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn writes_pairs_destinations_with_data_by_position() {
        let dir = TempDir::new().unwrap();
        let mapped = Mapped::from(vec![PathBuf::from("one.txt"), PathBuf::from("sub/two.txt")]);
        let data = Output::from(vec!["1".to_string(), "2".to_string()]);

        writes(dir.path(), mapped, data, NonZeroUsize::new(1)).await.unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("one.txt")).unwrap(), "1");
        assert_eq!(std::fs::read_to_string(dir.path().join("sub/two.txt")).unwrap(), "2");
    }

    #[tokio::test]
    async fn writes_rejects_mismatched_arity_without_writing() {
        let dir = TempDir::new().unwrap();
        let mapped = Mapped::from(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);

        let err = writes(dir.path(), mapped, "only one", None).await.unwrap_err();

        assert!(matches!(err, TaskError::ShapeMismatch { mapped: 2, data: 1 }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn writes_reports_a_failure_and_still_writes_the_rest() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is needed makes that one write fail.
        std::fs::write(dir.path().join("blocker"), b"").unwrap();
        let mapped = Mapped::from(vec![
            PathBuf::from("ok-1.txt"),
            PathBuf::from("blocker/nested.txt"),
            PathBuf::from("ok-2.txt"),
        ]);
        let data = Output::from(vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        let err = writes(dir.path(), mapped, data, None).await.unwrap_err();

        assert!(matches!(err, TaskError::CreateDir { .. } | TaskError::Write { .. }));
        assert!(dir.path().join("ok-1.txt").exists());
        assert!(dir.path().join("ok-2.txt").exists());
    }
}
