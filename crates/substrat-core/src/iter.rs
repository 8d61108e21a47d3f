//! Iter - エンジンが使う非同期イテレーション
//!
//! # 学習ポイント
//! - `sequential`: 1 件ずつ順に実行し、最初のエラーで止まる
//! - `parallel`: `buffer_unordered` で上限付き並列、全件の完了を待つ
//!
//! どちらも spawn しない。future は await した側が poll する。

use std::future::Future;
use std::num::NonZeroUsize;

use futures::stream::{self, StreamExt};

/// Runs `worker` for each item strictly in order.
///
/// The next item is only started after the previous worker finished. The
/// first `Err` ends the iteration and is returned as is; otherwise the
/// results come back in input order.
pub async fn sequential<T, R, E, F, Fut>(
    items: impl IntoIterator<Item = T>,
    mut worker: F,
) -> Result<Vec<R>, E>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let items = items.into_iter();
    let mut results = Vec::with_capacity(items.size_hint().0);
    for item in items {
        results.push(worker(item).await?);
    }
    Ok(results)
}

/// Runs `worker` for every item concurrently and waits for all of them.
///
/// At most `limit` workers are in flight at once (`None` = no cap). Workers
/// keep running after one fails. If any failed, exactly one error (the first
/// one observed) is returned.
pub async fn parallel<T, E, F, Fut>(
    items: impl IntoIterator<Item = T>,
    limit: Option<NonZeroUsize>,
    mut worker: F,
) -> Result<(), E>
where
    F: FnMut(usize, T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let work: Vec<Fut> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| worker(index, item))
        .collect();
    let limit = limit.map_or(work.len(), NonZeroUsize::get).max(1);

    let mut results = stream::iter(work).buffer_unordered(limit);
    let mut first_err = None;
    while let Some(result) = results.next().await {
        if let Err(err) = result {
            first_err.get_or_insert(err);
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
