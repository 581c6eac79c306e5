//! Lazy iteration over paged history.

use futures_util::stream::{self, Stream, StreamExt};

use crate::blockchain::BlockchainResult;
use crate::contract::{HistorySource, PageCursor};
use crate::session::Interaction;

/// Stream every interaction `source` holds, fetching pages on demand.
///
/// The stream ends after the last page, or right after yielding the first
/// error. Calling this again restarts from the first page.
pub fn stream<S>(source: &S) -> impl Stream<Item = BlockchainResult<Interaction>> + Send + '_
where
    S: HistorySource,
{
    // Outer `None` means exhausted; `Some(None)` means the first page.
    let start: Option<Option<PageCursor>> = Some(None);

    stream::unfold(start, move |state| async move {
        let cursor = state?;
        match source.fetch_page(cursor).await {
            Ok(page) => {
                tracing::debug!(
                    cursor = ?cursor,
                    items = page.items.len(),
                    more = page.next.is_some(),
                    "Fetched history page"
                );
                let items: Vec<_> = page.items.into_iter().map(Ok).collect();
                Some((stream::iter(items), page.next.map(Some)))
            }
            Err(e) => Some((stream::iter(vec![Err(e)]), None)),
        }
    })
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::BlockchainError;
    use crate::contract::HistoryPage;
    use alloy::primitives::Address;
    use futures_util::TryStreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Paged {
        total: u64,
        page_size: u64,
        fail_at: Option<u64>,
        fetches: AtomicUsize,
    }

    impl Paged {
        fn new(total: u64, page_size: u64) -> Self {
            Self { total, page_size, fail_at: None, fetches: AtomicUsize::new(0) }
        }
    }

    impl HistorySource for Paged {
        async fn fetch_page(&self, cursor: Option<PageCursor>) -> BlockchainResult<HistoryPage> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let start = cursor.map(|c| c.0).unwrap_or(0);
            if self.fail_at == Some(start) {
                return Err(BlockchainError::Rpc("boom".into()));
            }
            let end = (start + self.page_size).min(self.total);
            let items = (start..end)
                .map(|i| Interaction::from_chain(Address::ZERO, i, format!("#{i}")))
                .collect();
            let next = (end < self.total).then_some(PageCursor(end));
            Ok(HistoryPage { items, next })
        }
    }

    #[tokio::test]
    async fn test_walks_all_pages() {
        let source = Paged::new(7, 3);
        let all: Vec<Interaction> = stream(&source).try_collect().await.unwrap();

        assert_eq!(all.len(), 7);
        assert_eq!(all[6].message.as_deref(), Some("#6"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lazy_and_restartable() {
        let source = Paged::new(10, 2);

        let first_two: Vec<_> = stream(&source).take(2).collect().await;
        assert_eq!(first_two.len(), 2);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let again: Vec<Interaction> = stream(&source).try_collect().await.unwrap();
        assert_eq!(again.len(), 10);
        assert_eq!(again[0].message.as_deref(), Some("#0"));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let source = Paged::new(0, 5);
        let all: Vec<Interaction> = stream(&source).try_collect().await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let mut source = Paged::new(10, 4);
        source.fail_at = Some(4);

        let items: Vec<_> = stream(&source).collect().await;
        assert_eq!(items.len(), 5);
        assert!(items[..4].iter().all(|r| r.is_ok()));
        assert!(items[4].is_err());
    }
}
