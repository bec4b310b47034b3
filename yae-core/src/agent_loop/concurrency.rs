//! Bounded-concurrency fan-out: run `f` over every item with at most `limit`
//! in flight, preserving input order in the result even though completion
//! order is unconstrained. A failure in one item never cancels its peers.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::AgentError;

pub async fn map_settled<T, R, F, Fut>(items: Vec<T>, limit: usize, f: F) -> Vec<Result<R, AgentError>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<R, AgentError>> + Send + 'static,
{
    if items.is_empty() {
        return vec![];
    }

    let limit = limit.max(1);
    let f = Arc::new(f);
    let mut slots: Vec<(usize, Result<R, AgentError>)> = stream::iter(items.into_iter().enumerate())
        .map(|(idx, item)| {
            let f = Arc::clone(&f);
            async move { (idx, f(item).await) }
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    slots.sort_by_key(|(idx, _)| *idx);
    slots.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: mapping over an empty list returns an empty result, no panics.
    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let out: Vec<Result<i32, AgentError>> = map_settled(Vec::<i32>::new(), 4, |x| async move { Ok(x) }).await;
        assert!(out.is_empty());
    }

    /// **Scenario**: results preserve input order regardless of completion order.
    #[tokio::test]
    async fn preserves_input_order_under_concurrency() {
        let items = vec![30u64, 10, 20];
        let out = map_settled(items.clone(), 3, |ms| async move {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
            Ok::<u64, AgentError>(ms)
        })
        .await;
        let values: Vec<u64> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, items);
    }

    /// **Scenario**: one item's failure doesn't prevent its peers from completing.
    #[tokio::test]
    async fn a_failure_does_not_cancel_peers() {
        let items = vec![1, 2, 3];
        let out = map_settled(items, 3, |x| async move {
            if x == 2 {
                Err(AgentError::Upstream("boom".to_string()))
            } else {
                Ok(x)
            }
        })
        .await;
        assert!(out[0].is_ok());
        assert!(out[1].is_err());
        assert!(out[2].is_ok());
    }
}
