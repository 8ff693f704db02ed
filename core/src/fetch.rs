// Per-resource fallback for remote fetches
//
// Each slot resolves on its own: a failed fetch is logged and replaced by the
// caller's fallback, and never blocks the other slots of the same batch.

use crate::Result;
use futures_util::future::join_all;
use std::future::Future;
use tracing::warn;

/// Where a slot value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Fallback,
}

/// A resolved slot value
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            origin: Origin::Remote,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            origin: Origin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }

    /// Resolve a finished fetch, substituting `fallback` on failure
    pub fn from_result(resource: &str, result: Result<T>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Self::remote(value),
            Err(e) => {
                warn!(
                    target: "fetch",
                    resource,
                    code = e.code(),
                    error = %e,
                    "Fetch failed; using fallback"
                );
                Self::fallback(fallback())
            }
        }
    }
}

impl<T> Fetched<Vec<T>> {
    /// Resolve a list fetch where an empty answer counts as no data
    pub fn non_empty_or(
        resource: &str,
        result: Result<Vec<T>>,
        fallback: impl FnOnce() -> Vec<T>,
    ) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => {
                warn!(target: "fetch", resource, "Server returned no rows; using fallback");
                Self::fallback(fallback())
            }
            other => Self::from_result(resource, other, fallback),
        }
    }
}

/// Await `fut` and resolve it against `fallback`.
///
/// Several of these joined with `tokio::join!` run concurrently and settle
/// independently.
pub async fn with_fallback<T, F>(resource: &str, fut: F, fallback: impl FnOnce() -> T) -> Fetched<T>
where
    F: Future<Output = Result<T>>,
{
    Fetched::from_result(resource, fut.await, fallback)
}

/// Run homogeneous fetches concurrently. One result per input, in input order;
/// a failure in one never cancels the others.
pub async fn join_settled<T, F, I>(fetches: I) -> Vec<Result<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    join_all(fetches).await
}

/// `join_settled` over named fetches, resolving each failure against
/// `fallback(resource)`
pub async fn join_with_fallback<T, F>(
    fetches: Vec<(String, F)>,
    fallback: impl Fn(&str) -> T,
) -> Vec<Fetched<T>>
where
    F: Future<Output = Result<T>>,
{
    let (names, futs): (Vec<String>, Vec<F>) = fetches.into_iter().unzip();
    join_settled(futs)
        .await
        .into_iter()
        .zip(names)
        .map(|(res, name)| Fetched::from_result(&name, res, || fallback(&name)))
        .collect()
}
