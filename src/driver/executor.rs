//! Per-item execution trait.

use async_trait::async_trait;

use crate::core::AppResult;

/// Executes one driver item and produces its result.
///
/// The executor is cloned into every work unit, so keep shared resources
/// behind `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_work_queue::driver::UnitExecutor;
///
/// #[derive(Clone)]
/// struct PageFetcher {
///     client: reqwest::Client,
/// }
///
/// #[async_trait]
/// impl UnitExecutor<u32, String> for PageFetcher {
///     async fn execute(&self, page: u32) -> anyhow::Result<String> {
///         let url = format!("https://example.com/quotes?page={page}");
///         Ok(self.client.get(url).send().await?.text().await?)
///     }
/// }
/// ```
#[async_trait]
pub trait UnitExecutor<I, T>: Send + Sync + Clone + 'static
where
    I: Send + 'static,
    T: Send + 'static,
{
    /// Execute the work for one item.
    ///
    /// # Errors
    ///
    /// Any error is delivered to the item's result handle unchanged.
    async fn execute(&self, item: I) -> AppResult<T>;
}
