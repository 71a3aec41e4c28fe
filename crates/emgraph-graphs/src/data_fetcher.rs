//! Energy meter API client and the fail-soft pagination loop.

use crate::traits::RecordSource;
use async_trait::async_trait;
use emgraph_common::{ChannelId, Cursor, DevicePage, EmGraphError, Result, SampleBatch};
use emgraph_config::DeviceConfig;
use reqwest::Client;
use std::{fmt, time::Duration};
use tracing::{debug, error, info, instrument, warn};

/// HTTP client for the `EM1Data.GetData` RPC call.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
    url: String,
    channel_id: ChannelId,
}

impl DeviceClient {
    /// Creates a client with the given per-request timeout.
    pub fn new(url: impl Into<String>, channel_id: ChannelId, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmGraphError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            url: url.into(),
            channel_id,
        })
    }

    /// Creates a client from the device section of the configuration.
    pub fn from_config(device: &DeviceConfig) -> Result<Self> {
        Self::new(
            device.url.clone(),
            device.channel_id,
            Duration::from_secs(device.timeout_secs),
        )
    }

    /// Endpoint this client polls.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RecordSource for DeviceClient {
    #[instrument(skip(self), fields(url = %self.url, channel = %self.channel_id))]
    async fn fetch_page(&self, cursor: Cursor) -> Result<DevicePage> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("id", i64::from(self.channel_id.0)), ("ts", cursor.0)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmGraphError::device_with_status(
                format!("Device returned {status}"),
                status.as_u16(),
            ));
        }

        let page: DevicePage = response.json().await?;
        debug!(
            batches = page.data.as_ref().map_or(0, Vec::len),
            next = ?page.next_record_ts,
            "Received page"
        );
        Ok(page)
    }
}

/// Why pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The device omitted `next_record_ts` or repeated the current cursor.
    CursorExhausted,
    /// The page carried no batches.
    NoData,
    /// A request failed; earlier pages are kept.
    RequestFailed,
    /// `max_pages` requests were issued.
    PageBudgetExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CursorExhausted => "cursor exhausted",
            Self::NoData => "no data",
            Self::RequestFailed => "request failed",
            Self::PageBudgetExhausted => "page budget exhausted",
        };
        f.write_str(text)
    }
}

/// Bookkeeping of one pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Successful responses received.
    pub pages: u32,
    /// Batches handed to the consumer.
    pub batches: usize,
    /// Batch entries that did not decode.
    pub skipped_batches: usize,
    /// Cursor of the last request issued.
    pub last_cursor: Cursor,
    /// Why the loop ended.
    pub stop_reason: StopReason,
    /// Message of the failed request, if any.
    pub error: Option<String>,
}

/// Paginates a [`RecordSource`] until the data runs out.
///
/// Network failures never escape: they end the loop and the batches seen so
/// far stand.
#[derive(Debug, Clone)]
pub struct DataFetcher<S> {
    source: S,
    initial_cursor: Cursor,
    max_pages: u32,
}

impl<S: RecordSource> DataFetcher<S> {
    /// Creates a fetcher starting at `initial_cursor` and issuing at most
    /// `max_pages` requests.
    pub const fn new(source: S, initial_cursor: Cursor, max_pages: u32) -> Self {
        Self {
            source,
            initial_cursor,
            max_pages,
        }
    }

    /// The underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Walks every page, handing each decoded batch to `on_batch` in arrival order.
    #[instrument(skip(self, on_batch), fields(initial_cursor = %self.initial_cursor))]
    pub async fn fetch_all<F>(&self, mut on_batch: F) -> FetchOutcome
    where
        F: FnMut(SampleBatch),
    {
        let mut cursor = self.initial_cursor;
        let mut pages = 0u32;
        let mut batches = 0usize;
        let mut skipped_batches = 0usize;
        let mut failure = None;

        let stop_reason = loop {
            if pages >= self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    %cursor,
                    "Page budget exhausted, stopping pagination"
                );
                break StopReason::PageBudgetExhausted;
            }

            debug!(%cursor, page = pages + 1, "Requesting records");
            let page = match self.source.fetch_page(cursor).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Request failed: {e}");
                    failure = Some(e.to_string());
                    break StopReason::RequestFailed;
                }
            };
            pages += 1;

            if page.is_empty() {
                debug!(%cursor, "Page carried no data");
                break StopReason::NoData;
            }

            for decoded in page.batches() {
                match decoded {
                    Ok(batch) => {
                        batches += 1;
                        on_batch(batch);
                    }
                    Err(e) => {
                        skipped_batches += 1;
                        warn!(%cursor, "Skipping malformed batch: {e}");
                    }
                }
            }

            match page.next_record_ts {
                Some(next) if next != cursor => cursor = next,
                _ => break StopReason::CursorExhausted,
            }
        };

        info!(pages, batches, skipped_batches, %stop_reason, "Pagination finished");

        FetchOutcome {
            pages,
            batches,
            skipped_batches,
            last_cursor: cursor,
            stop_reason,
            error: failure,
        }
    }

    /// Collects every batch into memory.
    pub async fn collect(&self) -> (Vec<SampleBatch>, FetchOutcome) {
        let mut collected = Vec::new();
        let outcome = self.fetch_all(|batch| collected.push(batch)).await;
        (collected, outcome)
    }
}
