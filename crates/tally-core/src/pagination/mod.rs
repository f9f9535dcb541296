//! Cursor pagination.
//!
//! List endpoints return one page of items plus a `pagination_metadata`
//! object whose `next_cursor` points at the following page. A [`Page`]
//! holds the decoded items, the raw list response, the parameters that
//! produced it and the [`PageSource`] that can fetch the next one.
//!
//! A page whose items do not all decode is still returned. It keeps the
//! items that did decode, reports the first failure through
//! [`Page::decode_error`], and counts as the last page.
//!
//! ```text
//! first(params) ── P1 (cursor c1) ── next() ── P2 (cursor c2) ── next() ── P3 (no cursor)
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{DataError, Error};
use crate::record::{Decode, RawRecord, Record, Validate};

/// Query parameters of a cursor-paginated list call.
pub trait CursorParams: Record + Clone + Send + Sync + 'static {
    /// Wire name of the cursor field.
    const CURSOR_FIELD: &'static str = "cursor";

    /// Clone the parameters with only the cursor replaced.
    fn with_cursor(&self, cursor: &str) -> Self {
        let mut next = self.clone();
        next.raw_mut()
            .insert(Self::CURSOR_FIELD, Value::String(cursor.to_string()));
        next
    }

    /// Render the parameters as URL query pairs, in field order.
    fn to_query(&self) -> Vec<(String, String)> {
        self.raw().query_pairs()
    }
}

crate::record! {
    /// The `pagination_metadata` object of a list response.
    pub struct PaginationMetadata {
        required has_more, set_has_more: bool = "has_more";
        nullable next_cursor, set_next_cursor: String = "next_cursor";
    }
}

/// The body of a list response: `data` plus `pagination_metadata`.
///
/// Items are decoded on demand, like every other record field.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct ListResponse<T> {
    raw: RawRecord,
    #[serde(skip)]
    _item: PhantomData<fn() -> T>,
}

impl<T> ListResponse<T> {
    /// Wrap a raw list response.
    pub fn from_raw(raw: RawRecord) -> Self {
        Self {
            raw,
            _item: PhantomData,
        }
    }

    /// Get a reference to the underlying map.
    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    /// Consume and return the underlying map.
    pub fn into_raw(self) -> RawRecord {
        self.raw
    }

    /// Read the pagination metadata.
    pub fn pagination_metadata(&self) -> Result<PaginationMetadata, DataError> {
        self.raw.required("pagination_metadata")
    }
}

impl<T: Decode> ListResponse<T> {
    /// Decode the items of this page, failing on the first bad one.
    pub fn data(&self) -> Result<Vec<T>, DataError> {
        self.decode_each()?.into_iter().collect()
    }

    /// Decode each item separately.
    fn decode_each(&self) -> Result<Vec<Result<T, DataError>>, DataError> {
        let values: Vec<Value> = self.raw.required("data")?;
        Ok(values.into_iter().map(T::decode_value).collect())
    }
}

impl<T: Decode + Validate> Validate for ListResponse<T> {
    fn validate(&self) -> Result<(), DataError> {
        self.data()?.validate()?;
        self.pagination_metadata()?.validate()
    }
}

impl<T> Clone for ListResponse<T> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<T> fmt::Debug for ListResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListResponse").field(&self.raw).finish()
    }
}

/// Something that can fetch one page of a list endpoint.
#[async_trait]
pub trait PageSource<P: CursorParams, T: Send + 'static>: Send + Sync {
    /// Fetch the page selected by `params`.
    async fn fetch_page(&self, params: &P, cancel: &CancellationToken)
    -> crate::Result<ListResponse<T>>;
}

/// One fetched page of a list endpoint.
pub struct Page<P: CursorParams, T: Send + 'static> {
    source: Arc<dyn PageSource<P, T>>,
    params: P,
    response: ListResponse<T>,
    items: Vec<T>,
    decode_error: Option<DataError>,
}

impl<P, T> Page<P, T>
where
    P: CursorParams,
    T: Decode + Send + 'static,
{
    /// Fetch the first page for `params`.
    pub async fn first(
        source: Arc<dyn PageSource<P, T>>,
        params: P,
        cancel: &CancellationToken,
    ) -> crate::Result<Self> {
        trace!(query = ?params.to_query(), "Fetching page");
        let response = source.fetch_page(&params, cancel).await?;
        Ok(Self::new(source, params, response))
    }

    /// Build a page from an already fetched response.
    ///
    /// Items that fail to decode are left out and the first failure is kept
    /// in [`decode_error`](Self::decode_error).
    pub fn new(source: Arc<dyn PageSource<P, T>>, params: P, response: ListResponse<T>) -> Self {
        let mut items = Vec::new();
        let mut decode_error = None;
        match response.decode_each() {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(item) => items.push(item),
                        Err(err) => {
                            decode_error.get_or_insert(err);
                        }
                    }
                }
            }
            Err(err) => decode_error = Some(err),
        }

        match &decode_error {
            Some(err) => warn!(
                items = items.len(),
                error = %err,
                "Page did not fully decode, treating it as the last page"
            ),
            None => debug!(items = items.len(), "Decoded page"),
        }

        Self {
            source,
            params,
            response,
            items,
            decode_error,
        }
    }

    /// The items of this page that decoded.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The first item decode failure on this page, if any.
    pub fn decode_error(&self) -> Option<&DataError> {
        self.decode_error.as_ref()
    }

    /// Consume the page, keeping only its items.
    pub fn into_items_vec(self) -> Vec<T> {
        self.items
    }

    /// The parameters this page was fetched with.
    pub fn params(&self) -> &P {
        &self.params
    }

    /// The raw list response.
    pub fn response(&self) -> &ListResponse<T> {
        &self.response
    }

    /// The cursor of the following page.
    ///
    /// An empty cursor counts as absent. Unreadable metadata also reads as
    /// absent, so a page with a malformed `pagination_metadata` is treated as
    /// the last page instead of failing.
    pub fn next_cursor(&self) -> Option<String> {
        match self
            .response
            .pagination_metadata()
            .and_then(|metadata| metadata.next_cursor())
        {
            Ok(cursor) => cursor.filter(|cursor| !cursor.is_empty()),
            Err(err) => {
                debug!(error = %err, "Unreadable pagination metadata, treating page as last");
                None
            }
        }
    }

    /// Returns true if this page fully decoded, has items, and has a cursor
    /// to continue from.
    pub fn has_next(&self) -> bool {
        self.next_params().is_some()
    }

    /// Fetch the following page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if [`has_next`](Self::has_next)
    /// is false, otherwise whatever fetching and decoding the page returns.
    pub async fn next(&self, cancel: &CancellationToken) -> crate::Result<Self> {
        let params = self.next_params().ok_or_else(|| {
            Error::InvalidOperation("next() called on the last page".to_string())
        })?;
        Self::first(Arc::clone(&self.source), params, cancel).await
    }

    /// Stream every item from this page onwards, following cursors.
    ///
    /// Pages are fetched one at a time after the previous page's items have
    /// been yielded. The stream ends after the last page or the first error.
    /// A page that did not fully decode yields its good items and then its
    /// decode error.
    pub fn into_items(self, cancel: CancellationToken) -> impl Stream<Item = crate::Result<T>> {
        try_stream! {
            let mut page = self;
            loop {
                let next = page.next_params();
                let Page { source, items, decode_error, .. } = page;
                for item in items {
                    yield item;
                }
                if let Some(err) = decode_error {
                    Err::<(), Error>(Error::Data(err))?;
                }
                let Some(params) = next else {
                    break;
                };
                page = Self::first(source, params, &cancel).await?;
            }
        }
    }

    fn next_params(&self) -> Option<P> {
        if self.items.is_empty() || self.decode_error.is_some() {
            return None;
        }
        self.next_cursor()
            .map(|cursor| self.params.with_cursor(&cursor))
    }
}

impl<P, T> fmt::Debug for Page<P, T>
where
    P: CursorParams + fmt::Debug,
    T: Send + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("params", &self.params)
            .field("items", &self.items)
            .field("decode_error", &self.decode_error)
            .finish_non_exhaustive()
    }
}
