//! Page/limit pagination primitives shared by Campus backend listing
//! endpoints.
//!
//! A [`PageRequest`] captures a sanitised page number and page size, and
//! [`PageInfo`] is the metadata block listing responses embed alongside their
//! data array.

use serde::{Deserialize, Serialize};

/// Page number used when the caller supplies none (or nonsense).
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller supplies none (or nonsense).
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound on the page size; larger requests are clamped.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised when constructing a [`PageRequest`] strictly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The page number was zero.
    #[error("page must be at least 1")]
    ZeroPage,
    /// The page size was zero.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The page size exceeded [`MAX_LIMIT`].
    #[error("limit must be at most {MAX_LIMIT}")]
    LimitTooLarge,
}

/// A sanitised pagination request: 1-based page number and page size.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let page = PageRequest::try_new(2, 10).expect("valid request");
/// assert_eq!(page.offset(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Construct a request, rejecting out-of-range values.
    ///
    /// # Errors
    /// Returns a [`PageRequestError`] when `page` or `limit` is zero, or when
    /// `limit` exceeds [`MAX_LIMIT`].
    pub const fn try_new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge);
        }
        Ok(Self { page, limit })
    }

    /// Construct a request leniently from raw query values.
    ///
    /// Values that are absent, non-positive, or otherwise out of range fall
    /// back to the defaults; a `limit` above [`MAX_LIMIT`] is clamped.
    #[must_use]
    pub fn lenient(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(value) if value >= 1 && value <= i64::from(u32::MAX) => {
                u32::try_from(value).unwrap_or(DEFAULT_PAGE)
            }
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(value) if value >= 1 => {
                u32::try_from(value).map_or(MAX_LIMIT, |limit| limit.min(MAX_LIMIT))
            }
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset for this page: `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Total number of pages needed for `total_items` rows.
    #[must_use]
    pub const fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.limit as u64)
    }
}

/// Pagination metadata embedded in listing responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number served.
    pub page: u32,
    /// Page size served.
    pub limit: u32,
    /// Total matching rows across all pages.
    pub total_items: u64,
    /// Total pages at this page size.
    pub total_pages: u64,
}

impl PageInfo {
    /// Build the metadata block for a served page.
    #[must_use]
    pub const fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            total_items,
            total_pages: request.total_pages(total_items),
        }
    }
}
