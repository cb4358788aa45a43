//! Page-number pagination shared by list endpoints.

/// Page used when none (or an invalid one) is supplied.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when none (or an invalid one) is supplied.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Largest page size a client may ask for.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest row offset the store accepts (a signed 64-bit `OFFSET`).
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// A validated page request. `page` and `limit` are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request, coercing out-of-range values.
    ///
    /// Zero falls back to the defaults and `limit` is capped at
    /// [`MAX_PAGE_SIZE`]. `page` is capped so that its offset stays within
    /// the store's range; such a page is simply empty.
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        let limit = match limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let page = match page {
            0 => DEFAULT_PAGE,
            n => n.min(MAX_OFFSET / limit + 1),
        };
        Self { page, limit }
    }

    /// Parse raw query-string values leniently.
    ///
    /// Absent or unparsable values (including negatives) become the defaults
    /// rather than an error.
    #[must_use]
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or_default()
        };
        Self::new(parse(page), parse(limit))
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of rows to skip. Never exceeds `i64::MAX`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// Position of a returned page within the whole result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl PageInfo {
    /// Describe `request` against a result set of `total_items` rows.
    #[must_use]
    pub const fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            current_page: request.page,
            total_pages: total_items.div_ceil(request.limit),
            total_items,
        }
    }
}
