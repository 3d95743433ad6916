//! Page bounds and deep-link listing parameters.
//!
//! [`resolve`] derives navigation availability from the collection total when
//! the API reports one, and from the size of the last fetched page when it
//! doesn't. [`ListingParams`] is the state a listing view is driven by: filter
//! text, 1-based page and page size, parsed from and rendered back to a query
//! string.
//!
//! # Examples
//!
//! ```rust
//! use kodex::pagination::resolve;
//!
//! let bounds = resolve(2, 20, Some(97), 20);
//! assert_eq!(bounds.total_pages, Some(5));
//! assert!(bounds.can_prev && bounds.can_next && bounds.can_jump_last);
//!
//! // No total: a full page suggests there may be more
//! let bounds = resolve(3, 20, None, 20);
//! assert_eq!(bounds.total_pages, None);
//! assert!(bounds.can_next);
//! assert!(!bounds.can_jump_last);
//! ```

use url::form_urlencoded;

use crate::types::{Collection, PageQuery, normalize_filter};

/// Page size used when none (or an invalid one) is given.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Page sizes offered to users.
pub const PAGE_SIZES: [usize; 4] = [5, 20, 50, 100];

/// Navigation availability for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub page: usize,
    pub limit: usize,
    pub total: Option<u64>,
    pub results_len: usize,
    /// `None` when the total is unknown
    pub total_pages: Option<usize>,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_jump_first: bool,
    pub can_jump_last: bool,
}

/// Resolves navigation for `page` (1-based) of size `limit`.
///
/// With a known total, `total_pages = max(1, ceil(total / limit))` and next is
/// available below the last page. Without one, next is available whenever the
/// last fetch returned a full page, and jumping to the last page is disabled.
/// A zero `limit` or `page` is treated as 1.
pub fn resolve(page: usize, limit: usize, total: Option<u64>, results_len: usize) -> PageBounds {
    let page = page.max(1);
    let limit = limit.max(1);

    let total_pages = total.map(|total| (total.div_ceil(limit as u64) as usize).max(1));
    let can_next = match total_pages {
        Some(pages) => page < pages,
        None => results_len >= limit,
    };

    PageBounds {
        page,
        limit,
        total,
        results_len,
        total_pages,
        can_prev: page > 1,
        can_next,
        can_jump_first: page > 1,
        can_jump_last: total_pages.is_some_and(|pages| page < pages),
    }
}

impl PageBounds {
    /// Page number the "next" action navigates to, if available.
    pub fn next_page(&self) -> Option<usize> {
        self.can_next.then_some(self.page.saturating_add(1))
    }

    /// Page number the "previous" action navigates to, if available.
    pub fn prev_page(&self) -> Option<usize> {
        self.can_prev.then_some(self.page - 1)
    }

    /// Page number the "last" action navigates to, if available.
    pub fn last_page(&self) -> Option<usize> {
        if self.can_jump_last {
            self.total_pages
        } else {
            None
        }
    }

    /// Short position line, e.g. `Page 2 / 5 - 97 items`.
    ///
    /// ```rust
    /// use kodex::pagination::resolve;
    ///
    /// assert_eq!(resolve(1, 20, Some(1), 1).summary(), "Page 1 / 1 - 1 item");
    /// assert_eq!(resolve(3, 20, None, 4).summary(), "Page 3 - 4 item(s)");
    /// assert_eq!(resolve(3, 20, None, 20).summary(), "Page 3");
    /// ```
    pub fn summary(&self) -> String {
        match (self.total_pages, self.total) {
            (Some(pages), Some(total)) => format!(
                "Page {} / {} - {} item{}",
                self.page,
                pages,
                total,
                if total > 1 { "s" } else { "" }
            ),
            _ if self.results_len < self.limit => {
                format!("Page {} - {} item(s)", self.page, self.results_len)
            }
            _ => format!("Page {}", self.page),
        }
    }
}

/// Filter, page and page size of a listing view.
///
/// Changing the filter or the page size invalidates the current offset, so
/// both reset the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub filter: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            filter: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingParams {
    /// Parses a deep-link query string such as `name=hulk&page=2&limit=50`.
    ///
    /// The filter is read from the collection's filter parameter (`name` for
    /// characters, `title` for comics). Parsing is lenient: a missing,
    /// non-numeric or below-1 `page` or `limit` falls back to its default.
    ///
    /// ```rust
    /// use kodex::pagination::ListingParams;
    /// use kodex::types::Collection;
    ///
    /// let params = ListingParams::parse("?title=x-men&page=abc&limit=0", Collection::Comics);
    /// assert_eq!(params.filter.as_deref(), Some("x-men"));
    /// assert_eq!(params.page, 1);
    /// assert_eq!(params.limit, 20);
    /// ```
    pub fn parse(query: &str, collection: Collection) -> Self {
        let query = query.trim_start_matches('?');
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                k if k == collection.filter_param() => {
                    params.filter = normalize_filter(Some(value.as_ref()))
                }
                "page" => params.page = parse_positive(&value).unwrap_or(1),
                "limit" => params.limit = parse_positive(&value).unwrap_or(DEFAULT_PAGE_SIZE),
                _ => {}
            }
        }
        params
    }

    /// Renders the canonical deep link, omitting default values.
    ///
    /// ```rust
    /// use kodex::pagination::ListingParams;
    /// use kodex::types::Collection;
    ///
    /// let params = ListingParams::default().with_filter("spider man").with_page(3);
    /// assert_eq!(params.to_query_string(Collection::Characters), "name=spider%20man&page=3");
    /// assert_eq!(ListingParams::default().to_query_string(Collection::Comics), "");
    /// ```
    pub fn to_query_string(&self, collection: Collection) -> String {
        let mut parts = Vec::new();
        if let Some(filter) = &self.filter {
            parts.push(format!(
                "{}={}",
                collection.filter_param(),
                urlencoding::encode(filter)
            ));
        }
        if self.page > 1 {
            parts.push(format!("page={}", self.page));
        }
        if self.limit != DEFAULT_PAGE_SIZE {
            parts.push(format!("limit={}", self.limit));
        }
        parts.join("&")
    }

    /// Navigates to `page` (clamped to at least 1).
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Changes the page size and resets to the first page.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        self.page = 1;
        self
    }

    /// Changes the filter text and resets to the first page.
    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = normalize_filter(Some(filter));
        self.page = 1;
        self
    }

    /// Clears the filter and resets to the first page.
    pub fn reset_filter(mut self) -> Self {
        self.filter = None;
        self.page = 1;
        self
    }

    /// Page query this listing state fetches.
    pub fn query(&self) -> PageQuery {
        PageQuery::for_page(self.page, self.limit, self.filter.as_deref())
    }

    /// Bounds of this listing given the last fetched page.
    pub fn bounds(&self, total: Option<u64>, results_len: usize) -> PageBounds {
        resolve(self.page, self.limit, total, results_len)
    }
}

fn parse_positive(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|n| *n >= 1)
}
