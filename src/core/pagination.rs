use serde::Serialize;

/// Tickets shown per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub number: usize,
    pub num_pages: usize,
    /// Total number of items across all pages
    pub count: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn next_page_number(&self) -> Option<usize> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> Option<usize> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }

    /// 1-based index of the first item on this page, 0 for an empty result
    #[must_use]
    pub const fn start_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page
    #[must_use]
    pub const fn end_index(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.items.len() - 1
        }
    }

    /// Map the items, keeping page metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}

/// Splits an ordered list into pages
///
/// Page lookup never fails: a missing or non-numeric page number yields the
/// first page, and a number outside `1..=num_pages` yields the last page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    /// A zero page size is treated as one item per page
    #[must_use]
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of pages for `count` items; an empty result still has one page
    #[must_use]
    pub const fn num_pages(&self, count: usize) -> usize {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw page parameter to a valid page number
    #[must_use]
    pub fn resolve(&self, raw: Option<&str>, count: usize) -> usize {
        let num_pages = self.num_pages(count);
        match raw.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if n >= 1 && usize::try_from(n).is_ok_and(|n| n <= num_pages) => {
                usize::try_from(n).unwrap_or(num_pages)
            },
            Some(Ok(_)) => num_pages,
            Some(Err(_)) | None => 1,
        }
    }

    /// Cut the requested page out of `items`
    pub fn page<T>(&self, items: Vec<T>, raw: Option<&str>) -> Page<T> {
        let count = items.len();
        let number = self.resolve(raw, count);
        let start = (number - 1) * self.per_page;
        let items: Vec<T> = items.into_iter().skip(start).take(self.per_page).collect();

        Page {
            items,
            number,
            num_pages: self.num_pages(count),
            count,
            per_page: self.per_page,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
