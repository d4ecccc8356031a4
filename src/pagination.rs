//! Paginated results and the numbered pagination control.
//!
//! Page indexes are 0-based everywhere inside the crate. The 1-based page
//! number only exists in the URL `page` parameter and in rendered controls;
//! [`PageRequest::from_display`] and [`PageWindow`] are the two crossings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Items per page when the configuration does not override it.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Numbered page links shown by the pagination control.
pub const DEFAULT_ITEMS_TO_DISPLAY: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// One page to fetch: 0-based index plus capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageRequest {
    index: usize,
    size: usize,
}

impl PageRequest {
    pub fn new(index: usize, size: usize) -> Self {
        Self {
            index,
            size: size.max(1),
        }
    }

    /// Converts the 1-based page number from a URL; missing or zero means the
    /// first page.
    pub fn from_display(page: Option<usize>, size: usize) -> Self {
        let index = page.unwrap_or(1).saturating_sub(1);
        Self::new(index, size)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset(&self) -> usize {
        self.index.saturating_mul(self.size)
    }
}

/// Page envelope as sent by the backend. Only `items`, `index`, `size` and
/// `count` are read; everything else is recomputed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub index: usize,
    pub size: usize,
    pub count: usize,
}

/// One page of records together with its position in the whole result set.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub index: usize,
    pub size: usize,
    pub count: usize,
    pub pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    /// Builds a page, deriving `pages`, `has_previous` and `has_next` and
    /// clamping `index` and `items` so the invariants always hold.
    pub fn new(mut items: Vec<T>, index: usize, size: usize, count: usize) -> Self {
        let size = size.max(1);
        let pages = count.div_ceil(size);
        let index = if pages == 0 {
            0
        } else {
            index.min(pages - 1)
        };
        items.truncate(size);

        Self {
            items,
            index,
            size,
            count,
            pages,
            has_previous: index > 0,
            has_next: pages > 0 && index < pages - 1,
        }
    }

    pub fn empty(size: usize) -> Self {
        Self::new(Vec::new(), 0, size, 0)
    }

    pub fn from_envelope(envelope: PageEnvelope<T>) -> Result<Self, PaginationError> {
        if envelope.size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self::new(
            envelope.items,
            envelope.index,
            envelope.size,
            envelope.count,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn control(&self) -> PaginationControl {
        PaginationControl::new(self.index, self.pages)
    }
}

impl<T: Clone> Paginated<T> {
    /// Client-driven pagination over a collection already held in memory.
    pub fn from_slice(all: &[T], request: PageRequest) -> Self {
        let count = all.len();
        let pages = count.div_ceil(request.size());
        let index = request.index().min(pages.saturating_sub(1));
        let start = (index * request.size()).min(count);
        let end = (start + request.size()).min(count);

        Self::new(all[start..end].to_vec(), index, request.size(), count)
    }
}

/// Page navigation state for one paginated view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationControl {
    current: usize,
    total_pages: usize,
}

impl PaginationControl {
    pub fn new(current: usize, total_pages: usize) -> Self {
        Self {
            current: current.min(total_pages.saturating_sub(1)),
            total_pages,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Index of the previous page, `None` on the first page.
    pub fn previous(&self) -> Option<usize> {
        self.current.checked_sub(1)
    }

    /// Index of the next page, `None` on the last page.
    pub fn next(&self) -> Option<usize> {
        let next = self.current + 1;
        (next < self.total_pages).then_some(next)
    }

    /// Moves back one page. Returns `false` and leaves the state untouched on
    /// the first page.
    pub fn go_previous(&mut self) -> bool {
        match self.previous() {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// Moves forward one page. Returns `false` and leaves the state untouched
    /// on the last page.
    pub fn go_next(&mut self) -> bool {
        match self.next() {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    /// Numbered window of at most `items_to_display` pages around the current
    /// page.
    pub fn window(&self, items_to_display: usize) -> PageWindow {
        PageWindow::compute(self.current + 1, self.total_pages, items_to_display)
    }
}

/// Contiguous, 1-based page numbers to render plus ellipsis markers.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<usize>,
    pub current: usize,
    pub left_ellipsis: bool,
    pub right_ellipsis: bool,
}

impl PageWindow {
    /// `current_page` is 1-based. The window holds
    /// `min(items_to_display, total_pages)` numbers, is centred on the current
    /// page where possible and is clamped to `[1, total_pages]`.
    pub fn compute(current_page: usize, total_pages: usize, items_to_display: usize) -> Self {
        if total_pages == 0 {
            return Self {
                pages: Vec::new(),
                current: 1,
                left_ellipsis: false,
                right_ellipsis: false,
            };
        }

        let current = current_page.clamp(1, total_pages);
        let len = items_to_display.max(1).min(total_pages);
        let start = current
            .saturating_sub(len / 2)
            .max(1)
            .min(total_pages - len + 1);
        let end = start + len - 1;

        Self {
            pages: (start..=end).collect(),
            current,
            left_ellipsis: start != 1,
            right_ellipsis: end != total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_flags_follow_index_and_pages() {
        for count in 0..40 {
            for size in 1..7 {
                for index in 0..10 {
                    let page = Paginated::new(vec![(); size.min(count)], index, size, count);
                    assert_eq!(page.pages, count.div_ceil(size));
                    assert!(page.items.len() <= page.size);
                    if page.pages == 0 {
                        assert_eq!(page.index, 0);
                    } else {
                        assert!(page.index < page.pages);
                        assert_eq!(page.has_next, page.index < page.pages - 1);
                    }
                    assert_eq!(page.has_previous, page.index > 0);
                }
            }
        }
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page: Paginated<u8> = Paginated::empty(20);
        assert_eq!(page.pages, 0);
        assert_eq!(page.index, 0);
        assert!(!page.has_previous);
        assert!(!page.has_next);
        assert!(page.is_empty());
    }

    #[test]
    fn envelope_fields_are_recomputed() {
        let envelope: PageEnvelope<u32> = serde_json::from_str(
            r#"{"items":[1,2,3],"index":1,"size":2,"count":5,"pages":9,"hasPrevious":false,"hasNext":false}"#,
        )
        .unwrap();
        let page = Paginated::from_envelope(envelope).unwrap();

        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.pages, 3);
        assert!(page.has_previous);
        assert!(page.has_next);
    }

    #[test]
    fn envelope_with_zero_size_is_rejected() {
        let envelope = PageEnvelope::<u32> {
            items: vec![],
            index: 0,
            size: 0,
            count: 0,
        };
        assert_eq!(
            Paginated::from_envelope(envelope),
            Err(PaginationError::ZeroPageSize)
        );
    }

    #[test]
    fn window_is_contiguous_and_contains_current() {
        for total in 1..15 {
            for display in 1..9 {
                for current in 1..=total {
                    let window = PageWindow::compute(current, total, display);
                    assert_eq!(window.pages.len(), display.min(total));
                    assert!(window.pages.contains(&current));
                    assert!(window.pages.windows(2).all(|pair| pair[1] == pair[0] + 1));
                    assert_eq!(window.left_ellipsis, window.pages[0] != 1);
                    assert_eq!(
                        window.right_ellipsis,
                        *window.pages.last().unwrap() != total
                    );
                }
            }
        }
    }

    #[test]
    fn window_at_first_page() {
        let window = PageWindow::compute(1, 10, DEFAULT_ITEMS_TO_DISPLAY);
        assert_eq!(window.pages, vec![1, 2, 3, 4, 5]);
        assert!(!window.left_ellipsis);
        assert!(window.right_ellipsis);
    }

    #[test]
    fn window_in_the_middle_and_at_the_end() {
        let middle = PageWindow::compute(6, 10, 5);
        assert_eq!(middle.pages, vec![4, 5, 6, 7, 8]);
        assert!(middle.left_ellipsis && middle.right_ellipsis);

        let end = PageWindow::compute(10, 10, 5);
        assert_eq!(end.pages, vec![6, 7, 8, 9, 10]);
        assert!(end.left_ellipsis);
        assert!(!end.right_ellipsis);
    }

    #[test]
    fn next_on_last_page_is_a_no_op() {
        let mut control = PaginationControl::new(9, 10);
        assert_eq!(control.next(), None);
        assert!(!control.go_next());
        assert_eq!(control.current(), 9);
    }

    #[test]
    fn previous_on_first_page_is_a_no_op() {
        let mut control = PaginationControl::new(0, 10);
        assert_eq!(control.previous(), None);
        assert!(!control.go_previous());
        assert_eq!(control.current(), 0);
        assert!(control.go_next());
        assert_eq!(control.current(), 1);
    }

    #[test]
    fn display_page_converts_to_zero_based_index() {
        assert_eq!(PageRequest::from_display(Some(3), 20).index(), 2);
        assert_eq!(PageRequest::from_display(Some(0), 20).index(), 0);
        assert_eq!(PageRequest::from_display(None, 20).index(), 0);
        assert_eq!(PageRequest::from_display(Some(3), 20).offset(), 40);
    }

    #[test]
    fn slice_pagination_clamps_out_of_range_pages() {
        let all: Vec<u32> = (1..=12).collect();

        let second = Paginated::from_slice(&all, PageRequest::new(1, 5));
        assert_eq!(second.items, vec![6, 7, 8, 9, 10]);

        let beyond = Paginated::from_slice(&all, PageRequest::new(7, 5));
        assert_eq!(beyond.index, 2);
        assert_eq!(beyond.items, vec![11, 12]);
        assert!(!beyond.has_next);

        let none: Paginated<u32> = Paginated::from_slice(&[], PageRequest::new(3, 5));
        assert_eq!(none.pages, 0);
        assert!(none.items.is_empty());
    }
}
