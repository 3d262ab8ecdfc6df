//! Fixed-size pages over a filtered and sorted collection.
//!
//! Page requests are clamped into `1..=total_pages`, so a page number left
//! over from a larger result set still yields a valid page.

use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// Effective 1-based page after clamping
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Controls are only worth showing when there is more than one page of data
    pub fn show_controls(&self) -> bool {
        self.total_rows > self.page_size
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 0-based position of the first row of this page in the full collection
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// Never zero, so an empty result still has a page 1
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    row_count.div_ceil(page_size).max(1)
}

pub fn clamp_page(page: usize, row_count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(row_count, page_size))
}

/// Slice out one page. A `page_size` of zero is treated as one.
pub fn paginate<T: Clone>(rows: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(rows.len(), page_size);
    let effective = clamp_page(page, rows.len(), page_size);
    if effective != page {
        trace!(target: "pager", "page {} clamped to {}", page, effective);
    }

    let start = ((effective - 1) * page_size).min(rows.len());
    let end = (effective * page_size).min(rows.len());

    Page {
        rows: rows[start..end].to_vec(),
        page: effective,
        total_pages,
        total_rows: rows.len(),
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_of_three() {
        let rows = vec!["Bob", "Al", "Cy"];
        let first = paginate(&rows, 1, 2);
        assert_eq!(first.rows, vec!["Bob", "Al"]);
        assert_eq!(first.total_pages, 2);
        assert!(first.show_controls());
        assert!(first.has_next());
        assert!(!first.has_previous());

        let second = paginate(&rows, 2, 2);
        assert_eq!(second.rows, vec!["Cy"]);
        assert_eq!(second.offset(), 2);
        assert!(!second.has_next());
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let rows: Vec<i32> = Vec::new();
        let page = paginate(&rows, 1, 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.is_empty());
        assert!(!page.show_controls());
    }

    #[test]
    fn test_out_of_range_pages_are_clamped() {
        let rows: Vec<i32> = (0..5).collect();
        let page = paginate(&rows, 9, 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.rows, vec![4]);

        let page = paginate(&rows, 0, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.rows, vec![0, 1]);
    }

    #[test]
    fn test_exact_fit_hides_controls() {
        let rows: Vec<i32> = (0..4).collect();
        let page = paginate(&rows, 1, 4);
        assert_eq!(page.total_pages, 1);
        assert!(!page.show_controls());
    }

    #[test]
    fn test_zero_page_size() {
        let rows = vec![1, 2];
        let page = paginate(&rows, 2, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.rows, vec![2]);
    }

    #[test]
    fn test_pages_cover_collection() {
        let rows: Vec<usize> = (0..23).collect();
        for page_size in 1..=25 {
            let pages = total_pages(rows.len(), page_size);
            let joined: Vec<usize> = (1..=pages)
                .flat_map(|p| paginate(&rows, p, page_size).rows)
                .collect();
            assert_eq!(joined, rows, "page_size {}", page_size);
        }
    }
}
