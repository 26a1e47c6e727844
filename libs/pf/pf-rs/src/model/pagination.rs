use crate::model::errors::{PfErrKind, PfResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// 1-based.
    pub number: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

pub fn total_pages(len: usize, items_per_page: usize) -> PfResult<usize> {
    if items_per_page == 0 {
        return Err(PfErrKind::InvalidPageSize.into());
    }
    Ok(len.div_ceil(items_per_page))
}

/// Slice `items[(page-1)*per_page .. page*per_page]`. Page 0 is read as page 1 and a page past
/// the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, items_per_page: usize) -> PfResult<Page<T>> {
    let total_pages = total_pages(items.len(), items_per_page)?;
    let number = page.max(1);

    let start = (number - 1).saturating_mul(items_per_page).min(items.len());
    let end = start.saturating_add(items_per_page).min(items.len());

    Ok(Page { number, total_pages, items: items[start..end].to_vec() })
}

/// Remembers the last key a view was rendered with and reports when it changes, so the caller can
/// send the view back to page 1 exactly once per change rather than once per render.
#[derive(Debug, Clone)]
pub struct PageGuard<K> {
    previous: K,
}

impl<K: PartialEq + Clone> PageGuard<K> {
    pub fn new(initial: K) -> Self {
        Self { previous: initial }
    }

    pub fn observe(&mut self, current: &K) -> bool {
        if &self.previous == current {
            return false;
        }
        self.previous = current.clone();
        true
    }
}
