//! Offset-based pagination.

use crate::error::{DomainError, DomainResult};

/// Zero-based offset/size window over an ordered result.
///
/// `offset` counts records, not pages: `from=5, size=2` yields records 5 and 6.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    offset: usize,
    size: usize,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(offset: i64, size: i64) -> DomainResult<Self> {
        if size <= 0 {
            return Err(DomainError::InvalidPageSize(size));
        }
        if offset < 0 {
            return Err(DomainError::InvalidPageOffset(offset));
        }
        Ok(Self {
            offset: offset as usize,
            size: size as usize,
        })
    }

    /// Unbounded page, used where a listing is not paginated.
    pub fn unbounded() -> Self {
        Self {
            offset: 0,
            size: usize::MAX,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cut this window out of an already ordered sequence.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.size).collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            size: Self::DEFAULT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_an_item_count_not_a_page_index() {
        let page = PageRequest::new(3, 2).unwrap();
        assert_eq!(page.slice(0..10), vec![3, 4]);
    }

    #[test]
    fn rejects_non_positive_size() {
        assert_eq!(PageRequest::new(0, 0), Err(DomainError::InvalidPageSize(0)));
        assert_eq!(PageRequest::new(0, -1), Err(DomainError::InvalidPageSize(-1)));
    }

    #[test]
    fn rejects_negative_offset() {
        assert_eq!(PageRequest::new(-1, 5), Err(DomainError::InvalidPageOffset(-1)));
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let page = PageRequest::new(20, 5).unwrap();
        assert!(page.slice(0..10).is_empty());
    }
}
