//! Result pagination.
//!
//! The paginator only slices; ordering is owned by the scorer and is
//! never revisited here.

/// Slice `results` for a 1-based `page` of `page_size` entries.
/// A page past the end yields an empty slice, not an error; page and
/// page_size of 0 are treated as 1.
pub fn paginate<T>(results: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let page_size = page_size.max(1);

    let start = (page - 1).saturating_mul(page_size);
    if start >= results.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(results.len());
    &results[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slicing() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(paginate(&items, 1, 4), &[0, 1, 2, 3]);
        assert_eq!(paginate(&items, 2, 4), &[4, 5, 6, 7]);
        assert_eq!(paginate(&items, 3, 4), &[8, 9]);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items: Vec<u32> = (0..10).collect();
        assert!(paginate(&items, 4, 4).is_empty());
        assert!(paginate(&items, 100, 4).is_empty());
    }

    #[test]
    fn test_zero_inputs_clamped() {
        let items: Vec<u32> = (0..3).collect();
        assert_eq!(paginate(&items, 0, 2), &[0, 1]);
        assert_eq!(paginate(&items, 1, 0), &[0]);
    }

    #[test]
    fn test_pages_partition_exactly() {
        let items: Vec<u32> = (0..23).collect();
        let page_size = 5;
        let mut reassembled = Vec::new();
        let mut page = 1;
        loop {
            let slice = paginate(&items, page, page_size);
            if slice.is_empty() {
                break;
            }
            reassembled.extend_from_slice(slice);
            page += 1;
        }
        assert_eq!(reassembled, items);
    }
}
