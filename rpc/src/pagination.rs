//! Cursor-based pagination for list endpoints.

use serde::Deserialize;

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Query parameters accepted by paged list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Opaque cursor from a previous response.
    pub cursor: Option<String>,
    /// Items per page (default 100, max 1000).
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// The offset named by the cursor; 0 when absent or unreadable.
    pub fn decode_offset(&self) -> u64 {
        self.cursor.as_deref().and_then(decode_cursor).unwrap_or(0)
    }
}

/// Encode an offset as an opaque cursor (hex of the big-endian u64).
pub fn encode_cursor(offset: u64) -> String {
    hex::encode(offset.to_be_bytes())
}

pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let bytes: [u8; 8] = hex::decode(cursor.trim()).ok()?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// Cursor for the following page, or `None` once a short page was returned.
pub fn next_cursor(current_offset: u64, returned: usize, page_size: u32) -> Option<String> {
    if returned < page_size as usize {
        None
    } else {
        Some(encode_cursor(current_offset + returned as u64))
    }
}

/// Cut one page out of `items` and the cursor for the next.
pub fn paginate<T>(items: Vec<T>, params: &PaginationParams) -> (Vec<T>, Option<String>) {
    let offset = params.decode_offset();
    let count = params.effective_count();
    let page: Vec<T> = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(count as usize)
        .collect();
    let cursor = next_cursor(offset, page.len(), count);
    (page, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_roundtrip() {
        for offset in [0, 1, 100, u64::MAX] {
            assert_eq!(decode_cursor(&encode_cursor(offset)), Some(offset));
        }
    }

    #[test]
    fn garbage_cursor_means_start() {
        let params = PaginationParams {
            cursor: Some("zz".into()),
            count: None,
        };
        assert_eq!(params.decode_offset(), 0);
        assert_eq!(decode_cursor("0102"), None);
    }

    #[test]
    fn count_is_clamped() {
        let mut params = PaginationParams::default();
        assert_eq!(params.effective_count(), DEFAULT_PAGE_SIZE);
        params.count = Some(0);
        assert_eq!(params.effective_count(), 1);
        params.count = Some(5_000);
        assert_eq!(params.effective_count(), MAX_PAGE_SIZE);
    }

    #[test]
    fn pages_walk_the_list() {
        let items: Vec<u32> = (0..5).collect();
        let first = PaginationParams {
            cursor: None,
            count: Some(2),
        };
        let (page, cursor) = paginate(items.clone(), &first);
        assert_eq!(page, vec![0, 1]);

        let second = PaginationParams {
            cursor,
            count: Some(2),
        };
        let (page, cursor) = paginate(items.clone(), &second);
        assert_eq!(page, vec![2, 3]);

        let third = PaginationParams {
            cursor,
            count: Some(2),
        };
        let (page, cursor) = paginate(items, &third);
        assert_eq!(page, vec![4]);
        assert!(cursor.is_none());
    }
}
