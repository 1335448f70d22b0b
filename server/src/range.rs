//! `Range` header parsing.

use bridge_traits::storage::ByteRange;

/// Parse a single-range `Range` header value.
///
/// Accepts `bytes=a-b` and the open form `bytes=a-`. Suffix ranges
/// (`bytes=-n`) and multipart ranges are not served partially; returning
/// `None` makes the caller fall back to full content, which every player
/// accepts.
pub fn parse_range_header(value: &str) -> Option<ByteRange> {
    let raw = value.strip_prefix("bytes=")?.trim();
    if raw.contains(',') {
        return None;
    }

    let (start_part, end_part) = raw.split_once('-')?;
    let start_part = start_part.trim();
    if start_part.is_empty() {
        // Suffix range.
        return None;
    }

    let start: u64 = start_part.parse().ok()?;
    let end_part = end_part.trim();
    let end = if end_part.is_empty() {
        None
    } else {
        let end: u64 = end_part.parse().ok()?;
        if end < start {
            return None;
        }
        Some(end)
    };

    Some(ByteRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_range() {
        let range = parse_range_header("bytes=0-1023").unwrap();
        assert_eq!(range.start, 0);
        assert_eq!(range.end, Some(1023));
    }

    #[test]
    fn open_ended_range() {
        let range = parse_range_header("bytes=512-").unwrap();
        assert_eq!(range.start, 512);
        assert_eq!(range.end, None);
    }

    #[test]
    fn suffix_range_falls_back() {
        assert!(parse_range_header("bytes=-500").is_none());
    }

    #[test]
    fn multipart_range_falls_back() {
        assert!(parse_range_header("bytes=0-1,5-9").is_none());
    }

    #[test]
    fn malformed_values_fall_back() {
        assert!(parse_range_header("bytes=abc-def").is_none());
        assert!(parse_range_header("items=0-5").is_none());
        assert!(parse_range_header("bytes=9-2").is_none());
        assert!(parse_range_header("bytes=").is_none());
    }
}
