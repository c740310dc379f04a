//! Linear scaling of raw disparity to 0..=255.

use crate::disparity::common::{NormalizedMap, RawDisparityMap};

/// Scales one raw value against `observed_max`, truncating.
///
/// Returns 0 for every value when `observed_max` is 0. Values above
/// `observed_max` saturate at 255.
#[inline]
pub fn normalize_value(value: u32, observed_max: u32) -> u8 {
    if observed_max == 0 {
        return 0;
    }
    let scaled = value as u64 * 255 / observed_max as u64;
    scaled.min(255) as u8
}

/// Maps a raw disparity grid to 8 bits against the given maximum.
pub fn normalize(map: &RawDisparityMap, observed_max: u32) -> NormalizedMap {
    NormalizedMap {
        width: map.width,
        height: map.height,
        data: map
            .data
            .iter()
            .map(|&v| normalize_value(v, observed_max))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_maps_everything_to_zero() {
        for v in [0, 1, 7, 15, u32::MAX] {
            assert_eq!(normalize_value(v, 0), 0);
        }
    }

    #[test]
    fn test_max_maps_to_255() {
        for max in [1, 2, 15, 63, 255, 1000] {
            assert_eq!(normalize_value(max, max), 255);
        }
    }

    #[test]
    fn test_truncating_division() {
        // 1 * 255 / 2 = 127.5
        assert_eq!(normalize_value(1, 2), 127);
        // 2 * 255 / 3 = 170
        assert_eq!(normalize_value(2, 3), 170);
        // 5 * 255 / 15 = 85
        assert_eq!(normalize_value(5, 15), 85);
    }

    #[test]
    fn test_monotonic() {
        for max in [1u32, 3, 15, 64] {
            let mut prev = 0u8;
            for v in 0..=max {
                let n = normalize_value(v, max);
                assert!(n >= prev, "normalize({v}, {max}) = {n} < {prev}");
                prev = n;
            }
        }
    }

    #[test]
    fn test_normalize_map() {
        let map = RawDisparityMap::from_buffer(2, 2, vec![0, 1, 2, 4]);
        let normalized = normalize(&map, map.observed_max);
        assert_eq!(normalized.data, vec![0, 63, 127, 255]);
        assert_eq!((normalized.width, normalized.height), (2, 2));
    }

    #[test]
    fn test_all_zero_map() {
        let map = RawDisparityMap::zeroed(3, 3);
        let normalized = normalize(&map, map.observed_max);
        assert!(normalized.data.iter().all(|&v| v == 0));
    }
}
