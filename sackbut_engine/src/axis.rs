//! Auxiliary X/Y sensors → controller values 0–127.

use crate::range::map_range;

/// Highest raw reading of the 10-bit converter.
pub const RAW_AXIS_MAX: u16 = 1023;

/// Map one raw axis reading to a controller value.
pub fn controller_value(raw: u16) -> u8 {
    let raw = raw.min(RAW_AXIS_MAX) as i32;
    map_range(raw, 0, 1024, 0, 127) as u8
}

/// Map both axes at once.
pub fn controller_values(raw_x: u16, raw_y: u16) -> (u8, u8) {
    (controller_value(raw_x), controller_value(raw_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_range() {
        assert_eq!(controller_value(0), 0);
        assert_eq!(controller_value(512), 63);
        assert_eq!(controller_value(1023), 126);
    }

    #[test]
    fn out_of_range_clamps() {
        assert_eq!(controller_value(4000), controller_value(1023));
    }

    #[test]
    fn axes_independent() {
        assert_eq!(controller_values(0, 1023), (0, 126));
    }
}
