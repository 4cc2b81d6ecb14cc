// Colours are u32 in packed ARGB format: 0xAARRGGBB (straight alpha)

pub const TRANSPARENT: u32 = 0x00_00_00_00;
pub const BLACK: u32 = 0xFF_00_00_00;
pub const WHITE: u32 = 0xFF_FF_FF_FF;

/// Parse a panel colour string.
///
/// Accepts `#RRGGBB`, `#RRGGBBAA` (alpha last, as the project files store it)
/// and the bare hex forms without `#`.
pub fn parse_colour(text: &str) -> Option<u32> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(0xFF00_0000 | value),
        8 => Some((value >> 8) | ((value & 0xFF) << 24)),
        _ => None,
    }
}

/// Format as `#RRGGBBAA`
pub fn format_colour(colour: u32) -> String {
    format!("#{:06X}{:02X}", colour & 0x00FF_FFFF, colour >> 24)
}

#[inline]
pub fn alpha_of(colour: u32) -> u8 {
    (colour >> 24) as u8
}

/// Replace the alpha channel
#[inline]
pub fn with_alpha(colour: u32, alpha: u8) -> u32 {
    (colour & 0x00FF_FFFF) | ((alpha as u32) << 24)
}

/// Lighten (positive) or darken (negative) each RGB channel, keeping alpha
pub fn shade(colour: u32, delta: i16) -> u32 {
    let channel = |shift: u32| -> u32 {
        let c = ((colour >> shift) & 0xFF) as i16 + delta;
        (c.clamp(0, 255) as u32) << shift
    };
    (colour & 0xFF00_0000) | channel(16) | channel(8) | channel(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colour_forms() {
        assert_eq!(parse_colour("#FF0000"), Some(0xFFFF0000));
        assert_eq!(parse_colour("00ff00"), Some(0xFF00FF00));
        assert_eq!(parse_colour("#0000FF80"), Some(0x800000FF));
        assert_eq!(parse_colour("#12345"), None);
        assert_eq!(parse_colour("#GG0000"), None);
    }

    #[test]
    fn test_format_round_trip_example() {
        assert_eq!(format_colour(0x800000FF), "#0000FF80");
    }

    #[test]
    fn test_shade_clamps() {
        assert_eq!(shade(0xFF_F0_10_80, 20), 0xFF_FF_24_94);
        assert_eq!(shade(0x80_05_10_80, -10), 0x80_00_06_76);
    }
}
