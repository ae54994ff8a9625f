//! Small colour and clock helpers used by the chart header and node styling.

/// Shifts every RGB channel of a `#rrggbb` colour by `amount`, clamping to `0..=255`.
/// Unparseable input is returned unchanged.
pub fn adjust_color(color: &str, amount: i32) -> String {
    let hex = color.trim().trim_start_matches('#');
    let Ok(num) = u32::from_str_radix(hex, 16) else {
        return color.to_string();
    };
    if hex.len() != 6 {
        return color.to_string();
    }
    let channel = |shift: u32| ((((num >> shift) & 0xff) as i32) + amount).clamp(0, 255) as u32;
    let (r, g, b) = (channel(16), channel(8), channel(0));
    format!("#{:06x}", (r << 16) | (g << 8) | b)
}

/// `"20:00"` -> `"8:00 PM"`. `None` when the input is not `HH:MM`.
pub fn convert_to_12_hour(time24: &str) -> Option<String> {
    let (hours, minutes) = time24.trim().split_once(':')?;
    let h: u32 = hours.parse().ok()?;
    if h > 23 || minutes.len() != 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let suffix = if h >= 12 { "PM" } else { "AM" };
    let h12 = match h {
        0 => 12,
        13.. => h - 12,
        _ => h,
    };
    Some(format!("{h12}:{minutes} {suffix}"))
}
