//! Timestamp grammar for annotation tokens.
//!
//! Timestamps have the shape `H:MM:SS` or `HH:MM:SS`, with an optional
//! fractional second of one to three digits (`HH:MM:SS.fff`). Minutes and
//! seconds are exactly two digits and must be below 60.

/// Parse a timestamp at the start of `input`.
///
/// Returns the value in seconds and the number of bytes consumed, or `None`
/// if `input` does not begin with a well-formed timestamp. Trailing input is
/// left for the caller.
pub fn parse_timestamp(input: &str) -> Option<(f64, usize)> {
    let bytes = input.as_bytes();
    let mut pos = 0;

    let (hours, len) = read_digits(bytes, pos, 1, 2)?;
    pos += len;

    pos = expect(bytes, pos, b':')?;
    let (minutes, len) = read_digits(bytes, pos, 2, 2)?;
    pos += len;

    pos = expect(bytes, pos, b':')?;
    let (seconds, len) = read_digits(bytes, pos, 2, 2)?;
    pos += len;

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let mut value = (hours * 3600 + minutes * 60 + seconds) as f64;

    // Optional fractional second: '.' followed by 1-3 digits.
    if bytes.get(pos) == Some(&b'.') {
        let (frac, len) = read_digits(bytes, pos + 1, 1, 3)?;
        value += frac as f64 / 10f64.powi(len as i32);
        pos += 1 + len;
    }

    Some((value, pos))
}

/// Render seconds as `H:MM:SS` (or `H:MM:SS.fff` when sub-second precision
/// is present), the same shape the parser accepts.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let millis = (seconds * 1000.0).round() as u64;
    let (whole, frac) = (millis / 1000, millis % 1000);
    let (h, m, s) = (whole / 3600, (whole % 3600) / 60, whole % 60);

    if frac == 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}:{:02}.{:03}", h, m, s, frac)
    }
}

/// Read between `min` and `max` ASCII digits starting at `pos`.
///
/// Stops at `max` digits even if more follow, so `HH:MM` boundaries stay
/// unambiguous. Returns the value and the digit count.
fn read_digits(bytes: &[u8], pos: usize, min: usize, max: usize) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    let mut count = 0;

    while count < max {
        match bytes.get(pos + count) {
            Some(b) if b.is_ascii_digit() => {
                value = value * 10 + (b - b'0') as u64;
                count += 1;
            }
            _ => break,
        }
    }

    if count < min {
        None
    } else {
        Some((value, count))
    }
}

fn expect(bytes: &[u8], pos: usize, byte: u8) -> Option<usize> {
    if bytes.get(pos) == Some(&byte) {
        Some(pos + 1)
    } else {
        None
    }
}
