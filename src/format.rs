// =============================================================================
// Fixed-point number formatting
// =============================================================================
//
// Rust's `{:.N}` rounds exact binary ties to even (0.03125 -> "0.0312").
// Report strings round ties away from zero instead (0.03125 -> "0.0313"), so
// every fixed-precision rendering in the crate goes through `to_fixed`.

/// Fractional digits needed to print any finite `f64` exactly
/// (the smallest subnormal is 2^-1074).
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Largest precision `to_fixed` honours; larger requests are clamped.
pub const MAX_FIXED_DIGITS: usize = 100;

/// Render `value` with exactly `digits` fractional digits.
///
/// Rounding is done on the exact decimal expansion of `value`: a remainder of
/// half a unit or more rounds away from zero. Non-finite values render as
/// `NaN`, `Infinity` or `-Infinity`. Negative zero renders without a sign.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let digits = digits.min(MAX_FIXED_DIGITS);
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();

    let round_up = frac_part
        .as_bytes()
        .get(digits)
        .map_or(false, |d| *d >= b'5');
    if round_up {
        let mut carried = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carried = false;
                break;
            }
        }
        if carried {
            kept.insert(0, b'1');
        }
    }

    let int_len = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..int_len].iter().map(|&b| b as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[int_len..].iter().map(|&b| b as char));
    }
    out
}
