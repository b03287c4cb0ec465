//! Physical address token validation.

use std::borrow::Cow;

/// Highest physical address accepted (40-bit address space)
pub const MAX_PHYS_ADDR: u64 = (1 << 40) - 1;

const HEX_PREFIX: &str = "0x";

/// Why a token was not accepted as a physical address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRejection {
    /// Token does not start with `0x` after trimming
    MissingPrefix,
    /// Remainder after the prefix is empty or not base-16
    InvalidHex,
    /// Parsed value exceeds [`MAX_PHYS_ADDR`]
    OutOfRange,
}

/// Parse a raw CSV token into a physical address.
///
/// Surrounding whitespace is ignored. Only the lowercase `0x` prefix is
/// recognized. Digits are ASCII hex and may be grouped with single
/// underscores (`0x7f_ff00`, `0x_1f`), but no sign is allowed.
/// Numerals too wide for 64 bits are reported as [`AddressRejection::OutOfRange`].
pub fn parse_phys_addr(token: &str) -> Result<u64, AddressRejection> {
    let digits = token
        .trim()
        .strip_prefix(HEX_PREFIX)
        .ok_or(AddressRejection::MissingPrefix)?;
    let digits = digits.strip_prefix('_').unwrap_or(digits);

    let well_formed = digits
        .split('_')
        .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_hexdigit()));
    if !well_formed {
        return Err(AddressRejection::InvalidHex);
    }

    let digits: Cow<'_, str> = if digits.contains('_') {
        Cow::Owned(digits.replace('_', ""))
    } else {
        Cow::Borrowed(digits)
    };

    // Digits are validated above, so the only remaining failure is overflow
    let addr = u64::from_str_radix(&digits, 16).map_err(|_| AddressRejection::OutOfRange)?;
    if addr > MAX_PHYS_ADDR {
        return Err(AddressRejection::OutOfRange);
    }

    Ok(addr)
}
