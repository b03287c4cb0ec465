/// Sequential white-to-navy scale, sampled from the classic "Blues" ramp
const BLUES: [(u8, u8, u8); 9] = [
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];

/// Lowest point of the ramp a nonzero count is drawn with, keeping it clearly
/// apart from the white used for empty cells
const NONZERO_FLOOR: f64 = 0.2;

pub const EMPTY_CELL: (u8, u8, u8) = (0xff, 0xff, 0xff);

/// Interpolate the ramp at `t` in `[0, 1]`
pub fn blues(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0) * (BLUES.len() - 1) as f64;
    let i = (t.floor() as usize).min(BLUES.len() - 2);
    let frac = t - i as f64;
    let (a, b) = (BLUES[i], BLUES[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Color of a cell holding `count` accesses on a scale topping out at `max`
pub fn cell_color(count: u64, max: u64) -> (u8, u8, u8) {
    if count == 0 || max == 0 {
        return EMPTY_CELL;
    }
    blues(NONZERO_FLOOR + (1.0 - NONZERO_FLOOR) * (count as f64 / max as f64))
}

pub fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}
