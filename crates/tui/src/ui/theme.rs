use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub positive: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(8, 12, 16),
            surface: Color::Rgb(20, 26, 32),
            text: Color::Rgb(220, 220, 220),
            text_muted: Color::Rgb(170, 170, 170),
            dim: Color::Rgb(120, 120, 120),
            accent: Color::Rgb(124, 92, 230),
            border: Color::Rgb(60, 66, 76),
            border_focused: Color::Rgb(124, 92, 230),
            positive: Color::Rgb(80, 180, 120),
            warning: Color::Rgb(220, 170, 60),
            error: Color::Rgb(200, 80, 80),
        }
    }
}

const CATEGORY_PALETTE: [Color; 15] = [
    Color::Rgb(220, 38, 38),
    Color::Rgb(234, 88, 12),
    Color::Rgb(217, 119, 6),
    Color::Rgb(22, 163, 74),
    Color::Rgb(5, 150, 105),
    Color::Rgb(13, 148, 136),
    Color::Rgb(8, 145, 178),
    Color::Rgb(2, 132, 199),
    Color::Rgb(37, 99, 235),
    Color::Rgb(79, 70, 229),
    Color::Rgb(124, 58, 237),
    Color::Rgb(147, 51, 234),
    Color::Rgb(192, 38, 211),
    Color::Rgb(219, 39, 119),
    Color::Rgb(225, 29, 72),
];

/// Colors used for report rows, in rank order.
pub const REPORT_PALETTE: [Color; 9] = [
    Color::Rgb(99, 102, 241),
    Color::Rgb(139, 92, 246),
    Color::Rgb(236, 72, 153),
    Color::Rgb(244, 63, 94),
    Color::Rgb(249, 115, 22),
    Color::Rgb(234, 179, 8),
    Color::Rgb(34, 197, 94),
    Color::Rgb(6, 182, 212),
    Color::Rgb(59, 130, 246),
];

/// A color that stays the same for a category across runs.
pub fn category_color(category: &str) -> Color {
    let hash = category
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
        });
    CATEGORY_PALETTE[hash.unsigned_abs() as usize % CATEGORY_PALETTE.len()]
}

pub fn report_color(rank: usize) -> Color {
    REPORT_PALETTE[rank % REPORT_PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_colors_are_stable() {
        assert_eq!(category_color("Oil change"), category_color("Oil change"));
        // "a" hashes to 97.
        assert_eq!(category_color("a"), CATEGORY_PALETTE[97 % 15]);
        assert_eq!(category_color(""), CATEGORY_PALETTE[0]);
    }

    #[test]
    fn report_colors_wrap_around() {
        assert_eq!(report_color(0), report_color(REPORT_PALETTE.len()));
    }
}
