use memodrill_lib::deck::Card;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// `Q♠`, red for hearts and diamonds
pub fn card_label(card: Card, use_color: bool) -> String {
    let label = card.to_string();
    if card.suit.is_red() {
        paint(&label, Color::RED, use_color)
    } else {
        paint(&label, Color::BOLD, use_color)
    }
}

pub fn heading(text: &str, use_color: bool) -> String {
    paint(text, Color::BOLD, use_color)
}

/// Milliseconds rounded for display, e.g. `833ms`
pub fn format_ms(ms: f64) -> String {
    format!("{}ms", ms.round() as i64)
}

pub fn format_speed(cards_per_min: Option<f64>) -> String {
    match cards_per_min {
        Some(speed) => format!("{:.1}/min", speed),
        None => "-".to_string(),
    }
}

/// Horizontal bar scaled so that `max` fills `width` cells
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "\u{2588}".repeat(cells.clamp(1, width))
}

/// Box-drawing rule under a table header
pub fn rule(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|w| "\u{2500}".repeat(*w))
        .collect::<Vec<_>>()
        .join(" ")
}
