use crate::constants::THOUSANDS_SEPARATOR;
use crate::types::Population;

/// Format a population with grouped thousands: `1883425` → `"1,883,425"`.
pub fn format_population(population: Population) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

/// Overlay line shown for a hovered region.
pub fn overlay_text(name: &str, population: Population) -> String {
    format!("{}: {}", name, format_population(population))
}
