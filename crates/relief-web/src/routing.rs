//! Year selection from the URL hash.

use relief_core::route::parse_year_route;
use relief_core::Year;

/// Year requested by `hash`, if it names one of `years`.
pub fn routed_year(years: &[Year], hash: &str) -> Option<Year> {
    let year = parse_year_route(hash)?;
    if years.contains(&year) {
        Some(year)
    } else {
        log::warn!("Ignoring route to unknown year {year}");
        None
    }
}

/// Year shown at startup: the routed one when valid, otherwise the earliest.
pub fn initial_year(years: &[Year], hash: &str) -> Option<Year> {
    routed_year(years, hash).or_else(|| years.first().copied())
}

/// Hash values the shell wrote itself. The `hashchange` each write causes
/// is an echo of a selection already made and must not select again.
#[derive(Debug, Default)]
pub struct OwnRoutes {
    pending: Option<String>,
}

impl OwnRoutes {
    pub fn record(&mut self, hash: String) {
        self.pending = Some(hash);
    }

    /// True once for the echo of the last recorded write.
    pub fn take_echo(&mut self, hash: &str) -> bool {
        if self.pending.as_deref() == Some(hash) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}
