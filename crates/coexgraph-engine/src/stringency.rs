//! Display vs. results stringency.
//!
//! The client only holds results whose support is at least the stringency
//! they were fetched at. Any display stringency at or above that floor is a
//! local refilter; anything below needs a new search.

use coexgraph_common::entities::SearchRequest;

/// Stringency to fetch at for a given display stringency. Large displays
/// fetch somewhat lower so small downward adjustments stay local.
pub fn restrict_results_stringency(display_stringency: u32, min_stringency: u32) -> u32 {
    if display_stringency > 5 {
        let lowered = display_stringency - (display_stringency as f64 / 4.0).round() as u32;
        lowered.max(min_stringency)
    } else {
        min_stringency
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringencyDecision {
    /// Cached results cover the value; just filter again.
    Refilter { display_stringency: u32 },
    /// The value is below what was fetched.
    NewSearchRequired {
        display_stringency: u32,
        request: SearchRequest,
    },
}
