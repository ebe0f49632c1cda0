//! Pure calculation functions for output dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside a square of side `max_dimension`, preserving aspect.
///
/// Images whose longer edge already fits are returned unchanged; this never
/// upscales. Each edge is at least 1px.
///
/// # Examples
/// ```
/// # use web_optimizer::encoder::fit_within;
/// // 4000x3000 landscape bounded to 1920 → 1920x1440
/// assert_eq!(fit_within((4000, 3000), 1920), (1920, 1440));
///
/// // Already small enough: untouched
/// assert_eq!(fit_within((800, 600), 1920), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (w, h) = source;
    let longer = w.max(h);
    if longer <= max_dimension || longer == 0 {
        return source;
    }

    let scale = max_dimension as f64 / longer as f64;
    if w >= h {
        let new_h = ((h as f64 * scale).round() as u32).max(1);
        (max_dimension, new_h)
    } else {
        let new_w = ((w as f64 * scale).round() as u32).max(1);
        (new_w, max_dimension)
    }
}
