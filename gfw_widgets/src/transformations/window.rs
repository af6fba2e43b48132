/// Resolved inclusive `[start, end]` index range over a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushWindow {
    pub start: usize,
    pub end: usize,
}

impl BrushWindow {
    /// Number of points covered, always at least one.
    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Resolve optional brush indices against a series length.
///
/// Missing indices default to the full range. Indices past the end are
/// clamped to the last point and an end before the start collapses to the
/// start. `None` only for an empty series.
pub fn resolve_window(len: usize, start: Option<usize>, end: Option<usize>) -> Option<BrushWindow> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    let start_idx = start.unwrap_or(0);
    let end_idx = end.unwrap_or(last);

    let clamped_start = start_idx.min(last);
    let clamped_end = end_idx.min(last).max(clamped_start);
    if clamped_start != start_idx || clamped_end != end_idx {
        log::warn!(
            "Brush window [{}, {}] clamped to [{}, {}] for {} points",
            start_idx,
            end_idx,
            clamped_start,
            clamped_end,
            len
        );
    }

    Some(BrushWindow {
        start: clamped_start,
        end: clamped_end,
    })
}

/// Keep the points inside the brush window, `end` inclusive.
pub fn brush<T: Clone>(points: &[T], start: Option<usize>, end: Option<usize>) -> Vec<T> {
    match resolve_window(points.len(), start, end) {
        Some(window) => points[window.start..=window.end].to_vec(),
        None => Vec::new(),
    }
}

/// Keep the last `weeks` points. `None` or 0 keeps everything.
pub fn trailing<T: Clone>(points: &[T], weeks: Option<usize>) -> Vec<T> {
    match weeks {
        Some(n) if n > 0 && n < points.len() => points[points.len() - n..].to_vec(),
        _ => points.to_vec(),
    }
}
