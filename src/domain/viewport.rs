// Fixed-size pannable window over a chart's full dataset
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowInfo {
    /// 1-based index of the first visible record
    pub first: usize,
    pub last: usize,
    pub total: usize,
    pub can_pan_left: bool,
    pub can_pan_right: bool,
}

/// Holds the complete dataset of the latest cycle and exposes a contiguous
/// `window_size` slice of it.
///
/// `start` stays within `0..=max(0, len - window_size)` and goes back to 0
/// whenever the dataset is replaced.
#[derive(Debug, Clone)]
pub struct Viewport<T> {
    data: Vec<T>,
    start: usize,
    window_size: usize,
}

impl<T> Viewport<T> {
    pub fn new(window_size: usize) -> Self {
        Self {
            data: Vec::new(),
            start: 0,
            window_size: window_size.max(1),
        }
    }

    pub fn replace(&mut self, data: Vec<T>) {
        self.data = data;
        self.start = 0;
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn window(&self) -> &[T] {
        let end = (self.start + self.window_size).min(self.data.len());
        &self.data[self.start.min(end)..end]
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn can_pan_left(&self) -> bool {
        self.start > 0
    }

    pub fn can_pan_right(&self) -> bool {
        self.start + self.window_size < self.data.len()
    }

    pub fn pan_left(&mut self) {
        self.start = self.start.saturating_sub(self.window_size);
    }

    pub fn pan_right(&mut self) {
        if self.can_pan_right() {
            self.start = (self.start + self.window_size).min(self.data.len() - self.window_size);
        }
    }

    pub fn info(&self) -> WindowInfo {
        WindowInfo {
            first: self.start() + 1,
            last: (self.start() + self.window_size).min(self.data.len()),
            total: self.data.len(),
            can_pan_left: self.can_pan_left(),
            can_pan_right: self.can_pan_right(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(len: usize) -> Viewport<usize> {
        let mut viewport = Viewport::new(50);
        viewport.replace((0..len).collect());
        viewport
    }

    #[test]
    fn test_window_slices() {
        let mut vp = viewport(120);
        assert_eq!(vp.window().len(), 50);
        assert_eq!(vp.window()[0], 0);
        assert!(!vp.can_pan_left());
        assert!(vp.can_pan_right());

        vp.pan_right();
        assert_eq!(vp.start(), 50);
        vp.pan_right();
        // clamped so the last window is still full
        assert_eq!(vp.start(), 70);
        assert_eq!(vp.window(), &(70..120).collect::<Vec<_>>()[..]);
        assert!(!vp.can_pan_right());

        vp.pan_right();
        assert_eq!(vp.start(), 70);
    }

    #[test]
    fn test_pan_left_clamps_at_zero() {
        let mut vp = viewport(120);
        vp.pan_left();
        assert_eq!(vp.start(), 0);

        vp.pan_right();
        vp.pan_right();
        vp.pan_left();
        assert_eq!(vp.start(), 20);
        vp.pan_left();
        assert_eq!(vp.start(), 0);
    }

    #[test]
    fn test_pan_round_trip() {
        for len in [0, 10, 50, 51, 120, 200, 1000] {
            for n in 0..6 {
                let mut vp = viewport(len);
                for _ in 0..n {
                    vp.pan_right();
                }
                for _ in 0..n {
                    vp.pan_left();
                }
                assert_eq!(vp.start(), 0, "len={} n={}", len, n);
            }
        }

        // Away from the right boundary the round trip is exact
        let mut vp = viewport(1000);
        vp.pan_right();
        vp.pan_right();
        let origin = vp.start();
        for _ in 0..3 {
            vp.pan_right();
        }
        for _ in 0..3 {
            vp.pan_left();
        }
        assert_eq!(vp.start(), origin);
    }

    #[test]
    fn test_replace_resets_window() {
        let mut vp = viewport(120);
        vp.pan_right();
        vp.pan_right();
        assert_eq!(vp.start(), 70);

        vp.replace((0..40).collect());
        assert_eq!(vp.start(), 0);
        assert!(!vp.can_pan_right());
        assert!(!vp.can_pan_left());
        assert_eq!(vp.window().len(), 40);
    }

    #[test]
    fn test_short_and_empty_datasets() {
        let mut vp = viewport(10);
        vp.pan_right();
        assert_eq!(vp.start(), 0);
        assert_eq!(vp.info(), WindowInfo { first: 1, last: 10, total: 10, can_pan_left: false, can_pan_right: false });

        let vp = viewport(0);
        assert!(vp.window().is_empty());
        assert_eq!(vp.info().last, 0);
    }
}
