use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far a cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframe times (seconds) and values for one animated property.
///
/// For [`InterpolationMode::CubicSpline`] `values` holds
/// `[in_tangent, value, out_tangent]` per keyframe.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f64>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f64>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Time of the last keyframe, zero for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling by binary search. Returns `None` on an empty track.
    #[must_use]
    pub fn sample(&self, time: f64) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }

        Some(self.sample_at_frame(self.frame_index(time), time))
    }

    /// Samples using `cursor` as a starting guess and updates it.
    ///
    /// Sequential playback stays O(1); jumps fall back to binary search.
    pub fn sample_with_cursor(&self, time: f64, cursor: &mut KeyframeCursor) -> Option<T> {
        match self.times.len() {
            0 => return None,
            1 => return Some(*self.value_at(0)),
            _ => {}
        }

        let index = self
            .scan_from(cursor.last_index, time)
            .unwrap_or_else(|| self.frame_index(time));
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    /// Index of the keyframe interval containing `time`, by binary search.
    fn frame_index(&self, time: f64) -> usize {
        self.times
            .partition_point(|&t| t <= time)
            .saturating_sub(1)
    }

    /// Looks for the interval containing `time` within a few frames of `start`.
    fn scan_from(&self, start: usize, time: f64) -> Option<usize> {
        let last = self.times.len() - 1;
        let start = start.min(last);

        if time < self.times[start] {
            // Walk left to the first keyframe at or before `time`.
            return (1..=MAX_SCAN_OFFSET)
                .map_while(|step| start.checked_sub(step))
                .find(|&idx| self.times[idx] <= time);
        }

        // Walk right to the interval whose end lies past `time`.
        let window_end = (start + MAX_SCAN_OFFSET).min(last);
        (start..=window_end).find(|&idx| idx == last || time < self.times[idx + 1])
    }

    fn value_at(&self, index: usize) -> &T {
        match self.interpolation {
            InterpolationMode::CubicSpline => &self.values[index * 3 + 1],
            _ => &self.values[index],
        }
    }

    /// Interpolates inside interval `index`, holding the last value past the end.
    fn sample_at_frame(&self, index: usize, time: f64) -> T {
        let last = self.times.len() - 1;
        if index >= last {
            return *self.value_at(last);
        }

        let (start, end) = (self.times[index], self.times[index + 1]);
        let span = end - start;
        let alpha = if span > 1e-9 {
            ((time - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            InterpolationMode::Step => *self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(*self.value_at(index), *self.value_at(index + 1), alpha)
            }
            InterpolationMode::CubicSpline => {
                // [in, value, out] triplets for the two keyframes
                let a = &self.values[index * 3..index * 3 + 3];
                let b = &self.values[index * 3 + 3..index * 3 + 6];
                T::interpolate_cubic(a[1], a[2], b[0], b[1], alpha, span)
            }
        }
    }
}
