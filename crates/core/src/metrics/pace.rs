use crate::metrics::{DeviationType, PaceSegment, WpmSegment};
use crate::timeline::WordToken;

/// Outcome of [`pace_consistency`].
#[derive(Clone, Debug, PartialEq)]
pub struct PaceConsistency {
    pub score: u32,
    pub rushing: Vec<PaceSegment>,
    pub dragging: Vec<PaceSegment>,
}

/// Upper bound on the number of windows [`segment_wpm`] will build.
pub const MAX_WINDOWS: usize = 1_000;

/// Words per minute for a count over a duration; 0 when the duration is not positive.
pub fn wpm_for(word_count: usize, duration_sec: f64) -> u32 {
    if duration_sec <= 0.0 {
        return 0;
    }
    (word_count as f64 / duration_sec * 60.0).round() as u32
}

/// Overall words per minute over a token list.
pub fn compute_wpm(tokens: &[WordToken], duration_sec: f64) -> u32 {
    wpm_for(tokens.len(), duration_sec)
}

/// Splits `[0, duration_sec]` into fixed, non-overlapping windows and measures each.
///
/// A trailing window shorter than half the window size is merged into its
/// predecessor so a few stray seconds do not produce a noisy outlier. A
/// duration that would need more than [`MAX_WINDOWS`] windows is not segmented.
pub fn segment_wpm(
    tokens: &[WordToken],
    duration_sec: f64,
    window_size_sec: f64,
) -> Vec<WpmSegment> {
    if !(duration_sec.is_finite() && duration_sec > 0.0 && window_size_sec > 0.0) {
        return Vec::new();
    }
    let window_count = (duration_sec / window_size_sec).ceil();
    if window_count > MAX_WINDOWS as f64 {
        tracing::debug!(
            target: super::LOG_TARGET,
            duration_sec,
            window_size_sec,
            "duration too long to segment"
        );
        return Vec::new();
    }

    let mut bounds: Vec<(f64, f64)> = (0..window_count as usize)
        .map(|i| i as f64 * window_size_sec)
        .filter(|&start| start < duration_sec)
        .map(|start| (start, (start + window_size_sec).min(duration_sec)))
        .collect();
    if bounds.len() > 1 {
        if let Some(&(last_start, last_end)) = bounds.last() {
            if last_end - last_start < window_size_sec / 2.0 {
                bounds.pop();
                if let Some(prev) = bounds.last_mut() {
                    prev.1 = last_end;
                }
            }
        }
    }
    if bounds.is_empty() {
        return Vec::new();
    }

    let last_index = bounds.len() - 1;
    let mut counts = vec![0usize; bounds.len()];
    for token in tokens {
        let index = ((token.start_sec() / window_size_sec).floor() as usize).min(last_index);
        counts[index] += 1;
    }

    bounds
        .into_iter()
        .zip(counts)
        .map(|((window_start_sec, window_end_sec), word_count)| WpmSegment {
            window_start_sec,
            window_end_sec,
            wpm: wpm_for(word_count, window_end_sec - window_start_sec),
            word_count,
        })
        .collect()
}

/// Scores how steady the pace is and flags windows that stray from the mean.
///
/// The score is `100 * (1 - cv)` where `cv` is the coefficient of variation of
/// the segment rates, clamped to [0, 100]. Lower spread always scores higher.
pub fn pace_consistency(segments: &[WpmSegment], tolerance: f64) -> PaceConsistency {
    let empty = PaceConsistency {
        score: 0,
        rushing: Vec::new(),
        dragging: Vec::new(),
    };
    if segments.is_empty() {
        return empty;
    }

    let n = segments.len() as f64;
    let mean = segments.iter().map(|s| f64::from(s.wpm)).sum::<f64>() / n;
    if mean <= 0.0 {
        return empty;
    }

    let variance = segments
        .iter()
        .map(|s| (f64::from(s.wpm) - mean).powi(2))
        .sum::<f64>()
        / n;
    let cv = variance.sqrt() / mean;
    let score = (100.0 * (1.0 - cv)).clamp(0.0, 100.0).round() as u32;

    let mut rushing = Vec::new();
    let mut dragging = Vec::new();
    for segment in segments {
        let wpm = f64::from(segment.wpm);
        if wpm > mean * (1.0 + tolerance) {
            rushing.push(PaceSegment::new(segment, DeviationType::Rushing));
        } else if wpm < mean * (1.0 - tolerance) {
            dragging.push(PaceSegment::new(segment, DeviationType::Dragging));
        }
    }

    PaceConsistency {
        score,
        rushing,
        dragging,
    }
}
