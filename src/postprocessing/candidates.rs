use crate::config::{Config, ThresholdMode};
use crate::error::{Result, TranscribeError};

/// One pitch/magnitude observation for a single analysis frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchCandidate {
    pub frequency: f32,
    pub magnitude: f32,
    pub frame: usize,
}

/// Frequency ratios that mark a candidate as harmonically explained by a
/// stronger one: octave, perfect fifth and major third.
const HARMONIC_RATIOS: [f32; 3] = [2.0, 1.5, 1.25];

/// Drop every candidate of one frame whose magnitude falls below the
/// threshold.
///
/// # Arguments
///
/// * `candidates` - All candidates of a single frame.
/// * `threshold` - Magnitude threshold, interpreted according to `mode`.
/// * `mode` - Absolute floor, or fraction of the frame's loudest candidate.
///
/// # Returns
///
/// * The surviving candidates. An empty result is a silent frame, not an
///   error; a candidate with a non-positive frequency or a negative magnitude
///   is rejected as malformed.
pub fn filter_candidates(
    candidates: &[PitchCandidate],
    threshold: f32,
    mode: ThresholdMode,
) -> Result<Vec<PitchCandidate>> {
    for candidate in candidates {
        if !candidate.frequency.is_finite()
            || candidate.frequency <= 0.0
            || !candidate.magnitude.is_finite()
            || candidate.magnitude < 0.0
        {
            return Err(TranscribeError::MalformedCandidate {
                frequency: candidate.frequency,
                frame: candidate.frame,
            });
        }
    }

    let cutoff = match mode {
        ThresholdMode::Absolute => threshold,
        ThresholdMode::RelativeToFrameMax => {
            let frame_max = candidates
                .iter()
                .map(|c| c.magnitude)
                .fold(0.0f32, f32::max);
            threshold * frame_max
        }
    };

    Ok(candidates
        .iter()
        .filter(|c| c.magnitude >= cutoff)
        .copied()
        .collect())
}

/// Remove candidates that sit at a harmonic ratio of a stronger candidate in
/// the same frame.
///
/// Candidates are visited in order of descending magnitude (equal magnitudes
/// ordered by ascending frequency, so the output is deterministic). Each
/// unsuppressed candidate suppresses every weaker candidate whose frequency
/// ratio against it lies within the relative tolerance of an octave, fifth or
/// major third. Real instrumental tones put energy at these multiples of the
/// true fundamental; without this pass every overtone becomes a phantom note.
///
/// # Arguments
///
/// * `candidates` - One frame's candidates, already magnitude-filtered.
/// * `tolerance` - Relative tolerance on the frequency ratio.
///
/// # Returns
///
/// * The locally dominant fundamentals, sorted by ascending frequency.
///   Applying the function to its own output changes nothing.
pub fn suppress_harmonics(candidates: &[PitchCandidate], tolerance: f32) -> Vec<PitchCandidate> {
    let mut ordered: Vec<PitchCandidate> = candidates.to_vec();
    ordered.sort_by(|a, b| {
        b.magnitude
            .partial_cmp(&a.magnitude)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.frequency.partial_cmp(&b.frequency).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut suppressed = vec![false; ordered.len()];
    for i in 0..ordered.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..ordered.len() {
            if suppressed[j] {
                continue;
            }
            let ratio = ordered[j].frequency / ordered[i].frequency;
            if HARMONIC_RATIOS
                .iter()
                .any(|&target| (ratio / target - 1.0).abs() <= tolerance)
            {
                suppressed[j] = true;
            }
        }
    }

    let mut fundamentals: Vec<PitchCandidate> = ordered
        .into_iter()
        .zip(suppressed)
        .filter_map(|(c, s)| (!s).then_some(c))
        .collect();
    fundamentals.sort_by(|a, b| {
        a.frequency
            .partial_cmp(&b.frequency)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fundamentals
}

/// Run the magnitude filter and harmonic suppressor over every frame.
///
/// # Arguments
///
/// * `frames` - Per-frame candidate lists, indexed by frame.
/// * `config` - Pipeline configuration.
///
/// # Returns
///
/// * Per-frame lists of fundamentals, one entry per input frame.
pub fn filter_frames(
    frames: &[Vec<PitchCandidate>],
    config: &Config,
) -> Result<Vec<Vec<PitchCandidate>>> {
    frames
        .iter()
        .map(|frame| {
            let kept =
                filter_candidates(frame, config.magnitude_threshold, config.threshold_mode)?;
            Ok(suppress_harmonics(&kept, config.harmonic_tolerance))
        })
        .collect()
}
