use ndarray::Array2;
use rustfft::{num_complex::Complex32, FftPlanner};

use crate::postprocessing::candidates::PitchCandidate;

/// Magnitude spectrogram, shape (bins, frames).
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub magnitudes: Array2<f32>,
    pub sample_rate: u32,
    pub hop: usize,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.magnitudes.ncols()
    }

    /// Seconds covered by one analysis frame.
    pub fn frame_period(&self) -> f32 {
        self.hop as f32 / self.sample_rate as f32
    }

    fn bin_spacing(&self) -> f32 {
        let fft_size = (self.magnitudes.nrows() - 1) * 2;
        self.sample_rate as f32 / fft_size as f32
    }
}

/// Compute the magnitude STFT of a mono signal with a Hann window.
///
/// The signal is zero-padded by half a window on both sides so that frame `i`
/// is centered on sample `i * hop` and maps to time `i * hop / sample_rate`.
///
/// # Arguments
///
/// * `samples` - Mono audio samples.
/// * `window_size` - FFT size, a power of two.
/// * `hop` - Hop length in samples.
/// * `sample_rate` - Sample rate of the signal.
///
/// # Returns
///
/// * The magnitude spectrogram.
pub fn stft(samples: &[f32], window_size: usize, hop: usize, sample_rate: u32) -> Spectrogram {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(window_size);

    let mut padded = vec![0.0f32; window_size / 2];
    padded.extend_from_slice(samples);
    padded.resize(padded.len() + window_size / 2, 0.0);

    let n_bins = window_size / 2 + 1;
    let n_frames = if padded.len() >= window_size {
        (padded.len() - window_size) / hop + 1
    } else {
        0
    };

    let window: Vec<f32> = (0..window_size)
        .map(|n| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / window_size as f32).cos())
        })
        .collect();

    let mut magnitudes = Array2::<f32>::zeros((n_bins, n_frames));
    for frame_idx in 0..n_frames {
        let start = frame_idx * hop;
        let mut buffer: Vec<Complex32> = padded[start..start + window_size]
            .iter()
            .zip(&window)
            .map(|(&sample, &win)| Complex32::new(sample * win, 0.0))
            .collect();

        fft.process(&mut buffer);

        for (bin, value) in buffer[..n_bins].iter().enumerate() {
            magnitudes[[bin, frame_idx]] = value.norm();
        }
    }

    Spectrogram {
        magnitudes,
        sample_rate,
        hop,
    }
}

/// Extract per-frame pitch candidates from a spectrogram by local peak
/// picking.
///
/// Every spectral bin that is a local magnitude maximum within the search
/// band becomes a candidate; its frequency is refined by parabolic
/// interpolation over the neighboring bins, the way `piptrack` does.
///
/// # Arguments
///
/// * `spectrogram` - Magnitude spectrogram.
/// * `min_frequency` - Lower bound of the search band in Hz.
/// * `max_frequency` - Upper bound of the search band in Hz.
///
/// # Returns
///
/// * One candidate list per frame, indexed by frame.
pub fn extract_pitch_candidates(
    spectrogram: &Spectrogram,
    min_frequency: f32,
    max_frequency: f32,
) -> Vec<Vec<PitchCandidate>> {
    let bin_spacing = spectrogram.bin_spacing();
    let n_bins = spectrogram.magnitudes.nrows();

    (0..spectrogram.num_frames())
        .map(|frame_idx| {
            let column = spectrogram.magnitudes.column(frame_idx);
            let mut candidates = Vec::new();
            for bin in 1..n_bins - 1 {
                let magnitude = column[bin];
                if magnitude <= 0.0 || column[bin - 1] >= magnitude || column[bin + 1] > magnitude
                {
                    continue;
                }

                // Parabolic interpolation over the peak and its neighbors.
                let alpha = column[bin - 1];
                let gamma = column[bin + 1];
                let denominator = alpha - 2.0 * magnitude + gamma;
                let shift = if denominator.abs() > f32::EPSILON {
                    (0.5 * (alpha - gamma) / denominator).clamp(-0.5, 0.5)
                } else {
                    0.0
                };

                let frequency = (bin as f32 + shift) * bin_spacing;
                if frequency < min_frequency || frequency > max_frequency {
                    continue;
                }

                candidates.push(PitchCandidate {
                    frequency,
                    magnitude: magnitude - 0.25 * (alpha - gamma) * shift,
                    frame: frame_idx,
                });
            }
            candidates
        })
        .collect()
}
