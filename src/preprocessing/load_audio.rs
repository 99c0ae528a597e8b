use std::path::Path;

use hound::{SampleFormat, WavReader};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::constants::AUDIO_SAMPLE_RATE;
use crate::error::{Result, TranscribeError};

/// Load a WAV file as mono `f32` samples at the analysis sample rate.
///
/// Stereo input is downmixed by averaging the channels, integer samples are
/// normalized to [-1, 1], and anything not already at the target rate is put
/// through a sinc resampler.
///
/// # Arguments
///
/// * `path` - Path to the WAV file.
///
/// # Returns
///
/// * The samples and the analysis sample rate they ended up at.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let max_sample_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_sample_value))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mono: Vec<f32> = if channels > 1 {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        interleaved
    };

    if spec.sample_rate == AUDIO_SAMPLE_RATE as u32 {
        return Ok((mono, spec.sample_rate));
    }

    let resampled = resample(&mono, spec.sample_rate, AUDIO_SAMPLE_RATE as u32)?;
    Ok((resampled, AUDIO_SAMPLE_RATE as u32))
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let channel_data: Vec<Vec<f64>> = vec![samples.iter().map(|&s| s as f64).collect()];
    let mut resampler = SincFixedIn::<f64>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        samples.len(),
        1,
    )
    .map_err(|e| TranscribeError::Resample(e.to_string()))?;

    let resampled = resampler
        .process(&channel_data, None)
        .map_err(|e| TranscribeError::Resample(e.to_string()))?;

    Ok(resampled[0].iter().map(|&s| s as f32).collect())
}
