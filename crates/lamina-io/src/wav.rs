//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;
use tracing::debug;

/// WAV file specification.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavSpec> {
    let reader = WavReader::open(path)?;
    Ok(WavSpec::from(reader.spec()))
}

/// Read a WAV file into separate left/right f32 buffers.
///
/// Mono files are duplicated into both channels; files with more than two
/// channels are rejected.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    if spec.channels == 0 || spec.channels > 2 {
        return Err(Error::UnsupportedChannels(spec.channels));
    }
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = samples.len() / channels;
    let (left, right) = if channels == 2 {
        let left: Vec<f32> = samples.iter().step_by(2).copied().collect();
        let right: Vec<f32> = samples.iter().skip(1).step_by(2).copied().collect();
        (left, right)
    } else {
        (samples.clone(), samples)
    };

    debug!(
        frames,
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        "loaded wav"
    );
    Ok((left, right, spec))
}

/// Write left/right f32 buffers to a stereo WAV file.
///
/// Writes `min(left.len(), right.len())` frames in the spec's bit depth
/// (32-bit float, or integer PCM below that).
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    left: &[f32],
    right: &[f32],
    spec: WavSpec,
) -> Result<()> {
    let out_spec = WavSpec {
        channels: 2,
        ..spec
    };
    let mut writer = WavWriter::create(path, out_spec.into())?;
    let frames = left.len().min(right.len());

    if out_spec.bits_per_sample == 32 {
        for i in 0..frames {
            writer.write_sample(left[i])?;
            writer.write_sample(right[i])?;
        }
    } else {
        let max_val = (1_i64 << (out_spec.bits_per_sample - 1)) as f32;
        let ceil = max_val - 1.0;
        for i in 0..frames {
            writer.write_sample((left[i] * max_val).clamp(-max_val, ceil) as i32)?;
            writer.write_sample((right[i] * max_val).clamp(-max_val, ceil) as i32)?;
        }
    }
    writer.finalize()?;

    debug!(frames, sample_rate = out_spec.sample_rate, "wrote wav");
    Ok(())
}
