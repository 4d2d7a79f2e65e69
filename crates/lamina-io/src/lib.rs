//! Offline I/O layer for the lamina engine suite.
//!
//! This crate lives outside the real-time path: it loads and saves WAV
//! files and drives an engine over whole buffers in host-sized blocks.
//!
//! ```rust,ignore
//! use lamina_io::{read_wav_stereo, write_wav_stereo, render_stereo};
//! use lamina_effects::PlateReverb;
//!
//! let (mut left, mut right, spec) = read_wav_stereo("input.wav")?;
//! let mut plate = PlateReverb::new(spec.sample_rate as f32);
//! render_stereo(&mut plate, &mut left, &mut right, 512);
//! write_wav_stereo("output.wav", &left, &right, spec)?;
//! ```

mod render;
mod wav;

pub use render::render_stereo;
pub use wav::{WavSpec, read_wav_info, read_wav_stereo, write_wav_stereo};

/// Error type for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file's channel layout is not supported.
    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
