//! Offline render driver.

use lamina_core::Effect;
use tracing::info;

/// Process a pair of buffers through an engine in place, in host-sized
/// blocks.
///
/// Splitting into blocks exercises engines exactly the way a plugin shell
/// would: repeated `process_stereo_block` calls of `block_size` frames (the
/// final block may be shorter). A `block_size` of 0 is treated as one
/// whole-buffer block.
pub fn render_stereo(engine: &mut dyn Effect, left: &mut [f32], right: &mut [f32], block_size: usize) {
    let frames = left.len().min(right.len());
    let block = if block_size == 0 { frames.max(1) } else { block_size };

    let mut offset = 0;
    while offset < frames {
        let end = (offset + block).min(frames);
        engine.process_stereo_block(&mut left[offset..end], &mut right[offset..end]);
        offset = end;
    }

    info!(frames, block, "rendered buffer");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn renders_whole_buffer() {
        let mut left = vec![1.0_f32; 1000];
        let mut right = vec![0.5_f32; 1000];
        render_stereo(&mut Gain(2.0), &mut left, &mut right, 128);
        assert!(left.iter().all(|&x| (x - 2.0).abs() < 1e-6));
        assert!(right.iter().all(|&x| (x - 1.0).abs() < 1e-6));
    }

    #[test]
    fn zero_block_size_means_one_block() {
        let mut left = vec![1.0_f32; 7];
        let mut right = vec![1.0_f32; 7];
        render_stereo(&mut Gain(3.0), &mut left, &mut right, 0);
        assert!(left.iter().all(|&x| (x - 3.0).abs() < 1e-6));
    }

    #[test]
    fn uneven_final_block_is_processed() {
        let mut left = vec![1.0_f32; 130];
        let mut right = vec![1.0_f32; 130];
        render_stereo(&mut Gain(2.0), &mut left, &mut right, 64);
        assert!((left[129] - 2.0).abs() < 1e-6, "tail block skipped");
    }
}
