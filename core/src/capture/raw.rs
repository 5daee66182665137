use num_complex::Complex32;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{LoadError, SampleBuffer, Samples, BYTES_PER_COMPLEX_SAMPLE, MAX_COMPLEX_SAMPLES};

/// Reads interleaved little-endian `f32` I/Q pairs, up to `MAX_COMPLEX_SAMPLES`.
pub(crate) fn read_raw(path: &Path, sample_rate: u32) -> Result<SampleBuffer, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::unreadable(path, e))?;
    let file_size = file
        .metadata()
        .map_err(|e| LoadError::unreadable(path, e))?
        .len();

    let source_len = (file_size / BYTES_PER_COMPLEX_SAMPLE) as usize;
    let keep = source_len.min(MAX_COMPLEX_SAMPLES);

    let mut bytes = Vec::with_capacity(keep * BYTES_PER_COMPLEX_SAMPLE as usize);
    file.take(keep as u64 * BYTES_PER_COMPLEX_SAMPLE)
        .read_to_end(&mut bytes)
        .map_err(|e| LoadError::unreadable(path, e))?;

    let samples: Vec<Complex32> = bytes
        .chunks_exact(BYTES_PER_COMPLEX_SAMPLE as usize)
        .map(|pair| {
            Complex32::new(
                f32::from_le_bytes([pair[0], pair[1], pair[2], pair[3]]),
                f32::from_le_bytes([pair[4], pair[5], pair[6], pair[7]]),
            )
        })
        .collect();

    Ok(SampleBuffer::new(Samples::Complex(samples), sample_rate).with_source_len(source_len))
}
