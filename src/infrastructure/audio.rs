use crate::domain::error::CoreError;
use crate::domain::model::AudioClip;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

pub const SILENCE_SAMPLE_RATE: u32 = 22050;

/// Mono 16-bit silent WAV, used as the synthesis terminal fallback.
pub fn silent_wav(duration_ms: u32) -> Result<AudioClip, CoreError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SILENCE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let samples = (SILENCE_SAMPLE_RATE as u64 * duration_ms as u64 / 1000) as u32;
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, spec)?;
        for _ in 0..samples {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
    }

    Ok(AudioClip::wav(buffer.into_inner()))
}
