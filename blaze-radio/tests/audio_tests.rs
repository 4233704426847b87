//! Decode / encode pipeline against generated fixtures

use blaze_common::{AudioClip, SAMPLE_RATE};
use blaze_radio::audio::{Decoder, Mp3Encoder};
use blaze_radio::library::{FileLibrary, MusicLibrary};
use blaze_radio::playlist::Track;
use std::path::Path;

/// Write a 16-bit 440 Hz sine WAV with the same signal on every channel
fn write_sine_wav(path: &Path, sample_rate: u32, channels: u16, seconds: f32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (sample_rate as f32 * seconds) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
        for _ in 0..channels {
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn tone(seconds: f32) -> AudioClip {
    let frames = (SAMPLE_RATE as f32 * seconds) as usize;
    let mut samples = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let t = i as f32 / SAMPLE_RATE as f32;
        let s = (2.0 * std::f32::consts::PI * 330.0 * t).sin() * 0.4;
        samples.push(s);
        samples.push(s);
    }
    AudioClip::from_stereo(samples).unwrap()
}

#[test]
fn test_wav_at_working_format_keeps_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_sine_wav(&path, 44_100, 2, 1.0);

    let clip = Decoder::decode_file(&path).unwrap();
    assert_eq!(clip.frames(), 44_100);
    assert!(clip.peak() > 0.4);
}

#[test]
fn test_mono_48k_wav_becomes_stereo_44k() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mono48.wav");
    write_sine_wav(&path, 48_000, 1, 1.0);

    let clip = Decoder::decode_file(&path).unwrap();
    let duration = clip.duration_ms();
    assert!(
        (990..=1010).contains(&duration),
        "expected ~1000 ms, got {}",
        duration
    );

    // Both channels carry the same signal
    let samples = clip.samples();
    let mid = clip.frames() / 2 * 2;
    assert_eq!(samples[mid], samples[mid + 1]);
}

#[test]
fn test_mp3_encode_then_decode_keeps_duration() {
    let encoder = Mp3Encoder::new(192).unwrap();
    let bytes = encoder.encode(&tone(2.0)).unwrap();
    assert!(!bytes.is_empty());

    let decoded = Decoder::decode_bytes(bytes.to_vec(), "mp3").unwrap();
    let duration = decoded.duration_ms();
    // LAME adds encoder delay and frame padding
    assert!(
        (2000..=2150).contains(&duration),
        "expected ~2000 ms, got {}",
        duration
    );
    assert!(decoded.peak() > 0.2);
}

#[test]
fn test_file_library_loads_named_track() {
    let dir = tempfile::tempdir().unwrap();
    let track = Track::new("Mötley Crüe", "Kickstart My Heart", 270).unwrap();
    let library = FileLibrary::new(dir.path());

    let bytes = Mp3Encoder::new(128).unwrap().encode(&tone(1.0)).unwrap();
    std::fs::write(library.path_for(&track), &bytes).unwrap();

    let clip = library.load(&track).unwrap();
    assert!(clip.duration_ms() >= 1000);

    let other = Track::new("Poison", "Talk Dirty to Me", 224).unwrap();
    assert!(library.load(&other).is_err());
}
