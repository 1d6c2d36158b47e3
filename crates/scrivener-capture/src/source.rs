//! Segment sources: bounded chunks of audio pulled from a live stream.
//!
//! The microphone source accumulates mono 16 kHz PCM in a shared buffer from
//! the cpal callback thread; `next_segment` sleeps out the chunk window,
//! drains whatever arrived, and encodes it as 16-bit WAV in memory.

use crate::error::{CaptureError, CaptureResult};
use chrono::{DateTime, Utc};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Capture sample rate. Speech recognition backends expect 16 kHz mono.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Mime type of encoded segments.
pub const WAV_MIME: &str = "audio/wav";

/// Upper bound on buffered audio if the consumer stalls (60 s at 16 kHz).
const MAX_BUFFERED_SAMPLES: usize = 60 * CAPTURE_SAMPLE_RATE as usize;

/// One bounded chunk of captured audio on its way to transcription.
/// Ephemeral: dropped once the transcription response arrives.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub data: Vec<u8>,
    pub mime: &'static str,
    pub duration: Duration,
    pub captured_at: DateTime<Utc>,
}

impl AudioSegment {
    /// Encode mono samples as an in-memory 16-bit WAV segment.
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> CaptureResult<Self> {
        let duration = Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64);
        Ok(Self {
            data: encode_wav(samples, sample_rate)?,
            mime: WAV_MIME,
            duration,
            captured_at: Utc::now(),
        })
    }
}

/// Encode mono f32 samples to 16-bit PCM WAV bytes.
fn encode_wav(samples: &[f32], sample_rate: u32) -> CaptureResult<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Blocking pull API over a live audio stream. Implementations run on a
/// dedicated capture thread; cpal streams are not `Send`.
pub trait SegmentSource {
    /// Acquire the underlying stream. Called once before the first segment.
    fn open(&mut self) -> CaptureResult<()>;

    /// Block for the chunk window, then return the audio captured in it.
    /// `Ok(None)` means the source is exhausted.
    fn next_segment(&mut self, chunk: Duration) -> CaptureResult<Option<AudioSegment>>;

    /// Release the device. Called once after the last segment.
    fn close(&mut self);
}

/// Shared PCM buffer. The cpal callback appends; the capture thread drains.
struct SampleBuffer {
    samples: Mutex<Vec<f32>>,
}

impl SampleBuffer {
    fn new() -> Self {
        Self {
            samples: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, samples: &[f32]) {
        let mut g = self.samples.lock().unwrap();
        g.extend_from_slice(samples);
        let len = g.len();
        if len > MAX_BUFFERED_SAMPLES {
            g.drain(..len - MAX_BUFFERED_SAMPLES);
        }
    }

    fn drain(&self) -> Vec<f32> {
        let mut g = self.samples.lock().unwrap();
        std::mem::take(&mut *g)
    }
}

/// Microphone segment source: default input device, mono 16 kHz.
///
/// Device selection ladder: a native 16 kHz mono i16/f32 input config if the
/// device offers one, otherwise the device default config resampled in the
/// callback. Permission failures surface as `PermissionDenied`, everything
/// else device-related as `DeviceUnavailable`.
pub struct MicSegmentSource {
    buffer: Arc<SampleBuffer>,
    stream: Option<Stream>,
}

impl MicSegmentSource {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(SampleBuffer::new()),
            stream: None,
        }
    }

    fn build_stream(&self) -> CaptureResult<Stream> {
        let device = cpal::default_host().default_input_device().ok_or_else(|| {
            CaptureError::DeviceUnavailable("no input device available".to_string())
        })?;
        info!(
            target: "scrivener::capture",
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = pick_input_config(&device)?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let sample_format = config.sample_format();
        let stream_config: StreamConfig = config.into();
        let need_downmix = sample_rate != CAPTURE_SAMPLE_RATE || channels > 1;
        info!(
            target: "scrivener::capture",
            "Input config: {} Hz, {} channel(s), {:?}",
            sample_rate, channels, sample_format
        );

        let buffer = Arc::clone(&self.buffer);
        let stream = match sample_format {
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if need_downmix {
                        buffer.push(&to_mono_16k(data, channels, sample_rate));
                    } else {
                        buffer.push(data);
                    }
                },
                move |err| warn!(target: "scrivener::capture", "Audio stream error: {}", err),
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let f32_samples: Vec<f32> =
                        data.iter().map(|&s| s as f32 / 32768.0f32).collect();
                    if need_downmix {
                        buffer.push(&to_mono_16k(&f32_samples, channels, sample_rate));
                    } else {
                        buffer.push(&f32_samples);
                    }
                },
                move |err| warn!(target: "scrivener::capture", "Audio stream error: {}", err),
                None,
            )?,
            other => {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "unsupported sample format {:?} (need F32 or I16)",
                    other
                )))
            }
        };
        Ok(stream)
    }
}

impl Default for MicSegmentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSource for MicSegmentSource {
    fn open(&mut self) -> CaptureResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self.build_stream()?;
        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    fn next_segment(&mut self, chunk: Duration) -> CaptureResult<Option<AudioSegment>> {
        thread::sleep(chunk);
        let samples = self.buffer.drain();
        if samples.is_empty() {
            return Ok(Some(AudioSegment {
                data: Vec::new(),
                mime: WAV_MIME,
                duration: Duration::ZERO,
                captured_at: Utc::now(),
            }));
        }
        Ok(Some(AudioSegment::from_samples(&samples, CAPTURE_SAMPLE_RATE)?))
    }

    fn close(&mut self) {
        // Dropping the stream releases the device.
        self.stream = None;
        self.buffer.drain();
    }
}

/// Preference ladder: native 16 kHz mono i16/f32 beats resampling the default.
fn pick_input_config(device: &cpal::Device) -> CaptureResult<cpal::SupportedStreamConfig> {
    if let Ok(configs) = device.supported_input_configs() {
        for range in configs {
            if range.channels() == 1
                && matches!(range.sample_format(), SampleFormat::I16 | SampleFormat::F32)
                && range.min_sample_rate().0 <= CAPTURE_SAMPLE_RATE
                && range.max_sample_rate().0 >= CAPTURE_SAMPLE_RATE
            {
                return Ok(range.with_sample_rate(cpal::SampleRate(CAPTURE_SAMPLE_RATE)));
            }
        }
    }
    Ok(device.default_input_config()?)
}

/// Convert interleaved multi-channel audio at any rate to mono 16 kHz.
fn to_mono_16k(samples: &[f32], channels: usize, from_rate: u32) -> Vec<f32> {
    if channels == 0 || samples.is_empty() {
        return Vec::new();
    }
    let mono: Vec<f32> = if channels == 1 {
        samples.to_vec()
    } else {
        samples
            .chunks_exact(channels)
            .map(|c| c.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    if from_rate == CAPTURE_SAMPLE_RATE {
        return mono;
    }
    let out_len = (mono.len() as u64 * CAPTURE_SAMPLE_RATE as u64 / from_rate as u64) as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let src_idx = (i as f64 * from_rate as f64 / CAPTURE_SAMPLE_RATE as f64) as usize;
        if src_idx >= mono.len() {
            break;
        }
        out.push(mono[src_idx]);
    }
    out
}

/// Scripted source for tests: yields canned segments, then `None`, optionally
/// failing after the script runs out.
pub struct ScriptedSegmentSource {
    segments: VecDeque<AudioSegment>,
    fail_with: Option<CaptureError>,
    delay: Option<Duration>,
    pub opened: bool,
}

impl ScriptedSegmentSource {
    pub fn new(segments: Vec<AudioSegment>) -> Self {
        Self {
            segments: segments.into(),
            fail_with: None,
            delay: None,
            opened: false,
        }
    }

    /// Sleep this long per segment, standing in for the chunk cadence.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail with this error once the script is exhausted instead of ending.
    pub fn failing(mut self, err: CaptureError) -> Self {
        self.fail_with = Some(err);
        self
    }
}

impl SegmentSource for ScriptedSegmentSource {
    fn open(&mut self) -> CaptureResult<()> {
        self.opened = true;
        Ok(())
    }

    fn next_segment(&mut self, _chunk: Duration) -> CaptureResult<Option<AudioSegment>> {
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if let Some(segment) = self.segments.pop_front() {
            return Ok(Some(segment));
        }
        match self.fail_with.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.opened = false;
    }
}
