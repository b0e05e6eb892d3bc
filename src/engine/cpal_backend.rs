//! Production [`AudioBackend`] on top of `cpal`.
//!
//! [`CpalBackend`] realises the conceptual capture→gain→output graph as a
//! pair of cpal streams: the input stream processes every captured block
//! through the shared [`SignalChain`] and pushes the result (downmixed to
//! mono) into a ring buffer; the output stream pops from the ring buffer and
//! fans the samples out to the output device's channels.  Underruns play
//! silence — a glitch, never a panic.
//!
//! Desktop platforms expose no explicit microphone-permission API the way
//! mobile ones do; the grant is observable as an enumerable input device,
//! which is what [`microphone_permission`](AudioBackend::microphone_permission)
//! reports.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::audio::{RingBuffer, SignalChain};
use crate::session::{InputDevice, SessionConfig, SessionError};

use super::backend::AudioBackend;
use super::events::{EngineError, EngineEvent};

/// Passthrough buffer capacity in milliseconds of mono audio.
///
/// Large enough to ride out scheduling jitter between the two callbacks,
/// small enough that an overrun (oldest samples overwritten) stays
/// inaudible as added latency.
const RING_CAPACITY_MS: u32 = 200;

// ---------------------------------------------------------------------------
// Channel adaptation helpers
// ---------------------------------------------------------------------------

/// Downmix an interleaved block to mono by averaging each frame's channels.
fn downmix_to_mono(data: &[f32], channels: u16, out: &mut Vec<f32>) {
    out.clear();
    if channels <= 1 {
        out.extend_from_slice(data);
        return;
    }
    for frame in data.chunks_exact(channels as usize) {
        out.push(frame.iter().sum::<f32>() / channels as f32);
    }
}

/// Write one mono sample to every channel of each output frame.
fn fan_out_mono(frames: &[f32], channels: u16, data: &mut [f32]) {
    for (frame, &sample) in data.chunks_exact_mut(channels as usize).zip(frames) {
        for slot in frame.iter_mut() {
            *slot = sample;
        }
    }
}

// ---------------------------------------------------------------------------
// CpalBackend
// ---------------------------------------------------------------------------

/// The running stream pair plus the buffer connecting them.
struct DuplexStream {
    input: cpal::Stream,
    output: cpal::Stream,
}

/// Host audio backend built on `cpal`.
pub struct CpalBackend {
    host: cpal::Host,
    /// Channel for asynchronous stream faults.
    events: Sender<EngineEvent>,
    /// Name of the pinned input device, `None` for the platform default.
    preferred: Option<String>,
    applied: Option<SessionConfig>,
    active: bool,
    streams: Option<DuplexStream>,
    /// Chain from the last `start_stream`, kept so a preferred-input change
    /// while running can rebuild the streams.
    last_chain: Option<Arc<SignalChain>>,
}

impl CpalBackend {
    /// Backend on the system default host.  `events` receives
    /// [`EngineEvent::Error`] for asynchronous stream faults.
    pub fn new(events: Sender<EngineEvent>) -> Self {
        Self {
            host: cpal::default_host(),
            events,
            preferred: None,
            applied: None,
            active: false,
            streams: None,
            last_chain: None,
        }
    }

    /// The input device to capture from: the pinned one when set and still
    /// connected, otherwise the platform default.
    fn capture_device(&self) -> Option<cpal::Device> {
        if let Some(name) = &self.preferred {
            if let Ok(devices) = self.host.input_devices() {
                for device in devices {
                    if device.name().is_ok_and(|n| n == *name) {
                        return Some(device);
                    }
                }
            }
            log::warn!("pinned input {name:?} disappeared, falling back to default");
        }
        self.host.default_input_device()
    }

    fn input_supports_rate(device: &cpal::Device, rate: u32) -> bool {
        device
            .supported_input_configs()
            .map(|mut ranges| {
                ranges.any(|r| r.min_sample_rate().0 <= rate && rate <= r.max_sample_rate().0)
            })
            .unwrap_or(false)
    }

    fn build_streams(&self, chain: Arc<SignalChain>) -> Result<DuplexStream, EngineError> {
        let session = self.applied.clone().unwrap_or_default();
        let sample_rate = session.sample_rate;

        let input_device = self
            .capture_device()
            .ok_or_else(|| EngineError::StreamStart("no input device available".into()))?;
        let output_device = self
            .host
            .default_output_device()
            .ok_or_else(|| EngineError::StreamStart("no output device available".into()))?;

        let input_channels = input_device
            .default_input_config()
            .map_err(|e| EngineError::StreamStart(e.to_string()))?
            .channels();
        let output_channels = output_device
            .default_output_config()
            .map_err(|e| EngineError::StreamStart(e.to_string()))?
            .channels();

        let buffer_size = cpal::BufferSize::Fixed(session.buffer_frames());
        let input_config = cpal::StreamConfig {
            channels: input_channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size,
        };
        let output_config = cpal::StreamConfig {
            channels: output_channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size,
        };

        let ring_capacity = (sample_rate * RING_CAPACITY_MS / 1000).max(1) as usize;
        let ring = Arc::new(Mutex::new(RingBuffer::<f32>::new(ring_capacity)));

        // Input side: chain processing + downmix into the ring buffer.
        let ring_in = Arc::clone(&ring);
        let mut processed: Vec<f32> = Vec::new();
        let mut mono: Vec<f32> = Vec::new();
        let input_cb = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            processed.resize(data.len(), 0.0);
            chain.process(data, &mut processed, input_channels);
            downmix_to_mono(&processed, input_channels, &mut mono);
            if let Ok(mut buf) = ring_in.lock() {
                buf.push_slice(&mono);
            }
        };

        // Output side: pop mono frames and fan out to the device channels.
        let ring_out = Arc::clone(&ring);
        let mut frames: Vec<f32> = Vec::new();
        let output_cb = move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let frame_count = data.len() / output_channels.max(1) as usize;
            frames.resize(frame_count, 0.0);
            match ring_out.lock() {
                Ok(mut buf) => {
                    buf.pop_slice(&mut frames);
                }
                Err(_) => frames.iter_mut().for_each(|s| *s = 0.0),
            }
            fan_out_mono(&frames, output_channels, data);
        };

        let input_err = Self::fault_handler(self.events.clone(), "input");
        let output_err = Self::fault_handler(self.events.clone(), "output");

        let input = input_device
            .build_input_stream(&input_config, input_cb, input_err, None)
            .map_err(|e| EngineError::StreamStart(e.to_string()))?;
        let output = output_device
            .build_output_stream(&output_config, output_cb, output_err, None)
            .map_err(|e| EngineError::StreamStart(e.to_string()))?;

        input
            .play()
            .map_err(|e| EngineError::StreamStart(e.to_string()))?;
        output
            .play()
            .map_err(|e| EngineError::StreamStart(e.to_string()))?;

        log::debug!(
            "duplex stream up: {input_channels}ch in → mono ring ({ring_capacity} samples) → {output_channels}ch out @ {sample_rate} Hz"
        );
        Ok(DuplexStream { input, output })
    }

    fn fault_handler(
        tx: Sender<EngineEvent>,
        side: &'static str,
    ) -> impl FnMut(cpal::StreamError) {
        move |err| {
            log::error!("{side} stream fault: {err}");
            let _ = tx.send(EngineEvent::Error(EngineError::Stream(err.to_string())));
        }
    }
}

impl AudioBackend for CpalBackend {
    fn microphone_permission(&self) -> bool {
        self.host.default_input_device().is_some()
    }

    fn available_inputs(&self) -> Vec<InputDevice> {
        match self.host.input_devices() {
            Ok(devices) => devices
                .filter_map(|d| d.name().ok())
                .map(InputDevice::from_name)
                .collect(),
            Err(e) => {
                log::warn!("input device enumeration failed: {e}");
                Vec::new()
            }
        }
    }

    fn activate(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        if self.active && self.applied.as_ref() == Some(config) {
            return Ok(());
        }

        let device = self.capture_device().ok_or_else(|| {
            SessionError::Configuration("no input device available".into())
        })?;
        if self.host.default_output_device().is_none() {
            return Err(SessionError::Configuration(
                "no output device available".into(),
            ));
        }
        if !Self::input_supports_rate(&device, config.sample_rate) {
            return Err(SessionError::Configuration(format!(
                "input device does not support {} Hz",
                config.sample_rate
            )));
        }

        self.applied = Some(config.clone());
        self.active = true;
        log::debug!(
            "session active: {} Hz, {} frame buffer",
            config.sample_rate,
            config.buffer_frames()
        );
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), SessionError> {
        self.active = false;
        Ok(())
    }

    fn set_preferred_input(&mut self, device: Option<&InputDevice>) -> Result<(), SessionError> {
        self.preferred = device.map(|d| d.name.clone());

        // A live stream has to be rebuilt onto the new device.
        if self.streams.is_some() {
            if let Some(chain) = self.last_chain.clone() {
                self.stop_stream();
                self.start_stream(chain)
                    .map_err(|e| SessionError::Configuration(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn start_stream(&mut self, chain: Arc<SignalChain>) -> Result<(), EngineError> {
        self.stop_stream();
        let streams = self.build_streams(Arc::clone(&chain))?;
        self.streams = Some(streams);
        self.last_chain = Some(chain);
        Ok(())
    }

    fn stop_stream(&mut self) {
        // Dropping the streams stops the callbacks and discards the ring
        // buffer they shared.
        self.streams = None;
    }

    fn pause_stream(&mut self) {
        if let Some(streams) = &self.streams {
            if let Err(e) = streams.input.pause() {
                log::warn!("failed to pause input stream: {e}");
            }
            if let Err(e) = streams.output.pause() {
                log::warn!("failed to pause output stream: {e}");
            }
        }
    }

    fn resume_stream(&mut self) -> Result<(), EngineError> {
        let Some(streams) = &self.streams else {
            return Err(EngineError::Stream("no stream to resume".into()));
        };
        streams
            .input
            .play()
            .map_err(|e| EngineError::Stream(e.to_string()))?;
        streams
            .output
            .play()
            .map_err(|e| EngineError::Stream(e.to_string()))?;
        Ok(())
    }

    fn is_stream_running(&self) -> bool {
        self.streams.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
