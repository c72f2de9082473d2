//! Microphone capture for the voice session, plus PCM resampling.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    mpsc, Arc, Mutex,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Whether a default input device exists and reports a usable config.
/// Stands in for a permission prompt on desktop: no device means the
/// session cannot hear anything, so the shell refuses to start.
pub fn microphone_available() -> bool {
    let host = cpal::default_host();
    match host.default_input_device() {
        Some(device) => device.default_input_config().is_ok(),
        None => false,
    }
}

/// Capture mono i16 PCM from the default input device into `buffer`
/// until `stop_signal` is raised. Blocks the calling thread; the cpal
/// stream is not Send, so it lives and dies here.
///
/// The actual device rate is published through `sample_rate` so the
/// consumer can resample before shipping chunks upstream.
pub fn run_capture(
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: Arc<AtomicU32>,
    stop_signal: Arc<AtomicBool>,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            crate::log_info!("[Audio] No input device available");
            return;
        }
    };

    let config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            crate::log_info!("[Audio] Failed to get input config: {}", e);
            return;
        }
    };

    let channels = config.channels() as usize;
    sample_rate.store(config.sample_rate(), Ordering::Relaxed);

    let (tx, rx) = mpsc::channel::<Vec<f32>>();
    let err_fn = |err| eprintln!("Audio stream error: {}", err);

    let stream_res = match config.sample_format() {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config.into(),
            move |data: &[f32], _: &_| {
                let _ = tx.send(data.to_vec());
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config.into(),
            move |data: &[i16], _: &_| {
                let f32_data: Vec<f32> =
                    data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                let _ = tx.send(f32_data);
            },
            err_fn,
            None,
        ),
        other => {
            crate::log_info!("[Audio] Unsupported sample format: {:?}", other);
            return;
        }
    };

    let stream = match stream_res {
        Ok(s) => s,
        Err(e) => {
            crate::log_info!("[Audio] Failed to build stream: {}", e);
            return;
        }
    };
    if let Err(e) = stream.play() {
        crate::log_info!("[Audio] Failed to start stream: {}", e);
        return;
    }

    while !stop_signal.load(Ordering::SeqCst) {
        while let Ok(chunk) = rx.try_recv() {
            let mono = downmix(&chunk, channels);
            buffer.lock().unwrap().extend(mono);
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    drop(stream);
}

/// Average interleaved frames down to mono i16.
fn downmix(samples: &[f32], channels: usize) -> Vec<i16> {
    let channels = channels.max(1);
    samples
        .chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().sum();
            let avg = (sum / frame.len() as f32).clamp(-1.0, 1.0);
            (avg * i16::MAX as f32) as i16
        })
        .collect()
}

/// Simple nearest-neighbor resampling to 16kHz
pub fn resample_to_16khz(samples: &[i16], source_rate: u32) -> Vec<i16> {
    if source_rate == 16000 {
        return samples.to_vec();
    }
    let ratio = 16000.0 / source_rate as f64;
    let new_len = (samples.len() as f64 * ratio) as usize;
    let mut resampled = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src_idx = (i as f64 / ratio) as usize;
        if src_idx < samples.len() {
            resampled.push(samples[src_idx]);
        }
    }
    resampled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_is_identity_at_16khz() {
        let samples = vec![1i16, 2, 3, 4];
        assert_eq!(resample_to_16khz(&samples, 16000), samples);
    }

    #[test]
    fn resample_halves_48khz_to_a_third() {
        let samples: Vec<i16> = (0..48).collect();
        let out = resample_to_16khz(&samples, 48000);
        assert_eq!(out.len(), 16);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 3);
    }

    #[test]
    fn resample_upsamples_8khz() {
        let samples = vec![10i16, 20, 30];
        let out = resample_to_16khz(&samples, 8000);
        assert_eq!(out.len(), 6);
        assert_eq!(out, vec![10, 10, 20, 20, 30, 30]);
    }

    #[test]
    fn downmix_averages_stereo_frames() {
        let stereo = vec![0.5f32, -0.5, 1.0, 1.0];
        let mono = downmix(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert_eq!(mono[0], 0);
        assert_eq!(mono[1], i16::MAX);
    }

    #[test]
    fn downmix_clamps_out_of_range_input() {
        let mono = downmix(&[2.0f32, -2.0], 1);
        assert_eq!(mono, vec![i16::MAX, (-1.0f32 * i16::MAX as f32) as i16]);
    }
}
