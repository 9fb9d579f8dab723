//! Command implementations.

use crate::colors;
use crate::exit_codes::ExitCode;
use narrator_core::capture::microphone::{self, Microphone};
use narrator_core::{config, monitor_channel, MonitorBuffer, MONITOR_QUEUE_CHUNKS};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// List the audio input devices available for narration.
pub fn devices(json: bool) -> ExitCode {
    let devices = match microphone::list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            return ExitCode::DeviceUnavailable;
        }
    };

    let configured = config::load_config().audio.device_id;

    if json {
        let entries: Vec<_> = devices
            .iter()
            .map(|d| {
                json!({
                    "id": d.id,
                    "name": d.name,
                    "configured": d.id == configured,
                })
            })
            .collect();
        println!("{}", json!({ "devices": entries }));
        return ExitCode::Success;
    }

    if devices.is_empty() {
        println!("{}", colors::dim("No input devices found"));
        return ExitCode::Success;
    }

    println!("{}", colors::header("Input devices:"));
    for device in &devices {
        println!(
            "  {} {} {}",
            colors::configured_marker(device.id == configured),
            colors::number(&device.id.to_string()),
            device.name
        );
    }
    println!();
    println!("{}", colors::dim("* configured for recording"));
    ExitCode::Success
}

/// Open an input device and sample it briefly to verify it delivers audio.
pub fn check(device: Option<usize>, json: bool) -> ExitCode {
    let cfg = config::load_config();
    let device_id = device.unwrap_or(cfg.audio.device_id);
    debug!("Checking input device {}", device_id);

    let (feed, mut drain) = monitor_channel(MONITOR_QUEUE_CHUNKS);
    let mic = match Microphone::open(device_id, feed) {
        Ok(mic) => mic,
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            return ExitCode::DeviceUnavailable;
        }
    };

    std::thread::sleep(Duration::from_secs(1));

    let mut buffer = MonitorBuffer::new(mic.channels() as usize, cfg.monitor.window);
    let chunks = drain.drain_into(&mut buffer);
    let peak = (0..buffer.channels())
        .flat_map(|ch| buffer.channel(ch).iter().copied())
        .fold(0.0f32, |acc, s| acc.max(s.abs()));

    if json {
        println!(
            "{}",
            json!({
                "device": device_id,
                "channels": mic.channels(),
                "sample_rate": mic.sample_rate(),
                "chunks": chunks,
                "peak": peak,
            })
        );
        return ExitCode::Success;
    }

    println!(
        "Device {}: {} ch @ {} Hz",
        colors::number(&device_id.to_string()),
        mic.channels(),
        mic.sample_rate()
    );
    if chunks == 0 {
        eprintln!("{}", colors::error("device opened but delivered no audio"));
        return ExitCode::DeviceUnavailable;
    }
    println!(
        "{} peak level {}",
        colors::success("OK,"),
        colors::peak_level(peak)
    );
    ExitCode::Success
}

/// Print the effective configuration.
pub fn config_show(json: bool) -> ExitCode {
    let cfg = config::load_config();
    let output_dir = match config::get_output_dir(&cfg) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}", colors::error(&e));
            return ExitCode::ConfigError;
        }
    };

    if json {
        println!(
            "{}",
            json!({
                "output_directory": output_dir,
                "device_id": cfg.audio.device_id,
                "seek_step_ms": cfg.playback.seek_step_ms,
            })
        );
        return ExitCode::Success;
    }

    println!("{}", colors::header("Configuration:"));
    println!(
        "  output directory: {}",
        colors::path(&output_dir.display().to_string())
    );
    println!("  input device:     {}", cfg.audio.device_id);
    println!("  seek step:        {} ms", cfg.playback.seek_step_ms);
    ExitCode::Success
}

/// Set the annotation output directory.
pub fn config_set_output(directory: &str) -> ExitCode {
    if let Err(e) = config::validate_directory(directory) {
        eprintln!("{}", colors::error(&e));
        return ExitCode::InvalidArguments;
    }

    let mut cfg = config::load_config();
    cfg.output.directory = Some(directory.to_string());

    match config::save_config(&cfg) {
        Ok(()) => {
            println!("{}", colors::success("Output directory updated"));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e));
            ExitCode::ConfigError
        }
    }
}

/// Set the recording input device.
pub fn config_set_device(device_id: usize) -> ExitCode {
    match microphone::list_devices() {
        Ok(devices) if devices.iter().any(|d| d.id == device_id) => {}
        Ok(_) => {
            eprintln!(
                "{}",
                colors::error(&format!("no input device with id {}", device_id))
            );
            return ExitCode::InvalidArguments;
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            return ExitCode::DeviceUnavailable;
        }
    }

    let mut cfg = config::load_config();
    cfg.audio.device_id = device_id;

    match config::save_config(&cfg) {
        Ok(()) => {
            println!("{}", colors::success("Input device updated"));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e));
            ExitCode::ConfigError
        }
    }
}
