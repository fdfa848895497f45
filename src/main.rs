/*
 *  main.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Startup, device setup, front end selection and orderly shutdown
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use env_logger::Env;
use log::{error, info, warn};

use memstrip::config::{self, Config};
use memstrip::display::{headless, MemorySurface};
use memstrip::scheduler::RunSummary;
use memstrip::sensor::{self, DeviceError};
use memstrip::{signals, Pipeline, CHANNEL_COUNT};
#[cfg(feature = "window")]
use memstrip::Shutdown;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    if cfg.run.dump_config {
        print!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("{} - real time acceleration", env!("CARGO_PKG_NAME"));
    info!("v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_FLAVOUR);

    let device = match open_sensor(&cfg) {
        Ok(device) => device,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let info = device.info();
    info!("sensor \"{}\": {} axes, {} buttons", info.name, info.axes, info.buttons);
    if (info.axes as usize) < CHANNEL_COUNT {
        warn!("sensor reports {} axes, missing channels will stay at zero", info.axes);
    }

    let mut pipeline = Pipeline::new(&cfg).context("cannot allocate frame buffers")?;
    let shutdown = pipeline.shutdown_token();
    pipeline.start_acquisition(device)?;

    let signals = match signals::install(shutdown.clone()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("signal watcher not started: {}", e);
            None
        }
    };

    let outcome = run_front_end(&pipeline, &cfg);

    shutdown.trigger();
    if let Some(handle) = signals {
        if handle.join().is_err() {
            error!("signal watcher panicked");
        }
    }

    if let Some(path) = cfg.run.snapshot.as_deref() {
        match save_snapshot(&pipeline, path) {
            Ok(()) => info!("snapshot written to {}", path.display()),
            Err(e) => error!("snapshot {}: {}", path.display(), e),
        }
    }

    let failure = pipeline.shutdown();

    let summary = outcome?;
    info!(
        "stopped: {} ticks, {} frames rendered, {} triggers skipped while busy",
        summary.ticks, summary.frames, summary.rejected
    );

    if let Some(reason) = failure {
        bail!("worker failed: {}", reason);
    }
    Ok(())
}

/// Open the sensor and switch it to raw readings.
fn open_sensor(cfg: &Config) -> Result<sensor::BoxedDevice, DeviceError> {
    let mut device = sensor::open_device(&cfg.device)?;
    device.set_raw_mode()?;
    Ok(device)
}

fn run_front_end(pipeline: &Pipeline, cfg: &Config) -> anyhow::Result<RunSummary> {
    let run_for = cfg.run.run_for_secs.map(Duration::from_secs);

    #[cfg(feature = "window")]
    if !cfg.run.headless {
        let shutdown = pipeline.shutdown_token();
        let timer = run_for.map(|d| start_run_timer(shutdown.clone(), d)).transpose()?;
        let summary = memstrip::display::window::run(pipeline, cfg)?;
        if let Some(timer) = timer {
            shutdown.trigger();
            let _ = timer.join();
        }
        return Ok(summary);
    }

    #[cfg(not(feature = "window"))]
    if !cfg.run.headless {
        warn!("built without the window front end, running headless");
    }

    let (summary, _view) = headless::run(pipeline, cfg.timing.render_tick(), run_for)?;
    Ok(summary)
}

#[cfg(feature = "window")]
fn start_run_timer(shutdown: Shutdown, run_for: Duration) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new().name("run-timer".into()).spawn(move || {
        if !shutdown.wait_timeout(run_for) {
            info!("run time elapsed");
            shutdown.trigger();
        }
    })
}

/// Copy the last completed frame to a PPM file.
fn save_snapshot(pipeline: &Pipeline, path: &Path) -> anyhow::Result<()> {
    let compositor = pipeline.compositor();
    let size = compositor.viewport();
    let background = compositor.buffer().hold().background();
    let mut surface = MemorySurface::new(size.width, size.height, background)?;
    compositor.on_expose(&compositor.full_area(), &mut surface);
    surface.save_ppm(path)?;
    Ok(())
}
