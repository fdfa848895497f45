/*
 *  signals.rs
 *
 *  memstrip - MEMS strip-chart viewer
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unix signal watcher tripping the shutdown token
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

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};
use tokio::signal::unix::{signal, SignalKind};

use crate::shutdown::Shutdown;

/// How often the watcher notices a shutdown that came from elsewhere.
const WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal, or for the
/// token to be tripped by someone else. Returns the signal name if one arrived.
async fn signal_handler(shutdown: &Shutdown) -> io::Result<Option<&'static str>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;
    let mut watch = tokio::time::interval(WATCH_INTERVAL);

    loop {
        tokio::select! {
            _ = sigint.recv() => return Ok(Some("SIGINT")),
            _ = sigterm.recv() => return Ok(Some("SIGTERM")),
            _ = sighup.recv() => return Ok(Some("SIGHUP")),
            _ = watch.tick() => {
                if shutdown.is_triggered() {
                    return Ok(None);
                }
            }
        }
    }
}

const WATCHED: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP];

/// Hand the watched signals back to the kernel defaults; tokio's handlers
/// otherwise stay registered after the watcher is gone.
fn restore_default_handlers() {
    for sig in WATCHED {
        // Safety: SIG_DFL is a valid disposition for every watched signal.
        unsafe {
            libc::signal(sig, libc::SIG_DFL);
        }
    }
}

/// Run the watcher on its own thread with a small current-thread runtime.
/// The thread ends once the token is tripped, by a signal or otherwise, and
/// a further signal then terminates the process. Install once per process.
pub fn install(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    thread::Builder::new().name("signals".into()).spawn(move || {
        match rt.block_on(signal_handler(&shutdown)) {
            Ok(Some(name)) => {
                info!("{} received. Initiating graceful shutdown.", name);
                shutdown.trigger();
            }
            Ok(None) => {}
            Err(e) => {
                warn!("signal handling unavailable: {}", e);
            }
        }
        restore_default_handlers();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_exits_when_tripped_elsewhere() {
        let token = Shutdown::new();
        let handle = install(token.clone()).unwrap();
        thread::sleep(Duration::from_millis(20));
        token.trigger();
        handle.join().unwrap();

        // SIGHUP is back to the default action once the watcher is gone
        let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::sigaction(libc::SIGHUP, std::ptr::null(), &mut current) };
        assert_eq!(rc, 0);
        assert_eq!(current.sa_sigaction, libc::SIG_DFL);
    }
}
