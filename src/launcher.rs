use crate::error::Error;
use std::process::{Command, Stdio};
use std::thread;

/// Hands `url` to the platform's default opener without waiting for it
pub fn open_url(url: &str) -> Result<(), Error> {
    spawn_detached(opener_command(url), url)?;
    log::info!("opened {}", url);
    Ok(())
}

/// Spawns `command` with null stdio and reaps it on a background thread
fn spawn_detached(mut command: Command, url: &str) -> Result<thread::JoinHandle<()>, Error> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| Error::Launch {
            url: url.to_string(),
            source,
        })?;
    Ok(thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => log::warn!("link opener exited with {}", status),
        Ok(_) => {}
        Err(err) => log::warn!("could not wait for link opener: {}", err),
    }))
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
