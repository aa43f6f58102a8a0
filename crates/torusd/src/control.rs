use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};
use torus::{LoopCommand, RenderRequester, SurfaceSize};

/// One line of operator input from stdin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Loop(LoopCommand),
    Request,
}

pub fn parse_control(line: &str) -> Result<Control, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".into());
    };
    let argument = parts.next();
    match (verb.to_ascii_lowercase().as_str(), argument) {
        ("pause", None) => Ok(Control::Loop(LoopCommand::Pause)),
        ("resume", None) => Ok(Control::Loop(LoopCommand::Resume)),
        ("stop" | "quit", None) => Ok(Control::Loop(LoopCommand::Stop)),
        ("request" | "redraw", None) => Ok(Control::Request),
        ("fps", Some(value)) => value
            .parse::<f32>()
            .map(|fps| Control::Loop(LoopCommand::SetFps(fps)))
            .map_err(|_| format!("invalid fps '{value}'")),
        ("size", Some(value)) => crate::cli::parse_size(value)
            .map(|size: SurfaceSize| Control::Loop(LoopCommand::Resize(size))),
        (other, _) => Err(format!(
            "unknown command '{other}'; expected pause, resume, stop, request, fps N, or size WxH"
        )),
    }
}

/// Reads control lines from stdin on a detached thread until EOF.
///
/// The command sender is dropped at EOF, which the driver treats as "no more commands".
pub fn spawn_stdin_reader(commands: Sender<LoopCommand>, requester: RenderRequester) -> io::Result<()> {
    thread::Builder::new()
        .name("torusd-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_control(&line) {
                    Ok(Control::Request) => requester.request(),
                    Ok(Control::Loop(command)) => {
                        if commands.send(command).is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!("{err}"),
                }
            }
            tracing::debug!("stdin closed; control reader exiting");
        })
        .map(|_| ())
}

/// Requests a frame every `interval` until `stop` is dropped or signalled.
pub fn spawn_request_timer(
    interval: Duration,
    requester: RenderRequester,
    stop: Receiver<()>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("torusd-requests".into())
        .spawn(move || loop {
            select! {
                recv(stop) -> _ => break,
                default(interval) => requester.request(),
            }
        })
}
