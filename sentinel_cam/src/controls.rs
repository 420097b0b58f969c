// Control plumbing. Ctrl-C and typed commands are turned into `ControlEvent`s on an
// unbounded channel; the frame loop drains it once per frame.

use sentinel_vision::ControlEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

/// Maps one line of user input to a control event.
pub fn parse_command(line: &str) -> Option<ControlEvent> {
    match line.trim().to_ascii_lowercase().as_str() {
        "q" | "quit" => Some(ControlEvent::Quit),
        "s" | "snap" | "snapshot" => Some(ControlEvent::ManualSnapshot),
        _ => None,
    }
}

pub async fn forward_ctrl_c(controls: UnboundedSender<ControlEvent>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("Ctrl-C received, finishing up.");
            let _ = controls.send(ControlEvent::Quit);
        }
        Err(e) => log::warn!("Cannot listen for Ctrl-C: {e}"),
    }
}

pub async fn forward_stdin(controls: UnboundedSender<ControlEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Some(event) => {
                    if controls.send(event).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => log::warn!("Unknown command {:?} (use q or s)", line.trim()),
            },
            Ok(None) => break,
            Err(e) => {
                log::warn!("Stopped reading commands: {e}");
                break;
            }
        }
    }
}
