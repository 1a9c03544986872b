use std::{io, thread};

use pongevo_evaluator::cancel::CancellationToken;

/// Cancels `cancel` once a line reading `q` arrives on stdin.
///
/// The watcher thread is detached; it simply stops when stdin is closed.
pub(crate) fn watch_stdin(cancel: CancellationToken) {
    let spawned = thread::Builder::new()
        .name("quit-watcher".to_owned())
        .spawn(move || {
            for line in io::stdin().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim().eq_ignore_ascii_case("q") {
                    log::warn!("abort requested, stopping after the current tick");
                    cancel.cancel();
                    break;
                }
            }
        });
    match spawned {
        Ok(_) => eprintln!("Enter `q` to abort."),
        Err(e) => log::warn!("cannot watch stdin for abort requests: {e}"),
    }
}
