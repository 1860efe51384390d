//! Timers that drive sessions: the presentation sequence and the round clock.
//!
//! Each chain carries the epoch it was started for and gives up as soon as the
//! hub reports a different one, so a restart or an early "ready" leaves old
//! timers with nothing to do.

use std::sync::Arc;

use actix_web::rt;
use log::debug;
use tokio::time::sleep;

use crate::services::sessions::{SessionHub, TickControl};

/// Show the word, count down, then start the round clock.
pub fn run_presentation(hub: Arc<SessionHub>, user_id: String, epoch: u64) {
    rt::spawn(async move {
        let timings = hub.timings();

        sleep(timings.word_display).await;
        let Some(epoch) = hub.begin_countdown(&user_id, epoch) else {
            debug!("Presentation for {} superseded before countdown", user_id);
            return;
        };

        sleep(timings.countdown).await;
        let Some(epoch) = hub.complete_presentation(&user_id, epoch) else {
            debug!("Presentation for {} superseded before play", user_id);
            return;
        };

        run_round_clock(hub, user_id, epoch);
    });
}

/// Tick once per interval until the round finishes, levels up or is replaced.
pub fn run_round_clock(hub: Arc<SessionHub>, user_id: String, epoch: u64) {
    rt::spawn(async move {
        let tick = hub.timings().tick;
        loop {
            sleep(tick).await;
            match hub.tick(&user_id, epoch) {
                TickControl::Continue => continue,
                TickControl::Present(next) => {
                    run_presentation(hub, user_id, next);
                    break;
                }
                TickControl::Stop => break,
            }
        }
    });
}
