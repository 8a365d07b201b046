//! Daily scheduling of digest runs

use crate::pipeline::DigestJob;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

/// Next instant strictly after `now` whose local time is `at`.
///
/// Local times skipped by a DST transition move to the following day.
#[must_use]
pub fn next_run_after(now: DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    for offset in 0..=2 {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(at)).earliest() {
            if candidate > now {
                return candidate;
            }
        }
    }

    now + chrono::Duration::days(1)
}

/// Run the job every day at `at` local time until Ctrl+C.
///
/// A failed run is logged and does not affect the next one.
pub async fn run_daily(job: &DigestJob, at: NaiveTime, run_now: bool) {
    let tz = job.settings().timezone;

    if run_now {
        // errors are already logged by the job
        let _ = job.run_once().await;
    }

    loop {
        let now = Utc::now().with_timezone(&tz);
        let next = next_run_after(now, at);
        let wait = (next - now).to_std().unwrap_or_default();

        info!(
            "Next digest scheduled for {} ({:.1}h from now)",
            next.format("%Y-%m-%d %H:%M %Z"),
            wait.as_secs_f64() / 3600.0
        );

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Received Ctrl+C, stopping scheduler"),
                    Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
                }
                return;
            }
        }

        if job.run_once().await.is_err() {
            warn!("Scheduled run failed; waiting for the next slot");
        }
    }
}
