//! The two periodic drivers (spec §5/§9): a 15-minute ingest+extract loop,
//! and a weekly digest loop timed to Monday 07:00 server-local. Each loop
//! self-reschedules on completion rather than running on a fixed
//! `tokio::time::interval` tick for the digest, since a missed Monday fire
//! (process restart) must skip forward to the *next* Monday, not fire
//! immediately on restart.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc, Weekday};
use tracing::info;

pub const INGEST_INTERVAL: StdDuration = StdDuration::from_secs(15 * 60);

/// The next Monday 07:00 UTC at or after `now`. If `now` is itself Monday
/// before 07:00, that is the target (same-day run); otherwise advance to
/// the following Monday. A restart exactly at or after Monday 07:00 always
/// computes *next* week — it never re-fires the week that just ran.
pub fn next_weekly_digest_fire(now: DateTime<Utc>) -> DateTime<Utc> {
    let today_seven = Utc
        .with_ymd_and_hms(now.year(), now.month(), now.day(), 7, 0, 0)
        .single()
        .unwrap_or(now);

    if now.weekday() == Weekday::Mon && now < today_seven {
        return today_seven;
    }

    let days_until_monday = (7 - now.weekday().num_days_from_monday()) % 7;
    let days_until_monday = if days_until_monday == 0 { 7 } else { days_until_monday };
    let next_monday = now.date_naive() + Duration::days(days_until_monday as i64);

    Utc.with_ymd_and_hms(next_monday.year(), next_monday.month(), next_monday.day(), 7, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Run `ingest_cycle` immediately, then every `INGEST_INTERVAL` thereafter,
/// forever. The caller's closure owns error handling; a panicking cycle
/// would abort the whole loop, so callers must catch and log their own
/// errors rather than propagate them out of the closure.
pub async fn run_ingest_loop<F, Fut>(mut ingest_cycle: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let mut interval = tokio::time::interval(INGEST_INTERVAL);
    loop {
        interval.tick().await;
        ingest_cycle().await;
    }
}

/// Sleep until the next Monday 07:00 server-local, run `digest_cycle`, then
/// recompute the following target and repeat, forever.
pub async fn run_digest_loop<F, Fut>(mut digest_cycle: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    loop {
        let now = Utc::now();
        let next_fire = next_weekly_digest_fire(now);
        let wait = (next_fire - now).to_std().unwrap_or(StdDuration::from_secs(0));
        info!(next_fire = %next_fire, wait_secs = wait.as_secs(), "scheduler: sleeping until next weekly digest fire");
        tokio::time::sleep(wait).await;
        digest_cycle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_monday_before_seven_schedules_same_day() {
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 6, 30, 0).unwrap(); // Monday
        let fire = next_weekly_digest_fire(now);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 8, 3, 7, 0, 0).unwrap());
    }

    #[test]
    fn restart_monday_after_seven_skips_to_next_week() {
        let now = Utc.with_ymd_and_hms(2026, 8, 3, 7, 5, 0).unwrap(); // Monday, just missed
        let fire = next_weekly_digest_fire(now);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 8, 10, 7, 0, 0).unwrap());
    }

    #[test]
    fn mid_week_schedules_upcoming_monday() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap(); // Wednesday
        let fire = next_weekly_digest_fire(now);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 8, 10, 7, 0, 0).unwrap());
    }

    #[test]
    fn sunday_night_schedules_tomorrow_morning() {
        let now = Utc.with_ymd_and_hms(2026, 8, 9, 23, 0, 0).unwrap(); // Sunday
        let fire = next_weekly_digest_fire(now);
        assert_eq!(fire, Utc.with_ymd_and_hms(2026, 8, 10, 7, 0, 0).unwrap());
    }
}
