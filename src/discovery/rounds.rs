//! Draw calendar arithmetic.
//!
//! Round 1 was drawn on Saturday 2002-12-07 and a round is drawn every
//! Saturday at 20:35 KST, so round numbers can be estimated from dates
//! without any lookup.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc, Weekday};

use super::RoundCacheSlot;
use crate::types::DrawRecord;

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Korea Standard Time.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn first_draw_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2002, 12, 7).unwrap_or(NaiveDate::MIN)
}

/// Local draw time on a draw day.
pub fn draw_time() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 35, 0).unwrap_or(NaiveTime::MIN)
}

/// Round drawn in the week containing `date`; 0 before the first draw.
pub fn estimate_round_for_date(date: NaiveDate) -> u32 {
    let days = (date - first_draw_date()).num_days();
    if days < 0 {
        return 0;
    }
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
}

/// Scheduled draw date of `round`; `None` for round 0.
pub fn draw_date_for_round(round: u32) -> Option<NaiveDate> {
    if round == 0 {
        return None;
    }
    first_draw_date().checked_add_signed(Duration::weeks(i64::from(round) - 1))
}

/// Whether the scheduled draw time of `round` has passed at `now`.
pub fn is_round_drawn(round: u32, now: DateTime<Utc>) -> bool {
    let Some(date) = draw_date_for_round(round) else {
        return false;
    };
    let local = now.with_timezone(&kst()).naive_local();
    local > date.and_time(draw_time())
}

/// Latest round whose draw time has passed, judged by the clock alone.
pub fn latest_drawn_round(now: DateTime<Utc>) -> u32 {
    let today = now.with_timezone(&kst()).date_naive();
    let estimate = estimate_round_for_date(today);
    if estimate > 0 && !is_round_drawn(estimate, now) {
        estimate - 1
    } else {
        estimate
    }
}

/// Round the next recommendation targets: one past the cached round, or a
/// date estimate when nothing is cached.
pub fn next_round(cache: &dyn RoundCacheSlot, today: NaiveDate) -> u32 {
    match cache.last_known_round() {
        Some(round) => round.saturating_add(1),
        None => estimate_round_for_date(today),
    }
}

/// Round drawn on the next-or-same Saturday (KST) after `created_at`,
/// counted from the latest known draw. Never below 1.
pub fn expected_round_for(created_at: DateTime<Utc>, latest: &DrawRecord) -> u32 {
    let latest_sat = previous_or_same_saturday(latest.date());
    let created = created_at.with_timezone(&kst()).date_naive();
    let target_sat = next_or_same_saturday(created);
    let weeks = (target_sat - latest_sat).num_days() / 7;
    let round = i64::from(latest.round()) + weeks;
    u32::try_from(round.max(1)).unwrap_or(u32::MAX)
}

fn next_or_same_saturday(date: NaiveDate) -> NaiveDate {
    let sat = i64::from(Weekday::Sat.num_days_from_monday());
    let wd = i64::from(date.weekday().num_days_from_monday());
    date + Duration::days((sat - wd).rem_euclid(7))
}

fn previous_or_same_saturday(date: NaiveDate) -> NaiveDate {
    let sat = i64::from(Weekday::Sat.num_days_from_monday());
    let wd = i64::from(date.weekday().num_days_from_monday());
    date - Duration::days((wd - sat).rem_euclid(7))
}
