use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{MainData, BODY_SEGMENTS_MAX, FEEDS_PER_DAY};

/// Banked Food Runner food converts into bonus feeds in chunks of this size.
pub(crate) const REWARD_CHUNK: u64 = 10;

/// A launch gap longer than this marks the dog as neglected.
pub(crate) const NEGLECT_DAYS: i64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FeedOutcome {
    Fed { segments: u32 },
    OutOfFood,
}

/// Reset the daily allowances when a new calendar day is observed. Bonus
/// feeds above the daily allowance survive the rollover.
pub(crate) fn roll_day(data: &mut MainData, today: NaiveDate) {
    match data.last_active_date {
        Some(d) if d == today => {}
        _ => {
            data.feed_count = 0;
            data.pet_count = 0;
            if data.remaining_feeds < FEEDS_PER_DAY {
                data.remaining_feeds = FEEDS_PER_DAY;
            }
        }
    }
    data.last_active_date = Some(today);
}

/// Feed the dog: one segment longer (capped), one daily feed spent, streak
/// bookkeeping updated. Refuses once today's feeds are gone.
pub(crate) fn feed(data: &mut MainData, today: NaiveDate) -> FeedOutcome {
    roll_day(data, today);
    if data.remaining_feeds == 0 {
        return FeedOutcome::OutOfFood;
    }

    data.remaining_feeds -= 1;
    data.feed_count += 1;
    data.total_feed_count += 1;
    data.body_count = (data.body_count + 1).min(BODY_SEGMENTS_MAX);

    match data.last_feed_date {
        Some(d) if d == today => {}
        Some(d) if today.signed_duration_since(d).num_days() == 1 => {
            data.consecutive_feed_days += 1;
        }
        _ => data.consecutive_feed_days = 1,
    }
    data.max_consecutive_feed_days = data
        .max_consecutive_feed_days
        .max(data.consecutive_feed_days);
    data.last_feed_date = Some(today);

    FeedOutcome::Fed {
        segments: data.body_count,
    }
}

pub(crate) fn stroke(data: &mut MainData, today: NaiveDate) {
    roll_day(data, today);
    data.pet_count += 1;
    data.total_pet_count += 1;
}

/// Called once at launch, before `last_played_at` is refreshed.
pub(crate) fn neglect_check(data: &mut MainData, now: DateTime<Utc>) -> bool {
    let gap = now.signed_duration_since(data.last_played_at);
    if gap.num_days() > NEGLECT_DAYS {
        data.sad_face_count += 1;
        return true;
    }
    false
}

/// Bank a finished session's food and convert whole chunks into bonus feeds.
/// Returns the number of bonus feeds granted.
pub(crate) fn bank_runner_food(data: &mut MainData, collected: u32) -> u32 {
    data.runner_food_banked += u64::from(collected);
    let owed = (data.runner_food_banked - data.runner_food_rewarded) / REWARD_CHUNK;
    if owed > 0 {
        data.runner_food_rewarded += owed * REWARD_CHUNK;
        data.remaining_feeds += owed as u32;
    }
    owed as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fresh() -> MainData {
        MainData::new(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn feeding_lengthens_until_the_cap() {
        let mut data = fresh();
        let today = day(2026, 8, 1);

        assert_eq!(feed(&mut data, today), FeedOutcome::Fed { segments: 2 });
        assert_eq!(data.length_points(), 110);

        data.body_count = BODY_SEGMENTS_MAX;
        data.remaining_feeds = 1;
        assert_eq!(
            feed(&mut data, today),
            FeedOutcome::Fed {
                segments: BODY_SEGMENTS_MAX
            }
        );
    }

    #[test]
    fn daily_allowance_runs_out_and_rolls_over() {
        let mut data = fresh();
        let today = day(2026, 8, 1);

        for _ in 0..3 {
            assert!(matches!(feed(&mut data, today), FeedOutcome::Fed { .. }));
        }
        assert_eq!(feed(&mut data, today), FeedOutcome::OutOfFood);
        assert_eq!(data.feed_count, 3);

        let tomorrow = day(2026, 8, 2);
        assert!(matches!(
            feed(&mut data, tomorrow),
            FeedOutcome::Fed { .. }
        ));
        assert_eq!(data.feed_count, 1);
        assert_eq!(data.remaining_feeds, 2);
    }

    #[test]
    fn streak_counts_consecutive_days_only() {
        let mut data = fresh();

        feed(&mut data, day(2026, 8, 1));
        assert_eq!(data.consecutive_feed_days, 1);

        feed(&mut data, day(2026, 8, 1));
        assert_eq!(data.consecutive_feed_days, 1);

        feed(&mut data, day(2026, 8, 2));
        assert_eq!(data.consecutive_feed_days, 2);

        // A skipped day resets the streak but not the best.
        feed(&mut data, day(2026, 8, 5));
        assert_eq!(data.consecutive_feed_days, 1);
        assert_eq!(data.max_consecutive_feed_days, 2);
    }

    #[test]
    fn bonus_feeds_survive_the_rollover() {
        let mut data = fresh();
        data.remaining_feeds = 5;
        roll_day(&mut data, day(2026, 8, 2));
        assert_eq!(data.remaining_feeds, 5);

        data.remaining_feeds = 0;
        data.last_feed_date = Some(day(2026, 8, 2));
        roll_day(&mut data, day(2026, 8, 3));
        assert_eq!(data.remaining_feeds, FEEDS_PER_DAY);
    }

    #[test]
    fn runner_food_converts_in_chunks_of_ten() {
        let mut data = fresh();

        assert_eq!(bank_runner_food(&mut data, 7), 0);
        assert_eq!(data.remaining_feeds, FEEDS_PER_DAY);

        // 7 + 5 = 12 banked: one chunk converts, two remain banked.
        assert_eq!(bank_runner_food(&mut data, 5), 1);
        assert_eq!(data.remaining_feeds, FEEDS_PER_DAY + 1);
        assert_eq!(data.runner_food_rewarded, 10);

        assert_eq!(bank_runner_food(&mut data, 28), 3);
        assert_eq!(data.runner_food_rewarded, 40);
    }

    #[test]
    fn neglect_is_flagged_after_a_long_gap() {
        let mut data = fresh();
        let soon = data.last_played_at + chrono::Duration::days(2);
        assert!(!neglect_check(&mut data, soon));
        assert_eq!(data.sad_face_count, 0);

        let later = data.last_played_at + chrono::Duration::days(5);
        assert!(neglect_check(&mut data, later));
        assert_eq!(data.sad_face_count, 1);
    }

    #[test]
    fn stroking_counts_today_and_forever() {
        let mut data = fresh();
        stroke(&mut data, day(2026, 8, 1));
        stroke(&mut data, day(2026, 8, 1));
        assert_eq!(data.pet_count, 2);
        assert_eq!(data.total_pet_count, 2);
    }
}
