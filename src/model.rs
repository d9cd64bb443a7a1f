use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const BODY_SEGMENTS_MAX: u32 = 20;
pub(crate) const FEEDS_PER_DAY: u32 = 3;

/// Which screen the app is showing. Navigation state only, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Pet,
    Runner,
    Settings,
    Help,
}

/// The persisted pet record: growth, daily allowances, and lifetime counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct MainData {
    /// Body segments; the dog starts at one and lengthens per feed.
    pub(crate) body_count: u32,
    /// Feeds used today.
    pub(crate) feed_count: u32,
    pub(crate) remaining_feeds: u32,
    pub(crate) last_feed_date: Option<NaiveDate>,
    /// Last calendar day any daily counter was touched; drives the rollover.
    pub(crate) last_active_date: Option<NaiveDate>,
    /// Strokes today.
    pub(crate) pet_count: u32,
    pub(crate) total_play_secs: u64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_played_at: DateTime<Utc>,

    // Lifetime counters.
    pub(crate) total_feed_count: u64,
    pub(crate) total_pet_count: u64,
    pub(crate) consecutive_feed_days: u32,
    pub(crate) max_consecutive_feed_days: u32,
    pub(crate) sad_face_count: u32,

    // Food Runner reward bookkeeping: banked food converts into bonus feeds
    // in chunks, rewarded tracks how much has been converted so far.
    pub(crate) runner_food_banked: u64,
    pub(crate) runner_food_rewarded: u64,
}

impl MainData {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            body_count: 1,
            feed_count: 0,
            remaining_feeds: FEEDS_PER_DAY,
            last_feed_date: None,
            last_active_date: None,
            pet_count: 0,
            total_play_secs: 0,
            created_at: now,
            last_played_at: now,
            total_feed_count: 0,
            total_pet_count: 0,
            consecutive_feed_days: 0,
            max_consecutive_feed_days: 0,
            sad_face_count: 0,
            runner_food_banked: 0,
            runner_food_rewarded: 0,
        }
    }

    /// Nose-to-tail length in display points: an 80-point head plus 30 per
    /// extra segment.
    pub(crate) fn length_points(&self) -> u32 {
        80 + (self.body_count.saturating_sub(1)) * 30
    }
}
