use chrono::{DateTime, Duration, Utc};

use crate::config::SchedulerConfig;
use crate::domain::memory::{clamp_difficulty, clamp_stability};
use crate::domain::{
  MemoryState, Preview, Rating, ReplayEntry, ReviewEvent, ReviewOutcome, ReviewRequest,
};
use crate::error::SchedulerError;

use super::formulas;
use super::params::{FormulaVersion, SAME_DAY_THRESHOLD_DAYS};
use super::sm2::{memory_state_from_sm2, Sm2Record, DEFAULT_SM2_RETENTION};

/// FSRS memory scheduler.
///
/// Stateless between calls and never reads a clock: every operation is a
/// pure function of its arguments and the config it was built with.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
  config: SchedulerConfig,
}

impl Scheduler {
  pub fn new(config: SchedulerConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SchedulerConfig {
    &self.config
  }

  /// Schedule one review.
  ///
  /// New items (no previous state) start from rating-indexed tables of the
  /// configured default version. Existing items keep the version recorded in
  /// their state.
  pub fn review(&self, event: &ReviewEvent) -> ReviewOutcome {
    let outcome = match &event.previous_state {
      None => self.review_new(event.rating, event.now),
      Some(previous) => self.review_existing(
        previous,
        event.rating,
        event.now,
        event.previous_repetitions,
      ),
    };

    tracing::debug!(
      "Scheduled {} review ({}): S={:.3} D={:.3} R={:.3} interval={}d",
      event.rating.as_str(),
      outcome.state.version,
      outcome.state.stability,
      outcome.state.difficulty,
      outcome.retrievability,
      outcome.interval_days
    );
    crate::profile_log!(crate::profiling::EventType::ReviewScheduled {
      version: outcome.state.version.as_str().to_string(),
      rating: event.rating.as_str().to_string(),
      is_new: event.previous_state.is_none(),
      interval_days: outcome.interval_days,
    });

    outcome
  }

  /// Validate a wire request, then schedule it.
  pub fn review_request(&self, request: ReviewRequest) -> Result<ReviewOutcome, SchedulerError> {
    let event = ReviewEvent::try_from(request)?;
    Ok(self.review(&event))
  }

  /// Outcome of each of the four ratings, for labelling rating buttons.
  pub fn preview(
    &self,
    now: DateTime<Utc>,
    previous_state: Option<&MemoryState>,
    previous_repetitions: Option<u32>,
  ) -> Preview {
    let outcome_for = |rating: Rating| {
      self.review(&ReviewEvent {
        rating,
        now,
        previous_state: previous_state.cloned(),
        previous_repetitions,
      })
    };
    Preview {
      again: outcome_for(Rating::Again),
      hard: outcome_for(Rating::Hard),
      good: outcome_for(Rating::Good),
      easy: outcome_for(Rating::Easy),
    }
  }

  /// Current recall probability of a stored state.
  pub fn retrievability(&self, state: &MemoryState, now: DateTime<Utc>) -> f64 {
    formulas::retrievability(state.elapsed_days(now), state.stability)
  }

  /// Rebuild an item's state from its review log.
  ///
  /// Entries are applied in timestamp order (stable for equal timestamps)
  /// starting from a new item. Returns `None` for an empty log.
  pub fn replay(&self, entries: &[ReplayEntry]) -> Option<ReviewOutcome> {
    let mut ordered: Vec<&ReplayEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.reviewed_at);

    let mut last: Option<ReviewOutcome> = None;
    for entry in ordered {
      let event = ReviewEvent {
        rating: entry.rating,
        now: entry.reviewed_at,
        previous_state: last.as_ref().map(|o| o.state.clone()),
        previous_repetitions: None,
      };
      last = Some(self.review(&event));
    }
    last
  }

  /// Estimate a state for a legacy SM-2 card under the default version.
  pub fn import_sm2(
    &self,
    record: &Sm2Record,
    sm2_retention: Option<f64>,
  ) -> Result<MemoryState, SchedulerError> {
    memory_state_from_sm2(
      record,
      self.config.default_version,
      &self.config.weights,
      sm2_retention.unwrap_or(DEFAULT_SM2_RETENTION),
    )
  }

  fn review_new(&self, rating: Rating, now: DateTime<Utc>) -> ReviewOutcome {
    let version = self.config.default_version;
    let w = self.config.weights.table(version);

    let state = MemoryState {
      version,
      stability: formulas::initial_stability(w, rating),
      difficulty: formulas::initial_difficulty(version, w, rating),
      lapses: if rating.is_fail() { 1 } else { 0 },
      repetitions: if rating.is_fail() { 0 } else { 1 },
      last_reviewed_at: now,
    };
    self.outcome(state, now, 1.0)
  }

  fn review_existing(
    &self,
    previous: &MemoryState,
    rating: Rating,
    now: DateTime<Utc>,
    previous_repetitions: Option<u32>,
  ) -> ReviewOutcome {
    let version = previous.version;
    let w = self.config.weights.table(version);

    let s = previous.clamped_stability();
    let d = previous.clamped_difficulty();
    let elapsed = previous.elapsed_days(now);
    let r = formulas::retrievability(elapsed, s);

    let difficulty = formulas::next_difficulty(version, w, d, rating);
    let stability = if rating.is_fail() {
      formulas::forget_stability(w, d, s, r)
    } else {
      let next = match version {
        FormulaVersion::Fsrs5 if elapsed < SAME_DAY_THRESHOLD_DAYS => {
          formulas::short_term_stability(w, d, s, r, rating)
        }
        _ => formulas::recall_stability(w, d, s, r, rating),
      };
      // successful recall never lowers stability
      next.max(s)
    };

    let (lapses, repetitions) = if rating.is_fail() {
      (previous.lapses.saturating_add(1), 0)
    } else {
      let prior = previous_repetitions.unwrap_or(previous.repetitions);
      (previous.lapses, prior.saturating_add(1))
    };

    let state = MemoryState {
      version,
      stability: clamp_stability(stability),
      difficulty: clamp_difficulty(difficulty),
      lapses,
      repetitions,
      last_reviewed_at: now,
    };
    self.outcome(state, now, r)
  }

  fn outcome(&self, state: MemoryState, now: DateTime<Utc>, retrievability: f64) -> ReviewOutcome {
    let interval_days = formulas::next_interval(
      state.stability,
      self.config.desired_retention,
      self.config.maximum_interval_days,
    );
    ReviewOutcome {
      repetitions: state.repetitions,
      next_review: now + Duration::days(interval_days as i64),
      interval_days,
      retrievability,
      state,
    }
  }
}

/// Schedule one review with the default configuration.
pub fn review(event: &ReviewEvent) -> ReviewOutcome {
  Scheduler::default().review(event)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::srs::params::{S_MAX, S_MIN};
  use crate::testing::{at, state};

  fn good_then(rating: Rating, first: &str, second: &str) -> (ReviewOutcome, ReviewOutcome) {
    let scheduler = Scheduler::default();
    let first = scheduler.review(&ReviewEvent::new(Rating::Good, at(first)));
    let second = scheduler.review(&ReviewEvent::new(rating, at(second)).with_state(first.state.clone()));
    (first, second)
  }

  fn assert_finite(outcome: &ReviewOutcome) {
    assert!(outcome.state.stability.is_finite() && outcome.state.stability > 0.0);
    assert!(outcome.state.difficulty.is_finite());
    assert!(outcome.retrievability.is_finite());
    assert!(outcome.interval_days >= 1);
  }

  // New items

  #[test]
  fn test_new_item_all_ratings() {
    let scheduler = Scheduler::default();
    let now = at("2026-02-14T10:00:00Z");
    for rating in Rating::ALL {
      let outcome = scheduler.review(&ReviewEvent::new(rating, now));
      assert!(outcome.interval_days >= 1, "{:?}", rating);
      assert!(outcome.state.stability > 0.0, "{:?}", rating);
      assert_eq!(outcome.state.version, FormulaVersion::Fsrs5);
      assert_eq!(outcome.state.last_reviewed_at, now);
      assert_eq!(outcome.retrievability, 1.0);
    }
  }

  #[test]
  fn test_new_item_good_scenario() {
    let now = at("2026-02-14T10:00:00Z");
    let outcome = review(&ReviewEvent::new(Rating::Good, now));
    assert_eq!(outcome.repetitions, 1);
    assert_eq!(outcome.state.lapses, 0);
    assert!(outcome.state.stability > 0.0);
    assert!(outcome.interval_days >= 1);
    assert!(outcome.next_review > now);
  }

  #[test]
  fn test_new_item_fail_counts_lapse() {
    let outcome = review(&ReviewEvent::new(Rating::Again, at("2026-02-14T10:00:00Z")));
    assert_eq!(outcome.repetitions, 0);
    assert_eq!(outcome.state.lapses, 1);
  }

  #[test]
  fn test_new_item_initial_stability_ordered() {
    let scheduler = Scheduler::default();
    let now = at("2026-02-14T10:00:00Z");
    let stability: Vec<f64> = Rating::ALL
      .iter()
      .map(|r| scheduler.review(&ReviewEvent::new(*r, now)).state.stability)
      .collect();
    assert!(stability.windows(2).all(|pair| pair[0] < pair[1]));
  }

  #[test]
  fn test_new_item_uses_configured_version() {
    let scheduler = Scheduler::new(SchedulerConfig {
      default_version: FormulaVersion::Fsrs45,
      ..Default::default()
    });
    let outcome = scheduler.review(&ReviewEvent::new(Rating::Good, at("2026-02-14T10:00:00Z")));
    assert_eq!(outcome.state.version, FormulaVersion::Fsrs45);
    assert_eq!(outcome.state.stability, crate::srs::params::FSRS_4_5_WEIGHTS[2]);
  }

  // Existing items

  #[test]
  fn test_good_then_easy_scenario() {
    let (first, second) = good_then(Rating::Easy, "2026-02-01T10:00:00Z", "2026-02-08T10:00:00Z");
    assert!(second.interval_days >= first.interval_days);
    assert_eq!(second.repetitions, 2);
    assert!(second.state.stability > first.state.stability);
    assert!(second.retrievability < 1.0);
  }

  #[test]
  fn test_good_then_fail_scenario() {
    let (first, second) = good_then(Rating::Again, "2026-02-01T10:00:00Z", "2026-02-12T10:00:00Z");
    assert_eq!(first.state.lapses, 0);
    assert_eq!(second.repetitions, 0);
    assert!(second.interval_days >= 1);
    assert_eq!(second.state.lapses, 1);
    assert!(second.state.stability < first.state.stability);
  }

  #[test]
  fn test_ratings_order_stability_growth() {
    let scheduler = Scheduler::default();
    let previous = state(FormulaVersion::Fsrs5, 10.0, 5.0, at("2026-02-01T10:00:00Z"));
    let preview = scheduler.preview(at("2026-02-11T10:00:00Z"), Some(&previous), None);
    assert!(preview.again.state.stability < previous.stability);
    assert!(preview.hard.state.stability > previous.stability);
    assert!(preview.good.state.stability > preview.hard.state.stability);
    assert!(preview.easy.state.stability > preview.good.state.stability);
    assert!(preview.easy.interval_days >= preview.good.interval_days);
    assert!(preview.good.interval_days >= preview.hard.interval_days);
  }

  #[test]
  fn test_longer_gap_not_shorter_interval() {
    let scheduler = Scheduler::default();
    let previous = state(FormulaVersion::Fsrs5, 10.0, 5.0, at("2026-02-01T10:00:00Z"));
    let early = scheduler.review(
      &ReviewEvent::new(Rating::Good, at("2026-02-06T10:00:00Z")).with_state(previous.clone()),
    );
    let late = scheduler.review(
      &ReviewEvent::new(Rating::Good, at("2026-02-21T10:00:00Z")).with_state(previous),
    );
    assert!(late.interval_days >= early.interval_days);
  }

  #[test]
  fn test_fail_resets_repetitions_and_adds_lapse() {
    let scheduler = Scheduler::default();
    let mut previous = state(FormulaVersion::Fsrs45, 20.0, 6.0, at("2026-01-01T00:00:00Z"));
    previous.lapses = 3;
    previous.repetitions = 7;
    let outcome = scheduler.review(
      &ReviewEvent::new(Rating::Again, at("2026-02-01T00:00:00Z")).with_state(previous),
    );
    assert_eq!(outcome.repetitions, 0);
    assert_eq!(outcome.state.repetitions, 0);
    assert_eq!(outcome.state.lapses, 4);
    assert_eq!(outcome.state.version, FormulaVersion::Fsrs45);
  }

  #[test]
  fn test_previous_repetitions_overrides_state() {
    let scheduler = Scheduler::default();
    let mut previous = state(FormulaVersion::Fsrs5, 5.0, 5.0, at("2026-02-01T00:00:00Z"));
    previous.repetitions = 2;
    let event = ReviewEvent::new(Rating::Good, at("2026-02-06T00:00:00Z")).with_state(previous.clone());
    assert_eq!(scheduler.review(&event).repetitions, 3);
    assert_eq!(scheduler.review(&event.with_repetitions(9)).repetitions, 10);
  }

  #[test]
  fn test_lapses_never_decrease() {
    let scheduler = Scheduler::default();
    let ratings = [
      Rating::Good,
      Rating::Again,
      Rating::Easy,
      Rating::Hard,
      Rating::Again,
      Rating::Good,
    ];
    let mut now = at("2026-01-01T09:00:00Z");
    let mut current: Option<MemoryState> = None;
    let mut lapses = 0;
    for rating in ratings {
      let mut event = ReviewEvent::new(rating, now);
      event.previous_state = current.clone();
      let outcome = scheduler.review(&event);
      assert!(outcome.state.lapses >= lapses);
      lapses = outcome.state.lapses;
      now = outcome.next_review;
      current = Some(outcome.state);
    }
    assert_eq!(lapses, 2);
  }

  #[test]
  fn test_next_review_is_now_plus_interval() {
    let scheduler = Scheduler::default();
    let previous = state(FormulaVersion::Fsrs5, 4.2, 6.1, at("2026-02-01T08:30:00Z"));
    let now = at("2026-02-05T17:45:12Z");
    let preview = scheduler.preview(now, Some(&previous), None);
    for rating in Rating::ALL {
      let outcome = preview.get(rating);
      assert_eq!(outcome.next_review, now + Duration::days(outcome.interval_days as i64));
    }
  }

  #[test]
  fn test_review_is_deterministic() {
    let scheduler = Scheduler::default();
    let previous = state(FormulaVersion::Fsrs5, 8.0, 4.0, at("2026-02-01T00:00:00Z"));
    let event = ReviewEvent::new(Rating::Hard, at("2026-02-09T00:00:00Z")).with_state(previous);
    assert_eq!(scheduler.review(&event), scheduler.review(&event));
  }

  #[test]
  fn test_same_day_review_fsrs5() {
    let scheduler = Scheduler::default();
    let previous = state(FormulaVersion::Fsrs5, 3.0, 5.0, at("2026-02-01T09:00:00Z"));
    let now = at("2026-02-01T09:00:00Z");
    for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
      let outcome = scheduler.review(&ReviewEvent::new(rating, now).with_state(previous.clone()));
      assert!(outcome.state.stability >= previous.stability, "{:?}", rating);
      assert_eq!(outcome.retrievability, 1.0);
      assert!(outcome.interval_days >= 1);
    }
    let instant = scheduler.review(&ReviewEvent::new(Rating::Good, now).with_state(previous.clone()));
    assert_eq!(instant.state.stability, previous.stability);

    let later = at("2026-02-01T15:00:00Z");
    let good = scheduler.review(&ReviewEvent::new(Rating::Good, later).with_state(previous.clone()));
    assert!(good.state.stability > previous.stability);
  }

  #[test]
  fn test_repeated_same_day_reviews_stay_bounded() {
    let scheduler = Scheduler::default();
    let start = at("2026-02-01T09:00:00Z");
    let first = scheduler.review(&ReviewEvent::new(Rating::Good, start));

    let mut crammed = first.clone();
    for minute in 1..=10 {
      let now = start + Duration::minutes(minute);
      crammed = scheduler.review(&ReviewEvent::new(Rating::Good, now).with_state(crammed.state));
    }
    assert_eq!(crammed.repetitions, 11);

    let spaced = scheduler.review(
      &ReviewEvent::new(Rating::Good, start + Duration::days(3)).with_state(first.state.clone()),
    );
    assert!(crammed.state.stability < spaced.state.stability);
    assert!(crammed.interval_days <= spaced.interval_days);
    assert!(crammed.state.stability < first.state.stability * 1.1);
  }

  #[test]
  fn test_interval_non_decreasing_across_same_day_boundary() {
    let gaps = [
      Duration::zero(),
      Duration::hours(12),
      Duration::hours(23),
      Duration::hours(24),
      Duration::hours(48),
      Duration::days(7),
    ];
    let last = at("2026-02-01T00:00:00Z");
    for retention in [0.7, 0.9, 0.95] {
      let scheduler = Scheduler::new(SchedulerConfig {
        desired_retention: retention,
        ..SchedulerConfig::default()
      });
      for (stability, difficulty) in [(0.5, 8.0), (3.0, 5.0), (10.0, 5.0), (100.0, 1.0)] {
        let previous = state(FormulaVersion::Fsrs5, stability, difficulty, last);
        let mut prior_interval = 0;
        for gap in gaps {
          let outcome = scheduler.review(
            &ReviewEvent::new(Rating::Good, last + gap).with_state(previous.clone()),
          );
          assert!(
            outcome.interval_days >= prior_interval,
            "retention {} s = {} gap = {}h",
            retention,
            stability,
            gap.num_hours()
          );
          prior_interval = outcome.interval_days;
        }
      }
    }
  }

  #[test]
  fn test_out_of_order_review_clamps_elapsed_time() {
    let scheduler = Scheduler::default();
    let previous = state(FormulaVersion::Fsrs45, 6.0, 5.0, at("2026-02-10T00:00:00Z"));
    let outcome = scheduler.review(
      &ReviewEvent::new(Rating::Good, at("2026-02-01T00:00:00Z")).with_state(previous.clone()),
    );
    assert_finite(&outcome);
    assert_eq!(outcome.retrievability, 1.0);
    assert!(outcome.state.stability >= previous.stability);
  }

  #[test]
  fn test_degenerate_previous_state() {
    let scheduler = Scheduler::default();
    let now = at("2026-02-10T00:00:00Z");
    let cases = [
      (0.0, 5.0),
      (-1.0, 5.0),
      (f64::NAN, f64::NAN),
      (f64::INFINITY, 100.0),
      (1e-9, -3.0),
    ];
    for (stability, difficulty) in cases {
      let previous = state(FormulaVersion::Fsrs5, stability, difficulty, at("2026-02-01T00:00:00Z"));
      for rating in Rating::ALL {
        let outcome = scheduler.review(&ReviewEvent::new(rating, now).with_state(previous.clone()));
        assert_finite(&outcome);
        assert!(outcome.state.stability >= S_MIN && outcome.state.stability <= S_MAX);
        assert!((1.0..=10.0).contains(&outcome.state.difficulty));
      }
    }
  }

  #[test]
  fn test_interval_capped_by_config() {
    let scheduler = Scheduler::new(SchedulerConfig {
      maximum_interval_days: 30,
      ..Default::default()
    });
    let previous = state(FormulaVersion::Fsrs5, 300.0, 2.0, at("2025-01-01T00:00:00Z"));
    let outcome = scheduler.review(
      &ReviewEvent::new(Rating::Easy, at("2026-01-01T00:00:00Z")).with_state(previous),
    );
    assert_eq!(outcome.interval_days, 30);
  }

  #[test]
  fn test_higher_retention_shortens_interval() {
    let strict = Scheduler::new(SchedulerConfig {
      desired_retention: 0.97,
      ..Default::default()
    });
    let now = at("2026-02-14T10:00:00Z");
    let relaxed = review(&ReviewEvent::new(Rating::Easy, now));
    let tight = strict.review(&ReviewEvent::new(Rating::Easy, now));
    assert!(tight.interval_days < relaxed.interval_days);
  }

  // Requests

  #[test]
  fn test_review_request_invalid_rating() {
    let scheduler = Scheduler::default();
    for raw in ["0", "5", "\"perfect\""] {
      let json = format!(r#"{{"rating": {}, "now": "2026-02-14T10:00:00Z"}}"#, raw);
      let request: ReviewRequest = serde_json::from_str(&json).unwrap();
      assert!(matches!(
        scheduler.review_request(request),
        Err(SchedulerError::InvalidRating(_))
      ));
    }
  }

  #[test]
  fn test_review_request_with_state() {
    let json = r#"{
      "rating": "good",
      "now": "2026-02-08T10:00:00Z",
      "previousState": {
        "version": "fsrs-5",
        "stability": 3.173,
        "difficulty": 5.28,
        "lapses": 0,
        "lastReviewedAt": "2026-02-01T10:00:00Z"
      },
      "previousRepetitions": 1
    }"#;
    let request: ReviewRequest = serde_json::from_str(json).unwrap();
    let outcome = Scheduler::default().review_request(request).unwrap();
    assert_eq!(outcome.repetitions, 2);
    assert!(outcome.state.stability > 3.173);
  }

  // Queries

  #[test]
  fn test_retrievability_query() {
    let scheduler = Scheduler::default();
    let s = state(FormulaVersion::Fsrs5, 10.0, 5.0, at("2026-02-01T00:00:00Z"));
    assert!((scheduler.retrievability(&s, at("2026-02-11T00:00:00Z")) - 0.9).abs() < 1e-9);
    assert_eq!(scheduler.retrievability(&s, at("2026-02-01T00:00:00Z")), 1.0);
  }

  #[test]
  fn test_preview_new_item() {
    let preview = Scheduler::default().preview(at("2026-02-14T10:00:00Z"), None, None);
    assert_eq!(preview.again.repetitions, 0);
    assert_eq!(preview.good.repetitions, 1);
    assert!(preview.easy.interval_days > preview.again.interval_days);
  }

  #[test]
  fn test_imported_sm2_state_schedules() {
    let scheduler = Scheduler::default();
    let record = Sm2Record {
      ease_factor: 2.5,
      interval_days: 12,
      repetitions: 5,
      lapses: 0,
      last_reviewed_at: at("2026-01-01T00:00:00Z"),
    };
    let imported = scheduler.import_sm2(&record, None).unwrap();
    let outcome = scheduler.review(
      &ReviewEvent::new(Rating::Good, at("2026-01-13T00:00:00Z")).with_state(imported.clone()),
    );
    assert_eq!(outcome.repetitions, 6);
    assert!(outcome.state.stability > imported.stability);
  }

  // Replay

  #[test]
  fn test_replay_empty() {
    assert!(Scheduler::default().replay(&[]).is_none());
  }

  #[test]
  fn test_replay_matches_manual_reviews() {
    let (_, second) = good_then(Rating::Easy, "2026-02-01T10:00:00Z", "2026-02-08T10:00:00Z");
    let replayed = Scheduler::default()
      .replay(&[
        ReplayEntry { rating: Rating::Good, reviewed_at: at("2026-02-01T10:00:00Z") },
        ReplayEntry { rating: Rating::Easy, reviewed_at: at("2026-02-08T10:00:00Z") },
      ])
      .unwrap();
    assert_eq!(replayed, second);
  }

  #[test]
  fn test_replay_sorts_entries() {
    let scheduler = Scheduler::default();
    let sorted = [
      ReplayEntry { rating: Rating::Good, reviewed_at: at("2026-02-01T10:00:00Z") },
      ReplayEntry { rating: Rating::Again, reviewed_at: at("2026-02-05T10:00:00Z") },
      ReplayEntry { rating: Rating::Good, reviewed_at: at("2026-02-06T10:00:00Z") },
    ];
    let shuffled = [sorted[2].clone(), sorted[0].clone(), sorted[1].clone()];
    let a = scheduler.replay(&sorted).unwrap();
    let b = scheduler.replay(&shuffled).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.state.lapses, 1);
    assert_eq!(a.repetitions, 1);
  }
}
