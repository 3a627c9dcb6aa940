mod common;

use chrono::{Duration, NaiveDate};
use common::{at, insert_entry, insert_user, memory_pool};
use moodlog::models::{Emoji, MoodCategory, MoodCounts};
use moodlog::services::aggregation::{self, AggregationWindow};

#[tokio::test]
async fn last_n_days_scenario() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    let now = at(2026, 10, 16, 12, 0);

    insert_entry(&pool, &user, now - Duration::days(1), MoodCategory::Stressed, None).await;
    insert_entry(&pool, &user, now - Duration::days(1), MoodCategory::Normal, None).await;
    insert_entry(&pool, &user, now - Duration::days(5), MoodCategory::Depressed, None).await;

    let week = AggregationWindow::last_days(7, now).unwrap();
    let counts = aggregation::counts_by_category(&pool, &user, &week).await.unwrap();
    assert_eq!(
        counts,
        MoodCounts {
            normal: 1,
            stressed: 1,
            depressed: 1
        }
    );

    let three = AggregationWindow::last_days(3, now).unwrap();
    let counts = aggregation::counts_by_category(&pool, &user, &three).await.unwrap();
    assert_eq!(
        counts,
        MoodCounts {
            normal: 1,
            stressed: 1,
            depressed: 0
        }
    );
}

#[tokio::test]
async fn window_runs_from_the_first_day_start_to_now() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    let now = at(2026, 10, 16, 8, 0);

    // first instant of day -(N-1): in
    insert_entry(&pool, &user, at(2026, 10, 10, 0, 0), MoodCategory::Normal, None).await;
    // last minute of day -N: out
    insert_entry(&pool, &user, at(2026, 10, 9, 23, 59), MoodCategory::Stressed, None).await;
    // exactly `now`: in
    insert_entry(&pool, &user, now, MoodCategory::Depressed, None).await;
    // later today, after `now`: out
    insert_entry(&pool, &user, at(2026, 10, 16, 23, 59), MoodCategory::Stressed, None).await;
    // tomorrow: out
    insert_entry(&pool, &user, at(2026, 10, 17, 0, 0), MoodCategory::Depressed, None).await;

    let window = AggregationWindow::last_days(7, now).unwrap();
    let counts = aggregation::counts_by_category(&pool, &user, &window).await.unwrap();
    assert_eq!(
        counts,
        MoodCounts {
            normal: 1,
            stressed: 0,
            depressed: 1
        }
    );
}

#[tokio::test]
async fn counts_are_idempotent_without_writes() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    insert_entry(&pool, &user, at(2026, 10, 15, 9, 0), MoodCategory::Normal, None).await;

    let window = AggregationWindow::all_time();
    let first = aggregation::counts_by_category(&pool, &user, &window).await.unwrap();
    let second = aggregation::counts_by_category(&pool, &user, &window).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn sentinels_are_reported_apart_from_real_moods() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    let day = at(2026, 10, 15, 9, 0);
    insert_entry(&pool, &user, day, MoodCategory::Normal, None).await;
    insert_entry(&pool, &user, day, MoodCategory::Unknown, None).await;
    insert_entry(&pool, &user, day, MoodCategory::AnalysisFailed, None).await;
    insert_entry(&pool, &user, day, MoodCategory::AnalysisFailed, None).await;

    let window = AggregationWindow::all_time();
    let counts = aggregation::counts_by_category(&pool, &user, &window).await.unwrap();
    assert_eq!(counts.total(), 1);

    let unclassified = aggregation::unclassified_counts(&pool, &user, &window).await.unwrap();
    assert_eq!(unclassified.unknown, 1);
    assert_eq!(unclassified.analysis_failed, 2);

    let breakdown = aggregation::mood_breakdown(&pool, &user, &window).await.unwrap();
    assert_eq!(breakdown, (counts, unclassified));

    let timeline = aggregation::timeline(&pool, &user, &window).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].mood, MoodCategory::Normal);
}

#[tokio::test]
async fn empty_history_is_zero_not_an_error() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    let window = AggregationWindow::last_days(30, at(2026, 10, 16, 0, 0)).unwrap();

    let analysis = aggregation::analysis(&pool, &user, &window).await.unwrap();
    assert_eq!(analysis.mood_distribution, MoodCounts::default());
    assert!(analysis.mood_timeline.is_empty());
    assert!(aggregation::by_emoji(&pool, &user, &window).await.unwrap().is_empty());
    assert!(aggregation::calendar(&pool, &user, 2026, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn other_users_entries_are_invisible() {
    let pool = memory_pool().await;
    let alice = insert_user(&pool, "alice").await;
    let bob = insert_user(&pool, "bob").await;
    insert_entry(&pool, &bob, at(2026, 10, 15, 9, 0), MoodCategory::Stressed, Some(Emoji::Angry)).await;

    let window = AggregationWindow::all_time();
    let counts = aggregation::counts_by_category(&pool, &alice, &window).await.unwrap();
    assert_eq!(counts.total(), 0);
    assert!(aggregation::by_emoji(&pool, &alice, &window).await.unwrap().is_empty());
}

#[tokio::test]
async fn timeline_is_ascending_and_keeps_insertion_order_on_ties() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    let tie = at(2026, 10, 14, 20, 0);

    insert_entry(&pool, &user, at(2026, 10, 15, 9, 0), MoodCategory::Depressed, None).await;
    insert_entry(&pool, &user, tie, MoodCategory::Stressed, None).await;
    insert_entry(&pool, &user, tie, MoodCategory::Normal, None).await;
    insert_entry(&pool, &user, at(2026, 10, 13, 7, 0), MoodCategory::Normal, None).await;

    let timeline = aggregation::timeline(&pool, &user, &AggregationWindow::all_time())
        .await
        .unwrap();
    let moods: Vec<_> = timeline.iter().map(|p| p.mood).collect();
    assert_eq!(
        moods,
        vec![
            MoodCategory::Normal,
            MoodCategory::Stressed,
            MoodCategory::Normal,
            MoodCategory::Depressed,
        ]
    );
    assert!(timeline.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn emoji_counts_skip_missing_and_blank_emoji() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    let day = at(2026, 10, 15, 9, 0);
    insert_entry(&pool, &user, day, MoodCategory::Normal, Some(Emoji::Smile)).await;
    insert_entry(&pool, &user, day, MoodCategory::Normal, Some(Emoji::Smile)).await;
    insert_entry(&pool, &user, day, MoodCategory::Stressed, Some(Emoji::Angry)).await;
    insert_entry(&pool, &user, day, MoodCategory::Normal, None).await;

    // rows written by older clients may carry whitespace instead of NULL
    let blank = insert_entry(&pool, &user, day, MoodCategory::Normal, None).await;
    sqlx::query("UPDATE entries SET emoji = '  ' WHERE id = ?")
        .bind(&blank.id)
        .execute(&pool)
        .await
        .unwrap();

    let counts = aggregation::by_emoji(&pool, &user, &AggregationWindow::all_time())
        .await
        .unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["🙂"], 2);
    assert_eq!(counts["😡"], 1);
}

#[tokio::test]
async fn calendar_shows_latest_entry_of_each_day() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    insert_entry(&pool, &user, at(2026, 10, 3, 8, 0), MoodCategory::Normal, Some(Emoji::Smile)).await;
    insert_entry(&pool, &user, at(2026, 10, 3, 22, 0), MoodCategory::Depressed, Some(Emoji::Sob)).await;
    insert_entry(&pool, &user, at(2026, 10, 9, 12, 0), MoodCategory::Stressed, None).await;
    // neighbouring months stay out
    insert_entry(&pool, &user, at(2026, 9, 30, 23, 59), MoodCategory::Normal, None).await;
    insert_entry(&pool, &user, at(2026, 11, 1, 0, 0), MoodCategory::Normal, None).await;

    let days = aggregation::calendar(&pool, &user, 2026, 10).await.unwrap();
    assert_eq!(days.len(), 2);

    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 3).unwrap());
    assert_eq!(days[0].emoji, Some(Emoji::Sob));
    assert_eq!(days[0].mood, MoodCategory::Depressed);
    assert_eq!(days[0].entry_count, 2);

    assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 10, 9).unwrap());
    assert_eq!(days[1].emoji, None);
    assert_eq!(days[1].entry_count, 1);
}

#[tokio::test]
async fn calendar_rejects_invalid_month() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    assert!(aggregation::calendar(&pool, &user, 2026, 13).await.is_err());
}

#[tokio::test]
async fn analysis_bundles_distribution_timeline_and_sentinels() {
    let pool = memory_pool().await;
    let user = insert_user(&pool, "alice").await;
    insert_entry(&pool, &user, at(2026, 10, 1, 9, 0), MoodCategory::Stressed, None).await;
    insert_entry(&pool, &user, at(2026, 10, 2, 9, 0), MoodCategory::Stressed, None).await;
    insert_entry(&pool, &user, at(2026, 10, 2, 10, 0), MoodCategory::AnalysisFailed, None).await;

    let window = AggregationWindow::month(2026, 10).unwrap();
    let analysis = aggregation::analysis(&pool, &user, &window).await.unwrap();
    assert_eq!(analysis.mood_distribution.stressed, 2);
    assert_eq!(analysis.mood_timeline.len(), 2);
    assert_eq!(analysis.unclassified.analysis_failed, 1);
}
