//! End-to-end behavior of the Coach facade against a mock server.
//!
//! What these tests protect:
//! - A concurrent duplicate chat question produces exactly one HTTP request
//! - Snapshots reach the caller's callback cumulatively
//! - Turn timings are recorded for completed chats only

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use fitfusion_api::ApiClient;
use fitfusion_core::{Coach, Flight};

fn coach_for(server: &mockito::ServerGuard) -> Coach {
    Coach::new(ApiClient::new(server.url()).expect("client should build"))
}

#[tokio::test]
async fn concurrent_duplicate_chat_makes_one_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat/")
        .with_chunked_body(|writer| {
            writer.write_all(b"Take ")?;
            writer.flush()?;
            std::thread::sleep(Duration::from_millis(100));
            writer.write_all(b"a rest day.")?;
            Ok(())
        })
        .expect(1)
        .create_async()
        .await;

    let coach = coach_for(&server);
    let first_updates = Mutex::new(Vec::new());
    let second_updates = Mutex::new(Vec::new());

    let (first, second) = tokio::join!(
        coach.ask("overtraining?", |s| first_updates.lock().unwrap().push(s.to_string())),
        coach.ask("overtraining?", |s| second_updates.lock().unwrap().push(s.to_string())),
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    let (winner, skipped) = if second.is_skipped() {
        (first, second)
    } else {
        (second, first)
    };
    assert!(skipped.is_skipped());
    assert_eq!(winner.into_completed().as_deref(), Some("Take a rest day."));

    // The skipped caller's callback never fired.
    let first_updates = first_updates.into_inner().unwrap();
    let second_updates = second_updates.into_inner().unwrap();
    assert!(first_updates.is_empty() || second_updates.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn chat_after_settlement_is_not_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat/")
        .with_body("Hydrate.")
        .expect(2)
        .create_async()
        .await;

    let coach = coach_for(&server);
    let first = coach.ask("water?", |_| {}).await.unwrap();
    let second = coach.ask("water?", |_| {}).await.unwrap();

    assert_eq!(first.into_completed().as_deref(), Some("Hydrate."));
    assert_eq!(second.into_completed().as_deref(), Some("Hydrate."));
}

#[tokio::test]
async fn turn_timings_record_completed_chats_only() {
    let mut server = mockito::Server::new_async().await;
    let _chat = server
        .mock("POST", "/api/chat/")
        .with_body("Stretch daily.")
        .create_async()
        .await;

    let coach = coach_for(&server);
    assert!(coach.turn_timings().is_empty());

    coach.ask("flexibility?", |_| {}).await.unwrap();

    let timings = coach.turn_timings();
    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0].answer_chars, "Stretch daily.".chars().count());
    assert!(timings[0].time_to_first_snapshot.unwrap() <= timings[0].total);
}

#[tokio::test]
async fn failed_chat_records_no_timing_and_clears_the_guard() {
    let mut server = mockito::Server::new_async().await;
    let _failing = server
        .mock("POST", "/api/chat/")
        .with_status(500)
        .with_body(r#"{"detail": "model overloaded"}"#)
        .expect(1)
        .create_async()
        .await;

    let coach = coach_for(&server);
    let err = coach.ask("hello?", |_| {}).await.expect_err("must fail");
    assert_eq!(err.to_string(), "model overloaded");
    assert!(coach.turn_timings().is_empty());

    // Guard released: a follow-up attempt reaches the server again.
    let _second = server
        .mock("POST", "/api/chat/")
        .with_body("Back online.")
        .create_async()
        .await;
    let outcome = coach.ask("hello again?", |_| {}).await.unwrap();
    assert_eq!(outcome.into_completed().as_deref(), Some("Back online."));
}

#[tokio::test]
async fn recommendations_decode_and_deduplicate() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/recommendations/")
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"workoutRecommendations": [
                 {"category": "Strength Training", "frequency": "3x/week",
                  "duration": "45 min", "description": "Compound lifts"}],
                "nutritionRecommendations": [
                 {"category": "Protein Intake", "recommendation": "1.6g/kg",
                  "reasoning": "Supports hypertrophy"}],
                "lifestyleRecommendations": []}"#,
        )
        .create_async()
        .await;

    let coach = coach_for(&server);
    let outcome = coach.recommendations().await.unwrap();

    let set = outcome.into_completed().expect("completed");
    assert_eq!(set.workout_recommendations.len(), 1);
    assert_eq!(set.workout_recommendations[0].category, "Strength Training");
    assert_eq!(
        set.nutrition_recommendations[0].recommendation.as_deref(),
        Some("1.6g/kg")
    );
    assert!(set.lifestyle_recommendations.is_empty());
}
