use crate::common::{spawn_app, spawn_failing_app};
use serde_json::json;
use std::collections::HashSet;

mod common;

fn q_ids(quiz: &serde_json::Value) -> Vec<String> {
    quiz["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["qId"].as_str().unwrap().to_string())
        .collect()
}

fn numbered_questions(n: usize) -> Vec<serde_json::Value> {
    (1..=n)
        .map(|i| json!({ "prompt": format!("Question {}", i), "choices": ["a", "b"], "correct": [0] }))
        .collect()
}

#[tokio::test]
async fn put_then_get_returns_the_quiz() {
    let app = spawn_app().await;

    let response = app
        .put_quiz(&json!({
            "quizId": "algebra-1",
            "title": "Algebra I",
            "questions": [
                { "prompt": "2+2?", "choices": ["3", "4"], "correct": [1], "explanation": "basic" }
            ]
        }))
        .await;
    assert_eq!(204, response.status().as_u16());
    assert_eq!(Some(0), response.content_length());

    let response = app.get_quizzes(&[("quizId", "algebra-1")]).await;
    assert_eq!(200, response.status().as_u16());
    let quiz: serde_json::Value = response.json().await.expect("Failed to read JSON");

    assert_eq!(
        quiz,
        json!({
            "quizId": "algebra-1",
            "title": "Algebra I",
            "questions": [
                { "qId": "001", "prompt": "2+2?", "choices": ["3", "4"], "correct": [1], "explanation": "basic" }
            ]
        })
    );
}

#[tokio::test]
async fn omitted_fields_read_back_as_defaults() {
    let app = spawn_app().await;

    app.put_quiz(&json!({ "quizId": "defaults", "questions": [{}] })).await;

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "defaults"), ("admin", "1")])
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(quiz["title"], "defaults");
    assert_eq!(
        quiz["questions"][0],
        json!({ "qId": "001", "prompt": "", "choices": [], "correct": [], "explanation": "" })
    );
}

#[tokio::test]
async fn listing_contains_each_quiz_once() {
    let app = spawn_app().await;

    for (id, title) in [("geo", "Geography"), ("alg", "Algebra"), ("bio", "Biology")] {
        app.put_quiz(&json!({ "quizId": id, "title": title, "questions": [] })).await;
    }
    // Re-synchronizing must not add a second listing entry.
    app.put_quiz(&json!({ "quizId": "geo", "title": "World Geography", "questions": [] }))
        .await;

    let response = app.get_quizzes(&[]).await;
    assert_eq!(200, response.status().as_u16());
    let listing: Vec<serde_json::Value> = response.json().await.unwrap();

    assert_eq!(listing.len(), 3);
    let entries: HashSet<(String, String)> = listing
        .iter()
        .map(|e| {
            (
                e["quizId"].as_str().unwrap().to_string(),
                e["title"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let expected: HashSet<(String, String)> = [
        ("geo", "World Geography"),
        ("alg", "Algebra"),
        ("bio", "Biology"),
    ]
    .iter()
    .map(|(id, title)| (id.to_string(), title.to_string()))
    .collect();
    assert_eq!(entries, expected);
}

#[tokio::test]
async fn missing_quiz_reads_as_empty() {
    let app = spawn_app().await;

    let response = app.get_quizzes(&[("quizId", "nope")]).await;
    assert_eq!(200, response.status().as_u16());
    let quiz: serde_json::Value = response.json().await.unwrap();
    assert_eq!(quiz, json!({ "quizId": "nope", "title": "nope", "questions": [] }));
}

#[tokio::test]
async fn count_samples_distinct_questions() {
    let app = spawn_app().await;
    app.put_quiz(&json!({ "quizId": "ten", "questions": numbered_questions(10) }))
        .await;

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "ten"), ("count", "3")])
        .await
        .json()
        .await
        .unwrap();
    let ids = q_ids(&quiz);
    let distinct: HashSet<&String> = ids.iter().collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(distinct.len(), 3);

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "ten"), ("count", "20")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(q_ids(&quiz).len(), 10);
}

#[tokio::test]
async fn admin_ignores_count() {
    let app = spawn_app().await;
    app.put_quiz(&json!({ "quizId": "ten", "questions": numbered_questions(10) }))
        .await;

    for admin in ["1", "true"] {
        let quiz: serde_json::Value = app
            .get_quizzes(&[("quizId", "ten"), ("count", "3"), ("admin", admin)])
            .await
            .json()
            .await
            .unwrap();
        let expected: Vec<String> = (1..=10).map(|i| format!("{:03}", i)).collect();
        assert_eq!(q_ids(&quiz), expected);
    }
}

#[tokio::test]
async fn non_numeric_count_returns_everything() {
    let app = spawn_app().await;
    app.put_quiz(&json!({ "quizId": "ten", "questions": numbered_questions(10) }))
        .await;

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "ten"), ("count", "lots")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(q_ids(&quiz).len(), 10);

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "ten"), ("count", "0")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(q_ids(&quiz).len(), 1);
}

#[tokio::test]
async fn sync_deletes_questions_missing_from_snapshot() {
    let app = spawn_app().await;
    app.put_quiz(&json!({
        "quizId": "d",
        "questions": [
            { "qId": "001", "prompt": "one" },
            { "qId": "002", "prompt": "two" },
            { "qId": "003", "prompt": "three" }
        ]
    }))
    .await;

    let response = app
        .put_quiz(&json!({
            "quizId": "d",
            "questions": [
                { "qId": "002", "prompt": "two, revised" },
                { "qId": "004", "prompt": "four" }
            ]
        }))
        .await;
    assert_eq!(204, response.status().as_u16());

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "d"), ("admin", "true")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(q_ids(&quiz), vec!["002", "004"]);
    assert_eq!(quiz["questions"][0]["prompt"], "two, revised");
}

#[tokio::test]
async fn resubmitting_same_snapshot_changes_nothing() {
    let app = spawn_app().await;
    let body = json!({ "quizId": "same", "title": "Same", "questions": numbered_questions(4) });

    app.put_quiz(&body).await;
    let first: serde_json::Value = app
        .get_quizzes(&[("quizId", "same"), ("admin", "1")])
        .await
        .json()
        .await
        .unwrap();
    let batches_before = app.store.batch_sizes().await;

    app.put_quiz(&body).await;
    let second: serde_json::Value = app
        .get_quizzes(&[("quizId", "same"), ("admin", "1")])
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(first, second);
    // Only the upsert batch was issued again; no delete batch followed it.
    let batches_after = app.store.batch_sizes().await;
    assert_eq!(batches_after.len(), batches_before.len() + 1);
    assert_eq!(batches_after.last(), Some(&4));
}

#[tokio::test]
async fn empty_snapshot_removes_all_questions() {
    let app = spawn_app().await;
    app.put_quiz(&json!({ "quizId": "wipe", "questions": numbered_questions(5) }))
        .await;

    let response = app.put_quiz(&json!({ "quizId": "wipe", "questions": [] })).await;
    assert_eq!(204, response.status().as_u16());

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "wipe"), ("admin", "1")])
        .await
        .json()
        .await
        .unwrap();
    assert!(quiz["questions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn large_snapshots_are_written_in_batches_of_25() {
    let app = spawn_app().await;

    let response = app
        .put_quiz(&json!({ "quizId": "big", "questions": numbered_questions(60) }))
        .await;
    assert_eq!(204, response.status().as_u16());

    let sizes = app.store.batch_sizes().await;
    assert!(sizes.iter().all(|&n| n <= 25));
    assert_eq!(sizes.iter().sum::<usize>(), 60);

    let quiz: serde_json::Value = app
        .get_quizzes(&[("quizId", "big"), ("admin", "1")])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(q_ids(&quiz).len(), 60);
}

#[tokio::test]
async fn store_failures_return_generic_500() {
    let address = spawn_failing_app().await;
    let client = reqwest::Client::new();

    let responses = vec![
        client.get(&format!("{}/quizzes", address)).send().await.unwrap(),
        client
            .get(&format!("{}/quizzes?quizId=x", address))
            .send()
            .await
            .unwrap(),
        client
            .put(&format!("{}/quizzes", address))
            .json(&json!({ "quizId": "x", "questions": [] }))
            .send()
            .await
            .unwrap(),
    ];

    for response in responses {
        assert_eq!(500, response.status().as_u16());
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json, json!({ "message": "Internal Server Error" }));
    }
}
