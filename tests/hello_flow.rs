//! Integration tests for the greeting counter endpoint.

mod common;

use common::TestServer;

#[tokio::test]
async fn test_first_time_greeting() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/v1/hello"))
        .query(&[("name", "userver")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Hello, userver!\n");
}

#[tokio::test]
async fn test_repeat_greetings_vary_message() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let client = reqwest::Client::new();

    let mut bodies = Vec::new();
    for _ in 0..3 {
        let response = client
            .post(server.url("/v1/hello"))
            .query(&[("name", "World")])
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
        bodies.push(response.text().await.unwrap());
    }

    assert_eq!(bodies[0], "Hello, World!\n");
    assert_eq!(bodies[1], "Hi again, World!\n");
    assert_eq!(bodies[2], "Hi again, World!\n");
}

#[tokio::test]
async fn test_greetings_per_name_are_independent() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let client = reqwest::Client::new();

    for _ in 0..2 {
        client
            .post(server.url("/v1/hello"))
            .query(&[("name", "alice")])
            .send()
            .await
            .expect("Failed to send request");
    }

    // A different name still gets the first-time greeting
    let response = client
        .post(server.url("/v1/hello"))
        .query(&[("name", "bob")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.text().await.unwrap(), "Hello, bob!\n");
    assert_eq!(server.db.greetings().visit_count("alice").await.unwrap(), 2);
    assert_eq!(server.db.greetings().visit_count("bob").await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_greetings_count_every_call() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        let url = server.url("/v1/hello");
        tasks.push(tokio::spawn(async move {
            let response = client
                .post(url)
                .query(&[("name", "storm")])
                .send()
                .await
                .expect("Failed to send request");
            assert_eq!(response.status(), 200);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(server.db.greetings().visit_count("storm").await.unwrap(), 10);
}

#[tokio::test]
async fn test_hello_without_name_is_client_error() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/v1/hello"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}
