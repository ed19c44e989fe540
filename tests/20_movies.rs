mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn create_applies_defaults_and_owner() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;

    let (status, body) = server
        .post("/api/movies", Some(&ada.token), json!({ "title": "Dune", "genre": "Sci-Fi" }))
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["message"], "Movie added to watchlist successfully");
    let movie = &body["data"]["movie"];
    assert_eq!(movie["title"], "Dune");
    assert_eq!(movie["genre"], "Sci-Fi");
    assert_eq!(movie["watchStatus"], "want_to_watch");
    assert_eq!(movie["userId"], ada.id.as_str());
    assert!(movie["rating"].is_null());
    assert!(movie["createdAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn create_keeps_optional_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;

    let movie = server
        .add_movie(
            &ada,
            json!({
                "title": "Heat",
                "genre": "Thriller",
                "rating": 8.5,
                "watchStatus": "watched",
                "personalNotes": "Diner scene",
                "releaseYear": 1995,
                "director": "Michael Mann"
            }),
        )
        .await?;

    assert_eq!(movie["rating"], 8.5);
    assert_eq!(movie["watchStatus"], "watched");
    assert_eq!(movie["personalNotes"], "Diner scene");
    assert_eq!(movie["releaseYear"], 1995);
    assert_eq!(movie["director"], "Michael Mann");
    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_movies() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;

    let cases = [
        (json!({ "title": "Dune", "genre": "Western" }), "\"genre\" must be one of"),
        (json!({ "title": "Dune", "genre": "Sci-Fi", "rating": 10.5 }), "\"rating\" must be between 0 and 10"),
        (json!({ "title": "Dune", "genre": "Sci-Fi", "releaseYear": 1800 }), "\"releaseYear\" must be greater than or equal to 1888"),
        (json!({ "title": "Dune", "genre": "Sci-Fi", "watchStatus": "abandoned" }), "\"watchStatus\" must be one of"),
        (json!({ "title": "", "genre": "Sci-Fi" }), "\"title\" length must be between 1 and 255 characters"),
        (json!({ "genre": "Sci-Fi" }), "\"title\" is required"),
        (json!({ "title": "Dune", "genre": "Sci-Fi", "userId": "someone" }), "\"userId\" is not allowed"),
    ];

    for (payload, expected) in cases {
        let (status, body) = server.post("/api/movies", Some(&ada.token), payload.clone()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let message = body["message"].as_str().unwrap_or_default();
        assert!(message.starts_with(expected), "payload {} gave {:?}", payload, message);
    }

    // Clients cannot pick the owner
    let (status, _) = server
        .post("/api/movies", Some(&ada.token), json!({ "title": "Dune", "genre": "Sci-Fi", "userId": ada.id }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server.get("/api/movies", Some(&ada.token)).await?;
    assert_eq!(body["data"]["pagination"]["totalMovies"], 0);
    Ok(())
}

#[tokio::test]
async fn get_returns_owned_movie() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    let movie = server.add_movie(&ada, json!({ "title": "Alien", "genre": "Horror" })).await?;
    let id = movie["id"].as_str().unwrap_or_default();

    let (status, body) = server.get(&format!("/api/movies/{}", id), Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["movie"], movie);
    assert!(body["data"].get("message").is_none());
    Ok(())
}

#[tokio::test]
async fn foreign_movies_look_missing() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    let bob = server.register("Bob", "bob@example.com").await?;
    let movie = server.add_movie(&ada, json!({ "title": "Alien", "genre": "Horror" })).await?;
    let path = format!("/api/movies/{}", movie["id"].as_str().unwrap_or_default());
    let missing = format!("/api/movies/{}", uuid::Uuid::new_v4());

    let (foreign_status, foreign_body) = server.get(&path, Some(&bob.token)).await?;
    let (missing_status, missing_body) = server.get(&missing, Some(&bob.token)).await?;
    let (bad_id_status, bad_id_body) = server.get("/api/movies/not-a-uuid", Some(&bob.token)).await?;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(bad_id_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body, missing_body);
    assert_eq!(missing_body, bad_id_body);
    assert_eq!(foreign_body["message"], "Movie not found");

    let (status, _) = server.put(&path, Some(&bob.token), json!({ "rating": 1 })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.delete(&path, Some(&bob.token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Ada's movie is untouched
    let (status, body) = server.get(&path, Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["movie"]["rating"].is_null());
    Ok(())
}

#[tokio::test]
async fn update_changes_only_supplied_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    let movie = server
        .add_movie(&ada, json!({ "title": "Arrival", "genre": "Sci-Fi", "director": "Denis Villeneuve" }))
        .await?;
    let path = format!("/api/movies/{}", movie["id"].as_str().unwrap_or_default());

    let (status, body) = server
        .put(&path, Some(&ada.token), json!({ "watchStatus": "watched", "rating": 9 }))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Movie updated successfully");
    let updated = &body["data"]["movie"];
    assert_eq!(updated["watchStatus"], "watched");
    assert_eq!(updated["rating"], 9.0);
    assert_eq!(updated["title"], "Arrival");
    assert_eq!(updated["director"], "Denis Villeneuve");
    assert_eq!(updated["createdAt"], movie["createdAt"]);
    Ok(())
}

#[tokio::test]
async fn update_validates_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    let movie = server.add_movie(&ada, json!({ "title": "Arrival", "genre": "Sci-Fi" })).await?;
    let path = format!("/api/movies/{}", movie["id"].as_str().unwrap_or_default());

    let (status, body) = server.put(&path, Some(&ada.token), json!({ "genre": "Opera" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = server.put(&path, Some(&ada.token), json!({ "rating": -1 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = server.get(&path, Some(&ada.token)).await?;
    assert_eq!(body["data"]["movie"]["genre"], "Sci-Fi");
    Ok(())
}

#[tokio::test]
async fn delete_removes_movie() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    let movie = server.add_movie(&ada, json!({ "title": "Up", "genre": "Animation" })).await?;
    let path = format!("/api/movies/{}", movie["id"].as_str().unwrap_or_default());

    let (status, body) = server.delete(&path, Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Movie deleted successfully");

    let (status, _) = server.get(&path, Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.delete(&path, Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn stats_path_is_not_treated_as_an_id() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;

    let (status, body) = server.get("/api/movies/stats", Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalMovies"], 0);
    Ok(())
}

#[tokio::test]
async fn unsupported_methods_get_json_errors() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;

    let (status, body) = server.send(Method::PATCH, "/api/movies", Some(&ada.token), None).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    Ok(())
}
