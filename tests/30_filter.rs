mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestServer, TestUser};

async fn seed(server: &TestServer, user: &TestUser) -> Result<()> {
    let movies = [
        json!({ "title": "Alien", "genre": "Horror", "rating": 9, "watchStatus": "watched", "director": "Ridley Scott" }),
        json!({ "title": "Blade Runner", "genre": "Sci-Fi", "rating": 8.5, "watchStatus": "watched", "director": "Ridley Scott" }),
        json!({ "title": "Arrival", "genre": "Sci-Fi", "rating": 7, "watchStatus": "watching", "director": "Denis Villeneuve" }),
        json!({ "title": "Paddington 2", "genre": "Comedy", "watchStatus": "want_to_watch" }),
        json!({ "title": "100% Wolf", "genre": "Animation", "rating": 4 }),
    ];
    for movie in movies {
        server.add_movie(user, movie).await?;
    }
    Ok(())
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]["movies"]
        .as_array()
        .map(|movies| movies.iter().filter_map(|m| m["title"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn list_is_newest_first() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    seed(&server, &ada).await?;

    let (status, body) = server.get("/api/movies", Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), ["100% Wolf", "Paddington 2", "Arrival", "Blade Runner", "Alien"]);
    Ok(())
}

#[tokio::test]
async fn lists_are_isolated_per_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    let bob = server.register("Bob", "bob@example.com").await?;
    seed(&server, &ada).await?;
    server.add_movie(&bob, json!({ "title": "Bob's Movie", "genre": "Drama" })).await?;

    let (_, body) = server.get("/api/movies?limit=100", Some(&ada.token)).await?;
    let movies = body["data"]["movies"].as_array().cloned().unwrap_or_default();
    assert_eq!(movies.len(), 5);
    assert!(movies.iter().all(|m| m["userId"] == ada.id.as_str()));

    let (_, body) = server.get("/api/movies", Some(&bob.token)).await?;
    assert_eq!(titles(&body), ["Bob's Movie"]);
    assert_eq!(body["data"]["pagination"]["totalMovies"], 1);
    Ok(())
}

#[tokio::test]
async fn filters_by_status_genre_and_minimum_rating() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    seed(&server, &ada).await?;

    let (_, body) = server.get("/api/movies?status=watched", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["Blade Runner", "Alien"]);

    let (_, body) = server.get("/api/movies?genre=Sci-Fi", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["Arrival", "Blade Runner"]);

    let (_, body) = server.get("/api/movies?rating=8.5", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["Blade Runner", "Alien"]);

    let (_, body) = server.get("/api/movies?genre=Sci-Fi&status=watching", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["Arrival"]);
    assert_eq!(body["data"]["pagination"]["totalMovies"], 1);
    Ok(())
}

#[tokio::test]
async fn search_matches_title_or_director_case_insensitively() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    seed(&server, &ada).await?;

    let (_, body) = server.get("/api/movies?search=ridley", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["Blade Runner", "Alien"]);

    let (_, body) = server.get("/api/movies?search=ARRIV", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["Arrival"]);

    // Wildcards are matched literally
    let (_, body) = server.get("/api/movies?search=100%25", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["100% Wolf"]);

    let (_, body) = server.get("/api/movies?search=%25", Some(&ada.token)).await?;
    assert_eq!(titles(&body), ["100% Wolf"]);

    let (_, body) = server.get("/api/movies?search=_", Some(&ada.token)).await?;
    assert!(titles(&body).is_empty());
    Ok(())
}

#[tokio::test]
async fn pagination_walks_every_movie_once() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    for i in 0..23 {
        server.add_movie(&ada, json!({ "title": format!("Movie {}", i), "genre": "Drama" })).await?;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (status, body) = server.get(&format!("/api/movies?page={}&limit=10", page), Some(&ada.token)).await?;
        assert_eq!(status, StatusCode::OK);

        let pagination = &body["data"]["pagination"];
        let returned = body["data"]["movies"].as_array().map(Vec::len).unwrap_or_default();
        assert_eq!(pagination["currentPage"], page);
        assert_eq!(pagination["totalPages"], 3);
        assert_eq!(pagination["totalMovies"], 23);
        assert_eq!(pagination["hasPrev"], page > 1);
        assert_eq!(pagination["hasNext"], page < 3);
        assert_eq!(returned, if page < 3 { 10 } else { 3 });

        seen.extend(titles(&body));
    }

    assert_eq!(seen.len(), 23);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 23);

    // Past the end: empty page, still consistent
    let (_, body) = server.get("/api/movies?page=4&limit=10", Some(&ada.token)).await?;
    assert!(titles(&body).is_empty());
    assert_eq!(body["data"]["pagination"]["hasNext"], false);
    assert_eq!(body["data"]["pagination"]["hasPrev"], true);
    Ok(())
}

#[tokio::test]
async fn default_page_size_is_ten() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    for i in 0..12 {
        server.add_movie(&ada, json!({ "title": format!("Movie {}", i), "genre": "Drama" })).await?;
    }

    let (_, body) = server.get("/api/movies", Some(&ada.token)).await?;
    assert_eq!(titles(&body).len(), 10);
    assert_eq!(body["data"]["pagination"]["currentPage"], 1);
    assert_eq!(body["data"]["pagination"]["totalPages"], 2);
    assert_eq!(body["data"]["pagination"]["hasNext"], true);
    Ok(())
}

#[tokio::test]
async fn invalid_query_parameters_are_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let ada = server.register("Ada", "ada@example.com").await?;

    for query in ["status=abandoned", "genre=Western", "rating=high", "page=0", "limit=0", "page=abc"] {
        let (status, body) = server.get(&format!("/api/movies?{}", query), Some(&ada.token)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert_eq!(body["error"], true, "query {}", query);
    }
    Ok(())
}

#[tokio::test]
async fn oversized_limit_is_clamped() -> Result<()> {
    let server = TestServer::spawn_with(|config| config.api.max_page_size = 2).await?;
    let ada = server.register("Ada", "ada@example.com").await?;
    for i in 0..3 {
        server.add_movie(&ada, json!({ "title": format!("Movie {}", i), "genre": "Drama" })).await?;
    }

    let (status, body) = server.get("/api/movies?limit=200", Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body).len(), 2);
    assert_eq!(body["data"]["pagination"]["totalPages"], 2);
    assert_eq!(body["data"]["pagination"]["hasNext"], true);

    let (status, _) = server.get("/api/movies?limit=101", Some(&ada.token)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
