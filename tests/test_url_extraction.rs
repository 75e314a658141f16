use sous_extract::config::{ExtractorConfig, ScraperConfig};
use sous_extract::{
    CapturingLogger, ExtractError, ExtractionRequest, Orchestrator, RequestMetadata, Stage,
};
use std::sync::Arc;

fn orchestrator_for(server: &mockito::Server) -> (Orchestrator, Arc<CapturingLogger>) {
    let config = ExtractorConfig {
        scraper: ScraperConfig {
            base_url: Some(server.url()),
            api_key: Some("test-key".to_string()),
        },
        ..ExtractorConfig::default()
    };
    let logger = Arc::new(CapturingLogger::new());
    (Orchestrator::with_logger(config, logger.clone()), logger)
}

fn url_request(url: &str) -> ExtractionRequest {
    ExtractionRequest::Url {
        url: url.to_string(),
    }
}

const COOKIES_BODY: &str = r#"{
    "title": "Classic Chocolate Chip Cookies",
    "image": null,
    "totalTime": 45,
    "yields": "24 cookies",
    "sourceUrl": "https://example.com/cookies",
    "ingredients": [
        "2 1/4 cups all-purpose flour",
        "1 tsp baking soda",
        "1 tsp salt",
        "1 cup butter, softened",
        "3/4 cup granulated sugar",
        "3/4 cup brown sugar",
        "1 tsp vanilla extract",
        "2 large eggs",
        "2 cups chocolate chips"
    ],
    "instructions": [
        "Preheat oven to 375F (190C)",
        "In a bowl, whisk together flour, baking soda, and salt",
        "In a large bowl, beat butter and sugars until creamy",
        "Beat in eggs one at a time, then stir in vanilla",
        "Gradually blend in dry ingredients",
        "Stir in chocolate chips",
        "Drop rounded tablespoons onto ungreased baking sheets",
        "Bake for 9 to 11 minutes or until golden brown"
    ]
}"#;

#[tokio::test]
async fn test_cookies_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/extract")
        .match_query(mockito::Matcher::UrlEncoded(
            "url".into(),
            "https://example.com/cookies".into(),
        ))
        .match_header("x-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(COOKIES_BODY)
        .create_async()
        .await;

    let (orchestrator, logger) = orchestrator_for(&server);
    let recipe = orchestrator
        .extract(
            url_request("https://example.com/cookies"),
            RequestMetadata::default(),
        )
        .await
        .unwrap();

    assert_eq!(recipe.title, "Classic Chocolate Chip Cookies");
    assert_eq!(recipe.ingredients.len(), 9);
    assert_eq!(recipe.instructions.len(), 8);
    assert_eq!(recipe.total_time_minutes, 45);
    assert_eq!(recipe.yields, "24 cookies");
    assert_eq!(recipe.source_url, "https://example.com/cookies");

    // Exactly one init, one fetch_start, one terminal entry.
    assert_eq!(
        logger.stages(),
        vec![Stage::Init, Stage::FetchStart, Stage::FetchSuccess]
    );
    let entries = logger.entries();
    let last = entries.last().unwrap();
    assert!(last.success);
    assert_eq!(
        last.recipe_data.as_ref().unwrap().title,
        "Classic Chocolate Chip Cookies"
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_legacy_prep_cook_reply_is_migrated() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/extract")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "title": "Classic Chocolate Chip Cookies",
                "totalTime": 45,
                "yields": "24 cookies",
                "sourceUrl": "https://example.com/cookies",
                "prep": {
                    "ingredients": [
                        {"item": "all-purpose flour", "quantity": "2 1/4 cups"},
                        {"item": "chocolate chips", "quantity": "2 cups"}
                    ]
                },
                "cook": {
                    "steps": ["Preheat oven to 375F", "Bake until golden brown"]
                }
            }"#,
        )
        .create_async()
        .await;

    let (orchestrator, _logger) = orchestrator_for(&server);
    let recipe = orchestrator
        .extract(
            url_request("https://example.com/cookies"),
            RequestMetadata::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        recipe.ingredients,
        vec!["2 1/4 cups all-purpose flour", "2 cups chocolate chips"]
    );
    assert_eq!(recipe.instructions.len(), 2);
}

#[tokio::test]
async fn test_service_error_becomes_fetch_failure() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/extract")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "could not scrape page"}"#)
        .create_async()
        .await;

    let (orchestrator, logger) = orchestrator_for(&server);
    let err = orchestrator
        .extract(
            url_request("https://example.com/broken"),
            RequestMetadata::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Backend(_)));
    assert!(err.to_string().contains("could not scrape page"));

    assert_eq!(
        logger.stages(),
        vec![Stage::Init, Stage::FetchStart, Stage::FetchFailure]
    );
    let entries = logger.entries();
    let last = entries.last().unwrap();
    assert!(last
        .error_message
        .as_ref()
        .unwrap()
        .contains("could not scrape page"));
}

#[tokio::test]
async fn test_unsalvageable_reply_is_fetch_failure() {
    // A 2xx reply missing the title cannot be normalized; to the caller it
    // looks the same as a backend failure.
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/extract")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ingredients": ["1 egg"], "instructions": ["Fry it"]}"#)
        .create_async()
        .await;

    let (orchestrator, logger) = orchestrator_for(&server);
    let err = orchestrator
        .extract(
            url_request("https://example.com/untitled"),
            RequestMetadata::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::SchemaViolation(_)));
    assert_eq!(logger.stages().last(), Some(&Stage::FetchFailure));
}

#[tokio::test]
async fn test_malformed_url_never_reaches_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/extract")
        .expect(0)
        .create_async()
        .await;

    let (orchestrator, logger) = orchestrator_for(&server);
    let err = orchestrator
        .extract(url_request("chocolate chips"), RequestMetadata::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::InvalidInput(_)));
    assert_eq!(logger.stages(), vec![Stage::Init]);
    mock.assert_async().await;
}
