//! End-to-end tests for the riddle gate HTTP surface.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use axum::routing::get as get_route;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sphinx::config::{AnswerConfig, AppConfig, RiddleConfig};
use sphinx::pages::Pages;
use sphinx::routes::{create_router, with_middleware};
use sphinx::state::AppState;
use sphinx_common::{ClientId, TokenId};

const ENTRY: &str = "https://example.org/start";
const PRIZE: &str = "https://example.org/prize";

fn test_state() -> AppState {
    let config = AppConfig {
        index_url: ENTRY.to_string(),
        redirect_url: PRIZE.to_string(),
        answers: AnswerConfig {
            first: bcrypt::hash("lantern", 4).unwrap(),
            second: bcrypt::hash("echo", 4).unwrap(),
            last: bcrypt::hash("silentnight", 4).unwrap(),
        },
        riddles: RiddleConfig {
            first: Some("<p>The more you take, the more you leave behind.</p>".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    AppState::new(config).unwrap()
}

fn post_guess(uri: &str, ip: &str, guess: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Real-IP", ip)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("k={}", guess.replace(' ', "+"))))
        .unwrap()
}

fn get(uri: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Real-IP", ip)
        .body(Body::empty())
        .unwrap()
}

fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::FOUND);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Walk the first two stages and return the final token
async fn reach_final(app: &Router, ip: &str) -> TokenId {
    let response = send(app, post_guess("/submit", ip, "lantern")).await;
    assert_eq!(location(&response), "/q2.html");

    let response = send(app, post_guess("/q2", ip, "echo")).await;
    let target = location(&response);
    let segment = target
        .strip_prefix("/final/")
        .and_then(|rest| rest.strip_suffix(".html"))
        .expect("unexpected final redirect");
    TokenId::parse(segment).unwrap()
}

#[tokio::test]
async fn test_index_pages() {
    let app = create_router(test_state());

    for uri in ["/", "/index.html"] {
        let response = send(&app, get(uri, "10.0.0.1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("The more you take"));
        assert!(html.contains(r#"action="/submit""#));
    }
}

#[tokio::test]
async fn test_robots_and_health() {
    let app = create_router(test_state());

    let response = send(&app, get("/robots.txt", "10.0.0.1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("User-agent"));

    let response = send(&app, get("/health", "10.0.0.1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = create_router(test_state());
    let response = send(&app, get("/health", "10.0.0.1")).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_first_correct_goes_to_second() {
    let app = create_router(test_state());
    let response = send(&app, post_guess("/submit", "10.0.0.2", "Lantern")).await;
    assert_eq!(location(&response), "/q2.html");
}

#[tokio::test]
async fn test_multi_word_guess_triggers_cooldown() {
    let app = create_router(test_state());

    let response = send(&app, post_guess("/submit", "10.0.0.3", "carnival games")).await;
    assert_eq!(location(&response), ENTRY);

    // the right answer is refused while cooling down
    let response = send(&app, post_guess("/submit", "10.0.0.3", "lantern")).await;
    assert_eq!(location(&response), ENTRY);

    // another client is unaffected
    let response = send(&app, post_guess("/submit", "10.0.0.4", "lantern")).await;
    assert_eq!(location(&response), "/q2.html");
}

#[tokio::test]
async fn test_cooldown_blocks_token_issue() {
    let state = test_state();
    let app = create_router(state.clone());

    let response = send(&app, post_guess("/submit", "10.0.0.5", "torch")).await;
    assert_eq!(location(&response), ENTRY);

    let response = send(&app, post_guess("/q2", "10.0.0.5", "echo")).await;
    assert_eq!(location(&response), ENTRY);
    assert!(state.tokens.is_empty());
}

#[tokio::test]
async fn test_empty_and_unreadable_guesses() {
    let state = test_state();
    let app = create_router(state.clone());

    let response = send(&app, post_guess("/submit", "10.0.0.6", "  123 ")).await;
    assert_eq!(location(&response), ENTRY);

    let request = Request::builder()
        .method("POST")
        .uri("/submit")
        .header("X-Real-IP", "10.0.0.6")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"k":"lantern"}"#))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(location(&response), ENTRY);

    // neither counted as an attempt
    assert!(!state.cooldown.is_cooling_down(&ClientId::new("10.0.0.6")));
}

#[tokio::test]
async fn test_second_page_renders_fresh_ids() {
    let app = create_router(test_state());

    let first = body_text(send(&app, get("/q2.html", "10.0.0.7")).await).await;
    let second = body_text(send(&app, get("/q2.html", "10.0.0.7")).await).await;
    assert!(first.contains(r#"action="/q2""#));
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_second_correct_issues_valid_token() {
    let state = test_state();
    let app = create_router(state.clone());

    let token = reach_final(&app, "10.0.0.8").await;
    assert!(state.tokens.is_valid(&token, &ClientId::new("10.0.0.8")));

    let response = send(&app, get(&format!("/final/{token}.html"), "10.0.0.8")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(&format!(r#"action="/final/{token}""#)));

    // viewing does not consume
    assert!(state.tokens.is_valid(&token, &ClientId::new("10.0.0.8")));
}

#[tokio::test]
async fn test_full_walk_reaches_destination() {
    let state = test_state();
    let app = create_router(state.clone());

    let token = reach_final(&app, "10.0.0.9").await;
    let response = send(&app, post_guess(&format!("/final/{token}"), "10.0.0.9", "Silent Night")).await;
    assert_eq!(location(&response), PRIZE);

    // one shot only
    let response = send(&app, get(&format!("/final/{token}.html"), "10.0.0.9")).await;
    assert_eq!(location(&response), ENTRY);
}

#[tokio::test]
async fn test_final_wrong_answer_burns_token() {
    let state = test_state();
    let app = create_router(state.clone());
    let client = ClientId::new("10.0.0.10");

    let token = reach_final(&app, "10.0.0.10").await;
    let response = send(&app, post_guess(&format!("/final/{token}"), "10.0.0.10", "holy night")).await;
    assert_eq!(location(&response), ENTRY);
    assert!(!state.tokens.is_valid(&token, &client));
    assert!(state.cooldown.is_cooling_down(&client));
}

#[tokio::test]
async fn test_final_token_bound_to_client() {
    let app = create_router(test_state());

    let token = reach_final(&app, "10.0.0.11").await;
    let response = send(&app, get(&format!("/final/{token}.html"), "10.0.0.12")).await;
    assert_eq!(location(&response), ENTRY);
}

#[tokio::test]
async fn test_final_page_bad_tokens() {
    let app = create_router(test_state());

    let unknown = TokenId::generate();
    for uri in [
        format!("/final/{unknown}.html"),
        "/final/not-a-uuid.html".to_string(),
        "/final/%FF%FE.html".to_string(),
        format!("/final/{unknown}"),
    ] {
        let response = send(&app, get(&uri, "10.0.0.13")).await;
        assert_eq!(location(&response), ENTRY, "uri: {uri}");
    }

    let response = send(&app, post_guess("/final/garbage", "10.0.0.13", "silent night")).await;
    assert_eq!(location(&response), ENTRY);
}

#[tokio::test(start_paused = true)]
async fn test_final_page_after_expiry() {
    let state = test_state();
    let app = create_router(state.clone());
    let client = ClientId::new("10.0.0.14");

    let token = state.tokens.issue(&client);
    let response = send(&app, get(&format!("/final/{token}.html"), "10.0.0.14")).await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::advance(Duration::from_secs(121)).await;
    let response = send(&app, get(&format!("/final/{token}.html"), "10.0.0.14")).await;
    assert_eq!(location(&response), ENTRY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_final_submissions() {
    let state = test_state();
    let app = create_router(state.clone());

    let token = reach_final(&app, "10.0.0.15").await;
    let uri = format!("/final/{token}");

    let (a, b) = tokio::join!(
        send(&app, post_guess(&uri, "10.0.0.15", "silent night")),
        send(&app, post_guess(&uri, "10.0.0.15", "silent night")),
    );

    let mut targets = vec![location(&a), location(&b)];
    targets.sort();
    // the prize URL sorts before the entry URL
    assert_eq!(targets, vec![PRIZE.to_string(), ENTRY.to_string()]);
}

#[tokio::test]
async fn test_stats_counts_entries() {
    let state = test_state();
    let app = create_router(state.clone());

    send(&app, post_guess("/submit", "10.0.0.16", "wrong")).await;
    reach_final(&app, "10.0.0.17").await;

    let response = send(&app, get("/stats", "10.0.0.1")).await;
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["active_cooldowns"], 1);
    assert_eq!(json["active_tokens"], 1);
}

#[tokio::test]
async fn test_template_failure_is_generic_500() {
    let state = AppState {
        pages: Arc::new(Pages::with_templates(ENTRY, RiddleConfig::default(), &[]).unwrap()),
        ..test_state()
    };
    let app = create_router(state);

    let response = send(&app, get("/", "10.0.0.18")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert_eq!(body, "Internal Server Error");
    assert!(!body.contains("index.html"));
}

#[tokio::test]
async fn test_handler_panic_is_caught() {
    let router = Router::new()
        .route("/boom", get_route(|| async {
            panic!("handler blew up");
            #[allow(unreachable_code)]
            ()
        }))
        .route("/calm", get_route(|| async { "still here" }));
    let app = with_middleware(router, Duration::from_secs(10));

    let response = send(&app, get("/boom", "10.0.0.19")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // the service keeps answering after a panic
    let response = send(&app, get("/calm", "10.0.0.19")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "still here");
}

#[tokio::test(start_paused = true)]
async fn test_slow_handler_times_out() {
    let router = Router::new().route(
        "/slow",
        get_route(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "too late"
        }),
    );
    let app = with_middleware(router, Duration::from_secs(10));

    let response = send(&app, get("/slow", "10.0.0.20")).await;
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}
