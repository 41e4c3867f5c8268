use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceExt;

use dentabot::config::AppConfig;
use dentabot::handlers;
use dentabot::models::{
    Activity, EntitySpan, KnowledgeAnswer, UnderstandingResult, HELP_TEXT, TIME_PROMPT,
    WELCOME_TEXT,
};
use dentabot::services::conversation::Dispatcher;
use dentabot::services::knowledge::KnowledgeProvider;
use dentabot::services::messaging::MessagingProvider;
use dentabot::services::scheduler::SchedulingBackend;
use dentabot::services::understanding::UnderstandingProvider;
use dentabot::state::AppState;

// ── Mock Providers ──

struct MockUnderstanding;

#[async_trait]
impl UnderstandingProvider for MockUnderstanding {
    async fn recognize(&self, utterance: &str) -> anyhow::Result<Option<UnderstandingResult>> {
        // Simple deterministic predictions based on the utterance
        let (top, score, times): (&str, f64, Vec<&str>) = if utterance.contains("free") {
            ("GetAvailability", 0.92, vec![])
        } else if utterance.contains("maybe open") {
            ("GetAvailability", 0.4, vec![])
        } else if utterance.contains("book") && utterance.contains("3pm") {
            ("ScheduleAppointment", 0.88, vec!["3pm tomorrow", "4pm"])
        } else if utterance.contains("book") {
            ("ScheduleAppointment", 0.88, vec![])
        } else if utterance.contains("garbled") {
            return Ok(None);
        } else if utterance.contains("offline") {
            anyhow::bail!("LUIS unreachable");
        } else {
            ("None", 0.7, vec![])
        };

        let mut entities = HashMap::new();
        if !times.is_empty() {
            entities.insert(
                "appointment_time".to_string(),
                times
                    .into_iter()
                    .map(|t| EntitySpan {
                        text: t.to_string(),
                    })
                    .collect(),
            );
        }

        Ok(Some(UnderstandingResult {
            top_intent: Some(top.to_string()),
            intent_scores: HashMap::from([(top.to_string(), score)]),
            entities,
        }))
    }
}

struct MockKnowledge;

#[async_trait]
impl KnowledgeProvider for MockKnowledge {
    async fn query(&self, utterance: &str) -> anyhow::Result<Vec<KnowledgeAnswer>> {
        if utterance.contains("hours") || utterance.contains("garbled") || utterance.contains("offline") {
            Ok(vec![
                KnowledgeAnswer::new("Our hours are 9-5"),
                KnowledgeAnswer::new("We are closed on Sundays"),
            ])
        } else {
            Ok(vec![])
        }
    }
}

struct MockScheduler {
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl SchedulingBackend for MockScheduler {
    async fn get_availability(&self) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push("availability".to_string());
        if self.fail {
            anyhow::bail!("scheduler returned 500");
        }
        Ok("Current time slots available: 8am, 10am".to_string())
    }

    async fn schedule_appointment(&self, time: &str) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(format!("schedule:{time}"));
        if self.fail {
            anyhow::bail!("scheduler returned 500");
        }
        Ok(format!("An appointment is set for {time}."))
    }
}

struct MockMessaging {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    failures: Arc<AtomicUsize>,
}

#[async_trait]
impl MessagingProvider for MockMessaging {
    async fn send_reply(&self, incoming: &Activity, text: &str) -> anyhow::Result<()> {
        // Same precondition as the real connector
        if let Err(e) = incoming.reply_url() {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(e.into());
        }
        let conversation = incoming
            .conversation
            .as_ref()
            .map(|c| c.id.clone())
            .unwrap_or_default();
        self.sent
            .lock()
            .unwrap()
            .push((conversation, text.to_string()));
        Ok(())
    }
}

// ── Helpers ──

struct Harness {
    state: Arc<AppState>,
    sent: Arc<Mutex<Vec<(String, String)>>>,
    scheduler_calls: Arc<Mutex<Vec<String>>>,
    send_failures: Arc<AtomicUsize>,
}

fn test_config() -> AppConfig {
    AppConfig {
        port: 3978,
        microsoft_app_id: "".to_string(), // empty = no connector auth
        microsoft_app_password: "".to_string(),
        luis_app_id: "luis-app".to_string(),
        luis_api_key: "luis-key".to_string(),
        luis_api_host_name: "westus.api.cognitive.microsoft.com".to_string(),
        luis_slot: "production".to_string(),
        qna_knowledgebase_id: "kb".to_string(),
        qna_endpoint_key: "qna-key".to_string(),
        qna_endpoint_host_name: "https://dentabot.azurewebsites.net/qnamaker".to_string(),
        qna_top: 1,
        qna_score_threshold: 0.3,
        scheduler_endpoint: "http://localhost:5000".to_string(),
        http_timeout_secs: 10,
    }
}

fn harness_with(scheduler_fails: bool) -> Harness {
    let sent = Arc::new(Mutex::new(vec![]));
    let scheduler_calls = Arc::new(Mutex::new(vec![]));
    let send_failures = Arc::new(AtomicUsize::new(0));

    let dispatcher = Dispatcher::new(
        Box::new(MockUnderstanding),
        Box::new(MockKnowledge),
        Box::new(MockScheduler {
            calls: Arc::clone(&scheduler_calls),
            fail: scheduler_fails,
        }),
    );
    let state = Arc::new(AppState {
        config: test_config(),
        dispatcher,
        messaging: Box::new(MockMessaging {
            sent: Arc::clone(&sent),
            failures: Arc::clone(&send_failures),
        }),
    });

    Harness {
        state,
        sent,
        scheduler_calls,
        send_failures,
    }
}

fn harness() -> Harness {
    harness_with(false)
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/messages", post(handlers::messages::messages))
        .route("/api/dev/message", post(handlers::dev::send_message))
        .with_state(state)
}

fn message_activity(text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "id": "act-1",
        "text": text,
        "serviceUrl": "https://smba.trafficmanager.net/amer/",
        "channelId": "webchat",
        "from": {"id": "user-1", "name": "Dana"},
        "recipient": {"id": "bot-1", "name": "DentaBot"},
        "conversation": {"id": "conv-1"}
    })
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn post_activity(h: &Harness, activity: serde_json::Value) -> StatusCode {
    let app = test_app(Arc::clone(&h.state));
    let res = app
        .oneshot(json_request("/api/messages", activity))
        .await
        .unwrap();
    res.status()
}

fn sent_texts(h: &Harness) -> Vec<String> {
    h.sent
        .lock()
        .unwrap()
        .iter()
        .map(|(_, text)| text.clone())
        .collect()
}

fn scheduler_calls(h: &Harness) -> Vec<String> {
    h.scheduler_calls.lock().unwrap().clone()
}

// ── Message Dispatch Tests ──

#[tokio::test]
async fn test_availability_message() {
    let h = harness();

    let status = post_activity(&h, message_activity("when are you free?")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sent_texts(&h),
        vec!["Current time slots available: 8am, 10am"]
    );
    assert_eq!(scheduler_calls(&h), vec!["availability"]);
}

#[tokio::test]
async fn test_schedule_without_time_prompts() {
    let h = harness();

    post_activity(&h, message_activity("I want to book a cleaning")).await;

    assert_eq!(sent_texts(&h), vec![TIME_PROMPT]);
    assert!(scheduler_calls(&h).is_empty());
}

#[tokio::test]
async fn test_schedule_with_time_books_first_mention() {
    let h = harness();

    post_activity(&h, message_activity("book me at 3pm tomorrow or 4pm")).await;

    assert_eq!(
        sent_texts(&h),
        vec!["An appointment is set for 3pm tomorrow."]
    );
    assert_eq!(scheduler_calls(&h), vec!["schedule:3pm tomorrow"]);
}

#[tokio::test]
async fn test_unrelated_intent_gets_top_answer() {
    let h = harness();

    post_activity(&h, message_activity("what are your hours?")).await;

    assert_eq!(sent_texts(&h), vec!["Our hours are 9-5"]);
    assert!(scheduler_calls(&h).is_empty());
}

#[tokio::test]
async fn test_missing_understanding_uses_knowledge_base() {
    let h = harness();

    post_activity(&h, message_activity("garbled input")).await;

    assert_eq!(sent_texts(&h), vec!["Our hours are 9-5"]);
}

#[tokio::test]
async fn test_understanding_failure_uses_knowledge_base() {
    let h = harness();

    post_activity(&h, message_activity("offline question")).await;

    assert_eq!(sent_texts(&h), vec!["Our hours are 9-5"]);
    assert!(scheduler_calls(&h).is_empty());
}

#[tokio::test]
async fn test_low_confidence_without_answers_gets_help() {
    let h = harness();

    post_activity(&h, message_activity("are you maybe open")).await;

    assert_eq!(sent_texts(&h), vec![HELP_TEXT]);
    assert!(scheduler_calls(&h).is_empty());
}

#[tokio::test]
async fn test_scheduler_failure_sends_apology() {
    let h = harness_with(true);

    let status = post_activity(&h, message_activity("when are you free?")).await;

    assert_eq!(status, StatusCode::OK);
    let texts = sent_texts(&h);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Sorry, I'm having trouble"));
    assert_eq!(scheduler_calls(&h), vec!["availability"]);
}

#[tokio::test]
async fn test_same_message_twice_same_outcome() {
    let h = harness();

    post_activity(&h, message_activity("when are you free?")).await;
    post_activity(&h, message_activity("when are you free?")).await;

    let texts = sent_texts(&h);
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], texts[1]);
    assert_eq!(scheduler_calls(&h), vec!["availability", "availability"]);
}

#[tokio::test]
async fn test_message_without_service_url_not_delivered() {
    let h = harness();
    let mut activity = message_activity("what are your hours?");
    activity.as_object_mut().unwrap().remove("serviceUrl");

    let status = post_activity(&h, activity).await;

    assert_eq!(status, StatusCode::OK);
    assert!(sent_texts(&h).is_empty());
    assert_eq!(h.send_failures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_activity_rejected() {
    let h = harness();
    let app = test_app(Arc::clone(&h.state));

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/messages")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(res.status().is_client_error());
    assert!(sent_texts(&h).is_empty());
}

// ── Conversation Update Tests ──

#[tokio::test]
async fn test_members_added_welcomes_each_user() {
    let h = harness();
    let activity = serde_json::json!({
        "type": "conversationUpdate",
        "serviceUrl": "https://smba.trafficmanager.net/amer/",
        "recipient": {"id": "bot-1"},
        "conversation": {"id": "conv-1"},
        "membersAdded": [{"id": "bot-1"}, {"id": "user-1"}, {"id": "user-2"}]
    });

    let status = post_activity(&h, activity).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent_texts(&h), vec![WELCOME_TEXT, WELCOME_TEXT]);
    assert!(scheduler_calls(&h).is_empty());
}

#[tokio::test]
async fn test_bot_joining_alone_sends_nothing() {
    let h = harness();
    let activity = serde_json::json!({
        "type": "conversationUpdate",
        "serviceUrl": "https://smba.trafficmanager.net/amer/",
        "recipient": {"id": "bot-1"},
        "conversation": {"id": "conv-1"},
        "membersAdded": [{"id": "bot-1"}]
    });

    post_activity(&h, activity).await;

    assert!(sent_texts(&h).is_empty());
}

#[tokio::test]
async fn test_other_activity_ignored() {
    let h = harness();
    let activity = serde_json::json!({
        "type": "typing",
        "serviceUrl": "https://smba.trafficmanager.net/amer/",
        "conversation": {"id": "conv-1"}
    });

    let status = post_activity(&h, activity).await;

    assert_eq!(status, StatusCode::OK);
    assert!(sent_texts(&h).is_empty());
}

// ── Dev Endpoint Tests ──

#[tokio::test]
async fn test_dev_message_returns_reply() {
    let h = harness();
    let app = test_app(Arc::clone(&h.state));

    let res = app
        .oneshot(json_request(
            "/api/dev/message",
            serde_json::json!({"message": "I want to book"}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["reply"], TIME_PROMPT);
    assert_eq!(json["kind"], "time_prompt");
    assert_eq!(json["success"], true);
    assert!(sent_texts(&h).is_empty());
}

#[tokio::test]
async fn test_dev_message_scheduler_failure() {
    let h = harness_with(true);
    let app = test_app(Arc::clone(&h.state));

    let res = app
        .oneshot(json_request(
            "/api/dev/message",
            serde_json::json!({"message": "when are you free?"}),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["reply"], "");
    assert!(json.get("kind").is_none());
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("scheduler returned 500"));
    assert_eq!(scheduler_calls(&h), vec!["availability"]);
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let app = test_app(Arc::clone(&h.state));

    let res = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dev_mode"], true);
}
