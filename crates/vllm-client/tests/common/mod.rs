#![allow(dead_code)]

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestHarness {
    pub mock_server: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self {
            mock_server: MockServer::start().await,
        }
    }

    pub fn client(&self) -> vllm_client::Client {
        vllm_client::Client::new(self.mock_server.uri(), "test-api-key").unwrap()
    }

    pub async fn mount_completion(&self, response: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(&response)
                    .insert_header("Content-Type", "application/json"),
            )
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mount_stream<S: AsRef<str>>(&self, events: &[S]) {
        let body = events
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("\n\n")
            + "\n\n";
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(&body)
                    .insert_header("Content-Type", "text/event-stream"),
            )
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mount_error(&self, status: u16, response: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(&response)
                    .insert_header("Content-Type", "application/json"),
            )
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mount_models(&self, models: &[&str]) {
        let data: Vec<_> = models
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "object": "model",
                    "created": 1715644800,
                    "owned_by": "vllm"
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("Authorization", "Bearer test-api-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"object": "list", "data": data})),
            )
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }
}

pub fn logprobs_fixture(tokens: &[&str]) -> serde_json::Value {
    let token_logprobs: Vec<f64> = tokens.iter().map(|_| -0.25).collect();
    let top_logprobs: Vec<_> = tokens
        .iter()
        .map(|t| serde_json::json!({*t: -0.25, "the": -1.5, "a": -2.0}))
        .collect();
    let text_offset: Vec<u32> = (0..tokens.len() as u32).collect();
    serde_json::json!({
        "tokens": tokens,
        "token_logprobs": token_logprobs,
        "top_logprobs": top_logprobs,
        "text_offset": text_offset,
    })
}

pub fn completion_response(id: &str, model: &str, texts: &[&str], with_logprobs: bool) -> serde_json::Value {
    let choices: Vec<_> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let mut choice = serde_json::json!({
                "text": text,
                "index": i,
                "logprobs": null,
                "finish_reason": "stop"
            });
            if with_logprobs {
                let tokens: Vec<&str> = text.split_inclusive(' ').collect();
                choice["logprobs"] = logprobs_fixture(&tokens);
            }
            choice
        })
        .collect();

    serde_json::json!({
        "id": id,
        "object": "text_completion",
        "created": 1715644800,
        "model": model,
        "choices": choices,
        "usage": {"prompt_tokens": 8, "completion_tokens": 12, "total_tokens": 20}
    })
}

pub fn stream_event(id: &str, model: &str, index: u32, text: &str, finish: Option<&str>) -> String {
    let body = serde_json::json!({
        "id": id,
        "object": "text_completion",
        "created": 1715644800,
        "model": model,
        "choices": [{
            "text": text,
            "index": index,
            "logprobs": null,
            "finish_reason": finish
        }]
    });
    format!("data: {body}")
}
