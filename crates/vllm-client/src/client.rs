use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::Error;
use crate::stream::CompletionStream;
use crate::types::{CompletionOutcome, CompletionRequest, CompletionResponse, Model, ModelList};

/// Handle bound to one OpenAI-compatible endpoint and credential.
///
/// No connection is opened at construction; reqwest connects lazily on the
/// first call. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_base: String,
}

impl Client {
    /// `api_base` is the versioned root, e.g. `http://host/v1`. Backends
    /// that skip auth (vLLM behind a private LB) accept the `"EMPTY"`
    /// placeholder key; it is sent verbatim as a bearer token.
    pub fn new(api_base: impl Into<String>, api_key: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let auth_value =
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| Error::Api {
                status: 0,
                body: e.to_string(),
            })?;
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Lists the models the endpoint serves. Informational only; the
    /// completion call does not depend on it.
    pub async fn list_models(&self) -> Result<Vec<Model>, Error> {
        let resp = self
            .http
            .get(format!("{}/models", self.api_base))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        Ok(resp.json::<ModelList>().await?.data)
    }

    /// Submits one completion request. The request is taken by value: the
    /// `stream` flag is fixed at this point and alone decides which
    /// [`CompletionOutcome`] variant comes back.
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutcome, Error> {
        tracing::debug!(
            model = %request.model,
            stream = %request.stream,
            n = ?request.n,
            logprobs = ?request.logprobs,
            "completion_request"
        );

        let resp = self
            .http
            .post(format!("{}/completions", self.api_base))
            .json(&request)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        if request.stream {
            Ok(CompletionOutcome::Stream(CompletionStream::new(resp)))
        } else {
            Ok(CompletionOutcome::Full(resp.json::<CompletionResponse>().await?))
        }
    }
}
