use crate::config::JudgeSettings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Black-box accept/reject judgment over a submission. The agent treats
/// any error as a rejection decision rather than stalling the pipeline.
#[async_trait]
pub trait AiJudge: Send + Sync {
    async fn evaluate(
        &self,
        topic_name: &str,
        topic_description: &str,
        data_reference: &str,
    ) -> Result<bool>;
}

/// Structured answer the judge is forced to return.
#[derive(Debug, Deserialize, Serialize)]
struct AcceptanceVerdict {
    should_accept: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

/// HTTP judge speaking the chat-completions protocol, forcing the
/// `evaluate_submission_acceptance` tool so the answer is always the
/// strict boolean `should_accept`.
pub struct HttpJudge {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpJudge {
    pub fn new(settings: &JudgeSettings, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client for AI judge")?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key,
        })
    }

    fn request_body(&self, topic_name: &str, topic_description: &str, data_reference: &str) -> serde_json::Value {
        let system_prompt = format!(
            "Given the following topic details and submitted data reference, evaluate whether \
             the submission content (implied by the data reference) is appropriate, relevant, \
             and valuable enough to be accepted into the topic. Respond ONLY using the provided \
             function call.\n\n\
             Topic Name: {topic_name}\n\
             Topic Description: {topic_description}\n\n\
             Submitted Data Reference: {data_reference}\n\n\
             Based on the topic's goal and the data reference, should this submission be \
             accepted? Answer True for acceptance (Yes vote), False for rejection (No vote)."
        );

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": "Evaluate the submission based on the system prompt." }
            ],
            "tools": [{
                "type": "function",
                "function": {
                    "name": "evaluate_submission_acceptance",
                    "description": "Determine if the submission should be accepted based on topic relevance and quality.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "should_accept": {
                                "type": "boolean",
                                "description": "True if the submission should be accepted, False otherwise."
                            }
                        },
                        "required": ["should_accept"],
                        "additionalProperties": false
                    }
                }
            }],
            "tool_choice": {
                "type": "function",
                "function": { "name": "evaluate_submission_acceptance" }
            }
        })
    }
}

#[async_trait]
impl AiJudge for HttpJudge {
    async fn evaluate(
        &self,
        topic_name: &str,
        topic_description: &str,
        data_reference: &str,
    ) -> Result<bool> {
        debug!(topic = topic_name, data = data_reference, "Calling AI judge");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(topic_name, topic_description, data_reference))
            .send()
            .await
            .context("AI judge request failed")?
            .error_for_status()
            .context("AI judge returned an error status")?;

        let body: ChatResponse = response
            .json()
            .await
            .context("AI judge response was not valid JSON")?;

        let call = body
            .choices
            .first()
            .and_then(|choice| choice.message.tool_calls.first())
            .ok_or_else(|| anyhow!("AI judge did not return the expected function call"))?;

        let verdict: AcceptanceVerdict = serde_json::from_str(&call.function.arguments)
            .context("AI judge function arguments missing should_accept")?;

        debug!(should_accept = verdict.should_accept, "AI judge decision");
        Ok(verdict.should_accept)
    }
}
