//! Delegation: send a prompt to another model, chosen explicitly or by the
//! router, and feed the outcome back into the router's learning loop.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use switchyard_core::{Capability, ChatMessage, Result, SwitchyardError};

use crate::gateway::{ChatGateway, ChatOptions, ChatResponse};
use crate::router::{RouteResult, Router};

const CODING_SYSTEM_PROMPT: &str = "You are an expert coding agent. Your job is to write clean, production-quality code.

Rules:
1. Output ONLY code and brief explanations, no pleasantries
2. Follow the language's conventions and idioms
3. Include proper error handling and types where applicable
4. If the task is ambiguous, make reasonable assumptions and state them
5. Write code that is immediately runnable, with no placeholders
6. Use modern language features";

const CODING_TEMPERATURE: f32 = 0.3;

/// A general-purpose delegated call.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Catalog id, alias or `provider/model`. `None` routes automatically.
    pub model: Option<String>,
    /// Hard requirement used when routing automatically.
    pub capability: Option<Capability>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CallRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            model: None,
            capability: None,
            max_tokens: 4096,
            temperature: 0.7,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// A coding task handed to a code-capable model.
#[derive(Debug, Clone)]
pub struct CodeRequest {
    pub task: String,
    pub language: String,
    pub context: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
}

impl CodeRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            language: "python".to_string(),
            context: None,
            model: None,
            max_tokens: 8192,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The user message sent to the model.
    pub fn prompt(&self) -> String {
        let mut parts = vec![
            format!("Language: {}", self.language),
            format!("Task: {}", self.task),
        ];
        if let Some(context) = self.context.as_deref().filter(|c| !c.is_empty()) {
            parts.push(format!("Context: {context}"));
        }
        parts.join("\n\n")
    }
}

/// Result of a delegated call.
#[derive(Debug, Clone)]
pub struct Delegation {
    pub response: ChatResponse,
    /// The id outcomes were recorded under.
    pub model_id: String,
    /// Present when the model was picked by the router.
    pub route: Option<RouteResult>,
}

impl Delegation {
    /// One-line summary: `[provider/model | 420ms | 150 tokens]`.
    pub fn header(&self) -> String {
        format!(
            "[{}/{} | {}ms | {} tokens]",
            self.response.provider,
            self.response.model,
            self.response.latency_ms,
            self.response.usage.total_tokens()
        )
    }
}

/// A model resolved to a gateway target.
struct Target {
    provider: String,
    model: String,
    /// Key for outcome records.
    record_id: String,
}

pub struct Delegator {
    gateway: Arc<dyn ChatGateway>,
    router: Arc<Router>,
}

impl Delegator {
    pub fn new(gateway: Arc<dyn ChatGateway>, router: Arc<Router>) -> Self {
        Self { gateway, router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Resolve a user-supplied model name against the catalog, falling back
    /// to a literal `provider/model` split.
    fn resolve(&self, model: &str) -> Result<Target> {
        let target = if let Some(spec) = self.router.catalog().get(model) {
            Target {
                provider: spec.provider.clone(),
                model: spec.provider_model_name().to_string(),
                record_id: spec.id.clone(),
            }
        } else if let Some((provider, name)) = model.split_once('/') {
            Target {
                provider: provider.to_string(),
                model: name.to_string(),
                record_id: model.to_string(),
            }
        } else {
            return Err(SwitchyardError::ModelNotFound(format!(
                "{model} (use a catalog id, an alias or provider/model)"
            )));
        };

        if !self.gateway.has_provider(&target.provider) {
            return Err(SwitchyardError::ProviderUnavailable {
                provider: target.provider,
                available: self.gateway.providers().join(", "),
            });
        }
        Ok(target)
    }

    /// Send a prompt to an explicit model, or to the routed model and its fallbacks.
    pub async fn call(&self, request: CallRequest) -> Result<Delegation> {
        let messages = [ChatMessage::user(request.prompt.as_str())];
        let options = ChatOptions {
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system_prompt: request.system_prompt.clone().filter(|s| !s.is_empty()),
        };

        if let Some(model) = request.model.as_deref().filter(|m| !m.is_empty()) {
            let target = self.resolve(model)?;
            debug!(provider = %target.provider, model = %target.model, "explicit delegation");
            return match self
                .gateway
                .chat(&target.provider, &target.model, &messages, &options)
                .await
            {
                Ok(response) => Ok(Delegation {
                    response,
                    model_id: target.record_id,
                    route: None,
                }),
                Err(e) => {
                    self.record_failure(&target.record_id, &request.prompt, &e);
                    Err(e)
                }
            };
        }

        let route = self.router.route(&request.prompt, request.capability)?;
        let chain: Vec<(String, String)> = std::iter::once(&route.model)
            .chain(route.fallbacks.iter())
            .map(|m| (m.provider.clone(), m.provider_model_name().to_string()))
            .collect();
        debug!(primary = route.model_id(), chain = chain.len(), "routed delegation");

        match self
            .gateway
            .chat_with_fallbacks(&chain, &messages, &options)
            .await
        {
            Ok(response) => {
                self.router.record_outcome(
                    route.model_id(),
                    &request.prompt,
                    true,
                    response.latency_ms,
                    None,
                );
                Ok(Delegation {
                    response,
                    model_id: route.model_id().to_string(),
                    route: Some(route),
                })
            }
            Err(e) => {
                self.record_failure(route.model_id(), &request.prompt, &e);
                Err(e)
            }
        }
    }

    /// Delegate a coding task to a code-capable model.
    pub async fn code(&self, request: CodeRequest) -> Result<Delegation> {
        let (target, route) = match request.model.as_deref().filter(|m| !m.is_empty()) {
            Some(model) => (self.resolve(model)?, None),
            None => {
                let route = self.router.route(&request.task, Some(Capability::Code))?;
                let target = Target {
                    provider: route.provider().to_string(),
                    model: route.model.provider_model_name().to_string(),
                    record_id: route.model_id().to_string(),
                };
                if !self.gateway.has_provider(&target.provider) {
                    return Err(SwitchyardError::ProviderUnavailable {
                        provider: target.provider,
                        available: self.gateway.providers().join(", "),
                    });
                }
                (target, Some(route))
            }
        };

        let messages = [ChatMessage::user(request.prompt())];
        let options = ChatOptions {
            max_tokens: request.max_tokens,
            temperature: CODING_TEMPERATURE,
            system_prompt: Some(CODING_SYSTEM_PROMPT.to_string()),
        };

        let started = Instant::now();
        match self
            .gateway
            .chat(&target.provider, &target.model, &messages, &options)
            .await
        {
            Ok(response) => {
                let latency_ms = if response.latency_ms > 0 {
                    response.latency_ms
                } else {
                    started.elapsed().as_millis() as u64
                };
                self.router
                    .record_outcome(&target.record_id, &request.task, true, latency_ms, None);
                Ok(Delegation {
                    response,
                    model_id: target.record_id,
                    route,
                })
            }
            Err(e) => {
                self.record_failure(&target.record_id, &request.task, &e);
                Err(e)
            }
        }
    }

    fn record_failure(&self, model_id: &str, task: &str, error: &SwitchyardError) {
        warn!(model = model_id, error = %error, "delegated call failed");
        self.router
            .record_outcome(model_id, task, false, 0, Some(&error.to_string()));
    }
}
