//! Request Dispatcher
//!
//! Authorizes the calling principal, resolves its inherited context and routes
//! the request to a named action. Only an unregistered principal is returned
//! as an error; unknown actions, bad parameters and remote failures come back
//! as failed [`ActionResult`]s so the transport always has a body to send.
//!
//! Dispatch is cancelled by dropping its future. The in-flight remote call is
//! dropped with it, which aborts the outbound request.

use crate::context::{ContextData, ContextStore};
use crate::error::{ActionError, DispatchError};
use crate::principal::PrincipalRegistry;
use crate::remote::RemoteEntityClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, debug_span, info, warn, Instrument};

pub mod actions;
pub mod params;

pub use actions::{CreateEntityAction, GetEntityAction};
pub use params::Params;

/// Inbound request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(alias = "model_id")]
    pub principal_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default)]
    pub params: Params,
}

impl DispatchRequest {
    pub fn new(principal_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            action: action.into(),
            context_id: None,
            params: Params::new(),
        }
    }

    pub fn with_context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// Outcome of an action, always well-formed for the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<ActionError> for ActionResult {
    fn from(err: ActionError) -> Self {
        ActionResult::failure(err.to_string())
    }
}

/// Named handler from validated parameters and resolved context to a result
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        params: &Params,
        context: &ContextData,
        client: &dyn RemoteEntityClient,
    ) -> Result<Map<String, Value>, ActionError>;
}

/// Dispatcher tuning
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Deadline for a single action; `None` waits as long as the caller does
    pub action_timeout: Option<Duration>,
}

pub struct RequestDispatcher {
    store: Arc<ContextStore>,
    principals: Arc<PrincipalRegistry>,
    client: Arc<dyn RemoteEntityClient>,
    actions: HashMap<&'static str, Box<dyn Action>>,
    config: DispatcherConfig,
}

impl RequestDispatcher {
    /// Create a dispatcher with the built-in action table
    pub fn new(
        store: Arc<ContextStore>,
        principals: Arc<PrincipalRegistry>,
        client: Arc<dyn RemoteEntityClient>,
        config: DispatcherConfig,
    ) -> Self {
        let builtin: [Box<dyn Action>; 2] =
            [Box::new(GetEntityAction), Box::new(CreateEntityAction)];
        let actions = builtin
            .into_iter()
            .map(|action| (action.name(), action))
            .collect();

        Self {
            store,
            principals,
            client,
            actions,
            config,
        }
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    pub fn principals(&self) -> &Arc<PrincipalRegistry> {
        &self.principals
    }

    /// Allow `principal_id` to dispatch; registering twice is a no-op
    pub fn register_principal(&self, principal_id: impl Into<String>) {
        self.principals.register(principal_id);
    }

    /// Known action names, sorted
    pub fn action_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.actions.keys().copied().collect();
        names.sort();
        names
    }

    /// Authorize, resolve context and run the named action
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<ActionResult, DispatchError> {
        self.principals.verify(&request.principal_id).map_err(|e| {
            warn!(principal_id = %request.principal_id, "Rejected unregistered principal");
            e
        })?;

        let span = debug_span!(
            "dispatch",
            principal_id = %request.principal_id,
            action = %request.action
        );

        async {
            info!(context_id = ?request.context_id, "Dispatching request");

            let context = match request.context_id.as_deref() {
                Some(id) if !id.is_empty() => self.store.resolve_inherited(id),
                _ => ContextData::new(),
            };
            debug!(keys = context.len(), "Resolved inherited context");

            let result = match self.actions.get(request.action.as_str()) {
                Some(action) => self.run(action.as_ref(), &request.params, &context).await,
                None => ActionError::UnknownAction(request.action.clone()).into(),
            };

            if let Some(error) = &result.error {
                warn!(error = %error, "Action failed");
            }
            Ok(result)
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        action: &dyn Action,
        params: &Params,
        context: &ContextData,
    ) -> ActionResult {
        let execution = action.execute(params, context, self.client.as_ref());

        let outcome = match self.config.action_timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ActionError::Timeout {
                    action: action.name().to_string(),
                    after: limit,
                }),
            },
            None => execution.await,
        };

        match outcome {
            Ok(data) => ActionResult::ok(data),
            Err(err) => err.into(),
        }
    }
}
