//! Built-in actions: `get-entity` and `create-entity`.

use crate::context::ContextData;
use crate::dispatch::params::{
    kind_or_default, optional_str, required_array, required_object, required_str, Params,
};
use crate::dispatch::Action;
use crate::error::ActionError;
use crate::remote::{Entity, EntityKind, RemoteEntityClient};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Context key consulted when a request names no entity kind
pub const CONTEXT_KIND_KEY: &str = "entity_kind";

/// Success payload: the entity under its kind, plus the kind itself
fn entity_data(kind: EntityKind, entity: Entity) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(kind.as_str().to_string(), Value::Object(entity));
    data.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
    data
}

/// Fetch one entity by id
///
/// Params: `entity_id` (required string), `kind` (optional). Without `kind`
/// the resolved context's `entity_kind` is used, then `part`.
pub struct GetEntityAction;

#[async_trait]
impl Action for GetEntityAction {
    fn name(&self) -> &'static str {
        "get-entity"
    }

    async fn execute(
        &self,
        params: &Params,
        context: &ContextData,
        client: &dyn RemoteEntityClient,
    ) -> Result<Map<String, Value>, ActionError> {
        let entity_id = required_str(params, "entity_id")?;
        let kind = kind_or_default(params, "kind", context, CONTEXT_KIND_KEY, EntityKind::Part)?;

        let entity = client
            .get(kind, entity_id)
            .await
            .map_err(|e| ActionError::remote("get", kind, e))?;

        Ok(entity_data(kind, entity))
    }
}

/// Create one entity
///
/// Params: `entity` (required object with a non-empty `customer_id` string and
/// a non-empty `items` array), `kind` (optional, default `order`). `priority`,
/// `due_date` and `status` must be strings when present; every field of
/// `entity` is forwarded as given.
pub struct CreateEntityAction;

#[async_trait]
impl Action for CreateEntityAction {
    fn name(&self) -> &'static str {
        "create-entity"
    }

    async fn execute(
        &self,
        params: &Params,
        _context: &ContextData,
        client: &dyn RemoteEntityClient,
    ) -> Result<Map<String, Value>, ActionError> {
        let kind = match optional_str(params, "kind")? {
            Some(raw) => raw
                .parse()
                .map_err(|message: String| ActionError::validation("kind", message))?,
            None => EntityKind::Order,
        };
        let entity = required_object(params, "entity")?;

        required_str(entity, "customer_id")?;
        required_array(entity, "items")?;
        for field in ["priority", "due_date", "status"] {
            optional_str(entity, field)?;
        }

        let created = client
            .create(kind, entity.clone())
            .await
            .map_err(|e| ActionError::remote("create", kind, e))?;

        Ok(entity_data(kind, created))
    }
}
