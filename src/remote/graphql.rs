//! GraphQL transport for the remote entity API.
//!
//! Every call is a `POST {base_url}/graphql` carrying `{query, variables}` and a
//! bearer token. Query text is generated per [`EntityKind`].

use crate::remote::{Entity, EntityKind, ListOptions, RemoteEntityClient, RemoteError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

/// GraphQL naming for one entity kind
struct KindSchema {
    field: &'static str,
    list_field: &'static str,
    type_name: &'static str,
    selection: &'static str,
}

fn schema(kind: EntityKind) -> KindSchema {
    match kind {
        EntityKind::Part => KindSchema {
            field: "part",
            list_field: "parts",
            type_name: "Part",
            selection: "id name description type status",
        },
        EntityKind::Order => KindSchema {
            field: "order",
            list_field: "orders",
            type_name: "Order",
            selection: "id customer_id items priority due_date status",
        },
        EntityKind::Supplier => KindSchema {
            field: "supplier",
            list_field: "suppliers",
            type_name: "Supplier",
            selection: "id name contact_info status",
        },
        EntityKind::InventoryItem => KindSchema {
            field: "inventoryItem",
            list_field: "inventoryItems",
            type_name: "InventoryItem",
            selection: "id part_id location quantity status last_updated",
        },
        EntityKind::Bom => KindSchema {
            field: "abom",
            list_field: "aboms",
            type_name: "ABom",
            selection: "id name description version status created_at updated_at \
                        items { id part_id quantity unit notes }",
        },
    }
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

fn map_http_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout
    } else if error.is_connect() {
        RemoteError::Transport(format!("Connection error: {}", error))
    } else {
        RemoteError::Transport(format!("HTTP error: {}", error))
    }
}

/// GraphQL variable type for a scalar filter value
fn graphql_scalar_type(name: &str, value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) if name.ends_with("_id") => Some("ID"),
        Value::String(_) => Some("String"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("Int"),
        Value::Number(_) => Some("Float"),
        Value::Bool(_) => Some("Boolean"),
        _ => None,
    }
}

const PAGINATION_VARIABLES: [&str; 2] = ["page", "perPage"];

/// Filter names become GraphQL variable and argument names, so they must be
/// plain GraphQL names and must not shadow the pagination variables.
fn check_filter_name(name: &str) -> Result<(), RemoteError> {
    if PAGINATION_VARIABLES.contains(&name) {
        return Err(RemoteError::InvalidRequest(format!(
            "filter '{}' collides with a pagination argument",
            name
        )));
    }
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    };
    if !valid {
        return Err(RemoteError::InvalidRequest(format!(
            "filter name '{}' is not a valid GraphQL name",
            name
        )));
    }
    Ok(())
}

/// Remote entity client speaking GraphQL over reqwest
pub struct GraphqlEntityClient {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl GraphqlEntityClient {
    pub fn new(
        base_url: &str,
        api_token: String,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/graphql", base_url.trim_end_matches('/')),
            api_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one GraphQL document and return its `data` object
    async fn execute(
        &self,
        query: String,
        variables: Value,
    ) -> Result<Map<String, Value>, RemoteError> {
        debug!(endpoint = %self.endpoint, "Sending GraphQL request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to parse response: {}", e)))?;

        if let Some(first) = parsed.errors.into_iter().next() {
            return Err(RemoteError::GraphQl(first.message));
        }
        parsed
            .data
            .ok_or_else(|| RemoteError::Decode("response has no data".to_string()))
    }

    fn take_entity(
        mut data: Map<String, Value>,
        field: &str,
        kind: EntityKind,
        id: &str,
    ) -> Result<Entity, RemoteError> {
        match data.remove(field) {
            Some(Value::Object(entity)) => Ok(entity),
            Some(Value::Null) | None => Err(RemoteError::NotFound {
                kind,
                id: id.to_string(),
            }),
            Some(other) => Err(RemoteError::Decode(format!(
                "expected object for '{}', got {}",
                field, other
            ))),
        }
    }
}

#[async_trait]
impl RemoteEntityClient for GraphqlEntityClient {
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Entity, RemoteError> {
        let schema = schema(kind);
        let query = format!(
            "query Get{t}($id: ID!) {{ {f}(id: $id) {{ {s} }} }}",
            t = schema.type_name,
            f = schema.field,
            s = schema.selection
        );
        let data = self.execute(query, json!({ "id": id })).await?;
        Self::take_entity(data, schema.field, kind, id)
    }

    async fn create(&self, kind: EntityKind, payload: Entity) -> Result<Entity, RemoteError> {
        let schema = schema(kind);
        let mutation = format!("create{}", schema.type_name);
        let query = format!(
            "mutation Create{t}($input: Create{t}Input!) {{ {m}(input: $input) {{ {s} }} }}",
            t = schema.type_name,
            m = mutation,
            s = schema.selection
        );
        let data = self.execute(query, json!({ "input": payload })).await?;
        Self::take_entity(data, &mutation, kind, "<new>")
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &str,
        payload: Entity,
    ) -> Result<Entity, RemoteError> {
        let schema = schema(kind);
        let mutation = format!("update{}", schema.type_name);
        let query = format!(
            "mutation Update{t}($id: ID!, $input: Update{t}Input!) \
             {{ {m}(id: $id, input: $input) {{ {s} }} }}",
            t = schema.type_name,
            m = mutation,
            s = schema.selection
        );
        let data = self
            .execute(query, json!({ "id": id, "input": payload }))
            .await?;
        Self::take_entity(data, &mutation, kind, id)
    }

    async fn list(
        &self,
        kind: EntityKind,
        options: &ListOptions,
    ) -> Result<Vec<Entity>, RemoteError> {
        for name in options.filters.keys() {
            check_filter_name(name)?;
        }

        let schema = schema(kind);
        let mut declarations = vec!["$page: Int".to_string(), "$perPage: Int".to_string()];
        let mut arguments = vec!["page: $page".to_string(), "perPage: $perPage".to_string()];
        let mut variables = Map::new();
        variables.insert("page".to_string(), json!(options.page));
        variables.insert("perPage".to_string(), json!(options.per_page));

        for (name, value) in &options.filters {
            let Some(scalar) = graphql_scalar_type(name, value) else {
                debug!(filter = %name, "Skipping non-scalar list filter");
                continue;
            };
            declarations.push(format!("${}: {}", name, scalar));
            arguments.push(format!("{}: ${}", name, name));
            variables.insert(name.clone(), value.clone());
        }

        let query = format!(
            "query List{t}s({d}) {{ {f}({a}) {{ {s} }} }}",
            t = schema.type_name,
            d = declarations.join(", "),
            f = schema.list_field,
            a = arguments.join(", "),
            s = schema.selection
        );
        let mut data = self.execute(query, Value::Object(variables)).await?;

        match data.remove(schema.list_field) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(entity) => Ok(entity),
                    other => Err(RemoteError::Decode(format!(
                        "expected object in '{}', got {}",
                        schema.list_field, other
                    ))),
                })
                .collect(),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(RemoteError::Decode(format!(
                "expected array for '{}', got {}",
                schema.list_field, other
            ))),
        }
    }
}
