//! CLI presentation: formatters for context commands.

use crate::context::{Context, ContextData};
use crate::error::ApiError;

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to render JSON: {}", e)))
}

/// Full context as pretty JSON
pub fn format_context_json(context: &Context) -> Result<String, ApiError> {
    to_pretty(context)
}

/// Inherited data as pretty JSON with sorted keys
pub fn format_resolved_json(data: &ContextData) -> Result<String, ApiError> {
    let sorted: std::collections::BTreeMap<_, _> = data.iter().collect();
    to_pretty(&sorted)
}

/// One line per context: id, source, parent, child count
pub fn format_context_list_text(contexts: &[Context]) -> String {
    if contexts.is_empty() {
        return "No contexts.".to_string();
    }

    let width = contexts.iter().map(|c| c.id.len()).max().unwrap_or(0).max(2);
    let mut output = format!("{:<width$}  {:<12}  {:<12}  CHILDREN\n", "ID", "SOURCE", "PARENT");
    for ctx in contexts {
        output.push_str(&format!(
            "{:<width$}  {:<12}  {:<12}  {}\n",
            ctx.id,
            ctx.source,
            ctx.parent_id.as_deref().unwrap_or("-"),
            ctx.children_ids.len(),
        ));
    }
    output.push_str(&format!("{} context(s)", contexts.len()));
    output
}
