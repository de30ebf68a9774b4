use super::ast::QueryNode;

/// Serialize a query AST to a pretty-printed JSON string.
pub fn to_pretty_json(node: &QueryNode) -> String {
    serde_json::to_string_pretty(node).expect("QueryNode serialization cannot fail")
}
