//! Input tree model.

use crate::config::MapperConfig;
use crate::error::{CoreError, CoreResult};
use nestsync_store::{AttrMap, RecordKey};
use serde_json::Value;

/// One node of the caller-supplied input tree.
///
/// A node carries an optional stable identity, an arbitrary attribute
/// payload and an ordered list of children. Nodes are ephemeral: they
/// exist for the duration of one synchronization call and are only read,
/// never mutated, by the core.
///
/// Build nodes with the fluent API or parse them from JSON with
/// [`Node::forest_from_json`]:
///
/// ```rust
/// use nestsync_core::Node;
///
/// let root = Node::with_key(1)
///     .attr("name", "root")
///     .child(Node::with_key(2).attr("name", "child"));
/// assert_eq!(root.children().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    key: Option<RecordKey>,
    attributes: AttrMap,
    children: Vec<Node>,
}

impl Node {
    /// Creates a node without an identity key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node with the given identity key.
    #[must_use]
    pub fn with_key(key: impl Into<RecordKey>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child nodes.
    #[must_use]
    pub fn children_from(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns the identity key, if any.
    #[must_use]
    pub fn key(&self) -> Option<RecordKey> {
        self.key
    }

    /// Returns the attribute payload.
    #[must_use]
    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Parses a forest from a JSON array of node objects.
    ///
    /// The identity and children field names come from `config`; every
    /// other field is treated as opaque attribute data and passed through
    /// verbatim. A `null` identity counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the value is not an array of
    /// objects, an identity is not a positive integer, or a children
    /// value is not an array.
    pub fn forest_from_json(value: &Value, config: &MapperConfig) -> CoreResult<Vec<Node>> {
        let items = value.as_array().ok_or_else(|| {
            CoreError::validation(format!("expected an array of nodes, got {}", kind(value)))
        })?;
        items
            .iter()
            .map(|item| Self::from_json(item, config))
            .collect()
    }

    /// Parses a single node from a JSON object.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Node::forest_from_json`].
    pub fn from_json(value: &Value, config: &MapperConfig) -> CoreResult<Node> {
        let map = value.as_object().ok_or_else(|| {
            CoreError::validation(format!("expected a node object, got {}", kind(value)))
        })?;

        let mut node = Node::new();
        for (name, field) in map {
            if *name == config.identity_key {
                node.key = parse_identity(name, field)?;
            } else if *name == config.children_key {
                if field.is_null() {
                    continue;
                }
                if !field.is_array() {
                    return Err(CoreError::validation(format!(
                        "`{name}` value is not a sequence of nodes"
                    )));
                }
                node.children = Self::forest_from_json(field, config)?;
            } else {
                node.attributes.insert(name.clone(), field.clone());
            }
        }
        Ok(node)
    }
}

fn parse_identity(name: &str, value: &Value) -> CoreResult<Option<RecordKey>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_u64().map(|raw| Some(RecordKey::new(raw))).ok_or_else(
            || CoreError::validation(format!("identity `{name}` is not a positive integer")),
        ),
        _ => Err(CoreError::validation(format!(
            "identity `{name}` is not a positive integer"
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder() {
        let node = Node::with_key(1)
            .attr("name", "root")
            .child(Node::new().attr("name", "anonymous"));

        assert_eq!(node.key(), Some(RecordKey::new(1)));
        assert_eq!(node.attributes()["name"], "root");
        assert_eq!(node.children().len(), 1);
        assert!(node.children()[0].key().is_none());
    }

    #[test]
    fn parse_forest() {
        let value = json!([
            {"id": 1, "name": "root", "children": [
                {"id": 2, "name": "child"}
            ]}
        ]);
        let forest = Node::forest_from_json(&value, &MapperConfig::default()).unwrap();

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.key(), Some(RecordKey::new(1)));
        assert_eq!(root.attributes()["name"], "root");
        assert!(!root.attributes().contains_key("id"));
        assert!(!root.attributes().contains_key("children"));
        assert_eq!(root.children()[0].key(), Some(RecordKey::new(2)));
    }

    #[test]
    fn parse_custom_keys() {
        let value = json!([{"pk": 7, "items": [{"pk": 8}]}]);
        let config = MapperConfig::new().identity_key("pk").children_key("items");
        let forest = Node::forest_from_json(&value, &config).unwrap();

        assert_eq!(forest[0].key(), Some(RecordKey::new(7)));
        assert_eq!(forest[0].children()[0].key(), Some(RecordKey::new(8)));
    }

    #[test]
    fn null_identity_counts_as_absent() {
        let value = json!([{"id": null, "name": "fresh"}]);
        let forest = Node::forest_from_json(&value, &MapperConfig::default()).unwrap();
        assert!(forest[0].key().is_none());
    }

    #[test]
    fn null_children_counts_as_empty() {
        let value = json!([{"id": 1, "children": null}]);
        let forest = Node::forest_from_json(&value, &MapperConfig::default()).unwrap();
        assert!(forest[0].children().is_empty());
    }

    #[test]
    fn rejects_non_sequence_children() {
        let value = json!([{"id": 1, "children": "oops"}]);
        let err = Node::forest_from_json(&value, &MapperConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(err.to_string().contains("not a sequence"));
    }

    #[test]
    fn rejects_non_integer_identity() {
        let value = json!([{"id": "abc"}]);
        let err = Node::forest_from_json(&value, &MapperConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn rejects_non_object_node() {
        let value = json!([42]);
        let err = Node::forest_from_json(&value, &MapperConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn attributes_pass_through_verbatim() {
        let value = json!([{
            "id": 3,
            "tags": ["a", "b"],
            "meta": {"nested": true}
        }]);
        let forest = Node::forest_from_json(&value, &MapperConfig::default()).unwrap();
        assert_eq!(forest[0].attributes()["tags"], json!(["a", "b"]));
        assert_eq!(forest[0].attributes()["meta"], json!({"nested": true}));
    }
}
