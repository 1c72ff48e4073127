//! Processing graph selection for a measure task

use crate::json::{self, JsonObject};
use crate::uuid_utils;
use serde_json::Value;
use uuid::Uuid;

/// Which processing graph a measure task runs
///
/// Exactly one variant is active; assigning one replaces the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphReference {
    /// One graph by id (nil when not configured)
    Single(Uuid),
    /// Graph assembled from the listed sub graphs
    SubGraphs(Vec<Uuid>),
    /// Uses the graph and filter parameters of another seam
    Linked(Uuid),
}

impl Default for GraphReference {
    fn default() -> Self {
        GraphReference::Single(Uuid::nil())
    }
}

impl GraphReference {
    pub fn is_linked(&self) -> bool {
        matches!(self, GraphReference::Linked(_))
    }

    pub fn uses_sub_graphs(&self) -> bool {
        matches!(self, GraphReference::SubGraphs(_))
    }

    /// Graph id of a single reference, nil otherwise
    pub fn graph(&self) -> Uuid {
        match self {
            GraphReference::Single(id) => *id,
            _ => Uuid::nil(),
        }
    }

    /// Sub graphs of a multi-part reference, empty otherwise
    pub fn sub_graphs(&self) -> &[Uuid] {
        match self {
            GraphReference::SubGraphs(ids) => ids,
            _ => &[],
        }
    }

    /// Target seam of a linked reference
    pub fn linked_seam(&self) -> Option<Uuid> {
        match self {
            GraphReference::Linked(seam) => Some(*seam),
            _ => None,
        }
    }

    /// Human readable form used in change log entries
    pub fn change_value(&self) -> Value {
        match self {
            GraphReference::Single(id) => Value::String(uuid_utils::to_string(id)),
            GraphReference::SubGraphs(ids) => {
                Value::Array(ids.iter().map(json::uuid_value).collect())
            }
            GraphReference::Linked(seam) => {
                Value::String(format!("Linked to Seam {}", uuid_utils::to_string(seam)))
            }
        }
    }

    pub fn write_json(&self, object: &mut JsonObject) {
        match self {
            GraphReference::Single(id) => {
                object.insert(json::GRAPH.into(), json::uuid_value(id));
            }
            GraphReference::SubGraphs(ids) => {
                object.insert(
                    json::SUB_GRAPHS.into(),
                    Value::Array(ids.iter().map(json::uuid_value).collect()),
                );
            }
            GraphReference::Linked(seam) => {
                object.insert(json::LINKED_GRAPH.into(), json::uuid_value(seam));
            }
        }
    }

    /// Reads the first present variant: sub graphs, graph, then linked graph
    pub fn from_json(object: &JsonObject) -> Self {
        let sub_graphs = json::read_uuid_list(object, json::SUB_GRAPHS);
        if !sub_graphs.is_empty() {
            return GraphReference::SubGraphs(sub_graphs);
        }
        let graph = json::read_uuid(object, json::GRAPH);
        if !graph.is_nil() {
            return GraphReference::Single(graph);
        }
        let linked = json::read_uuid(object, json::LINKED_GRAPH);
        if !linked.is_nil() {
            return GraphReference::Linked(linked);
        }
        GraphReference::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_empty_single() {
        let reference = GraphReference::default();
        assert!(reference.graph().is_nil());
        assert!(reference.sub_graphs().is_empty());
        assert!(reference.linked_seam().is_none());
        assert!(!reference.is_linked());
    }

    #[test]
    fn test_read_precedence() {
        let graph = Uuid::new_v4();
        let sub = Uuid::new_v4();
        let linked = Uuid::new_v4();

        let all = json!({
            "graph": graph.to_string(),
            "subgraphs": [sub.to_string()],
            "linkedGraph": linked.to_string()
        });
        assert_eq!(
            GraphReference::from_json(all.as_object().unwrap()),
            GraphReference::SubGraphs(vec![sub])
        );

        let graph_and_link = json!({"graph": graph.to_string(), "linkedGraph": linked.to_string(), "subgraphs": []});
        assert_eq!(
            GraphReference::from_json(graph_and_link.as_object().unwrap()),
            GraphReference::Single(graph)
        );

        let link_only = json!({"graph": Uuid::nil().to_string(), "linkedGraph": linked.to_string()});
        assert_eq!(
            GraphReference::from_json(link_only.as_object().unwrap()),
            GraphReference::Linked(linked)
        );

        assert_eq!(
            GraphReference::from_json(json!({}).as_object().unwrap()),
            GraphReference::default()
        );
    }

    #[test]
    fn test_linked_change_value() {
        let seam = Uuid::new_v4();
        assert_eq!(
            GraphReference::Linked(seam).change_value(),
            Value::String(format!("Linked to Seam {}", seam))
        );
    }

    #[test]
    fn test_write_json_uses_variant_key() {
        let seam = Uuid::new_v4();
        let mut object = JsonObject::new();
        GraphReference::Linked(seam).write_json(&mut object);
        assert_eq!(object.len(), 1);
        assert_eq!(object["linkedGraph"], json!(seam.to_string()));
    }
}
