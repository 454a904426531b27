//! Small views feeding the dashboard's data-structure demos

use super::aggregate::MISSING_DATE;
use crate::ingest::types::DetectionRecord;
use serde::Serialize;

pub const ARRAY_LIMIT: usize = 10;
pub const LIST_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub id: i64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(value: &str) -> Self {
        Self {
            value: value.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(value: &str, children: Vec<TreeNode>) -> Self {
        Self {
            value: value.to_string(),
            children,
        }
    }
}

/// Records in insertion order
fn by_id(records: &[DetectionRecord]) -> Vec<&DetectionRecord> {
    let mut sorted: Vec<&DetectionRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.id);
    sorted
}

/// Last two decimal digits of the first ten timestamps
pub fn array_data(records: &[DetectionRecord]) -> Vec<i64> {
    by_id(records)
        .into_iter()
        .take(ARRAY_LIMIT)
        .map(|r| r.timestamp_ms % 100)
        .collect()
}

pub fn list_data(records: &[DetectionRecord]) -> Vec<ListItem> {
    by_id(records)
        .into_iter()
        .take(LIST_LIMIT)
        .map(|r| ListItem {
            id: r.id,
            date: r.date.clone().unwrap_or_else(|| MISSING_DATE.to_string()),
        })
        .collect()
}

pub fn tree_data() -> TreeNode {
    TreeNode::branch(
        "Traffic Data",
        vec![
            TreeNode::branch(
                "Vehicles",
                vec![
                    TreeNode::leaf("Cars"),
                    TreeNode::leaf("Buses"),
                    TreeNode::leaf("Trucks"),
                ],
            ),
            TreeNode::branch(
                "Lanes",
                vec![
                    TreeNode::leaf("Lane 1"),
                    TreeNode::leaf("Lane 2"),
                    TreeNode::leaf("Lane 3"),
                ],
            ),
        ],
    )
}
