//! Grid State - the persistable snapshot of layout, filters, sort and page.
//! Never carries row data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::Pin;
use crate::filter::FilterEntry;
use crate::sort::SortEntry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridState {
    /// Column layout in display order
    pub columns: Vec<ColumnState>,
    pub filters: BTreeMap<String, FilterEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_search: Option<String>,
    pub sort: Vec<SortEntry>,
    pub pagination: PageState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub field: String,
    #[serde(default = "visible_default")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Pin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<usize>,
}

fn visible_default() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageState {
    pub page: usize,
    /// 0 means "keep the grid's configured size"
    pub page_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let state: GridState =
            serde_json::from_str(r#"{"columns":[{"field":"name"}],"pagination":{"page":2}}"#).unwrap();
        assert!(state.columns[0].visible);
        assert_eq!(state.pagination.page, 2);
        assert_eq!(state.pagination.page_size, 0);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let state = GridState {
            columns: vec![ColumnState {
                field: "name".into(),
                visible: false,
                width: Some(120.0),
                pinned: Some(Pin::Left),
                sort_order: Some(0),
            }],
            pagination: PageState { page: 1, page_size: 25 },
            ..GridState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["columns"][0]["sortOrder"], 0);
        assert_eq!(json["columns"][0]["pinned"], "left");
        assert_eq!(json["pagination"]["pageSize"], 25);
        assert!(json.get("globalSearch").is_none());
    }
}
