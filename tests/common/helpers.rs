use canopy::prelude::*;

/// Every id in a forest, in preorder
pub fn tree_ids(forest: &[TreeNode<Record>]) -> Vec<String> {
    forest
        .iter()
        .flat_map(|root| root.iter())
        .filter_map(|record| record.key("id"))
        .collect()
}

pub fn names(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.get_as::<String>("name").ok())
        .collect()
}

/// Search criteria used across the integration tests
#[derive(Debug, Default, Clone)]
pub struct Search {
    pub name: Option<String>,
    pub ids: Vec<String>,
}

impl Search {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn nothing() -> Self {
        Self::named("no such category")
    }
}

/// Translates [`Search`] into a predicate over the base table
pub fn search(
    criteria: &Search,
    table: &TableRef,
) -> canopy::Result<Option<SQL<'static, SQLiteValue>>> {
    let mut conditions = Vec::new();
    if let Some(name) = &criteria.name {
        conditions.push(expr::eq(
            table.column::<SQLiteValue>("name"),
            SQLiteValue::from(name.as_str()),
        ));
    }
    if !criteria.ids.is_empty() {
        conditions.push(expr::in_list(
            table.column::<SQLiteValue>("id"),
            criteria.ids.iter().map(|id| SQLiteValue::from(id.as_str())),
        ));
    }
    Ok(match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(expr::and(conditions)),
    })
}

/// Who is asking
#[derive(Debug, Default, Clone)]
pub struct Viewer {
    pub owner: Option<String>,
}

pub fn owned_by_viewer(
    viewer: &Viewer,
    table: &TableRef,
) -> canopy::Result<Option<SQL<'static, SQLiteValue>>> {
    Ok(viewer.owner.as_ref().map(|owner| {
        expr::eq(
            table.column::<SQLiteValue>("owner"),
            SQLiteValue::from(owner.as_str()),
        )
    }))
}
