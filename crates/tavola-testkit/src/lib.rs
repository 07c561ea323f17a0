// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deterministic row-set builders shared by tests across the workspace.

use serde_json::{Value, json};
use tavola_app::{Row, RowId};

const GROUP_NAMES: [&str; 26] = [
    "Anchor", "Basalt", "Cinder", "Drift", "Ember", "Fathom", "Garnet", "Harbor", "Ingot",
    "Juniper", "Kestrel", "Lumen", "Marrow", "Nimbus", "Onyx", "Pumice", "Quartz", "Rook",
    "Sable", "Tundra", "Umber", "Vesper", "Willow", "Xenon", "Yarrow", "Zephyr",
];

pub fn row(id: i64, group: &str, name: &str, qty: f64, price: f64) -> Row {
    Row {
        id: RowId::new(id),
        group: group.to_owned(),
        name: name.to_owned(),
        qty,
        price,
    }
}

/// Builds `count` rows per group label, ids assigned sequentially from 1 in
/// the order given. Quantities and prices vary deterministically so sorts
/// and totals have distinct values to bite on.
pub fn rows_in_groups(groups: &[(&str, usize)]) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut id = 1;
    for (group, count) in groups {
        for index in 0..*count {
            let name = format!(
                "{} {}",
                GROUP_NAMES[(id as usize - 1) % GROUP_NAMES.len()],
                index + 1
            );
            rows.push(row(
                id,
                group,
                &name,
                (index + 1) as f64,
                (id * 10) as f64 + index as f64,
            ));
            id += 1;
        }
    }
    rows
}

/// A saved-table payload in the wire shape of the persistence service.
pub fn row_set_payload(rows: &[Row]) -> Value {
    json!({ "rows": rows })
}

#[cfg(test)]
mod tests {
    use super::{row, row_set_payload, rows_in_groups};

    #[test]
    fn rows_in_groups_assigns_sequential_unique_ids() {
        let rows = rows_in_groups(&[("A", 2), ("B", 3)]);
        let ids: Vec<i64> = rows.iter().map(|row| row.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let groups: Vec<&str> = rows.iter().map(|row| row.group.as_str()).collect();
        assert_eq!(groups, vec!["A", "A", "B", "B", "B"]);
    }

    #[test]
    fn generated_rows_are_deterministic() {
        assert_eq!(
            rows_in_groups(&[("A", 2)]),
            rows_in_groups(&[("A", 2)]),
        );
    }

    #[test]
    fn payload_wraps_rows_in_a_rows_field() {
        let payload = row_set_payload(&[row(1, "A", "Alpha", 2.0, 120.0)]);
        let rows = payload
            .get("rows")
            .and_then(|value| value.as_array())
            .expect("rows array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").and_then(|v| v.as_str()), Some("Alpha"));
    }
}
