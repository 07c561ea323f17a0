// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(i64);

impl RowId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One record of the table. `qty` and `price` are non-negative; the row total
/// is derived as `qty * price` and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub group: String,
    pub name: String,
    pub qty: f64,
    pub price: f64,
}

impl Row {
    pub fn total(&self) -> f64 {
        self.qty * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowWithTotal {
    pub row: Row,
    pub total: f64,
}

impl RowWithTotal {
    pub fn from_row(row: Row) -> Self {
        let total = row.total();
        Self { row, total }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Group,
    Name,
    Qty,
    Price,
    Total,
}

impl SortKey {
    pub const ALL: [Self; 5] = [Self::Group, Self::Name, Self::Qty, Self::Price, Self::Total];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Name => "name",
            Self::Qty => "qty",
            Self::Price => "price",
            Self::Total => "total",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "group" => Some(Self::Group),
            "name" => Some(Self::Name),
            "qty" => Some(Self::Qty),
            "price" => Some(Self::Price),
            "total" => Some(Self::Total),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Group => "Group",
            Self::Name => "Name",
            Self::Qty => "Qty",
            Self::Price => "Price",
            Self::Total => "Total",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Qty | Self::Price | Self::Total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    None,
    Asc,
    Desc,
}

impl SortDir {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn cycled(self) -> Self {
        match self {
            Self::None => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::None,
        }
    }
}

/// One entry of the rendered table body: either a visible row or a
/// placeholder standing in for one contiguous run of hidden rows.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    Row(RowWithTotal),
    Collapsed { group: String, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FooterTotals {
    pub qty: f64,
    pub value: f64,
}

/// Compares strings the way the table headers sort them: Unicode lowercase
/// first, raw bytes as tie-break so distinct casings order deterministically.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match a.to_lowercase().cmp(&b.to_lowercase()) {
        Ordering::Equal => a.cmp(b),
        unequal => unequal,
    }
}

/// Built-in demo rows shown before anything has been loaded.
pub fn seed_rows() -> Vec<Row> {
    [
        (1, "A", "Alpha", 2.0, 120.0),
        (2, "A", "Amber", 1.0, 80.0),
        (3, "A", "Atlas", 4.0, 55.0),
        (4, "B", "Beta", 1.0, 200.0),
        (5, "B", "Brick", 3.0, 40.0),
        (6, "C", "Cobalt", 2.0, 90.0),
        (7, "C", "Cedar", 5.0, 25.0),
    ]
    .into_iter()
    .map(|(id, group, name, qty, price)| Row {
        id: RowId::new(id),
        group: group.to_owned(),
        name: name.to_owned(),
        qty,
        price,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::{Row, RowId, SortDir, SortKey, compare_labels, seed_rows};
    use std::cmp::Ordering;

    #[test]
    fn sort_key_round_trips_through_parse() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("rows"), None);
    }

    #[test]
    fn sort_dir_cycle_wraps() {
        assert_eq!(SortDir::None.cycled(), SortDir::Asc);
        assert_eq!(SortDir::Asc.cycled(), SortDir::Desc);
        assert_eq!(SortDir::Desc.cycled(), SortDir::None);
    }

    #[test]
    fn row_total_is_qty_times_price() {
        let row = Row {
            id: RowId::new(9),
            group: "A".to_owned(),
            name: "Anvil".to_owned(),
            qty: 3.0,
            price: 12.5,
        };
        assert_eq!(row.total(), 37.5);
    }

    #[test]
    fn row_wire_format_uses_short_field_names() {
        let row = Row {
            id: RowId::new(1),
            group: "A".to_owned(),
            name: "Alpha".to_owned(),
            qty: 2.0,
            price: 120.0,
        };
        let encoded = serde_json::to_string(&row).expect("encode row");
        assert_eq!(
            encoded,
            r#"{"id":1,"group":"A","name":"Alpha","qty":2.0,"price":120.0}"#
        );

        let decoded: Row = serde_json::from_str(&encoded).expect("decode row");
        assert_eq!(decoded, row);
    }

    #[test]
    fn row_decodes_integer_quantities() {
        let decoded: Row =
            serde_json::from_str(r#"{"id":4,"group":"B","name":"Beta","qty":1,"price":200}"#)
                .expect("decode row with integer numbers");
        assert_eq!(decoded.qty, 1.0);
        assert_eq!(decoded.price, 200.0);
    }

    #[test]
    fn compare_labels_folds_case_before_raw_order() {
        assert_eq!(compare_labels("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_labels("Cedar", "cobalt"), Ordering::Less);
        assert_ne!(compare_labels("alpha", "Alpha"), Ordering::Equal);
        assert_eq!(compare_labels("same", "same"), Ordering::Equal);
    }

    #[test]
    fn seed_rows_have_unique_ids_and_known_groups() {
        let rows = seed_rows();
        assert_eq!(rows.len(), 7);

        let mut ids: Vec<i64> = rows.iter().map(|row| row.id.get()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 7);

        for row in &rows {
            assert!(matches!(row.group.as_str(), "A" | "B" | "C"));
            assert!(row.qty >= 0.0);
            assert!(row.price >= 0.0);
        }
    }
}
