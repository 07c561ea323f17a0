// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::model::{
    DisplayItem, FooterTotals, Row, RowId, RowWithTotal, SortDir, SortKey, compare_labels,
    seed_rows,
};

/// Authoritative table state: the row set plus sort, selection, and collapse
/// state. Every view the UI renders is derived on demand from this value;
/// nothing derived is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub rows: Vec<Row>,
    pub sort_key: SortKey,
    pub sort_dir: SortDir,
    pub selected: BTreeSet<RowId>,
    pub collapsed: BTreeSet<String>,
}

impl Default for TableModel {
    fn default() -> Self {
        Self::with_rows(seed_rows())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand {
    CycleSort(SortKey),
    ResetSort,
    ToggleSelected(RowId),
    ClearSelection,
    CollapseSelected,
    ExpandGroup(String),
    ExpandAll,
    ReplaceRows(Vec<Row>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SortChanged { key: SortKey, dir: SortDir },
    SelectionChanged(usize),
    GroupsCollapsed(Vec<String>),
    GroupExpanded(String),
    AllExpanded,
    RowsReplaced(usize),
}

impl TableModel {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            sort_key: SortKey::Group,
            sort_dir: SortDir::None,
            selected: BTreeSet::new(),
            collapsed: BTreeSet::new(),
        }
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        match command {
            TableCommand::CycleSort(key) => {
                if self.sort_key != key {
                    self.sort_key = key;
                    self.sort_dir = SortDir::Asc;
                } else {
                    self.sort_dir = self.sort_dir.cycled();
                }
                vec![TableEvent::SortChanged {
                    key: self.sort_key,
                    dir: self.sort_dir,
                }]
            }
            TableCommand::ResetSort => {
                self.sort_key = SortKey::Group;
                self.sort_dir = SortDir::None;
                vec![TableEvent::SortChanged {
                    key: self.sort_key,
                    dir: self.sort_dir,
                }]
            }
            TableCommand::ToggleSelected(id) => {
                if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
                vec![TableEvent::SelectionChanged(self.selected.len())]
            }
            TableCommand::ClearSelection => {
                self.selected.clear();
                vec![TableEvent::SelectionChanged(0)]
            }
            TableCommand::CollapseSelected => self.collapse_selected(),
            TableCommand::ExpandGroup(group) => {
                self.collapsed.remove(&group);
                vec![TableEvent::GroupExpanded(group)]
            }
            TableCommand::ExpandAll => {
                self.collapsed.clear();
                vec![TableEvent::AllExpanded]
            }
            TableCommand::ReplaceRows(rows) => {
                let count = rows.len();
                self.rows = rows;
                self.selected.clear();
                self.collapsed.clear();
                vec![TableEvent::RowsReplaced(count)]
            }
        }
    }

    // Collapse touches the groups of every selected row and consumes the
    // selection. Selected ids with no matching row contribute nothing.
    fn collapse_selected(&mut self) -> Vec<TableEvent> {
        if self.selected.is_empty() {
            return Vec::new();
        }

        let mut groups = BTreeSet::new();
        for item in self.computed_rows() {
            if self.selected.contains(&item.row.id) {
                groups.insert(item.row.group);
            }
        }

        let labels: Vec<String> = groups.iter().cloned().collect();
        self.collapsed.append(&mut groups);
        self.selected.clear();

        vec![
            TableEvent::GroupsCollapsed(labels),
            TableEvent::SelectionChanged(0),
        ]
    }

    /// Rows annotated with totals, in the current sort order. Unsorted keeps
    /// arrival order; sorted output is stable, so rows with equal keys stay
    /// in their original relative order (grouping relies on this).
    pub fn computed_rows(&self) -> Vec<RowWithTotal> {
        let mut items: Vec<RowWithTotal> = self
            .rows
            .iter()
            .cloned()
            .map(RowWithTotal::from_row)
            .collect();

        if self.sort_dir == SortDir::None {
            return items;
        }

        let key = self.sort_key;
        items.sort_by(|a, b| {
            let ordering = if key.is_numeric() {
                let (left, right) = match key {
                    SortKey::Qty => (a.row.qty, b.row.qty),
                    SortKey::Price => (a.row.price, b.row.price),
                    _ => (a.total, b.total),
                };
                left.total_cmp(&right)
            } else {
                match key {
                    SortKey::Group => compare_labels(&a.row.group, &b.row.group),
                    _ => compare_labels(&a.row.name, &b.row.name),
                }
            };

            match self.sort_dir {
                SortDir::Desc => ordering.reverse(),
                _ => ordering,
            }
        });
        items
    }

    /// The table body in display order: visible rows pass through, and each
    /// contiguous run of collapsed-group rows folds into one placeholder.
    /// Runs are bounded by sort-order adjacency, not by group identity, so a
    /// collapsed group split by an interleaved row yields several
    /// placeholders.
    pub fn display_items(&self) -> Vec<DisplayItem> {
        let computed = self.computed_rows();
        let mut items = Vec::with_capacity(computed.len());
        let mut index = 0;

        while index < computed.len() {
            let item = &computed[index];
            if !self.collapsed.contains(&item.row.group) {
                items.push(DisplayItem::Row(item.clone()));
                index += 1;
                continue;
            }

            let group = item.row.group.clone();
            let mut end = index;
            while end < computed.len() && computed[end].row.group == group {
                end += 1;
            }
            items.push(DisplayItem::Collapsed {
                group,
                count: end - index,
            });
            index = end;
        }

        items
    }

    /// Aggregates over currently visible rows only; rows hidden behind a
    /// collapsed-group placeholder do not count. Shares the visibility
    /// predicate with `display_items`.
    pub fn footer_totals(&self) -> FooterTotals {
        self.computed_rows()
            .iter()
            .filter(|item| !self.collapsed.contains(&item.row.group))
            .fold(FooterTotals::default(), |totals, item| FooterTotals {
                qty: totals.qty + item.row.qty,
                value: totals.value + item.total,
            })
    }

}
