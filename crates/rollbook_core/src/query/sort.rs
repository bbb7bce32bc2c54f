//! Record ordering by table column.
//!
//! # Responsibility
//! - Select the comparator for each sortable column.
//! - Apply direction without giving up stability.
//!
//! # Invariants
//! - Sorting is stable: records that compare equal keep their input order in
//!   both directions.
//! - For `git`/`contact`, populated values always precede empty ones; the
//!   direction only reverses order inside each group.
//! - Descending order is produced by reversing the ascending sequence, not by
//!   inverting the comparator.

use crate::model::record::Record;
use std::cmp::Ordering;

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    Name,
    Git,
    Contact,
}

impl SortColumn {
    /// Parses a column label (`id|name|git|contact`).
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "id" => Some(Self::Id),
            "name" | "fio" => Some(Self::Name),
            "git" => Some(Self::Git),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    /// Maps a table column index (0 = id, 1 = name, 2 = git, 3 = contact).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Id),
            1 => Some(Self::Name),
            2 => Some(Self::Git),
            3 => Some(Self::Contact),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Git => "git",
            Self::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::ascending(SortColumn::Name)
    }
}

impl SortSpec {
    pub fn ascending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// Header-click semantics: same column flips direction, a new column
    /// starts ascending.
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.reversed(),
            }
        } else {
            Self::ascending(column)
        }
    }
}

/// Compares two records by `column` in ascending order.
pub fn compare(a: &Record, b: &Record, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => a.id().cmp(&b.id()),
        SortColumn::Name => a
            .display_name()
            .to_lowercase()
            .cmp(&b.display_name().to_lowercase()),
        SortColumn::Git => presence_key(a.git()).cmp(&presence_key(b.git())),
        SortColumn::Contact => {
            let a_contact = a.primary_contact().map(|contact| contact.to_string());
            let b_contact = b.primary_contact().map(|contact| contact.to_string());
            presence_key(a_contact.as_deref()).cmp(&presence_key(b_contact.as_deref()))
        }
    }
}

/// Orders `indices` (positions into `records`) by `spec`.
///
/// The store keeps its derived view as an index list, so sorting never
/// clones records.
pub fn sort_indices(indices: &mut [usize], records: &[Record], spec: SortSpec) {
    let column = spec.column;
    let by_record = |a: &usize, b: &usize| compare(&records[*a], &records[*b], column);
    indices.sort_by(by_record);

    if spec.direction == SortDirection::Descending {
        let split = indices.partition_point(|index| is_populated(&records[*index], column));
        let (populated, empty) = indices.split_at_mut(split);
        for group in [populated, empty] {
            group.reverse();
            group.sort_by(by_record);
            group.reverse();
        }
    }
}

/// Returns `records` ordered by `spec`.
pub fn sort(records: &[Record], spec: SortSpec) -> Vec<Record> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    sort_indices(&mut order, records, spec);
    order.into_iter().map(|index| records[index].clone()).collect()
}

fn is_populated(record: &Record, column: SortColumn) -> bool {
    match column {
        SortColumn::Id | SortColumn::Name => true,
        SortColumn::Git => record.has_git(),
        SortColumn::Contact => record.has_contact(),
    }
}

fn presence_key(value: Option<&str>) -> (u8, String) {
    match value.filter(|value| !value.is_empty()) {
        Some(value) => (0, value.to_lowercase()),
        None => (1, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::{compare, sort, SortColumn, SortDirection, SortSpec};
    use crate::model::record::{Record, RecordFields};
    use std::cmp::Ordering;

    fn record(id: u64, last: &str, first: &str) -> Record {
        Record::new(id, RecordFields::new(last, first)).unwrap()
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn toggled_flips_same_column_and_resets_new_column() {
        let spec = SortSpec::default();
        let flipped = spec.toggled(SortColumn::Name);
        assert_eq!(flipped.direction, SortDirection::Descending);

        let reset = flipped.toggled(SortColumn::Git);
        assert_eq!(reset, SortSpec::ascending(SortColumn::Git));
    }

    #[test]
    fn name_descending_is_exact_reverse_without_ties() {
        let records = vec![
            record(1, "Sidorov", "Sidor"),
            record(2, "Ivanov", "Ivan"),
            record(3, "Petrov", "Petr"),
        ];
        let asc = sort(&records, SortSpec::ascending(SortColumn::Name));
        let mut desc = sort(
            &records,
            SortSpec {
                column: SortColumn::Name,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(ids(&asc), vec![2, 3, 1]);
        desc.reverse();
        assert_eq!(ids(&desc), ids(&asc));
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let records = vec![
            record(5, "Ivanov", "Ivan"),
            record(2, "Ivanov", "Igor"),
            record(9, "Abramov", "Anton"),
        ];
        let asc = sort(&records, SortSpec::ascending(SortColumn::Name));
        assert_eq!(ids(&asc), vec![9, 5, 2]);

        let desc = sort(
            &records,
            SortSpec {
                column: SortColumn::Name,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(ids(&desc), vec![5, 2, 9]);
    }

    #[test]
    fn populated_git_sorts_first_in_both_directions() {
        let records = vec![
            record(1, "Abramov", "Anton"),
            Record::new(
                2,
                RecordFields::new("Zotov", "Zahar").with_git("https://github.com/zotov"),
            )
            .unwrap(),
            Record::new(
                3,
                RecordFields::new("Petrov", "Petr").with_git("https://github.com/abc"),
            )
            .unwrap(),
            record(4, "Borisov", "Boris"),
        ];

        let asc = sort(&records, SortSpec::ascending(SortColumn::Git));
        assert_eq!(ids(&asc), vec![3, 2, 1, 4]);

        let desc = sort(
            &records,
            SortSpec {
                column: SortColumn::Git,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(ids(&desc), vec![2, 3, 1, 4]);
    }

    #[test]
    fn compare_by_id_is_numeric() {
        let a = record(2, "Ivanov", "Ivan");
        let b = record(10, "Ivanov", "Ivan");
        assert_eq!(compare(&a, &b, SortColumn::Id), Ordering::Less);
    }

    #[test]
    fn column_labels_and_indices_parse() {
        assert_eq!(SortColumn::from_label("Contact"), Some(SortColumn::Contact));
        assert_eq!(SortColumn::from_label("phone"), None);
        assert_eq!(SortColumn::from_index(2), Some(SortColumn::Git));
        assert_eq!(SortColumn::from_index(4), None);
    }
}
