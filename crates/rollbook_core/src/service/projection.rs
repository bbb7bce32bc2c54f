//! Read-only table snapshot for UI layers.

use crate::model::record::RecordId;
use crate::query::sort::SortSpec;
use crate::service::record_store::Page;

/// Table column headers, in display order.
pub const COLUMN_HEADERS: [&str; 4] = ["№", "Name", "Git", "Contact"];

/// One display row of the record table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionRow {
    /// Running number across pages, starting at 1.
    pub row_number: usize,
    pub id: RecordId,
    pub display_name: String,
    /// Empty when the record has no git URL.
    pub git: String,
    /// Rendered primary contact, empty when none.
    pub contact: String,
}

/// Current page of the record table with pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewProjection {
    pub headers: Vec<String>,
    pub rows: Vec<ProjectionRow>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub page_size: usize,
    pub sort: SortSpec,
    pub filter_active: bool,
}

impl ViewProjection {
    pub fn new(page: &Page, page_size: usize, sort: SortSpec, filter_active: bool) -> Self {
        let offset = page.page_number.saturating_sub(1) * page_size;
        let rows = page
            .rows
            .iter()
            .enumerate()
            .map(|(position, record)| ProjectionRow {
                row_number: offset + position + 1,
                id: record.id(),
                display_name: record.display_name(),
                git: record.git().unwrap_or_default().to_string(),
                contact: record
                    .primary_contact()
                    .map(|contact| contact.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            headers: COLUMN_HEADERS.iter().map(|header| header.to_string()).collect(),
            rows,
            page_number: page.page_number,
            total_pages: page.total_pages,
            total_count: page.total_count,
            page_size,
            sort,
            filter_active,
        }
    }

    /// Maps selected row positions on this page to record ids.
    ///
    /// Out-of-range positions are ignored.
    pub fn ids_for_rows(&self, rows: &[usize]) -> Vec<RecordId> {
        rows.iter()
            .filter_map(|position| self.rows.get(*position))
            .map(|row| row.id)
            .collect()
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.page_number > 1
    }

    /// Human-readable page indicator, e.g. `Page 2 of 3`.
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page_number, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::ViewProjection;
    use crate::model::record::{Record, RecordFields};
    use crate::query::sort::SortSpec;
    use crate::service::record_store::Page;

    fn page() -> Page {
        Page {
            rows: vec![
                Record::new(
                    4,
                    RecordFields::new("Ivanov", "Ivan")
                        .with_patronymic("Petrovich")
                        .with_email("ivanov@example.com"),
                )
                .unwrap(),
                Record::new(9, RecordFields::new("Petrov", "Petr")).unwrap(),
            ],
            total_count: 12,
            page_number: 2,
            total_pages: 2,
        }
    }

    #[test]
    fn rows_are_numbered_across_pages() {
        let projection = ViewProjection::new(&page(), 10, SortSpec::default(), false);

        assert_eq!(projection.rows[0].row_number, 11);
        assert_eq!(projection.rows[1].row_number, 12);
        assert_eq!(projection.rows[0].display_name, "Ivanov I.P.");
        assert_eq!(projection.rows[0].contact, "email - ivanov@example.com");
        assert_eq!(projection.rows[1].git, "");
        assert!(!projection.has_next_page());
        assert!(projection.has_prev_page());
        assert_eq!(projection.page_label(), "Page 2 of 2");
    }

    #[test]
    fn ids_for_rows_ignores_out_of_range_positions() {
        let projection = ViewProjection::new(&page(), 10, SortSpec::default(), true);

        assert_eq!(projection.ids_for_rows(&[1, 0, 7]), vec![9, 4]);
    }

    #[test]
    fn page_number_zero_numbers_from_one() {
        let mut page = page();
        page.page_number = 0;

        let projection = ViewProjection::new(&page, 10, SortSpec::default(), false);

        assert_eq!(projection.rows[0].row_number, 1);
        assert_eq!(projection.rows[1].row_number, 2);
    }
}
