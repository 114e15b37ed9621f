use std::cmp::Ordering;

use crate::state::SortSpec;

/// Value a sortable column orders by. Missing values sort last in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Num(Option<f64>),
}

impl SortKey {
    fn compare(&self, other: &SortKey, desc: bool) -> Ordering {
        let ord = match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (SortKey::Num(Some(a)), SortKey::Num(Some(b))) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortKey::Num(None), SortKey::Num(None)) => return Ordering::Equal,
            (SortKey::Num(None), SortKey::Num(Some(_))) => return Ordering::Greater,
            (SortKey::Num(Some(_)), SortKey::Num(None)) => return Ordering::Less,
            // Mixed kinds never happen within one column.
            _ => Ordering::Equal,
        };
        if desc {
            ord.reverse()
        } else {
            ord
        }
    }
}

pub struct Column<T> {
    pub id: &'static str,
    pub header: &'static str,
    /// Renders one cell; the second argument is the row's display index.
    cell: fn(&T, usize) -> String,
    sort_key: Option<fn(&T) -> SortKey>,
}

impl<T> Column<T> {
    pub fn new(id: &'static str, header: &'static str, cell: fn(&T, usize) -> String) -> Self {
        Self {
            id,
            header,
            cell,
            sort_key: None,
        }
    }

    pub fn sortable(mut self, key: fn(&T) -> SortKey) -> Self {
        self.sort_key = Some(key);
        self
    }

    pub fn can_sort(&self) -> bool {
        self.sort_key.is_some()
    }

    pub fn render(&self, row: &T, index: usize) -> String {
        (self.cell)(row, index)
    }
}

/// `#` column: `1.`, `2.`, ... in display order.
pub fn serial_column<T>() -> Column<T> {
    Column::new("serialNo", "#", |_, i| format!("{}.", i + 1))
}

/// Sortable text table bound to a fixed set of columns.
pub struct Table<T> {
    columns: Vec<Column<T>>,
}

impl<T> Table<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    fn column(&self, id: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Drop sort entries naming unknown or unsortable columns.
    pub fn valid_sorting(&self, specs: &[SortSpec]) -> Vec<SortSpec> {
        specs
            .iter()
            .filter(|s| self.column(&s.id).is_some_and(Column::can_sort))
            .cloned()
            .collect()
    }

    /// Stable multi-key sort on top of whatever order `rows` already has.
    pub fn sort(&self, rows: &mut [T], specs: &[SortSpec]) {
        let keys: Vec<(fn(&T) -> SortKey, bool)> = specs
            .iter()
            .filter_map(|s| {
                self.column(&s.id)
                    .and_then(|c| c.sort_key)
                    .map(|k| (k, s.desc))
            })
            .collect();
        if keys.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|(key, desc)| key(a).compare(&key(b), *desc))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    pub fn cells(&self, rows: &[T]) -> Vec<Vec<String>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.columns.iter().map(|c| c.render(row, i)).collect())
            .collect()
    }

    /// Right-aligned plain-text rendering. Sorted headers carry an arrow.
    pub fn render(&self, rows: &[T], sorting: &[SortSpec]) -> String {
        let headers: Vec<String> = self
            .columns
            .iter()
            .map(|c| match sorting.iter().find(|s| s.id == c.id) {
                Some(s) if s.desc => format!("{} v", c.header.trim()),
                Some(_) => format!("{} ^", c.header.trim()),
                None => c.header.trim().to_string(),
            })
            .collect();
        let body = self.cells(rows);

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:>w$}"))
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut out = String::new();
        out.push_str(&line(&headers));
        out.push('\n');
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');

        if body.is_empty() {
            out.push_str("No results.\n");
        }
        for row in &body {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: &'static str,
        price: Option<f64>,
    }

    fn table() -> Table<Row> {
        Table::new(vec![
            serial_column(),
            Column::new("name", "NAME", |r: &Row, _| r.name.to_string())
                .sortable(|r| SortKey::Text(r.name.to_string())),
            Column::new("price", "PRICE", |r: &Row, _| {
                r.price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "N/A".to_string())
            })
            .sortable(|r| SortKey::Num(r.price)),
        ])
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "b", price: Some(2.0) },
            Row { name: "a", price: None },
            Row { name: "c", price: Some(1.0) },
        ]
    }

    fn spec(id: &str, desc: bool) -> SortSpec {
        SortSpec { id: id.to_string(), desc }
    }

    #[test]
    fn test_valid_sorting_drops_unknown() {
        let t = table();
        let valid = t.valid_sorting(&[spec("price", true), spec("gone", false), spec("serialNo", false)]);
        assert_eq!(valid, vec![spec("price", true)]);
    }

    #[test]
    fn test_sort_numeric_missing_last() {
        let t = table();
        let mut r = rows();
        t.sort(&mut r, &[spec("price", false)]);
        assert_eq!(r.iter().map(|x| x.name).collect::<Vec<_>>(), vec!["c", "b", "a"]);

        t.sort(&mut r, &[spec("price", true)]);
        assert_eq!(r.iter().map(|x| x.name).collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_empty_sorting_keeps_order() {
        let t = table();
        let mut r = rows();
        t.sort(&mut r, &[]);
        assert_eq!(r.iter().map(|x| x.name).collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_serial_follows_display_order() {
        let t = table();
        let cells = t.cells(&rows());
        assert_eq!(cells[0][0], "1.");
        assert_eq!(cells[2][0], "3.");
        assert_eq!(cells[1][2], "N/A");
    }

    #[test]
    fn test_render() {
        let t = table();
        let out = t.render(&rows(), &[spec("name", false)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " #  NAME ^  PRICE");
        assert_eq!(lines[2], "1.       b   2.00");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_render_empty() {
        let t = table();
        let out = t.render(&[], &[]);
        assert!(out.ends_with("No results.\n"));
    }
}
