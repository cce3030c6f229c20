//! Plain-text table rendering.
//!
//! The session stream has no cursor addressing, so tables are flattened to
//! text and then go through [`sanitize`](crate::sanitize) like any other
//! output:
//!
//! ```text
//!  Known peers
//! +------------+
//! | AS         |
//! +------------+
//! | 4242420266 |
//! | 4242420276 |
//! +------------+
//! ```

use core::fmt;

/// Horizontal alignment of a column.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Justify {
    /// Pad on the right.
    #[default]
    Left,

    /// Pad on the left.
    Right,
}

/// Table column.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Column {
    header: String,
    justify: Justify,
}

/// Text table with an optional title.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    title: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Add a column.
    pub fn column(mut self, header: impl Into<String>, justify: Justify) -> Self {
        self.columns.push(Column {
            header: header.into(),
            justify,
        });
        self
    }

    /// Add a row. Missing cells render empty; extra cells are dropped.
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.columns.len())
            .map(Into::into)
            .collect();

        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
        self
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Does the table have no rows?
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of each column in characters.
    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain([column.header.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();

        if let Some(title) = &self.title {
            // `| ` + cell + ` ` per column, plus the closing `|`
            let total = widths
                .iter()
                .fold(1usize, |acc, width| acc.saturating_add(width.saturating_add(3)));
            let pad = total.saturating_sub(title.chars().count()) / 2;
            writeln!(f, "{:pad$}{title}", "")?;
        }

        write_ruler(f, &widths)?;
        write_cells(
            f,
            &widths,
            self.columns
                .iter()
                .map(|column| (column.header.as_str(), Justify::Left)),
        )?;
        write_ruler(f, &widths)?;

        for row in &self.rows {
            write_cells(
                f,
                &widths,
                row.iter()
                    .zip(&self.columns)
                    .map(|(cell, column)| (cell.as_str(), column.justify)),
            )?;
        }

        write_ruler(f, &widths)
    }
}

fn write_ruler(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    f.write_str("+")?;
    for width in widths {
        write!(f, "{:-<width$}+", "", width = width.saturating_add(2))?;
    }
    writeln!(f)
}

fn write_cells<'a>(
    f: &mut fmt::Formatter<'_>,
    widths: &[usize],
    cells: impl Iterator<Item = (&'a str, Justify)>,
) -> fmt::Result {
    f.write_str("|")?;
    for ((cell, justify), width) in cells.zip(widths) {
        match justify {
            Justify::Left => write!(f, " {cell:<width$} |")?,
            Justify::Right => write!(f, " {cell:>width$} |")?,
        }
    }
    writeln!(f)
}
