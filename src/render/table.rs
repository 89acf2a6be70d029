//! `tbl` directive: grid and simple tables.
//!
//! Grid tables support row and column spans:
//!
//! ```text
//! +-----+-----+
//! | a   | b   |
//! +=====+=====+      <- optional head/body separator
//! | spans two |
//! +-----+-----+
//! ```
//!
//! Simple tables are column-aligned text between `=` border lines:
//!
//! ```text
//! =====  =====
//! head   head
//! =====  =====
//! 1      one
//! =====  =====
//! ```

use std::collections::{BTreeMap, BTreeSet};

/// One table cell. Spans count the *extra* rows/columns covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub more_rows: usize,
    pub more_cols: usize,
    pub text: String,
}

/// A row; `None` marks a slot covered by a spanning cell.
pub type Row = Vec<Option<Cell>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: usize,
    pub head: Vec<Row>,
    pub body: Vec<Row>,
}

/// Parse as a grid table, falling back to a simple table.
pub fn parse(content: &str) -> Option<Table> {
    parse_grid(content).or_else(|| parse_simple(content))
}

/// Column alignment from a `cols` spec character.
pub fn alignment(cols: &str, column: usize) -> &'static str {
    match cols.chars().nth(column) {
        Some('l') => "left",
        Some('r') => "right",
        _ => "center",
    }
}

// ============================================================================
// grid tables
// ============================================================================

pub fn parse_grid(content: &str) -> Option<Table> {
    let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
    if lines.len() < 3 || !lines.iter().all(|l| l.starts_with(['+', '|'])) {
        return None;
    }

    let head_sep = lines
        .iter()
        .position(|l| l.starts_with("+=") && l.chars().all(|c| matches!(c, '+' | '=')));
    let width = lines.iter().map(|l| l.chars().count()).max()?;
    let grid: Vec<Vec<char>> = lines
        .iter()
        .map(|l| {
            let mut row: Vec<char> = l.replace('=', "-").chars().collect();
            row.resize(width, ' ');
            row
        })
        .collect();

    let scanner = GridScanner::new(&grid);
    let cells = scanner.scan()?;
    Some(assemble(cells, head_sep))
}

struct ScannedCell {
    top: usize,
    left: usize,
    bottom: usize,
    right: usize,
    text: String,
}

struct GridScanner<'g> {
    grid: &'g [Vec<char>],
    bottom: usize,
    right: usize,
}

impl<'g> GridScanner<'g> {
    fn new(grid: &'g [Vec<char>]) -> Self {
        Self {
            grid,
            bottom: grid.len() - 1,
            right: grid[0].len() - 1,
        }
    }

    fn at(&self, row: usize, col: usize) -> char {
        self.grid[row][col]
    }

    /// Walk cell corners from the top-left, tracing each cell clockwise.
    fn scan(&self) -> Option<Vec<ScannedCell>> {
        if self.at(0, 0) != '+' {
            return None;
        }
        let mut done: Vec<isize> = vec![-1; self.right + 1];
        let mut corners = vec![(0usize, 0usize)];
        let mut cells = Vec::new();

        while !corners.is_empty() {
            let (top, left) = corners.remove(0);
            if top == self.bottom || left == self.right || top as isize <= done[left] {
                continue;
            }
            let Some((bottom, right)) = self.scan_right(top, left) else {
                continue;
            };
            for slot in &mut done[left..right] {
                if *slot != top as isize - 1 {
                    return None;
                }
                *slot = bottom as isize - 1;
            }
            cells.push(ScannedCell {
                top,
                left,
                bottom,
                right,
                text: self.cell_text(top, left, bottom, right),
            });
            corners.push((top, right));
            corners.push((bottom, left));
            corners.sort_unstable();
        }

        let complete = done[..self.right]
            .iter()
            .all(|d| *d == self.bottom as isize - 1);
        complete.then_some(cells)
    }

    fn scan_right(&self, top: usize, left: usize) -> Option<(usize, usize)> {
        for col in left + 1..=self.right {
            match self.at(top, col) {
                '+' => {
                    if let Some(bottom) = self.scan_down(top, left, col) {
                        return Some((bottom, col));
                    }
                }
                '-' => {}
                _ => return None,
            }
        }
        None
    }

    fn scan_down(&self, top: usize, left: usize, right: usize) -> Option<usize> {
        for row in top + 1..=self.bottom {
            match self.at(row, right) {
                '+' => {
                    if self.scan_left(top, left, row, right) {
                        return Some(row);
                    }
                }
                '|' => {}
                _ => return None,
            }
        }
        None
    }

    fn scan_left(&self, top: usize, left: usize, bottom: usize, right: usize) -> bool {
        let bottom_edge = (left + 1..right).all(|col| matches!(self.at(bottom, col), '+' | '-'));
        bottom_edge && self.at(bottom, left) == '+' && self.scan_up(top, left, bottom)
    }

    fn scan_up(&self, top: usize, left: usize, bottom: usize) -> bool {
        (top + 1..bottom).all(|row| matches!(self.at(row, left), '+' | '|'))
    }

    fn cell_text(&self, top: usize, left: usize, bottom: usize, right: usize) -> String {
        let lines: Vec<String> = (top + 1..bottom)
            .map(|row| self.grid[row][left + 1..right].iter().collect::<String>())
            .collect();
        block_text(&lines)
    }
}

/// Map scanned cell rectangles onto row/column indices.
fn assemble(cells: Vec<ScannedCell>, head_sep: Option<usize>) -> Table {
    let mut row_edges = BTreeSet::new();
    let mut col_edges = BTreeSet::new();
    for cell in &cells {
        row_edges.extend([cell.top, cell.bottom]);
        col_edges.extend([cell.left, cell.right]);
    }
    let row_index: BTreeMap<usize, usize> = row_edges.into_iter().enumerate().map(|(i, k)| (k, i)).collect();
    let col_index: BTreeMap<usize, usize> = col_edges.into_iter().enumerate().map(|(i, k)| (k, i)).collect();

    let rows = row_index.len().saturating_sub(1);
    let columns = col_index.len().saturating_sub(1);
    let mut grid: Vec<Row> = vec![vec![None; columns]; rows];

    for cell in cells {
        let row = row_index[&cell.top];
        let col = col_index[&cell.left];
        grid[row][col] = Some(Cell {
            more_rows: row_index[&cell.bottom] - row - 1,
            more_cols: col_index[&cell.right] - col - 1,
            text: cell.text,
        });
    }

    let head_rows = head_sep
        .and_then(|sep| row_index.get(&sep).copied())
        .unwrap_or(0);
    let body = grid.split_off(head_rows.min(grid.len()));
    Table {
        columns,
        head: grid,
        body,
    }
}

// ============================================================================
// simple tables
// ============================================================================

pub fn parse_simple(content: &str) -> Option<Table> {
    let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
    let is_border = |l: &str| !l.is_empty() && l.starts_with('=') && l.chars().all(|c| c == '=' || c == ' ');

    let first = *lines.first()?;
    if !is_border(first) {
        return None;
    }
    let starts = column_starts(first);
    let borders: Vec<usize> = lines
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, l)| is_border(l))
        .map(|(i, _)| i)
        .collect();
    if borders.len() < 2 || *borders.last()? != lines.len() - 1 {
        return None;
    }

    let (head_lines, body_lines) = if borders.len() >= 3 {
        (&lines[1..borders[1]], &lines[borders[1] + 1..lines.len() - 1])
    } else {
        (&lines[1..1], &lines[1..lines.len() - 1])
    };

    Some(Table {
        columns: starts.len(),
        head: simple_rows(head_lines, &starts),
        body: simple_rows(body_lines, &starts),
    })
}

/// Byte offsets where each `=` run starts.
fn column_starts(border: &str) -> Vec<usize> {
    let bytes = border.as_bytes();
    (0..bytes.len())
        .filter(|&i| bytes[i] == b'=' && (i == 0 || bytes[i - 1] == b' '))
        .collect()
}

/// Group lines into rows. A line with an empty first column continues the
/// previous row; blank lines separate rows.
fn simple_rows(lines: &[&str], starts: &[usize]) -> Vec<Row> {
    let mut rows: Vec<Vec<Vec<String>>> = Vec::new();
    let mut open = false;

    for line in lines {
        if line.trim().is_empty() {
            open = false;
            continue;
        }
        if line.starts_with('=') {
            continue;
        }
        let parts = slice_columns(line, starts);
        let continues = open && parts[0].trim().is_empty();
        match rows.last_mut() {
            Some(row) if continues => {
                for (cell, part) in row.iter_mut().zip(parts) {
                    cell.push(part);
                }
            }
            _ => rows.push(parts.into_iter().map(|p| vec![p]).collect()),
        }
        open = true;
    }

    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|lines| {
                    Some(Cell {
                        more_rows: 0,
                        more_cols: 0,
                        text: block_text(&lines),
                    })
                })
                .collect()
        })
        .collect()
}

fn slice_columns(line: &str, starts: &[usize]) -> Vec<String> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = if i + 1 < starts.len() {
                starts[i + 1].min(line.len())
            } else {
                line.len()
            };
            line.get(start.min(line.len())..end).unwrap_or("").to_string()
        })
        .collect()
}

/// Trim and dedent the lines of one cell.
fn block_text(lines: &[String]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

// ============================================================================
// writers
// ============================================================================

/// HTML table inside a labelled `div`. `inline` renders cell text.
pub fn to_html(
    table: &Table,
    label: Option<&str>,
    cols: &str,
    caption: &str,
    inline: &mut dyn FnMut(&str) -> String,
) -> String {
    let id = label.map(|l| format!(" id=\"tbl:{l}\"")).unwrap_or_default();
    let mut out = format!("<div{id} class=\"docutils-extensions tbl\">\n<table>\n");
    for (tag, rows) in [("th", &table.head), ("td", &table.body)] {
        for row in rows {
            out.push_str("<tr>\n");
            for (col, cell) in row.iter().enumerate() {
                let Some(cell) = cell else { continue };
                let rowspan = span_attr("rowspan", cell.more_rows);
                let colspan = span_attr("colspan", cell.more_cols);
                out.push_str(&format!(
                    "<{tag}{rowspan}{colspan} style=\"text-align:{}\">\n{}\n</{tag}>\n",
                    alignment(cols, col),
                    inline(&cell.text)
                ));
            }
            out.push_str("</tr>\n");
        }
    }
    if !caption.is_empty() {
        out.push_str(&format!("<caption>{caption}</caption>\n"));
    }
    out.push_str("</table>\n</div>\n");
    out
}

fn span_attr(name: &str, extra: usize) -> String {
    if extra > 0 {
        format!(" {name}=\"{}\"", extra + 1)
    } else {
        String::new()
    }
}

/// LaTeX `table` float with `multicolumn`/`multirow` spans.
pub fn to_latex(
    table: &Table,
    label: Option<&str>,
    cols: &str,
    caption: &str,
    inline: &mut dyn FnMut(&str) -> String,
) -> String {
    let spec = (0..table.columns)
        .map(|col| &alignment(cols, col)[..1])
        .collect::<Vec<_>>()
        .join("|");
    let mut out = format!("\\begin{{table}}[h]\n\\centering\n\\begin{{tabular}}{{|{spec}|}}\n\\hline\n");

    let head_len = table.head.len();
    for (index, row) in table.head.iter().chain(&table.body).enumerate() {
        let mut cells = Vec::new();
        let mut col = 0;
        while col < row.len() {
            match &row[col] {
                Some(cell) => {
                    let mut text = inline(&cell.text);
                    if index < head_len {
                        text = format!("\\textbf{{{text}}}");
                    }
                    if cell.more_rows > 0 {
                        text = format!("\\multirow{{{}}}{{*}}{{{text}}}", cell.more_rows + 1);
                    }
                    if cell.more_cols > 0 {
                        let align = &alignment(cols, col)[..1];
                        text = format!("\\multicolumn{{{}}}{{|{align}|}}{{{text}}}", cell.more_cols + 1);
                    }
                    col += cell.more_cols + 1;
                    cells.push(text);
                }
                None => {
                    cells.push(String::new());
                    col += 1;
                }
            }
        }
        out.push_str(&cells.join(" & "));
        out.push_str(" \\\\\n\\hline\n");
    }

    out.push_str("\\end{tabular}\n");
    if !caption.is_empty() {
        out.push_str(&format!("\\caption{{{caption}}}\n"));
    }
    if let Some(label) = label {
        out.push_str(&format!("\\label{{tbl:{label}}}\n"));
    }
    out.push_str("\\end{table}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = "\
+------+------+
| a    | b    |
+======+======+
| spans both  |
+------+------+
| c    | d    |
|      |      |
+------+------+";

    fn cell(text: &str) -> Option<Cell> {
        Some(Cell {
            more_rows: 0,
            more_cols: 0,
            text: text.to_string(),
        })
    }

    #[test]
    fn test_grid_with_head_and_colspan() {
        let table = parse(GRID).unwrap();
        assert_eq!(table.columns, 2);
        assert_eq!(table.head, vec![vec![cell("a"), cell("b")]]);
        assert_eq!(table.body.len(), 2);
        assert_eq!(
            table.body[0][0],
            Some(Cell {
                more_rows: 0,
                more_cols: 1,
                text: "spans both".to_string()
            })
        );
        assert_eq!(table.body[0][1], None);
        assert_eq!(table.body[1], vec![cell("c"), cell("d")]);
    }

    #[test]
    fn test_grid_rowspan() {
        let source = "\
+---+---+
| a | b |
+   +---+
|   | c |
+---+---+";
        let table = parse_grid(source).unwrap();
        assert!(table.head.is_empty());
        assert_eq!(table.body[0][0].as_ref().map(|c| c.more_rows), Some(1));
        assert_eq!(table.body[1], vec![None, cell("c")]);
    }

    #[test]
    fn test_grid_rejects_broken() {
        assert!(parse_grid("+---+\n| a\n+--").is_none());
        assert!(parse_grid("plain text").is_none());
    }

    #[test]
    fn test_simple_table() {
        let source = "\
=====  =========
Name   Value
=====  =========
pi     3.14
e      2.71
       (approx)
=====  =========";
        let table = parse(source).unwrap();
        assert_eq!(table.columns, 2);
        assert_eq!(table.head, vec![vec![cell("Name"), cell("Value")]]);
        assert_eq!(table.body.len(), 2);
        assert_eq!(table.body[1][1], cell("2.71\n(approx)"));
    }

    #[test]
    fn test_html_output() {
        let table = parse(GRID).unwrap();
        let html = to_html(&table, Some("demo"), "lr", "Caption", &mut |t: &str| t.to_uppercase());
        assert!(html.starts_with("<div id=\"tbl:demo\" class=\"docutils-extensions tbl\">\n<table>\n"));
        assert!(html.contains("<th style=\"text-align:left\">\nA\n</th>"));
        assert!(html.contains("<td colspan=\"2\" style=\"text-align:left\">\nSPANS BOTH\n</td>"));
        assert!(html.contains("<td style=\"text-align:right\">\nD\n</td>"));
        assert!(html.ends_with("<caption>Caption</caption>\n</table>\n</div>\n"));
    }

    #[test]
    fn test_latex_output() {
        let table = parse(GRID).unwrap();
        let latex = to_latex(&table, None, "", "", &mut |t: &str| t.to_string());
        assert!(latex.contains("\\begin{tabular}{|c|c|}"));
        assert!(latex.contains("\\textbf{a} & \\textbf{b} \\\\"));
        assert!(latex.contains("\\multicolumn{2}{|c|}{spans both} \\\\"));
    }
}
