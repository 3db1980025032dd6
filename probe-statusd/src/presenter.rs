use std::fmt::Write;
use shared::protocol::{CHECKED_AT_FORMAT, FORMAT_TEXT, GLYPH_REACHABLE, GLYPH_UNREACHABLE};
use shared::types::Snapshot;

const HEADERS: [&str; 5] = ["Name", "Host", "Port", "Status", "Checked At"];
const COLUMN_SEPARATOR: &str = " | ";

/// Output encoding chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Html,
}

impl Format {
    /// Only the exact text keyword selects text; anything else, including
    /// no value at all, falls back to HTML.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(FORMAT_TEXT) => Format::Text,
            _ => Format::Html,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Text => "text/plain; charset=utf-8",
            Format::Html => "text/html; charset=utf-8",
        }
    }
}

/// One display row, already reduced to the values every format shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub reachable: bool,
    pub checked_at: String,
}

impl StatusRow {
    fn glyph(&self) -> &'static str {
        if self.reachable { GLYPH_REACHABLE } else { GLYPH_UNREACHABLE }
    }

    fn cells(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.host.clone(),
            self.port.to_string(),
            self.glyph().to_string(),
            self.checked_at.clone(),
        ]
    }
}

/// Display model of a snapshot, independent of the output encoding
#[derive(Debug, Clone)]
pub struct StatusTable {
    rows: Vec<StatusRow>,
}

impl StatusTable {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let rows = snapshot
            .results
            .values()
            .map(|r| StatusRow {
                name: r.name.clone(),
                host: r.host.clone(),
                port: r.port,
                reachable: r.reachable,
                checked_at: r.checked_at.format(CHECKED_AT_FORMAT).to_string(),
            })
            .collect();

        Self { rows }
    }

    /// Column-aligned plain table. Widths are measured in characters so the
    /// status glyph counts as one column.
    pub fn to_text(&self) -> String {
        let cells: Vec<[String; 5]> = self.rows.iter().map(StatusRow::cells).collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_row = |row: &[&str]| -> String {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| pad(cell, width))
                .collect::<Vec<_>>()
                .join(COLUMN_SEPARATOR)
        };

        let rule_len = widths.iter().sum::<usize>() + COLUMN_SEPARATOR.len() * (HEADERS.len() - 1);

        let mut out = String::new();
        out.push_str(&format_row(&HEADERS[..]));
        out.push('\n');
        out.push_str(&"-".repeat(rule_len));
        out.push('\n');
        for row in &cells {
            let row: Vec<&str> = row.iter().map(String::as_str).collect();
            out.push_str(&format_row(&row[..]));
            out.push('\n');
        }
        out
    }

    /// Standalone HTML page with a status table
    pub fn to_html(&self) -> String {
        let mut out = String::from(concat!(
            "<!DOCTYPE html>\n",
            "<html><head><meta charset=\"utf-8\"><title>Connection Status</title></head><body>\n",
            "<h1>Live Connection Status</h1>\n",
            "<table border=\"1\" cellpadding=\"6\">\n",
            "<tr>",
        ));
        for header in HEADERS {
            let _ = write!(out, "<th>{}</th>", header);
        }
        out.push_str("</tr>\n");

        for row in &self.rows {
            let color = if row.reachable { "green" } else { "red" };
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td style=\"color:{}\">{}</td><td>{}</td></tr>",
                escape_html(&row.name),
                escape_html(&row.host),
                row.port,
                color,
                row.glyph(),
                escape_html(&row.checked_at),
            );
        }

        out.push_str("</table></body></html>\n");
        out
    }
}

/// Render a snapshot in the requested format
pub fn render(snapshot: &Snapshot, format: Format) -> String {
    let table = StatusTable::from_snapshot(snapshot);
    match format {
        Format::Text => table.to_text(),
        Format::Html => table.to_html(),
    }
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    format!("{}{}", cell, " ".repeat(fill))
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::types::ResolvedAddress;

    fn test_snapshot() -> Snapshot {
        let checked_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap();
        Snapshot::from_outcomes(
            checked_at,
            vec![
                (
                    "api".to_string(),
                    ResolvedAddress { host: "api.ns-api.svc.cluster.local".to_string(), port: 8080 },
                    true,
                ),
                (
                    "ext".to_string(),
                    ResolvedAddress { host: "example.com".to_string(), port: 443 },
                    false,
                ),
            ],
        )
    }

    fn split_cells(line: &str) -> Vec<&str> {
        line.split(" | ").map(str::trim_end).collect()
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(Format::from_param(Some("text")), Format::Text);
        assert_eq!(Format::from_param(Some("html")), Format::Html);
        assert_eq!(Format::from_param(Some("TEXT")), Format::Html);
        assert_eq!(Format::from_param(Some("")), Format::Html);
        assert_eq!(Format::from_param(None), Format::Html);
    }

    #[test]
    fn test_text_table_layout() {
        let text = render(&test_snapshot(), Format::Text);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(split_cells(lines[0]), ["Name", "Host", "Port", "Status", "Checked At"]);
        assert_eq!(
            split_cells(lines[2]),
            ["api", "api.ns-api.svc.cluster.local", "8080", "✅", "12:34:56"]
        );
        assert_eq!(split_cells(lines[3]), ["ext", "example.com", "443", "❌", "12:34:56"]);

        // Name 4, Host 28, Port 4, Status 6, Checked At 10, plus 4 separators
        let expected_width = 4 + 28 + 4 + 6 + 10 + 3 * 4;
        assert_eq!(lines[1], "-".repeat(expected_width));
        for line in &lines {
            assert_eq!(line.chars().count(), expected_width);
        }
    }

    #[test]
    fn test_text_empty_snapshot_has_header_only() {
        let empty = Snapshot::from_outcomes(Utc::now(), Vec::new());
        let text = render(&empty, Format::Text);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, ["Name | Host | Port | Status | Checked At", "-".repeat(40).as_str()]);
    }

    #[test]
    fn test_html_colors_status() {
        let html = render(&test_snapshot(), Format::Html);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<td style=\"color:green\">✅</td>"));
        assert!(html.contains("<td style=\"color:red\">❌</td>"));
        assert!(html.contains("<th>Checked At</th>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_escapes_cells() {
        let snapshot = Snapshot::from_outcomes(
            Utc::now(),
            vec![(
                "<b>x</b>".to_string(),
                ResolvedAddress { host: "a&b".to_string(), port: 1 },
                true,
            )],
        );
        let html = render(&snapshot, Format::Html);

        assert!(html.contains("<td>&lt;b&gt;x&lt;/b&gt;</td>"));
        assert!(html.contains("<td>a&amp;b</td>"));
        assert!(!html.contains("<b>x</b>"));
    }

    #[test]
    fn test_formats_carry_same_rows() {
        let snapshot = test_snapshot();
        let table = StatusTable::from_snapshot(&snapshot);
        let text = table.to_text();
        let html = table.to_html();

        let text_rows: Vec<Vec<&str>> = text.lines().skip(2).map(split_cells).collect();
        let html_rows: Vec<&str> = html.lines().filter(|l| l.starts_with("<tr><td>")).collect();
        assert_eq!(text_rows.len(), table.rows.len());
        assert_eq!(html_rows.len(), table.rows.len());

        for ((row, text_row), html_row) in table.rows.iter().zip(&text_rows).zip(&html_rows) {
            let port = row.port.to_string();
            assert_eq!(text_row[..3], [row.name.as_str(), row.host.as_str(), port.as_str()]);
            assert_eq!(text_row[3], row.glyph());
            assert_eq!(text_row[4], row.checked_at);

            for value in [&row.name, &row.host, &port, &row.checked_at] {
                assert!(html_row.contains(&format!("<td>{}</td>", value)));
            }
            assert!(html_row.contains(row.glyph()));
        }
    }
}
