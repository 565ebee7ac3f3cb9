use crate::issues::catalog::Issue;
use crate::report::model::Report;

/// Renders a report as an aligned plain-text table, one row per finding.
///
/// Multi-line details continue on following rows under the DETAILS column.
pub fn render_text(report: &Report) -> String {
    if report.is_empty() {
        return "No issues found.\n".to_string();
    }

    let mut rows = Vec::with_capacity(report.finding_count());
    for entry in report {
        for finding in &entry.issues {
            rows.push([
                entry.id().to_string(),
                finding.issue_type.to_string(),
                finding.severity.to_string(),
                finding.details.clone(),
            ]);
        }
    }

    let mut out = table(["ID", "ISSUE", "SEVERITY", "DETAILS"], &rows);
    out.push_str(&format!(
        "\n{} machine(s), {} issue(s)\n",
        report.len(),
        report.finding_count()
    ));
    out
}

/// Renders catalog entries as a plain-text table.
pub fn render_catalog(issues: &[Issue]) -> String {
    let rows: Vec<[String; 4]> = issues
        .iter()
        .map(|i| {
            [
                i.issue_type.to_string(),
                i.severity.to_string(),
                i.description.clone(),
                i.ref_url.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(["ID", "SEVERITY", "DESCRIPTION", "REF URL"], &rows)
}

fn table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            let longest = cell.lines().map(str::len).max().unwrap_or(0);
            *w = (*w).max(longest);
        }
    }

    let mut out = String::new();
    push_row(&mut out, &widths, &header.map(str::to_string));
    for row in rows {
        push_row(&mut out, &widths, row);
    }
    out
}

fn push_row<const N: usize>(out: &mut String, widths: &[usize; N], row: &[String; N]) {
    let last = &row[N - 1];
    let mut continuation = last.lines();
    let first_last = continuation.next().unwrap_or_default();

    let mut line = String::new();
    for (cell, w) in row[..N - 1].iter().zip(widths.iter().copied()) {
        line.push_str(&format!("{cell:<w$}  "));
    }
    line.push_str(first_last);
    out.push_str(line.trim_end());
    out.push('\n');

    let indent: usize = widths[..N - 1].iter().map(|w| w + 2).sum();
    for more in continuation {
        out.push_str(&format!("{:indent$}{more}\n", ""));
    }
}
