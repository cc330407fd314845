use crate::{
    page::{Notice, PageView},
    presenter::{Cell, DetailsTable},
};

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn cell_html(cell: &Cell) -> String {
    match cell {
        Cell::Text { text } => html_escape(text),
        Cell::Link { href, label } => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            html_escape(href),
            html_escape(label)
        ),
        Cell::Images { images } => images
            .iter()
            .map(|image| {
                format!(
                    "<img src=\"{}\" width=\"{w}\" style=\"width:{w}px\" alt=\"\">",
                    html_escape(&image.src),
                    w = image.width_px
                )
            })
            .collect::<Vec<_>>()
            .join(""),
    }
}

/// `<table>` element for the details table; the body is empty while hidden
pub fn table_html(table: &DetailsTable) -> String {
    let mut out = String::new();
    if table.is_visible() {
        out.push_str("<table id=\"claimDetails\">");
    } else {
        out.push_str("<table id=\"claimDetails\" style=\"display:none\">");
    }
    out.push_str("<thead><tr><th>Field</th><th>Value</th></tr></thead><tbody>");
    for row in table.rows() {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            html_escape(&row.field),
            cell_html(&row.cell)
        ));
    }
    out.push_str("</tbody></table>");
    out
}

fn notice_html(notice: &Notice) -> String {
    let class = if notice.is_success() {
        "notice success"
    } else {
        "notice error"
    };
    format!(
        "<div class=\"{class}\" role=\"alert\">{}</div>",
        html_escape(&notice.to_string())
    )
}

/// Full HTML document for a page view.
///
/// Selecting a claim reloads `/?claim=<id>`, processing posts the selection to `/process`.
pub fn page_html(view: &PageView) -> String {
    let selected = view.selected.as_deref().unwrap_or_default();
    let mut out = String::from("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    out.push_str("<title>Insurance Claims</title></head><body>");
    out.push_str("<h1>Insurance Claims</h1>");

    if let Some(err) = &view.load_error {
        out.push_str(&format!(
            "<div class=\"notice error\" role=\"alert\">Claims are unavailable: {}</div>",
            html_escape(&err.to_string())
        ));
        out.push_str("<form method=\"post\" action=\"/reload\">");
        out.push_str("<button type=\"submit\">Retry</button></form>");
    }
    if let Some(notice) = &view.notice {
        out.push_str(&notice_html(notice));
    }

    out.push_str("<form method=\"get\" action=\"/\">");
    out.push_str("<select id=\"claimSelect\" name=\"claim\" onchange=\"this.form.submit()\">");
    for option in view.selection.options() {
        let marker = if option.value == selected { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{marker}>{}</option>",
            html_escape(&option.value),
            html_escape(&option.label)
        ));
    }
    out.push_str("</select><noscript><button type=\"submit\">Show</button></noscript></form>");

    out.push_str("<form method=\"post\" action=\"/process\">");
    out.push_str(&format!(
        "<input type=\"hidden\" name=\"claimNumber\" value=\"{}\">",
        html_escape(selected)
    ));
    // An empty selection still submits, so the validation notice is shown
    let disabled = if !view.process_enabled && view.selected.is_some() {
        " disabled"
    } else {
        ""
    };
    out.push_str(&format!(
        "<button id=\"processClaim\" type=\"submit\"{disabled}>Process Claim</button></form>"
    ));

    out.push_str(&table_html(&view.table));
    out.push_str("</body></html>");
    out
}

/// Plain-text rendering of a details table, one `field: value` line per row
pub fn table_text(table: &DetailsTable) -> String {
    let width = table
        .rows()
        .iter()
        .map(|row| row.field.chars().count())
        .max()
        .unwrap_or(0);

    table
        .rows()
        .iter()
        .map(|row| {
            let value = match &row.cell {
                Cell::Text { text } => text.clone(),
                Cell::Link { href, label } => format!("{label} <{href}>"),
                Cell::Images { images } => images
                    .iter()
                    .map(|image| image.src.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            format!("{:<width$}  {}", row.field, value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{claim::Claim, loader::SelectionControl, schema::ClaimSchema};
    use serde_json::json;

    fn table(value: serde_json::Value) -> DetailsTable {
        let claim: Claim = serde_json::from_value(value).unwrap();
        DetailsTable::for_claim(&claim, &ClaimSchema::default())
    }

    #[test]
    fn test_link_and_thumbnails_markup() {
        let html = table_html(&table(json!({
            "receiptImage": "http://x/r.pdf",
            "beforeIncidentImages": ["http://x/a.jpg", "http://x/b.jpg"]
        })));

        assert!(html.contains(
            "<a href=\"http://x/r.pdf\" target=\"_blank\" rel=\"noopener\">View File</a>"
        ));
        assert_eq!(html.matches("<img ").count(), 2);
        assert!(html.contains("src=\"http://x/a.jpg\" width=\"100\" style=\"width:100px\""));
        assert!(html.contains("src=\"http://x/b.jpg\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = table_html(&table(json!({"note": "<script>alert('x')</script>"})));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_hidden_table_has_empty_body() {
        let html = table_html(&DetailsTable::hidden());
        assert!(html.contains("style=\"display:none\""));
        assert!(html.contains("<tbody></tbody>"));
    }

    #[test]
    fn test_page_marks_selected_option() {
        let claims: Vec<Claim> =
            serde_json::from_value(json!([{"claimNumber": "C1"}, {"claimNumber": "C2"}])).unwrap();
        let view = PageView {
            selection: SelectionControl::from_claims(&claims, "claimNumber"),
            selected: Some("C2".to_string()),
            table: DetailsTable::for_claim(&claims[1], &ClaimSchema::default()),
            notice: Some(Notice::NoSelection),
            load_error: None,
            process_enabled: true,
        };

        let html = page_html(&view);
        assert!(html.contains("<option value=\"C2\" selected>C2</option>"));
        assert!(html.contains("<option value=\"C1\">C1</option>"));
        assert!(html.contains("name=\"claimNumber\" value=\"C2\""));
        assert!(html.contains("Please select a claim to process"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_table_text_alignment() {
        let text = table_text(&table(json!({
            "claimNumber": "C1",
            "receiptImage": "http://x/r.pdf"
        })));
        assert_eq!(
            text,
            "claimNumber   C1\nreceiptImage  View File <http://x/r.pdf>"
        );
    }
}
