//! Presentation layer: pure functions from store state to HTML strings.
//! Everything user-supplied is escaped before it reaches the output.

use crate::charts;
use crate::model::{ConnectionMode, Request, RequestStatus, StatusCounts};
use crate::mutation::Notices;
use crate::store::{CollectionBrowser, RequestStore, StatusFilter};
use chrono::{DateTime, Datelike, Timelike, Utc};

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn html_attr(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

/// `YYYY-MM-DD` (or a full ISO timestamp) to `DD/MM/YYYY`; anything
/// unparseable is shown as-is, absence as a placeholder.
pub fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date else {
        return "--/--/----".to_string();
    };
    let day_part = raw.split('T').next().unwrap_or(raw);
    let parts: Vec<&str> = day_part.split('-').collect();
    if parts.len() != 3 {
        return raw.to_string();
    }
    format!("{}/{}/{}", parts[2], parts[1], parts[0])
}

pub fn format_timestamp(when: DateTime<Utc>) -> String {
    format!(
        "{:02}/{:02}/{} {:02}:{:02}",
        when.day(),
        when.month(),
        when.year(),
        when.hour(),
        when.minute()
    )
}

pub fn format_clock(when: DateTime<Utc>) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        when.hour(),
        when.minute(),
        when.second()
    )
}

fn or_placeholder<'a>(field: Option<&'a String>, placeholder: &'a str) -> &'a str {
    field.map(String::as_str).unwrap_or(placeholder)
}

pub fn status_badge(status: RequestStatus) -> String {
    format!(
        "<span class=\"badge badge--{}\">{}</span>",
        status.as_str(),
        status.as_str().to_uppercase()
    )
}

pub fn connection_indicator(mode: ConnectionMode) -> String {
    match mode {
        ConnectionMode::Live => {
            "<span class=\"indicator indicator--live\">CONNECTED</span>".to_string()
        }
        ConnectionMode::Local => {
            "<span class=\"indicator indicator--local\">LOCAL MODE</span>".to_string()
        }
    }
}

pub fn local_banner(mode: ConnectionMode) -> String {
    if mode.is_local() {
        "<div class=\"banner banner--local\">SHOWING SAMPLE DATA — DATA API NOT CONFIGURED</div>\n"
            .to_string()
    } else {
        String::new()
    }
}

pub fn stat_counters(counts: &StatusCounts) -> String {
    format!(
        "<div class=\"stats\">\
<div class=\"stat\"><span class=\"stat__label\">TOTAL</span><span class=\"stat__value\">{}</span></div>\
<div class=\"stat\"><span class=\"stat__label\">PENDING</span><span class=\"stat__value\">{}</span></div>\
<div class=\"stat\"><span class=\"stat__label\">CONFIRMED</span><span class=\"stat__value\">{}</span></div>\
<div class=\"stat\"><span class=\"stat__label\">DENIED</span><span class=\"stat__value\">{}</span></div>\
</div>",
        counts.total, counts.pending, counts.confirmed, counts.denied
    )
}

pub fn filter_buttons(active: StatusFilter) -> String {
    let mut html = String::from("<div class=\"filters\">");
    let options: [(StatusFilter, &str); 4] = [
        (StatusFilter::All, "ALL"),
        (StatusFilter::Only(RequestStatus::Pending), "PENDING"),
        (StatusFilter::Only(RequestStatus::Confirmed), "CONFIRMED"),
        (StatusFilter::Only(RequestStatus::Denied), "DENIED"),
    ];
    for (filter, label) in options {
        let class = if filter == active {
            "filters__btn filters__btn--active"
        } else {
            "filters__btn"
        };
        html.push_str(&format!("<button class=\"{class}\">{label}</button>"));
    }
    html.push_str("</div>");
    html
}

fn request_row(r: &Request, fresh: bool) -> String {
    let mut classes = String::from("row");
    if r.status == RequestStatus::Denied {
        classes.push_str(" row--denied");
    }
    if fresh {
        classes.push_str(" row--fresh");
    }
    let actions = if r.status == RequestStatus::Pending {
        "<button class=\"btn-action\">CONFIRM</button><button class=\"btn-action\">DENY</button>"
            .to_string()
    } else {
        "<button class=\"btn-action\" disabled>---</button>".to_string()
    };
    format!(
        "<tr class=\"{classes}\" data-id=\"{id}\">\
<td class=\"cell-id\" title=\"{id}\">{short}</td>\
<td>{name}</td>\
<td>{date} {time}</td>\
<td>{service}</td>\
<td>{badge}</td>\
<td><div class=\"actions\">{actions}</div></td>\
</tr>",
        id = html_attr(&r.id),
        short = html_escape(r.short_id()),
        name = html_escape(or_placeholder(r.client_name.as_ref(), "no name")),
        date = format_date(r.requested_date.as_deref()),
        time = html_escape(or_placeholder(r.requested_time.as_ref(), "--:--")),
        service = html_escape(or_placeholder(r.service_name.as_ref(), "no service")),
        badge = status_badge(r.status),
    )
}

pub fn request_table(store: &RequestStore) -> String {
    let rows = store.page_slice();
    if rows.is_empty() {
        let filter_tag = match store.filter() {
            StatusFilter::All => String::new(),
            StatusFilter::Only(status) => {
                format!(" [ {} ]", status.as_str().to_uppercase())
            }
        };
        return format!(
            "<table class=\"requests\"><tbody><tr><td colspan=\"6\" class=\"table-empty\">NO REQUESTS{filter_tag}</td></tr></tbody></table>"
        );
    }

    let mut html = String::from(
        "<table class=\"requests\"><thead><tr>\
<th>ID</th><th>CLIENT</th><th>DATE</th><th>SERVICE</th><th>STATUS</th><th>ACTIONS</th>\
</tr></thead><tbody>",
    );
    for r in rows {
        html.push_str(&request_row(r, store.is_fresh(&r.id)));
    }
    html.push_str("</tbody></table>");
    html
}

pub fn pagination(page: usize, page_count: usize) -> String {
    let prev_disabled = if page <= 1 { " disabled" } else { "" };
    let next_disabled = if page >= page_count { " disabled" } else { "" };
    format!(
        "<div class=\"pager\">\
<button class=\"pager__btn\"{prev_disabled}>PREV</button>\
<span class=\"pager__page\">PAGE {page} / {page_count}</span>\
<button class=\"pager__btn\"{next_disabled}>NEXT</button>\
</div>"
    )
}

pub fn detail_panel(r: &Request) -> String {
    let fields: Vec<(&str, String)> = vec![
        ("ID", html_escape(&r.id)),
        (
            "CLIENT",
            html_escape(or_placeholder(r.client_name.as_ref(), "no name")),
        ),
        (
            "PHONE",
            html_escape(or_placeholder(r.client_phone.as_ref(), "unavailable")),
        ),
        (
            "SERVICE",
            html_escape(or_placeholder(r.service_name.as_ref(), "no service")),
        ),
        (
            "REQUESTED FOR",
            format!(
                "{} {}",
                html_escape(&format_date(r.requested_date.as_deref())),
                html_escape(or_placeholder(r.requested_time.as_ref(), "--:--"))
            ),
        ),
        ("STATUS", status_badge(r.status)),
        (
            "ORIGINAL MESSAGE",
            html_escape(or_placeholder(r.original_message.as_ref(), "no message")),
        ),
        (
            "SOURCE CHANNEL",
            html_escape(or_placeholder(r.source_channel_id.as_ref(), "unavailable")),
        ),
        ("CREATED", format_timestamp(r.created_at)),
        (
            "LAST UPDATED",
            r.updated_at
                .map(format_timestamp)
                .unwrap_or_else(|| "never updated".to_string()),
        ),
    ];

    let mut html = String::from("<div class=\"detail\">");
    for (label, value) in fields {
        html.push_str(&format!(
            "<div class=\"detail__field\"><div class=\"detail__label\">{label}</div><div class=\"detail__value\">{value}</div></div>"
        ));
    }
    html.push_str("</div>");
    html
}

pub fn notices_html(notices: &Notices) -> String {
    let mut html = String::new();
    for notice in notices.iter() {
        html.push_str(&format!(
            "<div class=\"error-msg\">[ERROR] {}</div>\n",
            html_escape(&notice.message)
        ));
    }
    html
}

fn value_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "—".to_string(),
        Some(serde_json::Value::String(s)) => html_escape(s),
        Some(other) => html_escape(&other.to_string()),
    }
}

/// Table for a secondary collection; columns follow the configured field
/// list, which is presentation metadata only.
pub fn collection_table(browser: &CollectionBrowser, fields: &[String]) -> String {
    let rows = browser.page_slice();
    if rows.is_empty() {
        return format!(
            "<table class=\"documents\"><tbody><tr><td colspan=\"{}\" class=\"table-empty\">NO DOCUMENTS</td></tr></tbody></table>",
            fields.len() + 1
        );
    }

    let mut html = String::from("<table class=\"documents\"><thead><tr><th>ID</th>");
    for field in fields {
        html.push_str(&format!("<th>{}</th>", html_escape(&field.to_uppercase())));
    }
    html.push_str("</tr></thead><tbody>");
    for doc in rows {
        let id = doc.get("_id").and_then(|v| v.as_str()).unwrap_or("—");
        html.push_str(&format!("<tr><td class=\"cell-id\">{}</td>", html_escape(id)));
        for field in fields {
            html.push_str(&format!("<td>{}</td>", value_cell(doc.get(field))));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn page_shell(title: &str, mode: ConnectionMode, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="static/style.css">
  </head>
  <body>
    <header>
      <h1>{title}</h1>
      {indicator}
    </header>
    {banner}<main>
      {body}
    </main>
  </body>
</html>"#,
        title = html_escape(title),
        indicator = connection_indicator(mode),
        banner = local_banner(mode),
    )
}

/// The full dashboard page: stats, filters, table, pager, charts, notices,
/// last-refresh footer.
pub fn dashboard_page(
    store: &RequestStore,
    notices: &Notices,
    mode: ConnectionMode,
    now: DateTime<Utc>,
) -> String {
    let counts = store.counts();
    let refreshed = store
        .last_refreshed()
        .map(format_clock)
        .unwrap_or_else(|| "--:--:--".to_string());
    let body = format!(
        "{notices}{stats}\n{filters}\n{table}\n{pager}\n\
<section class=\"charts\">\
<div class=\"chart\"><h2>REQUESTS / DAY</h2>{bars}</div>\
<div class=\"chart\"><h2>STATUS DISTRIBUTION</h2>{dist}</div>\
</section>\n\
<footer>LAST REFRESH {refreshed}</footer>",
        notices = notices_html(notices),
        stats = stat_counters(&counts),
        filters = filter_buttons(store.filter()),
        table = request_table(store),
        pager = pagination(store.page(), store.page_count()),
        bars = charts::weekly_bar_chart(store.documents(), now.date_naive()),
        dist = charts::status_distribution(&counts),
    );
    page_shell("ATLAS DESK", mode, &body)
}

/// Generic-document browser page for one collection.
pub fn browse_page(
    browser: &CollectionBrowser,
    fields: &[String],
    mode: ConnectionMode,
    total: u64,
) -> String {
    let body = format!(
        "<h2>{name} — {total} DOCUMENTS</h2>\n{table}\n{pager}",
        name = html_escape(&browser.collection().to_uppercase()),
        table = collection_table(browser, fields),
        pager = pagination(browser.page(), browser.page_count()),
    );
    page_shell("ATLAS DESK", mode, &body)
}

pub const DEFAULT_STYLE: &str = r#"
:root {
  --fg: #000;
  --bg: #fff;
  --surface: #f0f0f0;
}

html,
body {
  margin: 0;
  padding: 0;
  background: var(--bg);
  color: var(--fg);
  font: 13px/1.5 'JetBrains Mono', ui-monospace, monospace;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 12px 16px;
  border-bottom: 2px solid var(--fg);
}

main {
  padding: 16px;
  max-width: 960px;
  margin: 0 auto;
}

.banner--local {
  padding: 8px 16px;
  background: var(--surface);
  border-bottom: 1px solid var(--fg);
}

.indicator--local {
  text-decoration: underline;
}

.stats {
  display: flex;
  gap: 24px;
  margin-bottom: 16px;
}

.stat__label {
  display: block;
  font-size: 10px;
}

.stat__value {
  font-size: 22px;
  font-weight: 700;
}

.filters {
  margin-bottom: 12px;
}

.filters__btn--active {
  background: var(--fg);
  color: var(--bg);
}

table {
  width: 100%;
  border-collapse: collapse;
}

th,
td {
  border: 1px solid var(--fg);
  padding: 4px 8px;
  text-align: left;
}

.row--denied {
  color: #666;
  text-decoration: line-through;
}

.row--fresh {
  background: var(--surface);
}

.table-empty {
  text-align: center;
  padding: 24px;
}

.badge {
  padding: 1px 6px;
  border: 1px solid var(--fg);
}

.badge--confirmed {
  background: var(--fg);
  color: var(--bg);
}

.pager {
  margin: 12px 0;
}

.error-msg {
  border: 2px solid var(--fg);
  background: var(--surface);
  padding: 8px 12px;
  margin-bottom: 12px;
}

.charts {
  display: grid;
  gap: 16px;
  margin-top: 24px;
}

.detail__label {
  font-size: 10px;
  margin-top: 8px;
}

footer {
  margin-top: 24px;
  font-size: 11px;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_requests;
    use crate::store::PAGE_SIZE;
    use chrono::TimeZone;
    use serde_json::json;

    fn seeded_store() -> RequestStore {
        let mut store = RequestStore::new(PAGE_SIZE);
        store.replace_all(sample_requests());
        store
    }

    #[test]
    fn escapes_markup_in_user_text() {
        assert_eq!(html_escape("<b>&x</b>"), "&lt;b&gt;&amp;x&lt;/b&gt;");
        assert_eq!(html_attr("a\"b"), "a&quot;b");

        let mut doc = sample_requests().remove(0);
        doc.client_name = Some("<script>alert(1)</script>".into());
        let row = request_row(&doc, false);
        assert!(!row.contains("<script>"));
        assert!(row.contains("&lt;script&gt;"));
    }

    #[test]
    fn date_formatting_and_placeholders() {
        assert_eq!(format_date(Some("2025-02-15")), "15/02/2025");
        assert_eq!(format_date(Some("2025-02-15T10:00:00Z")), "15/02/2025");
        assert_eq!(format_date(None), "--/--/----");
        assert_eq!(format_date(Some("soon")), "soon");
    }

    #[test]
    fn only_pending_rows_expose_actions() {
        let store = seeded_store();
        for r in store.documents() {
            let row = request_row(r, false);
            if r.status == RequestStatus::Pending {
                assert!(row.contains("CONFIRM"));
                assert!(row.contains("DENY"));
            } else {
                assert!(row.contains("disabled"));
                assert!(!row.contains("CONFIRM"));
            }
        }
    }

    #[test]
    fn fresh_rows_get_highlight_class() {
        let doc = sample_requests().remove(0);
        assert!(request_row(&doc, true).contains("row--fresh"));
        assert!(!request_row(&doc, false).contains("row--fresh"));
    }

    #[test]
    fn empty_filtered_table_names_the_filter() {
        let mut store = RequestStore::new(PAGE_SIZE);
        store.set_filter(StatusFilter::Only(RequestStatus::Denied));
        let html = request_table(&store);
        assert!(html.contains("NO REQUESTS [ DENIED ]"));
    }

    #[test]
    fn pagination_disables_edges() {
        let first = pagination(1, 3);
        assert!(first.contains("<button class=\"pager__btn\" disabled>PREV"));
        assert!(!first.contains("disabled>NEXT"));
        let last = pagination(3, 3);
        assert!(last.contains("disabled>NEXT"));
        let only = pagination(1, 1);
        assert!(only.matches("disabled").count() == 2);
    }

    #[test]
    fn detail_panel_shows_full_id_and_update_placeholder() {
        let mut doc = sample_requests().remove(0);
        doc.updated_at = None;
        let html = detail_panel(&doc);
        assert!(html.contains(&doc.id));
        assert!(html.contains("never updated"));
    }

    #[test]
    fn collection_table_orders_columns_by_field_list() {
        let mut browser = CollectionBrowser::new("tasks", PAGE_SIZE);
        browser.replace_all(vec![json!({
            "_id": "t1", "title": "Order supplies", "assignee": "oscar", "done": false
        })]);
        let fields = vec!["title".to_string(), "done".to_string()];
        let html = collection_table(&browser, &fields);
        let title_pos = html.find("TITLE").unwrap();
        let done_pos = html.find("DONE").unwrap();
        assert!(title_pos < done_pos);
        assert!(html.contains("<td>false</td>"));
        assert!(!html.contains("ASSIGNEE"));
    }

    #[test]
    fn dashboard_page_reflects_mode_and_refresh_time() {
        let mut store = seeded_store();
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 15, 4, 5).unwrap();
        store.set_last_refreshed(now);
        let notices = Notices::new();

        let local = dashboard_page(&store, &notices, ConnectionMode::Local, now);
        assert!(local.contains("LOCAL MODE"));
        assert!(local.contains("SHOWING SAMPLE DATA"));
        assert!(local.contains("LAST REFRESH 15:04:05"));

        let live = dashboard_page(&store, &notices, ConnectionMode::Live, now);
        assert!(live.contains("CONNECTED"));
        assert!(!live.contains("SHOWING SAMPLE DATA"));
    }
}
