//! Server-rendered HTML
//!
//! One page: the profile form on the left, the results panel on the right.
//! Every interpolated string goes through `escape`.

use std::fmt::Write;

use chrono::{DateTime, Local};

use subsidy_core::display::{benefit_stats, format_relevance, EMPTY_STATE_MESSAGE};
use subsidy_core::{CompanyProfile, FieldKind, ProfileField, SearchResult, SessionView, Subsidy};

const INITIAL_MESSAGE: &str = "請填寫左側企業資料，按下「搜尋補助」開始比對。";
const LOADING_MESSAGE: &str = "正在聯網搜尋最新補助公告…";

const STYLE: &str = r#"
body { font-family: "Noto Sans TC", system-ui, sans-serif; margin: 0; background: #f5f7f6; color: #1f2933; }
header { background: #0f766e; color: #fff; padding: 1rem 2rem; }
main { display: grid; grid-template-columns: minmax(280px, 360px) 1fr; gap: 1.5rem; padding: 1.5rem 2rem; }
form label { display: block; margin-top: .75rem; font-size: .9rem; }
form input, form select { width: 100%; padding: .4rem; box-sizing: border-box; }
form button { margin-top: 1rem; width: 100%; padding: .6rem; background: #0f766e; color: #fff; border: 0; }
.card { background: #fff; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.agency { color: #52606d; font-size: .9rem; }
.relevance { float: right; font-weight: bold; color: #0f766e; }
.benefit { display: grid; grid-template-columns: repeat(4, 1fr); gap: .5rem; background: #ecfdf5; padding: .75rem; border-radius: 6px; }
.benefit .value { font-size: 1.3rem; font-weight: bold; }
.logic { font-size: .85rem; color: #52606d; }
.error { background: #fef2f2; color: #991b1b; padding: 1rem; border-radius: 6px; }
.notice { color: #52606d; padding: 1rem; }
"#;

/// Escape text for HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Form label for a profile field
pub fn field_label(field: ProfileField) -> &'static str {
    match field {
        ProfileField::ContactPhone => "聯絡電話",
        ProfileField::TaxId => "公司統編",
        ProfileField::Industry => "產業類別",
        ProfileField::AnnualElectricityBill => "年平均電費 (元)",
        ProfileField::EstimatedBudget => "預計投入預算 (元)",
        ProfileField::ProjectEquipmentType => "設備類型",
        ProfileField::ProjectMeasureType => "節能措施",
        ProfileField::ImplementationTime => "預計執行時程",
    }
}

/// Full page: form plus results panel
pub fn render_page(
    profile: &CompanyProfile,
    panel: &SessionView,
    searched_at: Option<DateTime<Local>>,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>節能補助智慧媒合</title>
<style>{style}</style>
</head>
<body>
<header><h1>節能補助智慧媒合</h1></header>
<main>
<section>{form}</section>
<section id="results">{panel}</section>
</main>
</body>
</html>
"#,
        style = STYLE,
        form = render_form(profile),
        panel = render_panel(panel, searched_at),
    )
}

/// The profile form, refilled with `profile`
pub fn render_form(profile: &CompanyProfile) -> String {
    let mut out = String::from(r#"<form method="post" action="/search">"#);

    for field in ProfileField::all() {
        let name = field.as_str();
        let value = profile.field_value(*field);
        let _ = write!(
            out,
            r#"<label for="{name}">{label}</label>"#,
            name = name,
            label = field_label(*field)
        );

        match (field.catalog(), field.kind()) {
            (Some(options), _) => {
                let _ = write!(out, r#"<select id="{name}" name="{name}">"#, name = name);
                for option in options {
                    let selected = if *option == value { " selected" } else { "" };
                    let _ = write!(
                        out,
                        r#"<option value="{v}"{selected}>{v}</option>"#,
                        v = escape(option),
                        selected = selected
                    );
                }
                out.push_str("</select>");
            }
            (None, FieldKind::Number) => {
                let _ = write!(
                    out,
                    r#"<input id="{name}" name="{name}" type="number" min="0" step="any" value="{value}" required>"#,
                    name = name,
                    value = escape(&value)
                );
            }
            (None, FieldKind::Text) => {
                let required = if *field == ProfileField::TaxId {
                    " required"
                } else {
                    ""
                };
                let _ = write!(
                    out,
                    r#"<input id="{name}" name="{name}" type="text" value="{value}"{required}>"#,
                    name = name,
                    value = escape(&value),
                    required = required
                );
            }
        }
    }

    out.push_str(r#"<button type="submit">搜尋補助</button></form>"#);
    out
}

/// Results panel for a session view
pub fn render_panel(view: &SessionView, searched_at: Option<DateTime<Local>>) -> String {
    match view {
        SessionView::Initial => notice(INITIAL_MESSAGE),
        SessionView::Loading => notice(LOADING_MESSAGE),
        SessionView::Failed { message } => render_error(message),
        SessionView::Empty => notice(EMPTY_STATE_MESSAGE),
        SessionView::Results { result } => render_results(result, searched_at),
    }
}

/// Error block
pub fn render_error(message: &str) -> String {
    format!(r#"<div class="error" role="alert">{}</div>"#, escape(message))
}

fn notice(message: &str) -> String {
    format!(r#"<p class="notice">{}</p>"#, escape(message))
}

fn render_results(result: &SearchResult, searched_at: Option<DateTime<Local>>) -> String {
    let mut out = String::new();

    if let Some(at) = searched_at {
        let _ = write!(
            out,
            r#"<p class="notice">資料時間：{}</p>"#,
            at.format("%Y-%m-%d %H:%M")
        );
    }

    for subsidy in &result.subsidies {
        out.push_str(&render_card(subsidy));
    }

    if !result.recommendations.is_empty() {
        out.push_str(r#"<div class="card"><h3>建議事項</h3><ul>"#);
        for rec in &result.recommendations {
            let _ = write!(out, "<li>{}</li>", escape(rec));
        }
        out.push_str("</ul></div>");
    }

    if !result.grounding_sources.is_empty() {
        out.push_str(r#"<div class="card"><h3>搜尋依據</h3><ul>"#);
        for uri in &result.grounding_sources {
            let _ = write!(out, "{}", link_item(uri));
        }
        out.push_str("</ul></div>");
    }

    out
}

/// One subsidy card; optional fields omit their block
pub fn render_card(subsidy: &Subsidy) -> String {
    let mut out = String::from(r#"<article class="card">"#);

    if let Some(relevance) = format_relevance(subsidy.relevance_score) {
        let _ = write!(
            out,
            r#"<span class="relevance">相關性 {}</span>"#,
            escape(&relevance)
        );
    }
    let _ = write!(
        out,
        r#"<h2>{}</h2><p class="agency">{}</p><p>{}</p><p><strong>申請資格：</strong>{}</p>"#,
        escape(&subsidy.name),
        escape(&subsidy.agency),
        escape(&subsidy.description),
        escape(&subsidy.eligibility)
    );

    if let Some(deadline) = subsidy.deadline.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "<p><strong>截止日期：</strong>{}</p>", escape(deadline));
    }
    if let Some(rationale) = subsidy.matching_rationale.as_deref() {
        let _ = write!(out, "<p><strong>符合原因：</strong>{}</p>", escape(rationale));
    }

    if let Some(assessment) = &subsidy.benefit_assessment {
        out.push_str(r#"<div class="benefit">"#);
        for stat in benefit_stats(assessment) {
            let _ = write!(
                out,
                r#"<div><div>{}</div><span class="value">{}</span> {}</div>"#,
                stat.label,
                escape(&stat.stat.value),
                stat.stat.unit
            );
        }
        out.push_str("</div>");
        if let Some(logic) = assessment.calculation_logic.as_deref() {
            let _ = write!(out, r#"<p class="logic">計算依據：{}</p>"#, escape(logic));
        }
    }

    let sources: Vec<&str> = subsidy.source_links().collect();
    if !sources.is_empty() {
        out.push_str("<details><summary>參考來源</summary><ul>");
        for source in sources {
            out.push_str(&link_item(source));
        }
        out.push_str("</ul></details>");
    }

    let _ = write!(
        out,
        r#"<p><a href="{}" target="_blank" rel="noopener noreferrer">官方公告連結</a></p></article>"#,
        escape(&safe_href(&subsidy.link))
    );
    out
}

fn link_item(uri: &str) -> String {
    format!(
        r#"<li><a href="{href}" target="_blank" rel="noopener noreferrer">{text}</a></li>"#,
        href = escape(&safe_href(uri)),
        text = escape(uri)
    )
}

/// Only http(s) links are rendered as live hrefs
fn safe_href(uri: &str) -> String {
    let trimmed = uri.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        "#".to_string()
    }
}
