//! Display formatting for search results
//!
//! Shared by the HTML views and the CLI text output.

use std::fmt::Write;

use crate::models::{SearchResult, Subsidy, SubsidyBenefitAssessment};

/// Amounts at or above this are shown in 萬元
const WAN: f64 = 10_000.0;

/// Placeholder for a missing figure
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown when a search finishes without any matching program
pub const EMPTY_STATE_MESSAGE: &str = "搜尋完畢，暫無完全匹配的補助";

/// A formatted number with its unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub value: String,
    pub unit: &'static str,
}

/// One labelled figure in the benefit block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenefitStat {
    pub label: &'static str,
    pub stat: Stat,
}

/// Format an NTD amount
///
/// ```
/// use subsidy_core::display::format_currency;
///
/// let s = format_currency(Some(250_000.0));
/// assert_eq!((s.value.as_str(), s.unit), ("25.0", "萬元"));
/// ```
pub fn format_currency(amount: Option<f64>) -> Stat {
    match amount {
        None => Stat {
            value: NOT_AVAILABLE.to_string(),
            unit: "元",
        },
        Some(v) if v >= WAN => Stat {
            value: format!("{:.1}", v / WAN),
            unit: "萬元",
        },
        Some(v) => Stat {
            value: format!("{}", v.round() as i64),
            unit: "元",
        },
    }
}

/// Format a payback period in years
pub fn format_years(years: Option<f64>) -> Stat {
    Stat {
        value: years.map_or_else(|| NOT_AVAILABLE.to_string(), |y| format!("{:.1}", y)),
        unit: "年",
    }
}

/// Format a carbon reduction in tonnes
pub fn format_tons(tons: Option<f64>) -> Stat {
    Stat {
        value: tons.map_or_else(|| NOT_AVAILABLE.to_string(), |t| format!("{:.2}", t)),
        unit: "噸",
    }
}

/// The four figures shown on a subsidy card
pub fn benefit_stats(assessment: &SubsidyBenefitAssessment) -> [BenefitStat; 4] {
    [
        BenefitStat {
            label: "預估補助金額",
            stat: format_currency(assessment.estimated_subsidy_amount),
        },
        BenefitStat {
            label: "年省電費",
            stat: format_currency(assessment.annual_cost_saving),
        },
        BenefitStat {
            label: "投資回收期",
            stat: format_years(assessment.payback_period_years),
        },
        BenefitStat {
            label: "年減碳量",
            stat: format_tons(assessment.carbon_reduction_tons),
        },
    ]
}

/// Relevance as "n/5", when present
pub fn format_relevance(score: Option<f64>) -> Option<String> {
    score.map(|s| format!("{}/5", crate::profile::format_number(s)))
}

/// Render a search result as plain text for the terminal
pub fn render_text(result: &SearchResult) -> String {
    let mut out = String::new();

    if result.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_STATE_MESSAGE);
    }

    for (i, subsidy) in result.subsidies.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_subsidy(&mut out, subsidy);
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\n建議事項");
        for rec in &result.recommendations {
            let _ = writeln!(out, "  • {}", rec);
        }
    }

    if !result.grounding_sources.is_empty() {
        let _ = writeln!(out, "\n搜尋依據");
        for uri in &result.grounding_sources {
            let _ = writeln!(out, "  {}", uri);
        }
    }

    out
}

fn render_subsidy(out: &mut String, subsidy: &Subsidy) {
    let _ = write!(out, "■ {}", subsidy.name);
    if let Some(relevance) = format_relevance(subsidy.relevance_score) {
        let _ = write!(out, "  [{}]", relevance);
    }
    out.push('\n');
    let _ = writeln!(out, "  主辦機關: {}", subsidy.agency);
    let _ = writeln!(out, "  內容: {}", subsidy.description);
    let _ = writeln!(out, "  資格: {}", subsidy.eligibility);
    if let Some(deadline) = subsidy.deadline.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "  截止: {}", deadline);
    }
    if let Some(rationale) = subsidy.matching_rationale.as_deref() {
        let _ = writeln!(out, "  符合原因: {}", rationale);
    }

    if let Some(assessment) = &subsidy.benefit_assessment {
        let figures: Vec<String> = benefit_stats(assessment)
            .iter()
            .map(|b| format!("{} {} {}", b.label, b.stat.value, b.stat.unit))
            .collect();
        let _ = writeln!(out, "  效益: {}", figures.join(" | "));
        if let Some(logic) = assessment.calculation_logic.as_deref() {
            let _ = writeln!(out, "  計算依據: {}", logic);
        }
    }

    let sources: Vec<&str> = subsidy.source_links().collect();
    if !sources.is_empty() {
        let _ = writeln!(out, "  參考來源:");
        for source in sources {
            let _ = writeln!(out, "    - {}", source);
        }
    }

    let _ = writeln!(out, "  官方連結: {}", subsidy.link);
}
