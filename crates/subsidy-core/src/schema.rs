//! Response schema for structured output
//!
//! `response_schema` is sent to Gemini as `generationConfig.responseSchema`
//! (OpenAPI subset). The model treats it as a hint only, so `validate`
//! re-checks the parsed JSON before it reaches the caller.

use serde_json::{json, Map, Value};

/// Lowest and highest allowed relevance score
pub const RELEVANCE_RANGE: std::ops::RangeInclusive<f64> = 1.0..=5.0;

const SUBSIDY_REQUIRED: &[&str] = &[
    "name",
    "agency",
    "description",
    "eligibility",
    "relevanceScore",
    "matchingRationale",
    "link",
];

const SUBSIDY_OPTIONAL_STRINGS: &[&str] = &["deadline"];

const ASSESSMENT_NUMBERS: &[&str] = &[
    "estimatedSubsidyAmount",
    "netInvestment",
    "paybackPeriodYears",
    "annualCostSaving",
    "carbonReductionTons",
    "costPerTonCarbonReduction",
];

fn benefit_assessment_schema() -> Value {
    json!({
        "type": "OBJECT",
        "description": "根據搜尋到的政策公式與企業預算進行的效益評估",
        "properties": {
            "estimatedSubsidyAmount": { "type": "NUMBER", "description": "預估可獲得的補助金額 (新台幣元)" },
            "netInvestment": { "type": "NUMBER", "description": "企業淨投入金額 (總投入 - 預估補助)" },
            "paybackPeriodYears": { "type": "NUMBER", "description": "預估的投資回收年限 (年)" },
            "annualCostSaving": { "type": "NUMBER", "description": "預估的年節省電費 (新台幣元)" },
            "carbonReductionTons": { "type": "NUMBER", "description": "預估的年減碳量 (公噸 CO2e)" },
            "calculationLogic": { "type": "STRING", "description": "具體列出你是根據哪個公式計算的，例如：補助 30% 或每 kW 補助 2500 元。" }
        }
    })
}

fn subsidy_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "補助方案的完整官方名稱" },
            "agency": { "type": "STRING", "description": "主辦或執行此補助方案的政府機關" },
            "description": { "type": "STRING", "description": "計畫內容摘要" },
            "eligibility": { "type": "STRING", "description": "申請資格" },
            "deadline": { "type": "STRING", "description": "申請截止日期" },
            "link": { "type": "STRING", "description": "官方申請頁面或簡章連結" },
            "benefitAssessment": benefit_assessment_schema(),
            "relevanceScore": { "type": "NUMBER", "description": "相關性評分 (1-5)" },
            "matchingRationale": { "type": "STRING", "description": "說明符合程度" },
            "sources": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "搜尋參考的網頁連結"
            }
        },
        "required": SUBSIDY_REQUIRED
    })
}

/// The full response schema
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subsidies": {
                "type": "ARRAY",
                "items": subsidy_schema()
            },
            "recommendations": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["subsidies", "recommendations"]
    })
}

/// Check a parsed response against the contract
///
/// Returns one entry per problem, each prefixed with the JSON path. An empty
/// list means the response conforms.
pub fn validate(value: &Value) -> Vec<String> {
    let mut problems = Vec::new();

    let Some(root) = value.as_object() else {
        problems.push("$: expected object".to_string());
        return problems;
    };

    match root.get("subsidies") {
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_subsidy(&format!("subsidies[{}]", i), item, &mut problems);
            }
        }
        Some(_) => problems.push("subsidies: expected array".to_string()),
        None => problems.push("subsidies: missing".to_string()),
    }

    match root.get("recommendations") {
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    problems.push(format!("recommendations[{}]: expected string", i));
                }
            }
        }
        Some(_) => problems.push("recommendations: expected array".to_string()),
        None => problems.push("recommendations: missing".to_string()),
    }

    problems
}

fn validate_subsidy(path: &str, value: &Value, problems: &mut Vec<String>) {
    let Some(obj) = value.as_object() else {
        problems.push(format!("{}: expected object", path));
        return;
    };

    for key in SUBSIDY_REQUIRED {
        match obj.get(*key) {
            None | Some(Value::Null) => problems.push(format!("{}.{}: missing", path, key)),
            Some(v) if *key == "relevanceScore" => match v.as_f64() {
                Some(score) if RELEVANCE_RANGE.contains(&score) => {}
                Some(score) => problems.push(format!(
                    "{}.relevanceScore: {} outside 1..=5",
                    path, score
                )),
                None => problems.push(format!("{}.relevanceScore: expected number", path)),
            },
            Some(v) if !v.is_string() => {
                problems.push(format!("{}.{}: expected string", path, key))
            }
            Some(_) => {}
        }
    }

    check_optional_strings(path, obj, SUBSIDY_OPTIONAL_STRINGS, problems);

    match obj.get("sources") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            if items.iter().any(|s| !s.is_string()) {
                problems.push(format!("{}.sources: expected array of strings", path));
            }
        }
        Some(_) => problems.push(format!("{}.sources: expected array", path)),
    }

    match obj.get("benefitAssessment") {
        None | Some(Value::Null) => {}
        Some(Value::Object(assessment)) => {
            let inner = format!("{}.benefitAssessment", path);
            for key in ASSESSMENT_NUMBERS {
                match assessment.get(*key) {
                    None | Some(Value::Null) => {}
                    Some(v) => match v.as_f64() {
                        Some(n) if n >= 0.0 => {}
                        Some(n) => problems.push(format!("{}.{}: negative ({})", inner, key, n)),
                        None => problems.push(format!("{}.{}: expected number", inner, key)),
                    },
                }
            }
            check_optional_strings(&inner, assessment, &["calculationLogic"], problems);
        }
        Some(_) => problems.push(format!("{}.benefitAssessment: expected object", path)),
    }
}

fn check_optional_strings(
    path: &str,
    obj: &Map<String, Value>,
    keys: &[&str],
    problems: &mut Vec<String>,
) {
    for key in keys {
        match obj.get(*key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(_) => problems.push(format!("{}.{}: expected string", path, key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conforming() -> Value {
        json!({
            "subsidies": [{
                "name": "節能設備汰換補助",
                "agency": "經濟部能源署",
                "description": "汰換老舊空調",
                "eligibility": "中小企業",
                "link": "https://www.energypark.org.tw/",
                "relevanceScore": 4,
                "matchingRationale": "符合",
                "benefitAssessment": { "estimatedSubsidyAmount": 250000 }
            }],
            "recommendations": ["先備妥電費單"]
        })
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["subsidies", "recommendations"]));
        let required = schema["properties"]["subsidies"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 7);
        assert!(required.contains(&json!("relevanceScore")));
        assert!(!required.contains(&json!("deadline")));
    }

    #[test]
    fn test_conforming_response_has_no_problems() {
        assert!(validate(&conforming()).is_empty());
    }

    #[test]
    fn test_empty_subsidies_is_valid() {
        let value = json!({ "subsidies": [], "recommendations": [] });
        assert!(validate(&value).is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let mut value = conforming();
        value["subsidies"][0]
            .as_object_mut()
            .unwrap()
            .remove("agency");
        let problems = validate(&value);
        assert_eq!(problems, vec!["subsidies[0].agency: missing".to_string()]);
    }

    #[test]
    fn test_relevance_out_of_range() {
        let mut value = conforming();
        value["subsidies"][0]["relevanceScore"] = json!(7);
        let problems = validate(&value);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("outside 1..=5"));
    }

    #[test]
    fn test_negative_assessment_number() {
        let mut value = conforming();
        value["subsidies"][0]["benefitAssessment"] = json!({
            "estimatedSubsidyAmount": -250000,
            "paybackPeriodYears": 0
        });
        let problems = validate(&value);
        assert_eq!(
            problems,
            vec!["subsidies[0].benefitAssessment.estimatedSubsidyAmount: negative (-250000)"]
        );
    }

    #[test]
    fn test_wrong_types() {
        let value = json!({
            "subsidies": [{
                "name": 1,
                "agency": "a",
                "description": "d",
                "eligibility": "e",
                "link": "l",
                "relevanceScore": "high",
                "matchingRationale": "m",
                "sources": "https://example.com",
                "benefitAssessment": { "paybackPeriodYears": "3" }
            }],
            "recommendations": "none"
        });
        let problems = validate(&value);
        assert!(problems.contains(&"subsidies[0].name: expected string".to_string()));
        assert!(problems.contains(&"subsidies[0].relevanceScore: expected number".to_string()));
        assert!(problems.contains(&"subsidies[0].sources: expected array".to_string()));
        assert!(problems.contains(
            &"subsidies[0].benefitAssessment.paybackPeriodYears: expected number".to_string()
        ));
        assert!(problems.contains(&"recommendations: expected array".to_string()));
    }

    #[test]
    fn test_non_object_root() {
        assert_eq!(validate(&json!([])), vec!["$: expected object".to_string()]);
    }
}
