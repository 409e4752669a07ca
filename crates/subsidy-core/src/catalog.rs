//! Fixed option catalogs for the profile form
//!
//! The first entry of each list is the form default.

use serde::Serialize;

/// Industry categories (Taiwan standard industrial classification, top level)
pub const INDUSTRIES: &[&str] = &[
    "製造業",
    "批發及零售業",
    "住宿及餐飲業",
    "運輸及倉儲業",
    "資訊及通訊傳播業",
    "金融及保險業",
    "不動產業",
    "醫療保健及社會工作服務業",
    "教育業",
    "農、林、漁、牧業",
    "營建工程業",
    "其他服務業",
];

/// Equipment classes a project may target
pub const EQUIPMENT_CATEGORIES: &[&str] = &[
    "空調系統 (冰水主機、箱型冷氣)",
    "照明設備 (LED)",
    "空氣壓縮機",
    "鍋爐及熱能設備",
    "高效率馬達",
    "冷凍冷藏設備",
    "熱泵熱水系統",
    "太陽能光電",
    "儲能系統",
    "能源管理系統 (EMS)",
];

/// Kinds of energy-saving measure
pub const MEASURE_CATEGORIES: &[&str] = &[
    "老舊設備汰換",
    "新設高效率設備",
    "製程改善",
    "導入能源管理系統",
    "再生能源設置",
    "節能績效保證專案 (ESCO)",
];

/// Planned implementation windows
pub const IMPLEMENTATION_TIMES: &[&str] = &["3 個月內", "6 個月內", "1 年內", "1 年以上"];

/// All catalogs, for the JSON API and the CLI listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogs {
    pub industries: &'static [&'static str],
    pub equipment_categories: &'static [&'static str],
    pub measure_categories: &'static [&'static str],
    pub implementation_times: &'static [&'static str],
}

/// Get every catalog
pub fn catalogs() -> Catalogs {
    Catalogs {
        industries: INDUSTRIES,
        equipment_categories: EQUIPMENT_CATEGORIES,
        measure_categories: MEASURE_CATEGORIES,
        implementation_times: IMPLEMENTATION_TIMES,
    }
}

/// Check whether a value belongs to a catalog
pub fn contains(catalog: &[&str], value: &str) -> bool {
    catalog.iter().any(|entry| *entry == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_are_non_empty() {
        let all = catalogs();
        assert!(!all.industries.is_empty());
        assert!(!all.equipment_categories.is_empty());
        assert!(!all.measure_categories.is_empty());
        assert!(!all.implementation_times.is_empty());
    }

    #[test]
    fn test_contains() {
        assert!(contains(INDUSTRIES, "製造業"));
        assert!(!contains(INDUSTRIES, "Manufacturing"));
    }

    #[test]
    fn test_catalogs_serialize_camel_case() {
        let json = serde_json::to_value(catalogs()).unwrap();
        assert!(json.get("equipmentCategories").is_some());
        assert!(json.get("implementationTimes").is_some());
    }
}
