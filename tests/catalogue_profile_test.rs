// ==========================================
// 模块档案配置集成测试
// ==========================================
// 测试范围:
// 1. JSON 档案解析 → 模块构建 → 核算的完整链路
// 2. 档案接线错误在构建时快速失败
// ==========================================

mod test_helpers;

use carbon_accounting::{
    CellValue, EmissionModule, EngineError, FieldPatch, ModuleLayout, ModuleProfile,
};
use test_helpers::assert_close;

const PROFILE_JSON: &str = r#"{
    "kind": "PURCHASED_ENERGY",
    "layout": "FLAT",
    "schema": {
        "indicators": [
            { "key": "consumption", "display_name": "净购入量", "unit": "MWh", "decimal_places": 2, "is_derived": false, "default_value": null },
            { "key": "emission_factor", "display_name": "排放因子", "unit": "tCO2/MWh", "decimal_places": 4, "is_derived": false, "default_value": null },
            { "key": "emission", "display_name": "排放量", "unit": "tCO2", "decimal_places": 2, "is_derived": true, "default_value": null }
        ],
        "factor_key": "emission_factor"
    },
    "rules": {
        "rules": [
            {
                "target": "emission",
                "rule": {
                    "formula": "direct_factor",
                    "input": { "indicator": "consumption" },
                    "factor": { "indicator": "emission_factor" }
                }
            }
        ]
    },
    "report_key": "emission",
    "default_items": [
        { "name": "电力", "baseline_factor": 0.581, "is_default": true }
    ]
}"#;

#[test]
fn test_profile_from_json_builds_working_module() {
    let profile = ModuleProfile::from_json(PROFILE_JSON).expect("档案解析失败");
    assert_eq!(profile.layout, ModuleLayout::Flat);

    let mut module = EmissionModule::from_profile(profile).expect("模块构建失败");
    let id = module.collection().unwrap().items()[0].id.clone();

    // 基准因子已落位全年
    assert_close(
        module.find_item(&id).unwrap().value("emission_factor", 6),
        0.581,
        1e-9,
    );

    module
        .commit_month_value(&id, "consumption", 1, FieldPatch::Value(CellValue::Number(1000.0)))
        .unwrap();
    assert_close(module.yearly_total(), 581.0, 1e-9);
}

#[test]
fn test_profile_json_round_trip() {
    let profile = ModuleProfile::from_json(PROFILE_JSON).unwrap();
    let raw = profile.to_json().expect("档案序列化失败");
    let reparsed = ModuleProfile::from_json(&raw).expect("档案快照应可再解析");
    assert_eq!(reparsed.report_key, "emission");
    assert_eq!(reparsed.default_items.len(), 1);
}

#[test]
fn test_profile_parse_error() {
    assert!(ModuleProfile::from_json("{ not json").is_err());
}

#[test]
fn test_miswired_profile_fails_fast_at_build() {
    // 规则目标指向目录外指标: 构建即失败,而非静默算 0
    let mut profile = ModuleProfile::from_json(PROFILE_JSON).unwrap();
    profile.report_key = "no_such_indicator".to_string();
    match EmissionModule::from_profile(profile) {
        Err(EngineError::UnknownIndicator { key }) => assert_eq!(key, "no_such_indicator"),
        other => panic!("应快速失败,实际: {:?}", other.map(|_| ())),
    }
}
