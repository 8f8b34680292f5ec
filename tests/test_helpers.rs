// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的模块档案、数值断言等功能
// ==========================================

use carbon_accounting::{
    CalculationRule, IndicatorDefinition, IndicatorSchema, ItemTemplate, ModuleKind,
    ModuleLayout, ModuleProfile, Operand, RuleBinding, RuleTable,
};

/// 浮点近似断言 (展示口径两位小数的场景用 0.005 容差)
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "数值不匹配: actual={}, expected={}, tolerance={}",
        actual,
        expected,
        tolerance
    );
}

/// 最简平铺档案: 排放量 = max(0, 消耗量) × 因子
///
/// 无缺省条目,供通用引擎测试自行添加条目
pub fn simple_flat_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("consumption", "消耗量", "t", 2),
        IndicatorDefinition::editable("factor", "排放因子", "tCO2/t", 4),
        IndicatorDefinition::derived("emission", "排放量", "tCO2", 2),
    ]);

    let rules = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::indicator("factor"),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::FuelCombustion,
        layout: ModuleLayout::Flat,
        schema,
        rules,
        report_key: "emission".to_string(),
        default_items: Vec::new(),
        default_groups: Vec::new(),
    }
}

/// 带一个受保护缺省条目的最简档案
pub fn profile_with_default_item() -> ModuleProfile {
    let mut profile = simple_flat_profile();
    profile.default_items = vec![ItemTemplate::default_entry("缺省条目", 0.0)];
    profile
}

/// 分环节档案: 条目排放量 = max(0, 消耗量) × 因子,
/// 环节净值 = Σ投入 - Σ产出 (因子缺省 1.0,便于直读消耗量)
pub fn grouped_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("consumption", "消耗量/产量", "t", 2),
        IndicatorDefinition::editable("factor", "排放因子", "tCO2/t", 4).with_default(1.0),
        IndicatorDefinition::derived("emission", "排放量", "tCO2", 2),
    ]);

    let rules = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::indicator("factor"),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::IndustrialProcess,
        layout: ModuleLayout::Grouped,
        schema,
        rules,
        report_key: "emission".to_string(),
        default_items: Vec::new(),
        default_groups: Vec::new(),
    }
}
