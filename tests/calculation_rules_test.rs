// ==========================================
// 计算规则库集成测试
// ==========================================
// 测试范围:
// 1. 六类公式形态求值
// 2. 缺失/非数值操作数按 0
// 3. 负值夹取与中间小计夹取
// 4. 实测含碳量覆盖路径与回落判据
// 5. 规则表接线校验
// ==========================================

mod test_helpers;

use carbon_accounting::{
    CalculationRule, CellValue, EngineError, FieldPatch, IndicatorDefinition, IndicatorSchema,
    Item, ItemCollection, ItemTemplate, Operand, RuleBinding, RuleTable, CARBON_TO_CO2,
};
use std::sync::Arc;
use test_helpers::assert_close;

// ==========================================
// 辅助函数
// ==========================================

/// 创建包含全部公式操作数指标的测试条目
fn item_with(values: &[(&str, f64)]) -> Item {
    let keys = [
        "input", "factor", "efficiency", "term_a", "conc_a", "term_b", "conc_b",
        "consumption", "calorific_value", "carbon_content", "measured_carbon_content",
        "oxidation_rate", "loss_ratio", "recovery_rate", "utilization_rate", "out",
    ];
    let schema = IndicatorSchema::new(
        keys.iter()
            .map(|k| {
                if *k == "out" {
                    IndicatorDefinition::derived(k, k, "", 2)
                } else {
                    IndicatorDefinition::editable(k, k, "", 2)
                }
            })
            .collect(),
    );

    let mut collection = ItemCollection::new(Arc::new(schema));
    let id = collection.add_item(&ItemTemplate::user("测试条目")).unwrap();
    for (key, value) in values {
        collection
            .update_month_value(&id, key, 1, FieldPatch::Value(CellValue::Number(*value)))
            .unwrap();
    }
    collection.get(&id).unwrap().clone()
}

// ==========================================
// 直接因子法
// ==========================================

#[test]
fn test_direct_factor() {
    let rule = CalculationRule::DirectFactor {
        input: Operand::indicator("input"),
        factor: Operand::indicator("factor"),
    };
    let item = item_with(&[("input", 100.0), ("factor", 0.5810)]);
    assert_close(rule.evaluate(&item, 1), 58.10, 1e-9);
}

#[test]
fn test_direct_factor_clamps_negative_input() {
    let rule = CalculationRule::DirectFactor {
        input: Operand::indicator("input"),
        factor: Operand::indicator("factor"),
    };
    let item = item_with(&[("input", -100.0), ("factor", 0.5810)]);
    assert_eq!(rule.evaluate(&item, 1), 0.0);
}

// ==========================================
// 因子 × 效率
// ==========================================

#[test]
fn test_factor_with_efficiency() {
    let rule = CalculationRule::FactorWithEfficiency {
        input: Operand::indicator("input"),
        factor: Operand::indicator("factor"),
        efficiency: Operand::indicator("efficiency"),
    };
    let item = item_with(&[("input", 200.0), ("factor", 0.3), ("efficiency", 85.0)]);
    // 200 × 0.3 × 0.85
    assert_close(rule.evaluate(&item, 1), 51.0, 1e-9);
}

// ==========================================
// 双项加权 (密度/GWP 折算)
// ==========================================

#[test]
fn test_weighted_pair_recovery_formula() {
    let rule = CalculationRule::WeightedPair {
        term_a: Operand::indicator("term_a"),
        concentration_a: Operand::indicator("conc_a"),
        term_b: Operand::indicator("term_b"),
        concentration_b: Operand::indicator("conc_b"),
        density: Operand::Constant(19.7),
        gwp: Operand::Constant(1.0),
    };
    let item = item_with(&[
        ("term_a", 10.0),
        ("conc_a", 90.0),
        ("term_b", 5.0),
        ("conc_b", 80.0),
    ]);
    // (10×90 + 5×80)/100 × 19.7 = 256.10
    assert_close(rule.evaluate(&item, 1), 256.10, 0.005);
}

#[test]
fn test_weighted_pair_clamps_intermediate_sum() {
    let rule = CalculationRule::WeightedPair {
        term_a: Operand::indicator("term_a"),
        concentration_a: Operand::indicator("conc_a"),
        term_b: Operand::indicator("term_b"),
        concentration_b: Operand::indicator("conc_b"),
        density: Operand::Constant(19.7),
        gwp: Operand::Constant(1.0),
    };
    // 中间小计为负: 先夹到 0 再折算
    let item = item_with(&[
        ("term_a", -10.0),
        ("conc_a", 90.0),
        ("term_b", 5.0),
        ("conc_b", 80.0),
    ]);
    assert_eq!(rule.evaluate(&item, 1), 0.0);
}

// ==========================================
// 燃烧公式
// ==========================================

fn combustion_rule() -> CalculationRule {
    CalculationRule::Combustion {
        consumption: Operand::indicator("consumption"),
        calorific_value: Operand::indicator("calorific_value"),
        carbon_content: Operand::indicator("carbon_content"),
        override_carbon_content: Operand::indicator("measured_carbon_content"),
        oxidation_rate: Operand::indicator("oxidation_rate"),
    }
}

#[test]
fn test_combustion_default_path() {
    let item = item_with(&[
        ("consumption", 100.0),
        ("calorific_value", 20.0),
        ("carbon_content", 0.02),
        ("oxidation_rate", 98.0),
    ]);
    // 100 × 20 × 0.02 × 0.98 × 44/12
    let expected = 100.0 * 20.0 * 0.02 * 0.98 * CARBON_TO_CO2;
    assert_close(combustion_rule().evaluate(&item, 1), expected, 1e-9);
    assert_close(expected, 143.73, 0.005);
}

#[test]
fn test_combustion_override_path() {
    let item = item_with(&[
        ("consumption", 100.0),
        ("calorific_value", 20.0),
        ("carbon_content", 0.02),
        ("measured_carbon_content", 0.5),
        ("oxidation_rate", 98.0),
    ]);
    // 实测含碳量 0.5 替换 发热量×含碳量: 100 × 0.5 × 0.98 × 44/12 = 179.67
    assert_close(combustion_rule().evaluate(&item, 1), 179.67, 0.005);
}

#[test]
fn test_combustion_zero_override_falls_back() {
    let with_zero_override = item_with(&[
        ("consumption", 100.0),
        ("calorific_value", 20.0),
        ("carbon_content", 0.02),
        ("measured_carbon_content", 0.0),
        ("oxidation_rate", 98.0),
    ]);
    let without_override = item_with(&[
        ("consumption", 100.0),
        ("calorific_value", 20.0),
        ("carbon_content", 0.02),
        ("oxidation_rate", 98.0),
    ]);
    // 实测含碳量为 0: 回落缺省路径,与未填写等同
    assert_eq!(
        combustion_rule().evaluate(&with_zero_override, 1),
        combustion_rule().evaluate(&without_override, 1)
    );
}

#[test]
fn test_combustion_clamps_negative_consumption() {
    let item = item_with(&[
        ("consumption", -100.0),
        ("calorific_value", 20.0),
        ("carbon_content", 0.02),
        ("oxidation_rate", 98.0),
    ]);
    assert_eq!(combustion_rule().evaluate(&item, 1), 0.0);
}

// ==========================================
// 损耗比例
// ==========================================

#[test]
fn test_loss_ratio() {
    let rule = CalculationRule::LossRatio {
        consumption: Operand::indicator("consumption"),
        loss_ratio: Operand::indicator("loss_ratio"),
    };
    let item = item_with(&[("consumption", 400.0), ("loss_ratio", 2.5)]);
    // 400 × 2.5/100
    assert_close(rule.evaluate(&item, 1), 10.0, 1e-9);
}

// ==========================================
// 去除效率
// ==========================================

#[test]
fn test_removal_efficiency() {
    let rule = CalculationRule::RemovalEfficiency {
        consumption: Operand::indicator("consumption"),
        factor: Operand::indicator("factor"),
        removal_efficiency: Operand::indicator("recovery_rate"),
        removal_usage: Operand::indicator("utilization_rate"),
        gwp: Operand::Constant(21.0),
    };
    let item = item_with(&[
        ("consumption", 100.0),
        ("factor", 0.25),
        ("recovery_rate", 80.0),
        ("utilization_rate", 50.0),
    ]);
    // 100 × 0.25 × (1 - 0.8×0.5) × 21 = 315
    assert_close(rule.evaluate(&item, 1), 315.0, 1e-9);
}

// ==========================================
// 缺失/非数值操作数
// ==========================================

#[test]
fn test_missing_operand_counts_as_zero() {
    let rule = CalculationRule::DirectFactor {
        input: Operand::indicator("input"),
        factor: Operand::indicator("factor"),
    };
    // 两个操作数都未录入 (空白)
    let item = item_with(&[]);
    assert_eq!(rule.evaluate(&item, 1), 0.0);
}

#[test]
fn test_non_numeric_operand_counts_as_zero() {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("input", "输入", "t", 2),
        IndicatorDefinition::editable("factor", "因子", "", 4),
    ]);
    let mut collection = ItemCollection::new(Arc::new(schema));
    let id = collection.add_item(&ItemTemplate::user("条目")).unwrap();
    collection
        .update_month_value(&id, "input", 1, FieldPatch::Value("不是数字".into()))
        .unwrap();
    collection
        .update_month_value(&id, "factor", 1, FieldPatch::Value(CellValue::Number(2.0)))
        .unwrap();

    let rule = CalculationRule::DirectFactor {
        input: Operand::indicator("input"),
        factor: Operand::indicator("factor"),
    };
    assert_eq!(rule.evaluate(collection.get(&id).unwrap(), 1), 0.0);
}

// ==========================================
// 规则表接线校验
// ==========================================

#[test]
fn test_rule_table_validation() {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("consumption", "消耗量", "t", 2),
        IndicatorDefinition::derived("emission", "排放量", "tCO2", 2),
    ]);

    // 合法接线
    let ok = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::Constant(1.0),
        },
    )]);
    assert!(ok.validate(&schema).is_ok());

    // 目标不在目录
    let bad_target = RuleTable::new(vec![RuleBinding::new(
        "no_such",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::Constant(1.0),
        },
    )]);
    assert!(matches!(
        bad_target.validate(&schema),
        Err(EngineError::UnknownIndicator { .. })
    ));

    // 目标不是计算型指标
    let bad_kind = RuleTable::new(vec![RuleBinding::new(
        "consumption",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::Constant(1.0),
        },
    )]);
    assert!(matches!(
        bad_kind.validate(&schema),
        Err(EngineError::RuleTargetNotDerived { .. })
    ));

    // 操作数引用目录外指标
    let bad_operand = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::DirectFactor {
            input: Operand::indicator("no_such_operand"),
            factor: Operand::Constant(1.0),
        },
    )]);
    assert!(matches!(
        bad_operand.validate(&schema),
        Err(EngineError::UnknownIndicator { .. })
    ));
}

// ==========================================
// 规则表即数据
// ==========================================

#[test]
fn test_rule_table_loads_from_json() {
    let raw = r#"[
        {
            "target": "emission",
            "rule": {
                "formula": "combustion",
                "consumption": { "indicator": "consumption" },
                "calorific_value": { "indicator": "calorific_value" },
                "carbon_content": { "indicator": "carbon_content" },
                "override_carbon_content": { "indicator": "measured_carbon_content" },
                "oxidation_rate": { "indicator": "oxidation_rate" }
            }
        }
    ]"#;
    let bindings: Vec<RuleBinding> = serde_json::from_str(raw).expect("规则表解析失败");
    let table = RuleTable::new(bindings);
    assert_eq!(table.len(), 1);

    let item = item_with(&[
        ("consumption", 100.0),
        ("calorific_value", 20.0),
        ("carbon_content", 0.02),
        ("oxidation_rate", 98.0),
    ]);
    let binding = table.iter().next().unwrap();
    assert_eq!(binding.target, "emission");
    assert_close(
        binding.rule.evaluate(&item, 1),
        100.0 * 20.0 * 0.02 * 0.98 * CARBON_TO_CO2,
        1e-9,
    );
}
