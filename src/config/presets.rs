// ==========================================
// 企业碳排放核算系统 - 内置模块档案
// ==========================================
// 职责: 五个标准核算模块的缺省档案
// 依据: 省级温室气体清单编制指南缺省因子
// 说明: 档案即数据,部署方可用 JSON 覆盖
// ==========================================

use crate::config::catalogue::{constants, GroupTemplate, ModuleLayout, ModuleProfile};
use crate::domain::indicator::{IndicatorDefinition, IndicatorSchema};
use crate::domain::item::ItemTemplate;
use crate::domain::types::ModuleKind;
use crate::engine::rules::{CalculationRule, Operand, RuleBinding, RuleTable};

// ==========================================
// 化石燃料燃烧
// ==========================================

/// 化石燃料燃烧模块档案
///
/// 排放量 = 消耗量 × 低位发热量 × 单位热值含碳量
///          × 碳氧化率/100 × 44/12;
/// 实测单位燃料含碳量 > 0 时替换 发热量×含碳量 乘积。
pub fn fuel_combustion_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("consumption", "消耗量", "t", 2),
        IndicatorDefinition::editable("calorific_value", "低位发热量", "GJ/t", 3),
        IndicatorDefinition::editable("carbon_content", "单位热值含碳量", "tC/GJ", 5),
        IndicatorDefinition::editable("measured_carbon_content", "实测单位燃料含碳量", "tC/t", 5),
        IndicatorDefinition::editable("oxidation_rate", "碳氧化率", "%", 1),
        IndicatorDefinition::derived("emission", "二氧化碳排放量", "tCO2", 2),
    ]);

    let rules = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::Combustion {
            consumption: Operand::indicator("consumption"),
            calorific_value: Operand::indicator("calorific_value"),
            carbon_content: Operand::indicator("carbon_content"),
            override_carbon_content: Operand::indicator("measured_carbon_content"),
            oxidation_rate: Operand::indicator("oxidation_rate"),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::FuelCombustion,
        layout: ModuleLayout::Flat,
        schema,
        rules,
        report_key: "emission".to_string(),
        default_items: vec![
            ItemTemplate::default_entry("无烟煤", 0.0)
                .with_preset("calorific_value", 26.7)
                .with_preset("carbon_content", 0.0274)
                .with_preset("oxidation_rate", 94.0),
            ItemTemplate::default_entry("柴油", 0.0)
                .with_preset("calorific_value", 42.652)
                .with_preset("carbon_content", 0.0202)
                .with_preset("oxidation_rate", 98.0),
            ItemTemplate::default_entry("天然气", 0.0)
                .with_preset("calorific_value", 389.31)
                .with_preset("carbon_content", 0.0153)
                .with_preset("oxidation_rate", 99.0),
        ],
        default_groups: Vec::new(),
    }
}

// ==========================================
// 工业生产过程
// ==========================================

/// 工业生产过程模块档案 (碳酸盐分解)
///
/// 条目排放量 = max(0, 消耗量) × 排放因子;
/// 环节净排放 = Σ投入侧 - Σ产出侧。
pub fn industrial_process_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("consumption", "消耗量/产量", "t", 2),
        IndicatorDefinition::editable("emission_factor", "排放因子", "tCO2/t", 4),
        IndicatorDefinition::derived("emission", "二氧化碳排放量", "tCO2", 2),
    ])
    .with_factor_key("emission_factor");

    let rules = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::indicator("emission_factor"),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::IndustrialProcess,
        layout: ModuleLayout::Grouped,
        schema,
        rules,
        report_key: "emission".to_string(),
        default_items: Vec::new(),
        default_groups: vec![GroupTemplate::new("煅烧环节")
            .with_input(ItemTemplate::default_entry("石灰石", 0.4397))
            .with_input(ItemTemplate::default_entry("白云石", 0.4773))],
    }
}

// ==========================================
// 废水厌氧处理
// ==========================================

/// 废水厌氧处理模块档案
///
/// 排放量 = max(0, COD去除量) × 甲烷产生能力
///          × (1 - 回收率/100 × 利用率/100) × GWP_CH4。
pub fn wastewater_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("cod_removed", "COD去除量", "t", 2),
        IndicatorDefinition::editable("methane_factor", "甲烷产生能力", "tCH4/tCOD", 3)
            .with_default(0.25),
        IndicatorDefinition::editable("recovery_rate", "甲烷回收率", "%", 1),
        IndicatorDefinition::editable("utilization_rate", "回收利用率", "%", 1),
        IndicatorDefinition::derived("emission", "二氧化碳当量排放量", "tCO2e", 2),
    ]);

    let rules = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::RemovalEfficiency {
            consumption: Operand::indicator("cod_removed"),
            factor: Operand::indicator("methane_factor"),
            removal_efficiency: Operand::indicator("recovery_rate"),
            removal_usage: Operand::indicator("utilization_rate"),
            gwp: Operand::Constant(constants::GWP_CH4),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::Wastewater,
        layout: ModuleLayout::Flat,
        schema,
        rules,
        report_key: "emission".to_string(),
        default_items: vec![ItemTemplate::default_entry("厌氧处理系统", 0.0)],
        default_groups: Vec::new(),
    }
}

// ==========================================
// 二氧化碳回收利用 (抵扣项)
// ==========================================

/// 二氧化碳回收利用模块档案
///
/// 回收量 = max(0, 外供量×纯度 + 自用量×纯度)/100 × 气体密度;
/// 企业汇总时按抵扣项扣减。
pub fn carbon_recovery_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("supply_amount", "外供量", "万Nm³", 2),
        IndicatorDefinition::editable("supply_concentration", "外供纯度", "%", 1),
        IndicatorDefinition::editable("self_use_amount", "自用量", "万Nm³", 2),
        IndicatorDefinition::editable("self_use_concentration", "自用纯度", "%", 1),
        IndicatorDefinition::derived("recovered", "回收利用量", "tCO2", 2),
    ]);

    let rules = RuleTable::new(vec![RuleBinding::new(
        "recovered",
        CalculationRule::WeightedPair {
            term_a: Operand::indicator("supply_amount"),
            concentration_a: Operand::indicator("supply_concentration"),
            term_b: Operand::indicator("self_use_amount"),
            concentration_b: Operand::indicator("self_use_concentration"),
            density: Operand::Constant(constants::CO2_DENSITY),
            gwp: Operand::Constant(1.0),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::CarbonRecovery,
        layout: ModuleLayout::Flat,
        schema,
        rules,
        report_key: "recovered".to_string(),
        default_items: vec![ItemTemplate::default_entry("回收装置", 0.0)],
        default_groups: Vec::new(),
    }
}

// ==========================================
// 净购入电力热力
// ==========================================

/// 净购入电力热力模块档案
///
/// 排放量 = max(0, 净购入量) × 排放因子;
/// 电力/热力因子经基准因子落位到全年。
pub fn purchased_energy_profile() -> ModuleProfile {
    let schema = IndicatorSchema::new(vec![
        IndicatorDefinition::editable("consumption", "净购入量", "MWh/GJ", 2),
        IndicatorDefinition::editable("emission_factor", "排放因子", "tCO2/单位", 4),
        IndicatorDefinition::derived("emission", "二氧化碳排放量", "tCO2", 2),
    ])
    .with_factor_key("emission_factor");

    let rules = RuleTable::new(vec![RuleBinding::new(
        "emission",
        CalculationRule::DirectFactor {
            input: Operand::indicator("consumption"),
            factor: Operand::indicator("emission_factor"),
        },
    )]);

    ModuleProfile {
        kind: ModuleKind::PurchasedEnergy,
        layout: ModuleLayout::Flat,
        schema,
        rules,
        report_key: "emission".to_string(),
        default_items: vec![
            ItemTemplate::default_entry("电力", 0.5810),
            ItemTemplate::default_entry("热力", 0.11),
        ],
        default_groups: Vec::new(),
    }
}

/// 五个标准模块的档案,按企业汇总顺序
pub fn standard_profiles() -> Vec<ModuleProfile> {
    vec![
        fuel_combustion_profile(),
        industrial_process_profile(),
        wastewater_profile(),
        carbon_recovery_profile(),
        purchased_energy_profile(),
    ]
}
