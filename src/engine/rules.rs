// ==========================================
// 企业碳排放核算系统 - 计算规则库
// ==========================================
// 职责: 模块级纯公式目录,以数据形式供给
// 红线: 公式永不报错;缺失/非数值操作数按 0
// 红线: 同条目同月份取数,禁止跨月依赖
// ==========================================

use crate::domain::indicator::IndicatorSchema;
use crate::domain::item::Item;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// 碳转二氧化碳的分子量比 (CO2/C = 44/12)
pub const CARBON_TO_CO2: f64 = 44.0 / 12.0;

// ==========================================
// Operand - 公式操作数
// ==========================================
// 同条目同月份的指标值,或目录配置的常量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// 同条目同月份的指标值
    Indicator(String),
    /// 常量 (如 GWP/密度)
    Constant(f64),
}

impl Operand {
    /// 便捷构造: 指标操作数
    pub fn indicator(key: &str) -> Self {
        Operand::Indicator(key.to_string())
    }

    /// 取值 (指标缺失/空白/非数值按 0)
    pub fn resolve(&self, item: &Item, month: u8) -> f64 {
        match self {
            Operand::Indicator(key) => item.value(key, month),
            Operand::Constant(c) => *c,
        }
    }

    /// 引用的指标键 (常量为 None)
    fn indicator_key(&self) -> Option<&str> {
        match self {
            Operand::Indicator(key) => Some(key),
            Operand::Constant(_) => None,
        }
    }
}

// ==========================================
// CalculationRule - 计算规则
// ==========================================
// 每个形态对应指南中一类核算公式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "formula", rename_all = "snake_case")]
pub enum CalculationRule {
    /// 直接因子法: max(0, input) × factor
    DirectFactor { input: Operand, factor: Operand },

    /// 因子×效率: max(0, input) × factor × efficiency/100
    FactorWithEfficiency {
        input: Operand,
        factor: Operand,
        efficiency: Operand,
    },

    /// 双项加权 (密度/GWP 折算):
    /// max(0, a×ca + b×cb)/100 × density × gwp
    WeightedPair {
        term_a: Operand,
        concentration_a: Operand,
        term_b: Operand,
        concentration_b: Operand,
        density: Operand,
        gwp: Operand,
    },

    /// 燃烧公式 (含实测含碳量覆盖路径):
    /// 缺省 consumption × ncv × cc × oxidation/100 × 44/12;
    /// 实测单位燃料含碳量 > 0 时替换 ncv × cc 乘积
    Combustion {
        consumption: Operand,
        calorific_value: Operand,
        carbon_content: Operand,
        override_carbon_content: Operand,
        oxidation_rate: Operand,
    },

    /// 损耗比例: max(0, consumption) × loss_ratio/100
    LossRatio {
        consumption: Operand,
        loss_ratio: Operand,
    },

    /// 去除效率 (含回收利用折减):
    /// max(0, consumption) × factor × (1 - eff/100 × usage/100) × gwp
    RemovalEfficiency {
        consumption: Operand,
        factor: Operand,
        removal_efficiency: Operand,
        removal_usage: Operand,
        gwp: Operand,
    },
}

impl CalculationRule {
    /// 求值: 同条目同月份的纯函数,永不报错
    ///
    /// 负的原始投入量在使用前夹到 0;中间小计按各公式
    /// 规定夹到 0 后再做比例折算。
    pub fn evaluate(&self, item: &Item, month: u8) -> f64 {
        match self {
            CalculationRule::DirectFactor { input, factor } => {
                input.resolve(item, month).max(0.0) * factor.resolve(item, month)
            }

            CalculationRule::FactorWithEfficiency {
                input,
                factor,
                efficiency,
            } => {
                input.resolve(item, month).max(0.0)
                    * factor.resolve(item, month)
                    * efficiency.resolve(item, month)
                    / 100.0
            }

            CalculationRule::WeightedPair {
                term_a,
                concentration_a,
                term_b,
                concentration_b,
                density,
                gwp,
            } => {
                let weighted = term_a.resolve(item, month) * concentration_a.resolve(item, month)
                    + term_b.resolve(item, month) * concentration_b.resolve(item, month);
                weighted.max(0.0) / 100.0
                    * density.resolve(item, month)
                    * gwp.resolve(item, month)
            }

            CalculationRule::Combustion {
                consumption,
                calorific_value,
                carbon_content,
                override_carbon_content,
                oxidation_rate,
            } => {
                let consumed = consumption.resolve(item, month).max(0.0);
                let oxidation = oxidation_rate.resolve(item, month) / 100.0;
                // 实测含碳量 > 0 时覆盖缺省的 发热量×单位热值含碳量;
                // 等于 0 时回落缺省路径 (保留观察到的 > 0 判据)
                let measured = override_carbon_content.resolve(item, month);
                let carbon_per_unit = if measured > 0.0 {
                    measured
                } else {
                    calorific_value.resolve(item, month) * carbon_content.resolve(item, month)
                };
                consumed * carbon_per_unit * oxidation * CARBON_TO_CO2
            }

            CalculationRule::LossRatio {
                consumption,
                loss_ratio,
            } => {
                consumption.resolve(item, month).max(0.0) * loss_ratio.resolve(item, month) / 100.0
            }

            CalculationRule::RemovalEfficiency {
                consumption,
                factor,
                removal_efficiency,
                removal_usage,
                gwp,
            } => {
                let retained = 1.0
                    - removal_efficiency.resolve(item, month) / 100.0
                        * removal_usage.resolve(item, month)
                        / 100.0;
                consumption.resolve(item, month).max(0.0)
                    * factor.resolve(item, month)
                    * retained
                    * gwp.resolve(item, month)
            }
        }
    }

    /// 公式引用的全部操作数
    fn operands(&self) -> Vec<&Operand> {
        match self {
            CalculationRule::DirectFactor { input, factor } => vec![input, factor],
            CalculationRule::FactorWithEfficiency {
                input,
                factor,
                efficiency,
            } => vec![input, factor, efficiency],
            CalculationRule::WeightedPair {
                term_a,
                concentration_a,
                term_b,
                concentration_b,
                density,
                gwp,
            } => vec![term_a, concentration_a, term_b, concentration_b, density, gwp],
            CalculationRule::Combustion {
                consumption,
                calorific_value,
                carbon_content,
                override_carbon_content,
                oxidation_rate,
            } => vec![
                consumption,
                calorific_value,
                carbon_content,
                override_carbon_content,
                oxidation_rate,
            ],
            CalculationRule::LossRatio {
                consumption,
                loss_ratio,
            } => vec![consumption, loss_ratio],
            CalculationRule::RemovalEfficiency {
                consumption,
                factor,
                removal_efficiency,
                removal_usage,
                gwp,
            } => vec![consumption, factor, removal_efficiency, removal_usage, gwp],
        }
    }
}

// ==========================================
// RuleBinding - 目标指标与规则的绑定
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBinding {
    pub target: String,        // 计算型指标键
    pub rule: CalculationRule, // 求值公式
}

impl RuleBinding {
    pub fn new(target: &str, rule: CalculationRule) -> Self {
        Self {
            target: target.to_string(),
            rule,
        }
    }
}

// ==========================================
// RuleTable - 模块规则表
// ==========================================
// 以数据形式供给,构建时对指标目录做接线校验
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleTable {
    rules: Vec<RuleBinding>,
}

impl RuleTable {
    /// 创建规则表
    pub fn new(rules: Vec<RuleBinding>) -> Self {
        Self { rules }
    }

    /// 有序遍历规则绑定
    pub fn iter(&self) -> impl Iterator<Item = &RuleBinding> {
        self.rules.iter()
    }

    /// 规则数
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 接线校验: 目标必须是目录内的计算型指标,
    /// 指标操作数必须存在于目录
    ///
    /// # 返回
    /// - `Err(UnknownIndicator)`: 引用了目录外的指标键
    /// - `Err(RuleTargetNotDerived)`: 目标不是计算型指标
    pub fn validate(&self, schema: &IndicatorSchema) -> EngineResult<()> {
        for binding in &self.rules {
            match schema.get(&binding.target) {
                None => {
                    return Err(EngineError::UnknownIndicator {
                        key: binding.target.clone(),
                    })
                }
                Some(def) if !def.is_derived => {
                    return Err(EngineError::RuleTargetNotDerived {
                        key: binding.target.clone(),
                    })
                }
                Some(_) => {}
            }

            for operand in binding.rule.operands() {
                if let Some(key) = operand.indicator_key() {
                    if !schema.contains(key) {
                        return Err(EngineError::UnknownIndicator {
                            key: key.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
