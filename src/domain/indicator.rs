// ==========================================
// 企业碳排放核算系统 - 指标目录与月度序列
// ==========================================
// 红线: 每个指标序列恒为 12 条,月份 1..12 升序
// 红线: 计算型指标只能由聚合引擎写入
// ==========================================

use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize};

// ==========================================
// IndicatorDefinition - 指标定义
// ==========================================
// 用途: 模块级静态目录,驱动条目数据种子与渲染
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    pub key: String,          // 指标键（目录内唯一）
    pub display_name: String, // 展示名
    pub unit: String,         // 计量单位
    pub decimal_places: u8,   // 展示小数位
    pub is_derived: bool,     // 是否为计算型指标
    pub default_value: Option<f64>, // 缺省值（种子时写入全年 12 个月）
}

impl IndicatorDefinition {
    /// 创建录入型指标
    pub fn editable(key: &str, display_name: &str, unit: &str, decimal_places: u8) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            unit: unit.to_string(),
            decimal_places,
            is_derived: false,
            default_value: None,
        }
    }

    /// 创建计算型指标
    pub fn derived(key: &str, display_name: &str, unit: &str, decimal_places: u8) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            unit: unit.to_string(),
            decimal_places,
            is_derived: true,
            default_value: None,
        }
    }

    /// 附加缺省值
    pub fn with_default(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }
}

// ==========================================
// MonthEntry - 月度录入单元
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub month: u8,            // 日历月份 1..=12
    pub value: CellValue,     // 原样保存的值
    pub data_source: String,  // 数据来源说明
    pub supporting_material_ref: Option<String>, // 支撑材料句柄（不透明）
}

impl MonthEntry {
    fn seeded(month: u8, value: CellValue) -> Self {
        Self {
            month,
            value,
            data_source: String::new(),
            supporting_material_ref: None,
        }
    }
}

// ==========================================
// MonthlySeries - 12 个月的值序列
// ==========================================
// 红线: entries 恒为 12 条且 entries[i].month == i+1
// 字段私有,只能经由受控方法访问
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    entries: Vec<MonthEntry>,
}

impl MonthlySeries {
    /// 以统一初值创建全年序列
    pub fn seeded(initial: CellValue) -> Self {
        let entries = (1..=12u8)
            .map(|month| MonthEntry::seeded(month, initial.clone()))
            .collect();
        Self { entries }
    }

    /// 按月取录入单元 (月份越界返回 None)
    pub fn entry(&self, month: u8) -> Option<&MonthEntry> {
        if (1..=12).contains(&month) {
            self.entries.get(month as usize - 1)
        } else {
            None
        }
    }

    /// 按月取可变录入单元 (月份越界返回 None)
    pub fn entry_mut(&mut self, month: u8) -> Option<&mut MonthEntry> {
        if (1..=12).contains(&month) {
            self.entries.get_mut(month as usize - 1)
        } else {
            None
        }
    }

    /// 全年 12 条录入单元,月份升序
    pub fn months(&self) -> &[MonthEntry] {
        &self.entries
    }

    /// 计算口径取某月数值 (空白/非数值/越界按 0)
    pub fn number(&self, month: u8) -> f64 {
        self.entry(month).map(|e| e.value.to_number()).unwrap_or(0.0)
    }

    /// 年度合计 = 12 个月数值之和
    pub fn yearly_total(&self) -> f64 {
        self.entries.iter().map(|e| e.value.to_number()).sum()
    }

    /// 将同一数值写入全年 12 个月 (基准因子传播用)
    pub fn fill(&mut self, value: CellValue) {
        for entry in &mut self.entries {
            entry.value = value.clone();
        }
    }
}

// ==========================================
// IndicatorSchema - 模块指标目录
// ==========================================
// 用途: 每个核算模块一份,驱动条目种子与规则校验
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSchema {
    indicators: Vec<IndicatorDefinition>,
    /// 基准因子落位的指标键 (add_item 时将 baseline_factor 写入全年)
    factor_key: Option<String>,
}

impl IndicatorSchema {
    /// 创建指标目录
    pub fn new(indicators: Vec<IndicatorDefinition>) -> Self {
        Self {
            indicators,
            factor_key: None,
        }
    }

    /// 指定基准因子落位指标
    pub fn with_factor_key(mut self, key: &str) -> Self {
        self.factor_key = Some(key.to_string());
        self
    }

    /// 按键查找指标定义
    pub fn get(&self, key: &str) -> Option<&IndicatorDefinition> {
        self.indicators.iter().find(|d| d.key == key)
    }

    /// 目录是否包含指标
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 有序遍历全部指标
    pub fn iter(&self) -> impl Iterator<Item = &IndicatorDefinition> {
        self.indicators.iter()
    }

    /// 基准因子落位指标键
    pub fn factor_key(&self) -> Option<&str> {
        self.factor_key.as_deref()
    }

    /// 初始化一个指标的全年序列
    ///
    /// 取值规则: 有缺省值用缺省值;计算型指标为 0;录入型指标为空白
    pub fn initialize_series(&self, indicator: &IndicatorDefinition) -> MonthlySeries {
        let initial = match indicator.default_value {
            Some(v) => CellValue::Number(v),
            None if indicator.is_derived => CellValue::Number(0.0),
            None => CellValue::Blank,
        };
        MonthlySeries::seeded(initial)
    }
}

// ==========================================
// 数值展示
// ==========================================

/// 统一的数值展示格式化
///
/// 纯函数,不改状态。空白/非数值返回空串,
/// 否则按指定小数位定点展示。
pub fn format_value(value: &CellValue, decimal_places: u8) -> String {
    match value.try_number() {
        Some(n) => format!("{:.*}", decimal_places as usize, n),
        None => String::new(),
    }
}
