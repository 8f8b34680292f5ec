// ==========================================
// 企业碳排放核算系统 - 领域类型定义
// ==========================================
// 红线: 原始录入值原样保存,数值强转仅发生在计算时刻
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 红线: 写入时不做任何格式化或数值强转
// 空白/非数值在计算时按 0 处理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// 空白（未录入）
    Blank,
    /// 数值
    Number(f64),
    /// 原样文本（可能可解析为数值,也可能不可）
    Text(String),
}

impl CellValue {
    /// 是否为空白
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// 尝试解析为数值
    ///
    /// # 返回
    /// - `Some(f64)`: 数值或可解析文本
    /// - `None`: 空白或不可解析文本
    pub fn try_number(&self) -> Option<f64> {
        match self {
            CellValue::Blank => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(raw) => raw.trim().parse::<f64>().ok(),
        }
    }

    /// 计算口径取值: 空白/非数值按 0 处理
    pub fn to_number(&self) -> f64 {
        self.try_number().unwrap_or(0.0)
    }

    /// 展示口径文本: 空白为空串,数值/文本原样
    pub fn canonical_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(raw) => raw.clone(),
        }
    }

    /// 数值或字符串等价判断
    ///
    /// 两侧均可解析为数值时按数值比较,否则按展示文本比较。
    /// 写入仅在此判断为 false 时构成真实状态变更。
    pub fn same_as(&self, other: &CellValue) -> bool {
        match (self.try_number(), other.try_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self.canonical_text() == other.canonical_text(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Blank
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(raw: &str) -> Self {
        CellValue::Text(raw.to_string())
    }
}

impl From<String> for CellValue {
    fn from(raw: String) -> Self {
        CellValue::Text(raw)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_text())
    }
}

// ==========================================
// 核算模块类型 (Module Kind)
// ==========================================
// 企业级汇总公式:
//   燃烧 + 过程 + 废水 - 回收抵扣 + 净购入电力热力
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleKind {
    FuelCombustion,    // 化石燃料燃烧
    IndustrialProcess, // 工业生产过程
    Wastewater,        // 废水厌氧处理
    CarbonRecovery,    // 二氧化碳回收利用 (抵扣项)
    PurchasedEnergy,   // 净购入电力热力
}

impl ModuleKind {
    /// 全部模块,按企业汇总展示顺序
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::FuelCombustion,
        ModuleKind::IndustrialProcess,
        ModuleKind::Wastewater,
        ModuleKind::CarbonRecovery,
        ModuleKind::PurchasedEnergy,
    ];

    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            ModuleKind::FuelCombustion => "FUEL_COMBUSTION",
            ModuleKind::IndustrialProcess => "INDUSTRIAL_PROCESS",
            ModuleKind::Wastewater => "WASTEWATER",
            ModuleKind::CarbonRecovery => "CARBON_RECOVERY",
            ModuleKind::PurchasedEnergy => "PURCHASED_ENERGY",
        }
    }

    /// 中文标题
    pub fn title_cn(&self) -> &str {
        match self {
            ModuleKind::FuelCombustion => "化石燃料燃烧",
            ModuleKind::IndustrialProcess => "工业生产过程",
            ModuleKind::Wastewater => "废水厌氧处理",
            ModuleKind::CarbonRecovery => "二氧化碳回收利用",
            ModuleKind::PurchasedEnergy => "净购入电力热力",
        }
    }

    /// 是否为抵扣项（回收/回用量从总量中扣减）
    pub fn is_deduction(&self) -> bool {
        matches!(self, ModuleKind::CarbonRecovery)
    }

    /// 是否为净购入电力热力（企业总量需同时给出含/不含此项两个口径）
    pub fn is_purchased_energy(&self) -> bool {
        matches!(self, ModuleKind::PurchasedEnergy)
    }

    /// 对企业总量的符号贡献
    pub fn signed(&self, total: f64) -> f64 {
        if self.is_deduction() {
            -total
        } else {
            total
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 月度字段补丁 (Field Patch)
// ==========================================
// 一次编辑只替换 MonthEntry 的一个字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPatch {
    /// 替换数值字段（原样写入,不强转）
    Value(CellValue),
    /// 替换数据来源说明
    DataSource(String),
    /// 替换支撑材料句柄（不透明,核心不解读）
    SupportingMaterialRef(Option<String>),
}

impl FieldPatch {
    /// 字段名（用于日志）
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldPatch::Value(_) => "value",
            FieldPatch::DataSource(_) => "data_source",
            FieldPatch::SupportingMaterialRef(_) => "supporting_material_ref",
        }
    }
}

// ==========================================
// 过程环节条目侧 (Group Side)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupSide {
    Input,  // 投入侧（加）
    Output, // 产出侧（减）
}

impl fmt::Display for GroupSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSide::Input => write!(f, "INPUT"),
            GroupSide::Output => write!(f, "OUTPUT"),
        }
    }
}
