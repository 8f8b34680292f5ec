// ==========================================
// 企业碳排放核算系统 - 缺省目录与模块档案
// ==========================================
// 职责: 以配置数据形式供给模块档案
//       (指标目录 + 规则表 + 缺省条目 + 常量)
// 红线: 目录由外部配置供给,核心不计算目录内容
// ==========================================

use crate::domain::indicator::IndicatorSchema;
use crate::domain::item::ItemTemplate;
use crate::domain::types::ModuleKind;
use crate::engine::rules::RuleTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==========================================
// 全局常量 (指南缺省值)
// ==========================================
pub mod constants {
    /// 甲烷全球增温潜势 (CO2当量折算)
    pub const GWP_CH4: f64 = 21.0;
    /// 氧化亚氮全球增温潜势
    pub const GWP_N2O: f64 = 310.0;
    /// 二氧化碳气体密度 (t/万Nm³)
    pub const CO2_DENSITY: f64 = 19.7;
}

// ==========================================
// 配置层错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("模块档案解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

// ==========================================
// GroupTemplate - 过程环节模板
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTemplate {
    pub name: String,                // 环节名称
    #[serde(default)]
    pub inputs: Vec<ItemTemplate>,   // 投入侧缺省条目
    #[serde(default)]
    pub outputs: Vec<ItemTemplate>,  // 产出侧缺省条目
}

impl GroupTemplate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, template: ItemTemplate) -> Self {
        self.inputs.push(template);
        self
    }

    pub fn with_output(mut self, template: ItemTemplate) -> Self {
        self.outputs.push(template);
        self
    }
}

// ==========================================
// ModuleLayout - 模块条目布局
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleLayout {
    Flat,    // 平铺条目集合
    Grouped, // 按生产过程环节分组 (投入-产出净值)
}

// ==========================================
// ModuleProfile - 模块档案
// ==========================================
// 一个核算模块的全部静态配置,可由 JSON 供给
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleProfile {
    pub kind: ModuleKind,            // 模块类型
    pub layout: ModuleLayout,        // 条目布局
    pub schema: IndicatorSchema,     // 指标目录
    pub rules: RuleTable,            // 计算规则表
    pub report_key: String,          // 汇入模块总量的计算型指标
    #[serde(default)]
    pub default_items: Vec<ItemTemplate>,   // 平铺布局缺省条目
    #[serde(default)]
    pub default_groups: Vec<GroupTemplate>, // 分环节布局缺省环节
}

impl ModuleProfile {
    /// 从 JSON 配置解析模块档案
    pub fn from_json(raw: &str) -> Result<Self, CatalogueError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 序列化为 JSON (配置快照用)
    pub fn to_json(&self) -> Result<String, CatalogueError> {
        Ok(serde_json::to_string(self)?)
    }
}
