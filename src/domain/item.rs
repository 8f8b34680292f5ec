// ==========================================
// 企业碳排放核算系统 - 核算条目领域模型
// ==========================================
// 红线: 缺省目录条目受保护,不可移除
// 用途: 目录层种子写入,引擎层读写月度数据
// ==========================================

use crate::domain::indicator::MonthlySeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Item - 核算条目 (燃料/原料/产品/能源)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    // ===== 主键 =====
    pub id: String, // 条目唯一标识（时间戳+随机尾缀）

    // ===== 基础信息 =====
    pub name: String,         // 条目名称（如 无烟煤/石灰石/电力）
    pub baseline_factor: f64, // 基准因子（目录配置,种子时传播到全年）
    pub is_default: bool,     // 缺省目录条目标志（受保护,不可移除）

    // ===== 月度数据 =====
    pub data: HashMap<String, MonthlySeries>, // 指标键 → 12 个月序列

    // ===== 附件 =====
    pub attachments: HashMap<String, String>, // 附件槽位 → 不透明句柄

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 最后人工编辑时间
}

impl Item {
    /// 按指标键取序列
    pub fn series(&self, key: &str) -> Option<&MonthlySeries> {
        self.data.get(key)
    }

    /// 计算口径取某指标某月数值
    ///
    /// 序列缺失/空白/非数值均按 0 处理 (MissingOperand 策略)
    pub fn value(&self, key: &str, month: u8) -> f64 {
        self.data.get(key).map(|s| s.number(month)).unwrap_or(0.0)
    }

    /// 某指标的年度合计
    pub fn yearly_total(&self, key: &str) -> f64 {
        self.data.get(key).map(|s| s.yearly_total()).unwrap_or(0.0)
    }

    /// 刷新人工编辑时间戳
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ==========================================
// IndicatorPreset - 条目级指标缺省
// ==========================================
// 用途: 目录条目携带的品种缺省值 (如燃料低位发热量)
// 种子时写入对应指标的全年 12 个月
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorPreset {
    pub key: String, // 指标键
    pub value: f64,  // 缺省值
}

impl IndicatorPreset {
    pub fn new(key: &str, value: f64) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }
}

// ==========================================
// ItemTemplate - 条目模板
// ==========================================
// 用途: 缺省目录种子与"新增条目"操作的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,                  // 条目名称
    pub baseline_factor: f64,          // 基准因子
    pub is_default: bool,              // 是否为受保护的缺省条目
    #[serde(default)]
    pub presets: Vec<IndicatorPreset>, // 条目级指标缺省值
}

impl ItemTemplate {
    /// 创建用户新增条目模板 (可移除)
    pub fn user(name: &str) -> Self {
        Self {
            name: name.to_string(),
            baseline_factor: 0.0,
            is_default: false,
            presets: Vec::new(),
        }
    }

    /// 创建缺省目录条目模板 (受保护)
    pub fn default_entry(name: &str, baseline_factor: f64) -> Self {
        Self {
            name: name.to_string(),
            baseline_factor,
            is_default: true,
            presets: Vec::new(),
        }
    }

    /// 附加条目级指标缺省值
    pub fn with_preset(mut self, key: &str, value: f64) -> Self {
        self.presets.push(IndicatorPreset::new(key, value));
        self
    }

    /// 设置基准因子
    pub fn with_baseline_factor(mut self, factor: f64) -> Self {
        self.baseline_factor = factor;
        self
    }
}
