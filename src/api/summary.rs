// ==========================================
// 企业碳排放核算系统 - 汇总视图
// ==========================================
// 职责: 模块/企业层面的只读汇总 DTO
// ==========================================

use crate::domain::types::ModuleKind;
use crate::engine::enterprise::EnterpriseSummary;
use crate::engine::module::EmissionModule;
use crate::engine::notifier::ItemLine;
use serde::{Deserialize, Serialize};

// ==========================================
// ModuleSummaryView - 模块汇总视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummaryView {
    pub kind: ModuleKind,          // 模块类型
    pub title: String,             // 中文标题
    pub is_deduction: bool,        // 是否为抵扣项
    pub yearly_total: f64,         // 年度总量
    pub monthly_totals: Vec<f64>,  // 12 个月总量,升序
    pub item_lines: Vec<ItemLine>, // 条目明细
}

impl ModuleSummaryView {
    /// 从模块实例构建汇总视图
    pub fn build(module: &EmissionModule) -> Self {
        let notice = module.build_notice();
        Self {
            kind: module.kind(),
            title: module.kind().title_cn().to_string(),
            is_deduction: module.kind().is_deduction(),
            yearly_total: notice.total,
            monthly_totals: (1..=12u8).map(|m| module.monthly_total(m)).collect(),
            item_lines: notice.items,
        }
    }
}

// ==========================================
// EnterpriseSummaryView - 企业汇总视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseLineView {
    pub module: ModuleKind,
    pub title: String,
    pub reported: f64,     // 模块上报总量
    pub contribution: f64, // 符号化贡献 (抵扣为负)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseSummaryView {
    pub total_including_purchased: f64,
    pub total_excluding_purchased: f64,
    pub lines: Vec<EnterpriseLineView>,
}

impl EnterpriseSummaryView {
    /// 从企业汇总快照构建视图
    pub fn build(summary: &EnterpriseSummary) -> Self {
        Self {
            total_including_purchased: summary.total_including_purchased,
            total_excluding_purchased: summary.total_excluding_purchased,
            lines: summary
                .by_module
                .iter()
                .map(|line| EnterpriseLineView {
                    module: line.module,
                    title: line.module.title_cn().to_string(),
                    reported: line.reported,
                    contribution: line.contribution,
                })
                .collect(),
        }
    }
}
