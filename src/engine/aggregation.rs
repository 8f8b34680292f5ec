// ==========================================
// 企业碳排放核算系统 - 聚合引擎
// ==========================================
// 职责: 每次落账编辑后的一次性结算
// 输入: 条目集合 + 模块规则表
// 输出: 写回计算型指标 + 变更统计
// ==========================================
// 红线: 单次结算,不可重入,不可部分生效
// 红线: 仅在数值真实变化时写回 (支撑上游短路)
// ==========================================

use crate::domain::types::CellValue;
use crate::engine::collection::{ItemCollection, ProcessGroup};
use crate::engine::rules::RuleTable;
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// SettleOutcome - 结算结果
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettleOutcome {
    pub evaluated: usize,          // 求值次数 (条目×规则×月份)
    pub written: usize,            // 真实写回次数
    pub changed_items: Vec<String>, // 发生变更的条目 id
}

impl SettleOutcome {
    /// 集合层面是否发生任何变更
    pub fn changed(&self) -> bool {
        self.written > 0
    }

    /// 合并另一次结算的统计
    pub fn merge(&mut self, other: SettleOutcome) {
        self.evaluated += other.evaluated;
        self.written += other.written;
        self.changed_items.extend(other.changed_items);
    }
}

// ==========================================
// AggregationEngine - 聚合引擎
// ==========================================
// 红线: 无状态引擎,结果只依赖输入
pub struct AggregationEngine;

impl AggregationEngine {
    /// 创建新的聚合引擎
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 结算一个条目集合
    ///
    /// 对每个条目、每个月份 1..12、每条规则求值,
    /// 与当前存储值做数值比较,仅在真实差异时写回。
    ///
    /// # 返回
    /// 变更统计;written == 0 时集合对外表现不变,
    /// 上游变更检测可据此跳过通知。
    #[instrument(skip(self, collection, rules), fields(items = collection.len(), rules = rules.len()))]
    pub fn settle_collection(
        &self,
        collection: &mut ItemCollection,
        rules: &RuleTable,
    ) -> SettleOutcome {
        let mut outcome = SettleOutcome::default();
        if rules.is_empty() || collection.is_empty() {
            return outcome;
        }

        let schema = collection.schema_arc();
        let item_count = collection.len();

        for idx in 0..item_count {
            let mut item_changed = false;

            for binding in rules.iter() {
                for month in 1..=12u8 {
                    outcome.evaluated += 1;

                    let (fresh, stored) = {
                        let item = &collection.items()[idx];
                        (
                            binding.rule.evaluate(item, month),
                            item.value(&binding.target, month),
                        )
                    };

                    // 数值口径比较,精确相等则跳过写回
                    if fresh == stored {
                        continue;
                    }

                    let item = &mut collection.items_mut()[idx];
                    let series = item
                        .data
                        .entry(binding.target.clone())
                        .or_insert_with(|| match schema.get(&binding.target) {
                            Some(def) => schema.initialize_series(def),
                            None => crate::domain::indicator::MonthlySeries::seeded(
                                CellValue::Number(0.0),
                            ),
                        });
                    if let Some(entry) = series.entry_mut(month) {
                        entry.value = CellValue::Number(fresh);
                        outcome.written += 1;
                        item_changed = true;
                    }
                }
            }

            if item_changed {
                outcome
                    .changed_items
                    .push(collection.items()[idx].id.clone());
            }
        }

        if outcome.changed() {
            tracing::debug!(
                written = outcome.written,
                changed_items = outcome.changed_items.len(),
                "结算完成,存在真实变更"
            );
        }
        outcome
    }

    /// 结算一个生产过程环节 (投入/产出两侧)
    pub fn settle_group(&self, group: &mut ProcessGroup, rules: &RuleTable) -> SettleOutcome {
        let mut outcome = self.settle_collection(&mut group.inputs, rules);
        outcome.merge(self.settle_collection(&mut group.outputs, rules));
        outcome
    }

    // ==========================================
    // 汇总口径
    // ==========================================

    /// 集合某指标的月度合计
    pub fn collection_month_total(
        &self,
        collection: &ItemCollection,
        key: &str,
        month: u8,
    ) -> f64 {
        collection.monthly_total(key, month)
    }

    /// 集合某指标的年度合计
    pub fn collection_year_total(&self, collection: &ItemCollection, key: &str) -> f64 {
        collection.yearly_total(key)
    }

    /// 环节某指标某月净值 = Σ投入 - Σ产出
    pub fn group_net_month(&self, group: &ProcessGroup, key: &str, month: u8) -> f64 {
        group.net_month(key, month)
    }

    /// 环节某指标年度净值
    pub fn group_net_year(&self, group: &ProcessGroup, key: &str) -> f64 {
        group.net_year(key)
    }
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}
