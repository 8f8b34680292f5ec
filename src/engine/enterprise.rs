// ==========================================
// 企业碳排放核算系统 - 企业级汇总
// ==========================================
// 职责: 接收各模块上报,维护企业总量
// 公式: 燃烧 + 过程 + 废水 - 回收抵扣 + 净购入电力热力
// 口径: 同时给出含/不含净购入电力热力两个总量
// 说明: 对上层作用域沿用同一"仅真实变更才上报"模式
// ==========================================

use crate::domain::types::ModuleKind;
use crate::engine::notifier::{ChangeListener, ChangeNotifier, EmissionNotice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// EnterpriseSummary - 企业汇总快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleLine {
    pub module: ModuleKind, // 模块
    pub reported: f64,      // 模块上报总量 (恒为正口径)
    pub contribution: f64,  // 符号化贡献 (抵扣为负)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseSummary {
    pub total_including_purchased: f64, // 含净购入电力热力
    pub total_excluding_purchased: f64, // 不含净购入电力热力
    pub by_module: Vec<ModuleLine>,     // 按模块明细,固定顺序
}

// ==========================================
// EnterpriseAggregator - 企业级汇总器
// ==========================================
pub struct EnterpriseAggregator {
    latest: BTreeMap<ModuleKind, EmissionNotice>, // 各模块最近一次上报
    notifier: ChangeNotifier<EnterpriseSummary>,  // 对上层的上报通道
}

impl EnterpriseAggregator {
    /// 创建不对外上报的汇总器
    pub fn new() -> Self {
        Self {
            latest: BTreeMap::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// 创建带上层监听者的汇总器
    pub fn with_listener(listener: Arc<dyn ChangeListener<EnterpriseSummary>>) -> Self {
        Self {
            latest: BTreeMap::new(),
            notifier: ChangeNotifier::with_listener(listener),
        }
    }

    /// 接收一个模块的上报快照
    ///
    /// 按模块类型覆盖存量,重建企业汇总并做变更检测。
    ///
    /// # 返回
    /// - `Some(summary)`: 企业汇总发生真实变更,已对上层转发
    /// - `None`: 汇总未变,未做任何事
    pub fn receive(&mut self, notice: EmissionNotice) -> Option<EnterpriseSummary> {
        self.latest.insert(notice.module, notice);
        let summary = self.summary();
        if self.notifier.publish(summary.clone()) {
            tracing::debug!(
                total = summary.total_including_purchased,
                "企业汇总已更新并上报"
            );
            Some(summary)
        } else {
            None
        }
    }

    /// 某模块最近一次上报
    pub fn module_notice(&self, kind: ModuleKind) -> Option<&EmissionNotice> {
        self.latest.get(&kind)
    }

    /// 上次对上层上报的汇总
    pub fn last_reported(&self) -> Option<&EnterpriseSummary> {
        self.notifier.last_reported()
    }

    /// 基于当前存量构建企业汇总
    ///
    /// 未上报过的模块按 0 计入。
    pub fn summary(&self) -> EnterpriseSummary {
        let by_module: Vec<ModuleLine> = ModuleKind::ALL
            .iter()
            .map(|kind| {
                let reported = self
                    .latest
                    .get(kind)
                    .map(|notice| notice.total)
                    .unwrap_or(0.0);
                ModuleLine {
                    module: *kind,
                    reported,
                    contribution: kind.signed(reported),
                }
            })
            .collect();

        let total_including_purchased: f64 =
            by_module.iter().map(|line| line.contribution).sum();
        let purchased: f64 = by_module
            .iter()
            .filter(|line| line.module.is_purchased_energy())
            .map(|line| line.contribution)
            .sum();

        EnterpriseSummary {
            total_including_purchased,
            total_excluding_purchased: total_including_purchased - purchased,
            by_module,
        }
    }
}

impl Default for EnterpriseAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// EnterpriseRelay - 模块→企业的监听适配器
// ==========================================

/// 将模块上报直接转入企业汇总器的监听适配器
///
/// 使"模块通知器 → 企业汇总器"的接线成为显式注册,
/// 替代源系统中隐式的深层回调链。
pub struct EnterpriseRelay {
    inner: Arc<Mutex<EnterpriseAggregator>>,
}

impl EnterpriseRelay {
    pub fn new(aggregator: Arc<Mutex<EnterpriseAggregator>>) -> Self {
        Self { inner: aggregator }
    }
}

impl ChangeListener<EmissionNotice> for EnterpriseRelay {
    fn on_change(&self, payload: &EmissionNotice) {
        if let Ok(mut aggregator) = self.inner.lock() {
            aggregator.receive(payload.clone());
        }
    }
}
