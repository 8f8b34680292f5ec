// ==========================================
// 企业碳排放核算系统 - 核算模块实例
// ==========================================
// 职责: 将指标目录 + 规则表 + 条目集合 + 通知器
//       组装为一个显式持有的聚合体
// 红线: 编辑按到达顺序处理,结算完成前不接受下一次编辑
//       (单线程同步调用链天然保证)
// 红线: 落账编辑 → 结算 → 上报,一次且仅一次
// ==========================================

use crate::config::catalogue::{ModuleLayout, ModuleProfile};
use crate::domain::indicator::IndicatorSchema;
use crate::domain::item::{Item, ItemTemplate};
use crate::domain::types::{FieldPatch, GroupSide, ModuleKind};
use crate::engine::aggregation::{AggregationEngine, SettleOutcome};
use crate::engine::collection::{ItemCollection, ProcessGroup};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::notifier::{
    CategoryLine, ChangeListener, ChangeNotifier, EmissionNotice, ItemLine,
};
use crate::engine::rules::RuleTable;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// ModuleItems - 模块条目布局
// ==========================================
// 平铺: 燃烧/废水/回收/购入能源
// 分环节: 工业生产过程 (投入-产出净值)
#[derive(Debug, Clone)]
pub enum ModuleItems {
    Flat(ItemCollection),
    Grouped(Vec<ProcessGroup>),
}

// ==========================================
// CommitOutcome - 落账结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CommitOutcome {
    pub changed: bool,                  // 原始编辑是否构成真实变更
    pub settle: SettleOutcome,          // 结算统计
    pub notice: Option<EmissionNotice>, // 本次对外转发的通知 (未变更则 None)
}

// ==========================================
// EmissionModule - 核算模块实例
// ==========================================
pub struct EmissionModule {
    kind: ModuleKind,
    schema: Arc<IndicatorSchema>,
    rules: RuleTable,
    report_key: String, // 汇入模块总量的计算型指标
    items: ModuleItems,
    engine: AggregationEngine,
    notifier: ChangeNotifier<EmissionNotice>,
}

impl EmissionModule {
    /// 从模块档案构建 (不对外上报)
    ///
    /// 构建即完成规则接线校验、缺省目录种子与首次结算;
    /// 首次结算不触发上报,调用方通过 `refresh` 发起初次上报。
    pub fn from_profile(profile: ModuleProfile) -> EngineResult<Self> {
        Self::build(profile, ChangeNotifier::new())
    }

    /// 从模块档案构建并注册对外监听者
    pub fn from_profile_with_listener(
        profile: ModuleProfile,
        listener: Arc<dyn ChangeListener<EmissionNotice>>,
    ) -> EngineResult<Self> {
        Self::build(profile, ChangeNotifier::with_listener(listener))
    }

    fn build(
        profile: ModuleProfile,
        notifier: ChangeNotifier<EmissionNotice>,
    ) -> EngineResult<Self> {
        // 1. 接线校验 (快速失败)
        profile.rules.validate(&profile.schema)?;
        if !profile.schema.contains(&profile.report_key) {
            return Err(EngineError::UnknownIndicator {
                key: profile.report_key.clone(),
            });
        }

        let schema = Arc::new(profile.schema);

        // 2. 按布局种子缺省条目
        let items = match profile.layout {
            ModuleLayout::Flat => {
                let mut collection = ItemCollection::new(Arc::clone(&schema));
                collection.seed_defaults(&profile.default_items)?;
                ModuleItems::Flat(collection)
            }
            ModuleLayout::Grouped => {
                let mut groups = Vec::new();
                for template in &profile.default_groups {
                    let mut group = ProcessGroup::new(&template.name, Arc::clone(&schema));
                    group.inputs.seed_defaults(&template.inputs)?;
                    group.outputs.seed_defaults(&template.outputs)?;
                    groups.push(group);
                }
                ModuleItems::Grouped(groups)
            }
        };

        let mut module = Self {
            kind: profile.kind,
            schema,
            rules: profile.rules,
            report_key: profile.report_key,
            items,
            engine: AggregationEngine::new(),
            notifier,
        };

        // 3. 首次结算,使计算型指标与种子数据一致
        module.settle();
        tracing::info!(module = %module.kind, "核算模块已构建");
        Ok(module)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn schema(&self) -> &IndicatorSchema {
        &self.schema
    }

    pub fn report_key(&self) -> &str {
        &self.report_key
    }

    /// 平铺布局的条目集合
    pub fn collection(&self) -> Option<&ItemCollection> {
        match &self.items {
            ModuleItems::Flat(collection) => Some(collection),
            ModuleItems::Grouped(_) => None,
        }
    }

    /// 分环节布局的环节列表 (平铺布局为空)
    pub fn groups(&self) -> &[ProcessGroup] {
        match &self.items {
            ModuleItems::Flat(_) => &[],
            ModuleItems::Grouped(groups) => groups,
        }
    }

    /// 跨布局按 id 查找条目
    pub fn find_item(&self, id: &str) -> Option<&Item> {
        match &self.items {
            ModuleItems::Flat(collection) => collection.get(id),
            ModuleItems::Grouped(groups) => groups
                .iter()
                .find_map(|g| g.find_item(id).map(|(item, _)| item)),
        }
    }

    /// 上次对外上报的通知
    pub fn last_notice(&self) -> Option<&EmissionNotice> {
        self.notifier.last_reported()
    }

    /// 模块某月总量 (分环节布局为各环节净值之和)
    pub fn monthly_total(&self, month: u8) -> f64 {
        match &self.items {
            ModuleItems::Flat(collection) => collection.monthly_total(&self.report_key, month),
            ModuleItems::Grouped(groups) => groups
                .iter()
                .map(|g| g.net_month(&self.report_key, month))
                .sum(),
        }
    }

    /// 模块年度总量
    pub fn yearly_total(&self) -> f64 {
        (1..=12u8).map(|m| self.monthly_total(m)).sum()
    }

    // ==========================================
    // 落账编辑入口
    // ==========================================

    /// 落账一次月度字段编辑
    ///
    /// 提交原始值 → 结算全部计算型指标 → 变更检测上报。
    /// 空操作编辑不触发结算与上报。
    #[instrument(skip(self, patch), fields(module = %self.kind, item_id = %item_id, indicator = %indicator_key, month = month, field = patch.field_name()))]
    pub fn commit_month_value(
        &mut self,
        item_id: &str,
        indicator_key: &str,
        month: u8,
        patch: FieldPatch,
    ) -> EngineResult<CommitOutcome> {
        let changed = self
            .owning_collection_mut(item_id)?
            .update_month_value(item_id, indicator_key, month, patch)?;
        Ok(self.after_edit(changed))
    }

    /// 落账一次全年字段编辑 (12 个月同一补丁)
    pub fn commit_bulk_field(
        &mut self,
        item_id: &str,
        indicator_key: &str,
        patch: FieldPatch,
    ) -> EngineResult<CommitOutcome> {
        let changed = self
            .owning_collection_mut(item_id)?
            .bulk_set_field(item_id, indicator_key, patch)?;
        Ok(self.after_edit(changed))
    }

    /// 新增条目 (平铺布局)
    pub fn add_item(&mut self, template: &ItemTemplate) -> EngineResult<(String, CommitOutcome)> {
        let collection = match &mut self.items {
            ModuleItems::Flat(collection) => collection,
            ModuleItems::Grouped(_) => {
                return Err(EngineError::LayoutMismatch {
                    operation: "add_item (分环节布局请使用 add_group_item)".to_string(),
                })
            }
        };
        let id = collection.add_item(template)?;
        let outcome = self.after_edit(true);
        Ok((id, outcome))
    }

    /// 新增条目到指定环节的指定侧 (分环节布局)
    pub fn add_group_item(
        &mut self,
        group_id: &str,
        side: GroupSide,
        template: &ItemTemplate,
    ) -> EngineResult<(String, CommitOutcome)> {
        let groups = match &mut self.items {
            ModuleItems::Grouped(groups) => groups,
            ModuleItems::Flat(_) => {
                return Err(EngineError::LayoutMismatch {
                    operation: "add_group_item (平铺布局请使用 add_item)".to_string(),
                })
            }
        };
        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or_else(|| EngineError::GroupNotFound {
                id: group_id.to_string(),
            })?;
        let id = group.side_mut(side).add_item(template)?;
        let outcome = self.after_edit(true);
        Ok((id, outcome))
    }

    /// 新增生产过程环节 (分环节布局)
    pub fn add_group(&mut self, name: &str) -> EngineResult<(String, CommitOutcome)> {
        let schema = Arc::clone(&self.schema);
        let groups = match &mut self.items {
            ModuleItems::Grouped(groups) => groups,
            ModuleItems::Flat(_) => {
                return Err(EngineError::LayoutMismatch {
                    operation: "add_group".to_string(),
                })
            }
        };
        let group = ProcessGroup::new(name, schema);
        let id = group.id.clone();
        groups.push(group);
        let outcome = self.after_edit(true);
        Ok((id, outcome))
    }

    /// 移除生产过程环节
    pub fn remove_group(&mut self, group_id: &str) -> EngineResult<CommitOutcome> {
        let groups = match &mut self.items {
            ModuleItems::Grouped(groups) => groups,
            ModuleItems::Flat(_) => {
                return Err(EngineError::LayoutMismatch {
                    operation: "remove_group".to_string(),
                })
            }
        };
        let idx = groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| EngineError::GroupNotFound {
                id: group_id.to_string(),
            })?;
        groups.remove(idx);
        Ok(self.after_edit(true))
    }

    /// 移除条目
    ///
    /// # 返回
    /// - `Ok((true, outcome))`: 已移除并完成结算/上报
    /// - `Ok((false, outcome))`: 条目受保护,集合原样不动
    pub fn remove_item(&mut self, item_id: &str) -> EngineResult<(bool, CommitOutcome)> {
        let removed = self.owning_collection_mut(item_id)?.remove_item(item_id)?;
        let outcome = self.after_edit(removed);
        Ok((removed, outcome))
    }

    /// 重命名条目
    pub fn rename_item(&mut self, item_id: &str, name: &str) -> EngineResult<CommitOutcome> {
        let changed = self.owning_collection_mut(item_id)?.rename_item(item_id, name)?;
        Ok(self.after_edit(changed))
    }

    /// 更新条目基准因子 (重新传播到落位指标全年)
    pub fn set_baseline_factor(&mut self, item_id: &str, factor: f64) -> EngineResult<CommitOutcome> {
        let changed = self
            .owning_collection_mut(item_id)?
            .set_baseline_factor(item_id, factor)?;
        Ok(self.after_edit(changed))
    }

    /// 存入附件句柄
    pub fn set_attachment(
        &mut self,
        item_id: &str,
        slot: &str,
        handle: &str,
    ) -> EngineResult<CommitOutcome> {
        let changed = self
            .owning_collection_mut(item_id)?
            .set_attachment(item_id, slot, handle)?;
        Ok(self.after_edit(changed))
    }

    /// 手动刷新: 结算并无条件走一次变更检测上报
    ///
    /// 用于构建后发起初次上报;输入未变时通知器自会短路。
    pub fn refresh(&mut self) -> CommitOutcome {
        self.after_edit(true)
    }

    // ==========================================
    // 内部: 结算与上报
    // ==========================================

    /// 编辑收尾: 真实变更时结算 + 变更检测上报
    fn after_edit(&mut self, changed: bool) -> CommitOutcome {
        if !changed {
            return CommitOutcome::default();
        }
        let settle = self.settle();
        let notice = self.publish_if_changed();
        CommitOutcome {
            changed,
            settle,
            notice,
        }
    }

    /// 对全部条目做一次结算
    fn settle(&mut self) -> SettleOutcome {
        match &mut self.items {
            ModuleItems::Flat(collection) => self.engine.settle_collection(collection, &self.rules),
            ModuleItems::Grouped(groups) => {
                let mut outcome = SettleOutcome::default();
                for group in groups.iter_mut() {
                    outcome.merge(self.engine.settle_group(group, &self.rules));
                }
                outcome
            }
        }
    }

    /// 构建上报载荷并交由通知器做变更检测
    fn publish_if_changed(&mut self) -> Option<EmissionNotice> {
        let notice = self.build_notice();
        if self.notifier.publish(notice.clone()) {
            tracing::debug!(module = %self.kind, total = notice.total, "模块总量已上报");
            Some(notice)
        } else {
            None
        }
    }

    /// 构建当前状态的上报快照
    pub fn build_notice(&self) -> EmissionNotice {
        let (breakdown, items) = match &self.items {
            ModuleItems::Flat(collection) => {
                let breakdown = collection
                    .items()
                    .iter()
                    .map(|item| CategoryLine {
                        name: item.name.clone(),
                        amount: item.yearly_total(&self.report_key),
                    })
                    .collect();
                let items = collection
                    .items()
                    .iter()
                    .map(|item| ItemLine {
                        item_id: item.id.clone(),
                        name: item.name.clone(),
                        amount: item.yearly_total(&self.report_key),
                    })
                    .collect();
                (breakdown, items)
            }
            ModuleItems::Grouped(groups) => {
                let breakdown = groups
                    .iter()
                    .map(|group| CategoryLine {
                        name: group.name.clone(),
                        amount: group.net_year(&self.report_key),
                    })
                    .collect();
                let items = groups
                    .iter()
                    .flat_map(|group| {
                        group
                            .inputs
                            .items()
                            .iter()
                            .chain(group.outputs.items().iter())
                    })
                    .map(|item| ItemLine {
                        item_id: item.id.clone(),
                        name: item.name.clone(),
                        amount: item.yearly_total(&self.report_key),
                    })
                    .collect();
                (breakdown, items)
            }
        };

        EmissionNotice {
            module: self.kind,
            total: self.yearly_total(),
            breakdown,
            items,
        }
    }

    /// 定位条目所属的集合 (接线错误快速失败)
    fn owning_collection_mut(&mut self, item_id: &str) -> EngineResult<&mut ItemCollection> {
        match &mut self.items {
            ModuleItems::Flat(collection) => {
                if collection.contains(item_id) {
                    Ok(collection)
                } else {
                    Err(EngineError::ItemNotFound {
                        id: item_id.to_string(),
                    })
                }
            }
            ModuleItems::Grouped(groups) => {
                for group in groups.iter_mut() {
                    if group.inputs.contains(item_id) {
                        return Ok(&mut group.inputs);
                    }
                    if group.outputs.contains(item_id) {
                        return Ok(&mut group.outputs);
                    }
                }
                Err(EngineError::ItemNotFound {
                    id: item_id.to_string(),
                })
            }
        }
    }
}
