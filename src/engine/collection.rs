// ==========================================
// 企业碳排放核算系统 - 条目集合管理
// ==========================================
// 职责: 条目的新增/移除/月度编辑
// 红线: 缺省条目受保护,移除为静默空操作
// 红线: 写入仅在新值与旧值不等价时构成真实变更
// ==========================================

use crate::domain::indicator::{IndicatorSchema, MonthlySeries};
use crate::domain::item::{Item, ItemTemplate};
use crate::domain::types::{CellValue, FieldPatch, GroupSide};
use crate::engine::error::{EngineError, EngineResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// ItemCollection - 条目集合
// ==========================================
// 每个模块实例独占一份,随模块创建与销毁
#[derive(Debug, Clone)]
pub struct ItemCollection {
    schema: Arc<IndicatorSchema>,
    items: Vec<Item>,
}

impl ItemCollection {
    /// 创建空集合
    pub fn new(schema: Arc<IndicatorSchema>) -> Self {
        Self {
            schema,
            items: Vec::new(),
        }
    }

    /// 指标目录
    pub fn schema(&self) -> &IndicatorSchema {
        &self.schema
    }

    /// 共享指标目录句柄
    pub fn schema_arc(&self) -> Arc<IndicatorSchema> {
        Arc::clone(&self.schema)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 全部条目,按加入顺序
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// 按 id 查找条目
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 是否包含指定 id
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 某指标的集合月度合计
    pub fn monthly_total(&self, key: &str, month: u8) -> f64 {
        self.items.iter().map(|item| item.value(key, month)).sum()
    }

    /// 某指标的集合年度合计
    pub fn yearly_total(&self, key: &str) -> f64 {
        self.items.iter().map(|item| item.yearly_total(key)).sum()
    }

    /// 引擎内部可变访问 (聚合引擎写回计算值用)
    pub(crate) fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    // ==========================================
    // 新增 / 移除
    // ==========================================

    /// 按模板种子一批缺省条目 (模块构建时调用)
    pub fn seed_defaults(&mut self, templates: &[ItemTemplate]) -> EngineResult<()> {
        for template in templates {
            self.add_item(template)?;
        }
        Ok(())
    }

    /// 新增条目
    ///
    /// 生成时间戳+随机尾缀的唯一 id,为目录中每个指标初始化全年序列,
    /// 将模板基准因子与品种缺省值传播到对应指标的 12 个月。
    ///
    /// # 返回
    /// - `Ok(id)`: 新条目 id
    /// - `Err(UnknownIndicator)`: 模板引用了目录外的指标键
    pub fn add_item(&mut self, template: &ItemTemplate) -> EngineResult<String> {
        // 1. 校验模板缺省值的指标键 (接线错误快速失败)
        for preset in &template.presets {
            if !self.schema.contains(&preset.key) {
                return Err(EngineError::UnknownIndicator {
                    key: preset.key.clone(),
                });
            }
        }

        // 2. 生成唯一 id: 毫秒时间戳 + 随机尾缀,快速连续调用也不冲突
        let id = next_item_id();

        // 3. 按目录初始化全部指标序列
        let mut item = Item {
            id: id.clone(),
            name: template.name.clone(),
            baseline_factor: template.baseline_factor,
            is_default: template.is_default,
            data: self
                .schema
                .iter()
                .map(|def| (def.key.clone(), self.schema.initialize_series(def)))
                .collect(),
            attachments: Default::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // 4. 基准因子传播到落位指标的全年
        if let Some(factor_key) = self.schema.factor_key() {
            if let Some(series) = item.data.get_mut(factor_key) {
                series.fill(CellValue::Number(template.baseline_factor));
            }
        }

        // 5. 品种缺省值传播到全年
        for preset in &template.presets {
            if let Some(series) = item.data.get_mut(&preset.key) {
                series.fill(CellValue::Number(preset.value));
            }
        }

        tracing::debug!(item_id = %id, name = %template.name, is_default = template.is_default, "新增条目");
        self.items.push(item);
        Ok(id)
    }

    /// 移除条目
    ///
    /// # 返回
    /// - `Ok(true)`: 已移除
    /// - `Ok(false)`: 条目受保护 (缺省目录条目),静默空操作
    /// - `Err(ItemNotFound)`: id 不存在 (接线错误)
    pub fn remove_item(&mut self, id: &str) -> EngineResult<bool> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| EngineError::ItemNotFound { id: id.to_string() })?;

        if self.items[idx].is_default {
            tracing::debug!(item_id = %id, "移除被拒: 缺省条目受保护");
            return Ok(false);
        }

        let removed = self.items.remove(idx);
        tracing::debug!(item_id = %removed.id, name = %removed.name, "移除条目");
        Ok(true)
    }

    // ==========================================
    // 月度编辑
    // ==========================================

    /// 更新某条目某指标某月的单个字段
    ///
    /// 定位 (或按目录惰性创建) 对应的月度单元,原样替换一个字段。
    /// 新值与旧值在数值或字符串口径下等价时为空操作。
    ///
    /// # 返回
    /// - `Ok(true)`: 真实状态变更
    /// - `Ok(false)`: 空操作
    pub fn update_month_value(
        &mut self,
        id: &str,
        indicator_key: &str,
        month: u8,
        patch: FieldPatch,
    ) -> EngineResult<bool> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::MonthOutOfRange { month });
        }
        if !self.schema.contains(indicator_key) {
            return Err(EngineError::UnknownIndicator {
                key: indicator_key.to_string(),
            });
        }

        let schema = Arc::clone(&self.schema);
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::ItemNotFound { id: id.to_string() })?;

        // 惰性创建: 条目早于目录扩展时序列可能缺失
        let series = item.data.entry(indicator_key.to_string()).or_insert_with(|| {
            let def = schema.get(indicator_key).cloned();
            match def {
                Some(def) => schema.initialize_series(&def),
                None => MonthlySeries::seeded(CellValue::Blank),
            }
        });

        let entry = series
            .entry_mut(month)
            .ok_or(EngineError::MonthOutOfRange { month })?;

        let changed = match patch {
            FieldPatch::Value(new_value) => {
                if entry.value.same_as(&new_value) {
                    false
                } else {
                    entry.value = new_value;
                    true
                }
            }
            FieldPatch::DataSource(new_source) => {
                if entry.data_source == new_source {
                    false
                } else {
                    entry.data_source = new_source;
                    true
                }
            }
            FieldPatch::SupportingMaterialRef(new_ref) => {
                if entry.supporting_material_ref == new_ref {
                    false
                } else {
                    entry.supporting_material_ref = new_ref;
                    true
                }
            }
        };

        if changed {
            item.touch();
        }
        Ok(changed)
    }

    /// 将同一字段补丁应用到全年 12 个月
    ///
    /// 用于"一个数据来源/附件适用全年"的便捷操作。
    ///
    /// # 返回
    /// - `Ok(true)`: 至少一个月发生真实变更
    pub fn bulk_set_field(
        &mut self,
        id: &str,
        indicator_key: &str,
        patch: FieldPatch,
    ) -> EngineResult<bool> {
        let mut changed = false;
        for month in 1..=12u8 {
            changed |= self.update_month_value(id, indicator_key, month, patch.clone())?;
        }
        Ok(changed)
    }

    // ==========================================
    // 元数据编辑
    // ==========================================

    /// 重命名条目 (等值为空操作)
    pub fn rename_item(&mut self, id: &str, name: &str) -> EngineResult<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::ItemNotFound { id: id.to_string() })?;
        if item.name == name {
            return Ok(false);
        }
        item.name = name.to_string();
        item.touch();
        Ok(true)
    }

    /// 更新条目基准因子并重新传播到落位指标的全年
    ///
    /// 因子等值时为空操作。
    pub fn set_baseline_factor(&mut self, id: &str, factor: f64) -> EngineResult<bool> {
        let factor_key = self.schema.factor_key().map(|k| k.to_string());
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::ItemNotFound { id: id.to_string() })?;
        if item.baseline_factor == factor {
            return Ok(false);
        }
        item.baseline_factor = factor;
        if let Some(key) = factor_key {
            if let Some(series) = item.data.get_mut(&key) {
                series.fill(CellValue::Number(factor));
            }
        }
        item.touch();
        Ok(true)
    }

    /// 存入/覆盖附件句柄 (核心不解读内容)
    pub fn set_attachment(&mut self, id: &str, slot: &str, handle: &str) -> EngineResult<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::ItemNotFound { id: id.to_string() })?;
        let previous = item.attachments.insert(slot.to_string(), handle.to_string());
        let changed = previous.as_deref() != Some(handle);
        if changed {
            item.touch();
        }
        Ok(changed)
    }

    /// 移除附件句柄
    pub fn remove_attachment(&mut self, id: &str, slot: &str) -> EngineResult<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::ItemNotFound { id: id.to_string() })?;
        let removed = item.attachments.remove(slot).is_some();
        if removed {
            item.touch();
        }
        Ok(removed)
    }
}

/// 生成条目 id: 毫秒时间戳 + UUID 随机尾缀
fn next_item_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", millis, &suffix[..8])
}

// ==========================================
// ProcessGroup - 生产过程环节
// ==========================================
// 净月度贡献 = Σ投入侧 - Σ产出侧
#[derive(Debug, Clone)]
pub struct ProcessGroup {
    pub id: String,
    pub name: String,
    pub inputs: ItemCollection,
    pub outputs: ItemCollection,
}

impl ProcessGroup {
    /// 创建空环节 (两侧共享同一指标目录)
    pub fn new(name: &str, schema: Arc<IndicatorSchema>) -> Self {
        Self {
            id: next_item_id(),
            name: name.to_string(),
            inputs: ItemCollection::new(Arc::clone(&schema)),
            outputs: ItemCollection::new(schema),
        }
    }

    /// 按侧取集合
    pub fn side(&self, side: GroupSide) -> &ItemCollection {
        match side {
            GroupSide::Input => &self.inputs,
            GroupSide::Output => &self.outputs,
        }
    }

    /// 按侧取可变集合
    pub fn side_mut(&mut self, side: GroupSide) -> &mut ItemCollection {
        match side {
            GroupSide::Input => &mut self.inputs,
            GroupSide::Output => &mut self.outputs,
        }
    }

    /// 某指标某月的环节净值 = Σ投入 - Σ产出
    pub fn net_month(&self, key: &str, month: u8) -> f64 {
        self.inputs.monthly_total(key, month) - self.outputs.monthly_total(key, month)
    }

    /// 某指标的环节年度净值
    pub fn net_year(&self, key: &str) -> f64 {
        (1..=12u8).map(|m| self.net_month(key, m)).sum()
    }

    /// 在两侧中查找条目
    pub fn find_item(&self, id: &str) -> Option<(&Item, GroupSide)> {
        if let Some(item) = self.inputs.get(id) {
            return Some((item, GroupSide::Input));
        }
        self.outputs.get(id).map(|item| (item, GroupSide::Output))
    }
}

// ==========================================
// CollectionStats - 集合统计 (快照/日志用)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub item_count: usize,
    pub default_count: usize,
}

impl ItemCollection {
    /// 集合统计快照
    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            item_count: self.items.len(),
            default_count: self.items.iter().filter(|i| i.is_default).count(),
        }
    }
}
