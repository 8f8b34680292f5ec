// ==========================================
// 企业碳排放核算系统 - 渲染契约视图
// ==========================================
// 职责: 供展示层按 (条目, 指标, 月份) 读取单元格
// 契约: 展示层读 (值, 单位, 数据来源, 支撑材料, 是否计算型),
//       编辑经由模块落账入口回流
// ==========================================

use crate::domain::indicator::format_value;
use crate::domain::types::CellValue;
use crate::engine::collection::ItemCollection;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ==========================================
// CellView - 单元格视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellView {
    pub value: CellValue,       // 原样存储值
    pub display: String,        // 定点格式化展示文本 (空白/非数值为空串)
    pub unit: String,           // 计量单位
    pub data_source: String,    // 数据来源说明
    pub supporting_material_ref: Option<String>, // 支撑材料句柄
    pub is_derived: bool,       // 是否为计算型指标 (展示层据此置只读)
}

/// 读取一个单元格视图
///
/// # 返回
/// - `Err(ItemNotFound / UnknownIndicator / MonthOutOfRange)`: 接线错误
pub fn cell_view(
    collection: &ItemCollection,
    item_id: &str,
    indicator_key: &str,
    month: u8,
) -> EngineResult<CellView> {
    let definition = collection
        .schema()
        .get(indicator_key)
        .ok_or_else(|| EngineError::UnknownIndicator {
            key: indicator_key.to_string(),
        })?
        .clone();
    let item = collection
        .get(item_id)
        .ok_or_else(|| EngineError::ItemNotFound {
            id: item_id.to_string(),
        })?;
    if !(1..=12).contains(&month) {
        return Err(EngineError::MonthOutOfRange { month });
    }

    // 序列尚未惰性创建时按初始状态展示
    let entry = item.series(indicator_key).and_then(|s| s.entry(month));
    let (value, data_source, supporting_material_ref) = match entry {
        Some(entry) => (
            entry.value.clone(),
            entry.data_source.clone(),
            entry.supporting_material_ref.clone(),
        ),
        None => (CellValue::Blank, String::new(), None),
    };

    Ok(CellView {
        display: format_value(&value, definition.decimal_places),
        value,
        unit: definition.unit.clone(),
        data_source,
        supporting_material_ref,
        is_derived: definition.is_derived,
    })
}

// ==========================================
// IndicatorRow - 条目的一行指标视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub key: String,          // 指标键
    pub display_name: String, // 展示名
    pub unit: String,         // 计量单位
    pub is_derived: bool,     // 是否计算型
    pub cells: Vec<CellView>, // 12 个月,升序
    pub yearly_total: f64,    // 年度合计
    pub yearly_display: String, // 年度合计展示文本
}

/// 读取一个条目的全部指标行 (目录顺序)
pub fn item_rows(collection: &ItemCollection, item_id: &str) -> EngineResult<Vec<IndicatorRow>> {
    let item = collection
        .get(item_id)
        .ok_or_else(|| EngineError::ItemNotFound {
            id: item_id.to_string(),
        })?;

    let mut rows = Vec::new();
    for definition in collection.schema().iter() {
        let cells = (1..=12u8)
            .map(|month| cell_view(collection, item_id, &definition.key, month))
            .collect::<EngineResult<Vec<_>>>()?;
        let yearly_total = item.yearly_total(&definition.key);
        rows.push(IndicatorRow {
            key: definition.key.clone(),
            display_name: definition.display_name.clone(),
            unit: definition.unit.clone(),
            is_derived: definition.is_derived,
            yearly_display: format_value(
                &CellValue::Number(yearly_total),
                definition.decimal_places,
            ),
            yearly_total,
            cells,
        });
    }
    Ok(rows)
}
