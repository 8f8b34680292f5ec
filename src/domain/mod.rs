// ==========================================
// 企业碳排放核算系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含业务规则
// ==========================================

pub mod indicator;
pub mod item;
pub mod types;

// 重导出核心领域类型
pub use indicator::{format_value, IndicatorDefinition, IndicatorSchema, MonthEntry, MonthlySeries};
pub use item::{IndicatorPreset, Item, ItemTemplate};
pub use types::{CellValue, FieldPatch, GroupSide, ModuleKind};
