// ==========================================
// 企业碳排放核算系统 - 核心库
// ==========================================
// 系统定位: 月度指标核算与多级聚合引擎
// 边界: 不做持久化/网络/界面,由外层协作方承担
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 核算业务规则
pub mod engine;

// 配置层 - 缺省目录与模块档案
pub mod config;

// API 层 - 展示层视图契约
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    format_value, CellValue, FieldPatch, GroupSide, IndicatorDefinition, IndicatorSchema,
    IndicatorPreset, Item, ItemTemplate, ModuleKind, MonthEntry, MonthlySeries,
};

// 引擎
pub use engine::{
    AggregationEngine, CalculationRule, CategoryLine, ChangeListener, ChangeNotifier,
    CommitOutcome, EmissionModule, EmissionNotice, EngineError, EngineResult,
    EnterpriseAggregator, EnterpriseRelay, EnterpriseSummary, ItemCollection, ItemLine,
    ModuleItems, NoOpListener, Operand, ProcessGroup, RuleBinding, RuleTable, SettleOutcome,
    CARBON_TO_CO2,
};

// 配置
pub use config::{
    constants, fuel_combustion_profile, standard_profiles, CatalogueError, GroupTemplate,
    ModuleLayout, ModuleProfile,
};

// API
pub use api::{cell_view, item_rows, CellView, EnterpriseSummaryView, ModuleSummaryView};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "企业碳排放核算系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
