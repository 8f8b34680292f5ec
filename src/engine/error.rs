// ==========================================
// 企业碳排放核算系统 - 引擎层错误类型
// ==========================================
// 红线: 数据质量问题永不报错 (按 0 计算)
// 硬失败仅限接线错误: 未知指标键 / 不存在的条目
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 接线错误 (程序/配置缺陷,快速失败) =====
    #[error("未知指标键: {key}")]
    UnknownIndicator { key: String },

    #[error("条目不存在: id={id}")]
    ItemNotFound { id: String },

    #[error("过程环节不存在: id={id}")]
    GroupNotFound { id: String },

    #[error("月份越界: {month} (合法范围 1-12)")]
    MonthOutOfRange { month: u8 },

    #[error("规则目标不是计算型指标: {key}")]
    RuleTargetNotDerived { key: String },

    #[error("模块布局不支持该操作: {operation}")]
    LayoutMismatch { operation: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
