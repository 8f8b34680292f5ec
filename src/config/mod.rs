// ==========================================
// 企业碳排放核算系统 - 配置层
// ==========================================
// 职责: 缺省目录与模块档案,以数据形式供给核心
// ==========================================

pub mod catalogue;
pub mod presets;

// 重导出核心配置类型
pub use catalogue::{constants, CatalogueError, GroupTemplate, ModuleLayout, ModuleProfile};
pub use presets::{
    carbon_recovery_profile, fuel_combustion_profile, industrial_process_profile,
    purchased_energy_profile, standard_profiles, wastewater_profile,
};
