// ==========================================
// 企业碳排放核算系统 - 变更通知器
// ==========================================
// 职责: 对外上报通道的"仅真实变更才通知"契约
// 说明: 引擎层定义 trait,父级汇总方实现监听器
// 优势: 模块不直接依赖父级,避免通知回路无界传播
// ==========================================

use crate::domain::types::ModuleKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// 上报载荷
// ==========================================

/// 分类明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLine {
    pub name: String, // 分类名 (条目名或环节名)
    pub amount: f64,  // 年度量
}

/// 条目明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLine {
    pub item_id: String,
    pub name: String,
    pub amount: f64, // 条目年度量
}

/// 模块对外上报通知
///
/// 父级作用域必须将其视为不可变快照;
/// 数值总量恒存在,明细按模块而异。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionNotice {
    pub module: ModuleKind,           // 来源模块
    pub total: f64,                   // 年度总量 (抵扣模块也为正值,符号在父级施加)
    pub breakdown: Vec<CategoryLine>, // 分类明细
    pub items: Vec<ItemLine>,         // 条目明细
}

// ==========================================
// 监听器 Trait
// ==========================================

/// 变更监听者 Trait
///
/// 引擎层定义,父级汇总作用域实现。
/// 仅在载荷与上次上报值不同时被调用。
pub trait ChangeListener<T>: Send + Sync {
    /// 接收新的上报载荷 (不可变快照)
    fn on_change(&self, payload: &T);
}

/// 空操作监听者
///
/// 用于不需要对外上报的场景 (如单元测试)
#[derive(Debug, Clone, Default)]
pub struct NoOpListener;

impl<T> ChangeListener<T> for NoOpListener {
    fn on_change(&self, _payload: &T) {}
}

/// 可选的监听者包装
///
/// 简化 Option<Arc<dyn ChangeListener<T>>> 的使用
pub struct OptionalListener<T> {
    inner: Option<Arc<dyn ChangeListener<T>>>,
}

impl<T> OptionalListener<T> {
    /// 创建带监听者的实例
    pub fn with_listener(listener: Arc<dyn ChangeListener<T>>) -> Self {
        Self {
            inner: Some(listener),
        }
    }

    /// 创建空实例 (不对外上报)
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 是否配置了监听者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    fn notify(&self, payload: &T) {
        if let Some(listener) = &self.inner {
            listener.on_change(payload);
        }
    }
}

impl<T> Default for OptionalListener<T> {
    fn default() -> Self {
        Self::none()
    }
}

// ==========================================
// ChangeNotifier - 变更通知器
// ==========================================

/// 变更通知器
///
/// 持有本通道"上次上报值";新载荷与其精确相等时
/// 不做任何事,否则存储并转发。正是这一机制阻断了
/// "通知父级 → 触发本模块重算 → 再次通知"的无界回路。
pub struct ChangeNotifier<T: Clone + PartialEq> {
    last_reported: Option<T>,
    listener: OptionalListener<T>,
}

impl<T: Clone + PartialEq> ChangeNotifier<T> {
    /// 创建不对外上报的通知器
    pub fn new() -> Self {
        Self {
            last_reported: None,
            listener: OptionalListener::none(),
        }
    }

    /// 创建带监听者的通知器
    pub fn with_listener(listener: Arc<dyn ChangeListener<T>>) -> Self {
        Self {
            last_reported: None,
            listener: OptionalListener::with_listener(listener),
        }
    }

    /// 上次上报值
    pub fn last_reported(&self) -> Option<&T> {
        self.last_reported.as_ref()
    }

    /// 提交新载荷
    ///
    /// # 返回
    /// - `true`: 与上次上报值存在真实差异,已存储并转发
    /// - `false`: 精确相等,未做任何事
    pub fn publish(&mut self, payload: T) -> bool {
        if self.last_reported.as_ref() == Some(&payload) {
            tracing::trace!("变更通知: 载荷与上次上报一致,跳过");
            return false;
        }
        self.listener.notify(&payload);
        self.last_reported = Some(payload);
        true
    }
}

impl<T: Clone + PartialEq> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// 记录每次转发的测试监听者
    struct Recorder {
        seen: Mutex<Vec<f64>>,
    }

    impl ChangeListener<EmissionNotice> for Recorder {
        fn on_change(&self, payload: &EmissionNotice) {
            self.seen.lock().unwrap().push(payload.total);
        }
    }

    fn notice(total: f64) -> EmissionNotice {
        EmissionNotice {
            module: ModuleKind::FuelCombustion,
            total,
            breakdown: Vec::new(),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_publish_only_on_real_change() {
        let mut notifier = ChangeNotifier::new();
        assert!(notifier.publish(notice(10.0)));
        assert!(!notifier.publish(notice(10.0)));
        assert!(notifier.publish(notice(11.0)));
        assert!(!notifier.publish(notice(11.0)));
        assert_eq!(notifier.last_reported().unwrap().total, 11.0);
    }

    #[test]
    fn test_listener_sees_each_distinct_total_once() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let listener = recorder.clone() as Arc<dyn ChangeListener<EmissionNotice>>;
        let mut notifier = ChangeNotifier::with_listener(listener);

        notifier.publish(notice(5.0));
        notifier.publish(notice(5.0));
        notifier.publish(notice(7.5));
        notifier.publish(notice(7.5));

        assert_eq!(*recorder.seen.lock().unwrap(), vec![5.0, 7.5]);
    }

    #[test]
    fn test_noop_listener() {
        let noop = Arc::new(NoOpListener) as Arc<dyn ChangeListener<EmissionNotice>>;
        let mut notifier = ChangeNotifier::with_listener(noop);
        assert!(notifier.publish(notice(1.0)));
    }
}
