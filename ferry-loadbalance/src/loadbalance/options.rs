use ferry_core::SelectorError;

use super::filter::Filter;
use super::strategy::Strategy;

/// 单次调用的选择参数
///
/// 与选择器的默认值在调用时合并：策略覆盖默认策略，过滤器追加在默认过滤器之后
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub strategy: Option<Strategy>,
    pub filters: Vec<Filter>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// 合并另一组参数，后者的策略优先，过滤器按顺序追加
    pub fn merge(&mut self, other: SelectOptions) {
        if other.strategy.is_some() {
            self.strategy = other.strategy;
        }
        self.filters.extend(other.filters);
    }

    pub fn validate(&self) -> Result<(), SelectorError> {
        if let Some(strategy) = &self.strategy {
            strategy.validate()?;
        }
        for filter in &self.filters {
            filter.validate()?;
        }
        Ok(())
    }
}
