//! 规则注册表
//! 有序保存用户可编辑的规则，规则按列表顺序参与匹配

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defaults::default_rules;
use super::model::Rule;

/// 规则注册表
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternRegistry {
    rules: Vec<Rule>,
}

impl PatternRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用内置默认规则创建
    pub fn with_defaults() -> Self {
        Self::from_rules(default_rules())
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let mut registry = Self::new();
        for rule in rules {
            registry.add(rule);
        }
        registry
    }

    /// 添加规则；同名规则原位替换，保证名称唯一
    pub fn add(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => {
                debug!("替换同名规则：{}", rule.name);
                *existing = rule;
            }
            None => self.rules.push(rule),
        }
    }

    /// 删除规则，未知名称不做处理，返回是否有规则被删除
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        let removed = self.rules.len() != before;
        if !removed {
            debug!("删除规则时未找到：{}", name);
        }
        removed
    }

    /// 启用/禁用规则，未知名称不做处理，返回是否找到规则
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.name == name) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => {
                debug!("切换规则状态时未找到：{}", name);
                false
            }
        }
    }

    /// 按注册顺序列出全部规则
    pub fn list(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// 仅已启用的规则
    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
