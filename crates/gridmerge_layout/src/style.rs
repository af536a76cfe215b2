//! Style rules and the role-based style resolver.

use serde::{Deserialize, Serialize};

use crate::conf::{STYLE_ID_HEADER_DEFAULT, STYLE_ID_ROW_DEFAULT};
use crate::spec::{ConfigError, EnumCellRole, StyleId};

/// Style override for one target name, optionally scoped to one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecStyleRule {
    /// Dataset or table name the rule applies to.
    pub name: String,
    /// Table-local zero-based column; `None` matches every column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,
    /// Style id for header cells.
    pub header_style: StyleId,
    /// Style id for data cells.
    pub row_style: StyleId,
}

impl SpecStyleRule {
    /// Style id for `role`.
    pub fn style_for(&self, role: EnumCellRole) -> StyleId {
        match role {
            EnumCellRole::Header => self.header_style,
            EnumCellRole::Row => self.row_style,
        }
    }
}

/// Ordered rule registry. First registration per `(name, column_index)` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRuleSet {
    rules: Vec<SpecStyleRule>,
}

impl StyleRuleSet {
    /// Empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule`; returns `false` when an equal key was already present.
    pub fn add(&mut self, rule: SpecStyleRule) -> bool {
        if self.find(&rule.name, rule.column_index).is_some() {
            log::debug!(
                "style rule for {:?} (column {:?}) already registered; ignoring duplicate",
                rule.name,
                rule.column_index
            );
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Register a rule that applies to every column of `name`.
    pub fn add_named(
        &mut self,
        name: impl Into<String>,
        header_style: impl Into<StyleId>,
        row_style: impl Into<StyleId>,
    ) -> bool {
        self.add(SpecStyleRule {
            name: name.into(),
            column_index: None,
            header_style: header_style.into(),
            row_style: row_style.into(),
        })
    }

    /// Register a rule scoped to one table-local column of `name`.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_index: u32,
        header_style: impl Into<StyleId>,
        row_style: impl Into<StyleId>,
    ) -> bool {
        self.add(SpecStyleRule {
            name: name.into(),
            column_index: Some(column_index),
            header_style: header_style.into(),
            row_style: row_style.into(),
        })
    }

    /// Exact lookup by `(name, column_index)`.
    pub fn find(&self, name: &str, column_index: Option<u32>) -> Option<&SpecStyleRule> {
        self.rules
            .iter()
            .find(|rule| rule.name == name && rule.column_index == column_index)
    }

    /// Registered rules in registration order.
    pub fn rules(&self) -> &[SpecStyleRule] {
        &self.rules
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Load rules from a JSON array, applying first-wins deduplication.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let l_rules: Vec<SpecStyleRule> = serde_json::from_str(text)?;
        Ok(l_rules.into_iter().collect())
    }

    /// Serialize rules as a JSON array.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }
}

impl FromIterator<SpecStyleRule> for StyleRuleSet {
    fn from_iter<T: IntoIterator<Item = SpecStyleRule>>(iter: T) -> Self {
        let mut rule_set = Self::new();
        for rule in iter {
            rule_set.add(rule);
        }
        rule_set
    }
}

/// Resolve style ids against an immutable rule set.
#[derive(Debug, Clone, Copy)]
pub struct StyleResolver<'a> {
    rules: &'a StyleRuleSet,
    id_header_default: StyleId,
    id_row_default: StyleId,
}

impl<'a> StyleResolver<'a> {
    /// Resolver with the builtin role defaults.
    pub fn new(rules: &'a StyleRuleSet) -> Self {
        Self::with_defaults(rules, STYLE_ID_HEADER_DEFAULT, STYLE_ID_ROW_DEFAULT)
    }

    /// Resolver with custom role defaults.
    pub fn with_defaults(
        rules: &'a StyleRuleSet,
        id_header_default: StyleId,
        id_row_default: StyleId,
    ) -> Self {
        Self {
            rules,
            id_header_default,
            id_row_default,
        }
    }

    /// Name-level lookup; unscoped rules only, then the role default.
    pub fn resolve(&self, target: &str, role: EnumCellRole) -> StyleId {
        match self.rules.find(target, None) {
            Some(rule) => rule.style_for(role),
            None => self.default_for(role),
        }
    }

    /// Column-scoped lookup falling back to [`Self::resolve`].
    pub fn resolve_at(&self, target: &str, column_index: u32, role: EnumCellRole) -> StyleId {
        match self.rules.find(target, Some(column_index)) {
            Some(rule) => rule.style_for(role),
            None => self.resolve(target, role),
        }
    }

    /// Fallback id for `role`.
    pub fn default_for(&self, role: EnumCellRole) -> StyleId {
        match role {
            EnumCellRole::Header => self.id_header_default,
            EnumCellRole::Row => self.id_row_default,
        }
    }
}
