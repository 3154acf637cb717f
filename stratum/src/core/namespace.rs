//! Reserved namespaces that always resolve through the parent layer.
//!
//! The table is a compile-time constant shared by every resolver in the
//! process. Tenants cannot extend or shrink it: it protects the language core,
//! XML processing and logging from being shadowed by job artifacts.

/// How a matching name is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Ask the parent only; local artifacts are never consulted.
    ParentFirst,
}

/// A namespace prefix plus its routing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceRule {
    pub prefix: &'static str,
    pub mode: RoutingMode,
}

impl NamespaceRule {
    const fn parent_first(prefix: &'static str) -> Self {
        Self {
            prefix,
            mode: RoutingMode::ParentFirst,
        }
    }

    /// Plain string prefix match on the dotted unit name.
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(self.prefix)
    }
}

pub const PARENT_FIRST_RULES: &[NamespaceRule] = &[
    NamespaceRule::parent_first("java."),
    NamespaceRule::parent_first("javax.xml"),
    NamespaceRule::parent_first("org.slf4j"),
    NamespaceRule::parent_first("org.apache.log4j"),
    NamespaceRule::parent_first("org.apache.logging"),
    NamespaceRule::parent_first("org.apache.commons.logging"),
    NamespaceRule::parent_first("ch.qos.logback"),
    NamespaceRule::parent_first("org.xml"),
    NamespaceRule::parent_first("org.w3c"),
    NamespaceRule::parent_first("org.apache.hadoop"),
];

/// Read-only view over a rule table.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceRouter {
    rules: &'static [NamespaceRule],
}

impl NamespaceRouter {
    /// Router over the process-wide reserved table.
    pub const fn reserved() -> Self {
        Self {
            rules: PARENT_FIRST_RULES,
        }
    }

    /// Routing mode forced for `name`, if any rule matches.
    pub fn route(&self, name: &str) -> Option<RoutingMode> {
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map(|rule| rule.mode)
    }

    pub fn is_parent_first(&self, name: &str) -> bool {
        self.route(name) == Some(RoutingMode::ParentFirst)
    }

    pub fn rules(&self) -> &'static [NamespaceRule] {
        self.rules
    }
}

impl Default for NamespaceRouter {
    fn default() -> Self {
        Self::reserved()
    }
}
