//! Toggling of compiler define symbols per build target group.
//!
//! Symbols are stored the way project settings keep them: one `;`-separated
//! string per group. Whenever a function takes `group: Option<..>`, `None`
//! means the store's currently selected group.

use std::{collections::BTreeMap, fmt};

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildTargetGroup {
    #[default]
    Standalone,
    Android,
    Ios,
    WebGl,
}

impl fmt::Display for BuildTargetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildTargetGroup::Standalone => "Standalone",
            BuildTargetGroup::Android => "Android",
            BuildTargetGroup::Ios => "iOS",
            BuildTargetGroup::WebGl => "WebGL",
        };
        f.write_str(name)
    }
}

/// Where the raw symbol strings live.
pub trait DefineSymbolStore {
    fn selected_group(&self) -> BuildTargetGroup;

    fn raw_symbols(&self, group: BuildTargetGroup) -> String;

    fn set_raw_symbols(&mut self, group: BuildTargetGroup, symbols: &str);
}

/// In-memory project settings, persisted as RON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub selected_group: BuildTargetGroup,
    pub define_symbols: BTreeMap<BuildTargetGroup, String>,
}

impl ProjectSettings {
    pub fn from_ron(source: &str) -> anyhow::Result<Self> {
        ron::from_str(source).context("failed to parse project settings")
    }

    pub fn to_ron(&self) -> anyhow::Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("failed to write project settings")
    }
}

impl DefineSymbolStore for ProjectSettings {
    fn selected_group(&self) -> BuildTargetGroup {
        self.selected_group
    }

    fn raw_symbols(&self, group: BuildTargetGroup) -> String {
        self.define_symbols.get(&group).cloned().unwrap_or_default()
    }

    fn set_raw_symbols(&mut self, group: BuildTargetGroup, symbols: &str) {
        self.define_symbols.insert(group, symbols.to_string());
    }
}

/// Symbols defined for `group`, in stored order. Empty entries are dropped.
pub fn symbols<S: DefineSymbolStore + ?Sized>(
    store: &S,
    group: Option<BuildTargetGroup>,
) -> Vec<String> {
    let group = group.unwrap_or_else(|| store.selected_group());
    store
        .raw_symbols(group)
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn has_symbol<S: DefineSymbolStore + ?Sized>(
    store: &S,
    symbol: &str,
    group: Option<BuildTargetGroup>,
) -> bool {
    symbols(store, group).iter().any(|s| s == symbol)
}

/**
 * Adds (`enabled`) or removes the define `symbol`.
 *
 * Removing drops every occurrence. Returns whether the stored symbols changed.
 */
pub fn set_symbol<S: DefineSymbolStore + ?Sized>(
    store: &mut S,
    symbol: &str,
    enabled: bool,
    group: Option<BuildTargetGroup>,
) -> bool {
    let group = group.unwrap_or_else(|| store.selected_group());
    if enabled == has_symbol(store, symbol, Some(group)) {
        return false;
    }

    let mut current = symbols(store, Some(group));
    if enabled {
        current.push(symbol.to_string());
        info!("Added {} define for {}", symbol, group);
    } else {
        let size = current.len();
        current.retain(|s| s != symbol);
        info!(
            "Removed {} occurrences of {} define for {}",
            size - current.len(),
            symbol,
            group
        );
    }
    store.set_raw_symbols(group, &current.join(";"));
    true
}

/**
 * Keeps `symbol` defined exactly when `class_name` resolves through `class_exists`,
 * e.g. to switch SDK specific code on when the SDK is present.
 *
 * Returns whether the class exists.
 */
pub fn define_class<S, F>(
    store: &mut S,
    class_name: &str,
    symbol: &str,
    group: Option<BuildTargetGroup>,
    class_exists: F,
) -> bool
where
    S: DefineSymbolStore + ?Sized,
    F: Fn(&str) -> bool,
{
    let exists = class_exists(class_name);
    set_symbol(store, symbol, exists, group);
    exists
}
