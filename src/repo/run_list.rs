//! Run list parsing and expansion.

use crate::model::Role;
use std::collections::{HashMap, HashSet};

/// One entry of a Chef run list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunListItem<'a> {
    Role(&'a str),
    Recipe(&'a str),
}

impl<'a> RunListItem<'a> {
    /// Parse `role[name]`, `recipe[name]` or a bare recipe name.
    #[must_use]
    pub fn parse(item: &'a str) -> Self {
        let item = item.trim();
        if let Some(role) = bracketed(item, "role[") {
            Self::Role(role)
        } else if let Some(recipe) = bracketed(item, "recipe[") {
            Self::Recipe(recipe)
        } else {
            Self::Recipe(item)
        }
    }
}

fn bracketed<'a>(item: &'a str, prefix: &str) -> Option<&'a str> {
    item.strip_prefix(prefix)
        .map(|rest| rest.strip_suffix(']').unwrap_or(rest))
}

/// Roles named in a run list, minus those starting with `exclude_prefix`.
#[must_use]
pub fn role_list(run_list: &[&str], exclude_prefix: &str) -> Vec<String> {
    run_list
        .iter()
        .filter_map(|item| match RunListItem::parse(item) {
            RunListItem::Role(role) => Some(role),
            RunListItem::Recipe(_) => None,
        })
        .filter(|role| exclude_prefix.is_empty() || !role.starts_with(exclude_prefix))
        .map(str::to_string)
        .collect()
}

/// Recipes named directly in a run list.
#[must_use]
pub fn recipe_list(run_list: &[&str]) -> Vec<String> {
    run_list
        .iter()
        .filter(|item| item.contains("recipe["))
        .filter_map(|item| match RunListItem::parse(item) {
            RunListItem::Recipe(recipe) => Some(recipe.to_string()),
            RunListItem::Role(_) => None,
        })
        .collect()
}

/// A run list with every role expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedRunList {
    /// Roles in order of first appearance, nested roles included
    pub roles: Vec<String>,
    /// Recipes in order of first appearance
    pub recipes: Vec<String>,
}

/// Expand roles recursively.
///
/// Unknown roles are kept in `roles` but contribute no recipes. A role that
/// is reached twice is expanded once, which also breaks cycles.
#[must_use]
pub fn expand_run_list(run_list: &[&str], roles: &HashMap<&str, &Role>) -> ExpandedRunList {
    let mut expanded = ExpandedRunList::default();
    let mut seen_roles = HashSet::new();
    let mut seen_recipes = HashSet::new();
    expand_into(run_list, roles, &mut expanded, &mut seen_roles, &mut seen_recipes);
    expanded
}

fn expand_into(
    run_list: &[&str],
    roles: &HashMap<&str, &Role>,
    expanded: &mut ExpandedRunList,
    seen_roles: &mut HashSet<String>,
    seen_recipes: &mut HashSet<String>,
) {
    for item in run_list {
        match RunListItem::parse(item) {
            RunListItem::Role(name) => {
                if !seen_roles.insert(name.to_string()) {
                    continue;
                }
                expanded.roles.push(name.to_string());
                if let Some(role) = roles.get(name) {
                    let nested: Vec<&str> = role.run_list.iter().map(String::as_str).collect();
                    expand_into(&nested, roles, expanded, seen_roles, seen_recipes);
                } else {
                    tracing::debug!("Role '{}' is referenced but not defined", name);
                }
            }
            RunListItem::Recipe(name) => {
                if seen_recipes.insert(name.to_string()) {
                    expanded.recipes.push(name.to_string());
                }
            }
        }
    }
}
