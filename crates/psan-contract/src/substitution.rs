//! Substitution table
//!
//! Substitutions are named macro tokens the runner rewrites in test command
//! lines. The table is keyed by template so lookups and rewrites never scan
//! positionally, while the insertion order is kept for materialization: the
//! runner applies substitutions first to last.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ContractError;

/// A single macro token and its expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// Token as it appears in a test command (may include a trailing space)
    pub template: String,

    /// Text the token is replaced with
    pub replacement: String,
}

impl Substitution {
    pub fn new(template: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered substitutions keyed by template.
///
/// Templates are unique: [`SubstitutionTable::insert`] rejects a template that
/// is already present, and [`SubstitutionTable::override_replacement`] is the
/// only way to change an existing entry wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Substitution>", into = "Vec<Substitution>")]
pub struct SubstitutionTable {
    entries: Vec<Substitution>,
    index: BTreeMap<String, usize>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, template: &str) -> bool {
        self.index.contains_key(template)
    }

    /// Replacement registered for `template`, if any
    pub fn get(&self, template: &str) -> Option<&str> {
        self.index
            .get(template)
            .map(|&i| self.entries[i].replacement.as_str())
    }

    /// Position of `template` in application order
    pub fn position(&self, template: &str) -> Option<usize> {
        self.index.get(template).copied()
    }

    /// Append a new substitution at the end of the table.
    pub fn insert(
        &mut self,
        template: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<(), ContractError> {
        let template = template.into();
        if self.index.contains_key(&template) {
            return Err(ContractError::DuplicateTemplate(template));
        }
        self.index.insert(template.clone(), self.entries.len());
        self.entries.push(Substitution::new(template, replacement));
        Ok(())
    }

    /// Insert a new substitution ahead of every existing one.
    ///
    /// The runner matches the first entry first, so a front entry takes
    /// precedence over anything registered earlier.
    pub fn insert_front(
        &mut self,
        template: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<(), ContractError> {
        let template = template.into();
        if self.index.contains_key(&template) {
            return Err(ContractError::DuplicateTemplate(template));
        }
        self.entries.insert(0, Substitution::new(template, replacement));
        self.reindex();
        Ok(())
    }

    /// Replace the expansion of an existing template, or append it if absent.
    ///
    /// Returns the previous replacement.
    pub fn override_replacement(
        &mut self,
        template: &str,
        replacement: impl Into<String>,
    ) -> Option<String> {
        match self.index.get(template) {
            Some(&i) => Some(std::mem::replace(
                &mut self.entries[i].replacement,
                replacement.into(),
            )),
            None => {
                self.index.insert(template.to_string(), self.entries.len());
                self.entries.push(Substitution::new(template, replacement));
                None
            }
        }
    }

    /// Append `suffix` to the expansion of `template` if it is registered.
    ///
    /// Returns whether an entry was rewritten. Position and every other
    /// entry are left untouched.
    pub fn append_to(&mut self, template: &str, suffix: &str) -> bool {
        match self.index.get(template) {
            Some(&i) => {
                self.entries[i].replacement.push_str(suffix);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Substitution> {
        self.entries.iter()
    }

    /// Entries in application order
    pub fn materialize(&self) -> Vec<Substitution> {
        self.entries.clone()
    }

    /// Rewrite a command line the way the runner does: every occurrence of
    /// each template, in table order.
    pub fn expand(&self, command: &str) -> String {
        self.entries.iter().fold(command.to_string(), |line, sub| {
            if line.contains(&sub.template) {
                line.replace(&sub.template, &sub.replacement)
            } else {
                line
            }
        })
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, s)| (s.template.clone(), i))
            .collect();
    }
}

impl TryFrom<Vec<Substitution>> for SubstitutionTable {
    type Error = ContractError;

    fn try_from(entries: Vec<Substitution>) -> Result<Self, Self::Error> {
        let mut table = Self::new();
        for sub in entries {
            table.insert(sub.template, sub.replacement)?;
        }
        Ok(table)
    }
}

impl From<SubstitutionTable> for Vec<Substitution> {
    fn from(table: SubstitutionTable) -> Self {
        table.entries
    }
}
