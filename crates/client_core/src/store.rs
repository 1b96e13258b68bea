use std::{collections::HashSet, fmt, str::FromStr};

use shared::{domain::Gender, protocol::Contact};
use thiserror::Error;
use tracing::warn;

use crate::collation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    BirthDate,
    Gender,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Name, SortField::BirthDate, SortField::Gender];

    /// Backend field name.
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "nome",
            SortField::BirthDate => "data_nascimento",
            SortField::Gender => "sexo",
        }
    }

    pub fn key(self, contact: &Contact) -> &str {
        match self {
            SortField::Name => &contact.name,
            SortField::BirthDate => &contact.birth_date,
            SortField::Gender => contact.gender.as_str(),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort field '{0}' (expected nome, data_nascimento or sexo)")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s.trim())
            .ok_or_else(|| UnknownSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    filtered: Vec<Contact>,
    gender_filter: Option<Gender>,
    search_term: Option<String>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full list. The filtered view is dropped; callers reapply
    /// filters. Records repeating an earlier id are discarded.
    pub fn replace_all(&mut self, contacts: Vec<Contact>) -> usize {
        let mut seen = HashSet::with_capacity(contacts.len());
        self.contacts = contacts
            .into_iter()
            .filter(|contact| {
                let fresh = seen.insert(contact.id);
                if !fresh {
                    warn!(contact_id = %contact.id, "dropping duplicate contact id from backend");
                }
                fresh
            })
            .collect();
        self.filtered.clear();
        self.gender_filter = None;
        self.contacts.len()
    }

    pub fn filter_by_gender(&mut self, gender: &Gender) -> &[Contact] {
        self.filtered = self
            .contacts
            .iter()
            .filter(|contact| &contact.gender == gender)
            .cloned()
            .collect();
        self.gender_filter = Some(gender.clone());
        &self.filtered
    }

    pub fn clear_filters(&mut self) {
        self.filtered.clear();
        self.gender_filter = None;
        self.search_term = None;
    }

    /// Sorts the active list in place: the filtered view when it has entries,
    /// otherwise the full list.
    pub fn sort_by(&mut self, field: SortField) -> &[Contact] {
        let active = if self.filtered.is_empty() {
            &mut self.contacts
        } else {
            &mut self.filtered
        };
        active.sort_by(|a, b| collation::compare(field.key(a), field.key(b)));
        active
    }

    pub fn set_search_term(&mut self, term: Option<String>) {
        self.search_term = term
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn gender_filter(&self) -> Option<&Gender> {
        self.gender_filter.as_ref()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn filtered(&self) -> &[Contact] {
        &self.filtered
    }

    pub fn active(&self) -> &[Contact] {
        if self.filtered.is_empty() {
            &self.contacts
        } else {
            &self.filtered
        }
    }

    /// The active list narrowed by the search term, if any.
    pub fn visible(&self) -> Vec<&Contact> {
        let Some(term) = &self.search_term else {
            return self.active().iter().collect();
        };
        let needle = collation::fold(term);
        self.active()
            .iter()
            .filter(|contact| collation::fold(&contact.name).contains(&needle))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
