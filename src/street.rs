//! Street and rural road names, indexed by street id

use crate::error::{RegistryError, RenameError};
use crate::junction::{StreetId, MAX_ID};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreetRegistry {
    names: Vec<String>,
}

impl StreetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> Result<StreetId, RegistryError> {
        u16::try_from(self.names.len() + 1)
            .ok()
            .and_then(StreetId::new)
            .ok_or(RegistryError::StreetsExhausted(MAX_ID))
    }

    /// Add a name without checking for duplicates
    pub fn register(&mut self, name: impl Into<String>) -> Result<StreetId, RegistryError> {
        let id = self.next_id()?;
        self.names.push(name.into());
        Ok(id)
    }

    pub fn name(&self, id: StreetId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Case-insensitive lookup
    pub fn id_by_name(&self, name: &str) -> Option<StreetId> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .and_then(|index| u16::try_from(index + 1).ok())
            .and_then(StreetId::new)
    }

    /// Existing id for `name`, or a new street
    pub fn get_or_create(&mut self, name: &str) -> Result<StreetId, RegistryError> {
        match self.id_by_name(name) {
            Some(id) => Ok(id),
            None => self.register(name),
        }
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<StreetId, RenameError> {
        let id = self
            .id_by_name(old)
            .ok_or_else(|| RenameError::NotFound(old.to_string()))?;
        if self.id_by_name(new).is_some_and(|other| other != id) {
            return Err(RenameError::AlreadyExists(new.to_string()));
        }
        self.names[id.index()] = new.to_string();
        Ok(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut reg = StreetRegistry::new();
        let id = reg.register("Harbor Rd").unwrap();
        assert_eq!(reg.id_by_name("harbor rd"), Some(id));
        assert_eq!(reg.get_or_create("HARBOR RD"), Ok(id));
        assert_eq!(reg.len(), 1);
        let other = reg.get_or_create("Mill Ln").unwrap();
        assert_eq!(other.get(), 2);
    }

    #[test]
    fn test_rename_validates_names() {
        let mut reg = StreetRegistry::new();
        let a = reg.register("Harbor Rd").unwrap();
        reg.register("Mill Ln").unwrap();
        assert_eq!(
            reg.rename("Quarry Way", "Anything"),
            Err(RenameError::NotFound("Quarry Way".to_string()))
        );
        assert_eq!(
            reg.rename("Harbor Rd", "mill ln"),
            Err(RenameError::AlreadyExists("mill ln".to_string()))
        );
        assert_eq!(reg.rename("harbor rd", "Harbor Road"), Ok(a));
        assert_eq!(reg.name(a), Some("Harbor Road"));
        // a case-only rename of the same street is allowed
        assert_eq!(reg.rename("Harbor Road", "HARBOR ROAD"), Ok(a));
    }
}
