//! Type name to creator mapping.
//!
//! Each operator module contributes its creators through a `register` hook
//! while the factory is being built. Once the factory is installed the
//! registry is only read.

use std::collections::HashMap;

use thiserror::Error;

use crate::accel::CapabilityProbe;
use crate::operator::Operator;
use crate::rules::ResolveError;
use crate::spec::OperatorSpec;

/// Resolution rule plus construction for one operator kind.
pub type Creator = Box<
    dyn Fn(&OperatorSpec, &CapabilityProbe) -> Result<Box<dyn Operator>, ResolveError>
        + Send
        + Sync,
>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("operator type {type_name} registered twice")]
    Duplicate { type_name: String },

    #[error("unknown operator type: {type_name} (known types: {known})")]
    UnknownType { type_name: String, known: String },
}

#[derive(Default)]
pub struct Registry {
    creators: HashMap<String, Creator>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `creator` under `type_name`. A name can be claimed once.
    pub fn register<F>(&mut self, type_name: impl Into<String>, creator: F) -> Result<(), RegistryError>
    where
        F: Fn(&OperatorSpec, &CapabilityProbe) -> Result<Box<dyn Operator>, ResolveError>
            + Send
            + Sync
            + 'static,
    {
        let type_name = type_name.into();
        if self.creators.contains_key(&type_name) {
            return Err(RegistryError::Duplicate { type_name });
        }
        self.creators.insert(type_name, Box::new(creator));
        Ok(())
    }

    pub fn lookup(&self, type_name: &str) -> Result<&Creator, RegistryError> {
        self.creators
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                type_name: type_name.to_string(),
                known: self.type_names().join(", "),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.creators.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.creators.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_names())
            .finish()
    }
}
