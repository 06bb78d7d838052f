//! Name-based lookup of validators and actions.
//!
//! Templates refer to callables by name; the host registers the implementations
//! here. A missing name is reported when it is first needed, never at load time.

use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::Value;

use crate::{
    data::{CallableRef, Setting, SettingPath},
    error::ValidationError,
    template::Template,
};

/// Checks a proposed value. `Err` carries the reason shown to the user.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), String> {
        self(value)
    }
}

/// Side effect run after a value passed validation.
pub trait Action: Send + Sync {
    fn run(&self, value: &Value) -> anyhow::Result<()>;
}

impl<F> Action for F
where
    F: Fn(&Value) -> anyhow::Result<()> + Send + Sync,
{
    fn run(&self, value: &Value) -> anyhow::Result<()> {
        self(value)
    }
}

/// Registry of callables, cheap to clone.
#[derive(Clone, Default)]
pub struct Dispatcher {
    validators: HashMap<String, Arc<dyn Validator>>,
    actions: HashMap<String, Arc<dyn Action>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_validator<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.insert_validator(name, Arc::new(validator));
    }

    pub fn register_action<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert_action(name, Arc::new(action));
    }

    /// Register a shared validator object; replaces any previous one of that name.
    pub fn insert_validator(&mut self, name: impl Into<String>, validator: Arc<dyn Validator>) {
        let name = name.into();
        debug!("registered validator `{name}`");
        self.validators.insert(name, validator);
    }

    /// Register a shared action object; replaces any previous one of that name.
    pub fn insert_action(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        let name = name.into();
        debug!("registered action `{name}`");
        self.actions.insert(name, action);
    }

    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Run the setting's validators in declaration order, stopping at the first rejection.
    pub fn validate(&self, setting: &Setting, value: &Value) -> Result<(), ValidationError> {
        for name in &setting.validators {
            let validator = self
                .validators
                .get(&name.0)
                .ok_or_else(|| unknown(&setting.path, name))?;
            validator
                .validate(value)
                .map_err(|reason| ValidationError::Rejected {
                    path: setting.path.clone(),
                    validator: name.0.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Run the setting's actions in declaration order, stopping at the first failure.
    pub fn run_actions(&self, setting: &Setting, value: &Value) -> Result<(), ValidationError> {
        for name in &setting.actions {
            let action = self
                .actions
                .get(&name.0)
                .ok_or_else(|| unknown(&setting.path, name))?;
            action
                .run(value)
                .map_err(|e| ValidationError::ActionFailed {
                    path: setting.path.clone(),
                    action: name.0.clone(),
                    reason: format!("{e:#}"),
                })?;
        }
        Ok(())
    }

    /// Every callable referenced by `template` that is not registered here.
    pub fn missing_callables<'a>(
        &self,
        template: &'a Template,
    ) -> Vec<(&'a SettingPath, &'a CallableRef)> {
        let mut missing = Vec::new();
        for (_, setting) in template.settings().iter() {
            for name in &setting.validators {
                if !self.has_validator(&name.0) {
                    missing.push((&setting.path, name));
                }
            }
            for name in &setting.actions {
                if !self.has_action(&name.0) {
                    missing.push((&setting.path, name));
                }
            }
        }
        missing
    }
}

fn unknown(path: &SettingPath, name: &CallableRef) -> ValidationError {
    ValidationError::UnknownCallable {
        path: path.clone(),
        name: name.0.clone(),
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validators: Vec<&String> = self.validators.keys().collect();
        let mut actions: Vec<&String> = self.actions.keys().collect();
        validators.sort();
        actions.sort();
        f.debug_struct("Dispatcher")
            .field("validators", &validators)
            .field("actions", &actions)
            .finish()
    }
}
