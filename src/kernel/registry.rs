use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::record::TelemetryRecord;

pub type InitFn = Box<dyn FnMut(&Value) -> anyhow::Result<()> + Send>;
pub type ContributeFn = Box<dyn FnMut() -> anyhow::Result<TelemetryRecord> + Send>;

/// A named data source. Both capabilities are optional; the registry only
/// calls what is present.
#[derive(Default)]
pub struct Plugin {
    init: Option<InitFn>,
    contribute: Option<ContributeFn>,
}

impl Plugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Value) -> anyhow::Result<()> + Send + 'static,
    {
        self.init = Some(Box::new(f));
        self
    }

    pub fn with_contribute<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> anyhow::Result<TelemetryRecord> + Send + 'static,
    {
        self.contribute = Some(Box::new(f));
        self
    }

    pub fn has_init(&self) -> bool {
        self.init.is_some()
    }

    pub fn has_contribute(&self) -> bool {
        self.contribute.is_some()
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("init", &self.has_init())
            .field("contribute", &self.has_contribute())
            .finish()
    }
}

/// Plugins in registration order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<(String, Plugin)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-registering a name replaces the plugin but keeps its original slot.
    pub fn register(&mut self, name: impl Into<String>, plugin: Plugin) {
        let name = name.into();
        match self.plugins.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                debug!("plugin `{}` replaced", name);
                *existing = plugin;
            }
            None => self.plugins.push((name, plugin)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Routes each option to the initializer of the plugin sharing its name.
    /// Options no initializer claims are handed back as top-level overrides.
    pub fn dispatch_init(&mut self, options: Map<String, Value>) -> Vec<(String, Value)> {
        let mut overrides = Vec::new();
        for (name, value) in options {
            let init = self
                .plugins
                .iter_mut()
                .find(|(n, _)| *n == name)
                .and_then(|(_, p)| p.init.as_mut());
            match init {
                Some(init) => {
                    if let Err(e) = init(&value) {
                        warn!("plugin `{}` failed to initialize: {:#}", name, e);
                    }
                }
                None => {
                    if self.get(&name).is_some() {
                        debug!("plugin `{}` has no initializer, option applied at top level", name);
                    }
                    overrides.push((name, value));
                }
            }
        }
        overrides
    }

    /// Runs every contribution hook in registration order and folds the
    /// results into `record`. Later plugins win on collisions.
    pub fn contribute_into(&mut self, record: &mut TelemetryRecord) {
        for (name, plugin) in self.plugins.iter_mut() {
            let Some(contribute) = plugin.contribute.as_mut() else {
                continue;
            };
            match contribute() {
                Ok(fields) => {
                    debug!("plugin `{}` contributed {} fields", name, fields.len());
                    record.merge(fields);
                }
                Err(e) => warn!("plugin `{}` contribution skipped: {:#}", name, e),
            }
        }
    }
}
