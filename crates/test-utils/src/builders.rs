#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use shellpump::config::ShellSettings;

/// Builder for `ShellSettings` to simplify test setup.
pub struct SettingsBuilder {
    settings: ShellSettings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: ShellSettings {
                throw_on_non_zero_exit: false,
                default_environment: BTreeMap::new(),
                tick_interval: Duration::from_millis(5),
            },
        }
    }

    pub fn throw_on_non_zero_exit(mut self, val: bool) -> Self {
        self.settings.throw_on_non_zero_exit = val;
        self
    }

    pub fn default_env(mut self, name: &str, value: &str) -> Self {
        self.settings
            .default_environment
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.settings.tick_interval = interval;
        self
    }

    pub fn build(self) -> ShellSettings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
