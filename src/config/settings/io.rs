// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::Settings;

const SETTINGS_FILE: &str = "settings.json";

impl Settings {
    /// `settings.json` inside [`Settings::logreview_home`].
    pub fn default_path() -> PathBuf {
        Self::logreview_home().join(SETTINGS_FILE)
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write these settings to `path`, replacing whatever is there.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `$LOGREVIEW_HOME`, falling back to `~/.logreview`
    pub fn logreview_home() -> PathBuf {
        match std::env::var_os("LOGREVIEW_HOME") {
            Some(home) => PathBuf::from(home),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".logreview"),
        }
    }
}
