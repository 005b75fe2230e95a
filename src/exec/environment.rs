// src/exec/environment.rs

//! The fixed argument and environment contract every filter is started with.
//!
//! argv: `[program, "0", user, title, copies, options, filename]`, where the
//! filename is only present for the first stage.
//!
//! envp (in this order): `CUPS_DATADIR`, `CUPS_FONTPATH`, `CUPS_SERVERBIN`,
//! `CUPS_SERVERROOT`, `LANG` or `LC_ALL`, `PATH`, `PPD`, `RIP_CACHE`, `USER`.

use std::path::Path;

use nix::unistd::{User, getuid};
use tracing::debug;

use crate::config::ServerConfig;
use crate::exec::options::encode_options;
use crate::types::JobOptions;

/// argv[0] for every stage.
pub const PROGRAM_NAME: &str = "filterchain";

/// argv[1]: the job id slot. There is no job, so it is always zero.
const JOB_ID: &str = "0";

const DEFAULT_COPIES: &str = "1";
const FALLBACK_LOCALE: &str = "C";

/// Environment variables shared by every stage of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEnvironment {
    vars: Vec<(String, String)>,
}

impl FilterEnvironment {
    /// Build the environment. `lookup` reads the invoking environment.
    pub fn build(
        config: &ServerConfig,
        ppd_override: Option<&Path>,
        user: &str,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Self {
        let locale = match (lookup("LANG"), lookup("LC_ALL")) {
            (Some(lang), _) => ("LANG".to_string(), lang),
            (None, Some(all)) => ("LC_ALL".to_string(), all),
            (None, None) => ("LANG".to_string(), FALLBACK_LOCALE.to_string()),
        };

        let ppd = match ppd_override {
            Some(p) => p.display().to_string(),
            None => lookup("PPD")
                .unwrap_or_else(|| config.default_ppd_path().display().to_string()),
        };

        let vars = vec![
            ("CUPS_DATADIR".to_string(), config.data_dir.display().to_string()),
            ("CUPS_FONTPATH".to_string(), config.font_path.clone()),
            ("CUPS_SERVERBIN".to_string(), config.server_bin.display().to_string()),
            ("CUPS_SERVERROOT".to_string(), config.server_root.display().to_string()),
            locale,
            ("PATH".to_string(), config.search_path.clone()),
            ("PPD".to_string(), ppd),
            ("RIP_CACHE".to_string(), config.rip_cache.clone()),
            ("USER".to_string(), user.to_string()),
        ];

        Self { vars }
    }

    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Full envp for one stage: `extra` first, then the shared variables.
    pub fn for_stage(&self, extra: &[(String, String)]) -> Vec<(String, String)> {
        extra.iter().chain(self.vars.iter()).cloned().collect()
    }
}

/// Arguments shared by every stage of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageArguments {
    user: String,
    title: String,
    copies: String,
    options: String,
}

impl StageArguments {
    pub fn new(user: &str, title: &str, options: &JobOptions) -> Self {
        let encoded = encode_options(options);
        debug!(options = %encoded, "encoded job options");

        Self {
            user: user.to_string(),
            title: title.to_string(),
            copies: options.copies().unwrap_or(DEFAULT_COPIES).to_string(),
            options: encoded,
        }
    }

    /// argv for one stage. `filename` is `Some` for the first stage only.
    pub fn argv(&self, filename: Option<&Path>) -> Vec<String> {
        let mut argv = vec![
            PROGRAM_NAME.to_string(),
            JOB_ID.to_string(),
            self.user.clone(),
            self.title.clone(),
            self.copies.clone(),
            self.options.clone(),
        ];
        if let Some(file) = filename {
            argv.push(file.display().to_string());
        }
        argv
    }
}

/// Name of the invoking user, from the password database.
pub fn current_user_name(lookup: &dyn Fn(&str) -> Option<String>) -> String {
    match User::from_uid(getuid()) {
        Ok(Some(user)) => user.name,
        _ => lookup("USER").unwrap_or_else(|| "unknown".to_string()),
    }
}
