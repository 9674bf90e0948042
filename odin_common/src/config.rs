/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! RON based configuration lookup and loading.
//!
//! Config files are looked up by crate and filename so that applications can override the defaults
//! that ship with a crate without recompiling. The lookup order is
//! ```text
//!   $ODIN_CONFIG_DIR/<crate>/<file>
//!   $ODIN_CONFIG_DIR/<file>
//!   ./configs/<crate>/<file>
//!   ./configs/<file>
//!   ./<crate>/configs/<file>
//! ```
//! The last entry is what picks up the crate defaults when running from the workspace root.

use std::{env, fs, path::{Path, PathBuf}};
use thiserror::Error;

pub const CONFIG_DIR_VAR: &str = "ODIN_CONFIG_DIR";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error,Debug)]
pub enum ConfigError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config serialize/deserialize RON error {0}")]
    RonSerdeError( #[from] ron::error::SpannedError),

    #[error("config not found {0}")]
    ConfigNotFoundError(String),
}

/// parse the RON file at `path` into a `C`
pub fn load_config<C,P> (path: P) -> Result<C> where C: for <'a> serde::Deserialize<'a>, P: AsRef<Path> {
    let data = fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// return the first existing config file for `filename` according to the lookup order of this module
pub fn find_config_file (resource_crate: &str, filename: &str) -> Option<PathBuf> {
    candidate_paths( resource_crate, filename).into_iter().find( |p| p.is_file())
}

fn candidate_paths (resource_crate: &str, filename: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(5);

    if let Ok(dir) = env::var( CONFIG_DIR_VAR) {
        let dir = Path::new( dir.as_str());
        candidates.push( dir.join( resource_crate).join( filename));
        candidates.push( dir.join( filename));
    }

    let cwd_configs = Path::new("configs");
    candidates.push( cwd_configs.join( resource_crate).join( filename));
    candidates.push( cwd_configs.join( filename));
    candidates.push( Path::new( resource_crate).join("configs").join( filename));

    candidates
}

/// look up `filename` for `resource_crate` and load it. This is what [`define_load_config`] expands into
pub fn load_crate_config<C> (resource_crate: &str, filename: &str) -> Result<C> where C: for <'a> serde::Deserialize<'a> {
    match find_config_file( resource_crate, filename) {
        Some(path) => load_config( path),
        None => Err( ConfigError::ConfigNotFoundError( format!("{resource_crate}/{filename}")))
    }
}

/// define a crate level `load_config(filename)` function that uses the calling crate's package name
/// for the config file lookup:
/// ```ignore
/// use odin_common::define_load_config;
/// define_load_config!{}
/// ...
/// let config: TrackerConfig = load_config("tracker.ron")?;
/// ```
#[macro_export]
macro_rules! define_load_config {
    () => {
        /// load config using the odin_common lookup mechanism for this crate
        pub fn load_config<C> (filename: &str) -> odin_common::config::Result<C> where C: for <'a> serde::Deserialize<'a> {
            odin_common::config::load_crate_config( env!("CARGO_PKG_NAME"), filename)
        }
    }
}
