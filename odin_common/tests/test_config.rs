/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
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

use std::{env, fs};
use serde::Deserialize;
use odin_common::config::{self, ConfigError, CONFIG_DIR_VAR};

#[derive(Deserialize,Debug,PartialEq)]
struct Center {
    lon: f64,
    lat: f64,
    name: String,
}

// the only test in this crate that touches the environment
#[test]
fn test_config_lookup() {
    let dir = env::temp_dir().join( format!("odin_common_test_config_{}", std::process::id()));
    let crate_dir = dir.join("some_crate");
    fs::create_dir_all( &crate_dir).unwrap();

    fs::write( crate_dir.join("center.ron"), r#"( lon: -117.18, lat: 33.5556, name: "crate specific" )"#).unwrap();
    fs::write( dir.join("center.ron"), r#"( lon: 0.0, lat: 0.0, name: "generic" )"#).unwrap();
    fs::write( dir.join("broken.ron"), r#"( lon: "nope" )"#).unwrap();

    unsafe { env::set_var( CONFIG_DIR_VAR, dir.as_os_str()); }

    let path = config::find_config_file( "some_crate", "center.ron").unwrap();
    println!("found {:?}", path);
    assert_eq!( path, crate_dir.join("center.ron"));

    let c: Center = config::load_crate_config( "some_crate", "center.ron").unwrap();
    assert_eq!( c.name, "crate specific");

    // falls back to the generic dir
    let c: Center = config::load_crate_config( "other_crate", "center.ron").unwrap();
    assert_eq!( c.name, "generic");

    let res: config::Result<Center> = config::load_crate_config( "some_crate", "missing.ron");
    assert!( matches!( res, Err(ConfigError::ConfigNotFoundError(_))));

    let res: config::Result<Center> = config::load_crate_config( "some_crate", "broken.ron");
    println!("broken config: {:?}", res);
    assert!( matches!( res, Err(ConfigError::RonSerdeError(_))));

    unsafe { env::remove_var( CONFIG_DIR_VAR); }
    let _ = fs::remove_dir_all( &dir);
}
