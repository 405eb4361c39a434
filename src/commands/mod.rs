//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler

pub mod config;
pub mod package;

pub use config::execute_save_config;
pub use package::{execute_package, PackageOptions};
