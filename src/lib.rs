//! deskstate
//!
//! 桌面客户端应用状态协调层：启动探测、登录、引导流程与迁移适配器的装配入口。

pub mod bootstrap;
pub mod cli;

pub use bootstrap::{execute, load_config, run, wire_dependencies, AppRuntime};
pub use cli::{Cli, Command};
