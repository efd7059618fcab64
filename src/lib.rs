#[macro_use]
extern crate tracing;

mod app;
mod logging;

pub use app::App;
pub use consul_fleet_config::Args;
pub use logging::{
    init_errors,
    init_logging,
};
