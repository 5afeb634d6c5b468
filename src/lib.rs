// Library surface for the binary and the integration tests.
pub mod ai;
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod feedback;
pub mod haptics;
pub mod history;
pub mod input;
pub mod macro_tap;
pub mod overlay;
pub mod panels;
pub mod presets;
pub mod redeem;
pub mod runtime;
pub mod store;
pub mod timer;
pub mod trainer;
pub mod ui;
pub mod util;
