#![deny(clippy::all)]

pub mod app;
pub mod config;
pub mod cons;
mod ffi;
pub mod llm;
pub mod notes;


use napi_derive::napi;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        use log::LevelFilter;
        use log4rs::append::file::FileAppender;
        use log4rs::config::{Appender, Config, Root};
        use log4rs::encode::pattern::PatternEncoder;

        // Try to load log4rs configuration from file first
        let config_path = std::env::var("LOG4RS_CONFIG").unwrap_or_else(|_| "log4rs.yaml".to_string());
        if log4rs::init_file(&config_path, Default::default()).is_ok() {
            println!("[INIT] Logger initialized from {}", config_path);
            return;
        }

        let log_path = match dirs::home_dir() {
            Some(home) => match config::AppConfig::defaults(&home) {
                Ok(cfg) => cfg.log_path(),
                Err(e) => {
                    println!("[INIT] Failed to read default config: {}", e);
                    return;
                }
            },
            None => {
                println!("[INIT] No home directory, logging disabled");
                return;
            }
        };

        let pattern = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}\n";

        let logfile = match FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .build(&log_path) {
            Ok(f) => f,
            Err(e) => {
                println!("[INIT] Failed to create log file {}: {}", log_path.display(), e);
                return;
            }
        };

        let config = match Config::builder()
            .appender(Appender::builder().build("logfile", Box::new(logfile)))
            .build(Root::builder()
                .appender("logfile")
                .build(LevelFilter::Debug)) {
            Ok(c) => c,
            Err(e) => {
                println!("[INIT] Failed to build config: {}", e);
                return;
            }
        };

        match log4rs::init_config(config) {
            Ok(_) => println!("[INIT] Logger initialized successfully"),
            Err(e) => println!("[INIT] Failed to initialize logger: {}", e),
        }
    });
}

/// Public configuration as JSON. Credentials are never part of it.
#[napi]
pub fn get_app_config() -> String {
    init_logger();
    let config = match config::AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config: {:?}", e);
            return "{}".to_string();
        }
    };
    serde_json::to_string(&config).unwrap_or_else(|_| "{}".to_string())
}

pub use ffi::*;
