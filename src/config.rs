use std::path::PathBuf;
use chrono::Duration;

use crate::allocation::{Pattern, MAX_ROOM_DESKS};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 30;
pub const DEFAULT_CACHE_CAPACITY: usize = 64;
pub const DEFAULT_COLLEGE: &str = "Galgotias College";
pub const DEFAULT_EXAM: &str = "Exam";

/// College and exam names used when the sheet does not provide them
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDefaults {
    pub college: String,
    pub exam: String,
}

impl Default for RoomDefaults {
    fn default() -> Self {
        RoomDefaults {
            college: DEFAULT_COLLEGE.to_string(),
            exam: DEFAULT_EXAM.to_string(),
        }
    }
}

/// Runtime settings for the CLI and the web service
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub pattern: Pattern,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub output_dir: PathBuf,
    pub room_defaults: RoomDefaults,
    /// Requests and uploads naming a bigger room are rejected
    pub max_room_desks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            pattern: Pattern::Standard,
            cache_ttl: Duration::minutes(DEFAULT_CACHE_TTL_MINUTES),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            output_dir: PathBuf::from("."),
            room_defaults: RoomDefaults::default(),
            max_room_desks: MAX_ROOM_DESKS,
        }
    }
}

impl Config {
    /// Reads `SEATING_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; missing or unparseable values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(port) = lookup("SEATING_PORT").and_then(|v| v.trim().parse().ok()) {
            config.port = port;
        }
        if let Some(name) = lookup("SEATING_PATTERN") {
            match Pattern::from_name(&name) {
                Some(p) => config.pattern = p,
                None => log::warn!("Ignoring unknown SEATING_PATTERN '{}'", name),
            }
        }
        if let Some(minutes) = lookup("SEATING_CACHE_TTL_MINUTES").and_then(|v| v.trim().parse::<i64>().ok()) {
            if minutes > 0 {
                config.cache_ttl = Duration::minutes(minutes);
            }
        }
        if let Some(capacity) = lookup("SEATING_CACHE_CAPACITY").and_then(|v| v.trim().parse::<usize>().ok()) {
            if capacity > 0 {
                config.cache_capacity = capacity;
            }
        }
        if let Some(max) = lookup("SEATING_MAX_ROOM_DESKS").and_then(|v| v.trim().parse::<usize>().ok()) {
            if max > 0 {
                if max > MAX_ROOM_DESKS {
                    log::warn!("SEATING_MAX_ROOM_DESKS {} above the allocator limit, using {}", max, MAX_ROOM_DESKS);
                }
                config.max_room_desks = max.min(MAX_ROOM_DESKS);
            }
        }
        if let Some(dir) = lookup("SEATING_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(college) = lookup("SEATING_DEFAULT_COLLEGE") {
            config.room_defaults.college = college;
        }
        if let Some(exam) = lookup("SEATING_DEFAULT_EXAM") {
            config.room_defaults.exam = exam;
        }

        config
    }
}
