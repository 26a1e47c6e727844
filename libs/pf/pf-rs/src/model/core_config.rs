use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 8;
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 1000;
pub const DEFAULT_FETCH_RETRIES: u64 = 3;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Where should pf store data, including logs and saved albums?
    pub writeable_path: String,

    /// Should we log at all?
    pub logs: bool,
    /// Should logs be printed to stdout?
    pub stdout_logs: bool,
    /// Should logs be colored?
    pub colored_logs: bool,

    /// How many images a page of the proofing grid shows.
    pub items_per_page: usize,
    /// Requested width of derived thumbnail urls.
    pub thumbnail_width: u32,
    /// How many times a failed http fetch is retried before giving up.
    pub fetch_retries: u64,
}

impl Config {
    /// Configures pf for an interactive viewer with stdout logs. `writeable_path_subfolder` is
    /// generally a hardcoded client name like `"viewer"`.
    pub fn ui_config(writeable_path_subfolder: &str) -> Config {
        Config {
            writeable_path: Self::writeable_path(writeable_path_subfolder),
            logs: true,
            stdout_logs: true,
            colored_logs: true,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            fetch_retries: DEFAULT_FETCH_RETRIES,
        }
    }

    /// Produces a full writable path based on environment variables and platform. `PF_PATH` wins
    /// when set, otherwise a folder under the user's home is used.
    pub fn writeable_path(writeable_path_subfolder: &str) -> String {
        let specified_path = env::var("PF_PATH");

        let default_path =
            env::var("HOME") // unix
                .or(env::var("HOMEPATH")) // windows
                .map(|home| format!("{home}/.pf/{writeable_path_subfolder}"));

        specified_path
            .or(default_path)
            .unwrap_or_else(|_| format!("./.pf/{writeable_path_subfolder}"))
    }
}
