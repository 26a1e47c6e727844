use crate::Config;
use crate::model::errors::{PfResult, core_err_unexpected};
use chrono::Local;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::{env, panic};
use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, filter, fmt};

pub static LOG_FILE: &str = "pf.log";

fn ours(metadata: &tracing::Metadata<'_>) -> bool {
    metadata.target().starts_with("pf_rs")
}

pub fn init(config: &Config) -> PfResult<()> {
    if config.logs {
        let pf_log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| s.as_str().parse().ok())
            .unwrap_or(LevelFilter::DEBUG);

        let mut layers = Vec::with_capacity(2);

        layers.push(
            fmt::Layer::new()
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_ansi(config.colored_logs)
                .with_target(true)
                .with_writer(tracing_appender::rolling::never(&config.writeable_path, LOG_FILE))
                .with_filter(pf_log_level)
                .with_filter(filter::filter_fn(ours))
                .boxed(),
        );

        if config.stdout_logs {
            layers.push(
                fmt::Layer::new()
                    .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                    .with_ansi(config.colored_logs)
                    .with_target(true)
                    .with_filter(pf_log_level)
                    .with_filter(filter::filter_fn(ours))
                    .boxed(),
            );
        }

        tracing::subscriber::set_global_default(
            tracing_subscriber::Registry::default().with(layers),
        )
        .map_err(core_err_unexpected)?;
        panic_capture(config);
    }
    Ok(())
}

fn panic_capture(config: &Config) {
    let path = config.writeable_path.clone();
    panic::set_hook(Box::new(move |panic_info| {
        let bt = Backtrace::force_capture();
        tracing::error!("panic detected: {panic_info} {}", bt);
        eprintln!("panic detected and logged: {panic_info} {bt}");
        let timestamp = Local::now().format("%Y-%m-%d---%H-%M-%S");
        let file_name = format!("{path}/panic---{timestamp}.log");
        let content = format!("INFO: {panic_info}\nBT: {bt}");

        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_name)
            .and_then(|mut file| file.write_all(content.as_bytes()));
        if let Err(err) = written {
            eprintln!("could not write panic log {file_name}: {err}");
        }
    }));
}

#[cfg(test)]
mod unit_tests {
    use std::path::Path;

    use crate::model::core_config::Config;
    use crate::service::logging::{init, LOG_FILE};

    #[test]
    fn disabled_logs_install_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::ui_config("logging");
        config.writeable_path = dir.path().to_string_lossy().into_owned();
        config.logs = false;

        init(&config).unwrap();
        init(&config).unwrap();

        assert!(!Path::new(&config.writeable_path).join(LOG_FILE).exists());
    }
}
