use color_eyre::eyre::Result;
use log::LevelFilter;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Route log output to a file so it never mixes with terminal output.
pub fn init_logging(debug: bool) -> Result<()> {
    let log_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_dir = get_default_log_dir();
    fs::create_dir_all(&log_dir)?;

    let log_file = log_dir.join("gitsync.log");

    env_logger::Builder::new()
        .filter_level(log_level)
        .target(env_logger::Target::Pipe(Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?,
        )))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] - {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()?;

    log::info!("Logging initialized with level: {log_level}");
    Ok(())
}

fn get_default_log_dir() -> PathBuf {
    match (env::var_os("XDG_STATE_HOME"), env::var_os("HOME")) {
        (Some(state), _) => PathBuf::from(state).join("gitsync"),
        (None, Some(home)) => PathBuf::from(home).join(".local/state").join("gitsync"),
        (None, None) => PathBuf::from("/tmp/gitsync"),
    }
}
