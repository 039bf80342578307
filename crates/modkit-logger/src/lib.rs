use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Overrides the directory the log file is written to
pub const CONFIG_DIR_ENV: &str = "MODKIT_CONFIG_DIR";
const LOG_FILE_NAME: &str = "modkit.log";

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static NO_STDOUT: Mutex<bool> = Mutex::new(false);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Current verbosity: 0 = warnings only, 1 = debug (-v), 2 = trace (-vv)
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(0)
}

fn set_verbosity(verbosity: u8) {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
}

/// Whether user-facing stdout output is suppressed
pub fn get_no_stdout() -> bool {
    NO_STDOUT.lock().ok().map(|v| *v).unwrap_or(false)
}

pub fn set_no_stdout(disabled: bool) {
    if let Ok(mut v) = NO_STDOUT.lock() {
        *v = disabled;
    }
}

/// `tracing` filter directive matching the verbosity level
///
/// Warnings collected during a run are printed by the CLI itself, so the
/// quiet level only lets errors through.
pub fn verbosity_to_filter() -> &'static str {
    match get_verbosity() {
        0 => "error",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the logger with a verbosity level
pub fn init_with_verbosity(verbosity: u8, no_stdout: bool) -> Result<(), String> {
    set_verbosity(verbosity);
    set_no_stdout(no_stdout);
    init()
}

fn init() -> Result<(), String> {
    let config_dir = get_config_dir()?;
    fs::create_dir_all(&config_dir)
        .map_err(|e| format!("Failed to create config directory: {}", e))?;

    let log_file = config_dir.join(LOG_FILE_NAME);

    // Truncate on each run
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut guard = LOG_FILE
        .lock()
        .map_err(|e| format!("Log file lock poisoned: {}", e))?;
    *guard = Some(log_file);
    Ok(())
}

fn get_config_dir() -> Result<PathBuf, String> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("modkit");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("modkit");

    Ok(config_dir)
}

fn write_to_log(message: &str) {
    if let Ok(guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] {}", timestamp, message);
            }
        }
    }
}

/// Informational message (console if verbose, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 {
        eprintln!("{}", message);
    }
}

pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    eprintln!("{} {}", "Error:".red().bold(), message);
}

pub fn success(message: &str) {
    write_to_log(&format!("SUCCESS {}", message));
    eprintln!("{} {}", "\u{2714}".green().bold(), message);
}

/// A non-fatal problem collected during a run, printed once it is over
pub fn platform_warning(platform: &str, tag: &str, message: &str, link: Option<&str>) {
    write_to_log(&format!("WARN [{}] {}: {}", platform, tag, message));
    eprintln!(
        "{} {} {}",
        format!("» {}:", platform).yellow().bold(),
        tag.cyan(),
        message
    );
    if let Some(link) = link {
        eprintln!("  {}", link.underline());
    }
}

/// Structured output for the user, suppressed with `no_stdout`
pub fn output(message: &str) {
    if get_no_stdout() {
        write_to_log(&format!("OUTPUT {}", message));
        return;
    }
    println!("{}", message);
}

pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

pub fn show_log_path() {
    if let Some(path) = get_log_path() {
        eprintln!("Log file: {}", path.display());
    } else if let Ok(config_dir) = get_config_dir() {
        eprintln!("Log file: {}", config_dir.join(LOG_FILE_NAME).display());
    } else {
        eprintln!("Log file location not available");
    }
}

/// Start a spinner (skipped in verbose mode so it does not fight the log lines)
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut guard) = SPINNER.lock() {
        *guard = Some(spinner);
    }
}

pub fn spinner_success(message: &str) {
    spinner_stop();
    success(message);
}

pub fn spinner_error(message: &str) {
    spinner_stop();
    write_to_log(&format!("ERROR {}", message));
    eprintln!("  {} {}", "✗".red().bold(), message);
}

pub fn spinner_stop() {
    if let Ok(mut guard) = SPINNER.lock() {
        if let Some(spinner) = guard.take() {
            spinner.finish_and_clear();
        }
    }
}
