use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

lazy_static! {
    /// Characters replaced when a suite or step description becomes a
    /// directory name.
    static ref LOG_DIR_UNSAFE: Regex =
        Regex::new(r"[\s\\/\-\.,]").expect("log dir regex is a valid literal");
}

/// Replace filesystem-hostile characters in `s` with underscores.
pub(crate) fn sanitize_for_log_dirs(s: &str) -> String {
    LOG_DIR_UNSAFE.replace_all(s, "_").into_owned()
}

/// `<base>/<sanitized suite name>/<datetime>`, one directory per suite run.
pub(crate) fn suite_log_dir(base: &Path, suite_name: &str) -> PathBuf {
    let datetime = Local::now().format("%Y.%m.%d_%H:%M:%S").to_string();
    base.join(sanitize_for_log_dirs(suite_name)).join(datetime)
}
