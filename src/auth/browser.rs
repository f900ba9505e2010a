//! Best-effort browser launching for the consent screen.

const NO_ARGS: &[&str] = &[];
const WINDOWS_START_ARGS: &[&str] = &["/C", "start", ""];

/// Platform launcher program and leading arguments; the URL is appended.
fn launcher() -> Option<(&'static str, &'static [&'static str])> {
    if cfg!(target_os = "macos") {
        Some(("open", NO_ARGS))
    } else if cfg!(target_os = "windows") {
        Some(("cmd", WINDOWS_START_ARGS))
    } else if cfg!(unix) {
        Some(("xdg-open", NO_ARGS))
    } else {
        None
    }
}

/// Open `url` in the user's browser. Returns false when no launcher ran
/// successfully; callers should then print the URL.
pub fn open_in_browser(url: &str) -> bool {
    let Some((program, args)) = launcher() else {
        return false;
    };
    let opened = std::process::Command::new(program)
        .args(args)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|status| status.success());
    if !opened {
        tracing::debug!(program, "browser launcher failed");
    }
    opened
}
