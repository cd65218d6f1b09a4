use std::fmt::Write as _;
use std::io;
use std::path::Path;

use depot_core::ClientState;
use depot_core::NavigationContext;
use depot_core::StatusLevel;
use depot_core::ViewKind;

pub fn view(context: &NavigationContext, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    let mut out = format!(
        "{marker}[{}] /{}\n",
        context.view().label(),
        context.display_path()
    );
    for dir in context.directories() {
        let _ = writeln!(out, "  d {dir}");
    }
    for file in context.files() {
        let _ = writeln!(out, "  f {file}");
    }
    out
}

pub fn views(state: &ClientState) -> String {
    state
        .contexts()
        .map(|context| view(context, context.view() == state.active_view))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn panel(title: &str, lines: &[String]) -> String {
    let mut out = format!("{title}:\n");
    if lines.is_empty() {
        out.push_str("  (empty)\n");
    }
    for line in lines {
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn status_line(state: &ClientState) -> String {
    format!("[{}] {}", state.connection.label(), state.status_text())
}

pub fn status_history(state: &ClientState) -> String {
    let mut out = String::new();
    for entry in state.status.iter() {
        let level = match entry.level {
            StatusLevel::Info => "info",
            StatusLevel::Warn => "warn",
        };
        let _ = writeln!(out, "{:>4} {level:<4} {}", entry.seq, entry.message);
    }
    out
}

/// Full client snapshot: every view, both panels, and the status history.
pub fn snapshot(state: &ClientState) -> String {
    let mut out = views(state);
    out.push('\n');
    out.push_str(&panel("metadata", &state.metadata));
    out.push_str(&panel("description", &state.description));
    out.push_str("status:\n");
    out.push_str(&status_history(state));
    out
}

/// Contents of a file the server dropped into the local files directory.
pub fn file(local_files: &Path, file_name: &str) -> io::Result<String> {
    let path = local_files.join(file_name);
    let body = std::fs::read_to_string(&path)?;
    Ok(format!("--- {} ---\n{body}", path.display()))
}

pub fn view_names() -> String {
    ViewKind::ALL
        .iter()
        .map(|view| format!("{} ({})", view.slug(), view.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use depot_core::Endpoint;
    use depot_core::Route;
    use pretty_assertions::assert_eq;

    use super::*;

    fn state() -> ClientState {
        ClientState::new(
            Route {
                server: Endpoint::new("localhost", 8080),
                client: Endpoint::new("localhost", 8082),
            },
            "codeRepository/remoteRepositoryFiles",
        )
    }

    #[test]
    fn view_lists_directories_before_files_under_display_path() {
        let mut context = NavigationContext::new(ViewKind::CheckOut, "repo");
        context.descend("src");
        context.apply_directories(["include"]);
        context.apply_files(["a.cpp"]);
        assert_eq!(
            view(&context, true),
            "*[Check Out] /src\n  d ..\n  d include\n  f a.cpp\n"
        );
    }

    #[test]
    fn empty_panel_says_so() {
        assert_eq!(panel("metadata", &[]), "metadata:\n  (empty)\n");
    }

    #[test]
    fn status_line_shows_connection_and_latest_message() {
        let mut state = state();
        state.status.info("Server closed");
        assert!(status_line(&state).ends_with("] Server closed"));
    }

    #[test]
    fn file_reads_from_local_files_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("CheckIn.cpp.1"), "int main() {}\n").expect("write");
        let shown = file(dir.path(), "CheckIn.cpp.1").expect("read");
        assert!(shown.ends_with("int main() {}\n"));
        assert!(file(dir.path(), "missing").is_err());
    }
}
