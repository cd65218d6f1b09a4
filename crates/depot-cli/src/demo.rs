use std::path::Path;
use std::time::Duration;

use depot_comm::ReceiveStats;
use depot_comm::Session;
use depot_comm::Transport;
use depot_core::CheckInRequest;
use depot_core::CheckOutRequest;
use depot_core::ClientEffect;
use depot_core::ClientState;
use depot_core::UserAction;
use serde::Serialize;
use tracing::info;

use crate::render;

const LOCAL_PATH: &str = "codeRepository/localClientFiles";
const CATEGORY: &str = "repositoryCore";
const SUBJECT: &str = "CheckIn.cpp.1";

#[derive(Serialize)]
struct DemoReport<'a> {
    state: &'a ClientState,
    received: u64,
    dispatched: u64,
    discarded: u64,
    failed: u64,
}

fn check_in(
    file_name: &str,
    author: &str,
    description: &str,
    closed: bool,
    dependency: Option<&str>,
) -> UserAction {
    UserAction::CheckIn(CheckInRequest {
        file_name: file_name.to_string(),
        path: LOCAL_PATH.to_string(),
        description: description.to_string(),
        categories: CATEGORY.to_string(),
        dependency: dependency.map(str::to_string),
        author: author.to_string(),
        closed,
    })
}

fn check_out(name: &str, with_dependencies: bool) -> UserAction {
    UserAction::CheckOut(CheckOutRequest {
        names: vec![name.to_string()],
        with_dependencies,
    })
}

/// Actions replayed after startup: ownership, closing, a closed child, and a
/// dependency cycle, followed by check-outs and the three file queries.
pub fn script() -> Vec<UserAction> {
    vec![
        check_out("Browse.cpp.1", false),
        check_in("Browse.cpp", "naga", "Trying to CheckIn open file", false, None),
        check_in(
            "Browse.cpp",
            "rama",
            "Trying to CheckIn same \"Browse.cpp\" file as a different user",
            false,
            None,
        ),
        check_in(
            "Browse.cpp",
            "naga",
            "Trying to close already checkedin file",
            true,
            None,
        ),
        check_in(
            "Browse.cpp",
            "naga",
            "Trying to checkin \"Browse.cpp\" version 2 after adding a child with closed status, which is not checked in yet",
            true,
            Some("XmlDocument.cpp"),
        ),
        check_in(
            "XmlDocument.cpp",
            "naga",
            "Trying to checkin child \"XmlDocument.cpp\" with closed status",
            true,
            None,
        ),
        check_in(
            "Browse.cpp",
            "naga",
            "Trying to checkin \"Browse.cpp\" after checking in child",
            true,
            Some("XmlDocument.cpp"),
        ),
        check_in(
            "CheckIn.cpp",
            "naga",
            "Trying to checkin \"CheckIn.cpp\" with open status",
            false,
            Some("CheckOut.cpp"),
        ),
        check_in(
            "CheckOut.cpp",
            "naga",
            "Trying to checkin \"CheckOut.cpp\" with open status",
            false,
            Some("CheckIn.cpp"),
        ),
        check_in(
            "CheckIn.cpp",
            "naga",
            "Demonstrating cyclic dependencies",
            true,
            Some("CheckOut.cpp"),
        ),
        check_out("CheckIn.h.1", true),
        UserAction::ViewFile {
            file_name: SUBJECT.to_string(),
        },
        UserAction::ViewMetadata {
            file_name: SUBJECT.to_string(),
        },
        UserAction::DescribePackage {
            file_name: SUBJECT.to_string(),
        },
    ]
}

/// Starts the session, plays the script, then collects replies until the
/// server has been quiet for `idle`.
pub fn run<T: Transport>(
    mut session: Session<T>,
    idle: Duration,
    local_files: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut effects = session.start()?;
    for action in script() {
        effects.extend(session.submit(action)?);
    }
    loop {
        let batch = session.wait_next(idle)?;
        if batch.is_empty() {
            break;
        }
        effects.extend(batch);
    }

    let (state, stats) = session.shutdown();
    info!(replies = stats.dispatched, "demo finished");
    if json {
        println!("{}", serde_json::to_string_pretty(&report(&state, stats))?);
        return Ok(());
    }

    for effect in &effects {
        if let ClientEffect::ShowFile { file_name } = effect {
            match render::file(local_files, file_name) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("cannot open {file_name}: {err}"),
            }
        }
    }
    print!("{}", render::snapshot(&state));
    Ok(())
}

fn report(state: &ClientState, stats: ReceiveStats) -> DemoReport<'_> {
    DemoReport {
        state,
        received: stats.received,
        dispatched: stats.dispatched,
        discarded: stats.discarded,
        failed: stats.failed,
    }
}
