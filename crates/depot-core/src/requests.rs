//! Outbound message construction.
//!
//! The client never validates repository semantics; these builders only lay
//! out fields in the order the server merges them.

use serde::Deserialize;
use serde::Serialize;

use crate::command::Command;
use crate::endpoint::Endpoint;
use crate::message::Message;
use crate::view::ViewKind;

/// Suffix marking the filename in a `checkIn` staging message.
pub const STAGE_DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub server: Endpoint,
    pub client: Endpoint,
}

impl Route {
    pub fn message(&self, command: Command) -> Message {
        Message::routed(&self.server, &self.client, command.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub file_name: String,
    pub path: String,
    pub description: String,
    pub categories: String,
    pub dependency: Option<String>,
    pub author: String,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutRequest {
    pub names: Vec<String>,
    pub with_dependencies: bool,
}

pub fn list_dirs(route: &Route, view: ViewKind, path: &str) -> Message {
    route.message(Command::GetDirs(view)).with("path", path)
}

pub fn list_files(route: &Route, view: ViewKind, path: &str) -> Message {
    route.message(Command::GetFiles(view)).with("path", path)
}

/// The directory and file requests a view sends whenever its top path changes.
pub fn listing_pair(route: &Route, view: ViewKind, path: &str) -> [Message; 2] {
    [list_dirs(route, view, path), list_files(route, view, path)]
}

pub fn connect(route: &Route) -> Message {
    route.message(Command::ConnectToServer)
}

pub fn stage_file(route: &Route, file_name: &str) -> Message {
    route
        .message(Command::CheckIn)
        .with("file", format!("{file_name}{STAGE_DELIMITER}"))
}

pub fn check_in_files(route: &Route, request: &CheckInRequest) -> Message {
    route
        .message(Command::CheckInFiles)
        .with("files", request.file_name.as_str())
        .with("path", request.path.as_str())
        .with("description", request.description.as_str())
        .with("categories", request.categories.as_str())
        .with("dependencies", request.dependency.as_deref().unwrap_or_default())
        .with("name", request.author.as_str())
        .with("isClosed", title_bool(request.closed))
}

/// Staging message followed by the full descriptor.
pub fn check_in(route: &Route, request: &CheckInRequest) -> [Message; 2] {
    [
        stage_file(route, &request.file_name),
        check_in_files(route, request),
    ]
}

pub fn check_out(route: &Route, request: &CheckOutRequest) -> Message {
    route
        .message(Command::CheckOutFiles)
        .with("checkOutFile", request.names.concat())
        .with("isChecked", upper_bool(request.with_dependencies))
}

pub fn view_file(route: &Route, file_name: &str, location: &str) -> Message {
    route
        .message(Command::ViewFile)
        .with("ViewFileName", file_name)
        .with("location", location)
}

pub fn metadata_content(route: &Route, file_name: &str) -> Message {
    route
        .message(Command::MetadataContent)
        .with("ViewFileName", file_name)
}

pub fn browse_description(route: &Route, file_name: &str) -> Message {
    route
        .message(Command::BrowseDescription)
        .with("fileName", file_name)
}

fn title_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn upper_bool(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn route() -> Route {
        Route {
            server: Endpoint::new("localhost", 8080),
            client: Endpoint::new("localhost", 8082),
        }
    }

    fn request() -> CheckInRequest {
        CheckInRequest {
            file_name: "Browse.cpp".to_string(),
            path: "codeRepository/localClientFiles".to_string(),
            description: "Trying to CheckIn open file".to_string(),
            categories: "repositoryCore".to_string(),
            dependency: None,
            author: "naga".to_string(),
            closed: false,
        }
    }

    #[test]
    fn check_in_files_carries_all_seven_fields_in_order() {
        let msg = check_in_files(&route(), &request());
        let payload: Vec<(&str, &str)> = msg.payload().collect();
        assert_eq!(
            payload,
            vec![
                ("files", "Browse.cpp"),
                ("path", "codeRepository/localClientFiles"),
                ("description", "Trying to CheckIn open file"),
                ("categories", "repositoryCore"),
                ("dependencies", ""),
                ("name", "naga"),
                ("isClosed", "False"),
            ]
        );
        assert_eq!(msg.command(), Some("checkInFiles"));
    }

    #[test]
    fn check_in_stages_before_describing() {
        let [stage, describe] = check_in(&route(), &request());
        assert_eq!(stage.command(), Some("checkIn"));
        assert_eq!(stage.value("file"), Some("Browse.cpp:"));
        assert_eq!(describe.command(), Some("checkInFiles"));
    }

    #[test]
    fn closed_check_in_with_dependency() {
        let mut req = request();
        req.closed = true;
        req.dependency = Some("XmlDocument.cpp".to_string());
        let msg = check_in_files(&route(), &req);
        assert_eq!(msg.value("isClosed"), Some("True"));
        assert_eq!(msg.value("dependencies"), Some("XmlDocument.cpp"));
    }

    #[test]
    fn check_out_concatenates_names_and_uses_upper_flag() {
        let msg = check_out(
            &route(),
            &CheckOutRequest {
                names: vec!["CheckIn.h.1".to_string(), "CheckIn.cpp.1".to_string()],
                with_dependencies: true,
            },
        );
        assert_eq!(msg.value("checkOutFile"), Some("CheckIn.h.1CheckIn.cpp.1"));
        assert_eq!(msg.value("isChecked"), Some("TRUE"));
    }

    #[test]
    fn listing_pair_targets_one_view_and_path() {
        let [dirs, files] = listing_pair(&route(), ViewKind::CheckOut, "repo/src");
        assert_eq!(dirs.command(), Some("getDirsForCheckOut"));
        assert_eq!(files.command(), Some("getFilesForCheckOut"));
        assert_eq!(dirs.value("path"), Some("repo/src"));
        assert_eq!(files.value("path"), Some("repo/src"));
        assert_eq!(dirs.value("to"), Some("localhost:8080"));
        assert_eq!(dirs.value("from"), Some("localhost:8082"));
    }

    #[test]
    fn view_requests_name_the_file() {
        let msg = view_file(&route(), "CheckIn.cpp.1", "../ViewFile");
        assert_eq!(msg.value("ViewFileName"), Some("CheckIn.cpp.1"));
        assert_eq!(msg.value("location"), Some("../ViewFile"));
        assert_eq!(
            browse_description(&route(), "CheckIn.cpp.1").value("fileName"),
            Some("CheckIn.cpp.1")
        );
        assert_eq!(
            metadata_content(&route(), "CheckIn.cpp.1").command(),
            Some("metadataContent")
        );
    }
}
