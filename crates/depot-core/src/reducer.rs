use tracing::debug;

use super::actions::ClientAction;
use super::actions::ClientEffect;
use super::actions::ReplyAction;
use super::actions::UserAction;
use super::config::ReplyPolicy;
use super::requests;
use super::requests::CheckInRequest;
use super::state::ClientState;
use super::state::ConnectionStatus;
use super::view::ViewKind;

pub fn reduce(state: &mut ClientState, action: ClientAction) -> Vec<ClientEffect> {
    match action {
        ClientAction::User(user) => reduce_user(state, user),
        ClientAction::Reply(reply) => reduce_reply(state, reply),
    }
}

fn reduce_user(state: &mut ClientState, action: UserAction) -> Vec<ClientEffect> {
    match action {
        UserAction::Start => {
            state.connection = ConnectionStatus::Requested;
            state.status.info(format!("Connecting to {}", state.route.server));
            let mut effects = vec![ClientEffect::Send(requests::connect(&state.route))];
            for view in ViewKind::ALL {
                effects.extend(listing_requests(state, view));
            }
            effects.push(ClientEffect::RequestFrame);
            effects
        }
        UserAction::Connect(server) => {
            state.route.server = server;
            state.connection = ConnectionStatus::Requested;
            state.status.info(format!("Connecting to {}", state.route.server));
            vec![
                ClientEffect::Send(requests::connect(&state.route)),
                ClientEffect::RequestFrame,
            ]
        }
        UserAction::Descend { view, child } => {
            state.context_mut(view).descend(&child);
            refresh_view(state, view)
        }
        UserAction::Ascend { view } => {
            state.context_mut(view).ascend();
            refresh_view(state, view)
        }
        UserAction::SelectView(view) => {
            state.active_view = view;
            vec![ClientEffect::RequestFrame]
        }
        UserAction::CheckIn(request) => check_in_effects(state, &request),
        UserAction::CheckInBatch {
            parent,
            dependencies,
        } => {
            let mut effects = Vec::new();
            let mut last = None;
            for dependency in &dependencies {
                let name = bare_file_name(dependency);
                let request = CheckInRequest {
                    file_name: name.to_string(),
                    dependency: None,
                    ..parent.clone()
                };
                effects.extend(check_in_effects(state, &request));
                last = Some(name.to_string());
            }
            let parent = CheckInRequest {
                dependency: last.or(parent.dependency.clone()),
                ..parent
            };
            effects.extend(check_in_effects(state, &parent));
            effects
        }
        UserAction::CheckOut(request) => {
            state
                .status
                .info(format!("Checking out {}", request.names.join(", ")));
            vec![ClientEffect::Send(requests::check_out(&state.route, &request))]
        }
        UserAction::ViewFile { file_name } => {
            state.pending_file_view = true;
            vec![ClientEffect::Send(requests::view_file(
                &state.route,
                &file_name,
                &state.view_file_location,
            ))]
        }
        UserAction::ViewMetadata { file_name } => {
            vec![ClientEffect::Send(requests::metadata_content(
                &state.route,
                &file_name,
            ))]
        }
        UserAction::DescribePackage { file_name } => {
            vec![ClientEffect::Send(requests::browse_description(
                &state.route,
                &file_name,
            ))]
        }
        UserAction::ClearStatus => {
            state.status.clear();
            vec![ClientEffect::RequestFrame]
        }
    }
}

fn reduce_reply(state: &mut ClientState, action: ReplyAction) -> Vec<ClientEffect> {
    let command = action.command_name();
    match action {
        ReplyAction::Directories { view, names, path } => {
            if is_stale(state, view, path.as_deref()) {
                discard_stale(state, command, path.as_deref());
                return vec![ClientEffect::RequestFrame];
            }
            state.context_mut(view).apply_directories(names);
            state.status.info(received(command));
            vec![ClientEffect::RequestFrame]
        }
        ReplyAction::Files { view, names, path } => {
            if is_stale(state, view, path.as_deref()) {
                discard_stale(state, command, path.as_deref());
                return vec![ClientEffect::RequestFrame];
            }
            state.context_mut(view).apply_files(names);
            state.status.info(received(command));
            vec![ClientEffect::RequestFrame]
        }
        ReplyAction::Connected { server } => {
            state.connection = ConnectionStatus::Connected;
            if let Some(server) = server {
                debug!(%server, "server acknowledged connection");
            }
            state.status.info("Successfully connected to server");
            vec![ClientEffect::RequestFrame]
        }
        ReplyAction::CheckedIn { details } | ReplyAction::CheckedOut { details } => {
            state.status.info(with_details(received(command), &details));
            vec![ClientEffect::RequestFrame]
        }
        ReplyAction::FileReady { file_name } => {
            state.status.info("Successfully received file from server");
            state.last_file = Some(file_name.clone());
            if !state.pending_file_view {
                debug!(file = %file_name, "file arrived without a pending view request");
                return vec![ClientEffect::RequestFrame];
            }
            state.pending_file_view = false;
            vec![ClientEffect::ShowFile { file_name }, ClientEffect::RequestFrame]
        }
        ReplyAction::Metadata { lines } => {
            state.metadata = lines;
            state
                .status
                .info("Received reply message from server for metadata");
            vec![ClientEffect::RequestFrame]
        }
        ReplyAction::PackageDescription { lines } => {
            state.description = lines;
            state
                .status
                .info("Received reply message from server for package description");
            vec![ClientEffect::RequestFrame]
        }
        ReplyAction::ServerQuit => {
            state.connection = ConnectionStatus::ServerClosed;
            state.status.warn("Server closed");
            vec![ClientEffect::RequestFrame]
        }
    }
}

fn refresh_view(state: &mut ClientState, view: ViewKind) -> Vec<ClientEffect> {
    let mut effects = listing_requests(state, view);
    effects.push(ClientEffect::RequestFrame);
    effects
}

fn listing_requests(state: &ClientState, view: ViewKind) -> Vec<ClientEffect> {
    requests::listing_pair(&state.route, view, state.context(view).top())
        .into_iter()
        .map(ClientEffect::Send)
        .collect()
}

fn check_in_effects(state: &mut ClientState, request: &CheckInRequest) -> Vec<ClientEffect> {
    state
        .status
        .info(format!("Checking in {}", request.file_name));
    requests::check_in(&state.route, request)
        .into_iter()
        .map(ClientEffect::Send)
        .collect()
}

fn is_stale(state: &ClientState, view: ViewKind, path: Option<&str>) -> bool {
    match (state.reply_policy, path) {
        (ReplyPolicy::MatchCurrentPath, Some(path)) => path != state.context(view).top(),
        _ => false,
    }
}

fn discard_stale(state: &mut ClientState, command: &str, path: Option<&str>) {
    let path = path.unwrap_or_default();
    debug!(command, path, "discarding listing reply for a path no longer shown");
    state
        .status
        .warn(format!("Ignored stale {command} reply for {path}"));
}

fn received(command: &str) -> String {
    format!("Received reply message from server for {command}")
}

fn with_details(mut line: String, details: &[(String, String)]) -> String {
    if details.is_empty() {
        return line;
    }
    let joined: Vec<String> = details
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    line.push_str(": ");
    line.push_str(&joined.join(", "));
    line
}

fn bare_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests;
