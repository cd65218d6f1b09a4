use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use crate::actions::ClientAction;
pub(super) use crate::actions::ClientEffect;
pub(super) use crate::actions::ReplyAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::ReplyPolicy;
pub(super) use crate::endpoint::Endpoint;
pub(super) use crate::message::Message;
pub(super) use crate::navigation::ASCEND_SENTINEL;
pub(super) use crate::requests::CheckInRequest;
pub(super) use crate::requests::CheckOutRequest;
pub(super) use crate::requests::Route;
pub(super) use crate::state::ClientState;
pub(super) use crate::state::ConnectionStatus;
pub(super) use crate::state::StatusLevel;
pub(super) use crate::view::ViewKind;

mod check_in;

const ROOT: &str = "repo";

fn state() -> ClientState {
    let route = Route {
        server: Endpoint::new("localhost", 8080),
        client: Endpoint::new("localhost", 8082),
    };
    let mut state = ClientState::new(route, ROOT);
    state.view_file_location = "../ViewFile".to_string();
    state
}

fn run_user(state: &mut ClientState, action: UserAction) -> Vec<ClientEffect> {
    reduce(state, ClientAction::User(action))
}

fn run_reply(state: &mut ClientState, action: ReplyAction) {
    let effects = reduce(state, ClientAction::Reply(action));
    assert!(effects.contains(&ClientEffect::RequestFrame));
}

/// Messages sent by an effect list, in order.
fn sent(effects: &[ClientEffect]) -> Vec<&Message> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            ClientEffect::Send(message) => Some(message),
            _ => None,
        })
        .collect()
}

fn commands(effects: &[ClientEffect]) -> Vec<&str> {
    sent(effects)
        .into_iter()
        .filter_map(Message::command)
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn check_in_request(file_name: &str) -> CheckInRequest {
    CheckInRequest {
        file_name: file_name.to_string(),
        path: "codeRepository/localClientFiles".to_string(),
        description: "Trying to CheckIn open file".to_string(),
        categories: "repositoryCore".to_string(),
        dependency: None,
        author: "naga".to_string(),
        closed: false,
    }
}

fn assert_listing_pair(effects: &[ClientEffect], view: ViewKind, path: &str) {
    let messages = sent(effects);
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0].command(),
        Some(crate::command::Command::GetDirs(view).name())
    );
    assert_eq!(
        messages[1].command(),
        Some(crate::command::Command::GetFiles(view).name())
    );
    for message in messages {
        assert_eq!(message.value("path"), Some(path));
    }
}
