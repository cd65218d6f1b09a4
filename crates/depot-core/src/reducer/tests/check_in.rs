use super::*;
use pretty_assertions::assert_eq;

#[test]
fn check_in_stages_then_describes() {
    let mut state = state();
    let effects = run_user(&mut state, UserAction::CheckIn(check_in_request("Browse.cpp")));

    assert_eq!(commands(&effects), vec!["checkIn", "checkInFiles"]);
    let messages = sent(&effects);
    assert_eq!(messages[0].value("file"), Some("Browse.cpp:"));
    assert_eq!(messages[1].value("files"), Some("Browse.cpp"));
    assert_eq!(messages[1].value("isClosed"), Some("False"));
}

#[test]
fn batch_checks_in_dependencies_before_parent() {
    let mut state = state();
    let effects = run_user(
        &mut state,
        UserAction::CheckInBatch {
            parent: check_in_request("CheckIn.cpp"),
            dependencies: strings(&["lib/XmlDocument.cpp", "src\\CheckOut.cpp"]),
        },
    );

    let described: Vec<(Option<&str>, Option<&str>)> = sent(&effects)
        .into_iter()
        .filter(|message| message.command() == Some("checkInFiles"))
        .map(|message| (message.value("files"), message.value("dependencies")))
        .collect();
    assert_eq!(
        described,
        vec![
            (Some("XmlDocument.cpp"), Some("")),
            (Some("CheckOut.cpp"), Some("")),
            (Some("CheckIn.cpp"), Some("CheckOut.cpp")),
        ]
    );
    assert_eq!(
        commands(&effects),
        vec!["checkIn", "checkInFiles", "checkIn", "checkInFiles", "checkIn", "checkInFiles"]
    );
}

#[test]
fn batch_without_dependencies_keeps_parent_dependency() {
    let mut state = state();
    let mut parent = check_in_request("Browse.cpp");
    parent.dependency = Some("Query.cpp".to_string());
    let effects = run_user(
        &mut state,
        UserAction::CheckInBatch {
            parent,
            dependencies: Vec::new(),
        },
    );
    let messages = sent(&effects);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].value("dependencies"), Some("Query.cpp"));
}

#[test]
fn check_out_concatenates_selected_names() {
    let mut state = state();
    let effects = run_user(
        &mut state,
        UserAction::CheckOut(CheckOutRequest {
            names: strings(&["CheckIn.h.1"]),
            with_dependencies: true,
        }),
    );
    let messages = sent(&effects);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].value("checkOutFile"), Some("CheckIn.h.1"));
    assert_eq!(messages[0].value("isChecked"), Some("TRUE"));
}

#[test]
fn check_in_reply_records_details_verbatim() {
    let mut state = state();
    run_reply(
        &mut state,
        ReplyAction::CheckedIn {
            details: vec![("files".to_string(), "Browse.cpp".to_string())],
        },
    );
    assert_eq!(
        state.status_text(),
        "Received reply message from server for checkInFiles: files=Browse.cpp"
    );

    run_reply(&mut state, ReplyAction::CheckedOut { details: Vec::new() });
    assert_eq!(
        state.status_text(),
        "Received reply message from server for checkOutFiles"
    );
}
