use std::io;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use depot_comm::Session;
use depot_comm::Transport;
use depot_core::CheckInRequest;
use depot_core::CheckOutRequest;
use depot_core::ClientEffect;
use depot_core::Endpoint;
use depot_core::UserAction;
use depot_core::ViewKind;

use crate::render;

const POLL: Duration = Duration::from_millis(50);

const HELP: &str = "\
commands:
  views                      list the four views
  view <name>                switch the active view
  ls [view]                  show a view's listings
  cd <dir> | cd ..           descend into a directory of the active view
  up                         go to the parent directory
  connect <host:port>        talk to another server
  checkin <file> [author=A] [cat=C] [path=P] [dep=D] [deps=A,B] [closed] [-- description]
  checkout <name>... [--deps]
  cat <file>                 view a file
  meta <file>                show file metadata
  describe <file>            show package description
  status                     status history
  clear                      clear status history
  show                       everything
  quit";

/// Values used for check-in fields the user leaves out.
#[derive(Debug, Clone)]
pub struct CheckInDefaults {
    pub author: String,
    pub path: String,
    pub categories: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Views,
    List(Option<ViewKind>),
    Show,
    Status,
    Quit,
    Action(UserAction),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(
    line: &str,
    active: ViewKind,
    defaults: &CheckInDefaults,
) -> Result<Option<ShellCommand>, String> {
    let (head, description) = match line.split_once(" -- ") {
        Some((head, description)) => (head, Some(description.trim())),
        None => (line, None),
    };
    let mut words = head.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "help" | "?" => ShellCommand::Help,
        "views" => ShellCommand::Views,
        "show" => ShellCommand::Show,
        "status" => ShellCommand::Status,
        "quit" | "exit" => ShellCommand::Quit,
        "clear" => ShellCommand::Action(UserAction::ClearStatus),
        "ls" => ShellCommand::List(args.first().map(|slug| parse_view(slug)).transpose()?),
        "view" => ShellCommand::Action(UserAction::SelectView(parse_view(single(verb, &args)?)?)),
        "cd" => ShellCommand::Action(UserAction::Descend {
            view: active,
            child: single(verb, &args)?.to_string(),
        }),
        "up" => ShellCommand::Action(UserAction::Ascend { view: active }),
        "connect" => {
            let endpoint: Endpoint = single(verb, &args)?
                .parse()
                .map_err(|err| format!("connect: {err}"))?;
            ShellCommand::Action(UserAction::Connect(endpoint))
        }
        "checkin" => ShellCommand::Action(parse_check_in(&args, description, defaults)?),
        "checkout" => {
            let with_dependencies = args.contains(&"--deps");
            let names: Vec<String> = args
                .iter()
                .filter(|arg| **arg != "--deps")
                .map(|arg| arg.to_string())
                .collect();
            if names.is_empty() {
                return Err("checkout: name at least one file".to_string());
            }
            ShellCommand::Action(UserAction::CheckOut(CheckOutRequest {
                names,
                with_dependencies,
            }))
        }
        "cat" => ShellCommand::Action(UserAction::ViewFile {
            file_name: single(verb, &args)?.to_string(),
        }),
        "meta" => ShellCommand::Action(UserAction::ViewMetadata {
            file_name: single(verb, &args)?.to_string(),
        }),
        "describe" => ShellCommand::Action(UserAction::DescribePackage {
            file_name: single(verb, &args)?.to_string(),
        }),
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };
    Ok(Some(command))
}

fn single<'a>(verb: &str, args: &[&'a str]) -> Result<&'a str, String> {
    match args {
        [one] => Ok(one),
        _ => Err(format!("{verb}: expected exactly one argument")),
    }
}

fn parse_view(slug: &str) -> Result<ViewKind, String> {
    ViewKind::from_slug(slug)
        .ok_or_else(|| format!("unknown view `{slug}`; views are {}", render::view_names()))
}

fn parse_check_in(
    args: &[&str],
    description: Option<&str>,
    defaults: &CheckInDefaults,
) -> Result<UserAction, String> {
    let Some((file_name, options)) = args.split_first() else {
        return Err("checkin: missing file name".to_string());
    };
    let mut request = CheckInRequest {
        file_name: file_name.to_string(),
        path: defaults.path.clone(),
        description: description.unwrap_or_default().to_string(),
        categories: defaults.categories.clone(),
        dependency: None,
        author: defaults.author.clone(),
        closed: false,
    };
    let mut batch = Vec::new();
    for option in options {
        if *option == "closed" {
            request.closed = true;
            continue;
        }
        let Some((key, value)) = option.split_once('=') else {
            return Err(format!("checkin: unexpected `{option}`"));
        };
        match key {
            "author" => request.author = value.to_string(),
            "cat" => request.categories = value.to_string(),
            "path" => request.path = value.to_string(),
            "dep" => request.dependency = Some(value.to_string()),
            "deps" => batch.extend(
                value
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
            ),
            _ => return Err(format!("checkin: unknown option `{key}`")),
        }
    }
    if batch.is_empty() {
        Ok(UserAction::CheckIn(request))
    } else {
        Ok(UserAction::CheckInBatch {
            parent: request,
            dependencies: batch,
        })
    }
}

pub fn run<T: Transport>(
    session: &mut Session<T>,
    local_files: &Path,
    defaults: &CheckInDefaults,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("depot-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    let effects = session.start()?;
    present(session, &effects, local_files);
    println!("{HELP}");
    prompt()?;

    loop {
        match rx.recv_timeout(POLL) {
            Ok(line) => {
                let active = session.state().active_view;
                match parse_line(&line, active, defaults) {
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => execute(session, command, local_files)?,
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                }
                prompt()?;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        let effects = session.process_pending()?;
        present(session, &effects, local_files);
    }
    Ok(())
}

fn execute<T: Transport>(
    session: &mut Session<T>,
    command: ShellCommand,
    local_files: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = session.state();
    match command {
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Views => println!("{}", render::view_names()),
        ShellCommand::List(view) => {
            let view = view.unwrap_or(state.active_view);
            print!("{}", render::view(state.context(view), view == state.active_view));
        }
        ShellCommand::Show => print!("{}", render::snapshot(state)),
        ShellCommand::Status => print!("{}", render::status_history(state)),
        ShellCommand::Quit => {}
        ShellCommand::Action(action) => {
            let effects = session.submit(action)?;
            present(session, &effects, local_files);
        }
    }
    Ok(())
}

fn present<T: Transport>(session: &Session<T>, effects: &[ClientEffect], local_files: &Path) {
    let mut frame = false;
    for effect in effects {
        match effect {
            ClientEffect::ShowFile { file_name } => match render::file(local_files, file_name) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("cannot open {file_name}: {err}"),
            },
            ClientEffect::RequestFrame => frame = true,
            ClientEffect::Send(_) => {}
        }
    }
    if frame {
        println!("{}", render::status_line(session.state()));
    }
}

fn prompt() -> io::Result<()> {
    print!("depot> ");
    io::stdout().flush()
}
