use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use image_manager_adapters::{
    present_batch, present_export_report, present_image_row, present_progress,
};
use image_manager_application::{
    DeleteImageCommand, DropImageCommand, ExportArchiveCommand, ImageDataUrlQuery,
    ImageManagerService, ListImagesCommand, PollUploadCommand, ProgressQuery, SortImagesCommand,
    StartDragCommand, WaitForUploadCommand,
};
use image_manager_domain::{DropEvent, SortKey};

use crate::cli::parse_sort_key;
use crate::config::AppConfig;
use crate::{set_root_at, start_upload, CommandError};

const HELP: &str = "\
commands:
  upload <path>...     start decoding files or folders in the background
  wait                 block until the current upload batch finishes
  status               show upload counters
  list                 show images in position order
  move <from> <to>     drag the image at <from> and drop it at <to>
  delete <index>       remove the image at <index>
  root <index>         mark the image at <index> as root
  sort [key]           reorder by ingestion or file-name
  url <index>          print the image as a data URL
  export [file-name]   write the archive
  help                 show this text
  quit                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Upload(Vec<PathBuf>),
    Wait,
    Status,
    List,
    Move(DropEvent),
    Delete(usize),
    Root(usize),
    Sort(Option<SortKey>),
    Url(usize),
    Export(Option<String>),
    Help,
    Quit,
}

/// Blank lines and `#` comments parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    if name.starts_with('#') {
        return Ok(None);
    }
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("upload", []) => return Err("upload needs at least one path".to_string()),
        ("upload", paths) => ShellCommand::Upload(paths.iter().map(PathBuf::from).collect()),
        ("wait", []) => ShellCommand::Wait,
        ("status", []) => ShellCommand::Status,
        ("list" | "ls", []) => ShellCommand::List,
        ("move" | "mv", [from, to]) => ShellCommand::Move(DropEvent {
            previous_index: index(from)?,
            current_index: index(to)?,
        }),
        ("delete" | "rm", [at]) => ShellCommand::Delete(index(at)?),
        ("root", [at]) => ShellCommand::Root(index(at)?),
        ("sort", []) => ShellCommand::Sort(None),
        ("sort", [key]) => ShellCommand::Sort(Some(parse_sort_key(key)?)),
        ("url", [at]) => ShellCommand::Url(index(at)?),
        ("export", []) => ShellCommand::Export(None),
        ("export", [file_name]) => ShellCommand::Export(Some((*file_name).to_string())),
        ("help" | "?", []) => ShellCommand::Help,
        ("quit" | "exit", []) => ShellCommand::Quit,
        (
            "wait" | "status" | "list" | "ls" | "move" | "mv" | "delete" | "rm" | "root" | "sort"
            | "url" | "export" | "help" | "?" | "quit" | "exit",
            _,
        ) => return Err(format!("wrong number of arguments for {name}")),
        (other, _) => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

fn index(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("invalid index: {value}"))
}

/// Reads commands line by line until `quit` or end of input.
///
/// Uploads run in the background; finished batches are reported before the
/// next command runs. Command errors are printed and the session continues.
pub fn run_shell<R, W>(
    service: &mut ImageManagerService,
    config: &AppConfig,
    inputs: &[PathBuf],
    input: R,
    output: &mut W,
) -> Result<(), CommandError>
where
    R: BufRead,
    W: Write,
{
    let notices: Rc<RefCell<Vec<String>>> = Rc::default();
    let queue = Rc::clone(&notices);
    service.on_batch_complete(move |event| queue.borrow_mut().push(present_batch(event)));

    if !inputs.is_empty() {
        let (batch_id, files) = start_upload(service, inputs)?;
        emit(output, &format!("batch {batch_id} started with {files} files"))?;
    }

    for line in input.lines() {
        let line = line.map_err(|error| CommandError::runtime("failed to read input", error))?;
        poll(service)?;
        flush_notices(&notices, output)?;

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                emit(output, &format!("error: {msg}"))?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        let reply = execute(service, config, command);
        flush_notices(&notices, output)?;
        match reply {
            Ok(text) if text.is_empty() => {}
            Ok(text) => emit(output, &text)?,
            Err(error) => emit(output, &format!("error: {error}"))?,
        }
    }
    Ok(())
}

fn execute(
    service: &mut ImageManagerService,
    config: &AppConfig,
    command: ShellCommand,
) -> Result<String, CommandError> {
    match command {
        ShellCommand::Upload(paths) => {
            let (batch_id, files) = start_upload(service, &paths)?;
            Ok(format!("batch {batch_id} started with {files} files"))
        }
        ShellCommand::Wait => {
            service
                .wait_for_upload(WaitForUploadCommand)
                .map_err(|error| CommandError::runtime("upload failed", error))?;
            Ok(String::new())
        }
        ShellCommand::Status => Ok(present_progress(&service.progress(ProgressQuery))),
        ShellCommand::List => {
            let rows: Vec<String> = service
                .list_images(ListImagesCommand)
                .iter()
                .map(present_image_row)
                .collect();
            if rows.is_empty() {
                Ok("no images".to_string())
            } else {
                Ok(rows.join("\n"))
            }
        }
        ShellCommand::Move(event) => {
            service
                .start_drag(StartDragCommand {
                    index: event.previous_index,
                })
                .and_then(|()| service.drop_image(DropImageCommand { event }))
                .map_err(|error| CommandError::runtime("move failed", error))?;
            Ok(format!(
                "moved {} -> {}",
                event.previous_index, event.current_index
            ))
        }
        ShellCommand::Delete(index) => {
            let id = service
                .delete_image(DeleteImageCommand { index })
                .map_err(|error| CommandError::runtime("delete failed", error))?;
            Ok(format!("deleted image {id}"))
        }
        ShellCommand::Root(index) => {
            let id = set_root_at(service, index)?;
            Ok(format!("root image is {id}"))
        }
        ShellCommand::Sort(key) => {
            let key = key.unwrap_or(config.sort_key);
            service.sort_images(SortImagesCommand { key });
            Ok(format!("sorted by {key:?}"))
        }
        ShellCommand::Url(index) => service
            .image_data_url(ImageDataUrlQuery { index })
            .map_err(|error| CommandError::runtime("data url failed", error)),
        ShellCommand::Export(file_name) => {
            let report = service
                .export_archive(ExportArchiveCommand { file_name })
                .map_err(|error| CommandError::runtime("export failed", error))?;
            Ok(present_export_report(&report))
        }
        ShellCommand::Help => Ok(HELP.to_string()),
        ShellCommand::Quit => Ok(String::new()),
    }
}

fn poll(service: &mut ImageManagerService) -> Result<(), CommandError> {
    service
        .poll_upload(PollUploadCommand)
        .map(|_| ())
        .map_err(|error| CommandError::runtime("upload failed", error))
}

fn flush_notices<W: Write>(
    notices: &Rc<RefCell<Vec<String>>>,
    output: &mut W,
) -> Result<(), CommandError> {
    let pending: Vec<String> = notices.borrow_mut().drain(..).collect();
    for notice in pending {
        emit(output, &notice)?;
    }
    Ok(())
}

fn emit<W: Write>(output: &mut W, text: &str) -> Result<(), CommandError> {
    writeln!(output, "{text}")
        .map_err(|error| CommandError::runtime("failed to write output", error))
}
