mod cli;
mod config;
mod logging;
mod shell;

use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command, ExportArgs};
use config::AppConfig;
use image_manager_adapters::{
    present_batch, present_export_report, present_image_row, FsDownloadSink, ImageCrateCompressor,
    ImageCrateDecoder, WalkdirFileLoader, ZipArchiveWriter,
};
use image_manager_application::{
    DeleteImageCommand, DropImageCommand, ExportArchiveCommand, ImageManagerService,
    ListImagesCommand, SetRootImageCommand, SortImagesCommand, StartDragCommand,
    UploadFilesCommand, WaitForUploadCommand,
};
use image_manager_domain::{ImageId, SortKey};
use tracing::info;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error:#}");
            return ExitCode::from(2);
        }
    };

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_service(config: &AppConfig) -> ImageManagerService {
    ImageManagerService::new(
        Box::new(ImageCrateDecoder),
        Box::new(ImageCrateCompressor),
        Box::new(ZipArchiveWriter),
        Box::new(FsDownloadSink::new(config.output_dir.clone())),
        config.service_settings(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

impl CommandError {
    fn runtime(context: &str, error: impl Display) -> Self {
        Self::Runtime(format!("{context}: {error}"))
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) | Self::Runtime(msg) => f.write_str(msg),
        }
    }
}

fn run_command(command: Command, mut config: AppConfig) -> Result<(), CommandError> {
    match command {
        Command::Export(args) => {
            args.apply_to(&mut config);
            let mut service = build_service(&config);
            service.on_batch_complete(|event| println!("{}", present_batch(event)));

            upload_and_wait(&mut service, &args.inputs, config.sort_key)?;
            apply_edits(&mut service, &args)?;

            let report = service
                .export_archive(ExportArchiveCommand::default())
                .map_err(|error| CommandError::runtime("export failed", error))?;
            println!("{}", present_export_report(&report));
            Ok(())
        }
        Command::List { inputs } => {
            let mut service = build_service(&config);
            service.on_batch_complete(|event| println!("{}", present_batch(event)));
            upload_and_wait(&mut service, &inputs, config.sort_key)?;

            let images = service.list_images(ListImagesCommand);
            if images.is_empty() {
                println!("no images uploaded");
            }
            for image in &images {
                println!("{}", present_image_row(image));
            }
            Ok(())
        }
        Command::Shell { inputs } => {
            let mut service = build_service(&config);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            shell::run_shell(&mut service, &config, &inputs, stdin.lock(), &mut stdout)
        }
    }
}

/// Reads `inputs` from disk and starts a batch. Returns the batch id and the
/// number of files handed to the decoder.
fn start_upload(
    service: &mut ImageManagerService,
    inputs: &[PathBuf],
) -> Result<(u64, usize), CommandError> {
    let loaded = WalkdirFileLoader
        .load(inputs)
        .map_err(|error| CommandError::runtime("failed to read inputs", error))?;
    if loaded.skipped_files > 0 {
        info!(skipped = loaded.skipped_files, "unsupported files skipped");
    }

    let files = loaded.files.len();
    let batch_id = service
        .upload_files(UploadFilesCommand {
            files: loaded.files,
        })
        .map_err(|error| CommandError::runtime("upload failed", error))?;
    Ok((batch_id, files))
}

fn upload_and_wait(
    service: &mut ImageManagerService,
    inputs: &[PathBuf],
    sort_key: SortKey,
) -> Result<(), CommandError> {
    start_upload(service, inputs)?;
    service
        .wait_for_upload(WaitForUploadCommand)
        .map_err(|error| CommandError::runtime("upload failed", error))?;
    // Decoding finishes in any order, so ids alone are not reproducible.
    service.sort_images(SortImagesCommand { key: sort_key });
    Ok(())
}

fn apply_edits(service: &mut ImageManagerService, args: &ExportArgs) -> Result<(), CommandError> {
    for event in &args.moves {
        service
            .start_drag(StartDragCommand {
                index: event.previous_index,
            })
            .and_then(|()| service.drop_image(DropImageCommand { event: *event }))
            .map_err(|error| CommandError::runtime("move failed", error))?;
    }
    for &index in &args.deletes {
        service
            .delete_image(DeleteImageCommand { index })
            .map_err(|error| CommandError::runtime("delete failed", error))?;
    }
    if let Some(position) = args.root {
        set_root_at(service, position)?;
    }
    Ok(())
}

fn set_root_at(service: &mut ImageManagerService, position: usize) -> Result<ImageId, CommandError> {
    let image_id = service
        .store()
        .get(position)
        .map(|record| record.id)
        .ok_or_else(|| CommandError::Runtime(format!("no image at position {position}")))?;
    service
        .set_root_image(SetRootImageCommand { image_id })
        .map_err(|error| CommandError::runtime("root selection failed", error))?;
    Ok(image_id)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use image::{DynamicImage, ImageBuffer, Rgb};
    use tempfile::TempDir;

    use super::*;

    pub(crate) fn write_png(dir: &std::path::Path, name: &str, width: u32) {
        let img = ImageBuffer::from_fn(width, 4, |x, _y| Rgb([(x % 255) as u8, 60_u8, 90_u8]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        fs::write(dir.join(name), bytes).expect("write png");
    }

    fn config_for(output: &TempDir) -> AppConfig {
        AppConfig {
            output_dir: output.path().to_path_buf(),
            decode_workers: 2,
            ..AppConfig::default()
        }
    }

    fn names(service: &ImageManagerService) -> Vec<String> {
        service
            .list_images(ListImagesCommand)
            .into_iter()
            .map(|image| image.file_name)
            .collect()
    }

    #[test]
    fn export_command_applies_edits_then_writes_archive() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        for (name, width) in [("a.png", 8), ("b.png", 9), ("c.png", 10)] {
            write_png(input.path(), name, width);
        }
        fs::write(input.path().join("notes.txt"), "not an image").expect("write txt");

        let cli = Cli::try_parse_from([
            "image-manager".to_string(),
            "export".to_string(),
            input.path().display().to_string(),
            "--move".to_string(),
            "0:2".to_string(),
            "--delete".to_string(),
            "0".to_string(),
            "--file-name".to_string(),
            "album.zip".to_string(),
        ])
        .expect("parse");

        run_command(cli.command, config_for(&output)).expect("export runs");

        assert!(output.path().join("album.zip").is_file());
    }

    #[test]
    fn edits_follow_move_then_delete_then_root() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        for (name, width) in [("a.png", 8), ("b.png", 9), ("c.png", 10)] {
            write_png(input.path(), name, width);
        }
        let config = config_for(&output);
        let mut service = build_service(&config);
        upload_and_wait(&mut service, &[input.path().to_path_buf()], config.sort_key)
            .expect("upload");
        assert_eq!(names(&service), vec!["a.png", "b.png", "c.png"]);

        let cli = Cli::try_parse_from([
            "image-manager",
            "export",
            "unused",
            "--move",
            "0:2",
            "--delete",
            "0",
            "--root",
            "1",
        ])
        .expect("parse");
        let Command::Export(args) = cli.command else {
            panic!("expected export command");
        };
        apply_edits(&mut service, &args).expect("edits");

        assert_eq!(names(&service), vec!["c.png", "a.png"]);
        let root = service.store().root().expect("root set");
        assert_eq!(root.payload.file_name, "a.png");
        assert_eq!(service.dragged_index(), None);
    }

    #[test]
    fn failed_move_is_a_runtime_error() {
        let input = TempDir::new().expect("input dir");
        let output = TempDir::new().expect("output dir");
        write_png(input.path(), "a.png", 8);
        let config = config_for(&output);
        let mut service = build_service(&config);
        upload_and_wait(&mut service, &[input.path().to_path_buf()], config.sort_key)
            .expect("upload");

        let cli = Cli::try_parse_from(["image-manager", "export", "x", "--move", "0:3"])
            .expect("parse");
        let Command::Export(args) = cli.command else {
            panic!("expected export command");
        };

        assert!(matches!(
            apply_edits(&mut service, &args),
            Err(CommandError::Runtime(_))
        ));
        assert_eq!(names(&service), vec!["a.png"]);
    }

    #[test]
    fn missing_input_is_reported() {
        let output = TempDir::new().expect("output dir");
        let config = config_for(&output);
        let mut service = build_service(&config);
        let result = upload_and_wait(
            &mut service,
            &[output.path().join("does-not-exist")],
            config.sort_key,
        );
        assert!(matches!(result, Err(CommandError::Runtime(_))));
    }
}
