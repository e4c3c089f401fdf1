//! src/shell.rs
//!
//! Line-oriented front end for [`FileView`]. Commands are read from any
//! async line source and answers from the backend are rendered as they
//! arrive, so a slow preview never blocks typing the next command.
//!
//! File numbers are 1-based positions in the last printed list. `download`
//! and `delete` without a number act on the selected file.

use crate::{
    models::{Category, RecordId, StagedFile, category::UnknownCategory},
    view::{DeleteConfirmation, FileView, PreviewState, Selection, ViewUpdate, upload::UploadBlocked},
};
use std::{
    io::{self, Write},
    path::PathBuf,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

pub const HELP: &str = "\
Commands:
  categories            list the file categories
  open <category>       show a category's files
  back                  return to the categories
  reload                fetch the open category again
  ls                    print the current list
  select <n>            preview file n
  show                  print the preview state
  download [n]          save file n (or the selected file)
  delete [n]            delete file n (or the selected file), asks first
  add                   open the upload dialog
  pick <paths..>        stage files from disk
  drop <paths..>        stage files dropped onto the dialog
  unstage <n>           remove staged file n
  staged                print the staged files
  cancel                close the upload dialog
  upload                upload the staged files
  wait                  wait for every running request
  help                  print this text
  quit                  leave";

#[derive(Clone, Debug, PartialEq)]
pub enum ShellCommand {
    Categories,
    Open(Category),
    Back,
    Reload,
    List,
    Select(usize),
    Show,
    Download(Option<usize>),
    Delete(Option<usize>),
    Add,
    Pick(Vec<PathBuf>),
    Drop(Vec<PathBuf>),
    Unstage(usize),
    Staged,
    Cancel,
    Upload,
    Wait,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "categories" | "cats" => ShellCommand::Categories,
            "open" => {
                let name = rest.join(" ");
                if name.is_empty() {
                    return Err("usage: open <category>".into());
                }
                let category: Category = name.parse().map_err(|e: UnknownCategory| e.to_string())?;
                ShellCommand::Open(category)
            }
            "back" => ShellCommand::Back,
            "reload" | "refresh" => ShellCommand::Reload,
            "ls" | "list" => ShellCommand::List,
            "select" | "sel" => ShellCommand::Select(required_number(&rest, "select <n>")?),
            "show" => ShellCommand::Show,
            "download" | "dl" => ShellCommand::Download(optional_number(&rest)?),
            "delete" | "rm" => ShellCommand::Delete(optional_number(&rest)?),
            "add" | "new" => ShellCommand::Add,
            "pick" => ShellCommand::Pick(paths(&rest, "pick <paths..>")?),
            "drop" => ShellCommand::Drop(paths(&rest, "drop <paths..>")?),
            "unstage" => ShellCommand::Unstage(required_number(&rest, "unstage <n>")?),
            "staged" => ShellCommand::Staged,
            "cancel" | "close" => ShellCommand::Cancel,
            "upload" => ShellCommand::Upload,
            "wait" => ShellCommand::Wait,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command `{}` (try `help`)", other)),
        };
        Ok(Some(command))
    }
}

fn optional_number(rest: &[&str]) -> Result<Option<usize>, String> {
    match rest.first() {
        None => Ok(None),
        Some(word) => parse_number(word).map(Some),
    }
}

fn required_number(rest: &[&str], usage: &str) -> Result<usize, String> {
    match rest.first() {
        None => Err(format!("usage: {}", usage)),
        Some(word) => parse_number(word),
    }
}

fn parse_number(word: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("`{}` is not a file number", word)),
    }
}

fn paths(rest: &[&str], usage: &str) -> Result<Vec<PathBuf>, String> {
    if rest.is_empty() {
        return Err(format!("usage: {}", usage));
    }
    Ok(rest.iter().map(PathBuf::from).collect())
}

pub struct Shell {
    view: FileView,
    download_dir: PathBuf,
    confirming: Option<DeleteConfirmation>,
}

impl Shell {
    pub fn new(view: FileView, download_dir: PathBuf) -> Self {
        Self {
            view,
            download_dir,
            confirming: None,
        }
    }

    pub fn view(&self) -> &FileView {
        &self.view
    }

    /// Run until `quit` or end of input. At end of input, requests still
    /// running are awaited so scripted sessions see their results.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        writeln!(out, "Files for project {}. Type `help` for commands.", self.view.project_no())?;
        self.print_categories(out)?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        self.wait(out).await?;
                        break;
                    };
                    if !self.handle_line(&line, out).await? {
                        break;
                    }
                }
                Some(update) = self.view.next_update(), if self.view.pending() > 0 => {
                    self.render(&update, out)?;
                }
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Handle one line of input. Returns `false` to leave.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        if let Some(confirmation) = self.confirming.take() {
            if matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                writeln!(out, "Deleting {}...", confirmation.file().file_name)?;
                self.view.confirm_delete(confirmation);
            } else {
                writeln!(out, "Delete cancelled.")?;
            }
            return Ok(true);
        }

        let command = match ShellCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(message) => {
                writeln!(out, "{}", message)?;
                return Ok(true);
            }
        };
        self.execute(command, out).await
    }

    async fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> io::Result<bool> {
        match command {
            ShellCommand::Categories => self.print_categories(out)?,
            ShellCommand::Open(category) => {
                self.view.open_category(category);
                writeln!(out, "Loading {} files...", category.label())?;
            }
            ShellCommand::Back => {
                self.view.back_to_categories();
                self.print_categories(out)?;
            }
            ShellCommand::Reload => {
                if self.view.category().is_none() {
                    writeln!(out, "Open a category first.")?;
                } else if !self.view.reload() {
                    writeln!(out, "Already loading.")?;
                }
            }
            ShellCommand::List => self.print_files(out)?,
            ShellCommand::Select(n) => match self.file_id(n) {
                Some(id) => match self.view.select_file(&id) {
                    Some(Selection::Fetch(_)) => writeln!(out, "Loading preview...")?,
                    Some(Selection::Unavailable) | Some(Selection::Unchanged) => {
                        self.print_preview(out)?
                    }
                    None => writeln!(out, "No file {}.", n)?,
                },
                None => writeln!(out, "No file {}.", n)?,
            },
            ShellCommand::Show => self.print_preview(out)?,
            ShellCommand::Download(n) => match self.target(n) {
                Some(id) => {
                    if !self.view.download(&id, &self.download_dir) {
                        writeln!(out, "That file is already downloading.")?;
                    }
                }
                None => writeln!(out, "Select a file or give its number.")?,
            },
            ShellCommand::Delete(n) => match self.target(n).and_then(|id| self.view.request_delete(&id)) {
                Some(confirmation) => {
                    writeln!(out, "{} [y/N]", confirmation.prompt())?;
                    self.confirming = Some(confirmation);
                }
                None => writeln!(out, "Nothing to delete.")?,
            },
            ShellCommand::Add => {
                if self.view.category().is_none() {
                    writeln!(out, "Open a category first.")?;
                } else {
                    self.view.open_upload_modal();
                    writeln!(out, "Upload dialog open. Stage files with `pick` or `drop`.")?;
                }
            }
            ShellCommand::Pick(_) | ShellCommand::Drop(_) | ShellCommand::Unstage(_)
                if self.view.is_uploading() =>
            {
                writeln!(out, "Uploading; staged files are locked until it finishes.")?
            }
            ShellCommand::Pick(paths) => {
                let files = self.read_files(&paths, out).await?;
                let added = self.view.stage_from_picker(files);
                self.print_staged_summary(added, out)?;
            }
            ShellCommand::Drop(paths) => {
                let files = self.read_files(&paths, out).await?;
                let added = self.view.stage_from_drop(files);
                self.print_staged_summary(added, out)?;
            }
            ShellCommand::Unstage(n) => match self.view.unstage(n - 1) {
                Some(file) => writeln!(out, "Removed {}.", file.name)?,
                None => writeln!(out, "No staged file {}.", n)?,
            },
            ShellCommand::Staged => self.print_staged(out)?,
            ShellCommand::Cancel => {
                if self.view.close_upload_modal() {
                    writeln!(out, "Upload dialog closed.")?;
                } else {
                    writeln!(out, "Upload in progress; wait for it to finish.")?;
                }
            }
            ShellCommand::Upload => match self.view.start_upload() {
                Ok(()) => writeln!(
                    out,
                    "Uploading {} file(s)...",
                    self.view.staging().len()
                )?,
                Err(UploadBlocked::InProgress) => writeln!(out, "Uploading...")?,
                Err(err) => writeln!(out, "Cannot upload: {}.", err)?,
            },
            ShellCommand::Wait => self.wait(out).await?,
            ShellCommand::Help => writeln!(out, "{}", HELP)?,
            ShellCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    async fn wait<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        while let Some(update) = self.view.next_update().await {
            self.render(&update, out)?;
        }
        Ok(())
    }

    async fn read_files<W: Write>(&self, paths: &[PathBuf], out: &mut W) -> io::Result<Vec<StagedFile>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match StagedFile::from_path(path).await {
                Ok(file) => files.push(file),
                Err(err) => {
                    warn!("reading {} failed: {}", path.display(), err);
                    writeln!(out, "Could not read {}: {}", path.display(), err)?;
                }
            }
        }
        Ok(files)
    }

    fn file_id(&self, n: usize) -> Option<RecordId> {
        self.view.files().get(n.checked_sub(1)?).map(|f| f.id.clone())
    }

    fn target(&self, n: Option<usize>) -> Option<RecordId> {
        match n {
            Some(n) => self.file_id(n),
            None => self.view.preview().selected().map(|f| f.id.clone()),
        }
    }

    // --- Rendering ---

    fn render<W: Write>(&self, update: &ViewUpdate, out: &mut W) -> io::Result<()> {
        match update {
            ViewUpdate::Files => self.print_files(out),
            ViewUpdate::Preview => self.print_preview(out),
            ViewUpdate::UploadFinished { ok: true } => writeln!(out, "Upload complete."),
            ViewUpdate::DeleteFinished { ok: true } => writeln!(out, "File deleted."),
            ViewUpdate::DownloadFinished { path: Some(path) } => {
                writeln!(out, "Saved to {}", path.display())
            }
            ViewUpdate::UploadFinished { ok: false }
            | ViewUpdate::DeleteFinished { ok: false }
            | ViewUpdate::DownloadFinished { path: None } => self.print_error(out),
            ViewUpdate::Stale => Ok(()),
        }
    }

    fn print_error<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(error) = self.view.error() {
            writeln!(out, "Error: {}", error)?;
        }
        Ok(())
    }

    fn print_categories<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for category in Category::ALL {
            writeln!(
                out,
                "  {} {:<14} {:<14} {}",
                category.icon(),
                category.label(),
                category.as_str(),
                category.description()
            )?;
        }
        Ok(())
    }

    fn print_files<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(category) = self.view.category() else {
            return writeln!(out, "No category open.");
        };
        if self.view.is_loading() {
            return writeln!(out, "Loading {} files...", category.label());
        }
        self.print_error(out)?;
        if self.view.shows_empty_state() {
            return writeln!(
                out,
                "No files found in this category. Use `add` to upload the first one."
            );
        }
        writeln!(
            out,
            "{} files for project {} ({}):",
            category.label(),
            self.view.project_no(),
            self.view.files().len()
        )?;
        let selected = self.view.preview().selected().map(|f| &f.id);
        for (i, file) in self.view.files().iter().enumerate() {
            let marker = if selected == Some(&file.id) { '>' } else { ' ' };
            let deleting = if self.view.is_deleting(&file.id) {
                " (deleting)"
            } else {
                ""
            };
            writeln!(
                out,
                "{} {:>3}. {}  {}{}",
                marker,
                i + 1,
                file.file_name,
                file.size_label(),
                deleting
            )?;
        }
        Ok(())
    }

    fn print_preview<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.view.preview().state() {
            PreviewState::Idle => writeln!(out, "Select a file to preview."),
            PreviewState::Loading { file } => writeln!(out, "Loading preview of {}...", file.file_name),
            PreviewState::Ready { file, url } => {
                writeln!(out, "Preview of {} ({}): {}", file.file_name, file.mime_type, url)
            }
            PreviewState::Unavailable { file } => writeln!(
                out,
                "Preview not available for {}. Use `download` to save it.",
                file.file_name
            ),
            PreviewState::Failed { error } => writeln!(out, "Error: {}", error),
        }
    }

    fn print_staged<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let staging = self.view.staging();
        if staging.is_empty() {
            return writeln!(out, "No files staged.");
        }
        for (i, file) in staging.files().iter().enumerate() {
            writeln!(
                out,
                "  {:>3}. {}  {:.2} MB",
                i + 1,
                file.name,
                file.size as f64 / (1024.0 * 1024.0)
            )?;
        }
        for file in staging.oversized() {
            writeln!(out, "Warning: {} is larger than 50 MB and may be rejected.", file.name)?;
        }
        Ok(())
    }

    fn print_staged_summary<W: Write>(&self, added: usize, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Staged {} new file(s), {} total.",
            added,
            self.view.staging().len()
        )?;
        for file in self.view.staging().oversized() {
            writeln!(out, "Warning: {} is larger than 50 MB and may be rejected.", file.name)?;
        }
        Ok(())
    }
}
