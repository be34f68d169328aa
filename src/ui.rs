// UI layer: a simple interactive menu using `dialoguer`.
// Every action is one request; errors are printed and the menu continues.
// When stdin is piped the menu is replaced by a line-oriented script.

use crate::api::ApiClient;
use crate::models::{Directory, File, FileIndex};
use anyhow::Result;
use crossterm::tty::IsTty;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Files from the most recent listing or search. Each new response
/// replaces the previous one.
#[derive(Default)]
pub struct Session {
    current: FileIndex,
}

impl Session {
    pub fn replace(&mut self, index: FileIndex) {
        self.current = index;
    }

    pub fn current(&self) -> &FileIndex {
        &self.current
    }
}

/// Main interactive menu. Runs a select loop until the user picks "Exit".
/// Falls back to [`run_script`] when stdin is not a terminal.
pub fn main_menu(api: ApiClient) -> Result<()> {
    let stdin = io::stdin();
    if !stdin.is_tty() {
        return run_script(&api, stdin.lock(), &mut io::stdout());
    }

    let mut session = Session::default();
    loop {
        let items = vec!["Browse directory", "Search", "Look up file", "Download file", "Exit"];
        let selection = Select::new()
            .with_prompt("dhokla-cli")
            .items(&items)
            .default(0)
            .interact()?;
        match selection {
            0 => handle_browse(&api, &mut session)?,
            1 => handle_search(&api, &mut session)?,
            2 => handle_lookup(&session)?,
            3 => handle_download(&api, &session)?,
            4 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Non-interactive flow: the first input line is a directory id to list
/// (empty for the root), every later non-empty line is a search query.
pub fn run_script<R: BufRead, W: Write>(api: &ApiClient, input: R, out: &mut W) -> Result<()> {
    let mut lines = input.lines();
    let id = match lines.next() {
        Some(line) => line?,
        None => String::new(),
    };
    show_directory(api, id.trim(), out)?;

    for line in lines {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        show_search(api, query, out)?;
    }
    Ok(())
}

/// Fetch and print a directory. Returns its index, or `None` after
/// printing the error.
fn show_directory<W: Write>(api: &ApiClient, id: &str, out: &mut W) -> Result<Option<FileIndex>> {
    match api.directory(Some(id)) {
        Ok(dir) => {
            write!(out, "{}", format_directory(&dir))?;
            Ok(Some(dir.into_index()))
        }
        Err(e) => {
            writeln!(out, "error occurred while getting directory: {}", e)?;
            Ok(None)
        }
    }
}

fn show_search<W: Write>(api: &ApiClient, query: &str, out: &mut W) -> Result<Option<FileIndex>> {
    match api.search(query) {
        Ok(files) => {
            if files.is_empty() {
                writeln!(out, "No results")?;
            }
            for file in &files {
                writeln!(out, "{}", format_file(file))?;
            }
            Ok(Some(files.into_iter().collect()))
        }
        Err(e) => {
            writeln!(out, "Search failed: {}", e)?;
            Ok(None)
        }
    }
}

/// Prompt for a directory id (empty for the root) and list it.
fn handle_browse(api: &ApiClient, session: &mut Session) -> Result<()> {
    let id: String = Input::new()
        .with_prompt("Directory ID (empty for root)")
        .allow_empty(true)
        .interact_text()?;

    let spinner = spinner("Fetching directory...");
    let mut listing = Vec::new();
    let index = show_directory(api, id.trim(), &mut listing)?;
    spinner.finish_and_clear();

    io::stdout().write_all(&listing)?;
    if let Some(index) = index {
        session.replace(index);
    }
    Ok(())
}

fn handle_search(api: &ApiClient, session: &mut Session) -> Result<()> {
    let query: String = Input::new().with_prompt("Search").interact_text()?;

    let spinner = spinner("Searching...");
    let mut results = Vec::new();
    let index = show_search(api, query.trim(), &mut results)?;
    spinner.finish_and_clear();

    io::stdout().write_all(&results)?;
    if let Some(index) = index {
        session.replace(index);
    }
    Ok(())
}

fn handle_lookup(session: &Session) -> Result<()> {
    let id = prompt_id()?;
    match session.current().lookup(&id) {
        Ok(file) => println!("{}", format_file(file)),
        Err(miss) => println!("{}", miss),
    }
    Ok(())
}

fn handle_download(api: &ApiClient, session: &Session) -> Result<()> {
    let id = prompt_id()?;
    let file = match session.current().lookup(&id) {
        Ok(file) => file,
        Err(miss) => {
            println!("{}", miss);
            return Ok(());
        }
    };
    println!(
        "Started downloading {}, ID: {}, size: {}",
        file.name,
        file.id,
        format_size(file.size)
    );
    match api.download(file, api.download_dir()) {
        Ok(done) => println!("Saved {} ({} bytes)", done.path.display(), done.bytes),
        Err(e) => println!("Download failed: {}", e),
    }
    Ok(())
}

fn prompt_id() -> Result<String> {
    let id: String = Input::new().with_prompt("File ID").interact_text()?;
    Ok(id.trim().to_string())
}

fn spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// One listing line per file.
pub fn format_file(file: &File) -> String {
    let name = if file.dir {
        format!("{}/", file.name)
    } else {
        file.name.clone()
    };
    format!(
        "Name: {}, ID: {}, Size: {}, Modification Time: {}",
        name,
        file.id,
        format_size(file.size),
        file.mtime
    )
}

/// Directory header followed by one line per child, in server order.
pub fn format_directory(dir: &Directory) -> String {
    let mut out = String::new();
    let name = if dir.name.is_empty() { "/" } else { &dir.name };
    out.push_str(&format!("Directory: {} (ID: {})\n", name, dir.id));
    if !dir.message.is_empty() {
        out.push_str(&format!("Message: {}\n", dir.message));
    }
    if dir.files.is_empty() {
        out.push_str("(empty)\n");
    }
    for file in &dir.files {
        out.push_str(&format_file(file));
        out.push('\n');
    }
    out
}

fn format_size(size: Option<u64>) -> String {
    size.map_or_else(|| "-".to_string(), |s| s.to_string())
}
