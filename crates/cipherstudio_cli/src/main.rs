//! Command-line client for CipherStudio projects.

mod api;

use api::{normalize_server, ApiClient, ApiError};
use cipherstudio_core::config::client_home_from_env_or_default;
use cipherstudio_core::files::normalize_path;
use cipherstudio_core::models::project::project_name_or_default;
use cipherstudio_core::{
    AppError, Edit, LocalCache, ProjectStore, Session, Workspace, DEFAULT_CLI_SERVER_URL,
};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde_json::json;
use std::fmt::Display;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

const LOGIN_TO_LOAD: &str = "Login to load projects from cloud";
const STATUS_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "cipher", about = "CipherStudio CLI", version)]
struct Cli {
    /// Server URL (can also be set via CIPHER_SERVER env var)
    #[arg(short, long, env = "CIPHER_SERVER", global = true)]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30", global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List files in the working copy
    Ls,
    /// Print a file
    Cat { path: String },
    /// Create a file; `.js` is appended when the name has no extension
    Add { name: String },
    /// Delete a file
    Rm { path: String },
    /// Rename a file
    Mv { path: String, new_name: String },
    /// Move every file under one folder to another
    MvDir { old: String, new: String },
    /// Replace a file's content (read from stdin unless --file is given)
    Write {
        path: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the generated entry file
    Render {
        /// Print every file handed to the sandbox
        #[arg(short, long)]
        all: bool,
    },
    /// Reset the working copy to a fresh project
    New {
        #[arg(short, long)]
        project: Option<String>,
        /// Discard unsaved changes
        #[arg(long)]
        force: bool,
    },
    /// Switch to another project and load it
    Use {
        project_id: String,
        /// Discard unsaved changes
        #[arg(long)]
        force: bool,
    },
    /// Reload the current project from the local cache or the server
    Load {
        /// Discard unsaved changes
        #[arg(long)]
        force: bool,
    },
    /// Save locally, and to the server when logged in
    Save {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List cached and cloud projects
    Projects,
    /// Write the working copy to `<project-id>.cipher.json`
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long, env = "CIPHER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign in by username or email
    Login {
        #[arg(short, long, required_unless_present = "email")]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// Read from stdin when omitted
        #[arg(short, long, env = "CIPHER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Change an editor preference
    Set {
        #[arg(value_enum)]
        key: Setting,
        #[arg(value_enum)]
        value: Toggle,
    },
    /// Show session, project, and server status
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Setting {
    Autosave,
    AutoRender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        self == Toggle::On
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn fail(action: &str, reason: impl Display) -> ! {
    eprintln!("{} failed: {}", action, reason);
    std::process::exit(1);
}

fn failure_line(action: &str, err: &ApiError) -> String {
    match err {
        ApiError::Status { status, message } => {
            format!("{} failed ({}): {}", action, status, message)
        }
        ApiError::Transport(message) => format!("{} failed: {}", action, message),
    }
}

fn fail_api(action: &str, err: ApiError) -> ! {
    eprintln!("{}", failure_line(action, &err));
    std::process::exit(1);
}

fn explicit_server_override(server: Option<String>) -> Option<String> {
    server.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_server(server: Option<String>) -> String {
    normalize_server(
        explicit_server_override(server).unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string()),
    )
}

fn default_export_path(project_id: &str) -> PathBuf {
    PathBuf::from(format!("{}.cipher.json", project_id))
}

fn read_stdin_to_string() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn read_password(password: Option<String>) -> io::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_json(value: &impl serde::Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Session, working copy, and cache loaded from the client home.
struct ClientState {
    home: PathBuf,
    session: Session,
    workspace: Workspace,
    cache: LocalCache,
}

/// Where a fetched project came from.
enum Fetched {
    Local(Workspace),
    Cloud(Workspace),
    /// Not cached and the session has no token.
    NotCached,
    Missing,
}

impl ClientState {
    fn open(home: PathBuf) -> Result<Self, AppError> {
        let session = Session::load(&home)?;
        let workspace = Workspace::load(&home, &session.project_id)?;
        let cache = LocalCache::in_home(&home);
        Ok(Self {
            home,
            session,
            workspace,
            cache,
        })
    }

    fn persist(&self) -> Result<(), AppError> {
        self.session.save(&self.home)?;
        self.workspace.store(&self.home)
    }

    fn persist_or_exit(&self, action: &str) {
        if let Err(err) = self.persist() {
            fail(action, err);
        }
    }

    fn client(&self, server: &str, timeout: Duration) -> Result<ApiClient, ApiError> {
        ApiClient::new(server.to_string(), timeout, self.session.token.clone())
    }

    fn ensure_clean(&self, action: &str, force: bool) {
        if self.workspace.is_dirty() && !force {
            fail(
                action,
                "working copy has unsaved changes; run `cipher save` or pass --force",
            );
        }
    }

    /// Apply an edit, persist the working copy, then autosave when enabled.
    fn edit(&mut self, action: &str, edit: Edit) -> String {
        let touched = match self.workspace.apply(edit, &self.session) {
            Ok(touched) => touched,
            Err(err) => fail(action, err),
        };
        self.persist_or_exit(action);
        if let Err(err) = self.workspace.autosave(&self.session, &self.cache) {
            eprintln!("Autosave failed: {}", err);
        }
        touched
    }

    /// Look up `project_id` in the local cache first, then on the server
    /// when the session is signed in.
    async fn fetch(&self, client: &ApiClient, project_id: &str) -> Result<Fetched, String> {
        if let Some(files) = self.cache.load(project_id).map_err(|err| err.to_string())? {
            let mut workspace = Workspace::from_saved(project_id, files);
            if let Some(name) = self.cache.name_of(project_id).map_err(|err| err.to_string())? {
                workspace.set_name(name);
            }
            return Ok(Fetched::Local(workspace));
        }
        if !self.session.is_authed() {
            return Ok(Fetched::NotCached);
        }
        let project = match client.get_project(project_id).await {
            Ok(Some(project)) => project,
            Ok(None) => return Ok(Fetched::Missing),
            Err(err) => return Err(err.to_string()),
        };
        let files = project.file_set().map_err(|err| err.to_string())?;
        let mut workspace = Workspace::from_saved(project_id, files);
        workspace.set_name(project.name);
        Ok(Fetched::Cloud(workspace))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let server = resolve_server(server);
    let timeout = Duration::from_secs(timeout);
    let mut state = match ClientState::open(client_home_from_env_or_default()) {
        Ok(state) => state,
        Err(err) => fail("Open client state", err),
    };

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before state setup"),
        Commands::Ls => {
            let paths: Vec<&str> = state.workspace.files().paths().collect();
            if json {
                print_json(&paths)?;
            } else {
                for path in paths {
                    println!("{}", path);
                }
            }
        }
        Commands::Cat { path } => {
            let path = normalize_path(&path);
            let Some(content) = state.workspace.files().get(&path) else {
                fail("Cat", format!("No file at {}", path));
            };
            if json {
                print_json(&json!({ "path": path, "content": content }))?;
            } else {
                print!("{}", content);
                if !content.ends_with('\n') {
                    println!();
                }
            }
        }
        Commands::Add { name } => {
            let path = state.edit("Add", Edit::Add { name });
            report_edit(json, "Added", &path)?;
        }
        Commands::Rm { path } => {
            let path = normalize_path(&path);
            if !state.workspace.files().contains(&path) {
                fail("Delete", format!("No file at {}", path));
            }
            let path = state.edit("Delete", Edit::Delete { path });
            report_edit(json, "Deleted", &path)?;
        }
        Commands::Mv { path, new_name } => {
            let path = state.edit("Rename", Edit::Rename { path, new_name });
            report_edit(json, "Renamed to", &path)?;
        }
        Commands::MvDir { old, new } => {
            let path = state.edit("Move folder", Edit::RenameFolder { old, new });
            report_edit(json, "Moved folder to", &path)?;
        }
        Commands::Write { path, file } => {
            let content = match file {
                Some(file) => std::fs::read_to_string(file)?,
                None => read_stdin_to_string()?,
            };
            let path = state.edit("Write", Edit::Write { path, content });
            report_edit(json, "Wrote", &path)?;
        }
        Commands::Render { all } => {
            if all {
                let files = state.workspace.sandbox_files(&state.session);
                if json {
                    print_json(&files)?;
                } else {
                    for (path, content) in &files {
                        println!("// {}\n{}\n", path, content);
                    }
                }
            } else {
                let entry = state.workspace.entry(&state.session);
                if json {
                    print_json(&entry)?;
                } else {
                    println!("{}", entry.content);
                }
            }
        }
        Commands::New { project, force } => {
            state.ensure_clean("New", force);
            let project_id = match project {
                Some(project) => project.trim().to_string(),
                None => state.session.project_id.clone(),
            };
            if project_id.is_empty() {
                fail("New", "project id must not be empty");
            }
            state.session.project_id = project_id.clone();
            state.workspace = Workspace::new(project_id.as_str());
            state.persist_or_exit("New");
            println!("Started new project {}", project_id);
        }
        Commands::Use { project_id, force } => {
            state.ensure_clean("Use", force);
            let project_id = project_id.trim().to_string();
            if project_id.is_empty() {
                fail("Use", "project id must not be empty");
            }
            let client = match state.client(&server, timeout) {
                Ok(client) => client,
                Err(err) => fail_api("Use", err),
            };
            let fetched = match state.fetch(&client, &project_id).await {
                Ok(fetched) => fetched,
                Err(message) => fail("Use", message),
            };
            state.session.project_id = project_id.clone();
            let note = match fetched {
                Fetched::Local(workspace) => {
                    state.workspace = workspace;
                    "loaded from local cache"
                }
                Fetched::Cloud(workspace) => {
                    state.workspace = workspace;
                    "loaded from cloud"
                }
                Fetched::NotCached | Fetched::Missing => {
                    state.workspace = Workspace::new(project_id.as_str());
                    "no saved copy, starting fresh"
                }
            };
            state.persist_or_exit("Use");
            println!("Using project {} ({})", project_id, note);
        }
        Commands::Load { force } => {
            state.ensure_clean("Load", force);
            let project_id = state.session.project_id.clone();
            let client = match state.client(&server, timeout) {
                Ok(client) => client,
                Err(err) => fail_api("Load", err),
            };
            let source = match state.fetch(&client, &project_id).await {
                Ok(Fetched::Local(workspace)) => {
                    state.workspace = workspace;
                    "local cache"
                }
                Ok(Fetched::Cloud(workspace)) => {
                    state.workspace = workspace;
                    "cloud"
                }
                Ok(Fetched::NotCached) => fail("Load", LOGIN_TO_LOAD),
                Ok(Fetched::Missing) => fail("Load", format!("No project found for {}", project_id)),
                Err(message) => fail("Load", message),
            };
            state.persist_or_exit("Load");
            if json {
                print_json(&json!({
                    "projectId": project_id,
                    "source": source,
                    "files": state.workspace.files(),
                }))?;
            } else {
                println!(
                    "Loaded {} ({} files) from {}",
                    project_id,
                    state.workspace.files().len(),
                    source
                );
            }
        }
        Commands::Save { name } => {
            if let Some(name) = name {
                state
                    .workspace
                    .set_name(project_name_or_default(Some(name.as_str())));
            }
            if let Err(err) = state.workspace.save_to(&state.cache) {
                fail("Save", err);
            }
            state.persist_or_exit("Save");
            if !state.session.is_authed() {
                println!("Saved locally. Login to save to cloud");
                return Ok(());
            }
            let client = match state.client(&server, timeout) {
                Ok(client) => client,
                Err(err) => fail_api("Save", err),
            };
            let project = match client
                .put_project(
                    state.workspace.project_id(),
                    state.workspace.name(),
                    state.workspace.files(),
                )
                .await
            {
                Ok(project) => project,
                Err(err) => {
                    eprintln!("Saved locally.");
                    fail_api("Save", err);
                }
            };
            if json {
                print_json(&project)?;
            } else {
                println!("Project saved to cloud: {}", project.project_id);
            }
        }
        Commands::Projects => {
            let local = match state.cache.list() {
                Ok(local) => local,
                Err(err) => fail("Projects", err),
            };
            let cloud = if state.session.is_authed() {
                let client = match state.client(&server, timeout) {
                    Ok(client) => client,
                    Err(err) => fail_api("Projects", err),
                };
                match client.list_projects().await {
                    Ok(summaries) => Some(summaries),
                    Err(err) => fail_api("Projects", err),
                }
            } else {
                None
            };
            if json {
                print_json(&json!({ "local": local, "cloud": cloud }))?;
            } else {
                println!("Local:");
                for id in &local {
                    println!("  {}", id);
                }
                match cloud {
                    Some(summaries) => {
                        println!("Cloud:");
                        for summary in summaries {
                            println!(
                                "  {:<24} {:<30} {:>3} files  {}",
                                summary.project_id,
                                summary.name,
                                summary.file_count,
                                summary.updated_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                    }
                    None => println!("Cloud: login to list cloud projects"),
                }
            }
        }
        Commands::Export { out } => {
            let project_id = state.workspace.project_id().to_string();
            let out = out.unwrap_or_else(|| default_export_path(&project_id));
            let document = json!({ "projectId": project_id, "files": state.workspace.files() });
            std::fs::write(&out, serde_json::to_string_pretty(&document)?)?;
            println!("Exported {} to {}", project_id, out.display());
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            let client = match ApiClient::new(server, timeout, None) {
                Ok(client) => client,
                Err(err) => fail_api("Register", err),
            };
            let auth = match client.register(&username, &email, &password).await {
                Ok(auth) => auth,
                Err(err) => fail_api("Register", err),
            };
            let user = auth.user.clone();
            state.session.login(auth.user, auth.token);
            state.persist_or_exit("Register");
            if json {
                print_json(&user)?;
            } else {
                println!("Registered and logged in as {}", user.username);
            }
        }
        Commands::Login {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            let client = match ApiClient::new(server, timeout, None) {
                Ok(client) => client,
                Err(err) => fail_api("Login", err),
            };
            let auth = match client
                .login(username.as_deref(), email.as_deref(), &password)
                .await
            {
                Ok(auth) => auth,
                Err(err) => fail_api("Login", err),
            };
            let user = auth.user.clone();
            state.session.login(auth.user, auth.token);
            state.persist_or_exit("Login");
            if json {
                print_json(&user)?;
            } else {
                println!("Logged in as {}", user.username);
            }
        }
        Commands::Logout => {
            state.session.logout();
            state.persist_or_exit("Logout");
            println!("Logged out");
        }
        Commands::Whoami => {
            if !state.session.is_authed() {
                println!("Not logged in");
                return Ok(());
            }
            let client = match state.client(&server, timeout) {
                Ok(client) => client,
                Err(err) => fail_api("Whoami", err),
            };
            match client.me().await {
                Ok(me) => {
                    if json {
                        print_json(&me.user)?;
                    } else {
                        println!("{} <{}>", me.user.username, me.user.email);
                    }
                }
                Err(err) if err.is_unauthorized() => {
                    state.session.logout();
                    state.persist_or_exit("Whoami");
                    fail("Whoami", "session expired; logged out");
                }
                Err(err) => fail_api("Whoami", err),
            }
        }
        Commands::Set { key, value } => {
            let enabled = value.enabled();
            let label = match key {
                Setting::Autosave => {
                    state.session.autosave = enabled;
                    "autosave"
                }
                Setting::AutoRender => {
                    state.session.auto_render = enabled;
                    "auto-render"
                }
            };
            state.persist_or_exit("Set");
            println!("{}: {}", label, on_off(enabled));
        }
        Commands::Status => {
            let online = match state.client(&server, timeout.min(STATUS_CHECK_TIMEOUT)) {
                Ok(client) => client.health().await.is_ok(),
                Err(_) => false,
            };
            let username = state.session.user.as_ref().map(|user| user.username.clone());
            if json {
                print_json(&json!({
                    "server": server,
                    "online": online,
                    "user": username,
                    "projectId": state.workspace.project_id(),
                    "name": state.workspace.name(),
                    "fileCount": state.workspace.files().len(),
                    "dirty": state.workspace.is_dirty(),
                    "autosave": state.session.autosave,
                    "autoRender": state.session.auto_render,
                }))?;
            } else {
                println!(
                    "Server:      {} ({})",
                    server,
                    if online { "online" } else { "offline" }
                );
                println!(
                    "User:        {}",
                    username.as_deref().unwrap_or("not logged in")
                );
                println!(
                    "Project:     {} ({})",
                    state.workspace.project_id(),
                    state.workspace.name()
                );
                println!(
                    "Files:       {}{}",
                    state.workspace.files().len(),
                    if state.workspace.is_dirty() {
                        " (unsaved changes)"
                    } else {
                        ""
                    }
                );
                println!("Autosave:    {}", on_off(state.session.autosave));
                println!("Auto render: {}", on_off(state.session.auto_render));
            }
        }
    }

    Ok(())
}

fn report_edit(json: bool, verb: &str, path: &str) -> Result<(), serde_json::Error> {
    if json {
        print_json(&json!({ "path": path }))
    } else {
        println!("{} {}", verb, path);
        Ok(())
    }
}
