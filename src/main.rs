use chrono::Utc;
use clap::Parser;
use quill::application::{
    AuthService, AutoSaver, ConfigService, NoteBoard, NotesService, RefreshOutcome, SaveStatus,
    SessionManager,
};
use quill::cli::{format_note, format_note_list, format_status, Cli, Commands};
use quill::domain::{Credentials, NewNote, NoteDraft, NotePatch, Registration};
use quill::error::QuillError;
use quill::infrastructure::config::resolve_home;
use quill::infrastructure::{Config, EditorSession, FileTokenStore};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            let label = if e.is_transient() { "Warning" } else { "Error" };
            eprintln!("{}: {}", label, e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "quill=debug" } else { "quill=warn" };
    let filter = EnvFilter::try_from_env("QUILL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<(), QuillError> {
    let Some(command) = cli.command else {
        println!("quill - Terminal client for the notes API");
        println!("Use --help for usage information");
        return Ok(());
    };

    let home = resolve_home()?;

    if let Commands::Config { key, value, list } = command {
        return run_config(ConfigService::new(home), key, value, list);
    }

    let config = Config::load_from_dir(&home)?.with_env_overrides()?;
    let store = FileTokenStore::in_dir(&home);
    let session = Arc::new(SessionManager::from_config(&config, Box::new(store))?);
    let notes = NotesService::new(session.clone());

    match command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password: ")?,
            };
            AuthService::new(session)
                .login(&Credentials::new(username, password))
                .await?;
            println!("Login successful.");
            Ok(())
        }
        Commands::Signup {
            username,
            email,
            password,
            password2,
        } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password: ")?,
            };
            let registration = Registration {
                username: username.clone(),
                email,
                password2: password2.unwrap_or_else(|| password.clone()),
                password,
            };
            AuthService::new(session).register(&registration).await?;
            println!(
                "Signup successful. Run 'quill login {}' to log in.",
                username
            );
            Ok(())
        }
        Commands::Logout => {
            session.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Status => {
            println!("{}", format_status(&session.session(), Utc::now()).trim_end());
            Ok(())
        }
        Commands::Refresh => match session.refresh_outcome().await {
            RefreshOutcome::Refreshed(_) => {
                println!("Access token refreshed");
                Ok(())
            }
            RefreshOutcome::LoggedOut => Err(QuillError::SessionExpired),
            RefreshOutcome::Unavailable => {
                eprintln!("Warning: could not refresh the session right now; it has been kept.");
                Ok(())
            }
        },
        Commands::List => {
            notes.ensure_session()?;
            let mut board = NoteBoard::new(notes);
            print!("{}", with_newline(format_note_list(board.reload().await?)));
            Ok(())
        }
        Commands::Show { id } => {
            notes.ensure_session()?;
            print!("{}", format_note(&notes.get(id).await?));
            Ok(())
        }
        Commands::New {
            title,
            markdown,
            pinned,
        } => {
            notes.ensure_session()?;
            let mut board = NoteBoard::new(notes);
            board.reload().await?;
            let created = board
                .create(&NewNote {
                    title,
                    markdown,
                    pinned,
                })
                .await?;
            println!("Created note {}", created.id);
            print!("{}", with_newline(format_note_list(board.notes())));
            Ok(())
        }
        Commands::Edit {
            id,
            title,
            markdown,
        } => {
            notes.ensure_session()?;
            let patch = NotePatch {
                title,
                markdown,
                pinned: None,
            };
            if patch.is_empty() {
                edit_in_editor(&notes, &config, &home, id).await
            } else {
                notes.update(id, &patch).await?;
                println!("{}", SaveStatus::Saved);
                Ok(())
            }
        }
        Commands::Write { id } => {
            notes.ensure_session()?;
            write_from_stdin(notes, &config, id).await
        }
        Commands::Pin { id } => set_pinned(notes, id, true).await,
        Commands::Unpin { id } => set_pinned(notes, id, false).await,
        Commands::Rm { id } => {
            notes.ensure_session()?;
            let mut board = NoteBoard::new(notes);
            board.remove(id).await?;
            println!("Deleted note {}", id);
            Ok(())
        }
        Commands::Config { .. } => unreachable!("handled before the session is loaded"),
    }
}

fn run_config(
    service: ConfigService,
    key: Option<String>,
    value: Option<String>,
    list: bool,
) -> Result<(), QuillError> {
    if list {
        let config = service.list()?;
        println!("api_url = {}", config.api_url);
        println!("timeout_secs = {}", config.timeout_secs);
        println!("autosave_delay_ms = {}", config.autosave_delay_ms);
        println!("persist_access_token = {}", config.persist_access_token);
        println!("editor = {}", config.editor);
        Ok(())
    } else if let Some(k) = key {
        if let Some(v) = value {
            service.set(&k, &v)?;
            println!("Set {} = {}", k, v);
        } else {
            println!("{}", service.get(&k)?);
        }
        Ok(())
    } else {
        println!("Usage: quill config [--list | <key> [<value>]]");
        println!(
            "Valid keys: {}",
            quill::application::manage_config::VALID_KEYS
        );
        Ok(())
    }
}

async fn set_pinned(notes: NotesService, id: i64, pinned: bool) -> Result<(), QuillError> {
    notes.ensure_session()?;
    let mut board = NoteBoard::new(notes);
    board.set_pinned(id, pinned).await?;
    print!("{}", with_newline(format_note_list(board.notes())));
    Ok(())
}

/// Open the note body in the editor and PATCH it back if it changed
async fn edit_in_editor(
    notes: &NotesService,
    config: &Config,
    home: &Path,
    id: i64,
) -> Result<(), QuillError> {
    let note = notes.get(id).await?;

    let drafts_dir = home.join("drafts");
    std::fs::create_dir_all(&drafts_dir)?;
    let draft_path = drafts_dir.join(format!("note-{}.md", id));
    std::fs::write(&draft_path, &note.markdown)?;

    let editor = EditorSession::new(config.get_editor());
    let path = draft_path.clone();
    let edited = tokio::task::spawn_blocking(move || editor.edit(&path))
        .await
        .map_err(|e| QuillError::Editor(format!("Editor task failed: {}", e)))
        .and_then(|outcome| outcome)
        .and_then(|()| std::fs::read_to_string(&draft_path).map_err(QuillError::from));
    std::fs::remove_file(&draft_path)?;
    let edited = edited?;

    if edited == note.markdown {
        println!("No changes");
        return Ok(());
    }

    let patch = NotePatch {
        markdown: Some(edited),
        ..Default::default()
    };
    notes.update(id, &patch).await?;
    println!("{}", SaveStatus::Saved);
    Ok(())
}

/// Append stdin lines to the note body with debounced autosave
async fn write_from_stdin(
    notes: NotesService,
    config: &Config,
    id: i64,
) -> Result<(), QuillError> {
    let note = notes.get(id).await?;
    let mut draft = NoteDraft::from(&note);

    let saver = AutoSaver::spawn(Arc::new(notes), id, config.autosave_delay());
    let mut status = saver.subscribe();
    let reporter = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            if current != SaveStatus::Idle {
                eprintln!("{}", current);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !draft.markdown.is_empty() && !draft.markdown.ends_with('\n') {
            draft.markdown.push('\n');
        }
        draft.markdown.push_str(&line);
        saver.update(draft.clone());
    }

    let final_status = saver.finish().await;
    let _ = reporter.await;

    if final_status == SaveStatus::Failed {
        return Err(QuillError::SaveFailed(id));
    }
    Ok(())
}

fn read_secret(prompt: &str) -> Result<String, QuillError> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
