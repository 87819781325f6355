// ABOUTME: App orchestrator — wires config, provider, and store, then drives the REPL.
// ABOUTME: Slash commands manage sessions; any other input line is sent to the mentor.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::agent::create_provider;
use crate::config::Config;
use crate::session::{MoodFilter, SessionStore, Storage, TurnOutcome};
use crate::types::{Attachment, Mood};

/// A parsed line of REPL input.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Send(String),
    New,
    List(Option<String>),
    Open(usize),
    Delete(usize),
    Clear,
    Mood(String),
    Attach(String),
    Theme,
    Status,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line. Lines starting with `/` are commands; everything
/// else is chat content sent verbatim.
fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(tail) = trimmed.strip_prefix('/') else {
        return Command::Send(trimmed.to_string());
    };
    let (name, arg) = match tail.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (tail, ""),
    };
    match name {
        "new" => Command::New,
        "list" | "search" => Command::List((!arg.is_empty()).then(|| arg.to_string())),
        "open" => match arg.parse() {
            Ok(n) => Command::Open(n),
            Err(_) => Command::Unknown(trimmed.to_string()),
        },
        "delete" => match arg.parse() {
            Ok(n) => Command::Delete(n),
            Err(_) => Command::Unknown(trimmed.to_string()),
        },
        "clear" => Command::Clear,
        "mood" => Command::Mood(arg.to_string()),
        "attach" => Command::Attach(arg.to_string()),
        "theme" => Command::Theme,
        "status" => Command::Status,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Guess a mime type from the file extension of an attachment path.
fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Read an image file into a base64 attachment.
fn load_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let mime_type = mime_for_path(path)
        .ok_or_else(|| anyhow::anyhow!("unsupported image type: {}", path.display()))?;
    let bytes = std::fs::read(path)?;
    Ok(Attachment {
        data: BASE64.encode(bytes),
        mime_type: mime_type.to_string(),
    })
}

/// Top-level application that wires the subsystems and drives the REPL.
pub struct App {
    config: Config,
    fresh: bool,
    data_dir: Option<PathBuf>,
}

impl App {
    pub fn new(config: Config, fresh: bool, data_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            fresh,
            data_dir,
        }
    }

    /// Run the application: hydrate state, then loop over input lines until
    /// the user quits.
    pub async fn run(self) -> anyhow::Result<()> {
        // Load local .env if present, for GEMINI_API_KEY.
        let _ = dotenvy::dotenv();

        let provider = create_provider(&self.config)?;
        let root = self.data_dir.clone().unwrap_or_else(Storage::default_root);
        let mut store = SessionStore::hydrate(Storage::new(root), self.fresh);

        println!("AI-ADIB — adabiy mentor");
        println!(
            "{} suhbat, {} yulduz. /help — buyruqlar ro'yxati.",
            store.state().sessions.len(),
            store.stars()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut staged_attachment: Option<Attachment> = None;

        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Command::Quit => break,
                Command::Help => print_help(),
                Command::New => {
                    store.start_new_session();
                    println!("Yangi suhbat boshlandi.");
                }
                Command::List(term) => {
                    let term = term.unwrap_or_default();
                    let sessions = store.filter_sessions(&term, MoodFilter::All);
                    if sessions.is_empty() {
                        println!("Natija topilmadi.");
                    }
                    let active = store.state().active_session_id.clone();
                    for (i, session) in sessions.iter().enumerate() {
                        let marker = if active.as_deref() == Some(session.id.as_str()) {
                            "*"
                        } else {
                            " "
                        };
                        let mood = session
                            .mood
                            .map(|m| format!(" [{}]", m.label()))
                            .unwrap_or_default();
                        println!(
                            "{} {:>2}. {}{} ({})",
                            marker,
                            i + 1,
                            session.title,
                            mood,
                            session.updated_at.format("%Y-%m-%d")
                        );
                    }
                }
                Command::Open(n) => {
                    let id = store
                        .state()
                        .sessions
                        .get(n.wrapping_sub(1))
                        .map(|s| s.id.clone());
                    match id {
                        Some(id) => {
                            store.select_session(&id);
                            print_session(&store);
                        }
                        None => println!("Bunday suhbat yo'q: {}", n),
                    }
                }
                Command::Delete(n) => {
                    let id = store
                        .state()
                        .sessions
                        .get(n.wrapping_sub(1))
                        .map(|s| s.id.clone());
                    match id {
                        Some(id) => {
                            store.delete_session(&id);
                            println!("Suhbat o'chirildi.");
                        }
                        None => println!("Bunday suhbat yo'q: {}", n),
                    }
                }
                Command::Clear => {
                    if store.state().sessions.is_empty() {
                        continue;
                    }
                    println!(
                        "Barcha suhbatlar tarixini butunlay o'chirib tashlamoqchimisiz? [y/N]"
                    );
                    if confirm(&mut lines).await? {
                        store.clear_all_sessions();
                        println!("Tarix tozalandi.");
                    }
                }
                Command::Mood(label) => match Mood::from_label(&label) {
                    Some(mood) => {
                        let content = format!(
                            "Hozir menda {} holati. Ushbu kayfiyatga mos keladigan qanday \
                             adabiy durdona yoki maslahat bera olasiz?",
                            mood.label().to_lowercase()
                        );
                        let outcome = store
                            .send_message(
                                provider.as_ref(),
                                &content,
                                staged_attachment.take(),
                                Some(mood),
                                self.config.location,
                            )
                            .await;
                        print_outcome(&store, outcome);
                    }
                    None => {
                        let labels: Vec<&str> = Mood::ALL.iter().map(|m| m.label()).collect();
                        println!("Kayfiyatni tanlang: {}", labels.join(", "));
                    }
                },
                Command::Attach(path) => {
                    if path.is_empty() {
                        println!("Foydalanish: /attach <rasm-fayli>");
                        continue;
                    }
                    match load_attachment(Path::new(&path)) {
                        Ok(attachment) => {
                            println!("Rasm keyingi xabarga qo'shiladi ({}).", attachment.mime_type);
                            staged_attachment = Some(attachment);
                        }
                        Err(e) => println!("Rasmni o'qib bo'lmadi: {}", e),
                    }
                }
                Command::Theme => {
                    let theme = store.toggle_theme();
                    println!("Mavzu: {}", theme.tag());
                }
                Command::Status => {
                    println!("Yulduzlar: {}", store.stars());
                    if let Some(wisdom) = &store.state().wisdom_of_the_day {
                        println!("Hikmat: {}", wisdom);
                    }
                    if let Some(task) = &store.state().current_task {
                        println!("Topshiriq: {}", task);
                    }
                    if let Some(session) = store.active_session() {
                        println!("Faol suhbat: {}", session.title);
                    }
                }
                Command::Send(content) => {
                    if content.is_empty() && staged_attachment.is_none() {
                        continue;
                    }
                    let outcome = store
                        .send_message(
                            provider.as_ref(),
                            &content,
                            staged_attachment.take(),
                            None,
                            self.config.location,
                        )
                        .await;
                    print_outcome(&store, outcome);
                }
                Command::Unknown(input) => {
                    println!("Noma'lum buyruq: {} (/help yordam beradi)", input);
                }
            }
        }

        println!("Xayr! Yulduzlaringiz: {}", store.stars());
        Ok(())
    }
}

/// Read one more line and interpret it as a yes/no answer.
async fn confirm(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<bool> {
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "ha"
    ))
}

fn print_help() {
    println!("/new              yangi suhbat");
    println!("/list [so'z]      suhbatlar ro'yxati yoki qidiruv");
    println!("/open <n>         suhbatni ochish");
    println!("/delete <n>       suhbatni o'chirish");
    println!("/clear            barcha tarixni tozalash");
    println!("/mood <kayfiyat>  kayfiyat bo'yicha boshlash");
    println!("/attach <fayl>    keyingi xabarga rasm qo'shish");
    println!("/theme            mavzuni almashtirish");
    println!("/status           yulduzlar, hikmat, topshiriq");
    println!("/quit             chiqish");
}

/// Replay the active session to stdout.
fn print_session(store: &SessionStore) {
    let Some(session) = store.active_session() else {
        return;
    };
    println!("— {} —", session.title);
    for message in &session.messages {
        let speaker = match message.role {
            crate::types::Role::User => "Siz",
            crate::types::Role::Assistant => "Adib",
        };
        println!("{}: {}", speaker, message.content);
    }
}

/// Print one completed round-trip: star banner, reply text, image note, sources.
fn print_outcome(store: &SessionStore, outcome: Option<TurnOutcome>) {
    let Some(outcome) = outcome else {
        return;
    };
    if outcome.star_earned {
        println!("*** YULDUZ+1! Jami: {} ***", store.stars());
    }
    println!("Adib: {}", outcome.assistant.content);
    if let Some(image_url) = &outcome.assistant.image_url {
        println!("[tasvir: {} belgi]", image_url.len());
    }
    if let Some(sources) = &outcome.assistant.grounding_sources {
        for source in sources {
            println!("  manba: {} — {}", source.title, source.uri);
        }
    }
}
