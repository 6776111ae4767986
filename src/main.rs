// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `connexa`: command-line front end for Connexa study groups.
//!
//! ```text
//! connexa login ana@edu.univali.br --password Abcd1234
//! connexa groups search --subject "Cálculo I" --location online
//! connexa messages follow 12
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use connexa_client::{
    config::{Config, NOTIFICATIONS_PER_PAGE},
    error::Outcome,
    models::{
        GroupFilters, GroupLocation, Message, NewGroup, Notification, NotificationFilters,
        NotificationKind, ProfileUpdate, RegisterRequest, StudyGroup, UserProfile,
    },
    poller::Poller,
    session::FileStorage,
    time_utils, validation, Connexa,
};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "connexa", version, about = "Find and run university study groups")]
struct Cli {
    /// Base URL of the Connexa API.
    #[arg(long, global = true, env = "CONNEXA_API_URL")]
    api_url: Option<String>,

    /// Print results as `{success, data | error}` JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with an institutional email.
    Login {
        email: String,
        #[arg(long, env = "CONNEXA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Send a password recovery email.
    ResetPassword { email: String },
    /// Set a new password with the token from the recovery email.
    ConfirmReset {
        token: String,
        #[arg(long, hide_env_values = true, env = "CONNEXA_NEW_PASSWORD")]
        new_password: String,
    },
    #[command(subcommand)]
    Groups(GroupsCommand),
    #[command(subcommand)]
    Messages(MessagesCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "CONNEXA_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to `--password`.
    #[arg(long)]
    confirm: Option<String>,
    /// Course name as listed in the catalogue, e.g. "Ciência da Computação".
    #[arg(long)]
    course: String,
    /// 1º through 10º.
    #[arg(long)]
    period: String,
    #[arg(long)]
    interests: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
}

#[derive(Subcommand, Debug)]
enum GroupsCommand {
    /// Search groups; unset filters are not sent.
    Search {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        location: Option<GroupLocation>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a group and its participants.
    Show { id: u64 },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        objective: String,
        #[arg(long, default_value = "presencial")]
        location: GroupLocation,
        #[arg(long)]
        limit: u32,
    },
    Join { id: u64 },
    Leave { id: u64 },
    Delete { id: u64 },
    /// Groups you belong to.
    Mine,
    Participants { id: u64 },
}

#[derive(Subcommand, Debug)]
enum MessagesCommand {
    List {
        group: u64,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Send { group: u64, content: String },
    Latest {
        group: u64,
        #[arg(long)]
        limit: Option<u32>,
    },
    Delete { group: u64, message: u64 },
    /// Print new messages as they arrive until interrupted.
    Follow { group: u64 },
}

#[derive(Subcommand, Debug)]
enum NotificationsCommand {
    List {
        /// Only unread notifications.
        #[arg(long, conflicts_with = "read")]
        unread: bool,
        /// Only read notifications.
        #[arg(long)]
        read: bool,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long, default_value_t = NOTIFICATIONS_PER_PAGE)]
        limit: u32,
    },
    /// Mark one notification read.
    Read { id: u64 },
    ReadAll,
    Delete { id: u64 },
    Clear,
    Stats,
    /// nova_mensagem, novo_membro or alteracao_grupo.
    ByType { kind: NotificationKind },
    /// Report the unread count on every refresh until interrupted.
    Watch,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        interests: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    Avatars,
    DeleteAccount {
        #[arg(long, env = "CONNEXA_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let json = cli.json;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                print_json(&Outcome::<()>::failed(format!("{:#}", e)));
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api_url = %config.api_url, "Configuration loaded");

    let storage = FileStorage::open(&config.session_dir)
        .with_context(|| format!("opening session store {}", config.session_dir.display()))?;
    let app = Connexa::new(config, Arc::new(storage))?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Login { email, password } => {
            let session = app.auth.login(&email, &password).await?;
            out.show(&session.user, |user| println!("Logged in as {}", describe_user(user)));
        }
        Command::Register(args) => {
            let request = register_request(args);
            validation::check(&request)?;
            let session = app.auth.register(&request).await?;
            out.show(&session.user, |user| println!("Welcome, {}", describe_user(user)));
        }
        Command::Logout => {
            app.auth.logout()?;
            out.done("Logged out");
        }
        Command::ResetPassword { email } => {
            let ack = app.auth.reset_password(&email).await?;
            out.ack(&ack, "Recovery email sent");
        }
        Command::ConfirmReset {
            token,
            new_password,
        } => {
            let ack = app.auth.confirm_reset_password(&token, &new_password).await?;
            out.ack(&ack, "Password changed");
        }
        Command::Whoami => {
            let session = app
                .auth
                .restore()
                .await?
                .ok_or(connexa_client::error::ClientError::NotAuthenticated)?;
            out.show(&session.user, |user| println!("{}", describe_user(user)));
        }
        Command::Groups(cmd) => {
            restore(&app).await?;
            groups(&app, &out, cmd).await?;
        }
        Command::Messages(cmd) => {
            restore(&app).await?;
            messages(&app, &out, cmd).await?;
        }
        Command::Notifications(cmd) => {
            restore(&app).await?;
            notifications(&app, &out, cmd).await?;
        }
        Command::Profile(cmd) => {
            restore(&app).await?;
            profile(&app, &out, cmd).await?;
        }
    }

    Ok(())
}

fn register_request(args: RegisterArgs) -> RegisterRequest {
    RegisterRequest {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        password_confirmation: args.confirm.unwrap_or_else(|| args.password.clone()),
        password: args.password,
        course: args.course,
        period: args.period,
        interests: args.interests,
        avatar: args.avatar,
    }
}

/// Start-up check of the stored session.
async fn restore(app: &Connexa) -> Result<()> {
    if app.auth.restore().await?.is_none() {
        anyhow::bail!("Not logged in; run `connexa login` first");
    }
    Ok(())
}

async fn groups(app: &Connexa, out: &Output, cmd: GroupsCommand) -> Result<()> {
    let store = app.groups_store();

    match cmd {
        GroupsCommand::Search {
            subject,
            location,
            text,
            page,
            limit,
        } => {
            let filters = GroupFilters {
                subject,
                location,
                text,
                page,
                per_page: limit,
            };
            let pagination = store.search(filters).await?;
            out.show(&store.groups(), |groups| {
                print_groups(groups);
                if pagination.total_pages > 1 {
                    println!("Page {} of {}", pagination.page, pagination.total_pages);
                }
            });
        }
        GroupsCommand::Show { id } => {
            let details = store.open(id).await?;
            out.show(&details, |details| {
                print_groups(std::slice::from_ref(&details.group));
                println!("  {}", details.group.objective);
                for p in &details.participants {
                    println!("  - {} ({:?})", p.name, p.role);
                }
            });
        }
        GroupsCommand::Create {
            name,
            subject,
            objective,
            location,
            limit,
        } => {
            let group = NewGroup::new(&name, &subject, &objective, location, limit);
            let created = store.create(&group).await?;
            out.show(&created, |group| println!("Created group #{} {}", group.id, group.name));
        }
        GroupsCommand::Join { id } => {
            store.join(id).await?;
            out.done("Joined group");
        }
        GroupsCommand::Leave { id } => {
            store.leave(id).await?;
            out.done("Left group");
        }
        GroupsCommand::Delete { id } => {
            store.delete(id).await?;
            out.done("Group deleted");
        }
        GroupsCommand::Mine => {
            store.load_my_groups().await?;
            out.show(&store.my_groups(), |groups| print_groups(groups));
        }
        GroupsCommand::Participants { id } => {
            let participants = app.groups.participants(id).await?;
            out.show(&participants, |participants| {
                for p in participants {
                    println!("{} ({:?})", p.name, p.role);
                }
            });
        }
    }
    Ok(())
}

async fn messages(app: &Connexa, out: &Output, cmd: MessagesCommand) -> Result<()> {
    match cmd {
        MessagesCommand::List { group, page, limit } => {
            let page = app.messages.list(group, page, limit).await?;
            out.show(&page.messages, |messages| print_messages(messages));
        }
        MessagesCommand::Send { group, content } => {
            let sent = app.messages.send(group, &content).await?.into_value();
            out.show(&sent, |message| print_messages(std::slice::from_ref(message)));
        }
        MessagesCommand::Latest { group, limit } => {
            let latest = app.messages.latest(group, limit).await?;
            out.show(&latest, |messages| print_messages(messages));
        }
        MessagesCommand::Delete { group, message } => {
            let ack = app.messages.delete(group, message).await?.into_value();
            out.ack(&ack, "Message deleted");
        }
        MessagesCommand::Follow { group } => {
            let chat = app.chat(group);
            chat.load().await?;
            print_messages(&chat.messages());

            let poller = Poller::spawn(app.config.chat_poll_interval, app.session.clone(), {
                let chat = chat.clone();
                move || {
                    let chat = chat.clone();
                    async move {
                        match chat.load().await {
                            Ok(0) => {}
                            Ok(fresh) => {
                                let messages = chat.messages();
                                let start = messages.len().saturating_sub(fresh);
                                print_messages(&messages[start..]);
                            }
                            Err(e) => tracing::warn!(error = %e, "Chat refresh failed"),
                        }
                    }
                }
            });

            tokio::signal::ctrl_c().await?;
            let runs = poller.stop().await;
            tracing::debug!(runs, "Stopped following chat");
        }
    }
    Ok(())
}

async fn notifications(app: &Connexa, out: &Output, cmd: NotificationsCommand) -> Result<()> {
    let store = app.notifications_store();

    match cmd {
        NotificationsCommand::List {
            unread,
            read,
            page,
            limit,
        } => {
            let filters = NotificationFilters {
                read: match (unread, read) {
                    (true, _) => Some(false),
                    (_, true) => Some(true),
                    _ => None,
                },
                page,
                per_page: Some(limit),
            };
            store.refresh(&filters).await?;
            let snapshot = store.snapshot();
            out.show(&snapshot.notifications, |list| {
                print_notifications(list);
                println!("{} unread", snapshot.unread_count);
            });
        }
        NotificationsCommand::Read { id } => {
            store.mark_read(id).await?;
            out.done("Marked as read");
        }
        NotificationsCommand::ReadAll => {
            store.mark_all_read().await?;
            out.done("All notifications marked as read");
        }
        NotificationsCommand::Delete { id } => {
            store.delete(id).await?;
            out.done("Notification deleted");
        }
        NotificationsCommand::Clear => {
            store.clear_all().await?;
            out.done("Notifications cleared");
        }
        NotificationsCommand::Stats => {
            let stats = app.notifications.statistics().await?;
            out.show(&stats, |stats| {
                println!("{} total, {} unread, {} read", stats.total, stats.unread, stats.read)
            });
        }
        NotificationsCommand::ByType { kind } => {
            store
                .show_kind(kind, &NotificationFilters::default())
                .await?;
            out.show(&store.snapshot().notifications, |list| print_notifications(list));
        }
        NotificationsCommand::Watch => {
            let last_seen = Arc::new(AtomicU64::new(u64::MAX));
            let poller = Poller::spawn(
                app.config.notifications_poll_interval,
                app.session.clone(),
                move || {
                    let store = store.clone();
                    let last_seen = last_seen.clone();
                    async move {
                        if let Err(e) = store.refresh(&NotificationFilters::default()).await {
                            tracing::warn!(error = %e, "Notification refresh failed");
                            return;
                        }
                        let unread = store.unread_count();
                        if last_seen.swap(unread, Ordering::Relaxed) != unread {
                            println!("{} unread", unread);
                        }
                    }
                },
            );

            tokio::signal::ctrl_c().await?;
            poller.stop().await;
        }
    }
    Ok(())
}

async fn profile(app: &Connexa, out: &Output, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Show => {
            let user = app.users.profile().await?;
            out.show(&user, |user| print_profile(user));
        }
        ProfileCommand::Update {
            name,
            course,
            period,
            interests,
            avatar,
        } => {
            let update = ProfileUpdate {
                name,
                course,
                period,
                interests,
                avatar,
            };
            validation::check(&update)?;
            let user = app.users.update_profile(&update).await?.into_value();
            out.show(&user, |user| print_profile(user));
        }
        ProfileCommand::Avatars => {
            let avatars = app.users.avatars().await?;
            out.show(&avatars, |avatars| {
                for avatar in avatars {
                    println!(
                        "{} {} {}",
                        avatar.id,
                        avatar.emoji.as_deref().unwrap_or(""),
                        avatar.name.as_deref().unwrap_or("")
                    );
                }
            });
        }
        ProfileCommand::DeleteAccount { password } => {
            let ack = app.users.delete_account(&password).await?;
            out.ack(&ack, "Account deleted");
        }
    }
    Ok(())
}

/// Chooses between human-readable and JSON output.
struct Output {
    json: bool,
}

impl Output {
    fn show<T: Serialize>(&self, value: &T, render: impl FnOnce(&T)) {
        if self.json {
            print_json(&Outcome::ok(value));
        } else {
            render(value);
        }
    }

    fn done(&self, text: &str) {
        self.show(&text, |text| println!("{}", text));
    }

    fn ack(&self, ack: &connexa_client::models::Ack, fallback: &str) {
        self.show(ack, |ack| {
            println!("{}", ack.message.as_deref().unwrap_or(fallback))
        });
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: failed to encode output: {}", e),
    }
}

fn describe_user(user: &UserProfile) -> String {
    format!("{} <{}>", user.name, user.email)
}

fn print_profile(user: &UserProfile) {
    println!("{}", describe_user(user));
    for (label, value) in [
        ("Course", &user.course),
        ("Period", &user.period),
        ("Interests", &user.interests),
        ("Avatar", &user.avatar),
    ] {
        if let Some(value) = value {
            println!("  {}: {}", label, value);
        }
    }
}

fn print_groups(groups: &[StudyGroup]) {
    if groups.is_empty() {
        println!("No groups found");
    }
    for group in groups {
        println!(
            "#{:<5} {} [{}] {} {}/{} ({})",
            group.id,
            group.name,
            group.subject,
            group.location.as_str(),
            group.participant_count,
            group.participant_limit,
            group.status().label()
        );
    }
}

fn print_messages(messages: &[Message]) {
    let now = Utc::now();
    for message in messages {
        let when = message
            .created_at
            .as_deref()
            .map(|raw| time_utils::format_short(raw, now))
            .unwrap_or_default();
        let author = message.author_name.as_deref().unwrap_or("?");
        println!("[{}] {}: {}", when, author, message.content);
    }
}

fn print_notifications(notifications: &[Notification]) {
    let now = Utc::now();
    for n in notifications {
        let marker = if n.read { ' ' } else { '*' };
        let when = n
            .created_at
            .as_deref()
            .map(|raw| time_utils::format_short(raw, now))
            .unwrap_or_default();
        println!("{} #{} {} {}: {}", marker, n.id, when, n.title, n.content);
    }
}

/// Initialize logging on stderr so command output stays clean.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("connexa_client=info,connexa=info,warn"));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
