//! CLI command implementations

use anyhow::{Result, anyhow, bail};
use colored::Colorize;
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use ticklist_core::id::{ITEM_PREFIX, LIST_PREFIX, qualify};
use ticklist_core::{
    Committed, Config, FileBackend, Identity, ItemFilter, Session, SettingsPatch, TodoItem,
    TodoList, View,
};

/// Resolved configuration for one invocation
pub struct Context {
    config: Config,
    config_path: PathBuf,
    data_dir: PathBuf,
    json: bool,
}

impl Context {
    pub fn load(config_path: Option<PathBuf>, data_dir: Option<PathBuf>, json: bool) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => Config::default_path()?,
        };
        let config = Config::load(&config_path)?;
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config.resolved_data_dir()?,
        };
        if !config.display.colors {
            colored::control::set_override(false);
        }
        Ok(Self {
            config,
            config_path,
            data_dir,
            json,
        })
    }

    fn open(&self) -> Result<Session<FileBackend>> {
        let backend = FileBackend::open(&self.data_dir)?;
        let session = Session::open(backend, self.config.default_list_name.clone());
        if let Some(e) = session.repair_error() {
            eprintln!(
                "{} Repaired duplicate default lists but could not save the fix: {}",
                "!".yellow(),
                e
            );
        }
        Ok(session)
    }

    fn format_date(&self, date: &chrono::DateTime<chrono::Utc>) -> String {
        date.with_timezone(&chrono::Local)
            .format(&self.config.display.date_format)
            .to_string()
    }
}

/// Unwrap a committed change, warning when it did not reach disk
fn saved<T>(committed: Committed<T>) -> T {
    if let Some(e) = committed.persist_error() {
        eprintln!(
            "{} Change applied but not saved, it may be lost: {}",
            "!".yellow(),
            e
        );
    }
    committed.into_value()
}

/// Accept a list ID, its hash part, or the name of a visible list
fn resolve_list(session: &Session<FileBackend>, raw: &str) -> String {
    session
        .lists()
        .into_iter()
        .find(|l| l.name == raw)
        .map(|l| l.list_id.clone())
        .unwrap_or_else(|| qualify(LIST_PREFIX, raw))
}

fn item_id(raw: &str) -> String {
    qualify(ITEM_PREFIX, raw)
}

fn list_name<'a>(session: &'a Session<FileBackend>, list_id: &str) -> &'a str {
    session
        .store()
        .get_list(list_id)
        .map(|l| l.name.as_str())
        .unwrap_or("?")
}

fn print_item(session: &Session<FileBackend>, item: &TodoItem) {
    let check = if item.is_completed {
        "✓".green()
    } else {
        "·".dimmed()
    };
    let star = if item.is_favorited {
        "★".yellow()
    } else {
        " ".normal()
    };
    let content = if item.is_completed {
        item.content.dimmed()
    } else {
        item.content.normal()
    };
    println!(
        "{} {} {} {} {}",
        check,
        star,
        item.item_id.cyan(),
        content,
        format!("({})", list_name(session, &item.list_id)).blue()
    );
}

pub fn login(ctx: &Context) -> Result<()> {
    let mut session = ctx.open()?;
    let identity = Identity::from(&ctx.config.identity);
    saved(session.login(identity.clone()));

    if ctx.json {
        println!("{}", serde_json::to_string(&identity)?);
    } else {
        println!(
            "{} Signed in as {}",
            "✓".green(),
            identity.display_name.bold()
        );
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    let mut session = ctx.open()?;
    saved(session.logout());
    println!("{} Signed out, local data cleared", "✓".green());
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let user = session.user().ok_or_else(|| anyhow!("Not signed in"))?;

    if ctx.json {
        println!("{}", serde_json::to_string(user)?);
    } else {
        println!("{} <{}>", user.display_name.bold(), user.email);
        println!("  ID: {}", user.user_id);
        if user.is_admin {
            println!("  {}", "admin".red());
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Open")]
    open: usize,
    #[tabled(rename = "Done")]
    done: usize,
    #[tabled(rename = "Created")]
    created: String,
}

pub fn lists(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let show_default = session.settings().show_default_list;
    let lists: Vec<&TodoList> = session
        .lists()
        .into_iter()
        .filter(|l| show_default || l.name != session.default_list_name())
        .collect();

    if ctx.json {
        println!("{}", serde_json::to_string(&lists)?);
        return Ok(());
    }
    if lists.is_empty() {
        println!("No lists");
        return Ok(());
    }

    let rows: Vec<ListRow> = lists
        .iter()
        .map(|l| {
            let items = session.items_in_list(&l.list_id);
            let done = items.iter().filter(|i| i.is_completed).count();
            ListRow {
                id: l.list_id.clone(),
                name: l.name.clone(),
                open: items.len() - done,
                done,
                created: ctx.format_date(&l.created_at),
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}

pub fn list_add(ctx: &Context, name: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let list = saved(session.add_list(name)?);

    if ctx.json {
        println!("{}", serde_json::to_string(&list)?);
    } else {
        println!("{} Created list: {}", "✓".green(), list.list_id);
        println!("  Name: {}", list.name);
    }
    Ok(())
}

pub fn list_rename(ctx: &Context, list: &str, name: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let list_id = resolve_list(&session, list);
    saved(session.update_list(&list_id, name)?);
    println!("{} Renamed {} to {}", "✓".green(), list_id, name.trim());
    Ok(())
}

pub fn list_rm(ctx: &Context, list: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let list_id = resolve_list(&session, list);
    let cascaded = saved(session.delete_list(&list_id)?);
    println!(
        "{} Moved {} and {} item(s) to the trash",
        "✓".green(),
        list_id,
        cascaded
    );
    Ok(())
}

pub fn list_restore(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let list_id = qualify(LIST_PREFIX, id);
    if !saved(session.restore_list(&list_id)?) {
        bail!(
            "A '{}' list already exists; rename or purge one of them first",
            list_name(&session, &list_id)
        );
    }
    println!("{} Restored {}", "✓".green(), list_id);
    println!("  Its items stay in the trash; restore them with 'tick restore'");
    Ok(())
}

pub fn list_purge(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let list_id = qualify(LIST_PREFIX, id);
    let removed = saved(session.permanently_delete_list(&list_id)?);
    println!(
        "{} Deleted {} and {} item(s) for good",
        "✓".green(),
        list_id,
        removed
    );
    Ok(())
}

pub fn items(ctx: &Context, list: Option<String>, favorites: bool, all: bool) -> Result<()> {
    let session = ctx.open()?;
    let mut items: Vec<&TodoItem> = match list {
        Some(ref raw) => session.items_in_list(&resolve_list(&session, raw)),
        None => session.items(),
    };

    if favorites {
        items.retain(|i| i.is_favorited);
    }
    if !all {
        items.retain(|i| !i.is_completed);
    }

    // Favorites first, then newest first
    items.sort_by(|a, b| {
        b.is_favorited
            .cmp(&a.is_favorited)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    if ctx.json {
        println!("{}", serde_json::to_string(&items)?);
    } else if items.is_empty() {
        println!("No items found");
    } else {
        for item in items {
            print_item(&session, item);
        }
    }
    Ok(())
}

pub fn add(ctx: &Context, list: &str, content: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let list_id = resolve_list(&session, list);
    let item = saved(session.add_item(&list_id, content)?);

    if ctx.json {
        println!("{}", serde_json::to_string(&item)?);
    } else {
        println!("{} Added {}", "✓".green(), item.item_id);
    }
    Ok(())
}

pub fn fav(ctx: &Context, content: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let item = saved(session.add_favorite_item(content)?);

    if ctx.json {
        println!("{}", serde_json::to_string(&item)?);
    } else {
        println!(
            "{} Added {} to {}",
            "★".yellow(),
            item.item_id,
            list_name(&session, &item.list_id)
        );
    }
    Ok(())
}

pub fn edit(ctx: &Context, id: &str, content: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    saved(session.update_item(&id, content)?);
    println!("{} Updated {}", "✓".green(), id);
    Ok(())
}

pub fn done(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    let completed = saved(session.toggle_item_completion(&id)?);

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({ "itemId": id, "isCompleted": completed })
        );
    } else if completed {
        println!("{} Completed {}", "✓".green(), id);
    } else {
        println!("{} Reopened {}", "·".normal(), id);
    }
    Ok(())
}

pub fn star(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    let favorited = saved(session.toggle_item_favorite(&id)?);

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({ "itemId": id, "isFavorited": favorited })
        );
    } else if favorited {
        println!("{} Starred {}", "★".yellow(), id);
    } else {
        println!("{} Unstarred {}", "☆".normal(), id);
    }
    Ok(())
}

pub fn mv(ctx: &Context, id: &str, list: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    let target = resolve_list(&session, list);
    if !session.lists().iter().any(|l| l.list_id == target) {
        bail!("List not found: {}", list);
    }
    saved(session.move_item(&id, &target)?);
    println!(
        "{} Moved {} to {}",
        "✓".green(),
        id,
        list_name(&session, &target)
    );
    Ok(())
}

pub fn rm(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    saved(session.delete_item(&id)?);
    println!("{} Moved {} to the trash", "✓".green(), id);
    Ok(())
}

pub fn restore(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    if !saved(session.restore_item(&id)) {
        bail!(
            "Cannot restore {}: it is unknown, or its list is missing or in the trash",
            id
        );
    }
    println!("{} Restored {}", "✓".green(), id);
    Ok(())
}

pub fn purge(ctx: &Context, id: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let id = item_id(id);
    saved(session.permanently_delete_item(&id)?);
    println!("{} Deleted {} for good", "✓".green(), id);
    Ok(())
}

pub fn clear(ctx: &Context, list: Option<String>, favorites: bool, all: bool) -> Result<()> {
    let mut session = ctx.open()?;
    let filter = match (list, favorites, all) {
        (Some(raw), _, _) => ItemFilter::InList(resolve_list(&session, &raw)),
        (None, true, _) => ItemFilter::Favorites,
        (None, false, true) => ItemFilter::All,
        (None, false, false) => bail!("Pick one of --list, --favorites or --all"),
    };
    let changed = saved(session.clear_items(&filter));

    if ctx.json {
        println!("{}", serde_json::json!({ "trashed": changed }));
    } else {
        println!("{} Moved {} item(s) to the trash", "✓".green(), changed);
    }
    Ok(())
}

#[derive(Tabled)]
struct TrashRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "List")]
    list: String,
    #[tabled(rename = "Restorable")]
    restorable: &'static str,
}

pub fn trash(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let trash = session.trash();

    if ctx.json {
        println!("{}", serde_json::to_string(&trash)?);
        return Ok(());
    }
    if trash.is_empty() {
        println!("Trash is empty");
        return Ok(());
    }

    let mut rows: Vec<TrashRow> = trash
        .lists
        .iter()
        .map(|l| TrashRow {
            kind: "list",
            id: l.list_id.clone(),
            text: l.name.clone(),
            list: String::new(),
            restorable: "yes",
        })
        .collect();
    rows.extend(trash.items.iter().map(|i| TrashRow {
        kind: "item",
        id: i.item_id.clone(),
        text: i.content.clone(),
        list: list_name(&session, &i.list_id).to_string(),
        restorable: if session.store().is_restore_blocked(i) {
            "after list"
        } else {
            "yes"
        },
    }));
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}

pub fn settings_show(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let settings = session.settings();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(settings)?);
    } else {
        println!("{}", "Settings:".bold());
        println!("show_items_in_dashboard = {}", settings.show_items_in_dashboard);
        println!("always_show_item_actions = {}", settings.always_show_item_actions);
        println!("show_default_list = {}", settings.show_default_list);
    }
    Ok(())
}

pub fn settings_set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let flag: bool = value
        .parse()
        .map_err(|_| anyhow!("Invalid boolean value: {}", value))?;
    let patch = match key {
        "show_items_in_dashboard" => SettingsPatch {
            show_items_in_dashboard: Some(flag),
            ..Default::default()
        },
        "always_show_item_actions" => SettingsPatch {
            always_show_item_actions: Some(flag),
            ..Default::default()
        },
        "show_default_list" => SettingsPatch {
            show_default_list: Some(flag),
            ..Default::default()
        },
        _ => bail!("Unknown setting: {}", key),
    };

    let mut session = ctx.open()?;
    saved(session.update_settings(patch));
    println!("{} Set {} = {}", "✓".green(), key, flag);
    Ok(())
}

pub fn view(ctx: &Context, view: Option<String>, list: Option<String>) -> Result<()> {
    let mut session = ctx.open()?;

    if let Some(raw) = view {
        let view: View = raw.parse()?;
        let focused = list.map(|raw| resolve_list(&session, &raw));
        if view == View::Focus && focused.is_none() {
            bail!("The focus view needs a list");
        }
        saved(session.set_view(view, focused));
    }

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "view": session.view(),
                "focusedListId": session.focused_list_id(),
            })
        );
        return Ok(());
    }

    println!("View: {}", session.view().to_string().bold());
    if let Some(list_id) = session.focused_list_id() {
        println!("List: {} ({})", list_name(&session, list_id), list_id);
        for item in session.items_in_list(list_id) {
            print_item(&session, item);
        }
    }
    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    let mut session = ctx.open()?;
    let available = session.storage_available();
    let stats = session.stats();

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "dataDir": ctx.data_dir,
                "storageAvailable": available,
                "stats": stats,
            })
        );
        return Ok(());
    }

    println!("Data:      {}", ctx.data_dir.display());
    if available {
        println!("Storage:   {}", "ok".green());
    } else {
        println!(
            "Storage:   {} (changes will not be saved)",
            "unavailable".red()
        );
    }
    match session.user() {
        Some(user) => println!("User:      {}", user.display_name),
        None => println!("User:      {}", "not signed in".dimmed()),
    }
    println!();
    println!("Lists:     {}", stats.lists);
    println!(
        "Items:     {} ({} done, {} favorites)",
        stats.items, stats.completed, stats.favorites
    );
    println!(
        "Trash:     {} list(s), {} item(s)",
        stats.trashed_lists, stats.trashed_items
    );
    Ok(())
}

pub fn config_show(ctx: &Context) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        return Ok(());
    }

    let config = &ctx.config;
    println!("{}", "Current configuration:".bold());
    println!();
    println!("data_dir = \"{}\"", ctx.data_dir.display());
    println!("default_list_name = \"{}\"", config.default_list_name);
    println!();
    println!("[identity]");
    println!("user_id = \"{}\"", config.identity.user_id);
    println!("email = \"{}\"", config.identity.email);
    println!("display_name = \"{}\"", config.identity.display_name);
    println!("is_admin = {}", config.identity.is_admin);
    println!();
    println!("[display]");
    println!("colors = {}", config.display.colors);
    println!("date_format = \"{}\"", config.display.date_format);
    Ok(())
}

pub fn config_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_path.display());
    Ok(())
}

pub fn config_reset(ctx: &Context) -> Result<()> {
    if let Some(parent) = ctx.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&ctx.config_path, Config::default_with_comments())?;
    println!("{} Configuration reset to defaults", "✓".green());
    Ok(())
}
