use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use galleria::access::Permission;
use galleria::config::Config;
use galleria::db::{Database, Item, ItemType, ROOT_ID};
use galleria::graphics::ThumbnailGenerator;
use galleria::identity::{Session, ADMIN_USER_ID};
use galleria::import::import_directory;
use galleria::item::{
    clear_display_context, convert_filename_to_slug, convert_filename_to_title, find_by_path,
    find_by_relative_url, get_display_context, get_position, make_album_cover, move_item,
    purge_display_contexts, relative_path, remove_album_cover, resequence_child_weights,
    set_display_context, ContextSource, VarDir,
};
use galleria::logging;
use galleria::menu::{core_menu_items, Menu, UrlBuilder};
use galleria::message::Messages;
use galleria::RequestContext;

enum Command {
    Init,
    Import { dir: PathBuf, into: i64 },
    FindPath { path: String, kind: VarDir },
    FindUrl { url: String },
    Position { id: i64 },
    Context { id: i64, only: Option<ItemType> },
    ForgetContexts,
    Cover { id: i64 },
    Uncover { id: i64 },
    Move { id: i64, target: i64 },
    Resequence { id: i64 },
    Menu { id: i64 },
    Title { name: String },
    Slug { name: String },
}

struct Cli {
    config_path: Option<PathBuf>,
    user: Option<String>,
    command: Command,
}

fn parse_id(value: Option<&String>, what: &str) -> Result<i64> {
    let value = value.with_context(|| format!("missing {}", what))?;
    value
        .parse()
        .with_context(|| format!("{} must be a number, got {:?}", what, value))
}

fn parse_args() -> Result<Cli> {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut user = None;
    let mut positional: Vec<String> = Vec::new();
    let mut into = None;
    let mut kind = VarDir::default();
    let mut only = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("galleria {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                i += 1;
                let path = args.get(i).context("--config requires a path argument")?;
                config_path = Some(PathBuf::from(path));
            }
            "--user" | "-u" => {
                i += 1;
                user = Some(args.get(i).context("--user requires a name")?.clone());
            }
            "--into" => {
                i += 1;
                into = Some(parse_id(args.get(i), "--into")?);
            }
            "--kind" => {
                i += 1;
                kind = args.get(i).context("--kind requires a value")?.parse()?;
            }
            "--only" => {
                i += 1;
                only = Some(args.get(i).context("--only requires a type")?.parse()?);
            }
            other if other.starts_with('-') => bail!("unknown argument: {}", other),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let Some((name, rest)) = positional.split_first() else {
        print_help();
        std::process::exit(1);
    };
    let arg = |n: usize, what: &str| -> Result<String> {
        rest.get(n).cloned().with_context(|| format!("missing {}", what))
    };

    let command = match name.as_str() {
        "init" => Command::Init,
        "import" => Command::Import {
            dir: PathBuf::from(arg(0, "DIR")?),
            into: into.unwrap_or(ROOT_ID),
        },
        "find-path" => Command::FindPath {
            path: arg(0, "PATH")?,
            kind,
        },
        "find-url" => Command::FindUrl { url: arg(0, "URL")? },
        "position" => Command::Position { id: parse_id(rest.first(), "ID")? },
        "context" => Command::Context {
            id: parse_id(rest.first(), "ID")?,
            only,
        },
        "forget-contexts" => Command::ForgetContexts,
        "cover" => Command::Cover { id: parse_id(rest.first(), "ID")? },
        "uncover" => Command::Uncover { id: parse_id(rest.first(), "ID")? },
        "move" => Command::Move {
            id: parse_id(rest.first(), "ID")?,
            target: parse_id(rest.get(1), "TARGET")?,
        },
        "resequence" => Command::Resequence { id: parse_id(rest.first(), "ID")? },
        "menu" => Command::Menu {
            id: match rest.first() {
                Some(_) => parse_id(rest.first(), "ID")?,
                None => ROOT_ID,
            },
        },
        "title" => Command::Title { name: arg(0, "NAME")? },
        "slug" => Command::Slug { name: arg(0, "NAME")? },
        other => bail!("unknown command: {}", other),
    };

    Ok(Cli {
        config_path,
        user,
        command,
    })
}

fn print_help() {
    println!(
        r#"galleria - photo gallery maintenance

USAGE:
    galleria [OPTIONS] <COMMAND>

COMMANDS:
    init                        Create the database and var directories
    import DIR [--into ID]      Import a directory tree into an album (default: root)
    find-path PATH [--kind K]   Resolve a var path; K is albums, thumbs or resizes
    find-url URL                Resolve a relative url
    position ID                 Position of an item within its album
    context ID [--only TYPE]    Neighbours of an item, optionally among one type only
    forget-contexts             Drop every stored display context
    cover ID                    Make an item its album's cover
    uncover ID                  Remove an album's cover
    move ID TARGET              Move an item into another album
    resequence ID               Renumber an album's child weights
    menu [ID]                   Print the menu for an item as JSON
    title NAME                  Title derived from a filename
    slug NAME                   Slug derived from a filename

OPTIONS:
    --config, -c PATH   Path to config file
    --user, -u NAME     Act as this user (default: admin)
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    GALLERIA_CONFIG     Path to config file (overrides default location)
    GALLERIA_LOG        Log filter (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/galleria/config.toml"#
    );
}

fn describe(db: &Database, item: &Item) -> Result<String> {
    Ok(format!(
        "{}\t{}\t/{}\t{}",
        item.id,
        item.item_type,
        relative_path(db, item)?,
        item.title
    ))
}

/// Lookups leave permission checks to the caller.
fn print_if_viewable(ctx: &RequestContext, found: Option<Item>, query: &str) -> Result<()> {
    match found {
        Some(item) if ctx.access.can(Permission::View, &item)? => {
            println!("{}", describe(ctx.db, &item)?);
            Ok(())
        }
        _ => bail!("nothing found at {:?}", query),
    }
}

fn run(ctx: &RequestContext, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            for dir in [config.albums_dir(), config.thumbs_dir(), config.resizes_dir()] {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            println!("Initialized {}", config.db_path.display());
        }
        Command::Import { dir, into } => {
            let parent = ctx.db.load_item(into)?;
            let summary = import_directory(ctx, &parent, &dir, &config.import, &config.albums_dir())?;
            println!(
                "Imported {} albums, {} photos, {} movies ({} skipped)",
                summary.albums, summary.photos, summary.movies, summary.skipped
            );
        }
        Command::FindPath { path, kind } => {
            let found = find_by_path(ctx.db, &path, kind)?;
            print_if_viewable(ctx, found, &path)?;
        }
        Command::FindUrl { url } => {
            let found = find_by_relative_url(ctx.db, url.trim_matches('/'))?;
            print_if_viewable(ctx, found, &url)?;
        }
        Command::Position { id } => {
            let item = ctx.db.load_item(id)?;
            ctx.access.required(Permission::View, &item)?;
            println!("{}", get_position(ctx, &item, &[])?);
        }
        Command::Context { id, only } => {
            let item = ctx.db.load_item(id)?;
            ctx.access.required(Permission::View, &item)?;
            match only {
                Some(item_type) => set_display_context(
                    ctx,
                    &ContextSource::AlbumOfType { item_type },
                    config.display_context.ttl_secs,
                )?,
                None => clear_display_context(ctx)?,
            }
            let context = get_display_context(ctx, &item)?;
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        Command::ForgetContexts => {
            println!("Removed {} display contexts", purge_display_contexts(ctx.db)?);
        }
        Command::Cover { id } => {
            make_album_cover(ctx, &ctx.db.load_item(id)?)?;
        }
        Command::Uncover { id } => {
            remove_album_cover(ctx, &ctx.db.load_item(id)?)?;
        }
        Command::Move { id, target } => {
            let moved = move_item(ctx, &ctx.db.load_item(id)?, &ctx.db.load_item(target)?)?;
            println!("{}", describe(ctx.db, &moved)?);
        }
        Command::Resequence { id } => {
            resequence_child_weights(ctx, &ctx.db.load_item(id)?)?;
        }
        Command::Menu { id } => {
            let item = ctx.db.load_item(id)?;
            ctx.access.required(Permission::View, &item)?;
            let mut menu = Menu::new("main");
            core_menu_items(&mut menu, &item, ctx.session, &UrlBuilder::new(config.base_url.as_str()));
            println!("{}", serde_json::to_string_pretty(&menu)?);
        }
        Command::Title { name } => println!("{}", convert_filename_to_title(&name)),
        Command::Slug { name } => println!("{}", convert_filename_to_slug(&name)),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = parse_args()?;

    let config = match &cli.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Logging is best effort; the commands work without it.
    let _ = logging::init(Some(config.log_dir()));

    let db = Database::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    db.initialize()?;
    db.cache_purge_expired()?;

    let user = match &cli.user {
        Some(name) => db
            .get_user_by_name(name)?
            .with_context(|| format!("no such user: {}", name))?,
        None => db
            .get_user(ADMIN_USER_ID)?
            .context("admin user missing")?,
    };
    info!(user = %user.name, "Running command");

    let session = Session::new(format!("cli-{}", std::process::id()), user);
    let graphics = ThumbnailGenerator::new(&config);
    let messages = Messages::new();
    let ctx = RequestContext::new(&db, &session, &graphics, &messages);

    let result = run(&ctx, &config, cli.command);
    for message in messages.take() {
        eprintln!("{:?}: {}", message.severity, message.text);
    }
    result
}
