//! cemboard - Cemetery records and print-shop ledger

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use cemboard_core::api::ImageFile;
use cemboard_core::config::AppConfig;
use cemboard_core::error::CoreError;
use cemboard_core::listing::{SortDir, SortKey};
use cemboard_core::views::{
    CemeteryDashboard, GraveDetail, GraveFinder, GraveGrid, NoticeBoard, NoticeDetail,
    NoticeForm, PrintDashboard, PrintForm, RecordForm,
};
use cemboard_core::{
    ApiClient, CemeteryStats, FileTokenStore, LoadState, MemoryTokenStore, Outcome, Session,
    TokenStore,
};
use clap::{Args, Parser, Subcommand};
use logging::Verbosity;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "cemboard",
    version,
    about = "Cemetery records, notices and print-shop ledger",
    long_about = "Admin console and public site for a cemetery records service.\n\
                  \n\
                  Examples:\n\
                    cemboard web --port 3333             # Serve the public site\n\
                    cemboard login --token <JWT>          # Store the admin token\n\
                    cemboard graves --block B             # Grave map for block B\n\
                    cemboard find karim                   # Find a loved one\n\
                    cemboard cemetery list                # Burial records (admin)\n\
                    cemboard prints list --sort profit    # Print-shop ledger (admin)\n\
                    cemboard prints import jobs.xlsx      # Bulk import from Excel\n\
                    cemboard prints invoice <ID>          # Render invoice_<ID>.pdf\n\
                  \n\
                  Environment Variables:\n\
                    CEMBOARD_API_URL                      # API base URL\n\
                    CEMBOARD_API_KEY                      # Shared API key\n\
                    CEMBOARD_CONFIG                       # Config file path\n\
                    CEMBOARD_TOKEN_FILE                   # Token file path\n\
                    CEMBOARD_NON_INTERACTIVE              # Answer yes to confirmations\n\
                    CEMBOARD_NO_COLOR                     # Disable ANSI colors"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API base URL
    #[arg(long, global = true, env = "CEMBOARD_API_URL")]
    api_url: Option<String>,

    /// Shared API key sent as x-api-key
    #[arg(long, global = true, env = "CEMBOARD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (default: <config_dir>/cemboard/config.toml)
    #[arg(long, global = true, env = "CEMBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Token file (default: <config_dir>/cemboard/token)
    #[arg(long, global = true, env = "CEMBOARD_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "CEMBOARD_NO_COLOR")]
    no_color: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true, env = "CEMBOARD_NON_INTERACTIVE")]
    yes: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the public site
    Web {
        /// Port for web server
        #[arg(long, default_value = "3333")]
        port: u16,
    },
    /// Store the admin token
    Login {
        /// Bearer token; read from stdin when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// Forget the admin token
    Logout,
    /// Show who the stored token belongs to
    Whoami,
    /// Grave map with occupancy
    Graves {
        /// Block letter, or "All"
        #[arg(long, short = 'b', default_value = "All")]
        block: String,
        /// Graves to reveal
        #[arg(long, short = 'n', default_value = "10")]
        show: usize,
        /// Graves per printed row
        #[arg(long, default_value = "10")]
        columns: usize,
    },
    /// Find a loved one by name or grave number
    Find {
        /// Search text
        #[arg(default_value = "")]
        query: String,
        /// Results to reveal
        #[arg(long, short = 'n', default_value = "6")]
        show: usize,
    },
    /// Show one burial record
    Grave { id: String },
    /// Notices and events, newest first
    Notices {
        /// Show every notice, not only the latest
        #[arg(long)]
        all: bool,
    },
    /// Show one notice
    Notice { id: String },
    /// Cemetery statistics
    Stats,
    /// Burial records and notices (requires login)
    #[command(subcommand)]
    Cemetery(CemeteryCommand),
    /// Print-shop ledger (requires login)
    #[command(subcommand)]
    Prints(PrintsCommand),
}

#[derive(Subcommand)]
enum CemeteryCommand {
    /// List burial records
    List {
        /// Filter by name or grave number
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    /// Add a burial record
    Add(RecordArgs),
    /// Edit a burial record; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: RecordArgs,
    },
    /// Delete a burial record
    Delete { id: String },
    /// Grave numbers without a record
    Available,
    /// Create a notice or event
    NoticeAdd(NoticeArgs),
    /// Edit a notice; omitted fields keep their value
    NoticeEdit {
        id: String,
        #[command(flatten)]
        fields: NoticeArgs,
    },
    /// Delete a notice
    NoticeDelete { id: String },
}

#[derive(Args, Debug, Default)]
struct RecordArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    grave: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    age: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    death_date: Option<String>,
    #[arg(long)]
    native: Option<bool>,
    #[arg(long)]
    father: Option<String>,
    #[arg(long)]
    mother: Option<String>,
    #[arg(long)]
    guardian: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    where_died: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

impl RecordArgs {
    fn apply(self, form: &mut RecordForm) {
        let set = |target: &mut String, value: Option<String>| {
            if let Some(v) = value {
                *target = v;
            }
        };
        set(&mut form.name, self.name);
        set(&mut form.grave_number, self.grave);
        set(&mut form.address, self.address);
        set(&mut form.age, self.age);
        set(&mut form.birth_date, self.birth_date);
        set(&mut form.death_date, self.death_date);
        set(&mut form.father_name, self.father);
        set(&mut form.mother_name, self.mother);
        set(&mut form.guardian_name, self.guardian);
        set(&mut form.gender, self.gender);
        set(&mut form.where_died, self.where_died);
        set(&mut form.description, self.description);
        if let Some(native) = self.native {
            form.is_native = native;
        }
    }
}

#[derive(Args, Debug, Default)]
struct NoticeArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    /// notice or event
    #[arg(long = "type")]
    kind: Option<String>,
    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
enum PrintsCommand {
    /// List the ledger with search, sort and paging
    List {
        /// Filter by client name, pages or charge per page
        #[arg(long, short = 's')]
        search: Option<String>,
        /// date, clientName or profit
        #[arg(long, default_value = "date")]
        sort: SortKey,
        /// asc or desc
        #[arg(long, default_value = "desc")]
        dir: SortDir,
        /// 1-based page of 12 rows
        #[arg(long, short = 'p', default_value = "1")]
        page: usize,
    },
    /// Add a print job
    Add(PrintArgs),
    /// Edit a print job; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: PrintArgs,
    },
    /// Delete a print job
    Delete { id: String },
    /// Export the ledger to prints_YYYY-MM-DD.xlsx
    Export {
        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        dir: PathBuf,
    },
    /// Import rows from an Excel workbook
    Import { file: PathBuf },
    /// Render invoice_<ID>.pdf
    Invoice {
        id: String,
        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        dir: PathBuf,
    },
    /// Revenue, cost and profit over the ledger
    Summary,
}

#[derive(Args, Debug, Default)]
struct PrintArgs {
    #[arg(long)]
    client: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    pages: Option<f64>,
    #[arg(long)]
    charge: Option<f64>,
    #[arg(long)]
    cost: Option<f64>,
    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

/// Shared runtime context built from flags, environment and config file
struct AppContext {
    config: AppConfig,
    client: ApiClient,
    json: bool,
    no_color: bool,
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(Verbosity::from_flags(cli.quiet, cli.verbose), cli.no_color);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    }
    .with_overrides(cli.api_url.clone(), cli.api_key.clone(), cli.token_file.clone());
    config.validate()?;
    debug!(api = %config.api.base_url, "Configuration loaded");

    let store: Arc<dyn TokenStore> = match config.token_path() {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(MemoryTokenStore::new()),
    };
    let session = Session::new(store);
    let client = ApiClient::from_config(&config.api, session)?;

    let ctx = AppContext {
        config,
        client,
        json: cli.json,
        no_color: cli.no_color,
        yes: cli.yes,
    };

    match cli.command {
        Command::Web { port } => run_web(&ctx, port).await,
        Command::Login { token } => run_login(&ctx, token),
        Command::Logout => {
            ctx.client.session().logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => run_whoami(&ctx),
        Command::Graves {
            block,
            show,
            columns,
        } => run_graves(&ctx, &block, show, columns).await,
        Command::Find { query, show } => run_find(&ctx, &query, show).await,
        Command::Grave { id } => run_grave(&ctx, &id).await,
        Command::Notices { all } => run_notices(&ctx, all).await,
        Command::Notice { id } => run_notice(&ctx, &id).await,
        Command::Stats => run_stats(&ctx).await,
        Command::Cemetery(cmd) => run_cemetery(&ctx, cmd).await,
        Command::Prints(cmd) => run_prints(&ctx, cmd).await,
    }
}

// ============================================================================
// Session
// ============================================================================

async fn run_web(ctx: &AppContext, port: u16) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(format!("Checking API at {}...", ctx.config.api.base_url));

    // The public site never sends the admin token
    let public = ApiClient::from_config(&ctx.config.api, Session::anonymous())?;
    match public.list_graves().await {
        Ok(graves) => spinner.finish_with_message(format!(
            "✓ API reachable in {:.2}s ({} grave slots)",
            start.elapsed().as_secs_f64(),
            graves.len()
        )),
        Err(e) => spinner.finish_with_message(format!("⚠ API not reachable yet: {}", e)),
    }

    println!("\n🌐 Public site: http://localhost:{}", port);
    println!("   Health:      http://localhost:{}/api/health", port);

    let state = cemboard_web::AppState::new(public, ctx.config.site.clone());
    cemboard_web::run(state, port).await
}

fn run_login(ctx: &AppContext, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(t) => t,
        None => {
            eprint!("Token: ");
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("Failed to read token from stdin")?;
            line.trim().to_string()
        }
    };

    ctx.client.session().login(&token)?;
    info!("Token stored");
    match ctx.client.session().display_name() {
        Some(name) => println!("Logged in as {}.", name),
        None => println!("Logged in."),
    }
    Ok(())
}

fn run_whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.client.session();
    if !session.is_authenticated() {
        bail!("Not signed in. Run `cemboard login --token <TOKEN>`.");
    }
    let name = session.display_name().unwrap_or_else(|| "Admin".to_string());
    if ctx.json {
        println!("{}", cli::to_json(&serde_json::json!({ "name": name }))?);
    } else {
        println!("{}", name);
    }
    Ok(())
}

// ============================================================================
// Public views
// ============================================================================

fn ensure_loaded(state: LoadState, what: &str) -> Result<()> {
    if state != LoadState::Ready {
        bail!("Failed to load {}. Check the API URL and key.", what);
    }
    Ok(())
}

async fn run_graves(ctx: &AppContext, block: &str, show: usize, columns: usize) -> Result<()> {
    let mut grid = GraveGrid::new(ctx.client.clone());
    grid.load().await;
    ensure_loaded(grid.state(), "graves")?;

    grid.select_block(block);
    grid.reveal_at_least(show);
    let cells = grid.visible_cells();

    if ctx.json {
        println!("{}", cli::to_json(&cells)?);
        return Ok(());
    }

    println!(
        "Total: {}  Used: {}  Available: {}  Blocks: {}",
        grid.total(),
        grid.used_count(),
        grid.available_count(),
        grid.blocks().join(", ")
    );
    println!("{}", cli::format_grave_grid(&cells, columns));
    if grid.has_more() {
        eprintln!(
            "\nShowing {} of {} in block {}. Use --show to reveal more.",
            cells.len(),
            grid.filtered_count(),
            grid.filter().label()
        );
    }
    Ok(())
}

async fn run_find(ctx: &AppContext, query: &str, show: usize) -> Result<()> {
    let mut finder = GraveFinder::new(ctx.client.clone());
    finder.load().await;
    ensure_loaded(finder.state(), "records")?;

    finder.set_query(query);
    finder.submit();
    finder.reveal_at_least(show);
    let cards = finder.cards();

    if ctx.json {
        println!("{}", cli::to_json(&cards)?);
        return Ok(());
    }
    println!("{}", cli::format_finder_cards(&cards, ctx.no_color));
    if finder.has_more() {
        eprintln!(
            "\n{} of {} matches shown. Use --show to reveal more.",
            cards.len(),
            finder.matches().len()
        );
    }
    Ok(())
}

async fn run_grave(ctx: &AppContext, id: &str) -> Result<()> {
    let mut detail = GraveDetail::new(ctx.client.clone());
    detail.load(id).await;
    ensure_loaded(detail.state(), "grave details")?;

    let (Some(record), Some(profile)) = (detail.record(), detail.profile()) else {
        bail!(cemboard_core::views::detail::NOT_FOUND);
    };
    if ctx.json {
        println!("{}", cli::to_json(record)?);
    } else {
        println!("{}", cli::format_profile(&profile));
    }
    Ok(())
}

async fn run_notices(ctx: &AppContext, all: bool) -> Result<()> {
    let mut board = NoticeBoard::new(ctx.client.clone());
    board.load().await;
    ensure_loaded(board.state(), "notices")?;

    let notices = if all { board.all() } else { board.latest() };
    if ctx.json {
        println!("{}", cli::to_json(notices)?);
        return Ok(());
    }
    println!("{}", cli::format_notice_table(notices, ctx.no_color));
    if !all && board.has_more() {
        eprintln!("\nMore notices available. Use --all to see every notice.");
    }
    Ok(())
}

async fn run_notice(ctx: &AppContext, id: &str) -> Result<()> {
    let mut detail = NoticeDetail::new(ctx.client.clone());
    if let Outcome::Redirect(_) = detail.load(id).await {
        bail!("Failed to load notice {}", id);
    }
    let Some(notice) = detail.notice() else {
        bail!(cemboard_core::views::notices::NOTICE_NOT_FOUND);
    };
    if ctx.json {
        println!("{}", cli::to_json(notice)?);
    } else {
        println!("{}", cli::format_notice(notice));
    }
    Ok(())
}

async fn run_stats(ctx: &AppContext) -> Result<()> {
    let records = ctx
        .client
        .list_cemetery()
        .await
        .context("Failed to load records")?;
    let stats = CemeteryStats::compute(&records);
    if ctx.json {
        println!("{}", cli::to_json(&stats)?);
    } else {
        println!("{}", cli::format_stats(&stats, ctx.no_color));
    }
    Ok(())
}

// ============================================================================
// Cemetery admin
// ============================================================================

async fn read_image(path: Option<&Path>) -> Result<Option<ImageFile>> {
    match path {
        Some(p) => Ok(Some(ImageFile::read(p).await?)),
        None => Ok(None),
    }
}

async fn run_cemetery(ctx: &AppContext, cmd: CemeteryCommand) -> Result<()> {
    let mut dashboard = CemeteryDashboard::new(ctx.client.clone());
    cli::finish(dashboard.mount().await)?;
    ensure_loaded(dashboard.state(), "cemetery records")?;

    match cmd {
        CemeteryCommand::List { search } => {
            let rows = dashboard.search(search.as_deref().unwrap_or(""));
            if ctx.json {
                println!("{}", cli::to_json(&rows)?);
            } else {
                println!("{}", cli::format_record_table(&rows, ctx.no_color));
            }
            Ok(())
        }
        CemeteryCommand::Add(fields) => {
            let mut form = dashboard.new_record_form();
            form.image = read_image(fields.image.as_deref()).await?;
            warn_unlisted_grave(&form, fields.grave.as_deref());
            fields.apply(&mut form);
            cli::finish(dashboard.submit_record(&form, None).await)?;
            println!("Record added.");
            Ok(())
        }
        CemeteryCommand::Edit { id, fields } => {
            let mut form = dashboard
                .edit_record_form(&id)
                .ok_or(CoreError::RecordNotFound { id: id.clone() })?;
            form.image = read_image(fields.image.as_deref()).await?;
            warn_unlisted_grave(&form, fields.grave.as_deref());
            fields.apply(&mut form);
            cli::finish(dashboard.submit_record(&form, Some(&id)).await)?;
            println!("Record updated.");
            Ok(())
        }
        CemeteryCommand::Delete { id } => {
            let outcome = dashboard
                .delete_record(&id, |prompt| cli::confirm(prompt, ctx.yes))
                .await;
            let deleted = outcome == Outcome::Done;
            cli::finish(outcome)?;
            if deleted {
                println!("Record deleted.");
            }
            Ok(())
        }
        CemeteryCommand::Available => {
            let graves = dashboard.available_graves();
            if ctx.json {
                println!("{}", cli::to_json(&graves)?);
            } else if graves.is_empty() {
                println!("No available graves.");
            } else {
                println!("{}", graves.join(" "));
            }
            Ok(())
        }
        CemeteryCommand::NoticeAdd(fields) => {
            let mut form = NoticeForm::default();
            apply_notice_args(&mut form, fields).await?;
            cli::finish(dashboard.submit_notice(&form, None).await)
        }
        CemeteryCommand::NoticeEdit { id, fields } => {
            let notice = dashboard
                .notice(&id)
                .ok_or(CoreError::RecordNotFound { id: id.clone() })?;
            let mut form = NoticeForm::from_notice(notice);
            apply_notice_args(&mut form, fields).await?;
            cli::finish(dashboard.submit_notice(&form, Some(&id)).await)
        }
        CemeteryCommand::NoticeDelete { id } => {
            let outcome = dashboard
                .delete_notice(&id, |prompt| cli::confirm(prompt, ctx.yes))
                .await;
            let deleted = outcome == Outcome::Done;
            cli::finish(outcome)?;
            if deleted {
                println!("Notice deleted.");
            }
            Ok(())
        }
    }
}

/// The selection list is advisory; the API has the final say on uniqueness
fn warn_unlisted_grave(form: &RecordForm, grave: Option<&str>) {
    if let Some(grave) = grave {
        if !form.grave_options.iter().any(|g| g == grave) {
            eprintln!("⚠ Grave {} is not in the available list.", grave);
        }
    }
}

async fn apply_notice_args(form: &mut NoticeForm, fields: NoticeArgs) -> Result<()> {
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(date) = fields.date {
        form.date = date;
    }
    if let Some(kind) = fields.kind {
        form.kind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    form.image = read_image(fields.image.as_deref()).await?;
    Ok(())
}

// ============================================================================
// Print-shop admin
// ============================================================================

fn apply_print_args(form: &mut PrintForm, fields: PrintArgs) {
    if let Some(v) = fields.client {
        form.client_name = v;
    }
    if let Some(v) = fields.address {
        form.address = v;
    }
    if let Some(v) = fields.phone {
        form.phone = v;
    }
    if let Some(v) = fields.email {
        form.email = v;
    }
    if let Some(v) = fields.pages {
        form.total_pages = v;
    }
    if let Some(v) = fields.charge {
        form.charge_per_page = v;
    }
    if let Some(v) = fields.cost {
        form.cost_per_page = v;
    }
}

async fn submit_print(
    ctx: &AppContext,
    dashboard: &mut PrintDashboard,
    fields: PrintArgs,
) -> Result<()> {
    let image = read_image(fields.image.as_deref()).await?;
    if let Some(form) = dashboard.form_mut() {
        apply_print_args(form, fields);
        form.image = image;
        let totals = form.preview();
        if !ctx.json {
            eprintln!(
                "Total charge: {}  Total cost: {}  Profit: {}",
                cemboard_core::ledger::format_amount(totals.total_charge),
                cemboard_core::ledger::format_amount(totals.total_cost),
                cemboard_core::ledger::format_amount(totals.profit)
            );
        }
    }
    cli::finish(dashboard.submit().await)
}

async fn run_prints(ctx: &AppContext, cmd: PrintsCommand) -> Result<()> {
    let mut dashboard = PrintDashboard::new(ctx.client.clone());
    cli::finish(dashboard.mount().await)?;

    match cmd {
        PrintsCommand::List {
            search,
            sort,
            dir,
            page,
        } => {
            if let Some(q) = search.as_deref() {
                dashboard.set_search(q);
            }
            dashboard.set_sort(sort, dir);
            dashboard.set_page(page);
            let rows = dashboard.page_rows();
            if ctx.json {
                println!("{}", cli::to_json(&rows)?);
                return Ok(());
            }
            println!("{}", cli::format_print_table(&rows, ctx.no_color));
            eprintln!(
                "\nPage {} of {} ({} matching records)",
                dashboard.page(),
                dashboard.page_count(),
                dashboard.visible().len()
            );
            Ok(())
        }
        PrintsCommand::Add(fields) => {
            dashboard.open_add();
            submit_print(ctx, &mut dashboard, fields).await?;
            println!("Record added.");
            Ok(())
        }
        PrintsCommand::Edit { id, fields } => {
            if !dashboard.open_edit(&id) {
                return Err(CoreError::RecordNotFound { id }.into());
            }
            submit_print(ctx, &mut dashboard, fields).await?;
            println!("Record updated.");
            Ok(())
        }
        PrintsCommand::Delete { id } => {
            let outcome = dashboard
                .delete(&id, |prompt| cli::confirm(prompt, ctx.yes))
                .await;
            let deleted = outcome == Outcome::Done;
            cli::finish(outcome)?;
            if deleted {
                println!("Record deleted.");
            }
            Ok(())
        }
        PrintsCommand::Export { dir } => {
            let path = dashboard.export(&dir, chrono::Local::now().date_naive())?;
            println!("Exported {} records to {}", dashboard.records().len(), path.display());
            Ok(())
        }
        PrintsCommand::Import { file } => run_import(ctx, &mut dashboard, &file).await,
        PrintsCommand::Invoice { id, dir } => {
            let path = dashboard.invoice(&id, &ctx.config.invoice, &dir).await?;
            println!("Invoice written to {}", path.display());
            Ok(())
        }
        PrintsCommand::Summary => {
            let summary = dashboard.summary();
            if ctx.json {
                println!("{}", cli::to_json(&summary)?);
            } else {
                println!("{}", cli::format_summary(&summary));
            }
            Ok(())
        }
    }
}

async fn run_import(ctx: &AppContext, dashboard: &mut PrintDashboard, file: &Path) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let bar = if ctx.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} rows {msg}")
            .context("Invalid progress template")?,
    );

    let (report, outcome) = dashboard
        .import_file(file, |done, total| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        })
        .await;
    bar.finish_and_clear();

    if let Some(row) = report.failed_row {
        eprintln!(
            "Stopped at data row {} ({} of {} rows posted)",
            row + 1,
            report.posted,
            report.total
        );
    }
    if ctx.json {
        println!(
            "{}",
            cli::to_json(&serde_json::json!({
                "total": report.total,
                "posted": report.posted,
                "failedRow": report.failed_row,
            }))?
        );
    }
    cli::finish(outcome)
}
