use std::error::Error;
use std::future::Future;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use order_invoice::config::Settings;
use order_invoice::layout::InvoiceLayoutEngine;
use order_invoice::render::PdfRenderer;
use order_invoice::repository::{
    load_orders, FetchOutcome, FileOrderRepository, HttpOrderRepository, OrderRepository,
};
use order_invoice::shell::{generate_selected, render_view, ViewEvent, ViewState};
use order_invoice::sink::FileSink;

/// Fetches orders and renders the selected one as a PDF invoice.
///
/// Settings come from `invoice.toml` (or `--config`), `INVOICE_*` environment
/// variables, and the flags below, in increasing order of precedence.
#[derive(Parser)]
#[command(author, version, about = "Preview orders and generate PDF invoices")]
struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Order list endpoint.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Read orders from a local JSON file instead of the endpoint.
    #[arg(long, global = true)]
    orders_file: Option<PathBuf>,

    /// Flat tax added to every invoice.
    #[arg(long, global = true)]
    tax_amount: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the fetched orders.
    #[command(name = "list", aliases = ["ls"])]
    List,

    /// Show the details and line items of one order.
    #[command(name = "show")]
    Show {
        /// Zero-based position in the order list.
        #[arg(long, short, default_value_t = 0)]
        index: usize,
    },

    /// Save the invoice of one order.
    #[command(name = "generate", aliases = ["gen", "pdf"])]
    Generate {
        #[arg(long, short, default_value_t = 0)]
        index: usize,

        /// Directory the invoice is written to.
        #[arg(long, short, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Select orders and generate invoices from a prompt.
    #[command(name = "interactive", aliases = ["ui"])]
    Interactive {
        #[arg(long, short, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(tax_amount) = cli.tax_amount {
        settings.tax_amount = tax_amount;
    }
    settings.validate()?;
    Ok(settings)
}

fn build_repository(
    cli: &Cli,
    settings: &Settings,
) -> Result<Box<dyn OrderRepository>, Box<dyn Error>> {
    let repository: Box<dyn OrderRepository> = match &cli.orders_file {
        Some(path) => Box::new(FileOrderRepository::new(path)),
        None => Box::new(HttpOrderRepository::new(
            settings.endpoint_url()?,
            settings.request_timeout(),
        )?),
    };
    Ok(repository)
}

/// Resolves when the user presses Ctrl-C.
async fn interrupted() {
    settle_interrupt(tokio::signal::ctrl_c()).await
}

/// Waits for `signal`. A listener that failed to install never resolves, so a
/// broken handler cannot cancel work on its own.
async fn settle_interrupt<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!("cannot listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}

/// What the prompt received next.
#[derive(Debug, PartialEq)]
enum Prompt {
    Line(String),
    Closed,
    Interrupted,
}

async fn next_prompt<L, I>(line: L, interrupt: I) -> io::Result<Prompt>
where
    L: Future<Output = io::Result<Option<String>>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        line = line => Ok(match line? {
            Some(line) => Prompt::Line(line),
            None => Prompt::Closed,
        }),
        _ = interrupt => Ok(Prompt::Interrupted),
    }
}

/// Fetches the order list into a fresh view state. `None` means the user
/// cancelled the fetch with Ctrl-C.
async fn fetch(repository: &dyn OrderRepository) -> Option<ViewState> {
    let event = match load_orders(repository, interrupted()).await {
        FetchOutcome::Loaded(orders) => ViewEvent::OrdersLoaded(orders),
        FetchOutcome::Failed(err) => {
            eprintln!("Error fetching API: {}", err);
            print_error_sources(&err);
            ViewEvent::LoadFailed(err.to_string())
        }
        FetchOutcome::Cancelled => return None,
    };
    Some(ViewState::Loading.apply(event))
}

fn select(state: ViewState, index: usize) -> Result<ViewState, Box<dyn Error>> {
    let count = match &state {
        ViewState::Ready(selection) => selection.orders().len(),
        ViewState::Empty => return Err("no orders available".into()),
        ViewState::LoadFailed { message } => return Err(message.clone().into()),
        ViewState::Loading => return Err("orders are still loading".into()),
    };
    if index >= count {
        return Err(format!("no order at index {} ({} loaded)", index, count).into());
    }
    Ok(state.apply(ViewEvent::Select(index)))
}

/// Fetches the order list for a one-shot command. `Ok(None)` means the fetch
/// was cancelled.
async fn fetch_loaded(repository: &dyn OrderRepository) -> Result<Option<ViewState>, Box<dyn Error>> {
    match fetch(repository).await {
        Some(ViewState::LoadFailed { message }) => {
            Err(format!("could not load orders: {}", message).into())
        }
        Some(state) => Ok(Some(state)),
        None => {
            info!("cancelled");
            Ok(None)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(&cli)?;
    let repository = build_repository(&cli, &settings)?;
    let engine = InvoiceLayoutEngine::new(settings.layout_settings());
    let renderer = PdfRenderer::new();

    match cli.command {
        Commands::List => {
            if let Some(state) = fetch_loaded(repository.as_ref()).await? {
                print!("{}", render_list(&state));
            }
            Ok(())
        }
        Commands::Show { index } => {
            if let Some(state) = fetch_loaded(repository.as_ref()).await? {
                let state = select(state, index)?;
                print!("{}", render_view(&state, &settings.currency_label));
            }
            Ok(())
        }
        Commands::Generate { index, output_dir } => {
            let Some(state) = fetch_loaded(repository.as_ref()).await? else {
                return Ok(());
            };
            let state = select(state, index)?;
            let mut sink = FileSink::new(output_dir);
            let event = generate_selected(&state, &engine, &renderer, &mut sink, &settings.output_file)
                .ok_or("no order selected")?;
            if let ViewEvent::InvoiceFailed(message) = event {
                return Err(message.into());
            }
            println!(
                "Generated {}",
                sink.directory().join(&settings.output_file).display()
            );
            Ok(())
        }
        Commands::Interactive { output_dir } => {
            let mut sink = FileSink::new(output_dir);
            interactive(repository.as_ref(), &settings, &engine, &renderer, &mut sink).await
        }
    }
}

fn render_list(state: &ViewState) -> String {
    match state.selection() {
        Some(selection) => selection
            .orders()
            .iter()
            .enumerate()
            .map(|(index, order)| format!("[{}] {}\n", index, order.selection_label()))
            .collect(),
        None => "No orders available.\n".to_owned(),
    }
}

const PROMPT_HELP: &str =
    "Enter an index to select, `g` to generate the PDF, `r` to reload, `q` to quit.";

async fn interactive(
    repository: &dyn OrderRepository,
    settings: &Settings,
    engine: &InvoiceLayoutEngine,
    renderer: &PdfRenderer,
    sink: &mut FileSink,
) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", render_view(&ViewState::Loading, &settings.currency_label));
    let Some(mut state) = fetch(repository).await else {
        return Ok(());
    };

    loop {
        println!("{}", render_view(&state, &settings.currency_label));
        println!("{}", PROMPT_HELP);

        let line = match next_prompt(lines.next_line(), interrupted()).await? {
            Prompt::Line(line) => line,
            Prompt::Closed => return Ok(()),
            Prompt::Interrupted => {
                info!("interrupted");
                return Ok(());
            }
        };
        let input = line.trim();

        state = match input {
            "q" | "quit" => return Ok(()),
            "r" | "reload" => {
                state = state.apply(ViewEvent::Refresh);
                println!("{}", render_view(&state, &settings.currency_label));
                match fetch(repository).await {
                    Some(next) => next,
                    None => return Ok(()),
                }
            }
            "g" | "generate" => {
                match generate_selected(&state, engine, renderer, sink, &settings.output_file) {
                    Some(event) => state.apply(event),
                    None => {
                        println!("Nothing to generate.");
                        state
                    }
                }
            }
            other => match other.parse::<usize>() {
                Ok(index) => state.apply(ViewEvent::Select(index)),
                Err(_) => {
                    println!("Unrecognized input `{}`.", other);
                    state
                }
            },
        };
    }
}
