//! eventdesk CLI entry point.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventdesk_client::cli::{Cli, Commands, OutputFormat};
use eventdesk_client::output::{format_output, format_section, pretty};
use eventdesk_client::views::{
    EditEventView, EventDetailsView, FindEventsView, ImagePicker, NewEventView, RecentEventsView,
    SharedApi,
};
use eventdesk_client::{ClientError, Config, EventsClient, QueryClient};
use eventdesk_core::event::EventDraft;
use eventdesk_core::route::Route;

/// Everything a command needs.
struct App {
    api: SharedApi,
    queries: QueryClient,
    format: OutputFormat,
    quiet: bool,
}

impl App {
    fn print(&self, output: &str) {
        println!("{}", output);
    }

    /// Report where the view asked to go next.
    fn navigate(&self, route: &Route) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Json => eprintln!("{}", format_output(&route.path(), self.format)),
            OutputFormat::Pretty => eprintln!("{}", pretty::format_route(route)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().with_base_url(&cli.base_url);
    tracing::debug!(base_url = %config.base_url, "Starting eventdesk");

    let client = EventsClient::from_config(&config).context("Failed to build HTTP client")?;
    let app = App {
        api: Arc::new(client),
        queries: QueryClient::from_config(&config),
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = run(&app, cli.command).await;
    app.queries.clear();
    result
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Find { term } => find(app, term).await,
        Commands::Recent => recent(app).await,
        Commands::Show { id } => show(app, &id).await,
        Commands::New(args) => create(app, args.into()).await,
        Commands::Edit(args) => {
            let (id, update) = args.into_update();
            if update.is_empty() {
                return Err(ClientError::InvalidInput("nothing to update".to_string()).into());
            }
            edit(app, &id, update).await
        }
        Commands::Delete { id, yes } => delete(app, &id, yes).await,
        Commands::Images => images(app).await,
        Commands::Open { route } => open(app, route.parse()?).await,
    }
}

async fn find(app: &App, term: String) -> anyhow::Result<()> {
    let mut view = FindEventsView::new(app.api.clone(), app.queries.clone());
    view.submit(term);
    let content = view.content().await;
    app.print(&format_section(content, app.format, |events| pretty::format_events(events))?);
    Ok(())
}

async fn recent(app: &App) -> anyhow::Result<()> {
    let view = RecentEventsView::new(app.api.clone(), app.queries.clone());
    let content = view.content().await;
    app.print(&format_section(content, app.format, |events| pretty::format_events(events))?);
    Ok(())
}

async fn show(app: &App, id: &str) -> anyhow::Result<()> {
    let view = EventDetailsView::new(app.api.clone(), app.queries.clone(), id);
    let content = view.content().await;
    app.print(&format_section(content, app.format, pretty::format_details)?);
    Ok(())
}

async fn images(app: &App) -> anyhow::Result<()> {
    let picker = ImagePicker::new(app.api.clone(), app.queries.clone());
    let content = picker.content().await;
    app.print(&format_section(content, app.format, |images| pretty::format_images(images))?);
    Ok(())
}

async fn create(app: &App, draft: EventDraft) -> anyhow::Result<()> {
    let view = NewEventView::new(app.api.clone(), app.queries.clone());
    let (event, route) = view.submit(draft).await?;
    match app.format {
        OutputFormat::Json => app.print(&format_output(&event, app.format)),
        OutputFormat::Pretty => app.print(&format!("Created:\n{}", pretty::format_event(&event))),
    }
    app.navigate(&route);
    Ok(())
}

async fn edit(
    app: &App,
    id: &str,
    update: eventdesk_core::event::UpdateEventRequest,
) -> anyhow::Result<()> {
    let view = EditEventView::new(app.api.clone(), app.queries.clone(), id);
    format_section(view.load().await, app.format, |_| String::new())?;

    let submission = view.submit(update)?;
    app.navigate(&submission.route);

    // The process must outlive the background update.
    let event = submission.outcome.await.context("Update task failed")??;
    match app.format {
        OutputFormat::Json => app.print(&format_output(&event, app.format)),
        OutputFormat::Pretty => app.print(&format!("Updated:\n{}", pretty::format_event(&event))),
    }
    Ok(())
}

async fn delete(app: &App, id: &str, yes: bool) -> anyhow::Result<()> {
    let view = EventDetailsView::new(app.api.clone(), app.queries.clone(), id);
    let content = view.content().await;
    let summary = format_section(content, OutputFormat::Pretty, pretty::format_details)?;

    view.start_delete();
    if !yes && !confirm(&summary)? {
        view.stop_delete();
        if !app.quiet {
            eprintln!("Cancelled.");
        }
        return Ok(());
    }

    match view.confirm_delete().await {
        Ok(route) => {
            if !app.quiet {
                eprintln!("Deleted event {}", id);
            }
            app.navigate(&route);
            Ok(())
        }
        Err(block) => {
            if app.format == OutputFormat::Pretty {
                eprintln!("{}", pretty::format_error(&block));
            }
            Err(block.into())
        }
    }
}

/// Ask for confirmation on the terminal.
fn confirm(summary: &str) -> anyhow::Result<bool> {
    let mut stderr = io::stderr();
    writeln!(stderr, "{}\n", summary)?;
    write!(
        stderr,
        "Are you sure? Do you really want to delete this event? This action cannot be undone. [y/N] "
    )?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn open(app: &App, route: Route) -> anyhow::Result<()> {
    tracing::debug!(%route, "Opening route");
    match route {
        Route::Events => {
            recent(app).await?;
            if !app.quiet {
                let search = FindEventsView::new(app.api.clone(), app.queries.clone());
                let prompt = format_section(search.snapshot(), OutputFormat::Pretty, |_| String::new())?;
                eprintln!("\n{}", prompt);
            }
            Ok(())
        }
        Route::EventDetails(id) => show(app, &id).await,
        Route::NewEvent | Route::EditEvent(_) => {
            if let Route::EditEvent(id) = &route {
                let view = EditEventView::new(app.api.clone(), app.queries.clone(), id.as_str());
                app.print(&format_section(view.load().await, app.format, |event| {
                    pretty::format_event(event)
                })?);
            }
            images(app).await?;
            if !app.quiet {
                eprintln!("\nUse `eventdesk new` or `eventdesk edit` to submit the form.");
            }
            Ok(())
        }
    }
}
