#[macro_use]
extern crate tracing;

pub mod logging;
mod tui;

use color_eyre::Result;
use lens_apps_stats_config::Args;
pub use tui::{
    App,
    Tui,
};

pub async fn start_tui(args: Args) -> Result<()> {
    logging::log_init(args.debug)?;

    App::new(args)?.run().await
}

/// Installs the eyre report handler and a panic hook that restores the terminal first.
pub fn init_errors() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        if let Ok(mut tui) = Tui::new() {
            if let Err(err) = tui.exit() {
                error!("Unable to exit terminal: {err:?}");
            }
        }

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{
                handle_dump,
                print_msg,
                Metadata,
            };
            let metadata = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                .authors(env!("CARGO_PKG_AUTHORS").replace(':', ", "))
                .homepage(env!("CARGO_PKG_REPOSITORY"));

            let file_path = handle_dump(&metadata, panic_info);
            if let Err(err) = print_msg(file_path, &metadata) {
                eprintln!("Failed to print the panic message: {err}");
            }
            eprintln!("{}", panic_hook.panic_report(panic_info));
        }

        error!("Error: {}", panic_hook.panic_report(panic_info));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(1);
    }));
    Ok(())
}
