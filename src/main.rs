use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use sensordash::{error_display, logging, App, AppConfig, AppEvent, Args, CacheManager, ConfigManager, Theme};
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{error, info};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig, theme: Theme) -> Result<()> {
    let poll_interval = Duration::from_millis(config.display.event_poll_interval_ms);
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config);
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone()))?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config = ConfigManager::new(sensordash::APP_NAME)?;
        match config.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration file written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.clear_cache {
        match CacheManager::new(sensordash::APP_NAME) {
            Ok(cache) => {
                match cache.clear_all() {
                    Ok(removed) => println!("Cache cleared successfully ({} files removed)", removed),
                    Err(e) => {
                        eprintln!("Error clearing cache: {}", e);
                        std::process::exit(1);
                    }
                }
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(sensordash::APP_NAME)?;
    config.apply_args(&args);
    config.validate()?;
    let theme = Theme::from_config(&config.theme)?;

    match CacheManager::new(sensordash::APP_NAME).and_then(|cache| logging::init(&config.logging, &cache)) {
        Ok(Some(log_path)) => info!(log = %log_path.display(), "sensordash starting"),
        Ok(None) => {}
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config, theme);
    ratatui::restore();
    if let Err(e) = result {
        error!(error = %e, "sensordash exited with an error");
        eprintln!("Error: {}", error_display::user_message_from_report(&e));
        std::process::exit(1);
    }
    Ok(())
}
