use super::{
    action::{
        Action,
        Screen,
    },
    components::{
        charts::Charts,
        filters::Filters,
        logs::Logs,
        nav_tabs::NavTabs,
        rankings::Rankings,
        Component,
    },
    keybindings::KeyBindings,
    tui::{
        Event,
        Tui,
    },
};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use lens_apps_stats_config::{
    AppId,
    Args,
    Config,
};
use lens_apps_stats_core::{
    open_app,
    Catalog,
    Dashboard,
    DateRange,
    LensClient,
    StatsEvent,
    SystemNavigator,
};
use ratatui::prelude::Rect;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct App {
    config: Config,
    keybindings: KeyBindings,
    components: Vec<Box<dyn Component>>,
    dashboard: Dashboard,
    stats_rx: Option<mpsc::UnboundedReceiver<StatsEvent>>,
    navigator: Option<SystemNavigator>,
    screen: Screen,
    input_mode: bool,
    should_quit: bool,
    should_suspend: bool,
    last_tick_key_events: Vec<KeyEvent>,
}

type ActionSender = mpsc::UnboundedSender<Action>;
type ActionReceiver = mpsc::UnboundedReceiver<Action>;

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args)?;
        let keybindings = KeyBindings::load_default()?;
        let catalog = Catalog::from_config(&config);
        let range = DateRange::from_config(&config);
        let source = Arc::new(LensClient::from_config(&config)?);
        info!(endpoint = %source.endpoint(), apps = catalog.entries().len(), "Using Lens API");

        let (stats_tx, stats_rx) = mpsc::unbounded_channel();
        let dashboard = Dashboard::new(catalog.clone(), config.platform, range, source, stats_tx);

        let navigator = SystemNavigator::detect()
            .inspect_err(|err| warn!("Opening app pages is disabled: {err}"))
            .ok();

        Ok(Self {
            components: vec![
                Box::new(NavTabs::default()),
                Box::new(Rankings::new(catalog.clone())),
                Box::new(Charts::new(catalog)),
                Box::new(Logs::new(config.debug)),
                Box::new(Filters::new(range, config.platform)),
            ],
            dashboard,
            stats_rx: Some(stats_rx),
            navigator,
            screen: Screen::default(),
            input_mode: false,
            should_quit: false,
            should_suspend: false,
            last_tick_key_events: Vec::new(),
            config,
            keybindings,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?.tick_rate(4.0).frame_rate(30.0);
        tui.enter()?;

        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        for component in self.components.iter_mut() {
            component.register_action_handler(action_tx.clone())?;
        }
        for component in self.components.iter_mut() {
            component.register_config_handler(self.config.clone())?;
        }
        for component in self.components.iter_mut() {
            component.init(tui.size()?)?;
        }

        if let Some(mut stats_rx) = self.stats_rx.take() {
            let action_tx = action_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = stats_rx.recv().await {
                    if action_tx.send(Action::Stats(event)).is_err() {
                        break;
                    }
                }
            });
        }
        self.dashboard.start();
        action_tx.send(Action::DashboardChanged(Box::new(self.dashboard.view())))?;

        loop {
            self.handle_events(&mut tui, action_tx.clone()).await?;
            self.handle_actions(&mut tui, action_tx.clone(), &mut action_rx)?;
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                action_tx.send(Action::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;

        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui, action_tx: ActionSender) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };
        match event {
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
            Event::Key(key) if !self.input_mode => self.handle_key_event(key, action_tx.clone())?,
            _ => {}
        }

        for component in self.components.iter_mut() {
            if component.is_focused() {
                if let Some(action) = component.handle_events(Some(event.clone()))? {
                    action_tx.send(action)?;
                }
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent, action_tx: ActionSender) -> Result<()> {
        let key = KeyEvent::new(key.code, key.modifiers);
        match self.keybindings.lookup(self.screen, &[key]) {
            Some(action) => {
                action_tx.send(action.clone())?;
            }
            _ => {
                // If the key was not handled as a single key action,
                // then consider it for multi-key combinations.
                self.last_tick_key_events.push(key);

                if let Some(action) = self.keybindings.lookup(self.screen, &self.last_tick_key_events) {
                    action_tx.send(action.clone())?;
                }
            }
        }
        Ok(())
    }

    fn handle_actions(&mut self, tui: &mut Tui, action_tx: ActionSender, action_rx: &mut ActionReceiver) -> Result<()> {
        while let Ok(action) = action_rx.try_recv() {
            if action != Action::Tick && action != Action::Render {
                trace!("{action:?}");
            }
            match &action {
                Action::Tick => self.last_tick_key_events.clear(),
                Action::Quit => self.should_quit = true,
                Action::Suspend => self.should_suspend = true,
                Action::Resume => self.should_suspend = false,
                Action::ClearScreen => tui.terminal.clear()?,
                Action::Resize(w, h) => self.handle_resize(tui, *w, *h)?,
                Action::Render => self.render(tui)?,
                Action::Error(message) => error!("{message}"),
                Action::Activate(screen) => self.screen = *screen,
                Action::InputMode(enabled) => self.input_mode = *enabled,
                Action::Stats(event) => {
                    if self.dashboard.handle_event(event.clone()).changed_state() {
                        action_tx.send(self.dashboard_changed())?;
                    }
                }
                Action::ApplyRange(range) => {
                    self.dashboard.set_range(*range);
                    action_tx.send(self.dashboard_changed())?;
                }
                Action::ApplyPlatform(platform) => {
                    self.dashboard.set_platform_filter(*platform);
                    action_tx.send(self.dashboard_changed())?;
                }
                Action::Refresh => {
                    self.dashboard.refresh();
                    action_tx.send(self.dashboard_changed())?;
                }
                Action::RetryFailed => {
                    if self.dashboard.retry_failed() > 0 {
                        action_tx.send(self.dashboard_changed())?;
                    }
                }
                Action::OpenApp(id) => self.open_app(id),
                _ => {}
            };

            for component in self.components.iter_mut() {
                if let Some(action) = component.update(action.clone())? {
                    action_tx.send(action)?
                };
            }
        }
        Ok(())
    }

    fn dashboard_changed(&self) -> Action {
        Action::DashboardChanged(Box::new(self.dashboard.view()))
    }

    fn open_app(&self, id: &AppId) {
        let Some(navigator) = &self.navigator else {
            warn!(app = %id, "No URL opener available");
            return;
        };
        match open_app(self.dashboard.catalog(), id, navigator) {
            Ok(true) => {}
            Ok(false) => info!(app = %id, "No page configured"),
            Err(err) => error!("Failed to open {id}: {err:#}"),
        }
    }

    fn handle_resize(&mut self, tui: &mut Tui, w: u16, h: u16) -> Result<()> {
        tui.resize(Rect::new(0, 0, w, h))?;
        self.render(tui)?;
        Ok(())
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| {
            // Set uniform background and foreground colors
            frame.render_widget(
                ratatui::widgets::Block::default().style(crate::tui::theme::Theme::default().default),
                frame.area(),
            );

            for component in self.components.iter_mut() {
                if component.is_visible() {
                    if let Err(err) = component.draw(frame, frame.area()) {
                        error!("Failed to draw: {:?}", err);
                    }
                }
            }
        })?;
        Ok(())
    }
}
