use crate::catalog::Catalog;
use eyre::{
    Context as _,
    OptionExt as _,
    Result,
};
use lens_apps_stats_config::AppId;
use std::{
    path::PathBuf,
    process::{
        Command,
        ExitStatus,
        Stdio,
    },
    thread::{
        self,
        JoinHandle,
    },
};
use url::Url;

pub trait Navigator {
    fn open(&self, url: &Url) -> Result<()>;
}

/// Hands URLs to the desktop's opener (`xdg-open` or `open`).
#[derive(Debug, Clone)]
pub struct SystemNavigator {
    opener: PathBuf,
}

impl SystemNavigator {
    const OPENERS: [&'static str; 2] = ["xdg-open", "open"];

    pub fn detect() -> Result<Self> {
        let opener = Self::OPENERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_eyre("Neither xdg-open nor open found in PATH")?;
        debug!(opener = %opener.display(), "Detected URL opener");
        Ok(Self { opener })
    }

    pub fn with_opener(opener: impl Into<PathBuf>) -> Self {
        Self { opener: opener.into() }
    }

    /// Starts the opener and waits for it on a background thread so it never lingers as a zombie.
    fn launch(&self, url: &Url) -> Result<JoinHandle<Option<ExitStatus>>> {
        let mut child = Command::new(&self.opener)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .wrap_err_with(|| format!("Failed to open {url}"))?;

        let opener = self.opener.clone();
        let url = url.clone();
        thread::Builder::new()
            .name("url-opener".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => {
                    if !status.success() {
                        warn!(opener = %opener.display(), %url, %status, "URL opener failed");
                    }
                    Some(status)
                }
                Err(err) => {
                    warn!(opener = %opener.display(), %url, "Failed to wait for URL opener: {err}");
                    None
                }
            })
            .wrap_err("Failed to start the URL opener thread")
    }
}

impl Navigator for SystemNavigator {
    fn open(&self, url: &Url) -> Result<()> {
        self.launch(url)?;
        Ok(())
    }
}

/// Opens the page of `id`. Returns `false` when the app has nowhere to go.
pub fn open_app(catalog: &Catalog, id: &AppId, navigator: &dyn Navigator) -> Result<bool> {
    let Some(url) = catalog.navigation_target(id) else {
        debug!(app = %id, "No page to open");
        return Ok(false);
    };
    info!(app = %id, %url, "Opening app page");
    navigator.open(url)?;
    Ok(true)
}
