//! Services a button runs against: shared caches and registries plus the
//! host's collaborators (asset loading, fonts, fetching, transport, display).

use crate::config::EngineConfig;
use crate::network::{RemoteFetch, Transport};
use crate::storage::{
    AssetCatalogue, FsImageLoader, ImageCache, ImageLoader, LevelRegistry, PendingImages,
    StaticCatalogue,
};
use crate::types::{ButtonHandle, Marquee};
use crate::ui::raster::Raster;
use crate::ui::text_rasterizing::{BlockShaper, FontResolver, FontTable, TextShaper};
use std::sync::{Arc, Mutex};

/// A finished button image handed to the host
#[derive(Clone, Debug)]
pub struct DisplayFrame {
    pub handle: ButtonHandle,
    /// Handle of the owning page or subpage
    pub parent: u32,
    pub raster: Arc<Raster>,
    pub left: i32,
    pub top: i32,
    pub pass_through: bool,
    /// Marquee settings when the text is scrolled by the host
    pub marquee: Option<Marquee>,
}

impl DisplayFrame {
    pub fn width(&self) -> usize {
        self.raster.width()
    }

    pub fn height(&self) -> usize {
        self.raster.height()
    }
}

pub trait DisplaySink: Send + Sync {
    fn display(&self, frame: DisplayFrame);
}

/// Asks the user for a password out-of-band; the answer comes back through
/// `Button::supply_credential`
pub trait CredentialPrompt: Send + Sync {
    fn request_password(&self, handle: ButtonHandle, level: u8);
}

#[derive(Clone)]
pub struct Services {
    pub config: Arc<EngineConfig>,
    pub images: Arc<ImageCache>,
    pub pending: Arc<PendingImages>,
    pub levels: Arc<LevelRegistry>,
    pub loader: Arc<dyn ImageLoader>,
    pub catalogue: Arc<dyn AssetCatalogue>,
    pub fonts: Arc<dyn FontResolver>,
    pub shaper: Arc<Mutex<Box<dyn TextShaper>>>,
    pub fetcher: Option<Arc<dyn RemoteFetch>>,
    pub transport: Option<Arc<dyn Transport>>,
    pub display: Option<Arc<dyn DisplaySink>>,
    pub prompt: Option<Arc<dyn CredentialPrompt>>,
}

impl Services {
    /// # Arguments
    /// * `config` - Engine configuration; sizes the image cache
    /// * `loader` - Turns asset names into rasters
    /// * `catalogue` - Themed borders, sliders, cursors and icons
    /// * `fonts` - Font ids and files to faces
    /// * `shaper` - Text shaping engine
    pub fn new(
        config: EngineConfig,
        loader: Arc<dyn ImageLoader>,
        catalogue: Arc<dyn AssetCatalogue>,
        fonts: Arc<dyn FontResolver>,
        shaper: Box<dyn TextShaper>,
    ) -> Self {
        Self {
            images: Arc::new(ImageCache::new(config.cache_bytes)),
            pending: Arc::new(PendingImages::new()),
            levels: Arc::new(LevelRegistry::new()),
            config: Arc::new(config),
            loader,
            catalogue,
            fonts,
            shaper: Arc::new(Mutex::new(shaper)),
            fetcher: None,
            transport: None,
            display: None,
            prompt: None,
        }
    }

    /// Files under the configured asset root, an empty catalogue and box glyphs
    pub fn headless(config: EngineConfig) -> Self {
        let loader = Arc::new(FsImageLoader::new(config.asset_root.clone()));
        Self::new(
            config,
            loader,
            Arc::new(StaticCatalogue::new()),
            Arc::new(FontTable::new()),
            Box::new(BlockShaper),
        )
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn RemoteFetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_display(mut self, display: Arc<dyn DisplaySink>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn CredentialPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Default HTTP fetcher using the configured timeout
    #[cfg(feature = "http")]
    pub fn with_http(self) -> crate::error::Result<Self> {
        let fetcher = crate::network::HttpFetcher::new(self.config.fetch_timeout)?;
        Ok(self.with_fetcher(Arc::new(fetcher)))
    }
}
