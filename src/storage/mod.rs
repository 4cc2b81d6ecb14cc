pub mod assets;
pub mod image_cache;
pub mod levels;
pub mod pending;

pub use assets::{
    decode_image, AssetCatalogue, BorderFragments, FsImageLoader, ImageLoader, LineState,
    MaskedAsset, MemoryImages, StaticCatalogue,
};
pub use image_cache::{CacheKind, ImageCache};
pub use levels::{LevelRegistry, LevelSignature, LevelSnapshot, SharedLevelState};
pub use pending::{PendingImages, PendingRemoteImage};
