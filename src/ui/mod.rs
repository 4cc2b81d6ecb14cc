pub mod bargraph;
pub mod border;
pub mod chameleon;
pub mod compositing;
pub mod drawing;
pub mod effects;
pub mod position;
pub mod raster;
pub mod text_rasterizing;
pub mod theme;

pub use border::{AssetAccess, BorderInsets};
pub use compositing::{render_bargraph, render_instance, render_joystick, Composed, RenderContext};
pub use raster::Raster;
pub use text_rasterizing::{BlockShaper, FontFace, FontResolver, FontTable, TextRenderer, TextShaper};
