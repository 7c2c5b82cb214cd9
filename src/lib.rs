#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod layout;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod workflow;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use diagram::{Diagram, DiagramError, Link, Node};
pub use layout::{SankeyLayout, compute_layout};
pub use render::render_svg;
pub use theme::Theme;
pub use workflow::build_diagram;
