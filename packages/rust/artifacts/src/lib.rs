//! Stateless renderers for synthesized modules.
//!
//! - [`render_slides`] turns a [`Module`](trainforge_shared::Module) into
//!   numbered slide descriptors
//! - [`render_manual`] turns it into numbered manual pages, and
//!   [`manual_to_markdown`] joins those pages into one Markdown document
//!
//! Renderers only lay out what the module already contains.

pub mod manual;
pub mod slides;

pub use manual::{ManualSection, manual_to_markdown, render_manual};
pub use slides::{NEXT_STEPS, Slide, SlideContent, key_takeaways, render_slides};
