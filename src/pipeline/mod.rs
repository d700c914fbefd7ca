//! Pipeline stages for figure extraction and cropping.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rasterizer backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! pdf ──▶ rasterize ──▶ page images ─────────────┐
//!  │      (pdftoppm)                             ▼
//!  └────▶ detect ──▶ load ──▶ scale ──▶ crop ──▶ figs/ caps/ + manifest
//!         (pdffigures2) (records) (72→raster DPI)
//! ```
//!
//! 1. [`rasterize`] — render each page to an image file via `pdftoppm`
//! 2. [`detect`]    — run pdffigures2 against the PDF, producing raw JSON
//! 3. [`load`]      — normalize the two raw JSON shapes into [`crate::figure::Figure`] records
//! 4. [`scale`]     — map 72-DPI detector boxes into the raster's pixel space
//! 5. [`crop`]      — cut region and caption crops out of the page images
//!
//! The whole chain is synchronous and single-threaded: sequential file
//! reads, sequential crops, sequential writes. The only shared state is the
//! result accumulator, owned by the one control thread.

pub mod crop;
pub mod detect;
pub mod load;
pub mod rasterize;
pub mod scale;
