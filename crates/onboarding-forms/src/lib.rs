//! Onboarding forms: PDF overlay engine
//!
//! Stamps employee, benefits and banking data onto fixed-layout I-9, W-4,
//! direct deposit and health insurance templates, and composites a drawn
//! signature to produce the signed copy.
//!
//! - [`registry`]: where every field lives on each template
//! - [`forms`]: turns a [`FormInput`] into [`StampAction`]s (no PDF access)
//! - [`forms::deposit`]: the multi-account direct deposit splitter
//! - [`stamp`]: draws actions onto a template
//! - [`signature`]: signature image and date compositing
//! - [`overlay`]: the engine tying the above together

pub mod actions;
pub mod dates;
pub mod error;
pub mod forms;
pub mod model;
pub mod overlay;
pub mod page;
pub mod registry;
pub mod signature;
pub mod stamp;
pub mod templates;

pub use actions::{Resolution, StampAction, StampKind};
pub use dates::DatePolicy;
pub use error::{ErrorKind, FormError};
pub use model::{FormData, FormInput};
pub use overlay::{DocumentMetadata, EngineConfig, GeneratedDocument, OverlayEngine};
pub use registry::{FieldKey, FieldKind, FieldRegistry, FieldSpec, FormType, Rect, Section};
pub use signature::{SignatureCompositor, SignatureImage};
pub use stamp::StampStyle;
pub use templates::{blank_template, TemplateStore};
