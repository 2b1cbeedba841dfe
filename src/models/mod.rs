mod component_metadata;
mod dialog;
mod hcn;
mod ner;

pub use self::component_metadata::*;
pub use self::dialog::*;
pub use self::hcn::*;
pub use self::ner::*;
