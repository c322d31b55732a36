pub mod core_util;
pub mod note_core;

pub use note_core::NoteCore;
