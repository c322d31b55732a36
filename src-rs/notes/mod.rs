pub mod images;
pub mod store;

pub use images::ImageStore;
pub use store::{validate_note_id, Note, NoteMeta, NoteStore};
