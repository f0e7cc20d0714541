mod walk;

pub use walk::{collect_matching_files, IndexedFile, WalkStats};
