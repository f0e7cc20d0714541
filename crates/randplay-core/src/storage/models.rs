/// A persisted extension filter preference.
#[derive(Debug, Clone)]
pub struct ExtensionItem {
    pub name: String,
    pub added_at: String,
}
