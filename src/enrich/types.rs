//! Tag and summary types.

/// A tag attached to articles. Names are unique; tags are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Unique tag ID.
    pub id: i64,
    /// Tag name.
    pub name: String,
}

/// A generated summary of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Unique summary ID.
    pub id: i64,
    /// Summarized article.
    pub article_id: i64,
    /// Summary text.
    pub content: String,
}
