//! Tag and summary generation logic.
//!
//! Generation is idempotent per article: once tags or a summary exist in the
//! database they are returned as-is and the generator is not called again.

use tracing::info;

use super::generator::{TextGenerator, SUMMARY_PROMPT, TAG_PROMPT};
use super::repository::{SummaryRepository, TagRepository};
use super::types::{Summary, Tag};
use crate::db::Database;
use crate::feed::{Article, ArticleRepository};
use crate::{CatnewsError, Result};

/// Service for article enrichment.
pub struct EnrichService<'a> {
    db: &'a Database,
    generator: &'a dyn TextGenerator,
}

impl<'a> EnrichService<'a> {
    /// Create a new EnrichService over the given database and generator.
    pub fn new(db: &'a Database, generator: &'a dyn TextGenerator) -> Self {
        Self { db, generator }
    }

    /// Get or generate both tags and summary of an article.
    pub async fn enrich(&self, article_id: i64) -> Result<(Vec<Tag>, Summary)> {
        let tags = self.tags_for_article(article_id).await?;
        let summary = self.summary_for_article(article_id).await?;
        Ok((tags, summary))
    }

    /// Get or generate the tags of an article.
    pub async fn tags_for_article(&self, article_id: i64) -> Result<Vec<Tag>> {
        let article = self.get_article(article_id).await?;
        let tags = TagRepository::new(self.db.pool());

        let existing = tags.list_for_article(article.id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let prompt = format!("{TAG_PROMPT} {}", article_text(&article));
        let response = self.generator.generate(&prompt).await?;

        let names = split_tags(&response);
        if names.is_empty() {
            return Err(CatnewsError::Generation(
                "empty tag response".to_string(),
            ));
        }
        info!("Generated tags for article {}", article.id);

        let mut result = Vec::new();
        for name in names {
            let tag = tags.get_or_create(&name).await?;
            tags.attach(article.id, tag.id).await?;
            result.push(tag);
        }

        Ok(result)
    }

    /// Get or generate the summary of an article.
    pub async fn summary_for_article(&self, article_id: i64) -> Result<Summary> {
        let article = self.get_article(article_id).await?;
        let summaries = SummaryRepository::new(self.db.pool());

        if let Some(summary) = summaries.get_for_article(article.id).await? {
            return Ok(summary);
        }

        let prompt = format!("{SUMMARY_PROMPT} {}", article_text(&article));
        let response = self.generator.generate(&prompt).await?;

        let content = response.trim();
        if content.is_empty() {
            return Err(CatnewsError::Generation(
                "empty summary response".to_string(),
            ));
        }
        info!("Generated summary for article {}", article.id);

        summaries.create_or_keep(article.id, content).await
    }

    async fn get_article(&self, article_id: i64) -> Result<Article> {
        ArticleRepository::new(self.db.pool())
            .get_by_id(article_id)
            .await?
            .ok_or_else(|| CatnewsError::NotFound("article".to_string()))
    }
}

/// Text sent to the generator: the content when present, the title otherwise.
fn article_text(article: &Article) -> &str {
    match &article.content {
        Some(content) if !content.is_empty() => content,
        _ => &article.title,
    }
}

/// Split a comma-separated tag response into cleaned names.
fn split_tags(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedRepository, NewArticle, NewFeed};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator returning a fixed response and counting calls.
    struct StubGenerator {
        response: String,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextGenerator for StubGenerator {
        fn generate<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(self.response.clone()) })
        }
    }

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let feed = FeedRepository::new(db.pool())
            .get_or_create(&NewFeed::new("F", "https://x.test/rss"))
            .await
            .unwrap();
        let article = ArticleRepository::new(db.pool())
            .store_in_feed(
                feed.id,
                &NewArticle::new("A", "https://x.test/a").with_content("cat content"),
            )
            .await
            .unwrap()
            .unwrap();
        (db, article.id)
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("cats, news, rss"), vec!["cats", "news", "rss"]);
        assert_eq!(split_tags(" a ,, b "), vec!["a", "b"]);
        assert!(split_tags("  ,  ").is_empty());
    }

    #[tokio::test]
    async fn test_tags_generated_once() {
        let (db, article_id) = setup().await;
        let generator = StubGenerator::new("cats, pets, news");
        let service = EnrichService::new(&db, &generator);

        let tags = service.tags_for_article(article_id).await.unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].name, "cats");

        // Second call reads from the database
        let again = service.tags_for_article(article_id).await.unwrap();
        assert_eq!(again, tags);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_summary_generated_once() {
        let (db, article_id) = setup().await;
        let generator = StubGenerator::new("  A summary.  ");
        let service = EnrichService::new(&db, &generator);

        let summary = service.summary_for_article(article_id).await.unwrap();
        assert_eq!(summary.content, "A summary.");

        let again = service.summary_for_article(article_id).await.unwrap();
        assert_eq!(again, summary);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_enrich_twice_generates_once_per_half() {
        let (db, article_id) = setup().await;
        let generator = StubGenerator::new("cats, pets");
        let service = EnrichService::new(&db, &generator);

        let (tags, summary) = service.enrich(article_id).await.unwrap();
        assert_eq!(tags.len(), 2);

        let (again_tags, again_summary) = service.enrich(article_id).await.unwrap();
        assert_eq!(again_tags, tags);
        assert_eq!(again_summary, summary);
        // One call for tags, one for the summary
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_article_is_not_found() {
        let (db, _) = setup().await;
        let generator = StubGenerator::new("x");
        let service = EnrichService::new(&db, &generator);

        assert!(matches!(
            service.tags_for_article(999).await,
            Err(CatnewsError::NotFound(_))
        ));
        assert!(matches!(
            service.summary_for_article(999).await,
            Err(CatnewsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_generator_output_is_an_error() {
        let (db, article_id) = setup().await;
        let generator = StubGenerator::new("   ");
        let service = EnrichService::new(&db, &generator);

        assert!(matches!(
            service.tags_for_article(article_id).await,
            Err(CatnewsError::Generation(_))
        ));
        assert!(matches!(
            service.summary_for_article(article_id).await,
            Err(CatnewsError::Generation(_))
        ));

        // Nothing was stored; a working generator succeeds afterwards
        let generator = StubGenerator::new("cats, news");
        let service = EnrichService::new(&db, &generator);
        let (tags, summary) = service.enrich(article_id).await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(summary.content, "cats, news");
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        struct FailingGenerator;
        impl TextGenerator for FailingGenerator {
            fn generate<'a>(
                &'a self,
                _prompt: &'a str,
            ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
                Box::pin(async { Err(CatnewsError::Generation("service down".to_string())) })
            }
        }

        let (db, article_id) = setup().await;
        let generator = FailingGenerator;
        let service = EnrichService::new(&db, &generator);

        assert!(matches!(
            service.tags_for_article(article_id).await,
            Err(CatnewsError::Generation(_))
        ));
    }
}
