//! Chat command execution.

use tracing::warn;

use super::command::BotCommand;
use crate::config::BotConfig;
use crate::db::{Database, UserRepository};
use crate::enrich::{EnrichService, TextGenerator};
use crate::feed::{Article, ArticleRepository, FeedFetcher, FeedService};
use crate::CatnewsError;

const USAGE: &str = "Commands:\n\
    sub <url> - subscribe to a feed\n\
    unsub <url> - unsubscribe from a feed\n\
    list - show your subscriptions\n\
    news [page] - show your latest articles\n\
    cat - reply to an article message to get tags and a summary\n\
    usage - show this help";

const NOT_LINKED: &str =
    "Your chat account is not linked to a catnews account. Log in with your chat provider first.";

/// An incoming chat message.
pub struct BotMessage<'a> {
    /// External chat id of the author.
    pub external_id: &'a str,
    /// Message text.
    pub text: &'a str,
    /// Text of the message this one replies to, if any.
    pub replied_to: Option<&'a str>,
}

/// Executes chat commands against the catnews services.
pub struct BotHandler<'a> {
    db: &'a Database,
    fetcher: &'a dyn FeedFetcher,
    generator: &'a dyn TextGenerator,
    config: &'a BotConfig,
}

impl<'a> BotHandler<'a> {
    /// Create a new BotHandler.
    pub fn new(
        db: &'a Database,
        fetcher: &'a dyn FeedFetcher,
        generator: &'a dyn TextGenerator,
        config: &'a BotConfig,
    ) -> Self {
        Self {
            db,
            fetcher,
            generator,
            config,
        }
    }

    /// Handle an incoming message and produce the reply text.
    ///
    /// Messages that are not commands get no reply.
    pub async fn handle(&self, message: &BotMessage<'_>) -> Option<String> {
        let command = BotCommand::parse(message.text)?;

        if let BotCommand::Usage = command {
            return Some(USAGE.to_string());
        }

        let user = match UserRepository::new(self.db.pool())
            .get_by_discord_id(message.external_id)
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => return Some(NOT_LINKED.to_string()),
            Err(e) => {
                warn!("Failed to resolve chat user {}: {}", message.external_id, e);
                return Some(render_error(&e));
            }
        };

        let reply = match command {
            BotCommand::Subscribe { url } => self.subscribe(user.id, &url).await,
            BotCommand::Unsubscribe { url } => self.unsubscribe(user.id, &url).await,
            BotCommand::List => self.list(user.id).await,
            BotCommand::News { page } => self.news(user.id, page).await,
            BotCommand::Cat => self.cat(message.replied_to).await,
            BotCommand::Usage => Ok(USAGE.to_string()),
        };

        Some(reply.unwrap_or_else(|e| render_error(&e)))
    }

    async fn subscribe(&self, user_id: i64, url: &str) -> crate::Result<String> {
        let feed = FeedService::new(self.db, self.fetcher)
            .subscribe(user_id, url)
            .await?;
        Ok(format!("Subscribed to {}", feed.title))
    }

    async fn unsubscribe(&self, user_id: i64, url: &str) -> crate::Result<String> {
        let feed = FeedService::new(self.db, self.fetcher)
            .unsubscribe(user_id, url)
            .await?;
        Ok(format!("Unsubscribed from {}", feed.title))
    }

    async fn list(&self, user_id: i64) -> crate::Result<String> {
        let feeds = FeedService::new(self.db, self.fetcher)
            .list_subscriptions(user_id)
            .await?;

        if feeds.is_empty() {
            return Ok("You have no subscriptions. Use `sub <url>` to add one.".to_string());
        }

        let lines: Vec<String> = feeds
            .iter()
            .map(|f| format!("- {} ({})", f.title, f.url))
            .collect();
        Ok(lines.join("\n"))
    }

    async fn news(&self, user_id: i64, page: i64) -> crate::Result<String> {
        let size = self.config.news_page_size;
        let skip = (page - 1) * size;

        let articles = FeedService::new(self.db, self.fetcher)
            .list_articles(user_id, skip, size)
            .await?;

        if articles.is_empty() {
            return Ok("No articles on that page.".to_string());
        }

        let lines: Vec<String> = articles
            .iter()
            .map(|a| format!("{}\n{}", a.title, a.url))
            .collect();
        Ok(lines.join("\n\n"))
    }

    async fn cat(&self, replied_to: Option<&str>) -> crate::Result<String> {
        let replied_to = match replied_to {
            Some(text) => text,
            None => {
                return Ok(
                    "Reply to a message containing an article link with `cat`.".to_string(),
                )
            }
        };

        let article = match self.find_article(replied_to).await? {
            Some(article) => article,
            None => return Ok("I don't know any article in that message.".to_string()),
        };

        let (tags, summary) = EnrichService::new(self.db, self.generator)
            .enrich(article.id)
            .await?;

        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        Ok(format!(
            "Tags: {}\nSummary: {}",
            names.join(", "),
            summary.content
        ))
    }

    /// Find the stored article whose URL appears in the given text.
    async fn find_article(&self, text: &str) -> crate::Result<Option<Article>> {
        let url = match extract_url(text) {
            Some(url) => url,
            None => return Ok(None),
        };

        ArticleRepository::new(self.db.pool()).get_by_url(url).await
    }
}

/// Pick the first http(s) URL out of a message, trimming trailing punctuation.
fn extract_url(text: &str) -> Option<&str> {
    let token = text
        .split_whitespace()
        .find(|w| w.starts_with("http://") || w.starts_with("https://"))?;
    Some(token.trim_end_matches(|c| matches!(c, '.' | ',' | ')' | '>' | '!' | '?')))
}

fn render_error(error: &CatnewsError) -> String {
    match error {
        CatnewsError::Fetch(_) => "Could not fetch that feed.".to_string(),
        CatnewsError::NotFound(what) if what == "subscription" => {
            "You are not subscribed to that URL.".to_string()
        }
        CatnewsError::NotFound(_) => "Not found.".to_string(),
        CatnewsError::Generation(_) => "Text generation is unavailable right now.".to_string(),
        _ => "Something went wrong, please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::feed::{ParsedEntry, ParsedFeed};
    use crate::Result;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;

    struct StubFetcher {
        feeds: HashMap<String, ParsedFeed>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                feeds: HashMap::new(),
            }
        }

        fn with_feed(mut self, url: &str, title: &str, entries: Vec<ParsedEntry>) -> Self {
            self.feeds.insert(
                url.to_string(),
                ParsedFeed {
                    title: title.to_string(),
                    entries,
                },
            );
            self
        }
    }

    impl FeedFetcher for StubFetcher {
        fn fetch<'a>(
            &'a self,
            url: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<ParsedFeed>> + Send + 'a>> {
            Box::pin(async move {
                self.feeds
                    .get(url)
                    .cloned()
                    .ok_or_else(|| CatnewsError::Fetch(format!("unreachable: {url}")))
            })
        }
    }

    struct StubGenerator;

    impl TextGenerator for StubGenerator {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            let response = if prompt.starts_with("Generate") {
                "cats, news, rss"
            } else {
                "A short summary."
            };
            Box::pin(async move { Ok(response.to_string()) })
        }
    }

    fn entry(title: &str, url: &str) -> ParsedEntry {
        ParsedEntry {
            title: title.to_string(),
            url: url.to_string(),
            content: Some(format!("content of {title}")),
            published_at: None,
        }
    }

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@x.com", "h"))
            .await
            .unwrap();
        UserRepository::new(db.pool())
            .set_discord_id(user.id, "chat-1")
            .await
            .unwrap();
        db
    }

    fn message<'a>(text: &'a str) -> BotMessage<'a> {
        BotMessage {
            external_id: "chat-1",
            text,
            replied_to: None,
        }
    }

    #[tokio::test]
    async fn test_usage_needs_no_account() {
        let db = setup().await;
        let fetcher = StubFetcher::new();
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        let reply = handler
            .handle(&BotMessage {
                external_id: "stranger",
                text: "usage",
                replied_to: None,
            })
            .await
            .unwrap();
        assert!(reply.contains("sub <url>"));
    }

    #[tokio::test]
    async fn test_unknown_account_is_told_to_link() {
        let db = setup().await;
        let fetcher = StubFetcher::new();
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        let reply = handler
            .handle(&BotMessage {
                external_id: "stranger",
                text: "list",
                replied_to: None,
            })
            .await
            .unwrap();
        assert!(reply.contains("not linked"));
    }

    #[tokio::test]
    async fn test_non_command_gets_no_reply() {
        let db = setup().await;
        let fetcher = StubFetcher::new();
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        assert!(handler.handle(&message("good morning")).await.is_none());
    }

    #[tokio::test]
    async fn test_sub_list_unsub_flow() {
        let db = setup().await;
        let fetcher = StubFetcher::new().with_feed(
            "https://x.test/rss",
            "Cat News",
            vec![entry("A", "https://x.test/a")],
        );
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        let reply = handler
            .handle(&message("sub https://x.test/rss"))
            .await
            .unwrap();
        assert_eq!(reply, "Subscribed to Cat News");

        let reply = handler.handle(&message("list")).await.unwrap();
        assert!(reply.contains("Cat News"));
        assert!(reply.contains("https://x.test/rss"));

        let reply = handler
            .handle(&message("unsub https://x.test/rss"))
            .await
            .unwrap();
        assert_eq!(reply, "Unsubscribed from Cat News");

        let reply = handler.handle(&message("list")).await.unwrap();
        assert!(reply.contains("no subscriptions"));
    }

    #[tokio::test]
    async fn test_sub_unreachable_feed() {
        let db = setup().await;
        let fetcher = StubFetcher::new();
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        let reply = handler
            .handle(&message("sub https://down.test/rss"))
            .await
            .unwrap();
        assert_eq!(reply, "Could not fetch that feed.");
    }

    #[tokio::test]
    async fn test_unsub_without_subscription() {
        let db = setup().await;
        let fetcher = StubFetcher::new();
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        let reply = handler
            .handle(&message("unsub https://x.test/rss"))
            .await
            .unwrap();
        assert_eq!(reply, "You are not subscribed to that URL.");
    }

    #[tokio::test]
    async fn test_news_pagination() {
        let db = setup().await;
        let fetcher = StubFetcher::new().with_feed(
            "https://x.test/rss",
            "Cat News",
            vec![
                entry("A", "https://x.test/a"),
                entry("B", "https://x.test/b"),
                entry("C", "https://x.test/c"),
                entry("D", "https://x.test/d"),
            ],
        );
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        handler
            .handle(&message("sub https://x.test/rss"))
            .await
            .unwrap();

        // Three per page, fourth article on the second page
        let page1 = handler.handle(&message("news")).await.unwrap();
        assert_eq!(page1.matches("https://x.test/").count(), 3);

        let page2 = handler.handle(&message("news 2")).await.unwrap();
        assert_eq!(page2.matches("https://x.test/").count(), 1);

        let page3 = handler.handle(&message("news 3")).await.unwrap();
        assert_eq!(page3, "No articles on that page.");
    }

    #[tokio::test]
    async fn test_cat_enriches_replied_article() {
        let db = setup().await;
        let fetcher = StubFetcher::new().with_feed(
            "https://x.test/rss",
            "Cat News",
            vec![entry("A", "https://x.test/a")],
        );
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        handler
            .handle(&message("sub https://x.test/rss"))
            .await
            .unwrap();

        let reply = handler
            .handle(&BotMessage {
                external_id: "chat-1",
                text: "cat",
                replied_to: Some("A\nhttps://x.test/a"),
            })
            .await
            .unwrap();
        assert!(reply.contains("Tags: cats, news, rss"));
        assert!(reply.contains("Summary: A short summary."));
    }

    #[tokio::test]
    async fn test_cat_without_reply_or_article() {
        let db = setup().await;
        let fetcher = StubFetcher::new();
        let generator = StubGenerator;
        let config = BotConfig::default();
        let handler = BotHandler::new(&db, &fetcher, &generator, &config);

        let reply = handler.handle(&message("cat")).await.unwrap();
        assert!(reply.contains("Reply to a message"));

        let reply = handler
            .handle(&BotMessage {
                external_id: "chat-1",
                text: "cat",
                replied_to: Some("no link here"),
            })
            .await
            .unwrap();
        assert!(reply.contains("don't know any article"));

        let reply = handler
            .handle(&BotMessage {
                external_id: "chat-1",
                text: "cat",
                replied_to: Some("see https://x.test/unknown"),
            })
            .await
            .unwrap();
        assert!(reply.contains("don't know any article"));
    }

    #[test]
    fn test_extract_url() {
        assert_eq!(
            extract_url("read this: https://x.test/a."),
            Some("https://x.test/a")
        );
        assert_eq!(
            extract_url("two http://a.test/1 https://b.test/2"),
            Some("http://a.test/1")
        );
        assert_eq!(extract_url("no links"), None);
    }
}
