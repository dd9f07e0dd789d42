//! Chat command parsing.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Subscribe to a feed URL.
    Subscribe { url: String },
    /// Unsubscribe from a feed URL.
    Unsubscribe { url: String },
    /// List subscribed feeds.
    List,
    /// Show a page of articles (1-based).
    News { page: i64 },
    /// Enrich the article referenced by the replied-to message.
    Cat,
    /// Show usage help.
    Usage,
}

impl BotCommand {
    /// Parse a chat message into a command. Returns None for anything that
    /// is not a command.
    pub fn parse(input: &str) -> Option<BotCommand> {
        let mut words = input.split_whitespace();
        let keyword = words.next()?;

        match keyword {
            "sub" => {
                let url = words.next()?;
                Some(BotCommand::Subscribe {
                    url: url.to_string(),
                })
            }
            "unsub" => {
                let url = words.next()?;
                Some(BotCommand::Unsubscribe {
                    url: url.to_string(),
                })
            }
            "list" => Some(BotCommand::List),
            "news" => {
                let page = words
                    .next()
                    .and_then(|w| w.parse::<i64>().ok())
                    .unwrap_or(1)
                    .max(1);
                Some(BotCommand::News { page })
            }
            "cat" => Some(BotCommand::Cat),
            "usage" | "help" => Some(BotCommand::Usage),
            _ => None,
        }
    }
}
