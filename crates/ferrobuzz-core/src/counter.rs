//! Ticker mention counting over forum posts and comments.
//!
//! Posts are kept when their flair is `Discussion` or `DD` (any case).
//! Comments only count when their parent post was kept. Every occurrence of
//! a watched symbol in a post title, post body or comment body adds one
//! mention on the UTC day the text was created.
//!
//! Matching is exact and case-sensitive against the upper-case symbol, so
//! the word "it" is never a mention of `IT`, while `$IT` and `IT.` are.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{MentionTable, PipelineError, Symbol, TradeDate, ValidationError};

const TRACKED_FLAIRS: [&str; 2] = ["discussion", "dd"];

#[derive(Debug, Deserialize)]
struct PostRow {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    flair: Option<String>,
    created_utc: f64,
}

#[derive(Debug, Deserialize)]
struct CommentRow {
    post_id: String,
    #[serde(default)]
    body: String,
    created_utc: f64,
}

/// Row counts seen while building a mention table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    pub posts_read: usize,
    pub posts_kept: usize,
    pub comments_read: usize,
    pub comments_kept: usize,
    pub mentions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCount {
    pub table: MentionTable,
    pub summary: CountSummary,
}

/// Whether a post flair is one of the tracked discussion flairs.
pub fn is_tracked_flair(flair: &str) -> bool {
    let flair = flair.trim();
    TRACKED_FLAIRS
        .iter()
        .any(|tracked| flair.eq_ignore_ascii_case(tracked))
}

/// Split text into candidate ticker tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split(|ch: char| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '$' | '-')))
        .map(|token| {
            let token = token.strip_prefix('$').unwrap_or(token);
            token.trim_end_matches('.')
        })
        .filter(|token| !token.is_empty())
}

fn day_of(created_utc: f64) -> Result<TradeDate, ValidationError> {
    if !created_utc.is_finite() {
        return Err(ValidationError::NonFiniteValue {
            field: "created_utc",
        });
    }
    TradeDate::from_unix_timestamp(created_utc.floor() as i64)
}

/// Counts watch-list mentions per `(symbol, day)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCounter {
    watch_list: BTreeMap<String, Symbol>,
}

impl MentionCounter {
    pub fn new(watch_list: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            watch_list: watch_list
                .into_iter()
                .map(|symbol| (symbol.as_str().to_owned(), symbol))
                .collect(),
        }
    }

    pub fn watch_list(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.watch_list.values()
    }

    /// Watched symbols mentioned in `text`, once per occurrence.
    pub fn mentions_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a Symbol> + 'a {
        tokenize(text).filter_map(|token| self.watch_list.get(token))
    }

    fn record(
        &self,
        table: &mut MentionTable,
        date: TradeDate,
        text: &str,
    ) -> Result<u64, ValidationError> {
        let mut found = 0;
        for symbol in self.mentions_in(text) {
            table.add(symbol.clone(), date, 1)?;
            found += 1;
        }
        Ok(found)
    }

    /// Count mentions from CSV readers. `comments` may be omitted.
    pub fn count<P: Read, C: Read>(
        &self,
        posts: P,
        comments: Option<C>,
    ) -> Result<MentionCount, PipelineError> {
        let mut table = MentionTable::new();
        let mut summary = CountSummary::default();
        let mut kept_posts = HashSet::new();

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(posts);
        for row in reader.deserialize() {
            let post: PostRow = row?;
            summary.posts_read += 1;
            if !post.flair.as_deref().is_some_and(is_tracked_flair) {
                continue;
            }

            let date = day_of(post.created_utc)?;
            summary.posts_kept += 1;
            summary.mentions += self.record(&mut table, date, &post.title)?;
            summary.mentions += self.record(&mut table, date, &post.body)?;
            kept_posts.insert(post.id);
        }
        debug!(read = summary.posts_read, kept = summary.posts_kept, "scanned posts");

        if let Some(comments) = comments {
            let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(comments);
            for row in reader.deserialize() {
                let comment: CommentRow = row?;
                summary.comments_read += 1;
                if !kept_posts.contains(&comment.post_id) {
                    continue;
                }

                let date = day_of(comment.created_utc)?;
                summary.comments_kept += 1;
                summary.mentions += self.record(&mut table, date, &comment.body)?;
            }
            debug!(
                read = summary.comments_read,
                kept = summary.comments_kept,
                "scanned comments"
            );
        }

        Ok(MentionCount { table, summary })
    }

    pub fn count_files(
        &self,
        posts: &Path,
        comments: Option<&Path>,
    ) -> Result<MentionCount, PipelineError> {
        let open = |path: &Path| {
            File::open(path).map_err(|error| {
                PipelineError::missing(format!("'{}' could not be opened: {error}", path.display()))
            })
        };

        let posts_file = open(posts)?;
        let comments_file = comments.map(open).transpose()?;
        let count = self.count(posts_file, comments_file)?;

        info!(
            posts = %posts.display(),
            watched = self.watch_list.len(),
            posts_kept = count.summary.posts_kept,
            comments_kept = count.summary.comments_kept,
            mentions = count.summary.mentions,
            "counted mentions"
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(symbols: &str) -> MentionCounter {
        MentionCounter::new(Symbol::parse_list(symbols).expect("valid watch-list"))
    }

    #[test]
    fn tokenizer_strips_cashtags_and_trailing_dots() {
        let tokens = tokenize("Bought $GME, then AMC... BRK.B too!").collect::<Vec<_>>();
        assert_eq!(tokens, vec!["Bought", "GME", "then", "AMC", "BRK.B", "too"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let counter = counter("IT,GME");
        let found = counter
            .mentions_in("is it IT or gme or $GME")
            .map(Symbol::as_str)
            .collect::<Vec<_>>();
        assert_eq!(found, vec!["IT", "GME"]);
    }

    #[test]
    fn recognizes_tracked_flairs_in_any_case() {
        assert!(is_tracked_flair("DD"));
        assert!(is_tracked_flair(" discussion "));
        assert!(!is_tracked_flair("Meme"));
        assert!(!is_tracked_flair(""));
    }

    #[test]
    fn counts_kept_posts_and_their_comments() {
        // 2021-01-27T00:00:00Z and 2021-01-28T12:00:00Z
        let posts = "id,title,body,flair,created_utc\n\
p1,GME to the moon,GME GME,DD,1611705600\n\
p2,AMC,AMC,Meme,1611705600\n\
p3,AMC squeeze,,Discussion,1611835200.5\n";
        let comments = "id,post_id,body,created_utc\n\
c1,p1,$GME and AMC,1611835200\n\
c2,p2,GME,1611835200\n";

        let count = counter("GME,AMC")
            .count(posts.as_bytes(), Some(comments.as_bytes()))
            .expect("count should succeed");

        let gme = Symbol::parse("GME").expect("valid");
        let amc = Symbol::parse("AMC").expect("valid");
        let jan27 = TradeDate::parse("2021-01-27").expect("valid");
        let jan28 = TradeDate::parse("2021-01-28").expect("valid");

        assert_eq!(count.table.count(&gme, jan27), 3);
        assert_eq!(count.table.count(&gme, jan28), 1);
        assert_eq!(count.table.count(&amc, jan28), 2);
        assert_eq!(
            count.summary,
            CountSummary {
                posts_read: 3,
                posts_kept: 2,
                comments_read: 2,
                comments_kept: 1,
                mentions: 6,
            }
        );
    }

    #[test]
    fn posts_without_flair_are_skipped() {
        let posts = "id,title,body,flair,created_utc\np1,GME,GME,,1611705600\n";
        let count = counter("GME")
            .count(posts.as_bytes(), None::<&[u8]>)
            .expect("count should succeed");
        assert!(count.table.is_empty());
        assert_eq!(count.summary.posts_kept, 0);
    }
}
