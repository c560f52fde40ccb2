//! Generated short metadata and its length contracts.
//!
//! The hosting service enforces hard limits on titles, tags and
//! descriptions. These helpers are pure so the contracts can be checked
//! independently of whichever generator produced the draft.

use serde::{Deserialize, Serialize};

use crate::text::{char_len, truncate_chars};

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum number of tags attached to a short.
pub const MAX_TAGS: usize = 28;

/// Maximum length of the comma+space joined tag list, in characters.
pub const TAG_BUDGET_CHARS: usize = 500;

/// Separator used when the hosting service measures the tag list.
pub const TAG_SEPARATOR: &str = ", ";

/// Lower bound of the description length contract.
pub const DESCRIPTION_MIN_CHARS: usize = 4000;

/// Upper bound of the description length contract.
pub const DESCRIPTION_MAX_CHARS: usize = 4500;

const ELLIPSIS: &str = "...";

const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// Appended once when a description is under the minimum length.
const DESCRIPTION_FILLER: &str = r#"


🔥 Thanks for stopping by! 🔥

This short was cut from a longer video by an automated pipeline that listens for the moments people replay, quote and send to their friends. Every clip is scored for energy, emotion and shareability before it ever reaches this channel.

✨ Why this clip made the cut:
• It lands in seconds, no setup needed
• It carries a real reaction, not a scripted one
• It is the part everyone skips back to watch again
• It works with the sound on or off

📱 If it made you react:
• LIKE it so more people get to see it
• SUBSCRIBE for a new short every day
• SHARE it with the friend who needs it
• COMMENT with your favourite second
• TURN ON notifications so you never miss a drop

🎯 What we are building:
A channel that saves you the hours of scrolling. We watch the long videos so you get the best thirty seconds, trimmed, framed and ready to watch anywhere.

🚀 Be part of it:
Every view and every comment tells us which moments matter to you. The community decides what we make next, so keep the suggestions coming!

🌟 Under the hood:
The selection process weighs pacing, emotional intensity, surprise, humour and how quotable a line is. The clips that score highest across the board are the ones you see here.

🎬 Coming up next:
There are plenty more moments queued up. Subscribe and hit the bell so the next one finds you first!

#Shorts #Viral #Trending #MustWatch #Entertainment #Highlights #Clips #BestMoments #Reaction #Funny #Amazing #Epic #Wow #Daily #NewVideo #Subscribe #Like #Share #Comment #Community
"#;

/// Appended repeatedly until the description reaches the minimum length.
const DESCRIPTION_HASHTAG_FILLER: &str = " #Shorts #Viral #Trending #YouTube #MustWatch #Amazing #Awesome #Epic #Incredible #Highlights #Clips #BestMoments #Reaction #Funny #Wow #Daily #Subscribe #Like #Share #Comment #Follow #Community #Creator #Channel #Video #Short #Clip #Moment";

/// Upper bound on hashtag filler rounds; far more than needed to cover the
/// minimum from an empty draft.
const MAX_FILLER_ROUNDS: usize = 64;

/// Title, description and tags for a short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResult {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl MetadataResult {
    /// Apply the title and tag contracts.
    ///
    /// The description is left as drafted; it is normalized right before
    /// upload with [`normalize_description`].
    pub fn enforce_limits(mut self) -> Self {
        self.title = truncate_title(&self.title);
        self.tags = fit_tags_to_budget(self.tags);
        self
    }

    /// Length of the tag list as the hosting service measures it.
    pub fn joined_tags_len(&self) -> usize {
        joined_len(&self.tags)
    }
}

/// Clamp a title to [`MAX_TITLE_CHARS`] without leaving a broken tail.
///
/// Truncation happens on character boundaries; dangling whitespace and a
/// trailing zero-width joiner (half of a combined emoji) are dropped.
pub fn truncate_title(title: &str) -> String {
    if char_len(title) <= MAX_TITLE_CHARS {
        return title.to_string();
    }

    let truncated = truncate_chars(title, MAX_TITLE_CHARS);
    truncated
        .trim_end_matches(|c: char| c.is_whitespace() || c == ZERO_WIDTH_JOINER)
        .to_string()
}

/// Keep the first [`MAX_TAGS`] tags, then drop trailing tags until the
/// joined list fits in [`TAG_BUDGET_CHARS`].
///
/// Order is preserved and tags are never cut in half.
pub fn fit_tags_to_budget(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags.into_iter().take(MAX_TAGS).collect();
    if joined_len(&tags) <= TAG_BUDGET_CHARS {
        return tags;
    }

    let separator_len = char_len(TAG_SEPARATOR);
    let mut used = 0usize;
    let mut keep = 0usize;
    for tag in &tags {
        let cost = if keep == 0 {
            char_len(tag)
        } else {
            char_len(tag) + separator_len
        };
        if used + cost > TAG_BUDGET_CHARS {
            break;
        }
        used += cost;
        keep += 1;
    }

    tags.truncate(keep);
    tags
}

/// Force a description into `[DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS]`.
///
/// Short drafts get the filler block and then hashtag filler until they
/// reach the minimum; anything over the maximum is cut and marked with an
/// ellipsis.
pub fn normalize_description(draft: &str) -> String {
    let mut description = draft.to_string();
    let mut len = char_len(&description);

    if len < DESCRIPTION_MIN_CHARS {
        description.push_str(DESCRIPTION_FILLER);
        len = char_len(&description);

        let mut rounds = 0;
        while len < DESCRIPTION_MIN_CHARS && rounds < MAX_FILLER_ROUNDS {
            description.push_str(DESCRIPTION_HASHTAG_FILLER);
            len = char_len(&description);
            rounds += 1;
        }
    }

    if len > DESCRIPTION_MAX_CHARS {
        let keep = DESCRIPTION_MAX_CHARS - char_len(ELLIPSIS);
        description = truncate_chars(&description, keep);
        description.push_str(ELLIPSIS);
    }

    description
}

fn joined_len(tags: &[String]) -> usize {
    if tags.is_empty() {
        return 0;
    }
    let chars: usize = tags.iter().map(|t| char_len(t)).sum();
    chars + char_len(TAG_SEPARATOR) * (tags.len() - 1)
}
