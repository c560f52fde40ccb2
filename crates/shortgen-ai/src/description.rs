//! Themes and the long-form description used by the metadata fallback.
//!
//! The description is rendered from a fixed template: a hook, the story
//! behind the clip, a list of viewer reactions, a call to action and a
//! closing hashtag block. The theme picks the decorative emoji set and a
//! couple of adjectives; the first 300 characters of the segment are quoted
//! verbatim. Output is fully determined by its inputs.

use shortgen_models::text::truncate_chars;

use crate::lexicon::contains_any;

/// Characters of segment text quoted in the description.
pub const SEGMENT_PREVIEW_CHARS: usize = 300;

/// Content theme, detected from segment keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Humor,
    Shock,
    Amazing,
    Secret,
    Music,
    General,
}

/// Themes in detection priority order, with their trigger words.
const THEME_TRIGGERS: &[(Theme, &[&str])] = &[
    (Theme::Humor, &["funny", "hilarious", "joke", "laugh"]),
    (Theme::Shock, &["shocking", "unbelievable", "incredible", "insane"]),
    (Theme::Amazing, &["amazing", "awesome", "fantastic", "incredible"]),
    (Theme::Secret, &["secret", "revealed", "truth", "hidden"]),
    (Theme::Music, &["music", "song", "dance", "singing"]),
];

impl Theme {
    /// First theme whose trigger words occur in `text`; `General` otherwise.
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        THEME_TRIGGERS
            .iter()
            .find(|(_, words)| contains_any(&lower, words))
            .map(|(theme, _)| *theme)
            .unwrap_or(Theme::General)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Humor => "humor",
            Theme::Shock => "shock",
            Theme::Amazing => "amazing",
            Theme::Secret => "secret",
            Theme::Music => "music",
            Theme::General => "general",
        }
    }

    /// Decorative emoji set.
    pub fn emojis(&self) -> [&'static str; 7] {
        match self {
            Theme::Humor => ["😂", "🤣", "😆", "😄", "🙃", "😁", "😊"],
            Theme::Shock => ["😱", "🤯", "😲", "🫨", "😵", "🤐", "😳"],
            Theme::Amazing => ["🔥", "✨", "⭐", "💫", "🌟", "💥", "🚀"],
            Theme::Secret => ["🤫", "👀", "🕵️", "🔍", "💭", "🤔", "😏"],
            Theme::Music => ["🎵", "🎶", "🎤", "🎸", "🎹", "🥁", "🎺"],
            Theme::General => ["🔥", "😍", "🤩", "💯", "👏", "🙌", "✨"],
        }
    }

    /// Title for a short of this theme, built around `subject`.
    ///
    /// Not length-limited; callers apply the title contract.
    pub fn title(&self, subject: &str) -> String {
        match self {
            Theme::Humor => {
                format!("😂 HILARIOUS: {subject} - You Won't Stop Laughing! 🤣 #Shorts #Viral")
            }
            Theme::Shock => {
                format!("😱 SHOCKING: {subject} - This Will Blow Your Mind! 🤯 #Shorts #Viral")
            }
            Theme::Amazing => {
                format!("🔥 AMAZING: {subject} - Absolutely Incredible! ✨ #Shorts #Viral")
            }
            Theme::Secret => {
                format!("🤫 REVEALED: {subject} - The Truth Exposed! 😲 #Shorts #Viral")
            }
            Theme::Music => {
                format!("🎵 VIRAL MUSIC: {subject} - This Hit Different! 🎶 #Shorts #Viral")
            }
            Theme::General => format!("🔥 VIRAL: {subject} - Must See This! 😍 #Shorts #Viral"),
        }
    }

    /// Adjective used in the description prose.
    fn mood(&self) -> &'static str {
        match self {
            Theme::Humor => "hilarious",
            Theme::Shock => "jaw-dropping",
            Theme::Amazing => "incredible",
            Theme::Secret => "eye-opening",
            Theme::Music => "unforgettable",
            Theme::General => "unmissable",
        }
    }

    /// What viewers end up doing after watching.
    fn reaction(&self) -> &'static str {
        match self {
            Theme::Humor => "laughing out loud",
            Theme::Shock => "staring at the screen",
            Theme::Amazing => "hitting replay",
            Theme::Secret => "rethinking everything",
            Theme::Music => "humming along",
            Theme::General => "sending it to a friend",
        }
    }
}

/// Long-form description template. Placeholders are `{E0}`..`{E6}`
/// (theme emojis), `{MOOD}`, `{REACTION}`, `{SOURCE}` and `{PREVIEW}`.
const LONG_FORM_TEMPLATE: &str = r#"{E0}{E1} STOP SCROLLING! You are about to watch one of the most {MOOD} moments we have ever clipped, and trust us, you will want to watch it twice. {E2}

Some clips ask for your attention. This one grabs it in the first second and does not let go until the very end. Whether you found it on your feed by accident or someone sent it to you on purpose, you are in the right place. Sit back, turn the sound up and get ready, because this is the kind of short that ends with people {REACTION}.

{E3} THE MOMENT EVERYONE IS TALKING ABOUT {E3}

Here is exactly what was said, word for word, in the part of the video that caught our eye:

"{PREVIEW}"

Read that again. Now picture it delivered live, with perfect timing, in front of a camera that happened to be rolling at just the right moment. That is what you get in this short, and it is even better with the sound on.

{E4} THE STORY BEHIND THE CLIP {E4}

This moment comes from "{SOURCE}". It is a longer video, and like most long videos it has slow stretches, setup and a lot of context that only makes sense if you watch the whole thing from the start. Somewhere in the middle of all that there is a handful of seconds that changes the whole mood. That handful of seconds is what you just watched.

We spend our days going through long videos so that you do not have to. We listen for the moment the energy shifts, the line that makes the room go quiet, the reaction nobody planned for. When we find one, we cut it down to the part that matters, frame it for your phone and share it here. This clip stood out the moment we heard it, and it kept standing out every time we played it back.

What makes it work is how natural it is. Nobody wrote this in advance. Nobody rehearsed it. It is a real moment between real people, caught on camera, and that is exactly why it feels so {MOOD}. You can tell the people in the room did not see it coming either, and that surprise is contagious. By the time it ends you feel like you were there.

There is also something to be said for the pacing. The setup is short, the payoff is immediate and the aftermath lingers just long enough to let it land. Editors spend years learning how to build a moment like this on purpose. Here it simply happened, and all we had to do was find it and get out of the way.

{E5} WHY PEOPLE CANNOT STOP WATCHING {E5}

We have shared a lot of clips, and the ones that travel the furthest always have a few things in common. This one checks every box:

{E0} It makes sense instantly, with no need to know who anyone is or what happened before
{E1} The reaction is genuine, and you can feel it through the screen
{E2} It is short enough to watch again right away, and most people do
{E3} It gives you something to talk about with friends, family or the group chat
{E4} It works whether you are watching at home, on the bus or in a queue
{E5} It leaves you with a line or a look that you will remember later today
{E6} It is the kind of moment that makes you want to see what else is out there

{E6} WHAT VIEWERS ARE SAYING {E6}

The comments on clips like this one always tell the real story. Here is the kind of thing people say the moment they finish watching:

{E0} "I was not ready for that at all."
{E1} "Watched it five times and it gets better every time."
{E2} "Sending this to everyone I know right now."
{E3} "The timing on this is absolutely perfect."
{E4} "How is nobody talking about this yet?"
{E5} "This is the best thing I have seen all week."
{E6} "I need the full video immediately."
{E0} "My reaction was exactly the same as theirs."
{E1} "This deserves way more views than it has."
{E2} "I came here from a friend and I am staying for more."
{E3} "The face at the end says everything."
{E4} "You can tell this was not planned and that is what makes it great."
{E5} "Saving this one for a bad day."
{E6} "Whoever found this clip deserves a raise."
{E0} "I keep coming back to this."
{E1} "The internet needed this today."

Do you agree with them? Do you see it differently? Either way, we want to hear from you. Tell us in the comments which second got you, and whether you watched it more than once. We read every comment, and the best ones often shape what we clip next.

{E1} WHY WE MAKE THESE SHORTS {E1}

Long videos are full of gold, but most people will never sit through an hour to find the best thirty seconds. That is a shame, because some of the most {MOOD} moments on the internet are buried deep inside videos that never got the attention they deserved. Our goal is simple: find those moments, cut them cleanly and put them where people can actually enjoy them.

Every short on this channel goes through the same process. We watch the source, we listen for the reactions, we trim away the noise and we keep the part that made us react. If a clip does not make us feel something, it does not get posted. This one made the cut easily.

We also care about the people in these videos. A great moment belongs to the people who made it, so we always point back to the original source. If you enjoyed this short, the full video is well worth your time, and it gives you the context that makes the clip even better.

{E2} HOW TO GET THE MOST OUT OF THIS CLIP {E2}

Watch it once for the moment itself. Watch it a second time and pay attention to the faces in the background, because the reactions around the main moment are often just as good. Then watch it a third time with someone who has not seen it yet and enjoy watching them react. That last one might be the best part.

If you are the kind of person who likes to collect great moments, save this short to a playlist. You will be surprised how often you come back to it, and how often you end up showing it to someone new. Clips like this have a way of becoming inside jokes, running references and shared memories.

{E3} JOIN THE COMMUNITY {E3}

This channel exists because of the people who watch, comment and share. Every like tells us we picked the right moment. Every comment helps us understand what you want to see more of. Every share helps a great clip reach someone who needed it today. If you have been watching for a while, thank you. If this is your first short here, welcome. You picked a good one to start with.

Here is how you can help:

{E0} LIKE this short if it made you feel something
{E1} SUBSCRIBE so the next {MOOD} moment lands straight in your feed
{E2} COMMENT with your favourite second and your honest first reaction
{E3} SHARE it with the one friend who will appreciate it the most
{E4} TURN ON notifications so you never miss a new drop
{E5} SAVE it to a playlist for the next time you need a pick-me-up
{E6} SUGGEST a video you think we should clip next

{E4} QUESTIONS WE GET A LOT {E4}

Where does this clip come from? It is taken from "{SOURCE}". We always keep the original intact and point back to it, so if you want the full story, that is where to find it.

Why is it so short? Because the best moments rarely need more than a few seconds. We cut away everything that does not add to the moment so that you get the highlight without the wait.

How often do you post? New shorts go up regularly, and there is always another great moment waiting in the queue. Subscribing is the easiest way to keep up.

Can I suggest a video? Absolutely. Drop a link or a title in the comments. Some of our favourite clips started as suggestions from viewers just like you.

{E5} ONE LAST THING {E5}

Moments like this are a reminder of why people love video in the first place. It is not the polish or the production. It is the feeling of being there when something real happens. We hope this short gave you a bit of that feeling, and we hope you carry it with you for the rest of the day.

If this short brightened your feed, pass that feeling on. Send it to someone who has had a long week, post it in the group chat that has gone quiet or keep it for yourself and come back whenever you need it. Great moments are better when they are shared, and this one has plenty to go around.

Thanks for watching, thanks for being here, and we will see you in the next one. {E6}{E0}

#Shorts #Viral #Trending #MustWatch #ForYou #FYP #Explore #Entertainment #Highlights #BestMoments #Clips #Reaction #Epic #Wow #Amazing #Incredible #Unbelievable #Funny #Emotional #Inspiring #Relatable #RealMoments #Daily #NewVideo #Subscribe #Like #Share #Comment #Community #Creator"#;

/// Render the long-form description for a segment.
pub fn compose_long_description(segment_text: &str, original_title: &str, theme: Theme) -> String {
    let preview = truncate_chars(segment_text.trim(), SEGMENT_PREVIEW_CHARS);
    let source = if original_title.trim().is_empty() {
        "the original video"
    } else {
        original_title.trim()
    };

    let mut text = LONG_FORM_TEMPLATE
        .replace("{MOOD}", theme.mood())
        .replace("{REACTION}", theme.reaction());
    for (i, emoji) in theme.emojis().iter().enumerate() {
        text = text.replace(&format!("{{E{i}}}"), emoji);
    }
    // User text goes in last so it is never scanned for placeholders.
    text.replace("{SOURCE}", source).replace("{PREVIEW}", &preview)
}
