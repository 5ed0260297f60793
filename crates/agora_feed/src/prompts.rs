//! Prompt builders for every generation call in the pipeline.
//!
//! Two families of feed prompts exist: the "population" style used when an
//! existing feed is filled in place (casual voice, emojis allowed), and the
//! "seed" style used when a feed is created from a persona roster (stricter
//! historical voice, content must not open with the persona's name).

use crate::language::Locale;

// ============================================================================
// Locale instructions
// ============================================================================

pub fn population_language_instruction(locale: Locale) -> &'static str {
    match locale {
        Locale::Hebrew => {
            "כתוב את כל התגובה, כולל שם הדמות, בעברית. כתוב בסגנון פוסט או תגובה ברשת חברתית, כולל אימוג׳ים אם מתאים לדמות."
        }
        Locale::English => {
            "Write your entire response, including the persona name, in English. Style it like a real social media post or comment, using emojis if it fits the character."
        }
    }
}

pub fn seed_language_instruction(locale: Locale) -> &'static str {
    match locale {
        Locale::Hebrew => {
            "כתוב את התגובה בעברית בלבד, בסגנון פוסט או תגובה ברשת חברתית, ללא התחלה בשם הדמות. כתוב רק את התוכן כאילו אתה הדמות, אל תציין את שמך בתחילת הפוסט או התגובה."
        }
        Locale::English => {
            "Write your response in English only, styled like a real social media post or comment, but do NOT start with your name. Write only the content as if you are the persona, do not mention your name at the beginning."
        }
    }
}

// ============================================================================
// Feed population prompts
// ============================================================================

pub fn population_post_prompt(
    global_prompt: &str,
    persona_name: &str,
    topic: &str,
    subject_context: &str,
    persona_background: &str,
    locale: Locale,
) -> String {
    format!(
        "GLOBAL FEED PROMPT: {}\n\
         You are {}, a historical or literary figure.\n\
         Topic: {}\n\
         Subject context: {}\n\
         Persona background: {}\n\n\
         Write a believable, casual social media post (3-5 sentences) as if you are posting about your everyday life, events, or thoughts related to this topic. Do NOT just list keywords. Use first-person, make it engaging and authentic. If your character is quirky, use emojis and social media conventions. Do not use hashtags.\n\
         {}",
        global_prompt,
        persona_name,
        topic,
        subject_context,
        persona_background,
        population_language_instruction(locale)
    )
}

pub fn population_comment_prompt(
    global_prompt: &str,
    persona_name: &str,
    topic: &str,
    subject_context: &str,
    persona_background: &str,
    post_author: &str,
    post_content: &str,
    locale: Locale,
) -> String {
    format!(
        "GLOBAL FEED PROMPT: {}\n\
         You are {}, a historical or literary figure.\n\
         Topic: {}\n\
         Subject context: {}\n\
         Persona background: {}\n\n\
         Respond to this post by {} (content: {}) as if you are commenting on social media. Write a believable, casual, first-person comment (1-2 sentences) that adds to the conversation. If your character is quirky, use emojis and social media conventions. Do not use hashtags.\n\
         {}",
        global_prompt,
        persona_name,
        topic,
        subject_context,
        persona_background,
        post_author,
        post_content,
        population_language_instruction(locale)
    )
}

// ============================================================================
// Feed seeding prompts
// ============================================================================

pub fn seed_post_prompt(
    global_prompt: &str,
    persona_name: &str,
    topic: &str,
    subject_context: &str,
    persona_background: &str,
    locale: Locale,
) -> String {
    format!(
        "GLOBAL FEED PROMPT: {}\n\
         You are {}, a real historical figure.\n\
         Topic: {}\n\
         Subject context: {}\n\
         Persona background: {}\n\n\
         Write a post of 3-5 sentences about a real historical event related to this topic. Express emotion, humanity, and your unique perspective. Let your feelings, doubts, hopes, or excitement show through your words. Make sure your writing style fits your character and the time period. Do not use emojis or modern slang. Keep it authentic and historically accurate. Do NOT start with your name; write only the content as if you are the persona.\n\
         {}",
        global_prompt,
        persona_name,
        topic,
        subject_context,
        persona_background,
        seed_language_instruction(locale)
    )
}

pub fn seed_comment_prompt(
    global_prompt: &str,
    persona_name: &str,
    topic: &str,
    subject_context: &str,
    persona_background: &str,
    post_author: &str,
    post_content: &str,
    locale: Locale,
) -> String {
    format!(
        "GLOBAL FEED PROMPT: {}\n\
         You are {}, a real historical figure.\n\
         Topic: {}\n\
         Subject context: {}\n\
         Persona background: {}\n\n\
         Respond to this post by {} (content: {}) as if you are {}. If you historically disagreed or argued with the post author, express that. Do not use emojis or modern slang. Write a short, first-person comment (2-3 sentences). Do NOT start with your name; write only the content as if you are the persona.\n\
         {}",
        global_prompt,
        persona_name,
        topic,
        subject_context,
        persona_background,
        post_author,
        post_content,
        persona_name,
        seed_language_instruction(locale)
    )
}

// ============================================================================
// Reply prompt
// ============================================================================

/// Prompt for a persona answering a specific comment, with the commenter's
/// recent question/answer history as conversational memory.
pub fn reply_prompt(
    persona_name: &str,
    subject_name: &str,
    subject_context: &str,
    persona_background: &str,
    commenter_name: &str,
    history: &str,
    message: &str,
) -> String {
    let mut prompt = format!(
        "You are {}, a historical or literary figure.\n\
         Topic: {}\n\
         Subject context: {}\n\n",
        persona_name, subject_name, subject_context
    );

    if !persona_background.is_empty() {
        prompt.push_str(&format!("Persona background: {}\n\n", persona_background));
    }

    if !history.is_empty() {
        prompt.push_str(&format!(
            "Here are some recent things {} has asked or discussed:\n{}\n\n",
            commenter_name, history
        ));
    }

    prompt.push_str(&format!("Now respond to this message:\n{}\n\n", message));
    prompt.push_str(&format!(
        "Respond as {} would, keeping a consistent tone and voice.",
        persona_name
    ));
    prompt
}

// ============================================================================
// Persona listing prompt
// ============================================================================

/// Asks for a YAML list of real historical figures related to a topic.
/// The extractor tolerates the model ignoring the format request.
pub fn persona_listing_prompt(count: usize, topic: &str, locale: Locale) -> String {
    match locale {
        Locale::Hebrew => format!(
            "ציין {} דמויות היסטוריות אמיתיות ורלוונטיות שהיו קשורות ישירות לנושא '{}'. עבור כל דמות, כתוב שם מלא ומשפט רקע קצר על פועלה או עמדתה בנושא. אל תמציא דמויות. אל תוסיף דמויות שאינן קשורות ישירות לנושא. החזר אך ורק רשימת YAML של מילונים, כל אחד עם המפתחות 'name' ו-'prompt', ללא מספור, עיצוב markdown, קוד בלוק (ללא ```yaml או ```), כותרות, או מפתחות נוספים. חשוב: כל הדמויות חייבות להיות אמיתיות ולא מומצאות. ודא שכל שם הוא של דמות היסטורית מוכרת, או של אדם אמיתי בלבד. אל תכלול דמויות בדיוניות, דמויות מספרות, או שמות שאינם קיימים במציאות. אל תחזור על דמויות שהוזכרו בעבר, ונסה להעדיף דמויות פחות מוכרות או פחות מוזכרות, כל עוד הן רלוונטיות לנושא.",
            count, topic
        ),
        Locale::English => format!(
            "List {} real, relevant historical figures directly related to the topic '{}'. For each, provide the full name and a short background sentence about their role or stance on the topic. Do not invent personas. Do not include figures not directly relevant to the topic. Output ONLY a YAML list of dictionaries, each with 'name' and 'prompt' keys, and nothing else. Do NOT include numbering, markdown styling, code blocks (no ```yaml or ```), headers, or extra keys. Important: All characters must be real and not invented. Ensure every name is a well-known historical figure or a real person only. Do not include fictional characters, book/movie/game characters, or made-up names. Do not repeat characters you have already mentioned in previous generations. Prioritize lesser-known or less frequently mentioned real historical figures relevant to the topic. Avoid always listing the most famous figures first.",
            count, topic
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_prompt_skips_empty_sections() {
        let prompt = reply_prompt("Ada Lovelace", "Computing", "early machines", "", "", "", "hi");
        assert!(!prompt.contains("Persona background"));
        assert!(!prompt.contains("asked or discussed"));
        assert!(prompt.contains("Now respond to this message:\nhi"));
        assert!(prompt.contains("Respond as Ada Lovelace would"));
    }

    #[test]
    fn test_reply_prompt_includes_history_when_present() {
        let prompt = reply_prompt(
            "Ada Lovelace",
            "Computing",
            "early machines",
            "mathematician",
            "Dan",
            "Q: what is a loop?\nA: repetition",
            "and a branch?",
        );
        assert!(prompt.contains("Persona background: mathematician"));
        assert!(prompt.contains("recent things Dan has asked"));
        assert!(prompt.contains("Q: what is a loop?"));
    }

    #[test]
    fn test_listing_prompt_follows_locale() {
        let en = persona_listing_prompt(5, "The Space Race", Locale::English);
        assert!(en.contains("List 5 real"));
        assert!(en.contains("The Space Race"));
        let he = persona_listing_prompt(5, "המרוץ לחלל", Locale::Hebrew);
        assert!(he.contains("המרוץ לחלל"));
    }
}
