//! Translation instruction text.

/// Fixed style rules sent with every segment.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleContract {
    pub source_language: String,
    pub target_language: String,
    /// Register the output must use, e.g. polite です・ます narration.
    pub register: String,
    /// Proper nouns that must be copied through untranslated.
    pub do_not_translate: Vec<String>,
}

impl Default for StyleContract {
    fn default() -> Self {
        Self {
            source_language: "English".to_string(),
            target_language: "Japanese".to_string(),
            register: "polite, clear, and natural Japanese using the \"です・ます\" form, \
                       concise yet formal, suitable for subtitle narration"
                .to_string(),
            do_not_translate: vec!["Cognizant".to_string()],
        }
    }
}

/// Build the single instruction sent to the translator for one segment.
pub fn build_instruction(source_text: &str, budget: u32, style: &StyleContract) -> String {
    let src = &style.source_language;
    let dst = &style.target_language;

    let mut lines = vec![
        format!(
            "You are a professional translator converting {} speech into {} subtitles for text-to-speech narration.",
            src, dst
        ),
        format!("Translate the {} text into {}.", src, style.register),
        String::new(),
        format!(
            "Your translation must fit within {} {} characters. This is a strict limit. Do not exceed it.",
            budget, dst
        ),
        "Do not cut the translation off unnaturally. If it becomes too long, rephrase it to be shorter while keeping the meaning and register. The result must be a complete, grammatical sentence.".to_string(),
        String::new(),
        "Omit filler words such as \"um\", \"uh\", \"you know\" and similar expressions. If the text consists only of such words, return an empty string with no explanation, placeholder, or substitute text.".to_string(),
    ];

    for term in style.do_not_translate.iter().filter(|t| !t.trim().is_empty()) {
        lines.push(format!(
            "If the text contains \"{}\", do not translate it. Keep \"{}\" as-is; it is a proper noun.",
            term.trim(),
            term.trim()
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Return only the final translated {} text. Do not include line breaks, formatting, or any commentary.",
        dst
    ));
    lines.push(String::new());
    lines.push(format!("{} text:", src));
    lines.push(source_text.trim().to_string());

    lines.join("\n")
}
