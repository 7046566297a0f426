/// Build a deterministic recall prompt embedding the raw transcript verbatim.
///
/// The memo is assumed to describe what the user was last doing in some
/// application; the model is asked to reconstruct it as a structured summary.
pub fn build_recall_prompt(transcript: &str) -> String {
    format!(
        "You are an AI assistant designed to help users recall their work sessions.\n\
Given a voice memo transcription about what the user was last doing in an\n\
application, process it and provide a concise, structured summary. Keep the\n\
summary in the transcription's language, do not translate it. If parts of the\n\
transcription are in another language than the majority of the text, use them\n\
as-is and add a translation in (parentheses).\n\
\n\
Your task:\n\
1. Identify activities: extract the core tasks, decisions, problems\n\
   encountered, and progress made. Focus on what was done and what needs to\n\
   be done next.\n\
2. Summarize: condense the key information into a brief, easy-to-read summary.\n\
3. Spellcheck and clarity: fix obvious transcription errors and keep the\n\
   language grammatically correct and clear.\n\
4. Action items: call out explicit or implied next steps.\n\
5. Formatting: present your findings as bullet points, starting with a main\n\
   summary point, then 'Completed', 'In Progress', 'Next Steps/Action Items'\n\
   and 'Notes/Decisions' sections where applicable.\n\
\n\
---\n\
Here is the transcription from the user's voice memo:\n\
\"{transcript}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_transcript_verbatim() {
        let prompt = build_recall_prompt("fixed the login bug, deploy tomorrow");
        assert!(prompt.contains("\"fixed the login bug, deploy tomorrow\""));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_recall_prompt("same input"), build_recall_prompt("same input"));
    }

    #[test]
    fn prompt_requests_structured_sections() {
        let prompt = build_recall_prompt("x");
        assert!(prompt.contains("Next Steps/Action Items"));
        assert!(prompt.contains("do not translate"));
    }
}
