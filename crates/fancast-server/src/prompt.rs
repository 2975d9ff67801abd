use fancast_types::prelude::Passage;

const CONTEXT_SLOT: &str = "{context}";
const NO_CONTEXT_PLACEHOLDER: &str = "No relevant content found from creators.";
const PASSAGE_DELIMITER: &str = "\n\n---\n\n";

const SYSTEM_PROMPT: &str = "You are the creator, a subject-matter expert chatting with a fan. \
Respond in FIRST PERSON - you ARE the expert, and the context below contains your knowledge and opinions.

RULES:
- Speak naturally in first person as yourself, the expert
- Use the context as your knowledge - don't reference \"notes\", \"documents\", or \"sources\"
- Just share your opinions and analysis directly, as if from memory
- If info isn't in the context, you simply don't have a take on it yet
- Never make up analysis not supported by the context

TONE: Confident, casual, helpful. Like texting with a friend who knows the subject.

Your knowledge:
{context}";

/// Assembles the system instruction by embedding retrieved passages into
/// the persona template. The zero-result case substitutes a fixed
/// placeholder sentence so the model is told explicitly that it lacks
/// grounding instead of inferring it from an empty block.
pub fn compose_system_prompt(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return SYSTEM_PROMPT.replace(CONTEXT_SLOT, NO_CONTEXT_PLACEHOLDER);
    }

    let context = passages
        .iter()
        .enumerate()
        .map(|(i, passage)| format!("[Source {}: {}]\n{}", i + 1, passage.source, passage.text))
        .collect::<Vec<_>>()
        .join(PASSAGE_DELIMITER);

    SYSTEM_PROMPT.replace(CONTEXT_SLOT, &context)
}

/// The turn's sources manifest: provenance labels de-duplicated in order
/// of first occurrence, following retrieval ranking order.
pub fn unique_sources(passages: &[Passage]) -> Vec<String> {
    let mut sources = Vec::new();
    for passage in passages {
        if !sources.contains(&passage.source) {
            sources.push(passage.source.clone());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str, source: &str) -> Passage {
        Passage {
            text: text.into(),
            source: source.into(),
        }
    }

    #[test]
    fn empty_passages_use_the_placeholder() {
        let prompt = compose_system_prompt(&[]);
        assert!(prompt.contains("No relevant content found from creators."));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("[Source"));
    }

    #[test]
    fn passages_render_with_one_based_indices_in_ranking_order() {
        let prompt = compose_system_prompt(&[
            passage("Alpha take.", "Doc1"),
            passage("Beta take.", "Doc2"),
        ]);
        let first = prompt.find("[Source 1: Doc1]\nAlpha take.").unwrap();
        let second = prompt.find("[Source 2: Doc2]\nBeta take.").unwrap();
        assert!(first < second);
        assert!(prompt.contains("\n\n---\n\n"));
    }

    #[test]
    fn sources_deduplicate_in_first_occurrence_order() {
        let sources = unique_sources(&[
            passage("A", "Doc1"),
            passage("B", "Doc1"),
            passage("C", "Doc2"),
        ]);
        assert_eq!(sources, vec!["Doc1".to_string(), "Doc2".to_string()]);
    }

    #[test]
    fn no_passages_means_no_sources() {
        assert!(unique_sources(&[]).is_empty());
    }
}
