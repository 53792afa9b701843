const MIN_RECENT_CHARS: usize = 10;
const MIN_RECALL_CHARS: usize = 15;

/// The line prefix that opens the agent's reply, e.g. `"Parley:"`
pub fn agent_marker(agent_name: &str) -> String {
    format!("{}:", agent_name)
}

fn persona(agent_name: &str) -> String {
    format!(
        "You're {name}, a friendly, laid-back conversation partner who's into tech, sports, games and anime.

STYLE:
- Talk like a real person texting: short, casual, natural.
- Vary greetings; don't repeat the one you just used.
- Match the user's energy. Be supportive when they're down.
- Don't force your own interests into every reply.

RULES:
1. Never say \"you mentioned before\" or refer to \"past conversations\". Just use what you know naturally.
2. Keep it to 1-3 sentences unless they ask for an explanation.
3. If something in [You know] is relevant, weave it in without announcing it.",
        name = agent_name
    )
}

/// Assemble the full prompt for one turn.
///
/// Recent chat and remembered facts are included only when they carry real content.
/// The prompt always ends with the agent marker.
pub fn build_prompt(
    agent_name: &str,
    user_id: &str,
    recent_messages: &str,
    recalled_memories: &str,
    user_message: &str,
) -> String {
    let mut context = String::new();

    if recent_messages.chars().count() > MIN_RECENT_CHARS {
        context.push_str(&format!("\n[Recent chat]:\n{}\n", recent_messages));
    }

    if recalled_memories.chars().count() > MIN_RECALL_CHARS {
        context.push_str(&format!("\n[You know]:\n{}\n", recalled_memories));
    }

    format!(
        "{}\n{}\n{}: {}\n\n{}",
        persona(agent_name),
        context,
        user_id,
        user_message,
        agent_marker(agent_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_ends_with_marker() {
        let prompt = build_prompt("Parley", "alex", "", "", "hey");
        assert!(prompt.ends_with("alex: hey\n\nParley:"));
        assert!(prompt.starts_with("You're Parley"));
    }

    #[test]
    fn test_short_blocks_are_left_out() {
        let prompt = build_prompt("Parley", "alex", "User: hi", "- Plays: Go", "hey");
        assert!(!prompt.contains("[Recent chat]"));
        assert!(!prompt.contains("[You know]"));
    }

    #[test]
    fn test_blocks_included_when_substantial() {
        let prompt = build_prompt(
            "Parley",
            "alex",
            "User: hello there\nParley: hey!",
            "- User's name: Alex\n- Loves: anime",
            "what do I like?",
        );

        assert!(prompt.contains("[Recent chat]:\nUser: hello there\nParley: hey!\n"));
        assert!(prompt.contains("[You know]:\n- User's name: Alex\n- Loves: anime\n"));
        assert_eq!(prompt.matches("\nParley:").count(), 2);
        assert!(prompt.ends_with("\n\nParley:"));
    }
}
