use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Thinking",
    "Squeezing the juice",
    "Consulting the agent",
    "Drafting a reply",
    "Crunching the numbers",
    "Gathering insights",
    "Reviewing your message",
    "Sketching a roadmap",
];

pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Thinking")
}
