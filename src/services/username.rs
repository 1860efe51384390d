use crate::utils::{pick, RandomSource};

const ADJECTIVES: [&str; 16] = [
    "Swift", "Clever", "Bright", "Quick", "Sharp", "Smart", "Fast", "Bold",
    "Wise", "Brave", "Cool", "Epic", "Super", "Mega", "Ultra", "Pro",
];

const NOUNS: [&str; 16] = [
    "Player", "Gamer", "Thinker", "Master", "Champ", "Hero", "Star", "Ace",
    "Genius", "Wizard", "Ninja", "Legend", "Boss", "King", "Queen", "Lord",
];

pub const ANONYMOUS: &str = "anonymous";

/// A name like `SwiftPlayer42`.
pub fn generate_pseudonym(rng: &mut dyn RandomSource) -> String {
    let adjective = pick(&ADJECTIVES, rng).copied().unwrap_or("Swift");
    let noun = pick(&NOUNS, rng).copied().unwrap_or("Player");
    let number = rng.next_index(999) + 1;
    format!("{}{}{}", adjective, noun, number)
}

/// Use the requested name when there is a real one, otherwise make one up.
pub fn resolve_username(requested: Option<&str>, rng: &mut dyn RandomSource) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() && name != ANONYMOUS => name.to_string(),
        _ => generate_pseudonym(rng),
    }
}
