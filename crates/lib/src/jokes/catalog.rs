//! Built-in dad jokes.

use rand::Rng;

/// Jokes served for generic requests and as the fallback for failed generation.
pub const DAD_JOKES: &[&str] = &[
    "Why don't scientists trust atoms? Because they make up everything!",
    "I'm reading a book about anti-gravity. It's impossible to put down!",
    "Why did the scarecrow win an award? He was outstanding in his field!",
    "What do you call a fake noodle? An impasta!",
    "Why don't eggs tell jokes? They'd crack each other up!",
    "How do you organize a space party? You planet!",
    "What do you call cheese that isn't yours? Nacho cheese!",
    "Why did the coffee file a police report? It got mugged!",
    "What do you call a bear with no teeth? A gummy bear!",
    "Why did the bicycle fall over? It was two tired!",
    "What's the best time to go to the dentist? Tooth-hurty!",
    "Why don't skeletons fight each other? They don't have the guts!",
    "What did the ocean say to the beach? Nothing, it just waved!",
    "Why did the math book look sad? It had too many problems!",
    "What do you call a can opener that doesn't work? A can't opener!",
];

/// Read-only, ordered joke list. Fixed for the life of the process.
#[derive(Debug, Clone, Copy)]
pub struct JokeCatalog {
    jokes: &'static [&'static str],
}

impl Default for JokeCatalog {
    fn default() -> Self {
        Self { jokes: DAD_JOKES }
    }
}

impl JokeCatalog {
    pub fn jokes(&self) -> &'static [&'static str] {
        self.jokes
    }

    pub fn contains(&self, joke: &str) -> bool {
        self.jokes.iter().any(|j| *j == joke)
    }

    /// Uniformly random joke.
    pub fn random(&self) -> &'static str {
        let i = rand::thread_rng().gen_range(0..self.jokes.len());
        self.jokes[i]
    }
}
