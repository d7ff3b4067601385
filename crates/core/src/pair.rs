#![forbid(unsafe_code)]

/// Case-insensitive identity of a (title, company) pair.
///
/// Display values keep their original case; only the key is folded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    title: String,
    company: String,
}

impl PairKey {
    pub fn new(title: &str, company: &str) -> Self {
        Self {
            title: fold(title),
            company: fold(company),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }
}

pub fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}
