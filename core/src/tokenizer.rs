use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    // Runs of letters/digits; an apostrophe survives only between two word characters.
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}\p{N}]+)*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Fold `text` to the form the token regex runs over: NFKD with combining marks
/// dropped, typographic apostrophes mapped to ASCII, then lowercased.
fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '\u{2019}' || c == '\u{2018}' { '\'' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Tokenize text into stemmed terms: accent folding, lowercase, punctuation as
/// separators, stopword removal, English Snowball stemming.
///
/// Document text at build time and query text at search time both go through
/// this function, so the two sides always produce comparable terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let folded = fold(text);
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&folded) {
        let token = mat.as_str();
        if is_stopword(token) { continue; }
        tokens.push(STEMMER.stem(token).into_owned());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("?!... ---").is_empty());
    }

    #[test]
    fn punctuation_splits_words() {
        assert_eq!(tokenize("graph-coloring"), tokenize("graph coloring"));
        assert_eq!(tokenize("k-th"), vec!["k".to_string(), "th".to_string()]);
    }

    #[test]
    fn curly_apostrophe_contraction_is_a_stopword() {
        assert!(tokenize("don\u{2019}t").is_empty());
    }

    #[test]
    fn digits_are_kept() {
        let t = tokenize("2 sum over 10^9");
        assert_eq!(t, vec!["2", "sum", "10", "9"]);
    }
}
