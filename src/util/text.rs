/// Joins setting tokens with single spaces, the form stored in `config.value`.
///
/// Tokens must be whitespace-free; every known field name is.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits a stored setting value back into its tokens.
pub fn split_tokens(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    // 注意這個慣用法：在 tests 模組中，從外部範疇匯入所有名字。
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        let tokens = vec!["lastPrice", "pChange", "cm_adj_high_dt"];
        let joined = join_tokens(&tokens);

        assert_eq!(joined, "lastPrice pChange cm_adj_high_dt");
        assert_eq!(split_tokens(&joined), tokens);
    }

    #[test]
    fn test_split_tokens_ignores_extra_whitespace() {
        assert_eq!(split_tokens("  open\tdayHigh \n"), vec!["open", "dayHigh"]);
        assert!(split_tokens("").is_empty());
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Infosys Limited", "INFOSYS"));
        assert!(contains_ignore_case("Tata Motors Limited", "motors"));
        assert!(!contains_ignore_case("Infosys Limited", "tcs"));
    }
}
