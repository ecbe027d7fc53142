//! 字数估算器
//!
//! 对章节正文做单次扫描，统计以空白分隔的字串数量。
//! 所有写入路径（创建、自动保存、修订保存）共用此实现，
//! 保证同一正文在任何入口得到同一字数。

/// 判断是否为字界空白（空格、换行、制表符、回车）
///
/// 其余字符一律视为字内字符，包括标点与 CJK 文字，
/// 因此连续的中文段落会被计为一个字串。
#[inline]
fn is_boundary(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\t' | '\r')
}

/// 统计文本字数
///
/// 返回由字界空白分隔的最大非空白串数量。
/// 空文本与纯空白文本返回 0。
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for ch in text.chars() {
        if is_boundary(ch) {
            in_word = false;
        } else if !in_word {
            in_word = true;
            count += 1;
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(count_words("   \t\n\r  "), 0);
    }

    #[test]
    fn test_single_word() {
        assert_eq!(count_words("hello"), 1);
    }

    #[test]
    fn test_simple_sentence() {
        assert_eq!(count_words("Hello world"), 2);
    }

    #[test]
    fn test_consecutive_separators_collapse() {
        // 连续空白只构成一个字界
        assert_eq!(count_words("a b  c\tc\n"), 4);
        assert_eq!(count_words("one\t\t\ttwo"), 2);
    }

    #[test]
    fn test_leading_and_trailing_whitespace() {
        assert_eq!(count_words("  padded words  "), 2);
        assert_eq!(count_words("\n\nfirst line\n"), 2);
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(count_words("a\rb\nc\td e"), 5);
    }

    #[test]
    fn test_cjk_run_counts_as_one() {
        // 中文之间没有空白，整段计为一个字串
        assert_eq!(count_words("少年面无表情"), 1);
        assert_eq!(count_words("斗之力 三段"), 2);
    }

    #[test]
    fn test_punctuation_is_not_a_boundary() {
        assert_eq!(count_words("well-known fact, indeed."), 3);
    }
}
